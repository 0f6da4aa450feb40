use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use crate::error::SignalError;
use crate::signal::{Signal, SignalId};
use crate::traits::Invocable;

/// The shape of target a connection calls into. Chosen by which `connect*`
/// method created the connection.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum TargetKind {
    /// A free or associated function, called through a plain `fn` pointer.
    Function,
    /// A `&self` method bound to a borrowed instance.
    Method,
    /// A `&mut self` method bound to an instance behind a `RefCell`.
    MethodMut,
    /// An [`Invocable`] held by reference: closures, boxed functions, channel senders.
    Invocable,
}

/// Type-erased identity of a target: which instance, which function.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub(crate) struct Callee {
    kind: TargetKind,
    instance: *const (),
    function: *const (),
    // Trampoline of the concrete invocable type. A value and its first field, or any two zero-sized
    // values, can share an address.
    shape: *const (),
}

/// Calls the target described by a [`Callee`]. One trampoline is generated per target kind and concrete type.
type Invoker<A, R> = unsafe fn(&Callee, A) -> Result<R, SignalError>;

impl Callee {
    fn function<A, R>(function: fn(A) -> R) -> Self {
        Self { kind: TargetKind::Function, instance: ptr::null(), function: function as *const (), shape: ptr::null() }
    }

    fn method<T, A, R>(instance: &T, method: fn(&T, A) -> R) -> Self {
        Self {
            kind: TargetKind::Method,
            instance: (instance as *const T).cast(),
            function: method as *const (),
            shape: ptr::null(),
        }
    }

    fn method_mut<T, A, R>(instance: &RefCell<T>, method: fn(&mut T, A) -> R) -> Self {
        Self {
            kind: TargetKind::MethodMut,
            instance: (instance as *const RefCell<T>).cast(),
            function: method as *const (),
            shape: ptr::null(),
        }
    }

    fn invocable<T, A, R>(target: &T) -> Self
    where T: Invocable<A, R> {
        let invoker: Invoker<A, R> = call_invocable::<T, A, R>;
        Self {
            kind: TargetKind::Invocable,
            instance: ptr::null(),
            function: (target as *const T).cast(),
            shape: invoker as *const (),
        }
    }
}

// Trampolines. Each one is only ever paired with a `Callee` built by the matching constructor above,
// from references that live at least as long as the `'a` of the owning `Connection`.

unsafe fn call_function<A, R>(callee: &Callee, args: A) -> Result<R, SignalError> {
    // SAFETY: `function` was cast from a `fn(A) -> R` in `Callee::function`
    let function = unsafe { std::mem::transmute::<*const (), fn(A) -> R>(callee.function) };
    Ok(function(args))
}

unsafe fn call_method<T, A, R>(callee: &Callee, args: A) -> Result<R, SignalError> {
    // SAFETY: both pointers were cast from the `&'a T` and `fn(&T, A) -> R` given to `Callee::method`
    let method = unsafe { std::mem::transmute::<*const (), fn(&T, A) -> R>(callee.function) };
    let instance = unsafe { &*callee.instance.cast::<T>() };
    Ok(method(instance, args))
}

unsafe fn call_method_mut<T, A, R>(callee: &Callee, args: A) -> Result<R, SignalError> {
    // SAFETY: both pointers were cast from the `&'a RefCell<T>` and `fn(&mut T, A) -> R` given to `Callee::method_mut`
    let method = unsafe { std::mem::transmute::<*const (), fn(&mut T, A) -> R>(callee.function) };
    let cell = unsafe { &*callee.instance.cast::<RefCell<T>>() };
    let mut instance = cell.try_borrow_mut().map_err(|_| SignalError::TargetBusy)?;
    Ok(method(&mut *instance, args))
}

unsafe fn call_invocable<T, A, R>(callee: &Callee, args: A) -> Result<R, SignalError>
where T: Invocable<A, R> {
    // SAFETY: `function` was cast from the `&'a T` given to `Callee::invocable`
    let target = unsafe { &*callee.function.cast::<T>() };
    Ok(target.invoke(args))
}

struct Slot<A, R> {
    callee: Callee,
    invoker: Invoker<A, R>,
}

impl<A, R> Clone for Slot<A, R> {
    fn clone(&self) -> Self { *self }
}
impl<A, R> Copy for Slot<A, R> {}

/// A handle to one target connected to a [`Signal`].
///
/// Connections are plain values: they are `Copy`, never own their target and never allocate.
/// The `'a` lifetime ties a connection to the borrowed target, so the target cannot be dropped
/// while a connection to it is still usable.
///
/// A connection is either bound (returned by one of the signal's `connect*` methods) or unbound
/// (`Connection::default()`, or after [`disconnect`](Self::disconnect)). Invoking an unbound
/// connection fails with [`SignalError::InvalidConnection`].
pub struct Connection<'a, A, R = ()> {
    signal: Option<SignalId>,
    slot: Option<Slot<A, R>>,
    _target: PhantomData<&'a ()>,
}

impl<'a, A, R> Connection<'a, A, R> {
    fn bind(signal: SignalId, callee: Callee, invoker: Invoker<A, R>) -> Self {
        Self { signal: Some(signal), slot: Some(Slot { callee, invoker }), _target: PhantomData }
    }

    pub(crate) fn function(signal: SignalId, function: fn(A) -> R) -> Self {
        Self::bind(signal, Callee::function(function), call_function::<A, R>)
    }

    pub(crate) fn method<T>(signal: SignalId, instance: &'a T, method: fn(&T, A) -> R) -> Self {
        Self::bind(signal, Callee::method(instance, method), call_method::<T, A, R>)
    }

    pub(crate) fn method_mut<T>(signal: SignalId, instance: &'a RefCell<T>, method: fn(&mut T, A) -> R) -> Self {
        Self::bind(signal, Callee::method_mut(instance, method), call_method_mut::<T, A, R>)
    }

    pub(crate) fn invocable<T>(signal: SignalId, target: &'a T) -> Self
    where T: Invocable<A, R> {
        Self::bind(signal, Callee::invocable(target), call_invocable::<T, A, R>)
    }

    /// Whether this connection is bound to a signal and a target
    pub fn is_connected(&self) -> bool { self.signal.is_some() && self.slot.is_some() }

    /// The signal that created this connection, if it is still bound
    pub fn signal_id(&self) -> Option<SignalId> { self.signal }

    /// The kind of target, if bound
    pub fn kind(&self) -> Option<TargetKind> { self.slot.map(|slot| slot.callee.kind) }

    fn callee(&self) -> Option<Callee> { self.slot.map(|slot| slot.callee) }

    /// Calls the target with `args`.
    pub fn invoke(&self, args: A) -> Result<R, SignalError> {
        match (self.signal, &self.slot) {
            // SAFETY: the slot was built from references that outlive `'a`, and `self` cannot outlive `'a`
            (Some(_), Some(slot)) => unsafe { (slot.invoker)(&slot.callee, args) },
            _ => Err(SignalError::InvalidConnection),
        }
    }

    /// Whether this connection calls `target` (compared by address and type)
    pub fn targets<T>(&self, target: &T) -> bool
    where T: Invocable<A, R> {
        self.callee() == Some(Callee::invocable::<T, A, R>(target))
    }

    /// Whether this connection calls the free or associated function `function`.
    ///
    /// Functions are compared by address. The compiler may merge functions with identical
    /// bodies, in which case they are indistinguishable here.
    pub fn targets_fn(&self, function: fn(A) -> R) -> bool { self.callee() == Some(Callee::function(function)) }

    /// Whether this connection calls `method` on `instance`
    pub fn targets_method<T>(&self, instance: &T, method: fn(&T, A) -> R) -> bool {
        self.callee() == Some(Callee::method(instance, method))
    }

    /// Whether this connection calls the mutating `method` on `instance`
    pub fn targets_method_mut<T>(&self, instance: &RefCell<T>, method: fn(&mut T, A) -> R) -> bool {
        self.callee() == Some(Callee::method_mut(instance, method))
    }

    /// Removes this connection from `signal`, then unbinds it.
    ///
    /// Returns whether `signal` held an equal connection. Disconnecting an unbound connection
    /// is a no-op returning `false`. If `signal` neither held the connection nor created it,
    /// the handle stays bound so it can still be disconnected from the right signal.
    pub fn disconnect(&mut self, signal: &mut Signal<'a, A, R>) -> bool {
        if !self.is_connected() {
            return false;
        }
        let removed = signal.disconnect_connection(self);
        if !removed && self.signal != Some(signal.id()) {
            return false;
        }
        self.clear();
        removed
    }

    fn clear(&mut self) { *self = Self::default(); }
}

impl<A, R> Default for Connection<'_, A, R> {
    fn default() -> Self { Self { signal: None, slot: None, _target: PhantomData } }
}

impl<A, R> Clone for Connection<'_, A, R> {
    fn clone(&self) -> Self { *self }
}
impl<A, R> Copy for Connection<'_, A, R> {}

impl<A, R> PartialEq for Connection<'_, A, R> {
    fn eq(&self, other: &Self) -> bool { self.signal == other.signal && self.callee() == other.callee() }
}
impl<A, R> Eq for Connection<'_, A, R> {}

impl<A, R> fmt::Debug for Connection<'_, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("signal", &self.signal).field("kind", &self.kind()).finish()
    }
}
