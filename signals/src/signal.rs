use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, trace};

use crate::connection::Connection;
use crate::error::SignalError;
use crate::traits::Invocable;

static NEXT_SIGNAL_ID: AtomicUsize = AtomicUsize::new(0);

/// A unique identifier for a signal. Connections keep it as their back-reference to the
/// signal that created them; it is never used to reach the signal itself.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SignalId(usize);

impl SignalId {
    fn next() -> Self { Self(NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed)) }
}

impl From<SignalId> for usize {
    fn from(id: SignalId) -> Self { id.0 }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// An ordered set of connections for one call signature: targets take an `A` and return an `R`.
///
/// Targets are called in the order they were connected. Several arguments are passed as a tuple,
/// e.g. `Signal<(&str, bool)>`. Targets are borrowed for `'a`, never owned.
///
/// Cloning a signal copies its connections; the copies still report the original signal as
/// [`Connection::signal_id`], so a handle returned by the original also disconnects from the clone.
/// [`take`](Self::take) moves the connections out and leaves the signal empty.
pub struct Signal<'a, A, R = ()> {
    id: SignalId,
    connections: Vec<Connection<'a, A, R>>,
}

impl<A, R> Default for Signal<'_, A, R> {
    fn default() -> Self { Self::new() }
}

impl<'a, A, R> Signal<'a, A, R> {
    /// Creates an empty signal
    pub fn new() -> Self { Self::with_capacity(0) }

    /// Creates an empty signal with room for `capacity` connections
    pub fn with_capacity(capacity: usize) -> Self { Self { id: SignalId::next(), connections: Vec::with_capacity(capacity) } }

    /// Get the unique identifier for this signal
    pub fn id(&self) -> SignalId { self.id }

    pub fn count(&self) -> usize { self.connections.len() }

    pub fn is_empty(&self) -> bool { self.connections.is_empty() }

    /// Iterates the connections in invocation order
    pub fn connections(&self) -> std::slice::Iter<'_, Connection<'a, A, R>> { self.connections.iter() }

    pub fn contains(&self, connection: &Connection<'a, A, R>) -> bool { self.connections.contains(connection) }

    /// Connects an invocable held by reference: a closure, a functor, a boxed function or a channel sender.
    pub fn connect<T>(&mut self, target: &'a T) -> Connection<'a, A, R>
    where T: Invocable<A, R> {
        self.push(Connection::invocable(self.id, target))
    }

    /// Connects a free or associated function
    pub fn connect_fn(&mut self, function: fn(A) -> R) -> Connection<'a, A, R> { self.push(Connection::function(self.id, function)) }

    /// Connects a `&self` method of `instance`
    pub fn connect_method<T>(&mut self, instance: &'a T, method: fn(&T, A) -> R) -> Connection<'a, A, R> {
        self.push(Connection::method(self.id, instance, method))
    }

    /// Connects a `&mut self` method of the value inside `instance`. The cell is borrowed mutably for each call.
    pub fn connect_method_mut<T>(&mut self, instance: &'a RefCell<T>, method: fn(&mut T, A) -> R) -> Connection<'a, A, R> {
        self.push(Connection::method_mut(self.id, instance, method))
    }

    fn push(&mut self, connection: Connection<'a, A, R>) -> Connection<'a, A, R> {
        self.connections.push(connection);
        debug!(signal = %self.id, kind = ?connection.kind(), count = self.connections.len(), "connected");
        connection
    }

    /// Disconnects the first connection to `target`. Returns whether one was found.
    pub fn disconnect<T>(&mut self, target: &T) -> bool
    where T: Invocable<A, R> {
        self.remove_first(|connection| connection.targets(target))
    }

    /// Disconnects the first connection to `function`. See [`Connection::targets_fn`] for how functions are compared.
    pub fn disconnect_fn(&mut self, function: fn(A) -> R) -> bool { self.remove_first(|connection| connection.targets_fn(function)) }

    pub fn disconnect_method<T>(&mut self, instance: &T, method: fn(&T, A) -> R) -> bool {
        self.remove_first(|connection| connection.targets_method(instance, method))
    }

    pub fn disconnect_method_mut<T>(&mut self, instance: &RefCell<T>, method: fn(&mut T, A) -> R) -> bool {
        self.remove_first(|connection| connection.targets_method_mut(instance, method))
    }

    /// Removes the first connection equal to `connection`
    pub fn disconnect_connection(&mut self, connection: &Connection<'a, A, R>) -> bool {
        self.remove_first(|candidate| candidate == connection)
    }

    fn remove_first(&mut self, matches: impl Fn(&Connection<'a, A, R>) -> bool) -> bool {
        match self.connections.iter().position(matches) {
            Some(index) => {
                let removed = self.connections.remove(index);
                debug!(signal = %self.id, kind = ?removed.kind(), count = self.connections.len(), "disconnected");
                true
            }
            None => {
                trace!(signal = %self.id, "nothing to disconnect");
                false
            }
        }
    }

    /// Removes all connections
    pub fn clear(&mut self) {
        debug!(signal = %self.id, count = self.connections.len(), "clearing connections");
        self.connections.clear();
    }

    /// Moves every connection into a new signal, leaving this one empty
    pub fn take(&mut self) -> Self { std::mem::take(self) }
}

impl<A: Clone, R> Signal<'_, A, R> {
    /// Calls every connection in order, discarding return values.
    ///
    /// Returns how many connections were invoked. Stops at the first failing connection.
    pub fn emit(&self, args: A) -> Result<usize, SignalError> { self.dispatch(args, |_, _| ()) }

    /// Calls every connection in order, writing connection `i`'s return value to `results[i]`.
    ///
    /// `results` must hold at least [`count`](Self::count) slots; a shorter buffer fails with
    /// [`SignalError::Capacity`] before any target runs.
    pub fn emit_collect(&self, results: &mut [R], args: A) -> Result<usize, SignalError> {
        if results.len() < self.connections.len() {
            return Err(SignalError::Capacity { required: self.connections.len(), capacity: results.len() });
        }
        self.dispatch(args, |index, value| results[index] = value)
    }

    /// Calls every connection in order and returns their results in the same order
    pub fn collect(&self, args: A) -> Result<Vec<R>, SignalError> {
        let mut results = Vec::with_capacity(self.connections.len());
        self.dispatch(args, |_, value| results.push(value))?;
        Ok(results)
    }

    fn dispatch(&self, args: A, mut sink: impl FnMut(usize, R)) -> Result<usize, SignalError> {
        trace!(signal = %self.id, count = self.connections.len(), "emitting");
        // clone the arguments for each connection except the last one
        if let Some((last, rest)) = self.connections.split_last() {
            for (index, connection) in rest.iter().enumerate() {
                sink(index, connection.invoke(args.clone())?);
            }
            sink(rest.len(), last.invoke(args)?);
        }
        Ok(self.connections.len())
    }
}

impl<A, R> Clone for Signal<'_, A, R> {
    fn clone(&self) -> Self { Self { id: SignalId::next(), connections: self.connections.clone() } }
}

impl<A, R> std::fmt::Debug for Signal<'_, A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal").field("id", &self.id).field("connections", &self.connections.len()).finish()
    }
}
