/// Something a signal can call by reference with the signal's arguments.
///
/// Implemented for every `Fn(A) -> R` (closures, functors, `Box<dyn Fn>`)
/// and, for signals returning `()`, for channel senders.
pub trait Invocable<A, R> {
    /// Calls the target with the emitted arguments
    fn invoke(&self, args: A) -> R;
}

// Closures and anything else callable
impl<F, A, R> Invocable<A, R> for F
where F: Fn(A) -> R
{
    fn invoke(&self, args: A) -> R { self(args) }
}

impl<A> Invocable<A, ()> for std::sync::mpsc::Sender<A> {
    fn invoke(&self, args: A) {
        let _ = self.send(args); // Ignore send errors
    }
}

#[cfg(feature = "tokio")]
impl<A> Invocable<A, ()> for tokio::sync::mpsc::UnboundedSender<A> {
    fn invoke(&self, args: A) {
        let _ = self.send(args); // Ignore send errors
    }
}
