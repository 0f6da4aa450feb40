use thiserror::Error;

/// Errors raised while invoking connections.
///
/// Disconnecting a target that was never connected is not an error; the
/// `disconnect*` family reports that case by returning `false`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
    /// The connection is unbound: default-constructed or already disconnected.
    #[error("connection is not bound to a target")]
    InvalidConnection,

    /// The results buffer passed to `emit_collect` is shorter than the number of connections.
    #[error("results buffer holds {capacity} slots but {required} connections are bound")]
    Capacity { required: usize, capacity: usize },

    /// A `&mut self` method target is already borrowed, e.g. by a reentrant emission.
    #[error("target is already borrowed")]
    TargetBusy,
}
