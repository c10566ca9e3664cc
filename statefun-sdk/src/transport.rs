//! `Transport`s expose a [RequestReplyHandler] to the runtime, typically as
//! an HTTP endpoint.

use crate::invocation_bridge::RequestReplyHandler;

pub mod hyper;

/// Serves a [RequestReplyHandler] so that a Stateful Functions runtime can
/// reach it.
pub trait Transport {
    /// The error type of this transport.
    type Error;

    /// Serves the given handler, blocking until shutdown.
    fn run(self, handler: RequestReplyHandler) -> Result<(), Self::Error>;
}
