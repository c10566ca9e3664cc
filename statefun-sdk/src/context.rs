//! The per-invocation context handed to stateful functions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use statefun_proto::request_reply::from_function::{
    DelayedInvocation, EgressMessage as ProtoEgressMessage, Invocation,
};

use crate::io::EgressMessage;
use crate::{Address, Message};

/// Signals that the enclosing request was cancelled: its deadline passed, the
/// client disconnected, or the host initiated an abort.
///
/// The executor checks the token between invocations; long-running handlers
/// are expected to observe it themselves through
/// [Context::is_cancelled](Context::is_cancelled) and return promptly.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    /// Fires the cancellation signal. Irrevocable.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The outbound records collected while a batch executes, in the order they
/// were produced.
#[derive(Default)]
pub(crate) struct Effects {
    pub(crate) outgoing_messages: Vec<Invocation>,
    pub(crate) delayed_invocations: Vec<DelayedInvocation>,
    pub(crate) outgoing_egresses: Vec<ProtoEgressMessage>,
}

/// Context for a single invocation of a stateful function.
///
/// The context may be used to obtain the [Address] of the function of the
/// current invocation or the calling function (if the function was invoked by
/// another function), to send messages and egress records, and to observe the
/// cancellation scope of the enclosing request.
pub struct Context<'a> {
    self_address: &'a Address,
    caller_address: Option<Address>,
    effects: &'a Mutex<Effects>,
    cancellation: &'a CancellationToken,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        self_address: &'a Address,
        caller_address: Option<Address>,
        effects: &'a Mutex<Effects>,
        cancellation: &'a CancellationToken,
    ) -> Context<'a> {
        Context {
            self_address,
            caller_address,
            effects,
            cancellation,
        }
    }

    /// Returns the [Address] of the stateful function that is being called.
    /// This is the statefun equivalent of `self`.
    pub fn self_address(&self) -> &Address {
        self.self_address
    }

    /// Returns the [Address] of the stateful function that caused this
    /// invocation, or `None` if the message arrived from an ingress.
    pub fn caller_address(&self) -> Option<&Address> {
        self.caller_address.as_ref()
    }

    /// Sends a message to the stateful function identified by its target.
    /// A message built with a delay lands in the delayed queue.
    pub fn send(&self, message: Message) {
        match message.delay {
            Some(delay) => self.push_delayed(delay, message),
            None => {
                let mut effects = self.effects.lock().unwrap();
                effects.outgoing_messages.push(Invocation {
                    target: Some(message.target),
                    argument: Some(message.typed_value),
                });
            }
        }
    }

    /// Sends a message to the stateful function identified by its target
    /// after the given delay.
    pub fn send_after(&self, delay: Duration, message: Message) {
        self.push_delayed(delay, message);
    }

    /// Sends a record to an egress.
    pub fn send_egress(&self, egress: EgressMessage) {
        let mut effects = self.effects.lock().unwrap();
        effects.outgoing_egresses.push(egress.message);
    }

    /// Whether the enclosing request has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    fn push_delayed(&self, delay: Duration, message: Message) {
        let mut effects = self.effects.lock().unwrap();
        effects.delayed_invocations.push(DelayedInvocation {
            target: Some(message.target),
            delay_in_ms: delay.as_millis() as i64,
            argument: Some(message.typed_value),
            ..DelayedInvocation::default()
        });
    }
}
