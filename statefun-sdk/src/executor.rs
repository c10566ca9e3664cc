//! Runs one invocation batch against a registered function.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use statefun_proto::request_reply::from_function::{
    IncompleteInvocationContext, InvocationResponse, PersistedValueSpec, Response,
};
use statefun_proto::request_reply::to_function::InvocationBatchRequest;
use statefun_proto::request_reply::FromFunction;

use crate::context::{CancellationToken, Context, Effects};
use crate::error::InvocationError;
use crate::function_registry::StatefulFunction;
use crate::storage::StorageFactory;
use crate::{Address, Message};

/// Executes one batch: hydrates the storage, sequences the invocations, and
/// aggregates the side effects into a `FromFunction`. Consumed by `run`, so a
/// batch cannot be replayed.
pub(crate) struct Executor<'a> {
    target: Address,
    batch: InvocationBatchRequest,
    function: &'a dyn StatefulFunction,
    specs: &'a HashMap<String, PersistedValueSpec>,
    cancellation: &'a CancellationToken,
}

impl<'a> Executor<'a> {
    pub(crate) fn new(
        target: Address,
        batch: InvocationBatchRequest,
        function: &'a dyn StatefulFunction,
        specs: &'a HashMap<String, PersistedValueSpec>,
        cancellation: &'a CancellationToken,
    ) -> Executor<'a> {
        Executor {
            target,
            batch,
            function,
            specs,
            cancellation,
        }
    }

    pub(crate) fn run(self) -> Result<FromFunction, InvocationError> {
        let Executor {
            target,
            batch,
            function,
            specs,
            cancellation,
        } = self;

        let storage = match StorageFactory::new(&batch, specs) {
            StorageFactory::MissingSpecs(missing) => {
                log::debug!(
                    "batch for {} is missing {} registered value(s); asking the runtime to provision",
                    target,
                    missing.len()
                );
                return Ok(FromFunction {
                    response: Some(Response::IncompleteInvocationContext(
                        IncompleteInvocationContext {
                            missing_values: missing,
                        },
                    )),
                });
            }
            StorageFactory::Ready(storage) => storage,
        };

        let effects = Mutex::new(Effects::default());
        let proto_target = target.to_proto();

        for invocation in batch.invocations {
            if cancellation.is_cancelled() {
                return Err(InvocationError::Cancelled(target.function_type.clone()));
            }

            let caller = invocation.caller.as_ref().map(Address::from_proto);
            let context = Context::new(&target, caller, &effects, cancellation);
            let message =
                Message::from_invocation(proto_target.clone(), invocation.argument.unwrap_or_default());

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                function.invoke(&context, &storage, message)
            }));

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(source)) => {
                    return Err(InvocationError::FunctionFailure {
                        function: target.function_type.clone(),
                        source,
                    });
                }
                Err(cause) => {
                    return Err(InvocationError::FunctionFailure {
                        function: target.function_type.clone(),
                        source: panic_message(cause).into(),
                    });
                }
            }
        }

        let effects = effects.into_inner().unwrap();
        let response = InvocationResponse {
            state_mutations: storage.into_state_mutations(),
            outgoing_messages: effects.outgoing_messages,
            delayed_invocations: effects.delayed_invocations,
            outgoing_egresses: effects.outgoing_egresses,
        };

        Ok(FromFunction {
            response: Some(Response::InvocationResult(response)),
        })
    }
}

fn panic_message(cause: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        format!("function panicked: {}", message)
    } else if let Some(message) = cause.downcast_ref::<String>() {
        format!("function panicked: {}", message)
    } else {
        "function panicked".to_owned()
    }
}
