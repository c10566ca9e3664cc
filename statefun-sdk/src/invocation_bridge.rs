//! A bridge between the protocol messages and the SDK: decodes `ToFunction`,
//! dispatches the batch to the registered function, and encodes the resulting
//! `FromFunction`. For use by `Transport`s.

use std::collections::HashMap;

use prost::Message as _;

use statefun_proto::request_reply::to_function::Request;
use statefun_proto::request_reply::ToFunction;

use crate::context::CancellationToken;
use crate::error::InvocationError;
use crate::executor::Executor;
use crate::function_registry::RegisteredFunction;
use crate::{Address, TypeName};

/// An immutable snapshot of a [FunctionRegistry](crate::FunctionRegistry),
/// exposing the raw binary request/reply entry point.
///
/// `invoke` is transport-agnostic: anything that can hand over the bytes of a
/// `ToFunction` can serve stateful functions with it, be that the bundled
/// [hyper transport](crate::transport::hyper::HyperHttpTransport) or a
/// function-as-a-service host with a `(context, bytes) -> (bytes, error)`
/// calling convention.
pub struct RequestReplyHandler {
    pub(crate) functions: HashMap<TypeName, RegisteredFunction>,
}

impl RequestReplyHandler {
    /// Processes one encoded `ToFunction` and returns the encoded
    /// `FromFunction`.
    ///
    /// The cancellation token bounds the execution to the enclosing request:
    /// once it fires, the batch is abandoned between invocations and
    /// [InvocationError::Cancelled] is returned instead of response bytes.
    pub fn invoke(
        &self,
        cancellation: &CancellationToken,
        payload: &[u8],
    ) -> Result<Vec<u8>, InvocationError> {
        let to_function = ToFunction::decode(payload).map_err(InvocationError::MalformedRequest)?;

        let batch = match to_function.request {
            Some(Request::Invocation(batch)) => batch,
            None => return Err(InvocationError::MissingBatch),
        };

        let target = Address::from_proto(&batch.target.clone().unwrap_or_default());
        log::debug!(
            "processing batch of {} invocation(s) for {}",
            batch.invocations.len(),
            target
        );

        let registered = self
            .functions
            .get(&target.function_type)
            .ok_or_else(|| InvocationError::UnknownFunctionType(target.function_type.clone()))?;

        let executor = Executor::new(
            target,
            batch,
            registered.function.as_ref(),
            &registered.specs,
            cancellation,
        );
        let from_function = executor.run()?;

        Ok(from_function.encode_to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::time::Duration;

    use prost::Message as _;

    use statefun_proto::request_reply::from_function::persisted_value_mutation::MutationType;
    use statefun_proto::request_reply::from_function::{InvocationResponse, Response};
    use statefun_proto::request_reply::to_function::{
        InvocationBatchRequest, Invocation, PersistedValue, Request,
    };
    use statefun_proto::request_reply::{FromFunction, ToFunction, TypedValue};

    use crate::io::kafka::KafkaEgressBuilder;
    use crate::io::kinesis::KinesisEgressBuilder;
    use crate::serialization::{Int32Type, StringType, Type};
    use crate::{
        specs, Address, AddressScopedStorage, CancellationToken, Context, FunctionRegistry,
        Message, MessageBuilder, StatefulFunctionSpec, TypeName, ValueSpec,
    };

    type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

    fn seen_spec() -> ValueSpec<i32> {
        ValueSpec::new("seen", Int32Type)
    }

    /// The counter function used by most scenarios: bumps `seen`, forwards
    /// the new count, sends a delayed owl message, and emits one Kafka and
    /// one Kinesis record.
    fn greeter(
        context: &Context<'_>,
        storage: &AddressScopedStorage,
        message: Message,
    ) -> HandlerResult {
        if message.is_string() {
            message.as_string()?;
        }

        let seen = seen_spec();
        let count = storage.get(&seen).unwrap_or(0) + 1;
        storage.set(&seen, &count);

        context.send(
            MessageBuilder::new(Address::new(TypeName::parse("org.foo/greeter-java")?, "0"))
                .with_value(count)
                .build()?,
        );

        context.send_after(
            Duration::from_secs(60 * 60),
            MessageBuilder::new(Address::new(TypeName::parse("night/owl")?, "1"))
                .with_value("hoo hoo")
                .build()?,
        );

        context.send_egress(
            KafkaEgressBuilder::new(TypeName::parse("e/kafka")?)
                .with_topic("out")
                .with_key("abc")
                .with_value(133742i32)
                .build()?,
        );

        context.send_egress(
            KinesisEgressBuilder::new(TypeName::parse("e/kinesis")?)
                .with_stream("out")
                .with_partition_key("abc")
                .with_value("hello there")
                .build()?,
        );

        Ok(())
    }

    fn greeter_handler() -> anyhow::Result<super::RequestReplyHandler> {
        let mut registry = FunctionRegistry::new();
        registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("org.foo/greeter")?,
            states: specs![seen_spec()],
            function: Box::new(greeter),
        })?;
        Ok(registry.as_handler())
    }

    fn typed_value<S: Type>(value_type: &S, value: &S::Value) -> TypedValue {
        let mut bytes = Vec::new();
        value_type.serialize(&mut bytes, value).unwrap();
        TypedValue {
            typename: value_type.typename().to_string(),
            has_value: true,
            value: bytes,
        }
    }

    fn absent_value(typename: &str) -> TypedValue {
        TypedValue {
            typename: typename.to_owned(),
            has_value: false,
            value: vec![],
        }
    }

    fn batch_bytes(
        target: &str,
        state: Vec<PersistedValue>,
        arguments: Vec<TypedValue>,
    ) -> anyhow::Result<Vec<u8>> {
        let target = Address::new(TypeName::parse(target)?, "0");
        let to_function = ToFunction {
            request: Some(Request::Invocation(InvocationBatchRequest {
                target: Some(target.to_proto()),
                state,
                invocations: arguments
                    .into_iter()
                    .map(|argument| Invocation {
                        caller: None,
                        argument: Some(argument),
                    })
                    .collect(),
            })),
        };
        Ok(to_function.encode_to_vec())
    }

    fn invocation_result(encoded: &[u8]) -> anyhow::Result<InvocationResponse> {
        let from_function = FromFunction::decode(encoded)?;
        match from_function.response {
            Some(Response::InvocationResult(result)) => Ok(result),
            other => anyhow::bail!("expected an invocation result, got {:?}", other),
        }
    }

    #[test]
    fn a_batch_produces_mutations_sends_delays_and_egresses() -> anyhow::Result<()> {
        let handler = greeter_handler()?;
        let payload = batch_bytes(
            "org.foo/greeter",
            vec![PersistedValue {
                state_name: "seen".to_owned(),
                state_value: Some(absent_value("io.statefun.types/int")),
            }],
            vec![typed_value(&StringType, &"Hello".to_owned())],
        )?;

        let encoded = handler.invoke(&CancellationToken::new(), &payload)?;
        let result = invocation_result(&encoded)?;

        assert_eq!(result.state_mutations.len(), 1);
        assert_eq!(result.state_mutations[0].state_name, "seen");
        assert_eq!(
            result.state_mutations[0].mutation_type,
            MutationType::Modify as i32
        );
        assert_eq!(
            result.state_mutations[0]
                .state_value
                .as_ref()
                .unwrap()
                .value,
            [0x00, 0x00, 0x00, 0x01]
        );

        let outgoing = &result.outgoing_messages[0];
        let target = outgoing.target.as_ref().unwrap();
        assert_eq!(target.namespace, "org.foo");
        assert_eq!(target.r#type, "greeter-java");
        assert_eq!(target.id, "0");
        assert_eq!(
            outgoing.argument.as_ref().unwrap().typename,
            "io.statefun.types/int"
        );

        assert_eq!(result.delayed_invocations.len(), 1);
        assert_eq!(result.delayed_invocations[0].delay_in_ms, 3_600_000);
        assert_eq!(
            result.delayed_invocations[0]
                .argument
                .as_ref()
                .unwrap()
                .typename,
            "io.statefun.types/string"
        );

        assert_eq!(result.outgoing_egresses.len(), 2);
        assert_eq!(result.outgoing_egresses[0].egress_namespace, "e");
        assert_eq!(result.outgoing_egresses[0].egress_type, "kafka");
        assert_eq!(
            result.outgoing_egresses[0].argument.as_ref().unwrap().typename,
            "type.googleapis.com/io.statefun.sdk.egress.KafkaProducerRecord"
        );

        let kafka_record = statefun_proto::kafka_egress::KafkaProducerRecord::decode(
            result.outgoing_egresses[0]
                .argument
                .as_ref()
                .unwrap()
                .value
                .as_slice(),
        )?;
        assert_eq!(kafka_record.topic, "out");
        assert_eq!(kafka_record.key, "abc");
        assert_eq!(kafka_record.value_bytes, [0x00, 0x02, 0x0A, 0x9E]);

        assert_eq!(result.outgoing_egresses[1].egress_type, "kinesis");

        Ok(())
    }

    #[test]
    fn state_accumulates_across_invocations_in_one_batch() -> anyhow::Result<()> {
        let handler = greeter_handler()?;
        let payload = batch_bytes(
            "org.foo/greeter",
            vec![PersistedValue {
                state_name: "seen".to_owned(),
                state_value: Some(typed_value(&Int32Type, &40)),
            }],
            vec![
                typed_value(&StringType, &"Hello".to_owned()),
                typed_value(&StringType, &"again".to_owned()),
            ],
        )?;

        let encoded = handler.invoke(&CancellationToken::new(), &payload)?;
        let result = invocation_result(&encoded)?;

        // One mutation with the final value, not one per set.
        assert_eq!(result.state_mutations.len(), 1);
        assert_eq!(
            result.state_mutations[0]
                .state_value
                .as_ref()
                .unwrap()
                .value,
            42i32.to_be_bytes()
        );

        // And the forwarded counts preserve invocation order.
        let counts: Vec<Vec<u8>> = result
            .outgoing_messages
            .iter()
            .map(|invocation| invocation.argument.as_ref().unwrap().value.clone())
            .collect();
        assert_eq!(counts, vec![41i32.to_be_bytes().to_vec(), 42i32.to_be_bytes().to_vec()]);

        Ok(())
    }

    #[test]
    fn missing_state_short_circuits_without_invoking_the_function() -> anyhow::Result<()> {
        let handler = greeter_handler()?;
        let payload = batch_bytes(
            "org.foo/greeter",
            vec![],
            vec![typed_value(&StringType, &"Hello".to_owned())],
        )?;

        let encoded = handler.invoke(&CancellationToken::new(), &payload)?;
        let from_function = FromFunction::decode(encoded.as_slice())?;

        let context = match from_function.response {
            Some(Response::IncompleteInvocationContext(context)) => context,
            other => anyhow::bail!("expected an incomplete invocation context, got {:?}", other),
        };

        assert_eq!(context.missing_values.len(), 1);
        assert_eq!(context.missing_values[0].state_name, "seen");
        assert_eq!(
            context.missing_values[0].type_typename,
            "io.statefun.types/int"
        );

        Ok(())
    }

    #[test]
    fn the_caller_is_visible_per_invocation() -> anyhow::Result<()> {
        let observed = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let observed_in_handler = std::sync::Arc::clone(&observed);

        let mut registry = FunctionRegistry::new();
        registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("org.foo/watcher")?,
            states: vec![],
            function: Box::new(
                move |context: &Context<'_>,
                      _storage: &AddressScopedStorage,
                      _message: Message|
                      -> HandlerResult {
                    observed_in_handler
                        .lock()
                        .unwrap()
                        .push(context.caller_address().map(|caller| caller.to_string()));
                    Ok(())
                },
            ),
        })?;
        let handler = registry.as_handler();

        let caller = Address::new(TypeName::parse("org.foo/boss")?, "7");
        let to_function = ToFunction {
            request: Some(Request::Invocation(InvocationBatchRequest {
                target: Some(Address::new(TypeName::parse("org.foo/watcher")?, "0").to_proto()),
                state: vec![],
                invocations: vec![
                    Invocation {
                        caller: Some(caller.to_proto()),
                        argument: Some(typed_value(&Int32Type, &1)),
                    },
                    Invocation {
                        caller: None,
                        argument: Some(typed_value(&Int32Type, &2)),
                    },
                ],
            })),
        };

        handler.invoke(&CancellationToken::new(), &to_function.encode_to_vec())?;

        assert_eq!(
            *observed.lock().unwrap(),
            vec![Some("org.foo/boss/7".to_owned()), None]
        );

        Ok(())
    }

    #[test]
    fn unknown_function_types_are_rejected() -> anyhow::Result<()> {
        let handler = greeter_handler()?;
        let payload = batch_bytes("nope/nope", vec![], vec![typed_value(&Int32Type, &1)])?;

        let result = handler.invoke(&CancellationToken::new(), &payload);

        assert!(matches!(
            result,
            Err(crate::InvocationError::UnknownFunctionType(_))
        ));

        Ok(())
    }

    #[test]
    fn garbage_bytes_are_a_malformed_request() -> anyhow::Result<()> {
        let handler = greeter_handler()?;

        let result = handler.invoke(&CancellationToken::new(), &[0xFF, 0xFF, 0xFF, 0x01]);

        assert!(matches!(
            result,
            Err(crate::InvocationError::MalformedRequest(_))
        ));

        Ok(())
    }

    #[test]
    fn a_payload_without_a_batch_is_rejected() -> anyhow::Result<()> {
        let handler = greeter_handler()?;
        let empty = ToFunction { request: None };

        let result = handler.invoke(&CancellationToken::new(), &empty.encode_to_vec());

        assert!(matches!(result, Err(crate::InvocationError::MissingBatch)));

        Ok(())
    }

    #[test]
    fn a_function_error_fails_the_whole_batch() -> anyhow::Result<()> {
        let mut registry = FunctionRegistry::new();
        registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("org.foo/flaky")?,
            states: vec![],
            function: Box::new(
                |_context: &Context<'_>,
                 _storage: &AddressScopedStorage,
                 _message: Message|
                 -> HandlerResult { Err("boom".into()) },
            ),
        })?;
        let handler = registry.as_handler();

        let payload = batch_bytes("org.foo/flaky", vec![], vec![typed_value(&Int32Type, &1)])?;
        let result = handler.invoke(&CancellationToken::new(), &payload);

        match result {
            Err(crate::InvocationError::FunctionFailure { function, source }) => {
                assert_eq!(function.to_string(), "org.foo/flaky");
                assert_eq!(source.to_string(), "boom");
            }
            other => anyhow::bail!("expected a function failure, got {:?}", other.err()),
        }

        Ok(())
    }

    #[test]
    fn a_function_panic_is_contained() -> anyhow::Result<()> {
        let mut registry = FunctionRegistry::new();
        registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("org.foo/crashy")?,
            states: vec![],
            function: Box::new(
                |_context: &Context<'_>,
                 _storage: &AddressScopedStorage,
                 _message: Message|
                 -> HandlerResult { panic!("blew up") },
            ),
        })?;
        let handler = registry.as_handler();

        let payload = batch_bytes("org.foo/crashy", vec![], vec![typed_value(&Int32Type, &1)])?;
        let result = handler.invoke(&CancellationToken::new(), &payload);

        match result {
            Err(crate::InvocationError::FunctionFailure { source, .. }) => {
                assert!(source.to_string().contains("blew up"));
            }
            other => anyhow::bail!("expected a function failure, got {:?}", other.err()),
        }

        Ok(())
    }

    #[test]
    fn a_cancelled_request_produces_no_response_bytes() -> anyhow::Result<()> {
        let handler = greeter_handler()?;
        let payload = batch_bytes(
            "org.foo/greeter",
            vec![PersistedValue {
                state_name: "seen".to_owned(),
                state_value: Some(absent_value("io.statefun.types/int")),
            }],
            vec![typed_value(&StringType, &"Hello".to_owned())],
        )?;

        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let result = handler.invoke(&cancellation, &payload);

        assert!(matches!(result, Err(crate::InvocationError::Cancelled(_))));

        Ok(())
    }
}
