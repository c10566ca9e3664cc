use std::time::Duration;

use statefun_proto::request_reply::{Address as ProtoAddress, TypedValue};

use crate::error::{InvalidEnvelope, TypeError};
use crate::serialization::{
    BoolType, Float32Type, Float64Type, Int32Type, Int64Type, Primitive, StringType, Type,
};
use crate::Address;

/// A typed-value-carrying record destined for a stateful function.
///
/// This is both what a function receives as its invocation argument and what
/// it sends to other functions through the
/// [Context](crate::Context). Build outgoing messages with [MessageBuilder].
#[derive(Debug, Clone)]
pub struct Message {
    pub(crate) target: ProtoAddress,
    pub(crate) typed_value: TypedValue,
    pub(crate) delay: Option<Duration>,
}

impl Message {
    pub(crate) fn from_invocation(target: ProtoAddress, argument: TypedValue) -> Message {
        Message {
            target,
            typed_value: argument,
            delay: None,
        }
    }

    /// Whether the payload was produced by the given type.
    pub fn is<S: Type>(&self, value_type: &S) -> bool {
        self.typed_value.typename == value_type.typename().to_string()
    }

    /// Deserializes the payload with the given type. Fails with a
    /// [TypeError::TypeMismatch] if the payload carries a different typename,
    /// and with a [TypeError::CodecFailure] if the bytes don't parse.
    pub fn get<S: Type>(&self, value_type: &S) -> Result<S::Value, TypeError> {
        if !self.is(value_type) {
            return Err(TypeError::TypeMismatch {
                expected: value_type.typename().to_string(),
                actual: self.typed_value.typename.clone(),
            });
        }

        value_type.deserialize(&mut self.typed_value.value.as_slice())
    }

    /// The cross-SDK typename of the payload.
    pub fn typename(&self) -> &str {
        &self.typed_value.typename
    }

    /// Whether the payload is a cross-SDK boolean.
    pub fn is_bool(&self) -> bool {
        self.is(&BoolType)
    }

    /// The payload as a boolean.
    pub fn as_bool(&self) -> Result<bool, TypeError> {
        self.get(&BoolType)
    }

    /// Whether the payload is a cross-SDK int.
    pub fn is_int32(&self) -> bool {
        self.is(&Int32Type)
    }

    /// The payload as an i32.
    pub fn as_int32(&self) -> Result<i32, TypeError> {
        self.get(&Int32Type)
    }

    /// Whether the payload is a cross-SDK long.
    pub fn is_int64(&self) -> bool {
        self.is(&Int64Type)
    }

    /// The payload as an i64.
    pub fn as_int64(&self) -> Result<i64, TypeError> {
        self.get(&Int64Type)
    }

    /// Whether the payload is a cross-SDK float.
    pub fn is_float32(&self) -> bool {
        self.is(&Float32Type)
    }

    /// The payload as an f32.
    pub fn as_float32(&self) -> Result<f32, TypeError> {
        self.get(&Float32Type)
    }

    /// Whether the payload is a cross-SDK double.
    pub fn is_float64(&self) -> bool {
        self.is(&Float64Type)
    }

    /// The payload as an f64.
    pub fn as_float64(&self) -> Result<f64, TypeError> {
        self.get(&Float64Type)
    }

    /// Whether the payload is a cross-SDK string.
    pub fn is_string(&self) -> bool {
        self.is(&StringType)
    }

    /// The payload as a string.
    pub fn as_string(&self) -> Result<String, TypeError> {
        self.get(&StringType)
    }
}

/// Builds a [Message] for another function, validating it along the way.
///
/// The value can be supplied either as a [Primitive] (the wire type is
/// inferred from the Rust type) or together with an explicit [Type] for
/// everything else.
pub struct MessageBuilder {
    target: Address,
    typed_value: Option<Result<TypedValue, TypeError>>,
    delay: Option<Duration>,
}

impl MessageBuilder {
    /// Starts a message to the given target instance.
    pub fn new(target: Address) -> MessageBuilder {
        MessageBuilder {
            target,
            typed_value: None,
            delay: None,
        }
    }

    /// Supplies a primitive value; its wire type is inferred from the Rust
    /// type.
    pub fn with_value<T: Primitive>(mut self, value: T) -> MessageBuilder {
        self.typed_value = Some(Ok(TypedValue {
            typename: T::typename().to_owned(),
            has_value: true,
            value: value.to_bytes(),
        }));
        self
    }

    /// Supplies a value serialized with an explicit type.
    pub fn with_typed_value<S: Type>(mut self, value_type: &S, value: &S::Value) -> MessageBuilder {
        let mut bytes = Vec::new();
        let result = value_type.serialize(&mut bytes, value).map(|_| TypedValue {
            typename: value_type.typename().to_string(),
            has_value: true,
            value: bytes,
        });
        self.typed_value = Some(result);
        self
    }

    /// Asks the runtime to deliver the message only after the given delay.
    pub fn with_delay(mut self, delay: Duration) -> MessageBuilder {
        self.delay = Some(delay);
        self
    }

    /// Builds the message. Fails if no value was supplied, if serialization
    /// failed, or if the target id is empty.
    pub fn build(self) -> Result<Message, InvalidEnvelope> {
        if self.target.id.is_empty() {
            return Err(InvalidEnvelope::MissingTarget);
        }

        let typed_value = match self.typed_value {
            Some(Ok(typed_value)) => typed_value,
            Some(Err(err)) => return Err(InvalidEnvelope::SerializationFailure(err)),
            None => return Err(InvalidEnvelope::MissingValue),
        };

        Ok(Message {
            target: self.target.to_proto(),
            typed_value,
            delay: self.delay,
        })
    }
}
