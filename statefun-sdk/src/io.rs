//! Egress messages and builders for the bundled egress payload formats.

use statefun_proto::request_reply::from_function::EgressMessage as ProtoEgressMessage;
use statefun_proto::request_reply::TypedValue;

use crate::error::{InvalidEnvelope, TypeError};
use crate::serialization::Type;
use crate::TypeName;

pub mod kafka;
pub mod kinesis;

/// A built, immutable record destined for an egress. Hand it to
/// [Context::send_egress](crate::Context::send_egress).
#[derive(Debug)]
pub struct EgressMessage {
    pub(crate) message: ProtoEgressMessage,
}

impl EgressMessage {
    pub(crate) fn new(target: TypeName, typename: &str, bytes: Vec<u8>) -> EgressMessage {
        EgressMessage {
            message: ProtoEgressMessage {
                egress_namespace: target.namespace().to_owned(),
                egress_type: target.name().to_owned(),
                argument: Some(TypedValue {
                    typename: typename.to_owned(),
                    has_value: true,
                    value: bytes,
                }),
            },
        }
    }
}

/// Values the egress builders can convert to payload bytes without an
/// explicit [Type]: strings become their UTF-8 bytes, byte slices pass
/// through raw, and the fixed-width numerics are written big-endian.
pub trait EgressValue {
    /// The payload bytes of this value.
    fn to_egress_bytes(&self) -> Vec<u8>;
}

impl EgressValue for String {
    fn to_egress_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl EgressValue for &str {
    fn to_egress_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl EgressValue for Vec<u8> {
    fn to_egress_bytes(&self) -> Vec<u8> {
        self.clone()
    }
}

impl EgressValue for &[u8] {
    fn to_egress_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl EgressValue for bool {
    fn to_egress_bytes(&self) -> Vec<u8> {
        vec![*self as u8]
    }
}

impl EgressValue for i32 {
    fn to_egress_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl EgressValue for i64 {
    fn to_egress_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl EgressValue for f32 {
    fn to_egress_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl EgressValue for f64 {
    fn to_egress_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

/// Builder for egress records whose payload is the raw serialized value under
/// the value type's own typename, for egresses that speak a custom format.
pub struct GenericEgressBuilder {
    target: TypeName,
    value: Option<Result<TypedValue, TypeError>>,
}

impl GenericEgressBuilder {
    /// Starts a record for the given egress.
    pub fn new(target: TypeName) -> GenericEgressBuilder {
        GenericEgressBuilder {
            target,
            value: None,
        }
    }

    /// Supplies the value together with its type; both are required.
    pub fn with_typed_value<S: Type>(
        mut self,
        value_type: &S,
        value: &S::Value,
    ) -> GenericEgressBuilder {
        let mut bytes = Vec::new();
        let result = value_type.serialize(&mut bytes, value).map(|_| TypedValue {
            typename: value_type.typename().to_string(),
            has_value: true,
            value: bytes,
        });
        self.value = Some(result);
        self
    }

    /// Builds the record.
    pub fn build(self) -> Result<EgressMessage, InvalidEnvelope> {
        let typed_value = match self.value {
            Some(Ok(typed_value)) => typed_value,
            Some(Err(err)) => return Err(InvalidEnvelope::SerializationFailure(err)),
            None => return Err(InvalidEnvelope::MissingValue),
        };

        Ok(EgressMessage {
            message: ProtoEgressMessage {
                egress_namespace: self.target.namespace().to_owned(),
                egress_type: self.target.name().to_owned(),
                argument: Some(typed_value),
            },
        })
    }
}
