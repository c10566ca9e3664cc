//! Egress builder for the bundled Kinesis generic egress.

use prost::Message as _;

use statefun_proto::kinesis_egress::KinesisEgressRecord;

use crate::error::{InvalidEnvelope, TypeError};
use crate::io::{EgressMessage, EgressValue};
use crate::serialization::Type;
use crate::TypeName;

/// The cross-SDK type URL under which Kinesis egress records travel.
const KINESIS_EGRESS_RECORD_TYPENAME: &str =
    "type.googleapis.com/io.statefun.sdk.egress.KinesisEgressRecord";

/// Builds a record for a Kinesis generic egress: a destination stream, a
/// partition key, an optional explicit hash key, and a value.
pub struct KinesisEgressBuilder {
    target: TypeName,
    stream: Option<String>,
    partition_key: Option<String>,
    explicit_hash_key: Option<String>,
    value: Option<Result<Vec<u8>, TypeError>>,
}

impl KinesisEgressBuilder {
    /// Starts a record for the given egress.
    pub fn new(target: TypeName) -> KinesisEgressBuilder {
        KinesisEgressBuilder {
            target,
            stream: None,
            partition_key: None,
            explicit_hash_key: None,
            value: None,
        }
    }

    /// The Kinesis stream to produce to. Required.
    pub fn with_stream(mut self, stream: &str) -> KinesisEgressBuilder {
        self.stream = Some(stream.to_owned());
        self
    }

    /// The partition key of the record. Required.
    pub fn with_partition_key(mut self, partition_key: &str) -> KinesisEgressBuilder {
        self.partition_key = Some(partition_key.to_owned());
        self
    }

    /// An explicit hash key overriding the partition-key hashing.
    pub fn with_explicit_hash_key(mut self, explicit_hash_key: &str) -> KinesisEgressBuilder {
        self.explicit_hash_key = Some(explicit_hash_key.to_owned());
        self
    }

    /// Supplies the record value; its bytes are inferred from the Rust type.
    pub fn with_value<T: EgressValue>(mut self, value: T) -> KinesisEgressBuilder {
        self.value = Some(Ok(value.to_egress_bytes()));
        self
    }

    /// Supplies the record value serialized with an explicit type.
    pub fn with_typed_value<S: Type>(
        mut self,
        value_type: &S,
        value: &S::Value,
    ) -> KinesisEgressBuilder {
        let mut bytes = Vec::new();
        let result = value_type.serialize(&mut bytes, value).map(|_| bytes);
        self.value = Some(result);
        self
    }

    /// Builds the record.
    pub fn build(self) -> Result<EgressMessage, InvalidEnvelope> {
        let stream = match self.stream {
            Some(stream) if !stream.is_empty() => stream,
            _ => return Err(InvalidEnvelope::MissingStream),
        };

        let partition_key = match self.partition_key {
            Some(partition_key) if !partition_key.is_empty() => partition_key,
            _ => return Err(InvalidEnvelope::MissingPartitionKey),
        };

        let value_bytes = match self.value {
            Some(Ok(bytes)) => bytes,
            Some(Err(err)) => return Err(InvalidEnvelope::SerializationFailure(err)),
            None => return Err(InvalidEnvelope::MissingValue),
        };

        let record = KinesisEgressRecord {
            partition_key,
            value_bytes,
            stream,
            explicit_hash_key: self.explicit_hash_key.unwrap_or_default(),
        };

        Ok(EgressMessage::new(
            self.target,
            KINESIS_EGRESS_RECORD_TYPENAME,
            record.encode_to_vec(),
        ))
    }
}
