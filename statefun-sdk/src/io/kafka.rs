//! Egress builder for the bundled Kafka generic egress.

use prost::Message as _;

use statefun_proto::kafka_egress::KafkaProducerRecord;

use crate::error::{InvalidEnvelope, TypeError};
use crate::io::{EgressMessage, EgressValue};
use crate::serialization::Type;
use crate::TypeName;

/// The cross-SDK type URL under which Kafka producer records travel.
const KAFKA_PRODUCER_RECORD_TYPENAME: &str =
    "type.googleapis.com/io.statefun.sdk.egress.KafkaProducerRecord";

/// Builds a record for a Kafka generic egress: a topic, an optional key, and
/// a value.
///
/// The value can be supplied as an [EgressValue] (strings, raw bytes, and the
/// fixed-width numerics) or serialized with an explicit [Type].
pub struct KafkaEgressBuilder {
    target: TypeName,
    topic: Option<String>,
    key: Option<String>,
    value: Option<Result<Vec<u8>, TypeError>>,
}

impl KafkaEgressBuilder {
    /// Starts a record for the given egress.
    pub fn new(target: TypeName) -> KafkaEgressBuilder {
        KafkaEgressBuilder {
            target,
            topic: None,
            key: None,
            value: None,
        }
    }

    /// The Kafka topic to produce to. Required.
    pub fn with_topic(mut self, topic: &str) -> KafkaEgressBuilder {
        self.topic = Some(topic.to_owned());
        self
    }

    /// The record key.
    pub fn with_key(mut self, key: &str) -> KafkaEgressBuilder {
        self.key = Some(key.to_owned());
        self
    }

    /// Supplies the record value; its bytes are inferred from the Rust type.
    pub fn with_value<T: EgressValue>(mut self, value: T) -> KafkaEgressBuilder {
        self.value = Some(Ok(value.to_egress_bytes()));
        self
    }

    /// Supplies the record value serialized with an explicit type.
    pub fn with_typed_value<S: Type>(
        mut self,
        value_type: &S,
        value: &S::Value,
    ) -> KafkaEgressBuilder {
        let mut bytes = Vec::new();
        let result = value_type.serialize(&mut bytes, value).map(|_| bytes);
        self.value = Some(result);
        self
    }

    /// Builds the record.
    pub fn build(self) -> Result<EgressMessage, InvalidEnvelope> {
        let topic = match self.topic {
            Some(topic) if !topic.is_empty() => topic,
            _ => return Err(InvalidEnvelope::MissingTopic),
        };

        let value_bytes = match self.value {
            Some(Ok(bytes)) => bytes,
            Some(Err(err)) => return Err(InvalidEnvelope::SerializationFailure(err)),
            None => return Err(InvalidEnvelope::MissingValue),
        };

        let record = KafkaProducerRecord {
            key: self.key.unwrap_or_default(),
            value_bytes,
            topic,
        };

        Ok(EgressMessage::new(
            self.target,
            KAFKA_PRODUCER_RECORD_TYPENAME,
            record.encode_to_vec(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use prost::Message as _;

    use super::*;

    #[test]
    fn kafka_record_round_trips_through_its_payload() -> anyhow::Result<()> {
        let egress = KafkaEgressBuilder::new(TypeName::parse("e/kafka")?)
            .with_topic("out")
            .with_key("abc")
            .with_value(133742i32)
            .build()?;

        assert_eq!(egress.message.egress_namespace, "e");
        assert_eq!(egress.message.egress_type, "kafka");

        let argument = egress.message.argument.unwrap();
        assert_eq!(argument.typename, KAFKA_PRODUCER_RECORD_TYPENAME);

        let record = KafkaProducerRecord::decode(argument.value.as_slice())?;
        assert_eq!(record.topic, "out");
        assert_eq!(record.key, "abc");
        assert_eq!(record.value_bytes, [0x00, 0x02, 0x0A, 0x9E]);

        Ok(())
    }

    #[test]
    fn string_values_pass_through_as_utf8() -> anyhow::Result<()> {
        let egress = KafkaEgressBuilder::new(TypeName::parse("e/kafka")?)
            .with_topic("out")
            .with_value("hello there")
            .build()?;

        let argument = egress.message.argument.unwrap();
        let record = KafkaProducerRecord::decode(argument.value.as_slice())?;
        assert_eq!(record.value_bytes, b"hello there");
        assert_eq!(record.key, "");

        Ok(())
    }

    #[test]
    fn a_kafka_record_requires_a_topic() -> anyhow::Result<()> {
        let result = KafkaEgressBuilder::new(TypeName::parse("e/kafka")?)
            .with_value(1i32)
            .build();

        assert!(matches!(result, Err(InvalidEnvelope::MissingTopic)));

        Ok(())
    }

    #[test]
    fn a_kafka_record_requires_a_value() -> anyhow::Result<()> {
        let result = KafkaEgressBuilder::new(TypeName::parse("e/kafka")?)
            .with_topic("out")
            .build();

        assert!(matches!(result, Err(InvalidEnvelope::MissingValue)));

        Ok(())
    }
}
