//! Payload record of the bundled Kafka generic egress.

/// A record for the runtime to hand to a Kafka producer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KafkaProducerRecord {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value_bytes: Vec<u8>,
    #[prost(string, tag = "3")]
    pub topic: String,
}

impl ::prost::Name for KafkaProducerRecord {
    const NAME: &'static str = "KafkaProducerRecord";
    const PACKAGE: &'static str = "io.statefun.sdk.egress";

    fn full_name() -> String {
        "io.statefun.sdk.egress.KafkaProducerRecord".into()
    }
}
