//! Payload record of the bundled Kinesis generic egress.

/// A record for the runtime to hand to a Kinesis producer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KinesisEgressRecord {
    #[prost(string, tag = "1")]
    pub partition_key: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value_bytes: Vec<u8>,
    #[prost(string, tag = "3")]
    pub stream: String,
    #[prost(string, tag = "4")]
    pub explicit_hash_key: String,
}

impl ::prost::Name for KinesisEgressRecord {
    const NAME: &'static str = "KinesisEgressRecord";
    const PACKAGE: &'static str = "io.statefun.sdk.egress";

    fn full_name() -> String {
        "io.statefun.sdk.egress.KinesisEgressRecord".into()
    }
}
