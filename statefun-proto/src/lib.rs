//! Protocol messages exchanged between a Stateful Functions runtime and a
//! remote function, plus the payload records of the bundled egresses.
//!
//! The messages mirror the cross-SDK protobuf schema; they are written out by
//! hand as [prost](https://docs.rs/prost) structs so that building this crate
//! does not require a `protoc` binary.

pub mod kafka_egress;
pub mod kinesis_egress;
pub mod request_reply;
