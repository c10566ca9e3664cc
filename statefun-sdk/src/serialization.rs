//! The cross-SDK value-type system.
//!
//! A [Type] couples a cross-SDK [TypeName] with a serializer whose wire
//! format is byte-exact across the different language SDKs: state written by
//! a function built with this crate can be read back by a function built with
//! any other SDK, and vice versa.

use std::io::{Read, Write};
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TypeError;
use crate::TypeName;

const TYPES_NAMESPACE: &str = "io.statefun.types";

/// A serializer for values exchanged with the runtime, either as message
/// payloads or as persisted state.
///
/// Sinks and sources are byte streams rather than fixed buffers, so large
/// values can be written and read incrementally. Implement this directly to
/// plug in a custom wire format; for common cases use the built-in primitive
/// types, [JsonType], or [ProtobufType].
pub trait Type {
    /// The Rust type this serializer produces and consumes.
    type Value;

    /// The cross-SDK typename identifying this type.
    fn typename(&self) -> TypeName;

    /// Writes `value` to the given sink.
    fn serialize(&self, sink: &mut dyn Write, value: &Self::Value) -> Result<(), TypeError>;

    /// Reads one value back from the given source.
    fn deserialize(&self, source: &mut dyn Read) -> Result<Self::Value, TypeError>;
}

/// The cross-SDK boolean type: one byte, `0x00` or `0x01`.
#[derive(Debug, Clone, Copy)]
pub struct BoolType;

impl Type for BoolType {
    type Value = bool;

    fn typename(&self) -> TypeName {
        TypeName::from_parts_unchecked(TYPES_NAMESPACE, "bool")
    }

    fn serialize(&self, sink: &mut dyn Write, value: &bool) -> Result<(), TypeError> {
        sink.write_all(&[*value as u8]).map_err(TypeError::codec)
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<bool, TypeError> {
        let mut buffer = [0u8; 1];
        source.read_exact(&mut buffer).map_err(TypeError::codec)?;
        Ok(buffer[0] != 0)
    }
}

/// The cross-SDK int type: four bytes, big-endian, signed.
#[derive(Debug, Clone, Copy)]
pub struct Int32Type;

impl Type for Int32Type {
    type Value = i32;

    fn typename(&self) -> TypeName {
        TypeName::from_parts_unchecked(TYPES_NAMESPACE, "int")
    }

    fn serialize(&self, sink: &mut dyn Write, value: &i32) -> Result<(), TypeError> {
        sink.write_all(&value.to_be_bytes()).map_err(TypeError::codec)
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<i32, TypeError> {
        let mut buffer = [0u8; 4];
        source.read_exact(&mut buffer).map_err(TypeError::codec)?;
        Ok(i32::from_be_bytes(buffer))
    }
}

/// The cross-SDK long type: eight bytes, big-endian, signed.
#[derive(Debug, Clone, Copy)]
pub struct Int64Type;

impl Type for Int64Type {
    type Value = i64;

    fn typename(&self) -> TypeName {
        TypeName::from_parts_unchecked(TYPES_NAMESPACE, "long")
    }

    fn serialize(&self, sink: &mut dyn Write, value: &i64) -> Result<(), TypeError> {
        sink.write_all(&value.to_be_bytes()).map_err(TypeError::codec)
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<i64, TypeError> {
        let mut buffer = [0u8; 8];
        source.read_exact(&mut buffer).map_err(TypeError::codec)?;
        Ok(i64::from_be_bytes(buffer))
    }
}

/// The cross-SDK float type: four bytes, IEEE-754, big-endian.
#[derive(Debug, Clone, Copy)]
pub struct Float32Type;

impl Type for Float32Type {
    type Value = f32;

    fn typename(&self) -> TypeName {
        TypeName::from_parts_unchecked(TYPES_NAMESPACE, "float")
    }

    fn serialize(&self, sink: &mut dyn Write, value: &f32) -> Result<(), TypeError> {
        sink.write_all(&value.to_be_bytes()).map_err(TypeError::codec)
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<f32, TypeError> {
        let mut buffer = [0u8; 4];
        source.read_exact(&mut buffer).map_err(TypeError::codec)?;
        Ok(f32::from_be_bytes(buffer))
    }
}

/// The cross-SDK double type: eight bytes, IEEE-754, big-endian.
#[derive(Debug, Clone, Copy)]
pub struct Float64Type;

impl Type for Float64Type {
    type Value = f64;

    fn typename(&self) -> TypeName {
        TypeName::from_parts_unchecked(TYPES_NAMESPACE, "double")
    }

    fn serialize(&self, sink: &mut dyn Write, value: &f64) -> Result<(), TypeError> {
        sink.write_all(&value.to_be_bytes()).map_err(TypeError::codec)
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<f64, TypeError> {
        let mut buffer = [0u8; 8];
        source.read_exact(&mut buffer).map_err(TypeError::codec)?;
        Ok(f64::from_be_bytes(buffer))
    }
}

/// The cross-SDK string type: raw UTF-8 bytes, no length prefix. The length
/// comes from the framing.
#[derive(Debug, Clone, Copy)]
pub struct StringType;

impl Type for StringType {
    type Value = String;

    fn typename(&self) -> TypeName {
        TypeName::from_parts_unchecked(TYPES_NAMESPACE, "string")
    }

    fn serialize(&self, sink: &mut dyn Write, value: &String) -> Result<(), TypeError> {
        sink.write_all(value.as_bytes()).map_err(TypeError::codec)
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<String, TypeError> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes).map_err(TypeError::codec)?;
        String::from_utf8(bytes).map_err(TypeError::codec)
    }
}

/// A [Type] backed by [serde_json], under a user-supplied typename.
///
/// Two `JsonType`s over the same Rust type may carry different typenames;
/// the typename, not the Rust type, is what the other side dispatches on.
pub struct JsonType<T> {
    type_name: TypeName,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonType<T> {
    /// Creates a JSON type carrying the given typename.
    pub fn new(type_name: TypeName) -> JsonType<T> {
        JsonType {
            type_name,
            _marker: PhantomData,
        }
    }
}

impl<T> Type for JsonType<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    fn typename(&self) -> TypeName {
        self.type_name.clone()
    }

    fn serialize(&self, sink: &mut dyn Write, value: &T) -> Result<(), TypeError> {
        serde_json::to_writer(sink, value).map_err(TypeError::codec)
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<T, TypeError> {
        serde_json::from_reader(source).map_err(TypeError::codec)
    }
}

/// A [Type] for protobuf messages, with the typename derived from the
/// message's schema name under the `type.googleapis.com` namespace.
pub struct ProtobufType<M> {
    type_name: TypeName,
    _marker: PhantomData<fn() -> M>,
}

impl<M> ProtobufType<M>
where
    M: prost::Name,
{
    /// Creates a protobuf type for the message `M`.
    pub fn new() -> ProtobufType<M> {
        ProtobufType {
            type_name: TypeName::from_parts_unchecked(
                "type.googleapis.com",
                &format!("{}.{}", M::PACKAGE, M::NAME),
            ),
            _marker: PhantomData,
        }
    }
}

impl<M> Default for ProtobufType<M>
where
    M: prost::Name,
{
    fn default() -> Self {
        ProtobufType::new()
    }
}

impl<M> Type for ProtobufType<M>
where
    M: prost::Message + prost::Name + Default,
{
    type Value = M;

    fn typename(&self) -> TypeName {
        self.type_name.clone()
    }

    fn serialize(&self, sink: &mut dyn Write, value: &M) -> Result<(), TypeError> {
        sink.write_all(&value.encode_to_vec()).map_err(TypeError::codec)
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<M, TypeError> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes).map_err(TypeError::codec)?;
        M::decode(bytes.as_slice()).map_err(TypeError::codec)
    }
}

/// Rust shapes with a fixed cross-SDK primitive encoding, used for value
/// inference in the message and egress builders.
///
/// Platform-width integers (`usize`/`isize`) deliberately have no
/// implementation: their wire width would be ambiguous, so callers must pick
/// `i32` or `i64` explicitly.
pub trait Primitive {
    /// The cross-SDK typename of this primitive.
    fn typename() -> &'static str;

    /// The cross-SDK wire encoding of this value.
    fn to_bytes(&self) -> Vec<u8>;
}

impl Primitive for bool {
    fn typename() -> &'static str {
        "io.statefun.types/bool"
    }

    fn to_bytes(&self) -> Vec<u8> {
        vec![*self as u8]
    }
}

impl Primitive for i32 {
    fn typename() -> &'static str {
        "io.statefun.types/int"
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl Primitive for i64 {
    fn typename() -> &'static str {
        "io.statefun.types/long"
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl Primitive for f32 {
    fn typename() -> &'static str {
        "io.statefun.types/float"
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl Primitive for f64 {
    fn typename() -> &'static str {
        "io.statefun.types/double"
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl Primitive for String {
    fn typename() -> &'static str {
        "io.statefun.types/string"
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Primitive for &str {
    fn typename() -> &'static str {
        "io.statefun.types/string"
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}
