//! The error types of the SDK, one per failure domain.

use thiserror::Error;

use crate::TypeName;

/// A string did not conform to the `namespace/name` format of a [TypeName].
#[derive(Error, Debug, PartialEq, Eq)]
#[error("{input} does not conform to the <namespace>/<name> format")]
pub struct TypeNameParseError {
    input: String,
}

impl TypeNameParseError {
    pub(crate) fn new(input: &str) -> TypeNameParseError {
        TypeNameParseError {
            input: input.to_owned(),
        }
    }
}

/// Errors that can occur while serializing or deserializing typed values.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TypeError {
    /// The payload was produced by a different type than the requested one.
    /// This is a programmer error; the payload is not silently coerced.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Typename of the requested type.
        expected: String,
        /// Typename the payload actually carries.
        actual: String,
    },

    /// The bytes could not be encoded or decoded in the declared format.
    #[error("codec failure")]
    CodecFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TypeError {
    pub(crate) fn codec<E>(cause: E) -> TypeError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TypeError::CodecFailure(Box::new(cause))
    }
}

/// Errors that can occur while registering a function on a
/// [FunctionRegistry](crate::FunctionRegistry).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RegistrationError {
    /// There already is a function registered under the given type.
    #[error("function type {0} is already registered")]
    DuplicateFunctionType(TypeName),

    /// A state name did not conform to the identifier grammar: an alphabet
    /// letter or underscore, followed by zero or more alphanumerics or
    /// underscores.
    #[error("invalid state name {0}: state names can only start with alphabet letters or an underscore, followed by zero or more characters that are alphanumeric or underscores")]
    InvalidStateName(String),

    /// Two value specs on the same function share a name.
    #[error("state name {state} is declared twice on function {function}")]
    DuplicateStateName {
        /// The function being registered.
        function: TypeName,
        /// The offending state name.
        state: String,
    },
}

/// A message or egress builder was asked to build an invalid envelope.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InvalidEnvelope {
    /// A message to a function must target a non-empty id.
    #[error("a message must have a target with a non-empty id")]
    MissingTarget,

    /// No value was supplied to the builder.
    #[error("a message cannot be built without a value")]
    MissingValue,

    /// A Kafka record requires a topic.
    #[error("a Kafka record requires a topic")]
    MissingTopic,

    /// A Kinesis record requires a destination stream.
    #[error("missing destination Kinesis stream")]
    MissingStream,

    /// A Kinesis record requires a partition key.
    #[error("missing partition key")]
    MissingPartitionKey,

    /// The supplied value could not be serialized.
    #[error("failed to serialize the value")]
    SerializationFailure(#[from] TypeError),
}

/// Errors that can occur while processing one invocation batch.
///
/// These surface from [RequestReplyHandler::invoke](crate::RequestReplyHandler::invoke)
/// and become the HTTP status of the reply when served through a transport.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InvocationError {
    /// The `ToFunction` payload could not be decoded.
    #[error("failed to decode ToFunction")]
    MalformedRequest(#[source] prost::DecodeError),

    /// The `ToFunction` payload decoded but carried no invocation batch.
    #[error("the ToFunction payload carried no invocation batch")]
    MissingBatch,

    /// There was no function registered for the batch target.
    #[error("unknown function type {0}")]
    UnknownFunctionType(TypeName),

    /// The function returned an error or panicked; the whole batch fails and
    /// no partial response is emitted.
    #[error("failed to execute invocation for {function}")]
    FunctionFailure {
        /// The function whose handler failed.
        function: TypeName,
        /// The handler's own error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The enclosing request was cancelled before the batch completed.
    #[error("invocation batch for {0} was cancelled")]
    Cancelled(TypeName),
}

impl InvocationError {
    /// Whether the failure was caused by the request rather than by the
    /// registered function.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InvocationError::MalformedRequest(_)
                | InvocationError::MissingBatch
                | InvocationError::UnknownFunctionType(_)
        )
    }
}
