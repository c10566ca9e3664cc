//! The request/reply protocol: `ToFunction` carries an invocation batch from
//! the runtime to a function, `FromFunction` carries the results back.

/// The unique identity of an individual stateful function instance.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Address {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(string, tag = "2")]
    pub r#type: String,
    #[prost(string, tag = "3")]
    pub id: String,
}

/// A byte payload annotated with the cross-SDK typename of its producer.
///
/// `has_value` distinguishes a genuinely empty payload from an absent value;
/// it must be preserved wherever a `TypedValue` travels.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypedValue {
    #[prost(string, tag = "1")]
    pub typename: String,
    #[prost(bool, tag = "2")]
    pub has_value: bool,
    #[prost(bytes = "vec", tag = "3")]
    pub value: Vec<u8>,
}

/// The request message: a batch of invocations for one function instance.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ToFunction {
    #[prost(oneof = "to_function::Request", tags = "100")]
    pub request: Option<to_function::Request>,
}

/// Nested message and enum types in `ToFunction`.
pub mod to_function {
    /// A persisted value handed to the function by the runtime.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PersistedValue {
        #[prost(string, tag = "1")]
        pub state_name: String,
        #[prost(message, optional, tag = "2")]
        pub state_value: Option<super::TypedValue>,
    }

    /// A single invocation: an optional caller and the argument payload.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Invocation {
        #[prost(message, optional, tag = "1")]
        pub caller: Option<super::Address>,
        #[prost(message, optional, tag = "2")]
        pub argument: Option<super::TypedValue>,
    }

    /// The batch: target instance, its persisted values, and the invocations
    /// to apply in order.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct InvocationBatchRequest {
        #[prost(message, optional, tag = "1")]
        pub target: Option<super::Address>,
        #[prost(message, repeated, tag = "2")]
        pub state: Vec<PersistedValue>,
        #[prost(message, repeated, tag = "3")]
        pub invocations: Vec<Invocation>,
    }

    /// The request payload variants.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        /// An invocation batch.
        #[prost(message, tag = "100")]
        Invocation(InvocationBatchRequest),
    }
}

/// The response message: either the results of a completed batch or a report
/// of registered values the runtime failed to provide.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FromFunction {
    #[prost(oneof = "from_function::Response", tags = "100, 101")]
    pub response: Option<from_function::Response>,
}

/// Nested message and enum types in `FromFunction`.
pub mod from_function {
    /// A single state change produced by the batch.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PersistedValueMutation {
        #[prost(
            enumeration = "persisted_value_mutation::MutationType",
            tag = "1"
        )]
        pub mutation_type: i32,
        #[prost(string, tag = "2")]
        pub state_name: String,
        #[prost(message, optional, tag = "3")]
        pub state_value: Option<super::TypedValue>,
    }

    /// Nested message and enum types in `PersistedValueMutation`.
    pub mod persisted_value_mutation {
        /// The kind of state change.
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
        )]
        #[repr(i32)]
        pub enum MutationType {
            /// The value is deleted.
            Delete = 0,
            /// The value is replaced with the carried bytes.
            Modify = 1,
        }
    }

    /// An outgoing message to another function instance.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Invocation {
        #[prost(message, optional, tag = "1")]
        pub target: Option<super::Address>,
        #[prost(message, optional, tag = "2")]
        pub argument: Option<super::TypedValue>,
    }

    /// An outgoing message that the runtime delivers after a delay.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DelayedInvocation {
        #[prost(bool, tag = "10")]
        pub is_cancellation_request: bool,
        #[prost(string, tag = "11")]
        pub cancellation_token: String,
        #[prost(message, optional, tag = "1")]
        pub target: Option<super::Address>,
        #[prost(int64, tag = "2")]
        pub delay_in_ms: i64,
        #[prost(message, optional, tag = "3")]
        pub argument: Option<super::TypedValue>,
    }

    /// An outgoing record for an egress.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EgressMessage {
        #[prost(string, tag = "1")]
        pub egress_namespace: String,
        #[prost(string, tag = "2")]
        pub egress_type: String,
        #[prost(message, optional, tag = "3")]
        pub argument: Option<super::TypedValue>,
    }

    /// State expiration (TTL) configuration of a registered value.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ExpirationSpec {
        #[prost(enumeration = "expiration_spec::ExpireMode", tag = "1")]
        pub mode: i32,
        #[prost(int64, tag = "2")]
        pub expire_after_millis: i64,
    }

    /// Nested message and enum types in `ExpirationSpec`.
    pub mod expiration_spec {
        /// When the expiration clock restarts.
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
        )]
        #[repr(i32)]
        pub enum ExpireMode {
            /// The value never expires.
            None = 0,
            /// Expire a fixed duration after the last invocation.
            AfterInvoke = 1,
            /// Expire a fixed duration after the last write.
            AfterWrite = 2,
        }
    }

    /// The declaration of a registered persisted value.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PersistedValueSpec {
        #[prost(string, tag = "1")]
        pub state_name: String,
        #[prost(message, optional, tag = "2")]
        pub expiration_spec: Option<ExpirationSpec>,
        #[prost(string, tag = "3")]
        pub type_typename: String,
    }

    /// Reports registered values missing from the batch; the runtime is
    /// expected to provision them and retry.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct IncompleteInvocationContext {
        #[prost(message, repeated, tag = "1")]
        pub missing_values: Vec<PersistedValueSpec>,
    }

    /// The results of a completed batch.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct InvocationResponse {
        #[prost(message, repeated, tag = "1")]
        pub state_mutations: Vec<PersistedValueMutation>,
        #[prost(message, repeated, tag = "2")]
        pub outgoing_messages: Vec<Invocation>,
        #[prost(message, repeated, tag = "3")]
        pub delayed_invocations: Vec<DelayedInvocation>,
        #[prost(message, repeated, tag = "4")]
        pub outgoing_egresses: Vec<EgressMessage>,
    }

    /// The response payload variants.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Response {
        /// The batch completed; here are its effects.
        #[prost(message, tag = "100")]
        InvocationResult(InvocationResponse),
        /// The batch was not executed because registered values were missing.
        #[prost(message, tag = "101")]
        IncompleteInvocationContext(IncompleteInvocationContext),
    }
}
