//! An SDK for writing "stateful functions" in Rust, for use with an [Apache
//! Flink Stateful Functions](https://flink.apache.org/stateful-functions.html)
//! (Statefun) style runtime speaking the request/reply protocol.
//!
//! # Examples
//!
//! The following shows how to write a simple stateful function and serve it
//! for use in a Statefun deployment.
//!
//! ```no_run
//! use statefun::transport::hyper::HyperHttpTransport;
//! use statefun::transport::Transport;
//! use statefun::{
//!     specs, AddressScopedStorage, Context, FunctionRegistry, Int32Type, Message,
//!     MessageBuilder, StatefulFunctionSpec, TypeName, ValueSpec,
//! };
//!
//! let mut registry = FunctionRegistry::new();
//!
//! let seen = ValueSpec::new("seen", Int32Type);
//! let states = specs![seen];
//!
//! registry.with_spec(StatefulFunctionSpec {
//!     function_type: TypeName::parse("example/greeter")?,
//!     states,
//!     function: Box::new(
//!         move |context: &Context<'_>,
//!               storage: &AddressScopedStorage,
//!               _message: Message|
//!               -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!             let count = storage.get(&seen).unwrap_or(0) + 1;
//!             storage.set(&seen, &count);
//!
//!             context.send(
//!                 MessageBuilder::new(context.self_address().clone())
//!                     .with_value(count)
//!                     .build()?,
//!             );
//!
//!             Ok(())
//!         },
//!     ),
//! })?;
//!
//! let hyper_transport = HyperHttpTransport::new("0.0.0.0:5000".parse()?);
//! hyper_transport.run(registry.as_handler())?;
//!
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! The program creates a [FunctionRegistry], which can be used to register
//! one or more functions together with the [ValueSpec]s of their persisted
//! values. Then we register a closure as a stateful function; anything
//! implementing [StatefulFunction] works the same way. Finally, we snapshot
//! the registry into a [RequestReplyHandler] and hand it to a
//! [Transport](crate::transport::Transport), in this case the
//! [HyperHttpTransport](crate::transport::hyper::HyperHttpTransport), to
//! serve our stateful function.
//!
//! The handler can also be driven directly through
//! [RequestReplyHandler::invoke], which takes the raw bytes of a `ToFunction`
//! and returns the bytes of a `FromFunction`. That is the hook for mounting
//! stateful functions on other HTTP frameworks or on function-as-a-service
//! platforms.
//!
//! Refer to the Stateful Functions
//! [documentation](https://ci.apache.org/projects/flink/flink-statefun-docs-master/)
//! to learn how to use this in a deployment. Especially the
//! [modules documentation](https://ci.apache.org/projects/flink/flink-statefun-docs-master/sdk/modules.html#remote-module)
//! is pertinent.

#![deny(missing_docs)]

pub use crate::address::Address;
pub use crate::context::{CancellationToken, Context};
pub use crate::error::{
    InvalidEnvelope, InvocationError, RegistrationError, TypeError, TypeNameParseError,
};
pub use crate::expiration::Expiration;
pub use crate::function_registry::{FunctionRegistry, StatefulFunction, StatefulFunctionSpec};
pub use crate::invocation_bridge::RequestReplyHandler;
pub use crate::message::{Message, MessageBuilder};
pub use crate::serialization::{
    BoolType, Float32Type, Float64Type, Int32Type, Int64Type, JsonType, Primitive, ProtobufType,
    StringType, Type,
};
pub use crate::storage::AddressScopedStorage;
pub use crate::type_name::TypeName;
pub use crate::value_spec::{ValueSpec, ValueSpecBase};

mod address;
mod context;
mod error;
mod executor;
mod expiration;
mod function_registry;
mod invocation_bridge;
mod macros;
mod message;
mod serialization;
mod storage;
mod type_name;
mod value_spec;

pub mod io;
pub mod transport;
