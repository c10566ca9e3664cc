//! The function registry keeps a mapping from function type to stateful
//! functions.

use std::collections::HashMap;
use std::error::Error;

use statefun_proto::request_reply::from_function::PersistedValueSpec;

use crate::error::RegistrationError;
use crate::invocation_bridge::RequestReplyHandler;
use crate::storage::AddressScopedStorage;
use crate::value_spec::{is_valid_state_name, ValueSpecBase};
use crate::{Context, Message, TypeName};

/// A user-defined stateful function.
///
/// Each individual function is an uniquely invokable "instance" of a
/// registered [StatefulFunctionSpec], identified by an [Address](crate::Address).
/// From a user's perspective, for each unique function id there exists a
/// stateful instance of the function that is always available to be invoked.
///
/// A function is invoked with the per-invocation [Context], the
/// [AddressScopedStorage] holding its persisted values, and the argument
/// [Message]. Returning an error fails the whole batch.
///
/// Plain functions and closures of the same shape implement this trait
/// automatically, so both can be registered.
pub trait StatefulFunction: Send + Sync {
    /// Invokes this function with the given message.
    fn invoke(
        &self,
        context: &Context<'_>,
        storage: &AddressScopedStorage,
        message: Message,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

impl<F> StatefulFunction for F
where
    F: Fn(&Context<'_>, &AddressScopedStorage, Message) -> Result<(), Box<dyn Error + Send + Sync>>
        + Send
        + Sync,
{
    fn invoke(
        &self,
        context: &Context<'_>,
        storage: &AddressScopedStorage,
        message: Message,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self(context, storage, message)
    }
}

/// Specification for a stateful function, identifiable by a unique
/// [TypeName].
pub struct StatefulFunctionSpec {
    /// The unique [TypeName] of the function being defined.
    pub function_type: TypeName,

    /// The registered value specs (in erased form, see
    /// [ValueSpecBase](crate::ValueSpecBase) and the
    /// [specs!](crate::specs!) macro) that will be used by this function. A
    /// function may only access values that have been eagerly registered as
    /// part of its spec.
    pub states: Vec<ValueSpecBase>,

    /// The function itself.
    pub function: Box<dyn StatefulFunction>,
}

pub(crate) struct RegisteredFunction {
    pub(crate) function: Box<dyn StatefulFunction>,
    pub(crate) specs: HashMap<String, PersistedValueSpec>,
}

/// Keeps a mapping from [TypeName] to stateful functions. Use `with_spec()`
/// to register functions, then snapshot the registry into a
/// [RequestReplyHandler] with `as_handler()` and hand that to a
/// [Transport](crate::transport::Transport) for serving.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<TypeName, RegisteredFunction>,
}

impl FunctionRegistry {
    /// Creates a new empty `FunctionRegistry`.
    pub fn new() -> FunctionRegistry {
        FunctionRegistry {
            functions: HashMap::new(),
        }
    }

    /// Registers the given function spec.
    ///
    /// This validates that the function type is not already registered, that
    /// every state name is a legal identifier, and that no state name repeats
    /// within the spec.
    pub fn with_spec(
        &mut self,
        spec: StatefulFunctionSpec,
    ) -> Result<&mut FunctionRegistry, RegistrationError> {
        if self.functions.contains_key(&spec.function_type) {
            return Err(RegistrationError::DuplicateFunctionType(spec.function_type));
        }

        let mut specs = HashMap::with_capacity(spec.states.len());
        for state in &spec.states {
            if !is_valid_state_name(&state.name) {
                return Err(RegistrationError::InvalidStateName(state.name.clone()));
            }

            if specs.insert(state.name.clone(), state.to_proto()).is_some() {
                return Err(RegistrationError::DuplicateStateName {
                    function: spec.function_type,
                    state: state.name.clone(),
                });
            }
        }

        log::debug!("registering function {}", spec.function_type);
        self.functions.insert(
            spec.function_type,
            RegisteredFunction {
                function: spec.function,
                specs,
            },
        );

        Ok(self)
    }

    /// Snapshots the registry into an immutable [RequestReplyHandler].
    pub fn as_handler(self) -> RequestReplyHandler {
        RequestReplyHandler {
            functions: self.functions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::Int32Type;
    use crate::{specs, Expiration, ValueSpec};

    fn noop() -> Box<dyn StatefulFunction> {
        Box::new(
            |_context: &Context<'_>,
             _storage: &AddressScopedStorage,
             _message: Message|
             -> Result<(), Box<dyn Error + Send + Sync>> { Ok(()) },
        )
    }

    #[test]
    fn registering_a_closure_works() -> anyhow::Result<()> {
        let seen = ValueSpec::<i32>::new("seen", Int32Type);

        let mut registry = FunctionRegistry::new();
        registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("namespace/foo")?,
            states: specs![seen],
            function: noop(),
        })?;

        Ok(())
    }

    #[test]
    fn registering_a_trait_impl_works() -> anyhow::Result<()> {
        struct Greeter;

        impl StatefulFunction for Greeter {
            fn invoke(
                &self,
                _context: &Context<'_>,
                _storage: &AddressScopedStorage,
                _message: Message,
            ) -> Result<(), Box<dyn Error + Send + Sync>> {
                Ok(())
            }
        }

        let mut registry = FunctionRegistry::new();
        registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("namespace/greeter")?,
            states: vec![],
            function: Box::new(Greeter),
        })?;

        Ok(())
    }

    #[test]
    fn duplicate_function_types_are_rejected() -> anyhow::Result<()> {
        let mut registry = FunctionRegistry::new();
        registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("namespace/foo")?,
            states: vec![],
            function: noop(),
        })?;

        let result = registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("namespace/foo")?,
            states: vec![],
            function: noop(),
        });

        assert!(matches!(
            result,
            Err(RegistrationError::DuplicateFunctionType(_))
        ));

        Ok(())
    }

    #[test]
    fn illegal_state_names_are_rejected() -> anyhow::Result<()> {
        let bad = ValueSpec::<i32>::new("2-seen", Int32Type);

        let mut registry = FunctionRegistry::new();
        let result = registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("namespace/foo")?,
            states: specs![bad],
            function: noop(),
        });

        assert!(matches!(result, Err(RegistrationError::InvalidStateName(_))));

        Ok(())
    }

    #[test]
    fn repeated_state_names_are_rejected() -> anyhow::Result<()> {
        let seen = ValueSpec::<i32>::new("seen", Int32Type);
        let seen_again = ValueSpec::<i32>::new("seen", Int32Type)
            .with_expiration(Expiration::AfterCall(std::time::Duration::from_secs(1)));

        let mut registry = FunctionRegistry::new();
        let result = registry.with_spec(StatefulFunctionSpec {
            function_type: TypeName::parse("namespace/foo")?,
            states: specs![seen, seen_again],
            function: noop(),
        });

        assert!(matches!(
            result,
            Err(RegistrationError::DuplicateStateName { .. })
        ));

        Ok(())
    }
}
