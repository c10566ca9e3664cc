use std::fmt;
use std::sync::Arc;

use statefun_proto::request_reply::from_function::PersistedValueSpec;

use crate::serialization::Type;
use crate::Expiration;

/// A `ValueSpec` identifies a registered persistent value of a function,
/// which is managed by the runtime for consistency and fault tolerance.
///
/// A spec is registered for a function by listing its erased form (see
/// [ValueSpecBase]) on the function's [StatefulFunctionSpec](crate::StatefulFunctionSpec);
/// the typed form is what the function hands to
/// [AddressScopedStorage](crate::AddressScopedStorage) to read and write the
/// value.
pub struct ValueSpec<T> {
    pub(crate) name: String,
    pub(crate) value_type: Arc<dyn Type<Value = T> + Send + Sync>,
    pub(crate) expiration: Expiration,
}

impl<T> ValueSpec<T> {
    /// Creates a spec for a persistent value kept under the given name.
    ///
    /// The name must be a valid identifier: an alphabet letter or underscore,
    /// followed by zero or more alphanumerics or underscores. Invalid names
    /// are rejected when the function is registered.
    pub fn new<S>(name: &str, value_type: S) -> ValueSpec<T>
    where
        S: Type<Value = T> + Send + Sync + 'static,
    {
        ValueSpec {
            name: name.to_owned(),
            value_type: Arc::new(value_type),
            expiration: Expiration::None,
        }
    }

    /// Attaches an expiration configuration to this spec.
    pub fn with_expiration(mut self, expiration: Expiration) -> ValueSpec<T> {
        self.expiration = expiration;
        self
    }

    /// The name the value is kept under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for ValueSpec<T> {
    fn clone(&self) -> Self {
        ValueSpec {
            name: self.name.clone(),
            value_type: Arc::clone(&self.value_type),
            expiration: self.expiration.clone(),
        }
    }
}

impl<T> fmt::Debug for ValueSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSpec")
            .field("name", &self.name)
            .field("typename", &self.value_type.typename().to_string())
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// The type-erased form of a [ValueSpec], as kept by the registry: the state
/// name, the value type's typename, and the expiration configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueSpecBase {
    pub(crate) name: String,
    pub(crate) typename: String,
    pub(crate) expiration: Expiration,
}

impl ValueSpecBase {
    pub(crate) fn to_proto(&self) -> PersistedValueSpec {
        PersistedValueSpec {
            state_name: self.name.clone(),
            expiration_spec: Some(self.expiration.to_proto()),
            type_typename: self.typename.clone(),
        }
    }
}

impl<T> From<&ValueSpec<T>> for ValueSpecBase {
    fn from(spec: &ValueSpec<T>) -> ValueSpecBase {
        ValueSpecBase {
            name: spec.name.clone(),
            typename: spec.value_type.typename().to_string(),
            expiration: spec.expiration.clone(),
        }
    }
}

pub(crate) fn is_valid_state_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
