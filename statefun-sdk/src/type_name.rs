use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::TypeNameParseError;

/// A namespaced identifier, used to uniquely identify objects within a
/// stateful functions application: functions, egresses, and value types.
///
/// The canonical string form is `namespace/name`. The namespace may itself
/// contain slashes; the split happens at the last one.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct TypeName {
    namespace: String,
    name: String,
}

impl TypeName {
    /// Parses a `TypeName` from its canonical `namespace/name` form.
    pub fn parse(typename: &str) -> Result<TypeName, TypeNameParseError> {
        let position = match typename.rfind('/') {
            Some(position) if position > 0 && position < typename.len() - 1 => position,
            _ => return Err(TypeNameParseError::new(typename)),
        };

        let mut namespace = &typename[..position];
        let name = &typename[position + 1..];

        // A single trailing slash on the namespace is tolerated.
        if namespace.ends_with('/') {
            namespace = &namespace[..namespace.len() - 1];
        }

        if namespace.is_empty() {
            return Err(TypeNameParseError::new(typename));
        }

        Ok(TypeName {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Creates a `TypeName` from its two parts. Both must be non-empty.
    pub fn from_parts(namespace: &str, name: &str) -> Result<TypeName, TypeNameParseError> {
        if namespace.is_empty() || name.is_empty() {
            return Err(TypeNameParseError::new(&format!("{}/{}", namespace, name)));
        }

        Ok(TypeName::from_parts_unchecked(namespace, name))
    }

    /// For identifiers that arrive pre-split on the wire and need no
    /// re-validation.
    pub(crate) fn from_parts_unchecked(namespace: &str, name: &str) -> TypeName {
        TypeName {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        }
    }

    /// The namespace of this `TypeName`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The name of this `TypeName`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for TypeName {
    type Err = TypeNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeName::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeName;

    #[test]
    fn parse_splits_at_the_last_slash() -> anyhow::Result<()> {
        let typename = TypeName::parse("namespace/Name")?;

        assert_eq!(typename.namespace(), "namespace");
        assert_eq!(typename.name(), "Name");

        Ok(())
    }

    #[test]
    fn namespace_may_contain_slashes() -> anyhow::Result<()> {
        let typename = TypeName::parse("com.foo/bar/Name")?;

        assert_eq!(typename.namespace(), "com.foo/bar");
        assert_eq!(typename.name(), "Name");

        Ok(())
    }

    #[test]
    fn a_trailing_namespace_slash_is_stripped() -> anyhow::Result<()> {
        let typename = TypeName::parse("ns//n")?;

        assert_eq!(typename.namespace(), "ns");
        assert_eq!(typename.name(), "n");

        Ok(())
    }

    #[test]
    fn malformed_typenames_are_rejected() {
        for input in &["", "/", "n/", "/x", "no-slash", "//x"] {
            assert!(TypeName::parse(input).is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn from_parts_rejects_empty_parts() {
        assert!(TypeName::from_parts("", "name").is_err());
        assert!(TypeName::from_parts("ns", "").is_err());
        assert_eq!(
            TypeName::from_parts("ns", "name").unwrap().to_string(),
            "ns/name"
        );
    }

    #[test]
    fn display_is_the_canonical_form() -> anyhow::Result<()> {
        assert_eq!(
            TypeName::parse("org.foo/greeter")?.to_string(),
            "org.foo/greeter"
        );
        Ok(())
    }
}
