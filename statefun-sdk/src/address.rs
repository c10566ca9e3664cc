use std::fmt::{Display, Formatter};

use statefun_proto::request_reply::Address as ProtoAddress;

use crate::TypeName;

/// The unique identity of an individual stateful function.
///
/// This comprises the function's type and an unique identifier within the
/// type. The function's type denotes the class of function to invoke, while
/// the unique identifier addresses the invocation to a specific function
/// instance.
///
/// The id is opaque to the SDK. An empty id is only meaningful for egress
/// targets; messages to functions must carry a non-empty one.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Address {
    /// `TypeName` of the stateful function that this `Address` refers to.
    pub function_type: TypeName,

    /// Unique id of the stateful function that this `Address` refers to.
    pub id: String,
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.function_type, self.id)
    }
}

impl Address {
    /// Creates a new `Address` from the given `TypeName` and id.
    pub fn new(function_type: TypeName, id: &str) -> Self {
        Address {
            function_type,
            id: id.to_owned(),
        }
    }

    /// Converts the Protobuf `Address` into an `Address`. We don't implement
    /// `From`/`Into` for this because we want to keep it out of the public API.
    pub(crate) fn from_proto(proto_address: &ProtoAddress) -> Self {
        Address {
            function_type: TypeName::from_parts_unchecked(
                &proto_address.namespace,
                &proto_address.r#type,
            ),
            id: proto_address.id.clone(),
        }
    }

    /// Converts this `Address` into a Protobuf `Address`. We don't implement
    /// `From`/`Into` for this because we want to keep it out of the public API.
    pub(crate) fn to_proto(&self) -> ProtoAddress {
        ProtoAddress {
            namespace: self.function_type.namespace().to_owned(),
            r#type: self.function_type.name().to_owned(),
            id: self.id.clone(),
        }
    }
}
