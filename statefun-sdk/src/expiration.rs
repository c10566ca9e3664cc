use std::time::Duration;

use statefun_proto::request_reply::from_function::expiration_spec::ExpireMode;
use statefun_proto::request_reply::from_function::ExpirationSpec;

/// State expiration (TTL) configuration.
///
/// Defines the way state can be auto expired by the runtime. Expiration can
/// be used to keep state from growing arbitrarily by assigning an expiration
/// date to a value, counted from either the last write to the value or the
/// last call to the function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expiration {
    /// The value never expires.
    None,

    /// Expire a duration after the last write to the value.
    AfterWrite(Duration),

    /// Expire a duration after the last invocation of the function.
    AfterCall(Duration),
}

impl Expiration {
    pub(crate) fn to_proto(&self) -> ExpirationSpec {
        match self {
            Expiration::None => ExpirationSpec {
                mode: ExpireMode::None as i32,
                expire_after_millis: 0,
            },
            Expiration::AfterWrite(duration) => ExpirationSpec {
                mode: ExpireMode::AfterWrite as i32,
                expire_after_millis: duration.as_millis() as i64,
            },
            Expiration::AfterCall(duration) => ExpirationSpec {
                mode: ExpireMode::AfterInvoke as i32,
                expire_after_millis: duration.as_millis() as i64,
            },
        }
    }
}
