use derive_more::{Display, From, Into};
use ulid::Ulid;

/// A random key attached to every request, used to correlate server logs
/// with what the caller observed.
#[derive(
    Debug, Clone, Default, Eq, PartialEq, PartialOrd, Ord, Display, From, Into,
)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }
}
