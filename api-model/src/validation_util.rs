#![cfg(feature = "validation")]
use validator::ValidationError;

pub fn invalid(
    code: &'static str,
    message: impl Into<String>,
) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into().into());
    err
}
