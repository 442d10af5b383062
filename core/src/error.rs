//! Errors

use thiserror::Error;

/// Errors raised by the scene-facing mutators.
///
/// Geometry that cannot be bounded is not an error; bounds queries return
/// an invalid box instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An argument is out of range (step index, time step count, time range).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation cannot be applied in the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Logs the error message and returns an `Error::InvalidArgument`.
///
/// * `msg` - The message.
pub fn invalid_argument<T>(msg: String) -> Result<T> {
    error!("{}", msg);
    Err(Error::InvalidArgument(msg))
}

/// Logs the error message and returns an `Error::InvalidOperation`.
///
/// * `msg` - The message.
pub fn invalid_operation<T>(msg: String) -> Result<T> {
    error!("{}", msg);
    Err(Error::InvalidOperation(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_include_details() {
        let e = invalid_argument::<()>(String::from("step 3 >= 2")).unwrap_err();
        assert_eq!(e.to_string(), "invalid argument: step 3 >= 2");

        let e = invalid_operation::<()>(String::from("mixed encodings")).unwrap_err();
        assert_eq!(e, Error::InvalidOperation(String::from("mixed encodings")));
    }
}
