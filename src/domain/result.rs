//! Result type alias for the relay
//!
//! This module provides a convenient Result type alias that uses RelayError
//! as the error type.

use super::errors::RelayError;

/// Result type alias for relay operations
///
/// # Examples
///
/// ```
/// use transform_relay::domain::result::Result;
/// use transform_relay::domain::errors::RelayError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(RelayError::Render("unexpected end of template".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(RelayError::Other("test error".to_string()));
        assert!(result.is_err());
    }
}
