//! Result type alias for Kinetic

use super::errors::KineticError;

/// Result type alias for Kinetic operations
///
/// # Examples
///
/// ```
/// use kinetic::domain::result::Result;
/// use kinetic::domain::errors::KineticError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(KineticError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, KineticError>;

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
}
