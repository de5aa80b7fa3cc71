//! Result type alias for Bastion

use super::errors::BastionError;

/// Result type alias for Bastion operations
///
/// # Examples
///
/// ```
/// use bastion::domain::result::Result;
/// use bastion::domain::errors::BastionError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BastionError::UnknownTemplate("shield".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BastionError>;
