//! Member name validation.
//!
//! Valid member names:
//! - Must be non-empty after trimming
//! - Must not contain whitespace
//! - Must not contain any of `. +-*/^[]{}!"\%&()=?`
//!
//! The dot is the path separator; the remaining characters would make the
//! name read as an operator or an index in a rendered step.

use crate::error::{PathError, PathResult};

/// Characters that are forbidden anywhere in a member name.
const FORBIDDEN_CHARS: &[char] = &[
    '.', ' ', '+', '-', '*', '/', '^', '[', ']', '{', '}', '!', '"', '\\', '%', '&', '(', ')',
    '=', '?',
];

/// Validate a member name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use duck_path::names::validate_member_name;
///
/// assert!(validate_member_name("office").is_ok());
/// assert!(validate_member_name("first_name").is_ok());
/// assert!(validate_member_name("").is_err());
/// assert!(validate_member_name("a.b").is_err());
/// ```
pub fn validate_member_name(name: &str) -> PathResult<()> {
    if name.trim().is_empty() {
        return Err(PathError::InvalidName {
            name: name.to_string(),
            reason: "member name must not be empty".into(),
        });
    }

    for ch in FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return Err(PathError::InvalidName {
                name: name.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
    }

    if let Some(ch) = name.chars().find(|c| c.is_whitespace()) {
        return Err(PathError::InvalidName {
            name: name.to_string(),
            reason: format!("contains whitespace: {ch:?}"),
        });
    }

    Ok(())
}
