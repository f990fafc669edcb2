//! Target age for the age filter.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors that can occur when reading a [`TargetAge`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetAgeError {
    /// No usable age was supplied.
    #[error("age is missing")]
    Missing,
}

/// The age the subject should be rendered at.
///
/// The page sends ages as strings (`"60"`), scripted clients often send
/// numbers (`60`). Both are accepted; the value is only ever interpolated
/// into a prompt, so it is kept as text.
///
/// ## Examples
///
/// ```
/// use righthair_core::TargetAge;
/// use serde_json::json;
///
/// assert_eq!(TargetAge::from_json(&json!("60")).unwrap().as_str(), "60");
/// assert_eq!(TargetAge::from_json(&json!(80)).unwrap().as_str(), "80");
/// assert!(TargetAge::from_json(&json!("")).is_err());
/// assert!(TargetAge::from_json(&json!(null)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetAge(String);

impl TargetAge {
    /// Read an age from an arbitrary JSON value.
    ///
    /// Non-blank strings and non-zero numbers are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`TargetAgeError::Missing`] for null, blank strings, zero and
    /// any other JSON type.
    pub fn from_json(value: &Value) -> Result<Self, TargetAgeError> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Ok(Self(s.trim().to_owned())),
            Value::Number(n) if n.as_f64().is_some_and(|v| v.abs() > f64::EPSILON) => {
                Ok(Self(n.to_string()))
            }
            _ => Err(TargetAgeError::Missing),
        }
    }

    /// The age as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
