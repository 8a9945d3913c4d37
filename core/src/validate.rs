//! Membership check for enumerated parameters.

use crate::error::InvalidArgument;

/// Accept `value` when it is unset or one of `allowed`.
pub fn acceptable(
    name: &'static str,
    value: Option<&str>,
    allowed: &'static [&'static str],
) -> Result<(), InvalidArgument> {
    match value {
        None => Ok(()),
        Some(v) if allowed.contains(&v) => Ok(()),
        Some(v) => Err(InvalidArgument {
            name,
            value: v.to_string(),
            allowed,
        }),
    }
}
