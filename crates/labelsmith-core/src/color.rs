use crate::{error::LabelsmithError, LabelsmithResult};

/// Derives a stable color for a label name from the first three bytes of
/// its blake3 hash.
///
/// # Example
///
/// ```
/// use labelsmith_core::color::derive_color;
///
/// let color = derive_color("bug");
/// assert_eq!(color.len(), 6);
/// assert_eq!(color, derive_color("bug"));
/// ```
pub fn derive_color(name: &str) -> String {
    let hash = blake3::hash(name.as_bytes());
    hash.as_bytes()[..3]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Validates a six digit hex color, dropping a leading `#` and lowercasing.
pub fn normalize_color(input: &str) -> LabelsmithResult<String> {
    let color = input.trim();
    let color = color.strip_prefix('#').unwrap_or(color);

    if color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(color.to_ascii_lowercase())
    } else {
        Err(LabelsmithError::InvalidColor(input.to_string()))
    }
}
