use md5::{Digest, Md5};
use std::fmt::Display;

use crate::error::{Result, VizError};

/// Fingerprint an answer so it can be compared against a published hash
/// without revealing the answer itself.
///
/// The value is rendered with its `Display` form, encoded as ASCII and hashed
/// with MD5. The digest is returned as lowercase hex, which matches the hash
/// lists used for offline Project Euler checking.
pub fn fingerprint<T: Display + ?Sized>(value: &T) -> Result<String> {
    let text = value.to_string();
    if !text.is_ascii() {
        return Err(VizError::NonAscii(text));
    }

    let mut hasher = Md5::new();
    hasher.update(text.as_bytes());

    Ok(format!("{:x}", hasher.finalize()))
}

/// Check a candidate answer against a known fingerprint
pub fn matches<T: Display + ?Sized>(value: &T, expected: &str) -> Result<bool> {
    Ok(fingerprint(value)?.eq_ignore_ascii_case(expected.trim()))
}
