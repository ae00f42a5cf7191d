//! Hashing utilities using FxHash.
//!
//! Deterministic across runs, which is all the exporter needs: derived
//! filenames must be stable so repeated exports produce the same tree.
//!
//! ```ignore
//! let h = hash::compute(bytes);       // -> u64
//! let name = hash::digest(bytes);     // -> "9f2c61d0a4b7e813"
//! let fp = hash::fingerprint(bytes);  // -> "9f2c61d0"
//! ```

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

/// Full 16-char hex digest, used for content-derived filenames.
#[inline]
pub fn digest<T: AsRef<[u8]> + ?Sized>(value: &T) -> String {
    format!("{:016x}", compute(value))
}

/// Short 8-char hex fingerprint, used for change detection.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(value: &T) -> String {
    digest(value)[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(compute("abc"), compute("abc"));
        assert_ne!(compute("abc"), compute("abd"));
    }

    #[test]
    fn test_digest_shape() {
        let d = digest(b"\x00\x01\x02");
        assert_eq!(d.len(), 16);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(d.starts_with(&fingerprint(b"\x00\x01\x02")));
    }
}
