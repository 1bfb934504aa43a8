//! Hashing utilities for fingerprinting.

use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 hash of a string.
pub fn sha256_str(s: &str) -> String {
    sha256_bytes(s.as_bytes())
}

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add a `key=value` pair.
    pub fn update_pair(&mut self, key: &str, value: &str) -> &mut Self {
        self.hasher.update(key.as_bytes());
        self.hasher.update(b"=");
        self.update_str(value)
    }

    /// Add a section marker so adjacent lists cannot run into each other.
    pub fn section(&mut self, name: &str) -> &mut Self {
        self.hasher.update(b"\x01");
        self.update_str(name)
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// Finalize and return a short fingerprint (first 16 chars).
    pub fn finish_short(self) -> String {
        self.finish()[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_str() {
        let hash = sha256_str("hello");
        assert_eq!(
            hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_fingerprint() {
        let fp = |a: &str, b: &str| {
            let mut fp = Fingerprint::new();
            fp.update_pair("os", a).update_pair("arch", b);
            fp.finish()
        };

        assert_eq!(fp("Linux", "x86_64"), fp("Linux", "x86_64"));
        assert_ne!(fp("Linux", "x86_64"), fp("Linux", "armv8"));
    }

    #[test]
    fn test_sections_separate_lists() {
        let a = {
            let mut fp = Fingerprint::new();
            fp.section("settings").update_str("x").section("options");
            fp.finish_short()
        };
        let b = {
            let mut fp = Fingerprint::new();
            fp.section("settings").section("options").update_str("x");
            fp.finish_short()
        };
        assert_ne!(a, b);
        assert_eq!(a.len(), 16);
    }
}
