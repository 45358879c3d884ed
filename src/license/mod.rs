//! Professional license key handling
//!
//! Validation is a format gate: 32 or more ASCII alphanumeric characters.
//! The server performs the real entitlement checks; the toolkit only
//! refuses obviously malformed keys before writing anything to disk.

use crate::errors::{Result, SetupError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Minimum accepted key length
pub const MIN_KEY_LENGTH: usize = 32;

/// Tier name recorded in generated artifacts
pub const PROFESSIONAL_TIER: &str = "professional";

/// A syntactically valid professional license key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Parse a raw key, rejecting anything shorter than
    /// [`MIN_KEY_LENGTH`] or containing non-alphanumeric characters.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() < MIN_KEY_LENGTH {
            return Err(SetupError::License(format!(
                "key must be at least {} characters ({} given)",
                MIN_KEY_LENGTH,
                raw.len()
            )));
        }

        if !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SetupError::License(
                "key must contain only ASCII letters and digits".to_string(),
            ));
        }

        Ok(Self(raw.to_string()))
    }

    /// Full key text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short display form; the full key never goes to the console
    pub fn fingerprint(&self) -> String {
        // Keys are ASCII by construction, slicing is safe
        format!("{}...", &self.0[..8])
    }
}

/// On-disk activation marker (`.license`), written with mode 0600
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseMarker {
    pub license_key: String,
    pub tier: String,
    pub deployment_id: Uuid,
    pub activated_at: DateTime<Utc>,
}

impl LicenseMarker {
    /// Create a marker for a validated key
    pub fn new(key: &LicenseKey) -> Self {
        Self {
            license_key: key.as_str().to_string(),
            tier: PROFESSIONAL_TIER.to_string(),
            deployment_id: Uuid::new_v4(),
            activated_at: Utc::now(),
        }
    }

    /// Write the marker, restricting it to owner read/write
    pub fn write(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Read a marker back (used by doctor to report activation state)
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID_KEY: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";

    #[test]
    fn test_parse_valid_key() {
        let key = LicenseKey::parse(VALID_KEY).unwrap();
        assert_eq!(key.as_str(), VALID_KEY);
    }

    #[test]
    fn test_parse_rejects_short_key() {
        let err = LicenseKey::parse("SHORTKEY123").unwrap_err();
        assert!(matches!(err, SetupError::License(_)));
    }

    #[test]
    fn test_parse_rejects_31_chars() {
        let key: String = "A".repeat(31);
        assert!(LicenseKey::parse(&key).is_err());
    }

    #[test]
    fn test_parse_accepts_exactly_32_chars() {
        let key: String = "a1".repeat(16);
        assert!(LicenseKey::parse(&key).is_ok());
    }

    #[test]
    fn test_parse_rejects_separators() {
        assert!(LicenseKey::parse("ABCD-EFGH-IJKL-MNOP-QRST-UVWX-YZ01-2345").is_err());
        assert!(LicenseKey::parse("ABCDEFGHIJKLMNOP QRSTUVWXYZ012345").is_err());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(LicenseKey::parse("").is_err());
    }

    #[test]
    fn test_fingerprint_hides_key() {
        let key = LicenseKey::parse(VALID_KEY).unwrap();
        let fp = key.fingerprint();
        assert_eq!(fp, "ABCDEFGH...");
        assert!(!fp.contains(VALID_KEY));
    }

    #[test]
    fn test_marker_fields() {
        let key = LicenseKey::parse(VALID_KEY).unwrap();
        let marker = LicenseMarker::new(&key);
        assert_eq!(marker.tier, PROFESSIONAL_TIER);
        assert_eq!(marker.license_key, VALID_KEY);
    }

    #[test]
    fn test_marker_write_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".license");

        let key = LicenseKey::parse(VALID_KEY).unwrap();
        let marker = LicenseMarker::new(&key);
        marker.write(&path).unwrap();

        let loaded = LicenseMarker::read(&path).unwrap();
        assert_eq!(loaded.license_key, marker.license_key);
        assert_eq!(loaded.deployment_id, marker.deployment_id);
    }

    #[test]
    #[cfg(unix)]
    fn test_marker_mode_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".license");

        let key = LicenseKey::parse(VALID_KEY).unwrap();
        LicenseMarker::new(&key).write(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, TestResult};
    use quickcheck_macros::quickcheck;

    /// Random alphanumeric key of length 32..=64
    #[derive(Debug, Clone)]
    struct AlnumKey(String);

    impl Arbitrary for AlnumKey {
        fn arbitrary(g: &mut Gen) -> Self {
            const CHARSET: &[u8] =
                b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
            let len = MIN_KEY_LENGTH + usize::arbitrary(g) % 33;
            let key = (0..len)
                .map(|_| *g.choose(CHARSET).unwrap() as char)
                .collect();
            AlnumKey(key)
        }
    }

    #[quickcheck]
    fn prop_long_alnum_keys_accepted(key: AlnumKey) -> bool {
        LicenseKey::parse(&key.0).is_ok()
    }

    #[quickcheck]
    fn prop_short_keys_rejected(s: String) -> bool {
        let short: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(MIN_KEY_LENGTH - 1)
            .collect();
        LicenseKey::parse(&short).is_err()
    }

    #[quickcheck]
    fn prop_embedded_non_alnum_rejected(key: AlnumKey, junk: char) -> TestResult {
        if junk.is_ascii_alphanumeric() {
            return TestResult::discard();
        }
        let mut tainted = key.0;
        tainted.push(junk);
        TestResult::from_bool(LicenseKey::parse(&tainted).is_err())
    }
}
