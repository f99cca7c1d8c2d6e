//! License key encoding and HMAC verification.
//!
//! A key carries a bit-packed payload (user limit, validity window, feature
//! set) followed by a truncated HMAC-SHA-256 over the payload bytes. The
//! 15-byte combined buffer is rendered as 25 base-36 characters, displayed
//! in five dash-separated groups, optionally behind a cosmetic `ORB-` prefix:
//!
//! ```text
//! ORB-XXXXX-XXXXX-XXXXX-XXXXX-XXXXX
//! ```
//!
//! Encoding and verification are inverse pure functions over the shared
//! layout in [`crate::layout`]; the secret key is injected at construction
//! so tests can use deterministic secrets.

use crate::codec::{
    base36_to_biguint, biguint_to_base36, biguint_to_bytes, bytes_to_biguint, constant_time_eq,
    date_from_days, days_since_epoch, hmac_sha256,
};
use crate::error::{LicenseError, LicenseResult};
use crate::feature::{
    features_to_mask, mask_to_features, Feature, FEATURE_MASK_BITS, FEATURE_ORDER,
    LEGACY_FEATURE_MASK_BITS, LEGACY_FEATURE_ORDER,
};
use crate::layout::{
    pack_current, unpack_current, unpack_legacy, RawPayload, COMBINED_LEN, GROUP_LEN, KEY_LENGTH,
    KEY_PREFIX, KEY_VERSION, LEGACY_MAC_LEN, LEGACY_PAYLOAD_LEN, MAC_LEN, MAX_DAY_OFFSET,
    MAX_USERS_LIMIT, PAYLOAD_LEN,
};
use chrono::NaiveDate;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Attributes a new license is minted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseTerms {
    /// Licensed seat count, 1..=1023.
    pub max_users: u16,
    /// First day the license is valid (inclusive).
    pub valid_from: NaiveDate,
    /// Last day the license is valid (inclusive).
    pub valid_until: NaiveDate,
    /// Features the license unlocks.
    pub features: BTreeSet<Feature>,
}

impl LicenseTerms {
    /// Checks every encoder precondition without producing any bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidTerms`] on an out-of-range user count,
    /// a validity window outside the encodable date range, an end date before
    /// the start date, or a feature the current format cannot represent.
    pub fn validate(&self) -> LicenseResult<()> {
        if self.max_users == 0 || self.max_users > MAX_USERS_LIMIT {
            return Err(LicenseError::InvalidTerms(format!(
                "max_users must be between 1 and {MAX_USERS_LIMIT}, got {}",
                self.max_users
            )));
        }
        if self.valid_until < self.valid_from {
            return Err(LicenseError::InvalidTerms(format!(
                "valid_until {} precedes valid_from {}",
                self.valid_until, self.valid_from
            )));
        }
        for (name, date) in [("valid_from", self.valid_from), ("valid_until", self.valid_until)] {
            let days = days_since_epoch(date);
            if !(0..=MAX_DAY_OFFSET).contains(&days) {
                return Err(LicenseError::InvalidTerms(format!(
                    "{name} {date} is outside the encodable date range"
                )));
            }
        }
        features_to_mask(&self.features, &FEATURE_ORDER, FEATURE_MASK_BITS)?;
        Ok(())
    }
}

/// The authenticated attributes extracted from a verified key.
///
/// Read-only: a changed license is a brand-new key, never a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePayload {
    /// Format revision the key was issued under.
    pub version: u8,
    /// Licensed seat count.
    pub max_users: u16,
    /// First day the license is valid (inclusive).
    pub valid_from: NaiveDate,
    /// Last day the license is valid (inclusive).
    pub valid_until: NaiveDate,
    /// Features the license unlocks.
    pub features: BTreeSet<Feature>,
}

/// A structurally well-formed license key: 25 uppercase base-36 characters.
///
/// Parsing checks shape only; authenticity is [`LicenseVerifier`]'s job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Normalizes and shape-checks a candidate key string.
    ///
    /// Every non-alphanumeric character (dashes, whitespace) is stripped and
    /// the rest uppercased. A leading `ORB` product prefix is removed when
    /// the remainder is exactly the canonical length.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidKeyFormat`] when the normalized text is
    /// not exactly 25 characters.
    pub fn parse(input: &str) -> LicenseResult<Self> {
        let mut normalized: String = input
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_uppercase();
        if normalized.len() == KEY_PREFIX.len() + KEY_LENGTH && normalized.starts_with(KEY_PREFIX) {
            normalized.drain(..KEY_PREFIX.len());
        }
        if normalized.len() != KEY_LENGTH {
            return Err(LicenseError::InvalidKeyFormat(format!(
                "expected {KEY_LENGTH} key characters, got {}",
                normalized.len()
            )));
        }
        Ok(Self(normalized))
    }

    /// The canonical 25-character form, no separators.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.0
    }

    /// Five dash-separated groups, for human transcription.
    #[must_use]
    pub fn dashed(&self) -> String {
        self.0
            .as_bytes()
            .chunks(GROUP_LEN)
            .map(|group| std::str::from_utf8(group).expect("key text is ASCII"))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Dashed form behind the product prefix, e.g. `ORB-AAAAA-...`.
    #[must_use]
    pub fn prefixed(&self) -> String {
        format!("{KEY_PREFIX}-{}", self.dashed())
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dashed())
    }
}

impl FromStr for LicenseKey {
    type Err = LicenseError;

    fn from_str(s: &str) -> LicenseResult<Self> {
        Self::parse(s)
    }
}

/// Mints license keys. Administrative side; holds the server secret.
pub struct LicenseEncoder {
    secret: Vec<u8>,
}

impl LicenseEncoder {
    /// Creates an encoder with the given HMAC secret.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MissingSecret`] for an empty secret. There is
    /// intentionally no default.
    pub fn new(secret: impl Into<Vec<u8>>) -> LicenseResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(LicenseError::MissingSecret);
        }
        Ok(Self { secret })
    }

    /// Encodes `terms` into a license key.
    ///
    /// Deterministic apart from a random 12-bit nonce, drawn from the OS
    /// CSPRNG so that two licenses with identical terms never share a key
    /// text. The nonce carries no meaning and is discarded on decode.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidTerms`] when `terms` fail validation.
    pub fn encode(&self, terms: &LicenseTerms) -> LicenseResult<LicenseKey> {
        terms.validate()?;

        let mut nonce_bytes = [0u8; 2];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = u16::from_be_bytes(nonce_bytes) & 0x0fff;

        let raw = RawPayload {
            version: KEY_VERSION,
            nonce,
            max_users: terms.max_users,
            valid_from_days: days_since_epoch(terms.valid_from) as u16,
            valid_until_days: days_since_epoch(terms.valid_until) as u16,
            feature_mask: features_to_mask(&terms.features, &FEATURE_ORDER, FEATURE_MASK_BITS)?,
        };
        let payload = pack_current(&raw);
        let digest = hmac_sha256(&self.secret, &payload);

        let mut combined = [0u8; COMBINED_LEN];
        combined[..PAYLOAD_LEN].copy_from_slice(&payload);
        combined[PAYLOAD_LEN..].copy_from_slice(&digest[..MAC_LEN]);

        let text = biguint_to_base36(&bytes_to_biguint(&combined), KEY_LENGTH)
            .expect("15-byte buffer always fits in 25 base-36 digits");
        Ok(LicenseKey(text))
    }
}

impl fmt::Debug for LicenseEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseEncoder").finish_non_exhaustive()
    }
}

/// Authenticates license keys and extracts their payload. Activation side.
pub struct LicenseVerifier {
    secret: Vec<u8>,
    accept_legacy: bool,
}

impl LicenseVerifier {
    /// Creates a verifier with the given HMAC secret.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MissingSecret`] for an empty secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> LicenseResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(LicenseError::MissingSecret);
        }
        Ok(Self {
            secret,
            accept_legacy: false,
        })
    }

    /// Also accepts keys issued under the retired legacy layout.
    #[must_use]
    pub fn with_legacy_keys(mut self) -> Self {
        self.accept_legacy = true;
        self
    }

    /// Normalizes, authenticates, and decodes a candidate key string.
    ///
    /// Pipeline: normalize → shape check → base-36 decode to 15 bytes →
    /// constant-time MAC check → unpack → semantic validation. Every step's
    /// failure short-circuits; no field is trusted before the MAC verifies.
    ///
    /// # Errors
    ///
    /// [`LicenseError::InvalidKeyFormat`] for a malformed string,
    /// [`LicenseError::InvalidSignature`] on MAC mismatch, and
    /// [`LicenseError::InvalidPayload`] when an authenticated payload is
    /// semantically invalid (unsupported version, bad date order, zero seats).
    pub fn verify(&self, input: &str) -> LicenseResult<LicensePayload> {
        self.verify_key(&LicenseKey::parse(input)?)
    }

    /// Authenticates and decodes an already shape-checked key.
    ///
    /// # Errors
    ///
    /// Same as [`LicenseVerifier::verify`], minus the format errors that
    /// parsing already rules out.
    pub fn verify_key(&self, key: &LicenseKey) -> LicenseResult<LicensePayload> {
        let value = base36_to_biguint(key.canonical())
            .ok_or_else(|| LicenseError::InvalidKeyFormat("invalid base-36 digit".to_string()))?;
        let combined = biguint_to_bytes(&value, COMBINED_LEN).ok_or_else(|| {
            LicenseError::InvalidKeyFormat("key value exceeds 15 bytes".to_string())
        })?;

        let (payload, claimed_mac) = combined.split_at(PAYLOAD_LEN);
        let digest = hmac_sha256(&self.secret, payload);
        if constant_time_eq(&digest[..MAC_LEN], claimed_mac) {
            let payload: [u8; PAYLOAD_LEN] = payload.try_into().expect("split at PAYLOAD_LEN");
            return self.finish(
                unpack_current(&payload),
                &FEATURE_ORDER,
                FEATURE_MASK_BITS,
            );
        }

        if self.accept_legacy {
            let (payload, claimed_mac) = combined.split_at(LEGACY_PAYLOAD_LEN);
            let digest = hmac_sha256(&self.secret, payload);
            if constant_time_eq(&digest[..LEGACY_MAC_LEN], claimed_mac) {
                let payload: [u8; LEGACY_PAYLOAD_LEN] =
                    payload.try_into().expect("split at LEGACY_PAYLOAD_LEN");
                return self.finish(
                    unpack_legacy(&payload),
                    &LEGACY_FEATURE_ORDER,
                    LEGACY_FEATURE_MASK_BITS,
                );
            }
        }

        Err(LicenseError::InvalidSignature)
    }

    /// Semantic validation and translation of an authenticated payload.
    fn finish(
        &self,
        raw: RawPayload,
        order: &[Feature],
        mask_bits: u32,
    ) -> LicenseResult<LicensePayload> {
        if raw.version != KEY_VERSION {
            return Err(LicenseError::InvalidPayload(format!(
                "unsupported key version {}",
                raw.version
            )));
        }
        if raw.max_users == 0 {
            return Err(LicenseError::InvalidPayload(
                "max_users must be at least 1".to_string(),
            ));
        }
        if raw.valid_until_days < raw.valid_from_days {
            return Err(LicenseError::InvalidPayload(
                "end date precedes start date".to_string(),
            ));
        }
        let valid_from = date_from_days(i64::from(raw.valid_from_days))
            .ok_or_else(|| LicenseError::InvalidPayload("start date out of range".to_string()))?;
        let valid_until = date_from_days(i64::from(raw.valid_until_days))
            .ok_or_else(|| LicenseError::InvalidPayload("end date out of range".to_string()))?;

        Ok(LicensePayload {
            version: raw.version,
            max_users: raw.max_users,
            valid_from,
            valid_until,
            features: mask_to_features(raw.feature_mask, order, mask_bits),
        })
    }
}

impl fmt::Debug for LicenseVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseVerifier")
            .field("accept_legacy", &self.accept_legacy)
            .finish_non_exhaustive()
    }
}
