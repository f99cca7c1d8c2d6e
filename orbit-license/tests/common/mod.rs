//! Shared test helpers for license codec tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use orbit_license::{Feature, LicenseEncoder, LicenseKey, LicenseTerms};
use sha2::Sha256;
use std::collections::BTreeSet;

type HmacSha256 = Hmac<Sha256>;

/// Deterministic secret used across tests.
pub const TEST_SECRET: &str = "orbit-test-secret-0001";

/// A different secret, for wrong-key rejection tests.
pub const OTHER_SECRET: &str = "orbit-test-secret-0002";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Day offset from the 2000-01-01 format epoch.
pub fn days(d: NaiveDate) -> u16 {
    (d - date(2000, 1, 1)).num_days() as u16
}

/// The concrete scenario from the format documentation: 5 seats, calendar
/// year 2025 through 2026-01-01, partners + projects.
pub fn sample_terms() -> LicenseTerms {
    LicenseTerms {
        max_users: 5,
        valid_from: date(2025, 1, 1),
        valid_until: date(2026, 1, 1),
        features: [Feature::Partners, Feature::Projects].into_iter().collect(),
    }
}

pub fn terms(
    max_users: u16,
    valid_from: NaiveDate,
    valid_until: NaiveDate,
    features: &[Feature],
) -> LicenseTerms {
    LicenseTerms {
        max_users,
        valid_from,
        valid_until,
        features: features.iter().copied().collect::<BTreeSet<_>>(),
    }
}

/// Encodes under the test secret.
pub fn encode(t: &LicenseTerms) -> LicenseKey {
    LicenseEncoder::new(TEST_SECRET).unwrap().encode(t).unwrap()
}

fn mac_prefix(secret: &str, payload: &[u8], len: usize) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    mac.finalize().into_bytes()[..len].to_vec()
}

/// Renders a 15-byte combined buffer as the canonical 25-character key text.
pub fn combined_to_key(combined: &[u8; 15]) -> String {
    let digits = BigUint::from_bytes_be(combined)
        .to_str_radix(36)
        .to_ascii_uppercase();
    format!("{:0>25}", digits)
}

/// Decodes canonical key text back to the 15-byte combined buffer.
pub fn key_to_combined(key: &str) -> [u8; 15] {
    let value = BigUint::parse_bytes(key.to_ascii_lowercase().as_bytes(), 36).unwrap();
    let raw = value.to_bytes_be();
    let mut out = [0u8; 15];
    out[15 - raw.len()..].copy_from_slice(&raw);
    out
}

/// Builds a key under the current layout with arbitrary field values,
/// reproducing the wire construction independently of the encoder. Lets
/// tests mint payloads the encoder refuses (wrong version, zero seats,
/// inverted dates) with a valid MAC.
pub fn forge_current_key(
    secret: &str,
    version: u8,
    nonce: u16,
    max_users: u16,
    valid_from_days: u16,
    valid_until_days: u16,
    feature_mask: u8,
) -> String {
    let mut v: u64 = 0;
    v |= u64::from(version & 0x0f) << 60;
    v |= u64::from(nonce & 0x0fff) << 48;
    v |= u64::from(max_users & 0x03ff) << 38;
    v |= u64::from(valid_from_days & 0x7fff) << 23;
    v |= u64::from(valid_until_days & 0x7fff) << 8;
    v |= u64::from(feature_mask);
    let payload = v.to_be_bytes();

    let mut combined = [0u8; 15];
    combined[..8].copy_from_slice(&payload);
    combined[8..].copy_from_slice(&mac_prefix(secret, &payload, 7));
    combined_to_key(&combined)
}

/// Builds a key under the legacy layout (7-byte payload, 8-byte MAC, fields
/// packed LSB-up, no nonce).
pub fn forge_legacy_key(
    secret: &str,
    version: u8,
    max_users: u16,
    valid_from_days: u16,
    valid_until_days: u16,
    feature_mask: u8,
) -> String {
    let mut v: u64 = 0;
    v |= u64::from(feature_mask & 0x3f) << 44;
    v |= u64::from(valid_until_days & 0x7fff) << 29;
    v |= u64::from(valid_from_days & 0x7fff) << 14;
    v |= u64::from(max_users & 0x03ff) << 4;
    v |= u64::from(version & 0x0f);
    let payload: [u8; 7] = v.to_be_bytes()[1..].try_into().unwrap();

    let mut combined = [0u8; 15];
    combined[..7].copy_from_slice(&payload);
    combined[7..].copy_from_slice(&mac_prefix(secret, &payload, 8));
    combined_to_key(&combined)
}
