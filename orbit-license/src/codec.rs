//! Shared numeric and byte primitives used by both the encoder and the
//! verifier.
//!
//! Everything here is part of the wire contract: the epoch, the base-36
//! alphabet, and the big-endian byte conventions must match bit-for-bit on
//! both sides, or previously issued keys stop verifying.

use chrono::{Days, NaiveDate};
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Reference date for all license validity fields. Dates travel on the wire
/// as day offsets from this constant. Changing it invalidates every key ever
/// issued, so it is frozen.
pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(d) => d,
    None => panic!("epoch date is valid"),
};

/// Returns the number of whole days between [`EPOCH`] and `date`.
///
/// Negative for dates before the epoch; callers enforce the non-negative
/// range their bit field allows.
#[must_use]
pub fn days_since_epoch(date: NaiveDate) -> i64 {
    (date - EPOCH).num_days()
}

/// Inverse of [`days_since_epoch`]. Returns `None` if the offset is negative
/// or lands outside chrono's representable calendar.
#[must_use]
pub fn date_from_days(days: i64) -> Option<NaiveDate> {
    let days = u64::try_from(days).ok()?;
    EPOCH.checked_add_days(Days::new(days))
}

/// Interprets `bytes` as a big-endian unsigned integer.
#[must_use]
pub fn bytes_to_biguint(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Serializes `value` big-endian into exactly `len` bytes, zero-padded on the
/// left. Returns `None` when the value does not fit.
#[must_use]
pub fn biguint_to_bytes(value: &BigUint, len: usize) -> Option<Vec<u8>> {
    let raw = value.to_bytes_be();
    if raw.len() > len {
        return None;
    }
    let mut out = vec![0u8; len - raw.len()];
    out.extend_from_slice(&raw);
    Some(out)
}

/// Renders `value` as uppercase base-36 (`0-9A-Z`), zero-padded to exactly
/// `width` characters. Returns `None` when the value needs more digits.
#[must_use]
pub fn biguint_to_base36(value: &BigUint, width: usize) -> Option<String> {
    let digits = value.to_str_radix(36).to_ascii_uppercase();
    if digits.len() > width {
        return None;
    }
    let mut out = String::with_capacity(width);
    for _ in digits.len()..width {
        out.push('0');
    }
    out.push_str(&digits);
    Some(out)
}

/// Parses a base-36 string, accepting either case. Returns `None` on an
/// empty string or any character outside `0-9A-Za-z` — an invalid digit is
/// an explicit decode failure, never a silent zero.
#[must_use]
pub fn base36_to_biguint(text: &str) -> Option<BigUint> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    BigUint::parse_bytes(text.to_ascii_lowercase().as_bytes(), 36)
}

/// Computes HMAC-SHA-256 of `data` under `secret`.
#[must_use]
pub fn hmac_sha256(secret: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Compares two byte slices in time independent of where they first differ.
///
/// A length mismatch returns `false` without touching the contents; equal
/// lengths go through a full XOR-accumulate pass.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
