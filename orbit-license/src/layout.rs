//! Versioned bit layouts of the license payload.
//!
//! Two layouts exist. The current one is the only layout the encoder emits;
//! the legacy one is kept read-only so keys issued under it keep verifying.
//!
//! Current (8-byte payload, 7-byte MAC), MSB to LSB:
//!
//! ```text
//! version(4) | nonce(12) | max_users(10) | valid_from_days(15)
//!            | valid_until_days(15) | feature_mask(8)   = 64 bits
//! ```
//!
//! Legacy (7-byte payload, 8-byte MAC), 50 bits right-aligned in 56:
//!
//! ```text
//! feature_mask(6) | valid_until_days(15) | valid_from_days(15)
//!                 | max_users(10) | version(4)
//! ```

/// The single supported format revision. Any other value in the version
/// field invalidates the whole key.
pub const KEY_VERSION: u8 = 1;

/// Length of the canonical key text (base-36, no dashes).
pub const KEY_LENGTH: usize = 25;

/// Payload bytes plus truncated MAC bytes; the thing base-36 encoded.
pub const COMBINED_LEN: usize = 15;

/// Characters per dash-separated group in the display form.
pub const GROUP_LEN: usize = 5;

/// Cosmetic product prefix, stripped before verification.
pub const KEY_PREFIX: &str = "ORB";

/// Largest encodable user count (10-bit field).
pub const MAX_USERS_LIMIT: u16 = (1 << 10) - 1;

/// Largest encodable day offset from the epoch (15-bit fields).
pub const MAX_DAY_OFFSET: i64 = (1 << 15) - 1;

/// Bit width of the nonce field in the current layout.
pub const NONCE_BITS: u32 = 12;

pub(crate) const PAYLOAD_LEN: usize = 8;
pub(crate) const MAC_LEN: usize = 7;
pub(crate) const LEGACY_PAYLOAD_LEN: usize = 7;
pub(crate) const LEGACY_MAC_LEN: usize = 8;

/// Field values of a payload before packing / after unpacking, still in
/// wire units (day offsets, raw mask).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawPayload {
    pub version: u8,
    pub nonce: u16,
    pub max_users: u16,
    pub valid_from_days: u16,
    pub valid_until_days: u16,
    pub feature_mask: u8,
}

/// Packs the fields into the current 8-byte big-endian payload.
pub(crate) fn pack_current(p: &RawPayload) -> [u8; PAYLOAD_LEN] {
    let mut v: u64 = 0;
    v |= u64::from(p.version & 0x0f) << 60;
    v |= u64::from(p.nonce & 0x0fff) << 48;
    v |= u64::from(p.max_users & 0x03ff) << 38;
    v |= u64::from(p.valid_from_days & 0x7fff) << 23;
    v |= u64::from(p.valid_until_days & 0x7fff) << 8;
    v |= u64::from(p.feature_mask);
    v.to_be_bytes()
}

/// Reverses [`pack_current`].
pub(crate) fn unpack_current(bytes: &[u8; PAYLOAD_LEN]) -> RawPayload {
    let v = u64::from_be_bytes(*bytes);
    RawPayload {
        version: ((v >> 60) & 0x0f) as u8,
        nonce: ((v >> 48) & 0x0fff) as u16,
        max_users: ((v >> 38) & 0x03ff) as u16,
        valid_from_days: ((v >> 23) & 0x7fff) as u16,
        valid_until_days: ((v >> 8) & 0x7fff) as u16,
        feature_mask: (v & 0xff) as u8,
    }
}

/// Unpacks the legacy 7-byte payload. The legacy layout has no nonce; the
/// field is reported as zero.
pub(crate) fn unpack_legacy(bytes: &[u8; LEGACY_PAYLOAD_LEN]) -> RawPayload {
    let mut v: u64 = 0;
    for b in bytes {
        v = (v << 8) | u64::from(*b);
    }
    RawPayload {
        version: (v & 0x0f) as u8,
        nonce: 0,
        max_users: ((v >> 4) & 0x03ff) as u16,
        valid_from_days: ((v >> 14) & 0x7fff) as u16,
        valid_until_days: ((v >> 29) & 0x7fff) as u16,
        feature_mask: ((v >> 44) & 0x3f) as u8,
    }
}
