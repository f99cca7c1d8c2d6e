//! License key codec for Orbit CRM.
//!
//! This crate handles:
//! - Minting tamper-resistant license keys (administrative side)
//! - Authenticating keys on activation via truncated HMAC-SHA-256
//! - Bit-packing license attributes into a compact 64-bit payload
//! - Rendering keys as fixed-width base-36 text for human transcription
//!
//! # Design Principles
//!
//! - **Symmetric halves**: encoder and verifier are inverse pure functions
//!   over one shared bit layout; they never call each other
//! - **Authenticate before trusting**: no payload field is extracted until
//!   the MAC has passed a constant-time comparison
//! - **Reject, never recover**: any structural or semantic deviation fails
//!   the whole key; there is no best-effort parsing of unknown versions
//! - **Injected secret**: the HMAC secret is a constructor argument, not a
//!   global, so tests run with deterministic keys
//!
//! # Key Format
//!
//! `payload (8 bytes) || HMAC-SHA-256(payload)[..7]`, base-36 encoded to 25
//! characters, displayed as `ORB-XXXXX-XXXXX-XXXXX-XXXXX-XXXXX`.

pub mod codec;
mod error;
mod feature;
mod key;
mod layout;

pub use error::{LicenseError, LicenseResult};
pub use feature::{
    features_to_mask, mask_to_features, Feature, FEATURE_MASK_BITS, FEATURE_ORDER,
    LEGACY_FEATURE_MASK_BITS, LEGACY_FEATURE_ORDER,
};
pub use key::{LicenseEncoder, LicenseKey, LicensePayload, LicenseTerms, LicenseVerifier};
pub use layout::{
    COMBINED_LEN, GROUP_LEN, KEY_LENGTH, KEY_PREFIX, KEY_VERSION, MAX_DAY_OFFSET, MAX_USERS_LIMIT,
    NONCE_BITS,
};
