mod common;

use common::{date, encode, sample_terms, terms, TEST_SECRET};
use orbit_license::{
    Feature, LicenseEncoder, LicenseError, LicenseVerifier, KEY_LENGTH, MAX_USERS_LIMIT,
};

// ── Construction ─────────────────────────────────────────────────

#[test]
fn empty_secret_is_a_configuration_error() {
    assert!(matches!(
        LicenseEncoder::new(""),
        Err(LicenseError::MissingSecret)
    ));
    assert!(matches!(
        LicenseEncoder::new(Vec::new()),
        Err(LicenseError::MissingSecret)
    ));
}

// ── Input validation ─────────────────────────────────────────────

#[test]
fn rejects_zero_users() {
    let t = terms(0, date(2025, 1, 1), date(2026, 1, 1), &[]);
    let err = LicenseEncoder::new(TEST_SECRET).unwrap().encode(&t);
    assert!(matches!(err, Err(LicenseError::InvalidTerms(_))));
}

#[test]
fn rejects_users_above_the_bit_width() {
    let t = terms(
        MAX_USERS_LIMIT + 1,
        date(2025, 1, 1),
        date(2026, 1, 1),
        &[],
    );
    let err = LicenseEncoder::new(TEST_SECRET).unwrap().encode(&t);
    assert!(matches!(err, Err(LicenseError::InvalidTerms(_))));
}

#[test]
fn rejects_end_before_start() {
    let t = terms(5, date(2026, 1, 1), date(2025, 1, 1), &[]);
    let err = LicenseEncoder::new(TEST_SECRET).unwrap().encode(&t);
    assert!(matches!(err, Err(LicenseError::InvalidTerms(_))));
}

#[test]
fn rejects_dates_before_the_epoch() {
    let t = terms(5, date(1999, 12, 31), date(2025, 1, 1), &[]);
    let err = LicenseEncoder::new(TEST_SECRET).unwrap().encode(&t);
    assert!(matches!(err, Err(LicenseError::InvalidTerms(_))));
}

#[test]
fn rejects_dates_past_the_bit_width() {
    // Day offset 32767 is 2089-09-17; anything later does not fit 15 bits.
    let t = terms(5, date(2025, 1, 1), date(2089, 9, 18), &[]);
    let err = LicenseEncoder::new(TEST_SECRET).unwrap().encode(&t);
    assert!(matches!(err, Err(LicenseError::InvalidTerms(_))));
}

#[test]
fn rejects_features_the_format_cannot_carry() {
    // Logs only exists in the legacy table.
    let t = terms(5, date(2025, 1, 1), date(2026, 1, 1), &[Feature::Logs]);
    let err = LicenseEncoder::new(TEST_SECRET).unwrap().encode(&t);
    assert!(matches!(err, Err(LicenseError::InvalidTerms(_))));
}

// ── Output shape ─────────────────────────────────────────────────

#[test]
fn key_is_always_25_base36_characters() {
    let boundary_cases = [
        terms(1, date(2000, 1, 1), date(2000, 1, 1), &[]),
        terms(
            MAX_USERS_LIMIT,
            date(2089, 9, 17),
            date(2089, 9, 17),
            &[
                Feature::Partners,
                Feature::Projects,
                Feature::Sales,
                Feature::Documents,
                Feature::Calendar,
                Feature::MyItems,
                Feature::Audit,
            ],
        ),
        sample_terms(),
    ];
    for t in &boundary_cases {
        let key = encode(t);
        assert_eq!(key.canonical().len(), KEY_LENGTH);
        assert!(key
            .canonical()
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()));
    }
}

#[test]
fn dashes_group_every_five_characters() {
    let key = encode(&sample_terms());
    let dashed = key.dashed();
    assert_eq!(dashed.len(), 29);
    let groups: Vec<&str> = dashed.split('-').collect();
    assert_eq!(groups.len(), 5);
    assert!(groups.iter().all(|g| g.len() == 5));
    assert!(key.prefixed().starts_with("ORB-"));
}

// ── Nonce behavior ───────────────────────────────────────────────

#[test]
fn identical_terms_produce_varying_key_text() {
    let encoder = LicenseEncoder::new(TEST_SECRET).unwrap();
    let t = sample_terms();
    let keys: std::collections::BTreeSet<String> = (0..16)
        .map(|_| encoder.encode(&t).unwrap().canonical().to_string())
        .collect();
    // 12 random bits; 16 draws colliding into one value is not a thing.
    assert!(keys.len() > 1);
}

#[test]
fn nonce_never_reaches_the_decoded_payload() {
    let verifier = LicenseVerifier::new(TEST_SECRET).unwrap();
    let encoder = LicenseEncoder::new(TEST_SECRET).unwrap();
    let t = sample_terms();
    let a = verifier.verify(encoder.encode(&t).unwrap().canonical()).unwrap();
    let b = verifier.verify(encoder.encode(&t).unwrap().canonical()).unwrap();
    assert_eq!(a, b);
}
