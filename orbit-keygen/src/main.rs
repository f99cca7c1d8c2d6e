//! Orbit CRM license administration tool.
//!
//! Mints new license keys and verifies existing ones from the command line.
//! The HMAC secret comes from the `ORBIT_LICENSE_SECRET` environment
//! variable; there is no fallback value, a missing secret aborts before any
//! key material is touched.
//!
//! Usage:
//!   orbit-keygen mint --max-users 25 --valid-from 2025-01-01 \
//!       --valid-until 2026-01-01 --features partners,projects
//!   orbit-keygen verify ORB-XXXXX-XXXXX-XXXXX-XXXXX-XXXXX

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use orbit_license::{Feature, LicenseEncoder, LicenseTerms, LicenseVerifier};
use std::collections::BTreeSet;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Environment variable holding the server-side HMAC secret.
const SECRET_ENV: &str = "ORBIT_LICENSE_SECRET";

#[derive(Parser, Debug)]
#[command(name = "orbit-keygen")]
#[command(about = "Mint and verify Orbit CRM license keys")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mint a new license key
    Mint {
        /// Licensed seat count (1..=1023)
        #[arg(long)]
        max_users: u16,

        /// First valid day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        valid_from: NaiveDate,

        /// Last valid day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        valid_until: NaiveDate,

        /// Comma-separated feature list (e.g. partners,projects,sales)
        #[arg(long, value_delimiter = ',')]
        features: Vec<String>,

        /// Emit JSON instead of the bare key
        #[arg(long)]
        json: bool,
    },
    /// Verify a license key and print its payload
    Verify {
        /// The key, with or without dashes and the ORB prefix
        key: String,

        /// Also accept keys issued under the retired legacy layout
        #[arg(long)]
        legacy: bool,
    },
}

fn secret() -> Result<String> {
    std::env::var(SECRET_ENV).with_context(|| format!("{SECRET_ENV} is not set"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    match args.command {
        Command::Mint {
            max_users,
            valid_from,
            valid_until,
            features,
            json,
        } => {
            let features: BTreeSet<Feature> = features
                .iter()
                .filter(|f| !f.is_empty())
                .map(|f| f.trim().parse())
                .collect::<Result<_, _>>()
                .context("unrecognized feature name")?;
            let terms = LicenseTerms {
                max_users,
                valid_from,
                valid_until,
                features,
            };
            debug!(?terms, "minting license");

            let encoder = LicenseEncoder::new(secret()?).context("encoder setup failed")?;
            let key = encoder.encode(&terms).context("license terms rejected")?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "license_key": key.prefixed(),
                        "max_users": terms.max_users,
                        "valid_from": terms.valid_from,
                        "valid_until": terms.valid_until,
                        "features": terms.features,
                    })
                );
            } else {
                println!("{}", key.prefixed());
            }
        }
        Command::Verify { key, legacy } => {
            let mut verifier =
                LicenseVerifier::new(secret()?).context("verifier setup failed")?;
            if legacy {
                verifier = verifier.with_legacy_keys();
            }
            let payload = verifier
                .verify(&key)
                .context("license key did not verify")?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
