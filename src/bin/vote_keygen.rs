//! Create (or load) the vote signing key and print its address.
//! Uses the same config resolution as the server (`config/app.toml` + env).

use party_match::{telemetry, vote, AppConfig};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = AppConfig::load()?;
    let signer = vote::load_or_create(&cfg.vote.key_path)?;

    println!("key file: {}", cfg.vote.key_path.display());
    println!("address:  {}", signer.address_checksummed());
    Ok(())
}
