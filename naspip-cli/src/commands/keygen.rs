//! Keygen command - generate a signing key pair

use std::path::Path;

use anyhow::{Context, Result};
use naspip_lib::keys::{generate_key, KeyFormat};

use crate::ui;

#[tracing::instrument]
pub fn run(format: &str, output: Option<&str>, verbose: bool) -> Result<()> {
    let format: KeyFormat = format
        .parse()
        .with_context(|| format!("Unknown key format: {format}"))?;
    tracing::debug!(?format, "Generating key pair");
    let keys = generate_key(format);

    match output {
        Some(path) => {
            if Path::new(path).exists()
                && ui::is_interactive()
                && !ui::confirm(&format!("{path} exists. Overwrite?"), false)?
            {
                ui::info("Keeping existing file");
                return Ok(());
            }
            let json = serde_json::to_string_pretty(&keys)?;
            std::fs::write(path, json).with_context(|| format!("Failed to write {path}"))?;
            ui::success(&format!("Key pair written to {path}"));
            ui::key_value("Public key", &keys.public_key);
        }
        None => {
            ui::header("Key Pair");
            ui::key_value("Secret key", &keys.secret_key);
            ui::key_value("Public key", &keys.public_key);
            if verbose {
                ui::warning("Store the secret key securely; it is not saved anywhere");
            }
        }
    }

    Ok(())
}
