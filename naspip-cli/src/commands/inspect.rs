//! Inspect command - decode a token without verifying it

use anyhow::Result;
use naspip_lib::PaymentInstructionsBuilder;

use crate::ui;

#[tracing::instrument(skip(token))]
pub fn run(token: &str, json: bool) -> Result<()> {
    let inspected = PaymentInstructionsBuilder::new().inspect(token)?;

    if json {
        ui::json(&serde_json::to_value(&inspected)?);
        return Ok(());
    }

    ui::warning("Signature NOT verified");
    ui::header("Token");
    ui::key_value("Key issuer", &inspected.envelope.key_issuer);
    ui::key_value("Key id", &inspected.envelope.key_id);
    ui::key_value("Version", &inspected.version);
    ui::key_value("Purpose", &inspected.purpose);
    if !inspected.footer.is_empty() {
        ui::key_value("Footer", &String::from_utf8_lossy(&inspected.footer));
    }

    match &inspected.claims {
        Some(claims) => {
            ui::header("Claims");
            ui::json(&serde_json::to_value(claims)?);
        }
        None => ui::info("Encrypted token; claims are not readable"),
    }
    Ok(())
}
