//! Decode command - split a token into envelope fields

use anyhow::Result;
use naspip_lib::envelope;

use crate::ui;

pub fn run(token: &str) -> Result<()> {
    let envelope = envelope::unwrap(token)?;

    ui::header("Envelope");
    ui::key_value("Prefix", &envelope.prefix);
    ui::key_value("Key issuer", &envelope.key_issuer);
    ui::key_value("Key id", &envelope.key_id);
    ui::key_value("Token", &envelope.token);
    Ok(())
}
