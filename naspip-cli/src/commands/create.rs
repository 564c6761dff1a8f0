//! Create command - sign payment instructions and URL redirects

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use naspip_lib::diagnostics::{Diagnostic, Diagnostics};
use naspip_lib::{CreateOptions, InstructionPayload, PaymentInstructionsBuilder, UrlPayload};

use super::{override_with, read_json};
use crate::{ui, CreateArgs};

/// Shows builder diagnostics as terminal warnings.
struct UiDiagnostics;

impl Diagnostics for UiDiagnostics {
    fn emit(&self, diagnostic: &Diagnostic) {
        ui::warning(&diagnostic.to_string());
    }
}

#[tracing::instrument(skip(args), fields(input = %args.input))]
pub fn run_payment(args: CreateArgs, verbose: bool) -> Result<()> {
    let payload: InstructionPayload = read_json(&args.input)?;
    let (builder, secret_key, options) = prepare(&args)?;
    let token = builder.create_payment_instruction(&payload, &secret_key, &options)?;
    show(&args, &token, verbose)
}

#[tracing::instrument(skip(args), fields(input = %args.input))]
pub fn run_url(args: CreateArgs, verbose: bool) -> Result<()> {
    let payload: UrlPayload = read_json(&args.input)?;
    let (builder, secret_key, options) = prepare(&args)?;
    let token = builder.create_url_payload(&payload, &secret_key, &options)?;
    show(&args, &token, verbose)
}

fn prepare(args: &CreateArgs) -> Result<(PaymentInstructionsBuilder, String, CreateOptions)> {
    let options = create_options(args)?;
    let secret_key = match &args.secret_key {
        Some(key) => key.clone(),
        None if ui::is_interactive() => ui::password("Secret key")?,
        None => bail!("Secret key required: pass --secret-key or set NASPIP_SECRET_KEY"),
    };

    let mut builder = PaymentInstructionsBuilder::new();
    if !args.raw {
        builder = builder.with_diagnostics(Arc::new(UiDiagnostics));
    }
    Ok((builder, secret_key, options))
}

fn create_options(args: &CreateArgs) -> Result<CreateOptions> {
    let mut options: CreateOptions = match &args.options {
        Some(path) => read_json(path)?,
        None => CreateOptions::default(),
    };

    if let Some(kid) = &args.kid {
        options.key_id = kid.clone();
    }
    if let Some(kis) = &args.kis {
        options.key_issuer = kis.clone();
    }
    if let Some(kep) = &args.kep {
        options.key_expiration = kep.clone();
    }

    let sign = &mut options.sign;
    override_with(&mut sign.expires_in, args.expires_in.clone());
    override_with(&mut sign.not_before, args.not_before.clone());
    override_with(&mut sign.issuer, args.issuer.clone());
    override_with(&mut sign.subject, args.subject.clone());
    override_with(&mut sign.audience, args.audience.clone());
    override_with(&mut sign.jti, args.jti.clone());
    if let Some(footer) = &args.footer {
        sign.footer = Some(footer.clone().into_bytes());
    }

    if options.key_expiration.is_empty() {
        bail!("Key expiration required: pass --kep or set key_expiration in --options");
    }
    tracing::debug!(kid = %options.key_id, kis = %options.key_issuer, "Create options ready");
    Ok(options)
}

fn show(args: &CreateArgs, token: &str, verbose: bool) -> Result<()> {
    if args.raw {
        println!("{token}");
    } else {
        ui::success("Token created");
        ui::key_value("Token", token);
        if verbose {
            ui::key_value("Length", &token.len().to_string());
        }
    }

    if args.qr {
        ui::qr_code(token).context("Token too large for a QR code")?;
    }
    Ok(())
}
