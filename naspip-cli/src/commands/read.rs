//! Read command - verify a token and validate its claims

use anyhow::Result;
use naspip_lib::{PaymentInstructionsBuilder, ReadOptions, ReadResult, TokenData};

use super::{override_with, read_json};
use crate::{ui, ReadArgs};

#[tracing::instrument(skip(token, args))]
pub fn run(token: &str, args: ReadArgs, verbose: bool) -> Result<()> {
    let options = read_options(&args)?;
    let result = PaymentInstructionsBuilder::new().read(token, &args.public_key, &options)?;
    tracing::info!(kid = %result.claims.kid, "Token verified");

    if args.json {
        ui::json(&serde_json::to_value(&result)?);
    } else {
        show(&result, verbose)?;
    }
    Ok(())
}

fn read_options(args: &ReadArgs) -> Result<ReadOptions> {
    let mut options: ReadOptions = match &args.options {
        Some(path) => read_json(path)?,
        None => ReadOptions::new(),
    };

    override_with(&mut options.key_id, args.kid.clone());
    override_with(&mut options.key_issuer, args.kis.clone());
    override_with(&mut options.verify.issuer, args.issuer.clone());
    override_with(&mut options.verify.subject, args.subject.clone());
    override_with(&mut options.verify.audience, args.audience.clone());
    override_with(&mut options.verify.max_token_age, args.max_token_age.clone());
    if let Some(footer) = &args.footer {
        options.verify.footer = Some(footer.clone().into_bytes());
    }
    if args.ignore_nbf {
        options.verify.ignore_nbf = true;
    }
    if args.ignore_key_expiration {
        options.ignore_key_expiration = true;
    }
    Ok(options)
}

fn show(result: &ReadResult, verbose: bool) -> Result<()> {
    let claims = &result.claims;
    ui::success("Signature and claims valid");

    ui::header("Signing Key");
    ui::key_value("Issuer", &claims.kis);
    ui::key_value("Id", &claims.kid);
    ui::key_value("Expires", &claims.kep);

    ui::header("Token");
    for (name, value) in [
        ("Issuer", &claims.iss),
        ("Subject", &claims.sub),
        ("Audience", &claims.aud),
        ("Issued at", &claims.iat),
        ("Not before", &claims.nbf),
        ("Expires", &claims.exp),
        ("Token id", &claims.jti),
    ] {
        if let Some(value) = value {
            ui::key_value(name, value);
        }
    }
    if verbose {
        ui::key_value("Version", &format!("{}.{}", result.version, result.purpose));
    }

    ui::separator();
    match &claims.data {
        Some(TokenData::InstructionPayload(payload)) => {
            ui::header("Payment Instruction");
            let payment = &payload.payment;
            ui::key_value("Id", &payment.id);
            ui::key_value("Asset", &payment.unique_asset_id);
            ui::key_value("Address", &payment.address);
            match &payment.amount {
                Some(amount) if !payment.is_open => ui::key_value("Amount", amount),
                _ => ui::key_value("Amount", "open"),
            }
            if let Some(order) = &payload.order {
                ui::header("Order");
                ui::json(&serde_json::to_value(order)?);
            }
        }
        Some(TokenData::UrlPayload(payload)) => {
            ui::header("Payment URL");
            ui::key_value("Url", &payload.url);
            if !payload.payment_options.is_empty() {
                ui::key_value("Accepts", &payload.payment_options.join(", "));
            }
        }
        None => ui::warning("Token carries no payload"),
    }
    Ok(())
}
