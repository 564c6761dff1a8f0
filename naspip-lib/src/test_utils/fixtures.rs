//! Test fixtures and data generators.

use chrono::{TimeDelta, Utc};

use crate::config::{CreateOptions, ReadOptions};
use crate::payload::{
    InstructionItem, InstructionMerchant, InstructionOrder, InstructionPayload,
    PaymentInstruction, UrlPayload,
};
use crate::timestamp::format_rfc3339_millis;

/// PASERK public key matching [`SECRET_KEY`].
pub const PUBLIC_KEY: &str = "k4.public.sGVse4eAyt6ycfmkKl3Az7RxB34nklDPgKbNLvxVwlk";
/// PASERK secret key.
pub const SECRET_KEY: &str =
    "k4.secret.y4-gze54dwfLR0eyxiJL2mRicZr6SX2-xIn6kgo999iwZWx7h4DK3rJx-aQqXcDPtHEHfieSUM-Aps0u_FXCWQ";

/// An unrelated key pair.
pub const OTHER_PUBLIC_KEY: &str = "k4.public.I1bDM2T-nlLuo_HDCCt_0-Y5-f80VZ82-uuYFyHYuqI";
pub const OTHER_SECRET_KEY: &str =
    "k4.secret.7TKiFPW-8SPF1CRHl74sx-bCrGhcH74b621Ac7S5h0MjVsMzZP6eUu6j8cMIK3_T5jn5_zRVnzb665gXIdi6og";

pub const TEST_KEY_ID: &str = "key-id-one";
pub const TEST_KEY_ISSUER: &str = "payment-processor.com";
pub const TEST_TOKEN_ISSUER: &str = "qrCrypto.com";

/// Payment deadline used by [`sample_instruction`], 2100-01-01 in unix ms.
pub const SAMPLE_EXPIRES_AT: i64 = 4_102_444_800_000;

/// RFC3339 timestamp `days` from now. Negative values are in the past.
pub fn key_expiration_in(days: i64) -> String {
    format_rfc3339_millis(Utc::now() + TimeDelta::days(days))
}

/// Create options for the test key, valid for a year, with a five minute
/// token lifetime.
pub fn create_options() -> CreateOptions {
    CreateOptions::new(TEST_KEY_ID, TEST_KEY_ISSUER, key_expiration_in(365))
        .with_issuer(TEST_TOKEN_ISSUER)
        .with_expires_in("5m")
}

/// Read options matching [`create_options`].
pub fn read_options() -> ReadOptions {
    ReadOptions::new()
        .with_key_id(TEST_KEY_ID)
        .with_key_issuer(TEST_KEY_ISSUER)
        .with_issuer(TEST_TOKEN_ISSUER)
}

fn sample_order() -> InstructionOrder {
    InstructionOrder {
        total: "100".into(),
        coin_code: "USDT".into(),
        description: Some("Order #1234".into()),
        merchant: Some(InstructionMerchant {
            name: "Corner Coffee".into(),
            description: Some("Coffee and pastries".into()),
            tax_id: Some("12345678000190".into()),
            image: Some("https://cdn.example.com/logo.png".into()),
            mcc: Some("5814".into()),
        }),
        items: vec![
            InstructionItem {
                description: "Flat white".into(),
                amount: "60".into(),
                coin_code: "USDT".into(),
                unit_price: Some("30".into()),
                quantity: Some(2),
            },
            InstructionItem {
                description: "Croissant".into(),
                amount: "40".into(),
                coin_code: "USDT".into(),
                unit_price: Some("40".into()),
                quantity: Some(1),
            },
        ],
    }
}

/// A closed payment with a full order. Passes validation.
pub fn sample_instruction() -> InstructionPayload {
    InstructionPayload {
        payment: PaymentInstruction {
            id: "payment-id".into(),
            address: "crypto-address".into(),
            address_tag: Some("memo-42".into()),
            unique_asset_id: "ntrc20_tTR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".into(),
            is_open: false,
            amount: Some("100".into()),
            min_amount: None,
            max_amount: None,
            expires_at: SAMPLE_EXPIRES_AT,
        },
        order: Some(sample_order()),
    }
}

/// A redirect payload with an order. Passes validation.
pub fn sample_url_payload() -> UrlPayload {
    UrlPayload {
        url: "https://pay.example.com/checkout/1234".into(),
        payment_options: vec![
            "ntrc20_tTR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".into(),
            "bitcoin".into(),
        ],
        order: Some(sample_order()),
    }
}
