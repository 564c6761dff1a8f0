//! Structural validation of payloads before signing.
//!
//! Each payload variant is checked by an ordered list of rules. A rule is a
//! closure over the payload returning `Some(FieldError)` when it fails; only
//! the first failure is reported. Apart from the payment id, address and
//! asset id, every rule applies only when its field is non-empty.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::payload::{present, InstructionOrder, InstructionPayload, UrlPayload};

/// First failing field of a payload, with a machine-readable reason code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
        }
    }

    /// Length-bound failure, coded as `<FIELD>_LENGTH_INVALID`.
    pub fn length(field: &str) -> Self {
        Self::new(field, format!("{}_LENGTH_INVALID", field.to_uppercase()))
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.code)
    }
}

impl std::error::Error for FieldError {}

type Rule<'a> = Box<dyn Fn() -> Option<FieldError> + 'a>;

fn first_failure(rules: Vec<Rule<'_>>) -> Result<(), FieldError> {
    match rules.iter().find_map(|rule| rule()) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Parse a decimal amount in plain or scientific notation.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// `value` is a decimal strictly greater than zero.
pub fn bigger_than_zero(value: &str) -> bool {
    parse_decimal(value).is_some_and(|d| d > Decimal::ZERO)
}

/// `value` is a decimal greater than or equal to zero.
pub fn bigger_than_or_equal_zero(value: &str) -> bool {
    parse_decimal(value).is_some_and(|d| d >= Decimal::ZERO)
}

fn length(field: &str, value: &str, min: usize, max: usize) -> Option<FieldError> {
    let count = value.chars().count();
    (count < min || count > max).then(|| FieldError::length(field))
}

fn optional_length(field: &str, value: Option<&str>, min: usize, max: usize) -> Option<FieldError> {
    value
        .filter(|v| !v.is_empty())
        .and_then(|v| length(field, v, min, max))
}

/// Absolute URL or absolute path.
fn is_request_uri(value: &str) -> bool {
    value.starts_with('/') || Url::parse(value).is_ok()
}

/// Absolute URL with a host.
fn is_request_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.has_host())
}

fn is_mcc(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a direct payment instruction.
pub fn validate_payment_instruction(payload: &InstructionPayload) -> Result<(), FieldError> {
    let payment = &payload.payment;

    let mut rules: Vec<Rule<'_>> = vec![
        Box::new(|| length("payment_id", &payment.id, 1, 1000)),
        Box::new(|| length("payment_address", &payment.address, 1, 1000)),
        Box::new(|| {
            length(
                "payment_address_tag",
                payment.address_tag.as_deref().unwrap_or_default(),
                0,
                100,
            )
        }),
        Box::new(|| length("payment_unique_asset_id", &payment.unique_asset_id, 1, 100)),
    ];

    if payment.is_open {
        rules.push(Box::new(|| {
            present(&payment.amount)
                .map(|_| FieldError::new("payment_amount", "PAYMENT_AMOUNT_NOT_ALLOWED"))
        }));
        rules.push(Box::new(|| {
            present(&payment.min_amount)
                .filter(|min| !bigger_than_or_equal_zero(min))
                .map(|_| FieldError::new("payment_min_amount", "PAYMENT_MIN_AMOUNT_INVALID"))
        }));
        rules.push(Box::new(|| {
            present(&payment.max_amount)
                .filter(|max| !bigger_than_zero(max))
                .map(|_| FieldError::new("payment_max_amount", "PAYMENT_MAX_AMOUNT_INVALID"))
        }));
    } else {
        rules.push(Box::new(|| {
            (!present(&payment.amount).is_some_and(bigger_than_zero))
                .then(|| FieldError::new("payment_amount", "PAYMENT_AMOUNT_INVALID"))
        }));
    }

    if let Some(order) = &payload.order {
        rules.extend(order_rules(order));
    }

    first_failure(rules)
}

/// Validate a URL redirect payload.
pub fn validate_url_payload(payload: &UrlPayload) -> Result<(), FieldError> {
    let mut rules: Vec<Rule<'_>> = vec![Box::new(|| {
        (!is_request_url(&payload.url)).then(|| FieldError::new("url", "URL_INVALID"))
    })];

    for (index, option) in payload.payment_options.iter().enumerate() {
        rules.push(Box::new(move || {
            length("payment_options", option, 3, 50).map(|_| {
                FieldError::new(
                    "payment_options",
                    format!("PAYMENT_OPTIONS_INDEX_[{index}]_INVALID"),
                )
            })
        }));
    }

    if let Some(order) = &payload.order {
        rules.extend(order_rules(order));
    }

    first_failure(rules)
}

fn order_rules(order: &InstructionOrder) -> Vec<Rule<'_>> {
    let mut rules: Vec<Rule<'_>> = vec![
        Box::new(move || optional_length("order_coin_code", Some(&order.coin_code), 2, 50)),
        Box::new(move || optional_length("order_description", order.description.as_deref(), 1, 200)),
        Box::new(move || {
            (!order.total.is_empty() && !bigger_than_or_equal_zero(&order.total))
                .then(|| FieldError::new("order_total", "ORDER_TOTAL_AMOUNT_INVALID"))
        }),
    ];

    if let Some(merchant) = &order.merchant {
        rules.push(Box::new(move || {
            optional_length("order_merchant_name", Some(&merchant.name), 3, 100)
        }));
        rules.push(Box::new(move || {
            optional_length(
                "order_merchant_description",
                merchant.description.as_deref(),
                3,
                200,
            )
        }));
        rules.push(Box::new(move || {
            optional_length("order_merchant_tax_id", merchant.tax_id.as_deref(), 6, 50)
        }));
        rules.push(Box::new(move || {
            present(&merchant.image)
                .filter(|image| !is_request_uri(image))
                .map(|_| FieldError::new("order_merchant_image", "ORDER_MERCHANT_IMAGE_INVALID"))
        }));
        rules.push(Box::new(move || {
            present(&merchant.mcc)
                .filter(|mcc| !is_mcc(mcc))
                .map(|_| FieldError::new("order_merchant_mcc", "ORDER_MERCHANT_MCC_INVALID"))
        }));
    }

    for (index, item) in order.items.iter().enumerate() {
        rules.push(Box::new(move || {
            if item.description.is_empty() {
                return None;
            }
            let prefix = format!("order_item_[{index}]");
            length(&format!("{prefix}_description"), &item.description, 3, 100)
                .or_else(|| {
                    (item.quantity.unwrap_or_default() <= 0).then(|| {
                        FieldError::new(
                            format!("{prefix}_quantity"),
                            format!("ORDER_ITEM_[{index}]_QUANTITY_INVALID"),
                        )
                    })
                })
                .or_else(|| {
                    (!bigger_than_or_equal_zero(&item.amount)).then(|| {
                        FieldError::new(
                            format!("{prefix}_amount"),
                            format!("ORDER_ITEM_[{index}]_TOTAL_AMOUNT_INVALID"),
                        )
                    })
                })
        }));
        rules.push(Box::new(move || {
            let field = format!("order_item_[{index}]_unit_price");
            let price = present(&item.unit_price)?;
            length(&field, price, 1, 20).or_else(|| {
                (!bigger_than_or_equal_zero(price)).then(|| {
                    FieldError::new(
                        field.as_str(),
                        format!("ORDER_ITEM_[{index}]_UNIT_PRICE_INVALID"),
                    )
                })
            })
        }));
        rules.push(Box::new(move || {
            optional_length(
                &format!("order_item_[{index}]_coin_code"),
                Some(&item.coin_code),
                2,
                50,
            )
        }));
    }

    rules
}
