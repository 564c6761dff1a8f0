//! Payload variants carried inside a token.
//!
//! A token carries exactly one [`TokenData`]: either a complete
//! [`InstructionPayload`] a wallet can pay directly, or a [`UrlPayload`]
//! redirecting the wallet to a service that issues the instruction.
//!
//! Optional text fields are `Option<String>`. The wire format cannot tell an
//! empty string from an absent one, so decoded payloads always use `None`.

use serde::{Deserialize, Serialize};

/// Recipient and amount constraints of a payment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstruction {
    /// Unique payment identifier.
    pub id: String,
    /// Recipient address.
    pub address: String,
    /// Memo or tag for networks that need one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_tag: Option<String>,
    /// Asset identifier, e.g. `ntrc20_tTR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t`.
    pub unique_asset_id: String,
    /// Whether the payer chooses the amount.
    #[serde(default)]
    pub is_open: bool,
    /// Fixed amount, required when the payment is not open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Lower bound for open payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<String>,
    /// Upper bound for open payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<String>,
    /// Payment deadline in unix milliseconds.
    #[serde(default)]
    pub expires_at: i64,
}

/// Merchant details shown to the payer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionMerchant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// Logo as an absolute URL, data URI or absolute path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// ISO 18245 merchant category code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcc: Option<String>,
}

/// A single order line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionItem {
    pub description: String,
    /// Line total.
    pub amount: String,
    pub coin_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

/// Order metadata shared by both payload variants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionOrder {
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub coin_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<InstructionMerchant>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<InstructionItem>,
}

/// Direct payment instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionPayload {
    pub payment: PaymentInstruction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<InstructionOrder>,
}

/// Redirect to a service that produces the payment instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPayload {
    pub url: String,
    /// Asset identifiers the service accepts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<InstructionOrder>,
}

/// The payload variant carried by a token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenData {
    InstructionPayload(InstructionPayload),
    UrlPayload(UrlPayload),
}

impl TokenData {
    /// The payment instruction, if this is a direct instruction.
    pub fn as_instruction(&self) -> Option<&InstructionPayload> {
        match self {
            Self::InstructionPayload(payload) => Some(payload),
            Self::UrlPayload(_) => None,
        }
    }

    /// The redirect, if this is a URL payload.
    pub fn as_url(&self) -> Option<&UrlPayload> {
        match self {
            Self::InstructionPayload(_) => None,
            Self::UrlPayload(payload) => Some(payload),
        }
    }

    /// Order metadata of either variant.
    pub fn order(&self) -> Option<&InstructionOrder> {
        match self {
            Self::InstructionPayload(payload) => payload.order.as_ref(),
            Self::UrlPayload(payload) => payload.order.as_ref(),
        }
    }
}

impl From<InstructionPayload> for TokenData {
    fn from(payload: InstructionPayload) -> Self {
        Self::InstructionPayload(payload)
    }
}

impl From<UrlPayload> for TokenData {
    fn from(payload: UrlPayload) -> Self {
        Self::UrlPayload(payload)
    }
}

/// `Some` only when the optional text is present and non-empty.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
