//! Binary payload codec.
//!
//! Claims travel as protobuf. The message definitions below are written by
//! hand with `prost` derives; their field numbers are part of the wire format
//! and must not change, or tokens issued by other implementations will no
//! longer decode.

use crate::claims::ClaimSet;
use crate::payload::{
    InstructionItem, InstructionMerchant, InstructionOrder, InstructionPayload,
    PaymentInstruction, TokenData, UrlPayload,
};
use crate::{NaspipError, Result};
use prost::Message;

/// Wire messages.
pub mod wire {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct PaymentInstruction {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub address: String,
        #[prost(string, tag = "3")]
        pub address_tag: String,
        #[prost(string, tag = "4")]
        pub unique_asset_id: String,
        #[prost(bool, tag = "5")]
        pub is_open: bool,
        #[prost(string, tag = "6")]
        pub amount: String,
        #[prost(string, tag = "7")]
        pub min_amount: String,
        #[prost(string, tag = "8")]
        pub max_amount: String,
        #[prost(int64, tag = "9")]
        pub expires_at: i64,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct InstructionMerchant {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(string, tag = "2")]
        pub description: String,
        #[prost(string, tag = "3")]
        pub tax_id: String,
        #[prost(string, tag = "4")]
        pub image: String,
        #[prost(string, tag = "5")]
        pub mcc: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct InstructionItem {
        #[prost(string, tag = "1")]
        pub description: String,
        #[prost(string, tag = "2")]
        pub amount: String,
        #[prost(string, tag = "3")]
        pub coin_code: String,
        /// Unit price.
        #[prost(string, tag = "4")]
        pub price: String,
        #[prost(int32, tag = "5")]
        pub quantity: i32,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct InstructionOrder {
        #[prost(string, tag = "1")]
        pub total: String,
        #[prost(string, tag = "2")]
        pub coin_code: String,
        #[prost(string, tag = "3")]
        pub description: String,
        #[prost(message, optional, tag = "4")]
        pub merchant: Option<InstructionMerchant>,
        #[prost(message, repeated, tag = "5")]
        pub items: Vec<InstructionItem>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct InstructionPayload {
        #[prost(message, optional, tag = "1")]
        pub payment: Option<PaymentInstruction>,
        #[prost(message, optional, tag = "2")]
        pub order: Option<InstructionOrder>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct UrlPayload {
        #[prost(string, tag = "1")]
        pub url: String,
        #[prost(string, repeated, tag = "2")]
        pub payment_options: Vec<String>,
        #[prost(message, optional, tag = "3")]
        pub order: Option<InstructionOrder>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct PasetoTokenData {
        #[prost(string, tag = "1")]
        pub iss: String,
        #[prost(string, tag = "2")]
        pub sub: String,
        #[prost(string, tag = "3")]
        pub aud: String,
        #[prost(string, tag = "4")]
        pub exp: String,
        #[prost(string, tag = "5")]
        pub nbf: String,
        #[prost(string, tag = "6")]
        pub iat: String,
        #[prost(string, tag = "7")]
        pub jti: String,
        #[prost(string, tag = "8")]
        pub kid: String,
        #[prost(string, tag = "9")]
        pub kep: String,
        #[prost(string, tag = "10")]
        pub kis: String,
        #[prost(oneof = "Data", tags = "11, 12")]
        pub data: Option<Data>,
    }

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Data {
        #[prost(message, tag = "11")]
        InstructionPayload(InstructionPayload),
        #[prost(message, tag = "12")]
        UrlPayload(UrlPayload),
    }
}

/// Encode a claim set to protobuf bytes.
pub fn encode_claims(claims: &ClaimSet) -> Vec<u8> {
    wire::PasetoTokenData::from(claims).encode_to_vec()
}

/// Decode protobuf bytes into a claim set.
pub fn decode_claims(bytes: &[u8]) -> Result<ClaimSet> {
    let message = wire::PasetoTokenData::decode(bytes)?;
    ClaimSet::try_from(message)
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl From<&ClaimSet> for wire::PasetoTokenData {
    fn from(claims: &ClaimSet) -> Self {
        Self {
            iss: text(&claims.iss),
            sub: text(&claims.sub),
            aud: text(&claims.aud),
            exp: text(&claims.exp),
            nbf: text(&claims.nbf),
            iat: text(&claims.iat),
            jti: text(&claims.jti),
            kid: claims.kid.clone(),
            kep: claims.kep.clone(),
            kis: claims.kis.clone(),
            data: claims.data.as_ref().map(wire::Data::from),
        }
    }
}

impl TryFrom<wire::PasetoTokenData> for ClaimSet {
    type Error = NaspipError;

    fn try_from(message: wire::PasetoTokenData) -> Result<Self> {
        let data = message.data.map(TokenData::try_from).transpose()?;
        Ok(Self {
            iss: optional(message.iss),
            sub: optional(message.sub),
            aud: optional(message.aud),
            exp: optional(message.exp),
            nbf: optional(message.nbf),
            iat: optional(message.iat),
            jti: optional(message.jti),
            kid: message.kid,
            kis: message.kis,
            kep: message.kep,
            data,
        })
    }
}

impl From<&TokenData> for wire::Data {
    fn from(data: &TokenData) -> Self {
        match data {
            TokenData::InstructionPayload(payload) => {
                Self::InstructionPayload(wire::InstructionPayload {
                    payment: Some(wire::PaymentInstruction::from(&payload.payment)),
                    order: payload.order.as_ref().map(wire::InstructionOrder::from),
                })
            }
            TokenData::UrlPayload(payload) => Self::UrlPayload(wire::UrlPayload {
                url: payload.url.clone(),
                payment_options: payload.payment_options.clone(),
                order: payload.order.as_ref().map(wire::InstructionOrder::from),
            }),
        }
    }
}

impl TryFrom<wire::Data> for TokenData {
    type Error = NaspipError;

    fn try_from(data: wire::Data) -> Result<Self> {
        match data {
            wire::Data::InstructionPayload(payload) => {
                let payment = payload
                    .payment
                    .ok_or_else(|| NaspipError::Encoding("instruction payload without payment".into()))?;
                Ok(Self::InstructionPayload(InstructionPayload {
                    payment: payment.into(),
                    order: payload.order.map(InstructionOrder::from),
                }))
            }
            wire::Data::UrlPayload(payload) => Ok(Self::UrlPayload(UrlPayload {
                url: payload.url,
                payment_options: payload.payment_options,
                order: payload.order.map(InstructionOrder::from),
            })),
        }
    }
}

impl From<&PaymentInstruction> for wire::PaymentInstruction {
    fn from(payment: &PaymentInstruction) -> Self {
        Self {
            id: payment.id.clone(),
            address: payment.address.clone(),
            address_tag: text(&payment.address_tag),
            unique_asset_id: payment.unique_asset_id.clone(),
            is_open: payment.is_open,
            amount: text(&payment.amount),
            min_amount: text(&payment.min_amount),
            max_amount: text(&payment.max_amount),
            expires_at: payment.expires_at,
        }
    }
}

impl From<wire::PaymentInstruction> for PaymentInstruction {
    fn from(payment: wire::PaymentInstruction) -> Self {
        Self {
            id: payment.id,
            address: payment.address,
            address_tag: optional(payment.address_tag),
            unique_asset_id: payment.unique_asset_id,
            is_open: payment.is_open,
            amount: optional(payment.amount),
            min_amount: optional(payment.min_amount),
            max_amount: optional(payment.max_amount),
            expires_at: payment.expires_at,
        }
    }
}

impl From<&InstructionOrder> for wire::InstructionOrder {
    fn from(order: &InstructionOrder) -> Self {
        Self {
            total: order.total.clone(),
            coin_code: order.coin_code.clone(),
            description: text(&order.description),
            merchant: order.merchant.as_ref().map(|merchant| wire::InstructionMerchant {
                name: merchant.name.clone(),
                description: text(&merchant.description),
                tax_id: text(&merchant.tax_id),
                image: text(&merchant.image),
                mcc: text(&merchant.mcc),
            }),
            items: order
                .items
                .iter()
                .map(|item| wire::InstructionItem {
                    description: item.description.clone(),
                    amount: item.amount.clone(),
                    coin_code: item.coin_code.clone(),
                    price: text(&item.unit_price),
                    quantity: item.quantity.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl From<wire::InstructionOrder> for InstructionOrder {
    fn from(order: wire::InstructionOrder) -> Self {
        Self {
            total: order.total,
            coin_code: order.coin_code,
            description: optional(order.description),
            merchant: order.merchant.map(|merchant| InstructionMerchant {
                name: merchant.name,
                description: optional(merchant.description),
                tax_id: optional(merchant.tax_id),
                image: optional(merchant.image),
                mcc: optional(merchant.mcc),
            }),
            items: order
                .items
                .into_iter()
                .map(|item| InstructionItem {
                    description: item.description,
                    amount: item.amount,
                    coin_code: item.coin_code,
                    unit_price: optional(item.price),
                    quantity: (item.quantity != 0).then_some(item.quantity),
                })
                .collect(),
        }
    }
}
