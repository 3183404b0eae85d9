//! Built-in parameter schemas for each gateway operation.
//!
//! Credentials are not listed here; they are merged separately from client
//! defaults and per-call options.

use crate::schema::{FieldKind, SchemaField};

/// `AUTH` and `PREAUTH`.
pub const AUTHORIZE: &[SchemaField] = &[
    SchemaField::required("amount", FieldKind::Number),
    SchemaField::required("entry_mode", FieldKind::String).max_length(16),
    SchemaField::required("card_number", FieldKind::String).max_length(19),
    SchemaField::required("card_exp", FieldKind::String).max_length(4),
    SchemaField::optional("security_code", FieldKind::String).max_length(4),
    SchemaField::optional("cardholder_name", FieldKind::String).max_length(64),
    SchemaField::optional("avs_address", FieldKind::String).max_length(64),
    SchemaField::optional("avs_zip", FieldKind::String).max_length(10),
    SchemaField::optional("invoice", FieldKind::String).max_length(25),
    SchemaField::optional("tax_amount", FieldKind::Number),
    SchemaField::optional("tip_amount", FieldKind::Number),
];

/// `FORCED_AUTH`: an authorization plus the out-of-band approval code.
pub const FORCED_AUTHORIZE: &[SchemaField] = &[
    SchemaField::required("amount", FieldKind::Number),
    SchemaField::required("entry_mode", FieldKind::String).max_length(16),
    SchemaField::required("card_number", FieldKind::String).max_length(19),
    SchemaField::required("card_exp", FieldKind::String).max_length(4),
    SchemaField::required("approval_code", FieldKind::String).max_length(6),
    SchemaField::optional("cardholder_name", FieldKind::String).max_length(64),
    SchemaField::optional("invoice", FieldKind::String).max_length(25),
    SchemaField::optional("tax_amount", FieldKind::Number),
];

/// `POSTAUTH`.
pub const CAPTURE: &[SchemaField] = &[
    SchemaField::required("amount", FieldKind::Number),
    SchemaField::required("reference", FieldKind::String).max_length(32),
    SchemaField::optional("tip_amount", FieldKind::Number),
];

/// `REAUTH`.
pub const REAUTHORIZE: &[SchemaField] = &[
    SchemaField::required("amount", FieldKind::Number),
    SchemaField::required("reference", FieldKind::String).max_length(32),
];

/// `REFUND`.
pub const REFUND: &[SchemaField] = &[
    SchemaField::required("amount", FieldKind::Number),
    SchemaField::required("reference", FieldKind::String).max_length(32),
    SchemaField::optional("invoice", FieldKind::String).max_length(25),
];

/// `VOID`, `LOCK` and `UNLOCK`.
pub const REFERENCE_ONLY: &[SchemaField] =
    &[SchemaField::required("reference", FieldKind::String).max_length(32)];

/// `REVERSAL`; a missing amount reverses the full authorization.
pub const REVERSAL: &[SchemaField] = &[
    SchemaField::required("reference", FieldKind::String).max_length(32),
    SchemaField::optional("amount", FieldKind::Number),
];

/// `MCHNT_SETTLEMENT`.
pub const MERCHANT_SETTLEMENT: &[SchemaField] = &[
    SchemaField::optional("batch_number", FieldKind::Number),
    SchemaField::optional("settlement_date", FieldKind::String).max_length(8),
];

/// `GROUP_SETTLEMENT`.
pub const GROUP_SETTLEMENT: &[SchemaField] = &[
    SchemaField::required("group_id", FieldKind::String).max_length(32),
    SchemaField::optional("settlement_date", FieldKind::String).max_length(8),
];

/// `VERIFY`.
pub const VERIFY: &[SchemaField] = &[
    SchemaField::required("entry_mode", FieldKind::String).max_length(16),
    SchemaField::required("card_number", FieldKind::String).max_length(19),
    SchemaField::required("card_exp", FieldKind::String).max_length(4),
    SchemaField::optional("security_code", FieldKind::String).max_length(4),
    SchemaField::optional("avs_address", FieldKind::String).max_length(64),
    SchemaField::optional("avs_zip", FieldKind::String).max_length(10),
];
