//! Gateway operation codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::SchemaField;
use crate::schemas;

/// Transaction type sent to the gateway as the request's operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Authorize and capture a card payment.
    Auth,
    /// Record an authorization obtained out of band (voice approval).
    ForcedAuth,
    /// Authorize without capturing.
    Preauth,
    /// Capture a previous pre-authorization.
    Postauth,
    /// Re-authorize a previous transaction for a new amount.
    Reauth,
    /// Return funds for a settled transaction.
    Refund,
    /// Cancel an unsettled transaction.
    Void,
    /// Reverse an authorization hold.
    Reversal,
    /// Settle the open batch of one merchant.
    MchntSettlement,
    /// Settle the open batches of a merchant group.
    GroupSettlement,
    /// Verify a card without moving funds.
    Verify,
    /// Suspend a transaction so it is held back from settlement.
    Lock,
    /// Release a suspended transaction.
    Unlock,
}

impl Operation {
    /// Every operation, in gateway documentation order.
    pub const ALL: [Self; 13] = [
        Self::Auth,
        Self::ForcedAuth,
        Self::Preauth,
        Self::Postauth,
        Self::Reauth,
        Self::Refund,
        Self::Void,
        Self::Reversal,
        Self::MchntSettlement,
        Self::GroupSettlement,
        Self::Verify,
        Self::Lock,
        Self::Unlock,
    ];

    /// Returns the operation code as sent on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Auth => "AUTH",
            Self::ForcedAuth => "FORCED_AUTH",
            Self::Preauth => "PREAUTH",
            Self::Postauth => "POSTAUTH",
            Self::Reauth => "REAUTH",
            Self::Refund => "REFUND",
            Self::Void => "VOID",
            Self::Reversal => "REVERSAL",
            Self::MchntSettlement => "MCHNT_SETTLEMENT",
            Self::GroupSettlement => "GROUP_SETTLEMENT",
            Self::Verify => "VERIFY",
            Self::Lock => "LOCK",
            Self::Unlock => "UNLOCK",
        }
    }

    /// Returns the name of the [`Gateway`](crate::client::Gateway) method
    /// that sends this operation.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Auth => "authorize",
            Self::ForcedAuth => "forced_authorize",
            Self::Preauth => "preauthorize",
            Self::Postauth => "capture",
            Self::Reauth => "reauthorize",
            Self::Refund => "refund",
            Self::Void => "void",
            Self::Reversal => "reverse",
            Self::MchntSettlement => "settle_merchant",
            Self::GroupSettlement => "settle_group",
            Self::Verify => "verify",
            Self::Lock => "suspend",
            Self::Unlock => "resume",
        }
    }

    /// Returns the built-in parameter schema for this operation.
    #[must_use]
    pub const fn schema(self) -> &'static [SchemaField] {
        match self {
            Self::Auth | Self::Preauth => schemas::AUTHORIZE,
            Self::ForcedAuth => schemas::FORCED_AUTHORIZE,
            Self::Postauth => schemas::CAPTURE,
            Self::Reauth => schemas::REAUTHORIZE,
            Self::Refund => schemas::REFUND,
            Self::Void | Self::Lock | Self::Unlock => schemas::REFERENCE_ONLY,
            Self::Reversal => schemas::REVERSAL,
            Self::MchntSettlement => schemas::MERCHANT_SETTLEMENT,
            Self::GroupSettlement => schemas::GROUP_SETTLEMENT,
            Self::Verify => schemas::VERIFY,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An operation code this client does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation code '{0}'")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperation(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_matches_wire_codes() {
        for op in Operation::ALL {
            let encoded = serde_json::to_value(op).unwrap();
            assert_eq!(encoded, serde_json::Value::String(op.code().to_owned()));
            let decoded: Operation = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, op);
        }
    }

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("mchnt_settlement".parse::<Operation>(), Ok(Operation::MchntSettlement));
        assert_eq!("VOID".parse::<Operation>(), Ok(Operation::Void));
        assert_eq!(
            "CAPTURE".parse::<Operation>(),
            Err(UnknownOperation("CAPTURE".to_owned()))
        );
    }

    #[test]
    fn every_operation_has_a_schema() {
        for op in Operation::ALL {
            let schema = op.schema();
            let mut names: Vec<_> = schema.iter().map(|f| f.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), schema.len(), "duplicate field in {op} schema");
        }
    }

    #[test]
    fn method_names_are_distinct() {
        let mut names: Vec<_> = Operation::ALL.iter().map(|op| op.method_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Operation::ALL.len());
        assert_eq!(Operation::Postauth.method_name(), "capture");
    }
}
