//! The request body handed to the transport.

use serde::Serialize;

use crate::credentials::Credentials;
use crate::operation::Operation;
use crate::schema::Params;

/// A validated transaction ready for transmission.
///
/// Serializes as one flat JSON object: the operation code under
/// [`TransactionRequest::OPERATION_FIELD`], then the validated fields, then
/// the merged credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRequest {
    /// Operation code.
    pub operation: Operation,
    /// Validated transaction fields.
    #[serde(flatten)]
    pub fields: Params,
    /// Merged credentials.
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl TransactionRequest {
    /// JSON key carrying the operation code.
    pub const OPERATION_FIELD: &'static str = "operation";

    /// Assembles a request.
    ///
    /// Fields named like the operation code or a credential are dropped, so
    /// each key appears once on the wire and only `credentials` supplies
    /// credential values.
    #[must_use]
    pub fn new(operation: Operation, mut fields: Params, credentials: Credentials) -> Self {
        fields.remove(Self::OPERATION_FIELD);
        for name in Credentials::FIELDS {
            fields.remove(name);
        }
        Self {
            operation,
            fields,
            credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_flat() {
        let fields = json!({ "amount": 5.0, "reference": "abc123" });
        let request = TransactionRequest::new(
            Operation::Refund,
            fields.as_object().unwrap().clone(),
            Credentials::new().with_username("u").with_terminal("T1"),
        );
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "operation": "REFUND",
                "amount": 5.0,
                "reference": "abc123",
                "username": "u",
                "terminal": "T1",
            })
        );
    }

    #[test]
    fn colliding_fields_are_dropped() {
        let fields = json!({ "operation": "AUTH", "username": "spoof", "password": "stray" });
        let request = TransactionRequest::new(
            Operation::Void,
            fields.as_object().unwrap().clone(),
            Credentials::new().with_username("real"),
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["operation"], "VOID");
        assert_eq!(body["username"], "real");
        assert!(body.get("password").is_none());
    }
}
