//! The wallet-authorization capability. The mini app never signs anything
//! itself, it hands a transaction request to whichever provider was
//! injected at startup (World App in production, a mock in tests).

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::contract::AIRDROP_CONTRACT;

/// MiniKit-shaped transaction request, JSON on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub address: Address,
    pub function_name: String,
    pub args: Vec<serde_json::Value>,
}

impl TransactionRequest {
    /// The one transaction this app ever submits.
    pub fn claim_airdrop() -> Self {
        Self {
            address: *AIRDROP_CONTRACT,
            function_name: "claimAirdrop".to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Error,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub status: TransactionStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[async_trait]
pub trait WalletAuthorizer: Send + Sync {
    /// Whether the provider is present at all (MiniKit outside World App
    /// is not).
    fn is_available(&self) -> bool;

    /// Prompt the user and submit. Transport-level failures bubble up as-is
    /// and are mapped to the error taxonomy by the caller; an in-band
    /// rejection comes back as a normal response with `status: Error`.
    async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> anyhow::Result<TransactionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_request_targets_the_airdrop_contract() {
        let req = TransactionRequest::claim_airdrop();
        assert_eq!(req.address, *AIRDROP_CONTRACT);
        assert_eq!(req.function_name, "claimAirdrop");
        assert!(req.args.is_empty());
    }

    #[test]
    fn provider_error_payload_deserializes() {
        let resp: TransactionResponse = serde_json::from_str(
            r#"{"status":"error","message":"user rejected the request"}"#,
        )
        .unwrap();
        assert_eq!(resp.status, TransactionStatus::Error);
        assert_eq!(resp.transaction_id, None);
        assert_eq!(resp.message.as_deref(), Some("user rejected the request"));
    }

    #[test]
    fn provider_success_payload_deserializes() {
        let resp: TransactionResponse =
            serde_json::from_str(r#"{"status":"success","transactionId":"0xabc123"}"#).unwrap();
        assert_eq!(resp.status, TransactionStatus::Success);
        assert_eq!(resp.transaction_id.as_deref(), Some("0xabc123"));
    }
}
