//! Optional backend path. The same status/balance answers served by the
//! app backend instead of direct RPC, plus the best-effort claim-recording
//! endpoint. Eligibility semantics are identical on both paths.

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::balance::ContractBalance;
use crate::claim::ClaimRecorder;
use crate::error::{is_revert_message, AirdropError, Result};
use crate::status::{AirdropStatus, EligibilitySource, StatusSource};
use consts::{BACKEND_BALANCE_PATH, BACKEND_RECORD_CLAIM_PATH, BACKEND_STATUS_PATH};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    success: bool,
    #[serde(default)]
    can_claim: bool,
    #[serde(default)]
    time_remaining: u64,
    #[serde(default)]
    airdrop_amount: String,
    #[serde(default)]
    last_claim_time: u64,
    #[serde(default)]
    next_claim_time: u64,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    success: bool,
    #[serde(default)]
    balance: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordClaimRequest<'a> {
    wallet_address: Address,
    tx_hash: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordClaimResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        self.base_url.join(path).expect("backend path to be valid")
    }

    pub async fn fetch_status(&self, address: Address) -> Result<AirdropStatus> {
        let url = self.endpoint(BACKEND_STATUS_PATH);
        let response = self
            .client
            .get(url)
            .query(&[("address", address.to_string())])
            .send()
            .await
            .map_err(|e| self.unreachable(e.to_string()))?;

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| self.unreachable(format!("bad status response: {e}")))?;

        if !body.success {
            return Err(self.map_backend_error("status", body.error, body.details));
        }

        Ok(AirdropStatus {
            can_claim: body.can_claim,
            time_remaining: body.time_remaining,
            daily_amount: body.airdrop_amount,
            last_claim_time: body.last_claim_time,
            next_claim_time: body.next_claim_time,
            source: StatusSource::Backend,
        })
    }

    pub async fn fetch_balance(&self) -> Result<ContractBalance> {
        let url = self.endpoint(BACKEND_BALANCE_PATH);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.unreachable(e.to_string()))?;

        let body: BalanceResponse = response
            .json()
            .await
            .map_err(|e| self.unreachable(format!("bad balance response: {e}")))?;

        if !body.success {
            return Err(self.map_backend_error("contractBalance", body.error, None));
        }

        Ok(ContractBalance {
            balance: body.balance,
            rpc_used: self.base_url.to_string(),
        })
    }

    fn unreachable(&self, last_error: String) -> AirdropError {
        AirdropError::NetworkUnavailable {
            endpoints_tried: vec![self.base_url.to_string()],
            last_error,
        }
    }

    /// The backend forwards whatever the chain said; keep a revert
    /// distinguishable from the backend itself being down.
    fn map_backend_error(
        &self,
        call: &'static str,
        error: Option<String>,
        details: Option<String>,
    ) -> AirdropError {
        let message = details
            .or(error)
            .unwrap_or_else(|| "backend reported failure".to_string());
        if is_revert_message(&message) {
            AirdropError::ContractCallReverted { call, message }
        } else {
            self.unreachable(message)
        }
    }
}

#[async_trait]
impl EligibilitySource for BackendClient {
    async fn status_of(&self, address: Address) -> Result<AirdropStatus> {
        self.fetch_status(address).await
    }
}

#[async_trait]
impl ClaimRecorder for BackendClient {
    async fn record_claim(&self, address: Address, transaction_id: &str) -> Result<()> {
        let url = self.endpoint(BACKEND_RECORD_CLAIM_PATH);
        let response = self
            .client
            .post(url)
            .json(&RecordClaimRequest {
                wallet_address: address,
                tx_hash: transaction_id,
            })
            .send()
            .await
            .map_err(|e| AirdropError::RecordingFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AirdropError::RecordingFailed(format!(
                "backend error[{}]",
                response.status().as_u16()
            )));
        }

        let body: RecordClaimResponse = response
            .json()
            .await
            .map_err(|e| AirdropError::RecordingFailed(e.to_string()))?;
        if !body.success {
            return Err(AirdropError::RecordingFailed(
                body.error
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_shape_deserializes() {
        let body: StatusResponse = serde_json::from_str(
            r#"{
                "success": true,
                "lastClaimTime": 1750000000,
                "nextClaimTime": 1750086400,
                "canClaim": false,
                "timeRemaining": 82800,
                "airdropAmount": "50",
                "rpcUsed": "https://worldchain-mainnet.g.alchemy.com/public"
            }"#,
        )
        .unwrap();
        assert!(body.success);
        assert!(!body.can_claim);
        assert_eq!(body.time_remaining, 82800);
        assert_eq!(body.airdrop_amount, "50");
    }

    #[test]
    fn backend_failure_with_revert_details_maps_to_reverted() {
        let client = BackendClient::new(Url::parse("https://backend.example/").unwrap());
        let err = client.map_backend_error(
            "status",
            Some("Failed to connect to World Chain network".to_string()),
            Some("All RPC endpoints failed. Last error: execution reverted".to_string()),
        );
        assert!(matches!(err, AirdropError::ContractCallReverted { .. }));

        let err = client.map_backend_error("status", Some("Internal server error".to_string()), None);
        assert!(matches!(err, AirdropError::NetworkUnavailable { .. }));
    }

    #[test]
    fn record_request_serializes_with_wire_casing() {
        let req = RecordClaimRequest {
            wallet_address: Address::repeat_byte(0xAA),
            tx_hash: "0xfeed",
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["walletAddress"].as_str().unwrap().starts_with("0x"));
        assert_eq!(json["txHash"], "0xfeed");
    }
}
