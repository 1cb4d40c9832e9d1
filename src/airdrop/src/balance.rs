//! Pool and wallet token balances, for display only.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::contract::format_token_amount;
use crate::error::Result;
use crate::rpc::RpcEndpointSelector;
use consts::CONTRACT_CALL_TIMEOUT;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractBalance {
    pub balance: String,
    pub rpc_used: String,
}

pub struct ContractBalanceReader {
    selector: RpcEndpointSelector,
}

impl ContractBalanceReader {
    pub fn new(selector: RpcEndpointSelector) -> Self {
        Self { selector }
    }

    /// Tokens left in the airdrop pool as a decimal display string.
    pub async fn read(&self) -> Result<ContractBalance> {
        self.selector
            .run_with_failover(|ep| async move {
                let contract = ep.airdrop_contract();
                let balance = match timeout(
                    CONTRACT_CALL_TIMEOUT,
                    contract.contractBalance().call(),
                )
                .await
                {
                    Ok(Ok(balance)) => balance,
                    Ok(Err(e)) => return Err(format!("contractBalance call failed: {e}")),
                    Err(_) => {
                        return Err(format!(
                            "contractBalance call timed out after {}s",
                            CONTRACT_CALL_TIMEOUT.as_secs()
                        ))
                    }
                };

                Ok(ContractBalance {
                    balance: format_token_amount(balance),
                    rpc_used: ep.url.to_string(),
                })
            })
            .await
    }

    /// TPF held by a wallet, same display formatting as the pool balance.
    pub async fn user_balance(&self, address: Address) -> Result<ContractBalance> {
        self.selector
            .run_with_failover(|ep| async move {
                let token = ep.token_contract();
                let balance =
                    match timeout(CONTRACT_CALL_TIMEOUT, token.balanceOf(address).call()).await {
                        Ok(Ok(balance)) => balance,
                        Ok(Err(e)) => return Err(format!("balanceOf call failed: {e}")),
                        Err(_) => {
                            return Err(format!(
                                "balanceOf call timed out after {}s",
                                CONTRACT_CALL_TIMEOUT.as_secs()
                            ))
                        }
                    };

                Ok(ContractBalance {
                    balance: format_token_amount(balance),
                    rpc_used: ep.url.to_string(),
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AirdropError;
    use reqwest::Url;

    #[tokio::test]
    async fn unreachable_endpoints_surface_as_network_unavailable() {
        let reader = ContractBalanceReader::new(RpcEndpointSelector::new(vec![Url::parse(
            "http://127.0.0.1:1/",
        )
        .unwrap()]));
        let err = reader.read().await.unwrap_err();
        assert!(matches!(err, AirdropError::NetworkUnavailable { .. }));
    }
}
