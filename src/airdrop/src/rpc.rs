//! Endpoint selection with failover. Every read re-probes the list from the
//! top; whichever endpoint answers first serves the call.

use std::future::Future;

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use reqwest::Url;
use tokio::time::timeout;

use crate::contract::{
    AirdropContract, IAirdrop, ITpfToken, TokenContract, AIRDROP_CONTRACT, TPF_TOKEN,
};
use crate::error::{AirdropError, Result};
use consts::{RPC_ENDPOINTS, RPC_PROBE_TIMEOUT};

/// A probed endpoint known to be live and hosting the airdrop contract.
#[derive(Clone, Debug)]
pub struct BoundEndpoint {
    pub url: Url,
    pub provider: DynProvider,
}

impl BoundEndpoint {
    pub fn airdrop_contract(&self) -> AirdropContract {
        IAirdrop::new(*AIRDROP_CONTRACT, self.provider.clone())
    }

    pub fn token_contract(&self) -> TokenContract {
        ITpfToken::new(*TPF_TOKEN, self.provider.clone())
    }
}

pub struct RpcEndpointSelector {
    endpoints: Vec<Url>,
}

impl Default for RpcEndpointSelector {
    fn default() -> Self {
        Self::new(RPC_ENDPOINTS.clone())
    }
}

impl RpcEndpointSelector {
    pub fn new(endpoints: Vec<Url>) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    /// First endpoint that passes the liveness probe and has contract code
    /// deployed. Probe failures are logged and skipped; exhausting the list
    /// is terminal.
    pub async fn select(&self) -> Result<BoundEndpoint> {
        self.run_with_failover(|ep| async move { Ok::<_, String>(ep) })
            .await
    }

    /// Run `op` against endpoints in preference order until one of them
    /// produces a result. An op failure counts the same as a dead endpoint:
    /// a live node serving a broken view call should not end the read. The
    /// error side of `op` is the skip reason, surfaced only if the whole
    /// list is exhausted.
    pub async fn run_with_failover<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(BoundEndpoint) -> Fut,
        Fut: Future<Output = std::result::Result<T, String>>,
    {
        let mut endpoints_tried = Vec::with_capacity(self.endpoints.len());
        let mut last_error = "no rpc endpoints configured".to_string();

        for url in &self.endpoints {
            endpoints_tried.push(url.to_string());

            let provider = match self.probe(url).await {
                Ok(provider) => provider,
                Err(reason) => {
                    log::warn!("skipping rpc endpoint {url}: {reason}");
                    last_error = reason;
                    continue;
                }
            };

            let bound = BoundEndpoint {
                url: url.clone(),
                provider,
            };
            match op(bound).await {
                Ok(value) => return Ok(value),
                Err(reason) => {
                    log::warn!("rpc endpoint {url} failed mid-call: {reason}");
                    last_error = reason;
                }
            }
        }

        Err(AirdropError::NetworkUnavailable {
            endpoints_tried,
            last_error,
        })
    }

    /// Liveness probe: fetch the latest block height within the probe window,
    /// then check the contract actually has code at this endpoint. A node
    /// that answers but serves the wrong chain is as useless as a dead one.
    async fn probe(&self, url: &Url) -> std::result::Result<DynProvider, String> {
        let provider = ProviderBuilder::new().connect_http(url.clone()).erased();

        match timeout(RPC_PROBE_TIMEOUT, provider.get_block_number()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(format!("liveness probe failed: {e}")),
            Err(_) => {
                return Err(format!(
                    "liveness probe timed out after {}s",
                    RPC_PROBE_TIMEOUT.as_secs()
                ))
            }
        }

        match timeout(RPC_PROBE_TIMEOUT, provider.get_code_at(*AIRDROP_CONTRACT)).await {
            Ok(Ok(code)) if code.is_empty() => {
                Err(format!("no contract code at {}", *AIRDROP_CONTRACT))
            }
            Ok(Ok(_)) => Ok(provider),
            Ok(Err(e)) => Err(format!("code check failed: {e}")),
            Err(_) => Err("code check timed out".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_selector() -> RpcEndpointSelector {
        RpcEndpointSelector::new(vec![
            Url::parse("http://127.0.0.1:1/").unwrap(),
            Url::parse("http://127.0.0.1:2/").unwrap(),
        ])
    }

    #[tokio::test]
    async fn exhausted_list_reports_every_endpoint_tried() {
        let selector = unreachable_selector();
        let err = selector.select().await.unwrap_err();
        match err {
            AirdropError::NetworkUnavailable {
                endpoints_tried, ..
            } => {
                assert_eq!(
                    endpoints_tried,
                    vec!["http://127.0.0.1:1/", "http://127.0.0.1:2/"]
                );
            }
            other => panic!("expected NetworkUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failover_never_runs_the_op_without_a_live_endpoint() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let selector = unreachable_selector();
        let ran = AtomicBool::new(false);
        let result: Result<()> = selector
            .run_with_failover(|_| {
                ran.store(true, Ordering::SeqCst);
                async { Ok::<(), String>(()) }
            })
            .await;
        assert!(!ran.load(Ordering::SeqCst));
        assert!(matches!(
            result,
            Err(AirdropError::NetworkUnavailable { .. })
        ));
    }
}
