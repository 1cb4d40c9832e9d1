//! Claim eligibility for a wallet address: can it claim now, and if not,
//! when can it.

use std::future::IntoFuture;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::contract::format_token_amount;
use crate::error::{is_revert_message, AirdropError, Result};
use crate::offline::OfflineEligibilityCache;
use crate::rpc::{BoundEndpoint, RpcEndpointSelector};
use consts::{CONTRACT_CALL_TIMEOUT, DEFAULT_DAILY_AIRDROP};
use utils::unix_now;

/// Where an [`AirdropStatus`] came from. Degraded answers must be
/// distinguishable from authoritative ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum StatusSource {
    #[serde(rename_all = "camelCase")]
    Chain { rpc_used: String },
    Backend,
    OfflineCache,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropStatus {
    pub can_claim: bool,
    pub time_remaining: u64,
    pub daily_amount: String,
    pub last_claim_time: u64,
    pub next_claim_time: u64,
    pub source: StatusSource,
}

impl AirdropStatus {
    /// Apply the eligibility invariant to raw contract values.
    pub fn from_parts(
        last_claim_time: u64,
        claim_interval: u64,
        daily_amount: String,
        now: u64,
        source: StatusSource,
    ) -> Self {
        let (can_claim, time_remaining) = eligibility(last_claim_time, claim_interval, now);
        Self {
            can_claim,
            time_remaining,
            daily_amount,
            last_claim_time,
            next_claim_time: last_claim_time.saturating_add(claim_interval),
            source,
        }
    }

    /// Status for an address the contract has never seen. The contract
    /// reverts its views for these, so the real daily amount is unknown and
    /// the default display value stands in.
    pub fn fresh_address(source: StatusSource) -> Self {
        Self {
            can_claim: true,
            time_remaining: 0,
            daily_amount: DEFAULT_DAILY_AIRDROP.to_string(),
            last_claim_time: 0,
            next_claim_time: 0,
            source,
        }
    }
}

/// canClaim iff the interval has fully elapsed (or there is no record yet).
pub(crate) fn eligibility(last_claim_time: u64, claim_interval: u64, now: u64) -> (bool, u64) {
    if last_claim_time == 0 {
        return (true, 0);
    }
    let next = last_claim_time.saturating_add(claim_interval);
    if now >= next {
        (true, 0)
    } else {
        (false, next - now)
    }
}

/// The status path is swappable: direct RPC here, the backend proxy in
/// [`crate::backend`], stubs in tests. The claim executor only sees this.
#[async_trait]
pub trait EligibilitySource: Send + Sync {
    async fn status_of(&self, address: Address) -> Result<AirdropStatus>;
}

pub struct AirdropStatusResolver {
    selector: RpcEndpointSelector,
    offline: Option<std::sync::Arc<OfflineEligibilityCache>>,
}

impl AirdropStatusResolver {
    pub fn new(selector: RpcEndpointSelector) -> Self {
        Self {
            selector,
            offline: None,
        }
    }

    /// Attach the degraded-mode cache. It is only ever consulted after the
    /// whole endpoint list has failed, and it is invalidated the moment an
    /// authoritative answer lands.
    pub fn with_offline_cache(mut self, cache: std::sync::Arc<OfflineEligibilityCache>) -> Self {
        self.offline = Some(cache);
        self
    }

    pub async fn resolve(&self, address: Address) -> Result<AirdropStatus> {
        let chain = self
            .selector
            .run_with_failover(|ep| Self::read_status_at(ep, address))
            .await;

        match chain {
            Ok(status) => {
                if let Some(cache) = &self.offline {
                    cache.invalidate(address);
                }
                Ok(status)
            }
            Err(err @ AirdropError::NetworkUnavailable { .. }) => {
                if let Some(status) = self
                    .offline
                    .as_ref()
                    .and_then(|c| c.degraded_status(address, unix_now()))
                {
                    log::warn!("serving degraded offline status for {address}: {err}");
                    return Ok(status);
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    async fn read_status_at(
        ep: BoundEndpoint,
        address: Address,
    ) -> std::result::Result<AirdropStatus, String> {
        let contract = ep.airdrop_contract();
        let source = StatusSource::Chain {
            rpc_used: ep.url.to_string(),
        };

        let last_claim_call = contract.lastClaimTime(address);
        let claim_interval_call = contract.CLAIM_INTERVAL();
        let daily_airdrop_call = contract.DAILY_AIRDROP();
        let reads = timeout(CONTRACT_CALL_TIMEOUT, async {
            futures::try_join!(
                last_claim_call.call().into_future(),
                claim_interval_call.call().into_future(),
                daily_airdrop_call.call().into_future(),
            )
        })
        .await;

        let (last_claim_time, claim_interval, daily_airdrop) = match reads {
            Err(_) => {
                return Err(format!(
                    "contract call timed out after {}s",
                    CONTRACT_CALL_TIMEOUT.as_secs()
                ))
            }
            Ok(Err(e)) if is_revert_message(&e.to_string()) => {
                // No claim record exists yet for this address.
                return Ok(AirdropStatus::fresh_address(source));
            }
            Ok(Err(e)) => return Err(format!("contract read failed: {e}")),
            Ok(Ok(values)) => values,
        };

        let last_claim_time = last_claim_time.saturating_to::<u64>();
        let claim_interval = claim_interval.saturating_to::<u64>();
        let now = unix_now();

        // canClaim is read separately: it reverts for fresh addresses, in
        // which case eligibility is computed locally from the timestamps.
        let can_claim = match timeout(CONTRACT_CALL_TIMEOUT, contract.canClaim(address).call())
            .await
        {
            Ok(Ok(can)) => can,
            Ok(Err(e)) => {
                log::debug!("canClaim({address}) failed, computing locally: {e}");
                eligibility(last_claim_time, claim_interval, now).0
            }
            Err(_) => {
                log::debug!("canClaim({address}) timed out, computing locally");
                eligibility(last_claim_time, claim_interval, now).0
            }
        };

        let next_claim_time = last_claim_time.saturating_add(claim_interval);
        let time_remaining = if can_claim {
            0
        } else {
            next_claim_time.saturating_sub(now)
        };

        Ok(AirdropStatus {
            can_claim,
            time_remaining,
            daily_amount: format_token_amount(daily_airdrop),
            last_claim_time,
            next_claim_time,
            source,
        })
    }
}

#[async_trait]
impl EligibilitySource for AirdropStatusResolver {
    async fn status_of(&self, address: Address) -> Result<AirdropStatus> {
        self.resolve(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 24 * 60 * 60;
    const NOW: u64 = 1_750_000_000;

    #[test]
    fn never_claimed_address_can_claim_immediately() {
        let status = AirdropStatus::from_parts(
            0,
            DAY,
            "50".to_string(),
            NOW,
            StatusSource::Backend,
        );
        assert!(status.can_claim);
        assert_eq!(status.time_remaining, 0);
        assert_eq!(status.daily_amount, "50");
    }

    #[test]
    fn mid_cooldown_address_waits_the_exact_remainder() {
        let status = AirdropStatus::from_parts(
            NOW - 3600,
            DAY,
            "50".to_string(),
            NOW,
            StatusSource::Backend,
        );
        assert!(!status.can_claim);
        assert_eq!(status.time_remaining, 82800);
        assert_eq!(status.next_claim_time, NOW - 3600 + DAY);
    }

    #[test]
    fn elapsed_cooldown_reopens_the_claim() {
        let (can, remaining) = eligibility(NOW - DAY, DAY, NOW);
        assert!(can);
        assert_eq!(remaining, 0);

        let (can, remaining) = eligibility(NOW - DAY - 1, DAY, NOW);
        assert!(can);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn eligibility_is_stable_for_identical_inputs() {
        let first = eligibility(NOW - 3600, DAY, NOW);
        let second = eligibility(NOW - 3600, DAY, NOW);
        assert_eq!(first, second);
    }

    #[test]
    fn fresh_address_defaults_match_the_contract_fallback() {
        let status = AirdropStatus::fresh_address(StatusSource::OfflineCache);
        assert!(status.can_claim);
        assert_eq!(status.time_remaining, 0);
        assert_eq!(status.daily_amount, consts::DEFAULT_DAILY_AIRDROP);
        assert_eq!(status.last_claim_time, 0);
    }

    #[test]
    fn status_serializes_with_the_wire_casing() {
        let status = AirdropStatus::from_parts(
            NOW - 3600,
            DAY,
            "50".to_string(),
            NOW,
            StatusSource::Chain {
                rpc_used: "https://rpc.example/".to_string(),
            },
        );
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["canClaim"], false);
        assert_eq!(json["timeRemaining"], 82800);
        assert_eq!(json["source"]["rpcUsed"], "https://rpc.example/");
    }
}
