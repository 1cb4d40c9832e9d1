//! Claim submission. One attempt walks
//! idle -> verifying eligibility -> awaiting wallet authorization ->
//! submitting -> confirming -> succeeded | failed,
//! with at most one attempt in flight per address.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Serialize;
use tokio::time::timeout;

use crate::error::{AirdropError, Result};
use crate::offline::OfflineEligibilityCache;
use crate::status::EligibilitySource;
use crate::wallet::{TransactionRequest, TransactionStatus, WalletAuthorizer};
use consts::WALLET_AUTH_TIMEOUT;
use utils::unix_now;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimPhase {
    Idle,
    VerifyingEligibility,
    AwaitingWalletAuthorization,
    Submitting,
    Confirming,
    Succeeded,
    Failed,
}

/// Outcome of a successful claim. Callers should re-poll status after
/// [`consts::POST_CLAIM_REFRESH_DELAY`] instead of trusting local state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub transaction_id: String,
}

/// UI projection of one claim attempt, consumed right away by the claim
/// screen.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimTransactionResult {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub error_message: Option<String>,
}

impl From<&Result<ClaimReceipt>> for ClaimTransactionResult {
    fn from(result: &Result<ClaimReceipt>) -> Self {
        match result {
            Ok(receipt) => Self {
                success: true,
                transaction_id: Some(receipt.transaction_id.clone()),
                error_message: None,
            },
            Err(e) => Self {
                success: false,
                transaction_id: None,
                error_message: Some(e.user_message()),
            },
        }
    }
}

/// Best-effort bookkeeping after a successful on-chain claim. Failures are
/// tolerated, the transaction is the source of truth.
#[async_trait]
pub trait ClaimRecorder: Send + Sync {
    async fn record_claim(&self, address: Address, transaction_id: &str) -> Result<()>;
}

pub struct AirdropClaimExecutor {
    eligibility: Arc<dyn EligibilitySource>,
    wallet: Arc<dyn WalletAuthorizer>,
    recorder: Option<Arc<dyn ClaimRecorder>>,
    offline: Option<Arc<OfflineEligibilityCache>>,
    in_flight: Mutex<HashSet<Address>>,
}

impl AirdropClaimExecutor {
    pub fn new(eligibility: Arc<dyn EligibilitySource>, wallet: Arc<dyn WalletAuthorizer>) -> Self {
        Self {
            eligibility,
            wallet,
            recorder: None,
            offline: None,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn ClaimRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_offline_cache(mut self, cache: Arc<OfflineEligibilityCache>) -> Self {
        self.offline = Some(cache);
        self
    }

    /// Submit a claim for `address`.
    ///
    /// Once the wallet has been prompted the attempt must not be cancelled
    /// locally, the transaction may already be live on chain; abandon the
    /// result and re-poll status instead.
    pub async fn claim(&self, address: Address) -> Result<ClaimReceipt> {
        let _guard = self.acquire(address)?;
        let mut phase = ClaimPhase::Idle;

        let result = self.run_attempt(address, &mut phase).await;
        match &result {
            Ok(receipt) => {
                advance(address, &mut phase, ClaimPhase::Succeeded);
                log::info!(
                    "claim for {address} succeeded: tx {}",
                    receipt.transaction_id
                );
            }
            Err(e) => {
                advance(address, &mut phase, ClaimPhase::Failed);
                log::warn!("claim for {address} failed: {e}");
            }
        }
        result
    }

    async fn run_attempt(&self, address: Address, phase: &mut ClaimPhase) -> Result<ClaimReceipt> {
        // Re-check right before prompting; a countdown that hit zero in the
        // UI is no proof the contract agrees.
        advance(address, phase, ClaimPhase::VerifyingEligibility);
        let status = self.eligibility.status_of(address).await?;
        if !status.can_claim {
            return Err(AirdropError::NotEligibleYet {
                time_remaining: status.time_remaining,
            });
        }

        advance(address, phase, ClaimPhase::AwaitingWalletAuthorization);
        if !self.wallet.is_available() {
            return Err(AirdropError::ProviderError(
                "wallet provider is not installed, open this app inside World App".to_string(),
            ));
        }

        let request = TransactionRequest::claim_airdrop();
        let response = match timeout(WALLET_AUTH_TIMEOUT, self.wallet.send_transaction(request))
            .await
        {
            Err(_) => {
                return Err(AirdropError::ProviderError(format!(
                    "wallet authorization timed out after {}s",
                    WALLET_AUTH_TIMEOUT.as_secs()
                )))
            }
            Ok(Err(e)) => return Err(AirdropError::ProviderError(e.to_string())),
            Ok(Ok(response)) => response,
        };

        advance(address, phase, ClaimPhase::Submitting);
        let transaction_id = match response.status {
            TransactionStatus::Error => {
                let message = response
                    .message
                    .unwrap_or_else(|| "transaction failed in the wallet".to_string());
                return Err(classify_wallet_failure(message));
            }
            TransactionStatus::Success => response.transaction_id.ok_or_else(|| {
                AirdropError::ProviderError(
                    "wallet reported success without a transaction id".to_string(),
                )
            })?,
        };

        advance(address, phase, ClaimPhase::Confirming);
        if let Some(cache) = &self.offline {
            cache.record_claim(address, unix_now());
        }
        if let Some(recorder) = &self.recorder {
            // Fire and forget: bookkeeping must survive the caller going
            // away and must never fail the claim.
            let recorder = Arc::clone(recorder);
            let tx = transaction_id.clone();
            tokio::spawn(async move {
                if let Err(e) = recorder.record_claim(address, &tx).await {
                    log::warn!("recording claim {tx} for {address} failed: {e}");
                }
            });
        }

        Ok(ClaimReceipt { transaction_id })
    }

    /// Reserve the address slot, or bail out synchronously when an attempt
    /// is already running. No network is touched on the busy path.
    fn acquire(&self, address: Address) -> Result<InFlightGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .expect("claim in-flight set poisoned");
        if !in_flight.insert(address) {
            return Err(AirdropError::ClaimInFlight);
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            address,
        })
    }
}

struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<Address>>,
    address: Address,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.address);
        }
    }
}

fn advance(address: Address, phase: &mut ClaimPhase, next: ClaimPhase) {
    log::debug!("claim {address}: {:?} -> {next:?}", *phase);
    *phase = next;
}

/// A declined prompt is the user's call, not a fault; everything else the
/// provider reports stays a provider error.
fn classify_wallet_failure(message: String) -> AirdropError {
    let lowered = message.to_lowercase();
    if lowered.contains("user rejected")
        || lowered.contains("user denied")
        || lowered.contains("cancelled by user")
    {
        AirdropError::UserRejected
    } else {
        AirdropError::ProviderError(message)
    }
}
