use thiserror::Error;

pub type Result<T> = std::result::Result<T, AirdropError>;

/// Everything the claim core can fail with. Raw RPC and wallet provider
/// errors are mapped into one of these before they reach a caller.
#[derive(Clone, Debug, Error)]
pub enum AirdropError {
    #[error("no usable rpc endpoint (tried {}): {last_error}", endpoints_tried.join(", "))]
    NetworkUnavailable {
        endpoints_tried: Vec<String>,
        last_error: String,
    },

    #[error("contract call {call} reverted: {message}")]
    ContractCallReverted {
        call: &'static str,
        message: String,
    },

    #[error("claim not available yet, {time_remaining}s remaining")]
    NotEligibleYet { time_remaining: u64 },

    #[error("transaction rejected in the wallet")]
    UserRejected,

    #[error("wallet provider error: {0}")]
    ProviderError(String),

    /// Another claim for the same address is still in flight.
    #[error("a claim for this address is already in progress")]
    ClaimInFlight,

    /// Best-effort bookkeeping failed after a successful on-chain claim.
    /// Never surfaced as a claim failure, only logged.
    #[error("failed to record claim: {0}")]
    RecordingFailed(String),
}

impl AirdropError {
    /// Short reason plus an actionable next step, ready for the claim screen.
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkUnavailable { .. } => {
                "Could not reach World Chain. Check your connection and retry.".to_string()
            }
            Self::ContractCallReverted { .. } => {
                "The airdrop contract refused the request. Try again in a moment.".to_string()
            }
            Self::NotEligibleYet { time_remaining } => {
                let left = utils::TimeLeft::from_secs(*time_remaining);
                format!(
                    "You already claimed today. Next claim in {:02}:{:02}:{:02}.",
                    left.days * 24 + left.hours,
                    left.minutes,
                    left.seconds
                )
            }
            Self::UserRejected => "Transaction cancelled in the wallet.".to_string(),
            Self::ProviderError(msg) => format!("Wallet error: {msg}. Reconnect and retry."),
            Self::ClaimInFlight => "A claim is already in progress. Hang tight.".to_string(),
            Self::RecordingFailed(_) => {
                "Claimed, but bookkeeping lagged behind. Your tokens are on the way.".to_string()
            }
        }
    }
}

/// The contract reverts view calls for addresses it has never seen. Detect
/// that from the provider's message, same markers the endpoints emit.
pub(crate) fn is_revert_message(message: &str) -> bool {
    message.contains("execution reverted") || message.contains("require(false)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revert_markers_are_detected() {
        assert!(is_revert_message("server returned an error response: execution reverted"));
        assert!(is_revert_message("require(false) hit in fallback"));
        assert!(!is_revert_message("connection refused"));
    }

    #[test]
    fn not_eligible_message_formats_remaining_time() {
        let err = AirdropError::NotEligibleYet {
            time_remaining: 82800,
        };
        assert!(err.user_message().contains("23:00:00"));
    }
}
