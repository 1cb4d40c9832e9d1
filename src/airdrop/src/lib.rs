//! Daily airdrop claim core: eligibility, claim submission and pool balance
//! against the World Chain airdrop contract, resilient to flaky RPC
//! endpoints.

pub mod backend;
pub mod balance;
pub mod claim;
pub mod contract;
pub mod error;
pub mod offline;
pub mod rpc;
pub mod status;
pub mod wallet;

pub use alloy::primitives::Address;
pub use backend::BackendClient;
pub use balance::{ContractBalance, ContractBalanceReader};
pub use claim::{
    AirdropClaimExecutor, ClaimPhase, ClaimReceipt, ClaimRecorder, ClaimTransactionResult,
};
pub use error::{AirdropError, Result};
pub use offline::OfflineEligibilityCache;
pub use rpc::{BoundEndpoint, RpcEndpointSelector};
pub use status::{AirdropStatus, AirdropStatusResolver, EligibilitySource, StatusSource};
pub use wallet::{
    TransactionRequest, TransactionResponse, TransactionStatus, WalletAuthorizer,
};
