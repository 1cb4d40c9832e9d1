use once_cell::sync::Lazy;
use reqwest::Url;
use web_time::Duration;

pub const AIRDROP_CONTRACT_ADDRESS: &str = "0x281CbED18B42229CB3BE1d4cf829abc312117cF8";
pub const TPF_TOKEN_ADDRESS: &str = "0x834a73c0a83F3BCe349A116FFB2A4c2d1C651E45";
pub const TPF_TOKEN_SYMBOL: &str = "TPF";
pub const TPF_TOKEN_DECIMALS: u8 = 18;

/// Display value used when the contract hides the real amount behind a revert.
pub const DEFAULT_DAILY_AIRDROP: &str = "50";

/// Cooldown policy between successful claims, mirrored from the contract.
pub const DEFAULT_CLAIM_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// A World-Chain-compatible network the mini app can talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainNetwork {
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_url: &'static str,
    pub block_explorer: &'static str,
}

pub const WORLD_CHAIN_MAINNET: ChainNetwork = ChainNetwork {
    chain_id: 480,
    name: "World Chain",
    rpc_url: "https://worldchain-mainnet.g.alchemy.com/public",
    block_explorer: "https://worldscan.org",
};

pub const WORLD_CHAIN_TESTNET: ChainNetwork = ChainNetwork {
    chain_id: 4801,
    name: "World Chain Sepolia",
    rpc_url: "https://worldchain-sepolia.g.alchemy.com/public",
    block_explorer: "https://worldchain-sepolia.explorer.alchemy.com",
};

/// Candidate RPC endpoints in preference order. Order matters, this is a
/// priority list and not a set.
pub static RPC_ENDPOINTS: Lazy<Vec<Url>> = Lazy::new(|| {
    [WORLD_CHAIN_MAINNET.rpc_url, WORLD_CHAIN_TESTNET.rpc_url]
        .into_iter()
        .map(|u| Url::parse(u).unwrap())
        .collect()
});

/// Per-endpoint liveness probe window (latest block height fetch).
pub const RPC_PROBE_TIMEOUT: Duration = Duration::from_secs(8);
/// Combined window for the contract view calls behind one status/balance read.
pub const CONTRACT_CALL_TIMEOUT: Duration = Duration::from_secs(12);
/// Wallet authorization involves the user, so the band is much wider.
pub const WALLET_AUTH_TIMEOUT: Duration = Duration::from_secs(120);

/// How long callers should wait before re-polling status after a claim lands.
pub const POST_CLAIM_REFRESH_DELAY: Duration = Duration::from_secs(3);

pub const BACKEND_STATUS_PATH: &str = "/api/airdrop/status";
pub const BACKEND_BALANCE_PATH: &str = "/api/airdrop/balance";
pub const BACKEND_RECORD_CLAIM_PATH: &str = "/api/airdrop/claim";

/// File name of the device-local claim timestamp store (degraded mode only).
pub const OFFLINE_CLAIMS_STORE: &str = "portugafi-offline-claims.json";
