//! Wiring. Defaults come from `consts`, deployments override through the
//! environment, and the wallet-authorization provider is injected by
//! whoever embeds the core.

use std::env;
use std::sync::Arc;

use airdrop::{
    AirdropClaimExecutor, AirdropStatusResolver, BackendClient, ContractBalance,
    ContractBalanceReader, EligibilitySource, OfflineEligibilityCache, RpcEndpointSelector,
    WalletAuthorizer,
};
use reqwest::Url;

fn init_rpc_endpoints() -> Vec<Url> {
    match env::var("RPC_ENDPOINTS") {
        Ok(raw) => raw
            .split(',')
            .map(|s| s.trim().parse().expect("Invalid `RPC_ENDPOINTS`"))
            .collect(),
        Err(_) => consts::RPC_ENDPOINTS.clone(),
    }
}

fn init_backend_client() -> Option<BackendClient> {
    let raw = env::var("BACKEND_BASE_URL").ok()?;
    let base_url = raw.parse().expect("Invalid `BACKEND_BASE_URL`");
    Some(BackendClient::new(base_url))
}

fn init_offline_cache() -> Option<Arc<OfflineEligibilityCache>> {
    let dir = env::var("OFFLINE_CACHE_DIR").ok()?;
    Some(Arc::new(OfflineEligibilityCache::open(dir)))
}

pub struct AppState {
    pub status: Arc<dyn EligibilitySource>,
    pub claim: Arc<AirdropClaimExecutor>,
    balance: ContractBalanceReader,
    backend: Option<BackendClient>,
}

impl AppState {
    /// Remaining pool balance, served by the backend proxy when one is
    /// configured, directly from chain otherwise.
    pub async fn pool_balance(&self) -> airdrop::Result<ContractBalance> {
        match &self.backend {
            Some(backend) => backend.fetch_balance().await,
            None => self.balance.read().await,
        }
    }
}

pub struct AppStateBuilder {
    wallet: Arc<dyn WalletAuthorizer>,
}

impl AppStateBuilder {
    pub fn new(wallet: Arc<dyn WalletAuthorizer>) -> Self {
        Self { wallet }
    }

    pub fn build(self) -> AppState {
        let endpoints = init_rpc_endpoints();
        let backend = init_backend_client();
        let offline = init_offline_cache();

        let status: Arc<dyn EligibilitySource> = match &backend {
            Some(backend) => Arc::new(backend.clone()),
            None => {
                let mut resolver =
                    AirdropStatusResolver::new(RpcEndpointSelector::new(endpoints.clone()));
                if let Some(cache) = &offline {
                    resolver = resolver.with_offline_cache(Arc::clone(cache));
                }
                Arc::new(resolver)
            }
        };

        let mut claim = AirdropClaimExecutor::new(Arc::clone(&status), self.wallet);
        if let Some(backend) = &backend {
            claim = claim.with_recorder(Arc::new(backend.clone()));
        }
        if let Some(cache) = offline {
            claim = claim.with_offline_cache(cache);
        }

        AppState {
            status,
            claim: Arc::new(claim),
            balance: ContractBalanceReader::new(RpcEndpointSelector::new(endpoints)),
            backend,
        }
    }
}
