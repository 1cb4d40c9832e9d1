//! Degraded-mode eligibility. When no endpoint and no backend is reachable
//! the device-local record of the last successful claim is the only
//! heuristic left. It is never consulted while an authoritative source
//! answers, and it is dropped the moment one does.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use alloy::primitives::Address;

use crate::status::{AirdropStatus, StatusSource};
use consts::{DEFAULT_CLAIM_INTERVAL_SECS, DEFAULT_DAILY_AIRDROP, OFFLINE_CLAIMS_STORE};
use utils::store::FileStore;

pub struct OfflineEligibilityCache {
    store: FileStore,
    claims: Mutex<HashMap<String, u64>>,
}

impl OfflineEligibilityCache {
    /// Open the cache backed by `dir/portugafi-offline-claims.json`.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let store = FileStore::new(dir.into().join(OFFLINE_CLAIMS_STORE));
        let claims = store.load();
        Self {
            store,
            claims: Mutex::new(claims),
        }
    }

    /// Remember a successful claim so the cooldown survives losing the
    /// network right after claiming.
    pub fn record_claim(&self, address: Address, unix_ts: u64) {
        let mut claims = self.claims.lock().expect("offline claims lock poisoned");
        claims.insert(address.to_string(), unix_ts);
        self.store.save(&*claims);
    }

    /// Authoritative data came back for this address, the local heuristic
    /// no longer has any business answering for it.
    pub fn invalidate(&self, address: Address) {
        let mut claims = self.claims.lock().expect("offline claims lock poisoned");
        if claims.remove(&address.to_string()).is_some() {
            self.store.save(&*claims);
        }
    }

    /// Heuristic status from the recorded timestamp, or `None` for an
    /// address this device has never seen claim. Guessing "can claim" with
    /// no data would invite doomed transactions.
    pub fn degraded_status(&self, address: Address, now: u64) -> Option<AirdropStatus> {
        let claims = self.claims.lock().expect("offline claims lock poisoned");
        let last_claim_time = *claims.get(&address.to_string())?;
        Some(AirdropStatus::from_parts(
            last_claim_time,
            DEFAULT_CLAIM_INTERVAL_SECS,
            DEFAULT_DAILY_AIRDROP.to_string(),
            now,
            StatusSource::OfflineCache,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache(tag: &str) -> (OfflineEligibilityCache, PathBuf) {
        let dir = std::env::temp_dir().join(format!("offline-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        (OfflineEligibilityCache::open(&dir), dir)
    }

    fn addr() -> Address {
        Address::repeat_byte(0xAB)
    }

    #[test]
    fn unknown_address_gets_no_answer() {
        let (cache, dir) = temp_cache("unknown");
        assert!(cache.degraded_status(addr(), 1_750_000_000).is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn recorded_claim_enforces_the_cooldown() {
        let (cache, dir) = temp_cache("cooldown");
        let now = 1_750_000_000;
        cache.record_claim(addr(), now - 3600);

        let status = cache.degraded_status(addr(), now).unwrap();
        assert!(!status.can_claim);
        assert_eq!(status.time_remaining, 82800);
        assert_eq!(status.source, StatusSource::OfflineCache);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn invalidation_forgets_the_address() {
        let (cache, dir) = temp_cache("invalidate");
        cache.record_claim(addr(), 1_750_000_000);
        cache.invalidate(addr());
        assert!(cache.degraded_status(addr(), 1_750_000_100).is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn cache_survives_a_reopen() {
        let (cache, dir) = temp_cache("reopen");
        cache.record_claim(addr(), 1_750_000_000);
        drop(cache);

        let reopened = OfflineEligibilityCache::open(&dir);
        assert!(reopened
            .degraded_status(addr(), 1_750_000_100)
            .is_some());
        let _ = std::fs::remove_dir_all(dir);
    }
}
