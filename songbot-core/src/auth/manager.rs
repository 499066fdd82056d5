// songbot-core/src/auth/manager.rs
//
// Owns every credential in the process. All mutation funnels through the
// per-platform refresh slot, so readers never observe a partially
// updated triple and concurrent stale callers share one refresh call.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, warn};

use songbot_common::models::credential::{Credential, Platform};
use songbot_common::traits::repository_traits::CredentialsRepository;

use crate::Error;
use crate::auth::TokenRefresher;

/// Tokens closer than this to expiry are treated as stale.
const EXPIRY_MARGIN_SECS: i64 = 5;

type RefreshOutcome = Option<Result<Credential, Arc<Error>>>;

struct PlatformEntry {
    current: RwLock<Credential>,
    /// Receiver for the refresh currently in flight, if any. Guarded so
    /// only one refresh per platform can be started at a time.
    inflight: Mutex<Option<watch::Receiver<RefreshOutcome>>>,
}

pub struct CredentialManager {
    store: Arc<dyn CredentialsRepository>,
    refreshers: DashMap<Platform, Arc<dyn TokenRefresher>>,
    entries: DashMap<Platform, Arc<PlatformEntry>>,
    margin: Duration,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn CredentialsRepository>) -> Self {
        Self {
            store,
            refreshers: DashMap::new(),
            entries: DashMap::new(),
            margin: Duration::seconds(EXPIRY_MARGIN_SECS),
        }
    }

    pub fn register_refresher(&self, platform: Platform, refresher: Arc<dyn TokenRefresher>) {
        self.refreshers.insert(platform, refresher);
    }

    /// Seeds the in-memory entry from the store. Returns false when the
    /// document holds no credential for this platform yet.
    pub async fn load(&self, platform: Platform) -> Result<bool, Error> {
        match self.store.get_credential(platform).await? {
            Some(credential) => {
                self.entries.insert(platform, Arc::new(PlatformEntry {
                    current: RwLock::new(credential),
                    inflight: Mutex::new(None),
                }));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persists a credential obtained from an authorization-code
    /// exchange and makes it current.
    pub async fn install(&self, credential: Credential) -> Result<(), Error> {
        self.store.store_credential(&credential).await?;
        self.entries.insert(credential.platform, Arc::new(PlatformEntry {
            current: RwLock::new(credential),
            inflight: Mutex::new(None),
        }));
        Ok(())
    }

    pub async fn current_credential(&self, platform: Platform) -> Option<Credential> {
        let entry = self.entries.get(&platform).map(|e| Arc::clone(e.value()))?;
        let current = entry.current.read().await;
        Some(current.clone())
    }

    /// Returns an access token whose expiry is more than the safety
    /// margin away. The fast path never waits on a refresh; stale
    /// callers all await the single refresh in flight.
    pub async fn get_valid_token(&self, platform: Platform) -> Result<String, Error> {
        let entry = self.entry(platform)?;

        {
            let current = entry.current.read().await;
            if current.is_fresh(self.margin, Utc::now()) {
                return Ok(current.access_token.clone());
            }
        }

        let mut rx = {
            let mut inflight = entry.inflight.lock().await;

            // A refresh may have completed while this caller waited on
            // the slot.
            {
                let current = entry.current.read().await;
                if current.is_fresh(self.margin, Utc::now()) {
                    return Ok(current.access_token.clone());
                }
            }

            match inflight.as_ref() {
                Some(rx) => rx.clone(),
                None => {
                    let refresher = self.refresher(platform)?;
                    let (tx, rx) = watch::channel(None);
                    *inflight = Some(rx.clone());

                    let entry = Arc::clone(&entry);
                    let store = Arc::clone(&self.store);
                    tokio::spawn(async move {
                        let outcome = run_refresh(&entry, &*store, &*refresher, platform).await;
                        if let Err(e) = &outcome {
                            warn!("token refresh for {platform} failed: {e}");
                        }
                        // Empty the slot first so callers arriving after
                        // a failure start a new attempt instead of
                        // re-reading this one.
                        *entry.inflight.lock().await = None;
                        let _ = tx.send(Some(outcome.map_err(Arc::new)));
                    });
                    rx
                }
            }
        };

        loop {
            {
                let outcome = rx.borrow_and_update();
                if let Some(result) = outcome.as_ref() {
                    return match result {
                        Ok(credential) => Ok(credential.access_token.clone()),
                        Err(e) => Err(match e.as_ref() {
                            Error::RefreshFailed(msg) => Error::RefreshFailed(msg.clone()),
                            other => Error::RefreshFailed(other.to_string()),
                        }),
                    };
                }
            }
            if rx.changed().await.is_err() {
                return Err(Error::RefreshFailed(format!("refresh task for {platform} dropped")));
            }
        }
    }

    fn entry(&self, platform: Platform) -> Result<Arc<PlatformEntry>, Error> {
        self.entries
            .get(&platform)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| Error::Auth(format!("no authorization for {platform}")))
    }

    fn refresher(&self, platform: Platform) -> Result<Arc<dyn TokenRefresher>, Error> {
        self.refreshers
            .get(&platform)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| Error::Auth(format!("no refresher registered for {platform}")))
    }
}

async fn run_refresh(
    entry: &PlatformEntry,
    store: &dyn CredentialsRepository,
    refresher: &dyn TokenRefresher,
    platform: Platform,
) -> Result<Credential, Error> {
    let stale = entry.current.read().await.clone();
    let refreshed = refresher.refresh(&stale).await?;
    // Persist before any waiter can observe the new token. A failed
    // write leaves the old triple in place, refresh token included.
    store.store_credential(&refreshed).await?;
    *entry.current.write().await = refreshed.clone();
    debug!("{platform} credential refreshed, valid until {}", refreshed.expires_at);
    Ok(refreshed)
}
