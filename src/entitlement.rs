use anyhow::{bail, Result};
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::settings::SettingsStore;

const LICENSE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Backend that can answer whether the settings add-on is licensed.
/// The platform store integration lives outside this crate; anything that
/// cannot reach a store reports an error and the gate falls back to the
/// persisted answer.
pub trait EntitlementProvider: Send + Sync {
    fn is_addon_licensed(&self) -> Result<bool>;
}

/// Provider used when no store backend is wired up (sideloaded and
/// development builds).
pub struct StoreUnavailable;

impl EntitlementProvider for StoreUnavailable {
    fn is_addon_licensed(&self) -> Result<bool> {
        bail!("no store backend configured")
    }
}

struct CachedLicense {
    licensed: bool,
    checked_at: Instant,
}

struct GateInner {
    provider: Box<dyn EntitlementProvider>,
    settings: SettingsStore,
    cache: Mutex<Option<CachedLicense>>,
    ttl: Duration,
}

/// Gates the paid settings surface. License checks are cached for a few
/// minutes to keep store traffic down; when the backend is unreachable the
/// last persisted answer wins, and a user with no history is not licensed.
#[derive(Clone)]
pub struct EntitlementGate {
    inner: Arc<GateInner>,
}

impl EntitlementGate {
    pub fn new(provider: Box<dyn EntitlementProvider>, settings: SettingsStore) -> Self {
        Self::with_ttl(provider, settings, LICENSE_CACHE_TTL)
    }

    fn with_ttl(
        provider: Box<dyn EntitlementProvider>,
        settings: SettingsStore,
        ttl: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(GateInner {
                provider,
                settings,
                cache: Mutex::new(None),
                ttl,
            }),
        }
    }

    pub fn is_settings_unlocked(&self) -> bool {
        let mut cache = self.inner.cache.lock().unwrap();

        if let Some(cached) = cache.as_ref() {
            if cached.checked_at.elapsed() < self.inner.ttl {
                return cached.licensed;
            }
        }

        match self.inner.provider.is_addon_licensed() {
            Ok(licensed) => {
                *cache = Some(CachedLicense {
                    licensed,
                    checked_at: Instant::now(),
                });
                if let Err(err) = self.inner.settings.set_addon_purchased(licensed) {
                    warn!("could not persist entitlement status: {err:#}");
                }
                licensed
            }
            Err(err) => {
                debug!("license check failed, using persisted status: {err}");
                self.inner.settings.addon_purchased().unwrap_or(false)
            }
        }
    }

    /// Drop the in-memory cache so the next check hits the provider again,
    /// e.g. right after a purchase completes.
    pub fn invalidate(&self) {
        self.inner.cache.lock().unwrap().take();
    }
}
