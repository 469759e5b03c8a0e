use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use crate::scheduler::BreakConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UserSettings {
    break_config: BreakConfig,
    pause_until: Option<DateTime<Utc>>,
    alert_sound_path: Option<PathBuf>,
    /// Last entitlement answer the store backend gave us; consulted when the
    /// backend is unreachable.
    addon_purchased: Option<bool>,
}

struct StoreInner {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

/// JSON-file settings store. The handle is cheap to clone and share across
/// the scheduler, the break session, and command handlers.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<StoreInner>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                data: RwLock::new(data),
            }),
        })
    }

    /// Always clamped: a hand-edited settings file cannot push the scheduler
    /// outside the supported cadence.
    pub fn break_config(&self) -> BreakConfig {
        self.inner.data.read().unwrap().break_config.clamped()
    }

    pub fn set_break_config(&self, config: BreakConfig) -> Result<()> {
        let mut guard = self.inner.data.write().unwrap();
        guard.break_config = config.clamped();
        self.persist(&guard)
    }

    pub fn pause_until(&self) -> Option<DateTime<Utc>> {
        self.inner.data.read().unwrap().pause_until
    }

    pub fn set_pause_until(&self, pause_until: Option<DateTime<Utc>>) -> Result<()> {
        let mut guard = self.inner.data.write().unwrap();
        guard.pause_until = pause_until;
        self.persist(&guard)
    }

    pub fn alert_sound_path(&self) -> Option<PathBuf> {
        self.inner.data.read().unwrap().alert_sound_path.clone()
    }

    pub fn set_alert_sound_path(&self, path: Option<PathBuf>) -> Result<()> {
        let mut guard = self.inner.data.write().unwrap();
        guard.alert_sound_path = path;
        self.persist(&guard)
    }

    pub fn addon_purchased(&self) -> Option<bool> {
        self.inner.data.read().unwrap().addon_purchased
    }

    pub fn set_addon_purchased(&self, purchased: bool) -> Result<()> {
        let mut guard = self.inner.data.write().unwrap();
        guard.addon_purchased = Some(purchased);
        self.persist(&guard)
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.inner.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.inner.path.display()))
    }
}
