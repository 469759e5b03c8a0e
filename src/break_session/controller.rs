use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use log::{error, info};
use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager, Monitor, WebviewUrl, WebviewWindowBuilder};
use tokio::{
    sync::Mutex,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{audio::AlertPlayer, settings::SettingsStore};

use super::countdown::{BreakCountdown, CountdownStep};

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct BreakStartedEvent {
    session_id: String,
    duration_seconds: u32,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct BreakCountdownEvent {
    display: String,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct BreakEndedEvent {
    session_id: String,
}

/// What the countdown driver does to the outside world. Split out so the
/// driver can run against a recording double in tests, with no display
/// attached.
pub(crate) trait BreakSurface: Send + Sync + 'static {
    fn show_remaining(&self, display: &str);
    fn close_overlays(&self);
    fn play_end_cue(&self);
}

/// Drives one break session: pushes the initial display, then ticks once per
/// period until the countdown finishes or the shared token is cancelled.
/// Cancellation (the skip affordance) closes every overlay without the end
/// cue; natural completion plays the cue first.
pub(crate) async fn run_countdown(
    mut countdown: BreakCountdown,
    tick: Duration,
    cancel: CancellationToken,
    surface: Arc<dyn BreakSurface>,
) {
    let mut interval = time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately; consume it so
    // the first decrement lands a full period after the initial display.
    interval.tick().await;

    surface.show_remaining(&countdown.display());

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match countdown.tick() {
                    CountdownStep::Remaining(display) => surface.show_remaining(&display),
                    CountdownStep::Finished => {
                        surface.play_end_cue();
                        surface.close_overlays();
                        break;
                    }
                }
            }
            _ = cancel.cancelled() => {
                surface.close_overlays();
                break;
            }
        }
    }
}

/// The real surface: one webview overlay per monitor, addressed by label.
struct OverlaySurface {
    app_handle: AppHandle,
    labels: Vec<String>,
    audio: AlertPlayer,
    sound_path: Option<PathBuf>,
    session_id: String,
}

impl BreakSurface for OverlaySurface {
    fn show_remaining(&self, display: &str) {
        for label in &self.labels {
            let _ = self.app_handle.emit_to(
                label.as_str(),
                "break-countdown",
                BreakCountdownEvent {
                    display: display.to_string(),
                },
            );
        }
    }

    fn close_overlays(&self) {
        for label in &self.labels {
            if let Some(window) = self.app_handle.get_webview_window(label) {
                if let Err(err) = window.close() {
                    error!("failed to close rest overlay {label}: {err}");
                }
            }
        }

        let _ = self.app_handle.emit(
            "break-ended",
            BreakEndedEvent {
                session_id: self.session_id.clone(),
            },
        );
    }

    fn play_end_cue(&self) {
        self.audio.play_cue(self.sound_path.clone());
    }
}

struct ActiveBreak {
    session_id: String,
    cancel: CancellationToken,
}

/// Owns the lifecycle of the rest overlays. At most one break session exists
/// at a time; the scheduler re-arms to a full interval on fire, so a new
/// request while one is showing is a bug on the caller's side.
#[derive(Clone)]
pub struct BreakController {
    app_handle: AppHandle,
    settings: SettingsStore,
    audio: AlertPlayer,
    active: Arc<Mutex<Option<ActiveBreak>>>,
    tick_interval: Duration,
}

impl BreakController {
    pub fn new(app_handle: AppHandle, settings: SettingsStore, audio: AlertPlayer) -> Self {
        Self {
            app_handle,
            settings,
            audio,
            active: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
        }
    }

    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }

    pub async fn start(&self, duration_seconds: u32) -> Result<()> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            bail!("a break is already in progress");
        }

        let monitors = self
            .app_handle
            .available_monitors()
            .context("monitor enumeration failed")?;
        if monitors.is_empty() {
            bail!("no monitors attached");
        }

        let session_id = Uuid::new_v4().to_string();

        let mut labels = Vec::new();
        for (index, monitor) in monitors.iter().enumerate() {
            match self.open_overlay(index, monitor) {
                Ok(label) => labels.push(label),
                Err(err) => {
                    // One bad monitor must not cost the user the whole break.
                    error!("skipping monitor {index}: rest overlay failed: {err:#}");
                }
            }
        }
        if labels.is_empty() {
            bail!("no rest overlays could be created");
        }

        info!(
            "break session {session_id}: {duration_seconds}s across {} monitor(s)",
            labels.len()
        );

        let sound_path = self.settings.alert_sound_path();
        self.audio.play_cue(sound_path.clone());

        let _ = self.app_handle.emit(
            "break-started",
            BreakStartedEvent {
                session_id: session_id.clone(),
                duration_seconds,
            },
        );

        let cancel = CancellationToken::new();
        let surface: Arc<dyn BreakSurface> = Arc::new(OverlaySurface {
            app_handle: self.app_handle.clone(),
            labels,
            audio: self.audio.clone(),
            sound_path,
            session_id: session_id.clone(),
        });

        tokio::spawn({
            let countdown = BreakCountdown::new(duration_seconds);
            let cancel = cancel.clone();
            let active = self.active.clone();
            let tick = self.tick_interval;
            async move {
                run_countdown(countdown, tick, cancel, surface).await;
                active.lock().await.take();
            }
        });

        *active = Some(ActiveBreak { session_id, cancel });
        Ok(())
    }

    /// Session-wide skip: one overlay's affordance ends the break on every
    /// monitor.
    pub async fn skip(&self) -> Result<()> {
        let guard = self.active.lock().await;
        match guard.as_ref() {
            Some(active) => {
                info!("break session {} skipped by user", active.session_id);
                active.cancel.cancel();
                Ok(())
            }
            None => bail!("no break in progress"),
        }
    }

    fn open_overlay(&self, index: usize, monitor: &Monitor) -> Result<String> {
        let label = format!("rest-{index}");
        let position = monitor.position().to_logical::<f64>(monitor.scale_factor());

        let window = WebviewWindowBuilder::new(
            &self.app_handle,
            label.as_str(),
            WebviewUrl::App("rest.html".into()),
        )
        .title("EyeGuard")
        .position(position.x, position.y)
        .decorations(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .fullscreen(true)
        .focused(true)
        .build()
        .with_context(|| format!("could not create overlay window {label}"))?;

        let _ = window.set_focus();
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex as StdMutex,
    };

    #[derive(Default)]
    struct RecordingSurface {
        shown: StdMutex<Vec<String>>,
        closes: AtomicUsize,
        cue_played: AtomicBool,
    }

    impl BreakSurface for RecordingSurface {
        fn show_remaining(&self, display: &str) {
            self.shown.lock().unwrap().push(display.to_string());
        }

        fn close_overlays(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }

        fn play_end_cue(&self) {
            self.cue_played.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn completed_countdown_plays_cue_and_closes_every_overlay_once() {
        let surface = Arc::new(RecordingSurface::default());
        run_countdown(
            BreakCountdown::new(3),
            Duration::from_millis(5),
            CancellationToken::new(),
            surface.clone(),
        )
        .await;

        assert_eq!(*surface.shown.lock().unwrap(), vec!["3", "2", "1"]);
        assert_eq!(surface.closes.load(Ordering::SeqCst), 1);
        assert!(surface.cue_played.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn skip_closes_all_overlays_without_the_end_cue() {
        let surface = Arc::new(RecordingSurface::default());
        let cancel = CancellationToken::new();

        let driver = tokio::spawn(run_countdown(
            BreakCountdown::new(300),
            Duration::from_millis(5),
            cancel.clone(),
            surface.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        driver.await.unwrap();

        assert_eq!(surface.closes.load(Ordering::SeqCst), 1);
        assert!(!surface.cue_played.load(Ordering::SeqCst));
        assert_eq!(
            surface.shown.lock().unwrap().first().map(String::as_str),
            Some("5:00")
        );
    }
}
