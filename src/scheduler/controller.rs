use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::{
    sync::Mutex,
    time::{self, MissedTickBehavior},
};

use crate::{break_session::BreakController, settings::SettingsStore};

use super::{
    probes::SystemProbes,
    state::{CountdownState, TickOutcome, TickSignals},
};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSnapshot {
    pub minutes_remaining: u32,
    pub pause_until: Option<DateTime<Utc>>,
    pub break_active: bool,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct ScheduleTickEvent {
    minutes_remaining: u32,
}

/// Single authority over the break countdown. One minute-cadence task reads
/// the probes, advances the state machine, and fires break sessions; nothing
/// else mutates the countdown.
#[derive(Clone)]
pub struct SchedulerController {
    state: Arc<Mutex<CountdownState>>,
    settings: SettingsStore,
    probes: Arc<dyn SystemProbes>,
    breaks: BreakController,
    app_handle: AppHandle,
    tick_interval: Duration,
}

impl SchedulerController {
    pub fn new(
        app_handle: AppHandle,
        settings: SettingsStore,
        probes: Arc<dyn SystemProbes>,
        breaks: BreakController,
    ) -> Self {
        let debug_mode = std::env::var("EYEGUARD_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let interval_minutes = settings.break_config().interval_minutes;

        Self {
            state: Arc::new(Mutex::new(CountdownState::new(interval_minutes))),
            settings,
            probes,
            breaks,
            app_handle,
            // A debug build ticking every second makes a 20 minute interval
            // reproducible in 20 seconds.
            tick_interval: if debug_mode {
                Duration::from_secs(1)
            } else {
                Duration::from_secs(60)
            },
        }
    }

    pub async fn snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            minutes_remaining: self.state.lock().await.minutes_remaining(),
            pause_until: self.settings.pause_until(),
            break_active: self.breaks.is_active().await,
        }
    }

    /// Spawn the minute-cadence task. Runs for the process lifetime.
    pub fn start(&self) {
        let controller = self.clone();
        tauri::async_runtime::spawn(async move {
            controller.run_loop().await;
        });
    }

    async fn run_loop(self) {
        let mut interval = time::interval(self.tick_interval);
        // Late delivery must not trigger catch-up ticks; a stretch the timer
        // never saw is just a stretch the countdown never saw.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately; consume
        // it so the first decrement lands a full minute after launch.
        interval.tick().await;

        loop {
            interval.tick().await;
            self.on_tick().await;
        }
    }

    async fn on_tick(&self) {
        // Config and pause window are re-read every tick so settings changes
        // apply without a restart.
        let config = self.settings.break_config();
        let signals = TickSignals {
            attention: self.probes.attention_state(),
            focus_session_active: self.probes.focus_session_active(),
            foreground_fullscreen: self.probes.foreground_fullscreen(),
            pause_until: self.settings.pause_until(),
        };

        let (outcome, minutes_remaining) = {
            let mut state = self.state.lock().await;
            let outcome = state.tick(&signals, &config, Utc::now());
            (outcome, state.minutes_remaining())
        };

        match outcome {
            TickOutcome::Counting { .. } => {}
            TickOutcome::AwayReset => {
                info!("user away; countdown reset to {minutes_remaining} minute(s)");
            }
            TickOutcome::Skipped { reason, .. } => {
                info!("break due but skipped ({reason:?}); next check in {minutes_remaining} minute(s)");
            }
            TickOutcome::Fire { duration_seconds } => {
                info!("break due; starting a {duration_seconds}s rest");
                if let Err(err) = self.breaks.start(duration_seconds).await {
                    error!("failed to start break session: {err:#}");
                }
            }
        }

        let _ = self
            .app_handle
            .emit("schedule-tick", ScheduleTickEvent { minutes_remaining });
    }
}
