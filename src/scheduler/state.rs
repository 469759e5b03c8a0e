use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::probes::AttentionState;

/// User-facing break cadence. Values outside the allowed ranges are clamped
/// wherever a config enters or leaves the settings store, so the scheduler
/// can rely on these invariants without re-checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakConfig {
    pub interval_minutes: u32,
    pub duration_seconds: u32,
}

impl BreakConfig {
    pub const MIN_INTERVAL_MINUTES: u32 = 10;
    pub const MAX_INTERVAL_MINUTES: u32 = 30;
    pub const DEFAULT_INTERVAL_MINUTES: u32 = 20;

    pub const MIN_DURATION_SECONDS: u32 = 5;
    pub const MAX_DURATION_SECONDS: u32 = 300;
    pub const DEFAULT_DURATION_SECONDS: u32 = 20;

    pub fn clamped(self) -> Self {
        Self {
            interval_minutes: self
                .interval_minutes
                .clamp(Self::MIN_INTERVAL_MINUTES, Self::MAX_INTERVAL_MINUTES),
            duration_seconds: self
                .duration_seconds
                .clamp(Self::MIN_DURATION_SECONDS, Self::MAX_DURATION_SECONDS),
        }
    }
}

impl Default for BreakConfig {
    fn default() -> Self {
        Self {
            interval_minutes: Self::DEFAULT_INTERVAL_MINUTES,
            duration_seconds: Self::DEFAULT_DURATION_SECONDS,
        }
    }
}

/// Why a due break was not shown. Determines the recovery countdown: a pause
/// is expected to outlive a single minute, so it keeps the full interval;
/// every other blocker is transient and gets retried on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Paused,
    FocusSessionActive,
    NotificationsSuppressed,
    FullscreenApplication,
}

/// Environment snapshot for one scheduler tick.
#[derive(Debug, Clone)]
pub struct TickSignals {
    pub attention: AttentionState,
    pub focus_session_active: bool,
    pub foreground_fullscreen: bool,
    pub pause_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counting { minutes_remaining: u32 },
    AwayReset,
    Skipped { reason: SkipReason, minutes_remaining: u32 },
    Fire { duration_seconds: u32 },
}

/// Minutes of continuous presence left until the next break. Created once at
/// process start and owned by the scheduler task; never persisted, so a
/// relaunch always starts a fresh interval.
#[derive(Debug)]
pub struct CountdownState {
    minutes_remaining: u32,
}

impl CountdownState {
    pub fn new(interval_minutes: u32) -> Self {
        Self {
            minutes_remaining: interval_minutes,
        }
    }

    pub fn minutes_remaining(&self) -> u32 {
        self.minutes_remaining
    }

    /// Advance the countdown by one minute and decide what happens.
    ///
    /// An away signal trumps everything: the countdown re-arms to the full
    /// interval so a complete stretch of presence is required after the user
    /// returns. When the countdown reaches zero it re-arms immediately
    /// (a skipped break must not re-fire every following minute) and the skip
    /// gates are evaluated in fixed order, first match winning.
    pub fn tick(
        &mut self,
        signals: &TickSignals,
        config: &BreakConfig,
        now: DateTime<Utc>,
    ) -> TickOutcome {
        self.minutes_remaining = self.minutes_remaining.saturating_sub(1);

        if signals.attention == AttentionState::Away {
            self.minutes_remaining = config.interval_minutes;
            return TickOutcome::AwayReset;
        }

        if self.minutes_remaining > 0 {
            return TickOutcome::Counting {
                minutes_remaining: self.minutes_remaining,
            };
        }

        self.minutes_remaining = config.interval_minutes;

        if let Some(pause_until) = signals.pause_until {
            if now < pause_until {
                return TickOutcome::Skipped {
                    reason: SkipReason::Paused,
                    minutes_remaining: self.minutes_remaining,
                };
            }
        }

        if signals.focus_session_active {
            self.minutes_remaining = 1;
            return TickOutcome::Skipped {
                reason: SkipReason::FocusSessionActive,
                minutes_remaining: self.minutes_remaining,
            };
        }

        if signals.attention == AttentionState::SuppressNotifications {
            self.minutes_remaining = 1;
            return TickOutcome::Skipped {
                reason: SkipReason::NotificationsSuppressed,
                minutes_remaining: self.minutes_remaining,
            };
        }

        if signals.foreground_fullscreen {
            self.minutes_remaining = 1;
            return TickOutcome::Skipped {
                reason: SkipReason::FullscreenApplication,
                minutes_remaining: self.minutes_remaining,
            };
        }

        TickOutcome::Fire {
            duration_seconds: config.duration_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config(interval_minutes: u32) -> BreakConfig {
        BreakConfig {
            interval_minutes,
            duration_seconds: 20,
        }
    }

    fn quiet_signals() -> TickSignals {
        TickSignals {
            attention: AttentionState::Normal,
            focus_session_active: false,
            foreground_fullscreen: false,
            pause_until: None,
        }
    }

    #[test]
    fn fires_exactly_once_after_interval_for_every_allowed_interval() {
        for interval in BreakConfig::MIN_INTERVAL_MINUTES..=BreakConfig::MAX_INTERVAL_MINUTES {
            let config = config(interval);
            let mut state = CountdownState::new(interval);
            let now = Utc::now();

            let mut fires = 0;
            for _ in 0..interval {
                if let TickOutcome::Fire { .. } = state.tick(&quiet_signals(), &config, now) {
                    fires += 1;
                }
            }

            assert_eq!(fires, 1, "interval {interval} should fire exactly once");
            assert_eq!(state.minutes_remaining(), interval, "countdown re-arms after firing");
        }
    }

    #[test]
    fn away_resets_countdown_regardless_of_progress() {
        let config = config(10);
        let mut state = CountdownState::new(10);
        let now = Utc::now();

        for _ in 0..7 {
            state.tick(&quiet_signals(), &config, now);
        }
        assert_eq!(state.minutes_remaining(), 3);

        let mut signals = quiet_signals();
        signals.attention = AttentionState::Away;
        assert_eq!(state.tick(&signals, &config, now), TickOutcome::AwayReset);
        assert_eq!(state.minutes_remaining(), 10);
    }

    #[test]
    fn away_on_the_due_tick_suppresses_firing() {
        let config = config(10);
        let mut state = CountdownState::new(1);
        let now = Utc::now();

        let mut signals = quiet_signals();
        signals.attention = AttentionState::Away;
        assert_eq!(state.tick(&signals, &config, now), TickOutcome::AwayReset);
        assert_eq!(state.minutes_remaining(), 10);
    }

    fn run_to_due(state: &mut CountdownState, config: &BreakConfig, now: DateTime<Utc>) {
        while state.minutes_remaining() > 1 {
            state.tick(&quiet_signals(), config, now);
        }
    }

    #[test]
    fn focus_session_skip_retries_next_minute() {
        let config = config(10);
        let mut state = CountdownState::new(10);
        let now = Utc::now();
        run_to_due(&mut state, &config, now);

        let mut signals = quiet_signals();
        signals.focus_session_active = true;
        assert_eq!(
            state.tick(&signals, &config, now),
            TickOutcome::Skipped {
                reason: SkipReason::FocusSessionActive,
                minutes_remaining: 1,
            }
        );

        // Blocker cleared: the very next tick fires.
        assert!(matches!(
            state.tick(&quiet_signals(), &config, now),
            TickOutcome::Fire { .. }
        ));
    }

    #[test]
    fn suppressed_notifications_skip_retries_next_minute() {
        let config = config(10);
        let mut state = CountdownState::new(10);
        let now = Utc::now();
        run_to_due(&mut state, &config, now);

        let mut signals = quiet_signals();
        signals.attention = AttentionState::SuppressNotifications;
        assert_eq!(
            state.tick(&signals, &config, now),
            TickOutcome::Skipped {
                reason: SkipReason::NotificationsSuppressed,
                minutes_remaining: 1,
            }
        );
    }

    #[test]
    fn fullscreen_skip_retries_next_minute() {
        let config = config(10);
        let mut state = CountdownState::new(10);
        let now = Utc::now();
        run_to_due(&mut state, &config, now);

        let mut signals = quiet_signals();
        signals.foreground_fullscreen = true;
        assert_eq!(
            state.tick(&signals, &config, now),
            TickOutcome::Skipped {
                reason: SkipReason::FullscreenApplication,
                minutes_remaining: 1,
            }
        );
    }

    #[test]
    fn pause_skip_keeps_full_interval() {
        let config = config(15);
        let mut state = CountdownState::new(15);
        let now = Utc::now();
        run_to_due(&mut state, &config, now);

        let mut signals = quiet_signals();
        signals.pause_until = Some(now + Duration::hours(1));
        assert_eq!(
            state.tick(&signals, &config, now),
            TickOutcome::Skipped {
                reason: SkipReason::Paused,
                minutes_remaining: 15,
            }
        );
    }

    #[test]
    fn pause_outranks_other_skip_gates() {
        let config = config(10);
        let mut state = CountdownState::new(10);
        let now = Utc::now();
        run_to_due(&mut state, &config, now);

        let signals = TickSignals {
            attention: AttentionState::SuppressNotifications,
            focus_session_active: true,
            foreground_fullscreen: true,
            pause_until: Some(now + Duration::minutes(5)),
        };
        assert_eq!(
            state.tick(&signals, &config, now),
            TickOutcome::Skipped {
                reason: SkipReason::Paused,
                minutes_remaining: 10,
            }
        );
    }

    #[test]
    fn focus_session_outranks_suppression_and_fullscreen() {
        let config = config(10);
        let mut state = CountdownState::new(10);
        let now = Utc::now();
        run_to_due(&mut state, &config, now);

        let signals = TickSignals {
            attention: AttentionState::SuppressNotifications,
            focus_session_active: true,
            foreground_fullscreen: true,
            pause_until: None,
        };
        assert!(matches!(
            state.tick(&signals, &config, now),
            TickOutcome::Skipped {
                reason: SkipReason::FocusSessionActive,
                ..
            }
        ));
    }

    #[test]
    fn expired_pause_no_longer_blocks() {
        let config = config(10);
        let now = Utc::now();

        // Boundary: now == pause_until means the pause is over.
        let mut state = CountdownState::new(1);
        let mut signals = quiet_signals();
        signals.pause_until = Some(now);
        assert!(matches!(
            state.tick(&signals, &config, now),
            TickOutcome::Fire { .. }
        ));

        let mut state = CountdownState::new(1);
        signals.pause_until = Some(now - Duration::minutes(1));
        assert!(matches!(
            state.tick(&signals, &config, now),
            TickOutcome::Fire { .. }
        ));
    }

    #[test]
    fn fire_reports_configured_duration() {
        let config = BreakConfig {
            interval_minutes: 10,
            duration_seconds: 90,
        };
        let mut state = CountdownState::new(1);
        assert_eq!(
            state.tick(&quiet_signals(), &config, Utc::now()),
            TickOutcome::Fire {
                duration_seconds: 90
            }
        );
    }

    #[test]
    fn countdown_never_underflows() {
        let config = config(10);
        let mut state = CountdownState::new(0);
        // A zero countdown decrements saturating to zero and is treated as due.
        assert!(matches!(
            state.tick(&quiet_signals(), &config, Utc::now()),
            TickOutcome::Fire { .. }
        ));
    }

    #[test]
    fn clamp_pins_out_of_range_config() {
        let low = BreakConfig {
            interval_minutes: 1,
            duration_seconds: 1,
        }
        .clamped();
        assert_eq!(low.interval_minutes, BreakConfig::MIN_INTERVAL_MINUTES);
        assert_eq!(low.duration_seconds, BreakConfig::MIN_DURATION_SECONDS);

        let high = BreakConfig {
            interval_minutes: 600,
            duration_seconds: 6000,
        }
        .clamped();
        assert_eq!(high.interval_minutes, BreakConfig::MAX_INTERVAL_MINUTES);
        assert_eq!(high.duration_seconds, BreakConfig::MAX_DURATION_SECONDS);
    }
}
