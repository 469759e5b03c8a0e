use log::debug;

use crate::windows_bridge;

/// Collapsed user-attention signal reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionState {
    /// No recent user input (locked screen, screensaver, walked away).
    Away,
    /// Presentation mode or a full-screen Direct3D application; the OS is
    /// holding back notifications and so do we.
    SuppressNotifications,
    Normal,
}

/// OS probes the scheduler consults on every tick. All implementations are
/// best-effort: a probe that cannot answer reports the neutral value instead
/// of an error, so the minute cadence never stalls on a broken probe.
pub trait SystemProbes: Send + Sync {
    fn attention_state(&self) -> AttentionState;
    fn focus_session_active(&self) -> bool;
    fn foreground_fullscreen(&self) -> bool;
}

/// Production probes backed by the platform bridge.
pub struct OsProbes;

impl SystemProbes for OsProbes {
    fn attention_state(&self) -> AttentionState {
        match windows_bridge::user_attention_state() {
            Ok(state) => state,
            Err(err) => {
                debug!("attention probe unavailable: {err}");
                AttentionState::Normal
            }
        }
    }

    fn focus_session_active(&self) -> bool {
        if !windows_bridge::is_focus_session_supported() {
            return false;
        }

        match windows_bridge::is_focus_session_active() {
            Ok(active) => active,
            Err(err) => {
                debug!("focus session probe unavailable: {err}");
                false
            }
        }
    }

    fn foreground_fullscreen(&self) -> bool {
        match windows_bridge::is_foreground_window_fullscreen() {
            Ok(fullscreen) => fullscreen,
            Err(err) => {
                debug!("fullscreen probe unavailable: {err}");
                false
            }
        }
    }
}
