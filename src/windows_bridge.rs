//! Win32 / WinRT probe layer. Every entry point has a neutral fallback for
//! non-Windows builds so the scheduler compiles and runs (with all gates
//! open) on development machines.

use anyhow::Result;

use crate::scheduler::AttentionState;

/// Outer bounds of a window or monitor in virtual-screen coordinates.
/// Right and bottom edges are exclusive, matching the Win32 RECT convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// A window is fullscreen when its outer rectangle covers the monitor
/// rectangle exactly. The monitor rectangle, not the work area, is the
/// reference: borderless fullscreen windows cover the taskbar too, and
/// comparing against the work area would miss them.
pub fn rect_fills_monitor(window: &Rect, monitor: &Rect) -> bool {
    window.left == monitor.left
        && window.top == monitor.top
        && window.right == monitor.right
        && window.bottom == monitor.bottom
}

/// Collapse `SHQueryUserNotificationState` into the three states the
/// scheduler cares about.
pub fn user_attention_state() -> Result<AttentionState> {
    #[cfg(target_os = "windows")]
    {
        use windows::Win32::UI::Shell::{
            SHQueryUserNotificationState, QUNS_BUSY, QUNS_NOT_PRESENT, QUNS_PRESENTATION_MODE,
            QUNS_RUNNING_D3D_FULL_SCREEN,
        };

        let state = unsafe { SHQueryUserNotificationState()? };
        Ok(if state == QUNS_NOT_PRESENT {
            AttentionState::Away
        } else if state == QUNS_BUSY
            || state == QUNS_RUNNING_D3D_FULL_SCREEN
            || state == QUNS_PRESENTATION_MODE
        {
            AttentionState::SuppressNotifications
        } else {
            AttentionState::Normal
        })
    }

    #[cfg(not(target_os = "windows"))]
    {
        Ok(AttentionState::Normal)
    }
}

pub fn is_focus_session_supported() -> bool {
    #[cfg(target_os = "windows")]
    {
        use windows::UI::Shell::FocusSessionManager;

        FocusSessionManager::IsSupported().unwrap_or(false)
    }

    #[cfg(not(target_os = "windows"))]
    {
        false
    }
}

pub fn is_focus_session_active() -> Result<bool> {
    #[cfg(target_os = "windows")]
    {
        use windows::UI::Shell::FocusSessionManager;

        let manager = FocusSessionManager::GetDefault()?;
        Ok(manager.IsFocusActive()?)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Ok(false)
    }
}

/// Geometric fullscreen test against the monitor hosting the foreground
/// window. A missing foreground window (focus is changing hands) counts as
/// not fullscreen.
pub fn is_foreground_window_fullscreen() -> Result<bool> {
    #[cfg(target_os = "windows")]
    {
        use anyhow::bail;
        use windows::Win32::Foundation::RECT;
        use windows::Win32::Graphics::Gdi::{
            GetMonitorInfoW, MonitorFromWindow, MONITORINFO, MONITOR_DEFAULTTOPRIMARY,
        };
        use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowRect};

        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            return Ok(false);
        }

        let mut window_rect = RECT::default();
        unsafe { GetWindowRect(hwnd, &mut window_rect)? };

        let monitor = unsafe { MonitorFromWindow(hwnd, MONITOR_DEFAULTTOPRIMARY) };
        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !unsafe { GetMonitorInfoW(monitor, &mut info) }.as_bool() {
            bail!("GetMonitorInfoW failed for the foreground window's monitor");
        }

        Ok(rect_fills_monitor(
            &rect_from_win32(window_rect),
            &rect_from_win32(info.rcMonitor),
        ))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Ok(false)
    }
}

#[cfg(target_os = "windows")]
fn rect_from_win32(rect: windows::Win32::Foundation::RECT) -> Rect {
    Rect {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR: Rect = Rect {
        left: 0,
        top: 0,
        right: 2560,
        bottom: 1440,
    };

    // Work area on the same monitor, with a 48px taskbar at the bottom.
    const WORK_AREA: Rect = Rect {
        left: 0,
        top: 0,
        right: 2560,
        bottom: 1392,
    };

    #[test]
    fn window_matching_monitor_rect_is_fullscreen() {
        assert!(rect_fills_monitor(&MONITOR, &MONITOR));
    }

    #[test]
    fn window_matching_work_area_is_not_fullscreen() {
        assert!(!rect_fills_monitor(&WORK_AREA, &MONITOR));
    }

    #[test]
    fn maximized_window_short_of_any_edge_is_not_fullscreen() {
        let window = Rect {
            left: 1,
            ..MONITOR
        };
        assert!(!rect_fills_monitor(&window, &MONITOR));
    }

    #[test]
    fn secondary_monitor_with_negative_origin_matches() {
        let monitor = Rect {
            left: -1920,
            top: -300,
            right: 0,
            bottom: 780,
        };
        assert!(rect_fills_monitor(&monitor, &monitor));
    }
}
