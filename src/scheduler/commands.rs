use chrono::{DateTime, Utc};
use tauri::State;

use crate::AppState;

use super::ScheduleSnapshot;

#[tauri::command]
pub async fn get_schedule_state(state: State<'_, AppState>) -> Result<ScheduleSnapshot, String> {
    Ok(state.scheduler.snapshot().await)
}

#[tauri::command]
pub async fn pause_breaks_until(
    until: DateTime<Utc>,
    state: State<'_, AppState>,
) -> Result<(), String> {
    state
        .settings
        .set_pause_until(Some(until))
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn resume_breaks(state: State<'_, AppState>) -> Result<(), String> {
    state.settings.set_pause_until(None).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn skip_break(state: State<'_, AppState>) -> Result<(), String> {
    state.breaks.skip().await.map_err(|e| e.to_string())
}
