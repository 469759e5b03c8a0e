pub mod audio;
pub mod break_session;
pub mod entitlement;
pub mod scheduler;
pub mod settings;
pub mod windows_bridge;

use std::path::PathBuf;
use std::sync::Arc;

use audio::AlertPlayer;
use break_session::BreakController;
use entitlement::{EntitlementGate, StoreUnavailable};
use scheduler::{
    commands::{get_schedule_state, pause_breaks_until, resume_breaks, skip_break},
    BreakConfig, OsProbes, SchedulerController,
};
use settings::SettingsStore;
use tauri::{Manager, State};

pub(crate) struct AppState {
    pub(crate) audio: AlertPlayer,
    pub(crate) settings: SettingsStore,
    pub(crate) scheduler: SchedulerController,
    pub(crate) breaks: BreakController,
    pub(crate) entitlement: EntitlementGate,
}

#[tauri::command]
fn get_break_config(state: State<AppState>) -> Result<BreakConfig, String> {
    Ok(state.settings.break_config())
}

#[tauri::command]
fn set_break_config(config: BreakConfig, state: State<AppState>) -> Result<BreakConfig, String> {
    if !state.entitlement.is_settings_unlocked() {
        return Err("settings add-on is not unlocked".into());
    }

    state
        .settings
        .set_break_config(config)
        .map_err(|e| e.to_string())?;

    Ok(state.settings.break_config())
}

#[tauri::command]
fn get_alert_sound(state: State<AppState>) -> Result<Option<PathBuf>, String> {
    Ok(state.settings.alert_sound_path())
}

#[tauri::command]
fn set_alert_sound(path: Option<PathBuf>, state: State<AppState>) -> Result<(), String> {
    if !state.entitlement.is_settings_unlocked() {
        return Err("settings add-on is not unlocked".into());
    }

    state
        .settings
        .set_alert_sound_path(path)
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn preview_alert_sound(state: State<AppState>) -> Result<(), String> {
    state.audio.play_cue(state.settings.alert_sound_path());
    Ok(())
}

#[tauri::command]
fn is_settings_unlocked(state: State<AppState>) -> Result<bool, String> {
    Ok(state.entitlement.is_settings_unlocked())
}

#[tauri::command]
fn refresh_entitlement(state: State<AppState>) -> Result<bool, String> {
    state.entitlement.invalidate();
    Ok(state.entitlement.is_settings_unlocked())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("EyeGuard starting up...");

    tauri::Builder::default()
        // Registered first so a second launch is redirected before anything
        // else initializes. Two schedulers firing breaks independently is the
        // one failure mode this app cannot tolerate.
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            log::info!("second launch redirected to the running instance");
            if let Some(window) = app.get_webview_window("main") {
                let _ = window.show();
                let _ = window.set_focus();
            }
        }))
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let settings = SettingsStore::new(app_data_dir.join("settings.json"))?;
                let audio = AlertPlayer::new();
                let entitlement =
                    EntitlementGate::new(Box::new(StoreUnavailable), settings.clone());

                let breaks =
                    BreakController::new(app.handle().clone(), settings.clone(), audio.clone());
                let scheduler = SchedulerController::new(
                    app.handle().clone(),
                    settings.clone(),
                    Arc::new(OsProbes),
                    breaks.clone(),
                );
                scheduler.start();

                app.manage(AppState {
                    audio,
                    settings,
                    scheduler,
                    breaks,
                    entitlement,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_schedule_state,
            pause_breaks_until,
            resume_breaks,
            skip_break,
            get_break_config,
            set_break_config,
            get_alert_sound,
            set_alert_sound,
            preview_alert_sound,
            is_settings_unlocked,
            refresh_entitlement,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
