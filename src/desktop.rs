use std::{path::PathBuf, sync::Arc};

use tauri::{Manager, State};
use tokio::sync::RwLock;

use crate::clock::SystemClock;
use crate::config::{AppConfig, ConfigStore};
use crate::db::Store;
use crate::favorites::FavoritesStore;
use crate::fetch::EventFetcher;
use crate::import::{self, ImportedFile, ImporterInfo};
use crate::logging;
use crate::models::Event;
use crate::schedule::{ScheduleService, ScheduleView};
use crate::search::HttpSearchBackend;

struct AppState {
    store: Arc<Store>,
    favorites: FavoritesStore,
    schedule: RwLock<Arc<ScheduleService>>,
}

impl AppState {
    async fn schedule(&self) -> Arc<ScheduleService> {
        self.schedule.read().await.clone()
    }
}

fn build_schedule(config: &AppConfig, store: Arc<Store>) -> anyhow::Result<ScheduleService> {
    let search = config.search.clone();
    let backend = HttpSearchBackend::from_config(&search)?;
    let fetcher = EventFetcher::new(search, Arc::new(backend), store, Arc::new(SystemClock));
    Ok(ScheduleService::new(fetcher))
}

#[tauri::command]
async fn load_events(state: State<'_, AppState>) -> Result<ScheduleView, String> {
    let schedule = state.schedule().await;
    schedule.load_initial().await;
    Ok(schedule.view())
}

#[tauri::command]
async fn load_more(state: State<'_, AppState>) -> Result<ScheduleView, String> {
    let schedule = state.schedule().await;
    schedule.load_more().await;
    Ok(schedule.view())
}

#[tauri::command]
async fn reload_events(state: State<'_, AppState>) -> Result<ScheduleView, String> {
    let schedule = state.schedule().await;
    schedule.reload().await;
    Ok(schedule.view())
}

#[tauri::command]
async fn schedule_view(state: State<'_, AppState>) -> Result<ScheduleView, String> {
    Ok(state.schedule().await.view())
}

#[tauri::command]
async fn toggle_favorite(event: Event, state: State<'_, AppState>) -> Result<bool, String> {
    state.favorites.toggle(&event).map_err(|e| e.to_string())
}

#[tauri::command]
async fn list_favorites(state: State<'_, AppState>) -> Result<Vec<Event>, String> {
    Ok(state.favorites.list())
}

#[tauri::command]
async fn is_favorite(event_id: String, state: State<'_, AppState>) -> Result<bool, String> {
    Ok(state.favorites.is_favorite(&event_id))
}

#[tauri::command]
async fn list_importers() -> Result<Vec<ImporterInfo>, String> {
    Ok(import::list_importers())
}

#[tauri::command]
async fn import_file(path: String) -> Result<ImportedFile, String> {
    tauri::async_runtime::spawn_blocking(move || import::import_file(&PathBuf::from(path)))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn get_config(config_store: State<'_, ConfigStore>) -> Result<AppConfig, String> {
    Ok(config_store.read())
}

#[tauri::command]
async fn update_config(
    config: AppConfig,
    config_store: State<'_, ConfigStore>,
    state: State<'_, AppState>,
) -> Result<AppConfig, String> {
    let updated = config_store
        .update(|current| *current = config)
        .map_err(|e| e.to_string())?;

    let effective = updated.clone().with_env_overrides();
    let schedule =
        build_schedule(&effective, state.store.clone()).map_err(|e| format!("{e:#}"))?;
    schedule.invalidate_cache();
    *state.schedule.write().await = Arc::new(schedule);
    tracing::info!("search configuration replaced");

    Ok(updated)
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let config_store = ConfigStore::load();
    let config = config_store.read().with_env_overrides();
    logging::init(config.log_level.as_deref());

    tauri::Builder::default()
        .manage(config_store)
        .plugin(tauri_plugin_opener::init())
        .invoke_handler(tauri::generate_handler![
            load_events,
            load_more,
            reload_events,
            schedule_view,
            toggle_favorite,
            list_favorites,
            is_favorite,
            list_importers,
            import_file,
            get_config,
            update_config
        ])
        .setup(move |app| {
            let store = Arc::new(Store::open_default()?);
            let favorites = FavoritesStore::load(store.clone())?;
            let schedule = build_schedule(&config, store.clone())?;
            app.manage(AppState {
                store,
                favorites,
                schedule: RwLock::new(Arc::new(schedule)),
            });
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
