pub mod calendar;
pub mod errors;
pub mod forms;
pub mod inspector;
pub mod models;
pub mod navigation;
pub mod planning;
pub mod search_language;
pub mod session;
pub mod store;

pub use crate::calendar::{CalendarFeed, CalendarSource};
pub use crate::errors::{AppError, AppResult};
pub use crate::inspector::{Inspectable, Inspector, InspectorAction, InspectorPanel};
pub use crate::models::{AppSettings, Entity, EntityKind, EntityRef};
pub use crate::navigation::{History, HistoryPage, Navigation, Page, RoutingTable};
pub use crate::planning::PlanningState;
pub use crate::search_language::{Component, Parser, Results, SearchResult};
pub use crate::session::{CommandLineSession, CommandRouter, Search, Session};
pub use crate::store::{MemoryStore, ObjectStore, Predicate, SortOrder, SqliteStore};

use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// One application window: the persistent store and the navigation state over it.
#[derive(Debug)]
pub struct AppContext {
    pub store: SqliteStore,
    pub navigation: Navigation,
}

impl AppContext {
    pub fn open(data_dir: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let store = SqliteStore::open(&data_dir.join("worklog.db"))?;
        let settings = store.get_settings()?;
        tracing::info!(path = %store.path().display(), "opened work log");
        Ok(Self {
            store,
            navigation: Navigation::with_settings(settings),
        })
    }

    pub fn start_calendar(&self, source: Arc<dyn CalendarSource>) -> (CalendarFeed, JoinHandle<()>) {
        let feed = CalendarFeed::new(source);
        let every = Duration::from_secs(self.navigation.settings().calendar_refresh_seconds.max(1));
        let handle = feed.spawn_refresh(every);
        (feed, handle)
    }
}

/// Daily-rolling JSON logs under `<data_dir>/logs`. `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(data_dir: &Path, default_filter: &str) -> AppResult<()> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "worklog.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Config(error.to_string()))
}
