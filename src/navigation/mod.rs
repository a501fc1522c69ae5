pub mod history;
pub mod page;
pub mod pulse;

pub use history::{History, HistoryPage, NavButton, RoutingTable, SidebarDescriptor, ViewDescriptor};
pub use page::{AppPage, Page};
pub use pulse::{PulseFlag, SavePulse};

use crate::forms::Forms;
use crate::models::AppSettings;
use crate::planning::PlanningState;
use crate::session::{Session, ToolbarMode};
use std::sync::Arc;
use tokio::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InspectorDescriptor(String);

impl InspectorDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Window-level state machine: which page is showing, its chrome, and the session behind it.
#[derive(Debug)]
pub struct Navigation {
    id: Uuid,
    parent: Page,
    page_id: Uuid,
    title: String,
    view: ViewDescriptor,
    sidebar: Option<SidebarDescriptor>,
    inspector: Option<InspectorDescriptor>,
    app_page: AppPage,
    nav_buttons: Vec<NavButton>,
    pub session: Session,
    pub planning: PlanningState,
    pub history: History,
    pub forms: Forms,
    pulse: SavePulse,
    routes: Arc<RoutingTable>,
    settings: AppSettings,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigation {
    pub fn new() -> Self {
        Self::with_settings(AppSettings::default())
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self::with_routes(settings, Arc::new(RoutingTable::standard()))
    }

    pub fn with_routes(settings: AppSettings, routes: Arc<RoutingTable>) -> Self {
        let landing = routes.get(Page::Dashboard).clone();
        Self {
            id: Uuid::new_v4(),
            parent: landing.page,
            page_id: landing.id,
            title: landing.title.clone(),
            view: landing.view.clone(),
            sidebar: landing.sidebar.clone(),
            inspector: None,
            app_page: landing.page.app_page(),
            nav_buttons: landing.nav_buttons.clone(),
            session: Session::from_settings(&settings),
            planning: PlanningState::default(),
            history: new_history(&settings, &routes),
            forms: Forms::new(),
            pulse: SavePulse::new(Duration::from_millis(settings.save_pulse_ms), settings.save_pulse_mode),
            routes,
            settings,
        }
    }

    pub fn to(&mut self, page: Page, add_to_history: bool) {
        let entry = self.history.get(page).clone();

        self.set_view(entry.view.clone());
        self.set_sidebar(entry.sidebar.clone());
        self.set_parent(entry.page);
        self.set_id(entry.id);
        self.set_title(&entry.title);
        self.app_page = entry.page.app_page();
        self.set_nav_buttons(entry.nav_buttons.clone());
        self.session.toolbar.mode = match entry.page {
            Page::Find => ToolbarMode::Search,
            Page::Planning => ToolbarMode::Planning,
            _ => ToolbarMode::Standard,
        };

        if add_to_history {
            self.history.push(entry);
        }
        self.session.search.cancel();

        tracing::debug!(requested = ?page, page = ?self.parent, add_to_history, "navigated");
    }

    /// Steps back one page without recording the step in history.
    pub fn back(&mut self) -> bool {
        let Some(page) = self.history.previous().map(|entry| entry.page) else {
            return false;
        };
        self.to(page, false);
        true
    }

    /// View of the current page's parent, for breadcrumbs.
    pub fn back_target(&self) -> Option<(Page, ViewDescriptor)> {
        self.parent.parent().map(|page| (page, self.link(page)))
    }

    pub fn link(&self, page: Page) -> ViewDescriptor {
        self.history.get(page).view.clone()
    }

    /// Replaces the main view. Any open form selection and inspector are discarded with it.
    pub fn set_view(&mut self, view: ViewDescriptor) {
        self.view = view;
        self.forms.clear_selection();
        self.inspector = None;
    }

    pub fn set_parent(&mut self, page: Page) {
        self.parent = page;
    }

    pub fn set_sidebar(&mut self, sidebar: Option<SidebarDescriptor>) {
        if let Some(sidebar) = sidebar {
            self.sidebar = Some(sidebar);
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_id(&mut self, id: Uuid) {
        self.page_id = id;
    }

    pub fn set_inspector(&mut self, inspector: Option<InspectorDescriptor>) {
        self.inspector = inspector;
    }

    pub fn set_nav_buttons(&mut self, buttons: Vec<NavButton>) {
        self.nav_buttons = buttons;
    }

    pub fn save<F: FnOnce()>(&self, callback: Option<F>) {
        self.pulse.fire(None, callback);
    }

    /// Like [`Navigation::save`], also pulsing a flag owned by the caller.
    pub fn save_with<F: FnOnce()>(&self, updated: PulseFlag, callback: Option<F>) {
        self.pulse.fire(Some(updated), callback);
    }

    pub fn is_saved(&self) -> bool {
        self.pulse.is_set()
    }

    pub fn saved_flag(&self) -> PulseFlag {
        self.pulse.flag()
    }

    pub fn reset(&mut self) {
        self.session = Session::from_settings(&self.settings);
        self.history = new_history(&self.settings, &self.routes);
        self.forms = Forms::new();
        tracing::debug!(navigation = %self.id, "navigation reset");
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parent(&self) -> Page {
        self.parent
    }

    pub fn page_id(&self) -> Uuid {
        self.page_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn view(&self) -> &ViewDescriptor {
        &self.view
    }

    pub fn sidebar(&self) -> Option<&SidebarDescriptor> {
        self.sidebar.as_ref()
    }

    pub fn inspector(&self) -> Option<&InspectorDescriptor> {
        self.inspector.as_ref()
    }

    pub fn app_page(&self) -> AppPage {
        self.app_page
    }

    pub fn nav_buttons(&self) -> &[NavButton] {
        &self.nav_buttons
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }
}

fn new_history(settings: &AppSettings, routes: &Arc<RoutingTable>) -> History {
    History::with_policy(routes.clone(), settings.history_capacity, settings.history_eviction)
}
