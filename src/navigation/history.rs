use crate::models::EvictionPolicy;
use crate::navigation::page::Page;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewDescriptor(String);

impl ViewDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SidebarDescriptor(String);

impl SidebarDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavButton {
    Previous,
    Reset,
    Search,
    Create,
    Planning,
    ToggleSidebar,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub id: Uuid,
    pub page: Page,
    pub view: ViewDescriptor,
    pub sidebar: Option<SidebarDescriptor>,
    pub title: String,
    pub nav_buttons: Vec<NavButton>,
}

impl HistoryPage {
    pub fn new(page: Page, view: ViewDescriptor, sidebar: Option<SidebarDescriptor>) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            view,
            sidebar,
            title: page.default_title().to_string(),
            nav_buttons: default_nav_buttons(page),
        }
    }

    pub fn standard(page: Page) -> Self {
        let key = serde_json::to_value(page)
            .ok()
            .and_then(|value| value.as_str().map(ToString::to_string))
            .unwrap_or_else(|| "dashboard".to_string());
        let sidebar = match page {
            Page::Dashboard | Page::Find => Some(SidebarDescriptor::new("dashboard-sidebar")),
            Page::Today | Page::CommandLine => Some(SidebarDescriptor::new("today-sidebar")),
            Page::Planning => Some(SidebarDescriptor::new("planning-sidebar")),
            _ if page.is_detail() => None,
            _ => Some(SidebarDescriptor::new(format!("{}-sidebar", key))),
        };
        Self::new(page, ViewDescriptor::new(format!("{}-view", key)), sidebar)
    }
}

fn default_nav_buttons(page: Page) -> Vec<NavButton> {
    match page {
        Page::Dashboard => vec![NavButton::ToggleSidebar, NavButton::Search, NavButton::Settings],
        Page::Find => vec![NavButton::Previous, NavButton::Reset, NavButton::Search],
        Page::Planning => vec![NavButton::Previous, NavButton::Reset, NavButton::Planning],
        Page::Today | Page::CommandLine => vec![NavButton::Previous, NavButton::Planning],
        _ if page.is_detail() => vec![NavButton::Previous],
        _ => vec![NavButton::Previous, NavButton::Create, NavButton::Search],
    }
}

/// Page to renderable configuration. Always holds a dashboard entry to fall back on.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    pages: HashMap<Page, HistoryPage>,
    fallback: HistoryPage,
}

impl RoutingTable {
    pub fn new(fallback: HistoryPage) -> Self {
        let mut pages = HashMap::new();
        pages.insert(fallback.page, fallback.clone());
        Self { pages, fallback }
    }

    pub fn standard() -> Self {
        let mut table = Self::new(HistoryPage::standard(Page::Dashboard));
        for page in Page::ALL {
            if page != Page::Dashboard {
                table.register(HistoryPage::standard(page));
            }
        }
        table
    }

    /// Registers `entry`, replacing any earlier entry for the same page.
    pub fn register(&mut self, entry: HistoryPage) {
        if entry.page == self.fallback.page {
            self.fallback = entry.clone();
        }
        self.pages.insert(entry.page, entry);
    }

    pub fn get(&self, page: Page) -> &HistoryPage {
        self.pages.get(&page).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, page: Page) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct History {
    recent: Vec<HistoryPage>,
    current_index: isize,
    routes: Arc<RoutingTable>,
    capacity: usize,
    eviction: EvictionPolicy,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Arc::new(RoutingTable::standard()))
    }
}

impl History {
    pub fn new(routes: Arc<RoutingTable>) -> Self {
        Self::with_policy(routes, DEFAULT_HISTORY_CAPACITY, EvictionPolicy::Collapse)
    }

    pub fn with_policy(routes: Arc<RoutingTable>, capacity: usize, eviction: EvictionPolicy) -> Self {
        Self {
            recent: Vec::new(),
            current_index: 0,
            routes,
            capacity: capacity.max(1),
            eviction,
        }
    }

    pub fn get(&self, page: Page) -> &HistoryPage {
        self.routes.get(page)
    }

    pub fn routes(&self) -> &Arc<RoutingTable> {
        &self.routes
    }

    pub fn push(&mut self, entry: HistoryPage) {
        self.recent.push(entry);
        match self.eviction {
            EvictionPolicy::Collapse => {
                if self.recent.len() >= self.capacity {
                    let newest = self.recent.split_off(self.recent.len() - 1);
                    self.recent = newest;
                }
            }
            EvictionPolicy::Sliding => {
                if self.recent.len() > self.capacity {
                    let excess = self.recent.len() - self.capacity;
                    self.recent.drain(..excess);
                }
            }
        }
        self.current_index = self.recent.len() as isize;
    }

    /// Single step back. Returns `None` on any boundary condition instead of walking further.
    pub fn previous(&mut self) -> Option<&HistoryPage> {
        self.current_index -= 1;
        if self.current_index <= -1 {
            self.current_index = self.recent.len() as isize;
        }

        let index = self.current_index - 1;
        if index < 0 || index as usize >= self.recent.len() || self.current_index > self.capacity as isize {
            return None;
        }
        self.recent.get(index as usize)
    }

    pub fn recent(&self) -> &[HistoryPage] {
        &self.recent
    }

    pub fn current_index(&self) -> isize {
        self.current_index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
