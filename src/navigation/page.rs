use crate::models::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Dashboard,
    Today,
    Notes,
    NoteDetail,
    Tasks,
    TaskDetail,
    Projects,
    ProjectDetail,
    Jobs,
    JobDetail,
    Companies,
    CompanyDetail,
    People,
    PersonDetail,
    Planning,
    Terms,
    TermDetail,
    DefinitionDetail,
    Find,
    CommandLine,
}

/// Top-level area a page belongs to; drives the accent colour of the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppPage {
    Create,
    Explore,
    Find,
    Planning,
    Today,
}

impl AppPage {
    pub fn colour(self) -> &'static str {
        match self {
            Self::Create => "#4a7f5c",
            Self::Explore => "#3a5f8f",
            Self::Find => "#8f6a3a",
            Self::Planning => "#6b4a8f",
            Self::Today => "#2f2f2f",
        }
    }
}

impl Page {
    pub const ALL: [Page; 20] = [
        Self::Dashboard,
        Self::Today,
        Self::Notes,
        Self::NoteDetail,
        Self::Tasks,
        Self::TaskDetail,
        Self::Projects,
        Self::ProjectDetail,
        Self::Jobs,
        Self::JobDetail,
        Self::Companies,
        Self::CompanyDetail,
        Self::People,
        Self::PersonDetail,
        Self::Planning,
        Self::Terms,
        Self::TermDetail,
        Self::DefinitionDetail,
        Self::Find,
        Self::CommandLine,
    ];

    pub fn default_title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Today => "Today",
            Self::Notes => "Notes",
            Self::NoteDetail => "Note",
            Self::Tasks => "Tasks",
            Self::TaskDetail => "Task",
            Self::Projects => "Projects",
            Self::ProjectDetail => "Project",
            Self::Jobs => "Jobs",
            Self::JobDetail => "Job",
            Self::Companies => "Companies",
            Self::CompanyDetail => "Company",
            Self::People => "People",
            Self::PersonDetail => "Person",
            Self::Planning => "Planning",
            Self::Terms => "Terms",
            Self::TermDetail => "Term",
            Self::DefinitionDetail => "Definition",
            Self::Find => "Find",
            Self::CommandLine => "Command line",
        }
    }

    pub fn app_page(self) -> AppPage {
        match self {
            Self::Dashboard | Self::Find => AppPage::Find,
            Self::Today | Self::CommandLine => AppPage::Today,
            Self::Planning => AppPage::Planning,
            Self::NoteDetail
            | Self::TaskDetail
            | Self::ProjectDetail
            | Self::JobDetail
            | Self::CompanyDetail
            | Self::PersonDetail
            | Self::TermDetail
            | Self::DefinitionDetail => AppPage::Create,
            Self::Notes
            | Self::Tasks
            | Self::Projects
            | Self::Jobs
            | Self::Companies
            | Self::People
            | Self::Terms => AppPage::Explore,
        }
    }

    pub fn parent(self) -> Option<Page> {
        match self {
            Self::NoteDetail => Some(Self::Notes),
            Self::TaskDetail => Some(Self::Tasks),
            Self::ProjectDetail => Some(Self::Projects),
            Self::JobDetail => Some(Self::Jobs),
            Self::CompanyDetail => Some(Self::Companies),
            Self::PersonDetail => Some(Self::People),
            Self::TermDetail => Some(Self::Terms),
            Self::DefinitionDetail => Some(Self::Terms),
            _ => None,
        }
    }

    pub fn is_detail(self) -> bool {
        self.parent().is_some()
    }

    pub fn detail_for(kind: EntityKind) -> Option<Page> {
        match kind {
            EntityKind::Job => Some(Self::JobDetail),
            EntityKind::Project => Some(Self::ProjectDetail),
            EntityKind::Company => Some(Self::CompanyDetail),
            EntityKind::Note => Some(Self::NoteDetail),
            EntityKind::Task => Some(Self::TaskDetail),
            EntityKind::Term => Some(Self::TermDetail),
            EntityKind::Definition => Some(Self::DefinitionDetail),
            EntityKind::Person => Some(Self::PersonDetail),
            EntityKind::Record => Some(Self::Today),
            EntityKind::Plan => Some(Self::Planning),
        }
    }
}
