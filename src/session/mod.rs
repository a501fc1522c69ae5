pub mod command_line;
pub mod search;

pub use command_line::{
    parse_command, AppType, CommandLineSession, CommandOutcome, CommandRouter, HistoryLine, ParsedCommand, Status,
};
pub use search::Search;

use crate::models::{
    AppSettings, Company, Definition, EntityKind, EntityRef, Job, Note, Person, Plan, Project, Record, Task, Term,
};
use chrono::{Local, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolbarMode {
    #[default]
    Standard,
    Search,
    Planning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Toolbar {
    pub mode: ToolbarMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePagination {
    pub page: usize,
    pub per_page: usize,
}

impl Default for TablePagination {
    fn default() -> Self {
        Self::new(25)
    }
}

impl TablePagination {
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 0,
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.page * self.per_page
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    /// Advances unless already on the last page for `total` items.
    pub fn next(&mut self, total: usize) -> bool {
        if self.page + 1 >= self.page_count(total) {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    pub fn page_of<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = (start + self.per_page).min(items.len());
        &items[start..end]
    }
}

/// What the window is currently looking at and acting on. Entity fields hold ids only.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub job: Option<String>,
    pub project: Option<String>,
    pub company: Option<String>,
    pub note: Option<String>,
    pub plan: Option<String>,
    pub task: Option<String>,
    pub record: Option<String>,
    pub term: Option<String>,
    pub person: Option<String>,
    pub definition: Option<String>,
    pub date: NaiveDate,
    pub search: Search,
    pub toolbar: Toolbar,
    pub cli: CommandLineSession,
    pub pagination: TablePagination,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_settings(&AppSettings::default())
    }
}

impl Session {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            job: None,
            project: None,
            company: None,
            note: None,
            plan: None,
            task: None,
            record: None,
            term: None,
            person: None,
            definition: None,
            date: Local::now().date_naive(),
            search: Search::with_history_capacity(settings.search_history_capacity),
            toolbar: Toolbar::default(),
            cli: CommandLineSession::with_capacity(settings.cli_history_capacity),
            pagination: TablePagination::new(settings.page_size),
        }
    }

    /// Activates `job` together with the project it belongs to.
    pub fn set_job(&mut self, job: Option<&Job>) {
        match job {
            Some(job) => {
                self.job = Some(job.id.clone());
                if job.project_id.is_some() {
                    self.project = job.project_id.clone();
                }
            }
            None => self.job = None,
        }
    }

    /// Activates `project` together with its company.
    pub fn set_project(&mut self, project: Option<&Project>) {
        match project {
            Some(project) => {
                self.project = Some(project.id.clone());
                if project.company_id.is_some() {
                    self.company = project.company_id.clone();
                }
            }
            None => self.project = None,
        }
    }

    pub fn set_company(&mut self, company: Option<&Company>) {
        self.company = company.map(|company| company.id.clone());
    }

    pub fn set_note(&mut self, note: Option<&Note>) {
        self.note = note.map(|note| note.id.clone());
    }

    pub fn set_plan(&mut self, plan: Option<&Plan>) {
        self.plan = plan.map(|plan| plan.id.clone());
    }

    pub fn set_task(&mut self, task: Option<&Task>) {
        self.task = task.map(|task| task.id.clone());
    }

    pub fn set_record(&mut self, record: Option<&Record>) {
        self.record = record.map(|record| record.id.clone());
    }

    pub fn set_term(&mut self, term: Option<&Term>) {
        self.term = term.map(|term| term.id.clone());
    }

    pub fn set_person(&mut self, person: Option<&Person>) {
        self.person = person.map(|person| person.id.clone());
    }

    pub fn set_definition(&mut self, definition: Option<&Definition>) {
        self.definition = definition.map(|definition| definition.id.clone());
    }

    /// Marks the referenced entity as the active one of its kind.
    pub fn activate(&mut self, reference: &EntityRef) {
        let id = Some(reference.id.clone());
        match reference.kind {
            EntityKind::Job => self.job = id,
            EntityKind::Project => self.project = id,
            EntityKind::Company => self.company = id,
            EntityKind::Note => self.note = id,
            EntityKind::Plan => self.plan = id,
            EntityKind::Task => self.task = id,
            EntityKind::Record => self.record = id,
            EntityKind::Term => self.term = id,
            EntityKind::Person => self.person = id,
            EntityKind::Definition => self.definition = id,
        }
    }

    pub fn clear(&mut self) {
        self.job = None;
        self.project = None;
        self.company = None;
        self.note = None;
        self.plan = None;
        self.task = None;
        self.record = None;
        self.term = None;
        self.person = None;
        self.definition = None;
    }
}
