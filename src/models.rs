use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Job,
    Project,
    Company,
    Note,
    Task,
    Record,
    Term,
    Definition,
    Person,
    Plan,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        Self::Job,
        Self::Project,
        Self::Company,
        Self::Note,
        Self::Task,
        Self::Record,
        Self::Term,
        Self::Definition,
        Self::Person,
        Self::Plan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Project => "project",
            Self::Company => "company",
            Self::Note => "note",
            Self::Task => "task",
            Self::Record => "record",
            Self::Term => "term",
            Self::Definition => "definition",
            Self::Person => "person",
            Self::Plan => "plan",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        match raw.as_str() {
            "companies" => return Some(Self::Company),
            "people" => return Some(Self::Person),
            _ => {}
        }
        let singular = raw.strip_suffix('s').unwrap_or(&raw);
        Self::ALL.into_iter().find(|kind| kind.as_str() == singular)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weak, non-owning handle to an entity living in the object store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub is_default: bool,
    pub alive: bool,
    pub created: DateTime<Utc>,
}

impl Company {
    pub fn new(name: &str) -> Self {
        let abbreviation = name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect::<String>()
            .to_uppercase();
        Self {
            id: new_id(),
            name: name.to_string(),
            abbreviation,
            is_default: false,
            alive: true,
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub company_id: Option<String>,
    pub alive: bool,
    pub created: DateTime<Utc>,
}

impl Project {
    pub fn new(name: &str, company_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            company_id: company_id.map(ToString::to_string),
            alive: true,
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub uri: Option<String>,
    pub project_id: Option<String>,
    pub alive: bool,
    pub colour: Option<String>,
    pub created: DateTime<Utc>,
}

impl Job {
    pub fn new(title: &str, project_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            title: title.to_string(),
            uri: None,
            project_id: project_id.map(ToString::to_string),
            alive: true,
            colour: None,
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteVersion {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    pub job_id: Option<String>,
    pub alive: bool,
    pub starred: bool,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub versions: Vec<NoteVersion>,
}

impl Note {
    pub fn new(title: &str, body: &str, job_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            title: title.to_string(),
            body: body.to_string(),
            job_id: job_id.map(ToString::to_string),
            alive: true,
            starred: false,
            created: Utc::now(),
            versions: Vec::new(),
        }
    }

    /// Replaces the current content, keeping the previous content as a version.
    /// Identical content is not versioned again.
    pub fn revise(&mut self, title: &str, body: &str) -> bool {
        if self.title == title && self.body == body {
            return false;
        }
        self.versions.push(NoteVersion {
            id: new_id(),
            title: std::mem::replace(&mut self.title, title.to_string()),
            body: std::mem::replace(&mut self.body, body.to_string()),
            created: Utc::now(),
        });
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub content: String,
    pub job_id: Option<String>,
    pub created: DateTime<Utc>,
    pub due: Option<NaiveDate>,
    pub completed: Option<DateTime<Utc>>,
    pub cancelled: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(content: &str, job_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            content: content.to_string(),
            job_id: job_id.map(ToString::to_string),
            created: Utc::now(),
            due: None,
            completed: None,
            cancelled: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.completed.is_none() && self.cancelled.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub message: String,
    pub job_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub alive: bool,
}

impl Record {
    pub fn new(message: &str, job_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            message: message.to_string(),
            job_id: job_id.map(ToString::to_string),
            timestamp: Utc::now(),
            alive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub id: String,
    pub name: String,
    pub job_id: Option<String>,
    pub created: DateTime<Utc>,
}

impl Term {
    pub fn new(name: &str, job_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            job_id: job_id.map(ToString::to_string),
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub id: String,
    pub definition: String,
    pub term_id: Option<String>,
    pub job_id: Option<String>,
    pub created: DateTime<Utc>,
}

impl Definition {
    pub fn new(definition: &str, term_id: Option<&str>, job_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            definition: definition.to_string(),
            term_id: term_id.map(ToString::to_string),
            job_id: job_id.map(ToString::to_string),
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    pub company_id: Option<String>,
    pub created: DateTime<Utc>,
}

impl Person {
    pub fn new(name: &str, company_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            company_id: company_id.map(ToString::to_string),
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub date: NaiveDate,
    pub created: DateTime<Utc>,
    pub jobs: BTreeSet<String>,
    pub tasks: BTreeSet<String>,
    pub notes: BTreeSet<String>,
    pub projects: BTreeSet<String>,
    pub companies: BTreeSet<String>,
}

impl Plan {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            date,
            created: Utc::now(),
            jobs: BTreeSet::new(),
            tasks: BTreeSet::new(),
            notes: BTreeSet::new(),
            projects: BTreeSet::new(),
            companies: BTreeSet::new(),
        }
    }
}

/// Attributes an entity exposes to store predicates and sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Id,
    Label,
    Text,
    JobId,
    ProjectId,
    CompanyId,
    TermId,
    Day,
    Alive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Job(Job),
    Project(Project),
    Company(Company),
    Note(Note),
    Task(Task),
    Record(Record),
    Term(Term),
    Definition(Definition),
    Person(Person),
    Plan(Plan),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Job(_) => EntityKind::Job,
            Self::Project(_) => EntityKind::Project,
            Self::Company(_) => EntityKind::Company,
            Self::Note(_) => EntityKind::Note,
            Self::Task(_) => EntityKind::Task,
            Self::Record(_) => EntityKind::Record,
            Self::Term(_) => EntityKind::Term,
            Self::Definition(_) => EntityKind::Definition,
            Self::Person(_) => EntityKind::Person,
            Self::Plan(_) => EntityKind::Plan,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Job(job) => &job.id,
            Self::Project(project) => &project.id,
            Self::Company(company) => &company.id,
            Self::Note(note) => &note.id,
            Self::Task(task) => &task.id,
            Self::Record(record) => &record.id,
            Self::Term(term) => &term.id,
            Self::Definition(definition) => &definition.id,
            Self::Person(person) => &person.id,
            Self::Plan(plan) => &plan.id,
        }
    }

    pub fn reference(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id())
    }

    pub fn label(&self) -> String {
        match self {
            Self::Job(job) => job.title.clone(),
            Self::Project(project) => project.name.clone(),
            Self::Company(company) => company.name.clone(),
            Self::Note(note) => note.title.clone(),
            Self::Task(task) => task.content.clone(),
            Self::Record(record) => record.message.clone(),
            Self::Term(term) => term.name.clone(),
            Self::Definition(definition) => definition.definition.clone(),
            Self::Person(person) => person.name.clone(),
            Self::Plan(plan) => plan.date.to_string(),
        }
    }

    pub fn created(&self) -> DateTime<Utc> {
        match self {
            Self::Job(job) => job.created,
            Self::Project(project) => project.created,
            Self::Company(company) => company.created,
            Self::Note(note) => note.created,
            Self::Task(task) => task.created,
            Self::Record(record) => record.timestamp,
            Self::Term(term) => term.created,
            Self::Definition(definition) => definition.created,
            Self::Person(person) => person.created,
            Self::Plan(plan) => plan.created,
        }
    }

    pub fn value(&self, field: Field) -> Option<String> {
        match field {
            Field::Id => Some(self.id().to_string()),
            Field::Label => Some(self.label()),
            Field::Text => Some(self.search_text()),
            Field::JobId => match self {
                Self::Note(note) => note.job_id.clone(),
                Self::Task(task) => task.job_id.clone(),
                Self::Record(record) => record.job_id.clone(),
                Self::Term(term) => term.job_id.clone(),
                Self::Definition(definition) => definition.job_id.clone(),
                _ => None,
            },
            Field::ProjectId => match self {
                Self::Job(job) => job.project_id.clone(),
                _ => None,
            },
            Field::CompanyId => match self {
                Self::Project(project) => project.company_id.clone(),
                Self::Person(person) => person.company_id.clone(),
                _ => None,
            },
            Field::TermId => match self {
                Self::Definition(definition) => definition.term_id.clone(),
                _ => None,
            },
            Field::Day => match self {
                Self::Task(task) => Some(task.due.unwrap_or_else(|| task.created.date_naive()).to_string()),
                Self::Plan(plan) => Some(plan.date.to_string()),
                other => Some(other.created().date_naive().to_string()),
            },
            Field::Alive => {
                let alive = match self {
                    Self::Job(job) => job.alive,
                    Self::Project(project) => project.alive,
                    Self::Company(company) => company.alive,
                    Self::Note(note) => note.alive,
                    Self::Record(record) => record.alive,
                    Self::Task(task) => task.cancelled.is_none(),
                    _ => true,
                };
                Some(alive.to_string())
            }
        }
    }

    fn search_text(&self) -> String {
        match self {
            Self::Job(job) => match &job.uri {
                Some(uri) => format!("{} {}", job.title, uri),
                None => job.title.clone(),
            },
            Self::Company(company) => format!("{} {}", company.name, company.abbreviation),
            Self::Note(note) => format!("{} {}", note.title, note.body),
            other => other.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub title: String,
    pub colour: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_all_day: bool,
    pub calendar: Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
    #[default]
    Collapse,
    Sliding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PulseMode {
    #[default]
    Overlapping,
    Debounced,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub history_capacity: usize,
    pub history_eviction: EvictionPolicy,
    pub search_history_capacity: usize,
    pub cli_history_capacity: usize,
    pub save_pulse_ms: u64,
    pub save_pulse_mode: PulseMode,
    pub calendar_refresh_seconds: u64,
    pub page_size: usize,
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            history_capacity: 10,
            history_eviction: EvictionPolicy::Collapse,
            search_history_capacity: 20,
            cli_history_capacity: 500,
            save_pulse_ms: 750,
            save_pulse_mode: PulseMode::Overlapping,
            calendar_refresh_seconds: 60,
            page_size: 25,
            log_filter: "info".to_string(),
        }
    }
}
