use crate::errors::{AppError, AppResult};
use crate::models::{
    CalendarEvent, Company, Definition, Entity, EntityKind, EntityRef, Field, Job, Note, Person, Project, Record,
    Task, Term,
};
use crate::navigation::{Navigation, Page};
use crate::store::{ObjectStore, Predicate, SortOrder};
use chrono::NaiveDate;

pub const UNABLE_TO_INSPECT: &str = "Unable to inspect this item";

#[derive(Debug, Clone, PartialEq)]
pub enum Inspectable {
    Job(Job),
    Project(Project),
    Record(Record),
    Company(Company),
    Person(Person),
    Note(Note),
    Task(Task),
    Term(Term),
    Definition(Definition),
    Event(CalendarEvent),
    Unknown { description: String },
}

impl From<Entity> for Inspectable {
    fn from(entity: Entity) -> Self {
        match entity {
            Entity::Job(job) => Self::Job(job),
            Entity::Project(project) => Self::Project(project),
            Entity::Record(record) => Self::Record(record),
            Entity::Company(company) => Self::Company(company),
            Entity::Person(person) => Self::Person(person),
            Entity::Note(note) => Self::Note(note),
            Entity::Task(task) => Self::Task(task),
            Entity::Term(term) => Self::Term(term),
            Entity::Definition(definition) => Self::Definition(definition),
            other => Self::Unknown {
                description: format!("{} {}", other.kind(), other.label()),
            },
        }
    }
}

impl From<CalendarEvent> for Inspectable {
    fn from(event: CalendarEvent) -> Self {
        Self::Event(event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectorAction {
    OpenDay(NaiveDate),
    SetActiveJob(String),
    OpenItem(EntityRef),
}

impl InspectorAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenDay(_) => "Open day",
            Self::SetActiveJob(_) => "Overwrite active job",
            Self::OpenItem(_) => "Open",
        }
    }

    pub fn apply(&self, navigation: &mut Navigation, store: &dyn ObjectStore) -> AppResult<()> {
        match self {
            Self::OpenDay(date) => {
                navigation.session.date = *date;
                navigation.to(Page::Today, true);
            }
            Self::SetActiveJob(id) => {
                let reference = EntityRef::new(EntityKind::Job, id.clone());
                match store.get(&reference)? {
                    Some(Entity::Job(job)) => navigation.session.set_job(Some(&job)),
                    _ => return Err(AppError::NotFound(format!("job {}", id))),
                }
            }
            Self::OpenItem(reference) => {
                navigation.session.activate(reference);
                if let Some(page) = Page::detail_for(reference.kind) {
                    navigation.to(page, true);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorPanel {
    pub title: String,
    pub rows: Vec<InspectorRow>,
    pub actions: Vec<InspectorAction>,
}

impl InspectorPanel {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
            actions: Vec::new(),
        }
    }

    fn row(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.rows.push(InspectorRow {
            label,
            value: value.into(),
        });
        self
    }

    fn action(mut self, action: InspectorAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }

    pub fn is_fallback(&self) -> bool {
        self.title == UNABLE_TO_INSPECT
    }
}

/// Read-only detail view for whatever the search session is inspecting.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspector {
    item: Inspectable,
}

impl Inspector {
    pub fn new(item: impl Into<Inspectable>) -> Self {
        Self { item: item.into() }
    }

    pub fn item(&self) -> &Inspectable {
        &self.item
    }

    pub fn panel(&self, store: &dyn ObjectStore) -> AppResult<InspectorPanel> {
        let panel = match &self.item {
            Inspectable::Job(job) => InspectorPanel::new(&job.title)
                .row("URI", job.uri.clone().unwrap_or_else(|| "-".to_string()))
                .row("Project", related(store, EntityKind::Project, job.project_id.as_deref())?)
                .row("Status", if job.alive { "Active" } else { "Inactive" })
                .row("Records", count(store, EntityKind::Record, Field::JobId, &job.id)?.to_string())
                .action(InspectorAction::SetActiveJob(job.id.clone()))
                .action(open(EntityKind::Job, &job.id)),
            Inspectable::Project(project) => InspectorPanel::new(&project.name)
                .row("Company", related(store, EntityKind::Company, project.company_id.as_deref())?)
                .row("Jobs", count(store, EntityKind::Job, Field::ProjectId, &project.id)?.to_string())
                .action(open(EntityKind::Project, &project.id)),
            Inspectable::Record(record) => {
                let mut panel = InspectorPanel::new(&record.message)
                    .row("Job", related(store, EntityKind::Job, record.job_id.as_deref())?)
                    .row("Time", record.timestamp.format("%Y-%m-%d %H:%M").to_string())
                    .action(InspectorAction::OpenDay(record.timestamp.date_naive()));
                if let Some(job_id) = &record.job_id {
                    panel = panel.action(InspectorAction::SetActiveJob(job_id.clone()));
                }
                panel
            }
            Inspectable::Company(company) => InspectorPanel::new(&company.name)
                .row("Abbreviation", &company.abbreviation)
                .row("Projects", count(store, EntityKind::Project, Field::CompanyId, &company.id)?.to_string())
                .row("Default", if company.is_default { "Yes" } else { "No" })
                .action(open(EntityKind::Company, &company.id)),
            Inspectable::Person(person) => InspectorPanel::new(&person.name)
                .row("Company", related(store, EntityKind::Company, person.company_id.as_deref())?)
                .action(open(EntityKind::Person, &person.id)),
            Inspectable::Note(note) => InspectorPanel::new(&note.title)
                .row("Job", related(store, EntityKind::Job, note.job_id.as_deref())?)
                .row("Versions", note.versions.len().to_string())
                .row("Starred", if note.starred { "Yes" } else { "No" })
                .action(open(EntityKind::Note, &note.id)),
            Inspectable::Task(task) => {
                let status = if task.completed.is_some() {
                    "Completed"
                } else if task.cancelled.is_some() {
                    "Cancelled"
                } else {
                    "Open"
                };
                let mut panel = InspectorPanel::new(&task.content)
                    .row("Job", related(store, EntityKind::Job, task.job_id.as_deref())?)
                    .row("Due", task.due.map(|due| due.to_string()).unwrap_or_else(|| "-".to_string()))
                    .row("Status", status);
                if let Some(due) = task.due {
                    panel = panel.action(InspectorAction::OpenDay(due));
                }
                panel.action(open(EntityKind::Task, &task.id))
            }
            Inspectable::Term(term) => InspectorPanel::new(&term.name)
                .row("Job", related(store, EntityKind::Job, term.job_id.as_deref())?)
                .row("Definitions", count(store, EntityKind::Definition, Field::TermId, &term.id)?.to_string())
                .action(open(EntityKind::Term, &term.id)),
            Inspectable::Definition(definition) => InspectorPanel::new(&definition.definition)
                .row("Term", related(store, EntityKind::Term, definition.term_id.as_deref())?)
                .row("Job", related(store, EntityKind::Job, definition.job_id.as_deref())?)
                .action(open(EntityKind::Definition, &definition.id)),
            Inspectable::Event(event) => {
                let when = if event.is_all_day {
                    "All day".to_string()
                } else {
                    format!("{} - {}", event.start.format("%H:%M"), event.end.format("%H:%M"))
                };
                InspectorPanel::new(&event.title)
                    .row("Calendar", &event.calendar.title)
                    .row("When", when)
                    .action(InspectorAction::OpenDay(event.start.date_naive()))
            }
            Inspectable::Unknown { description } => InspectorPanel::new(UNABLE_TO_INSPECT).row("Item", description),
        };
        Ok(panel)
    }
}

fn open(kind: EntityKind, id: &str) -> InspectorAction {
    InspectorAction::OpenItem(EntityRef::new(kind, id))
}

fn related(store: &dyn ObjectStore, kind: EntityKind, id: Option<&str>) -> AppResult<String> {
    let Some(id) = id else {
        return Ok("-".to_string());
    };
    Ok(store
        .get(&EntityRef::new(kind, id))?
        .map(|entity| entity.label())
        .unwrap_or_else(|| "-".to_string()))
}

fn count(store: &dyn ObjectStore, kind: EntityKind, field: Field, id: &str) -> AppResult<usize> {
    Ok(store
        .fetch(kind, &Predicate::Equals(field, id.to_string()), SortOrder::Unsorted)?
        .len())
}

#[cfg(test)]
mod tests {
    use super::{Inspectable, Inspector, InspectorAction};
    use crate::models::{Calendar, CalendarEvent, Entity, EntityKind, EntityRef, Job, Plan, Project, Record};
    use crate::navigation::{Navigation, Page};
    use crate::store::{MemoryStore, ObjectStore};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn store_with_job() -> (MemoryStore, Project, Job) {
        let mut store = MemoryStore::new();
        let project = Project::new("Acme", None);
        let job = Job::new("widget fix", Some(&project.id));
        store.put(Entity::Project(project.clone())).expect("put project");
        store.put(Entity::Job(job.clone())).expect("put job");
        store
            .put(Entity::Record(Record::new("did a thing", Some(&job.id))))
            .expect("put record");
        (store, project, job)
    }

    #[test]
    fn job_panel_resolves_relations() {
        let (store, _, job) = store_with_job();
        let panel = Inspector::new(Entity::Job(job.clone())).panel(&store).expect("panel");
        assert_eq!(panel.title, "widget fix");
        assert_eq!(panel.value("Project"), Some("Acme"));
        assert_eq!(panel.value("Records"), Some("1"));
        assert_eq!(panel.actions[0], InspectorAction::SetActiveJob(job.id.clone()));
        assert_eq!(panel.actions[0].label(), "Overwrite active job");
    }

    #[test]
    fn plans_fall_back_to_unable_to_inspect() {
        let store = MemoryStore::new();
        let plan = Plan::new(NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"));
        let inspector = Inspector::new(Entity::Plan(plan));
        assert!(matches!(inspector.item(), Inspectable::Unknown { .. }));
        let panel = inspector.panel(&store).expect("panel");
        assert!(panel.is_fallback());
        assert!(panel.actions.is_empty());
    }

    #[test]
    fn calendar_events_offer_open_day() {
        let store = MemoryStore::new();
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).single().expect("start");
        let event = CalendarEvent {
            id: "evt-1".to_string(),
            title: "Standup".to_string(),
            start,
            end: start + chrono::Duration::minutes(15),
            is_all_day: false,
            calendar: Calendar {
                title: "Work".to_string(),
                colour: "#ff0000".to_string(),
            },
        };
        let panel = Inspector::new(event).panel(&store).expect("panel");
        assert_eq!(panel.value("When"), Some("14:00 - 14:15"));
        assert_eq!(
            panel.actions,
            vec![InspectorAction::OpenDay(NaiveDate::from_ymd_opt(2024, 6, 3).expect("date"))]
        );
    }

    #[test]
    fn actions_drive_navigation() {
        let (store, project, job) = store_with_job();
        let mut navigation = Navigation::new();

        InspectorAction::SetActiveJob(job.id.clone())
            .apply(&mut navigation, &store)
            .expect("set job");
        assert_eq!(navigation.session.job.as_deref(), Some(job.id.as_str()));
        assert_eq!(navigation.session.project.as_deref(), Some(project.id.as_str()));

        InspectorAction::OpenItem(EntityRef::new(EntityKind::Project, project.id.clone()))
            .apply(&mut navigation, &store)
            .expect("open project");
        assert_eq!(navigation.parent(), Page::ProjectDetail);

        let day = NaiveDate::from_ymd_opt(2024, 2, 2).expect("date");
        InspectorAction::OpenDay(day).apply(&mut navigation, &store).expect("open day");
        assert_eq!(navigation.session.date, day);
        assert_eq!(navigation.parent(), Page::Today);
    }

    #[test]
    fn missing_job_cannot_become_active() {
        let (store, _, job) = store_with_job();
        let mut navigation = Navigation::new();
        navigation.session.set_job(Some(&job));

        let error = InspectorAction::SetActiveJob("gone".to_string())
            .apply(&mut navigation, &store)
            .expect_err("missing job");
        assert!(error.to_string().starts_with("NOT_FOUND"));
        assert_eq!(navigation.session.job.as_deref(), Some(job.id.as_str()));
    }
}
