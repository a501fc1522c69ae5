use crate::models::{Entity, EntityRef, Job, Note, Task};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: String,
    pub label: String,
}

impl DropdownOption {
    pub fn from_entities(entities: &[Entity]) -> Vec<Self> {
        entities
            .iter()
            .map(|entity| Self {
                value: entity.id().to_string(),
                label: entity.label(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Boolean(bool),
    Colour(Option<String>),
    Date(Option<NaiveDate>),
    Choice(Option<String>),
}

/// One editable field of a form, with accessors bound to the model type.
pub enum Field<M> {
    Text {
        label: &'static str,
        get: fn(&M) -> String,
        set: fn(&mut M, String),
    },
    Boolean {
        label: &'static str,
        get: fn(&M) -> bool,
        set: fn(&mut M, bool),
    },
    Colour {
        label: &'static str,
        get: fn(&M) -> Option<String>,
        set: fn(&mut M, Option<String>),
    },
    Date {
        label: &'static str,
        get: fn(&M) -> Option<NaiveDate>,
        set: fn(&mut M, Option<NaiveDate>),
    },
    Dropdown {
        label: &'static str,
        options: Vec<DropdownOption>,
        get: fn(&M) -> Option<String>,
        set: fn(&mut M, Option<String>),
    },
    Editor {
        label: &'static str,
        get: fn(&M) -> String,
        set: fn(&mut M, String),
    },
}

impl<M> Field<M> {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text { label, .. }
            | Self::Boolean { label, .. }
            | Self::Colour { label, .. }
            | Self::Date { label, .. }
            | Self::Dropdown { label, .. }
            | Self::Editor { label, .. } => *label,
        }
    }

    pub fn read(&self, model: &M) -> FieldValue {
        match self {
            Self::Text { get, .. } | Self::Editor { get, .. } => FieldValue::Text(get(model)),
            Self::Boolean { get, .. } => FieldValue::Boolean(get(model)),
            Self::Colour { get, .. } => FieldValue::Colour(get(model)),
            Self::Date { get, .. } => FieldValue::Date(get(model)),
            Self::Dropdown { get, .. } => FieldValue::Choice(get(model)),
        }
    }

    /// Writes `value` when it has the field's shape. Dropdown values must be one of the options.
    pub fn write(&self, model: &mut M, value: FieldValue) -> bool {
        match (self, value) {
            (Self::Text { set, .. }, FieldValue::Text(text)) | (Self::Editor { set, .. }, FieldValue::Text(text)) => {
                set(model, text);
                true
            }
            (Self::Boolean { set, .. }, FieldValue::Boolean(flag)) => {
                set(model, flag);
                true
            }
            (Self::Colour { set, .. }, FieldValue::Colour(colour)) => {
                set(model, colour);
                true
            }
            (Self::Date { set, .. }, FieldValue::Date(date)) => {
                set(model, date);
                true
            }
            (Self::Dropdown { set, options, .. }, FieldValue::Choice(choice)) => {
                if let Some(value) = &choice {
                    if !options.iter().any(|option| &option.value == value) {
                        return false;
                    }
                }
                set(model, choice);
                true
            }
            _ => false,
        }
    }
}

pub fn job_fields(projects: &[Entity]) -> Vec<Field<Job>> {
    vec![
        Field::Text {
            label: "Title",
            get: |job: &Job| job.title.clone(),
            set: |job: &mut Job, value: String| job.title = value,
        },
        Field::Text {
            label: "URI",
            get: |job: &Job| job.uri.clone().unwrap_or_default(),
            set: |job: &mut Job, value: String| job.uri = (!value.trim().is_empty()).then_some(value),
        },
        Field::Boolean {
            label: "Active",
            get: |job: &Job| job.alive,
            set: |job: &mut Job, value: bool| job.alive = value,
        },
        Field::Colour {
            label: "Colour",
            get: |job: &Job| job.colour.clone(),
            set: |job: &mut Job, value: Option<String>| job.colour = value,
        },
        Field::Dropdown {
            label: "Project",
            options: DropdownOption::from_entities(projects),
            get: |job: &Job| job.project_id.clone(),
            set: |job: &mut Job, value: Option<String>| job.project_id = value,
        },
    ]
}

pub fn note_fields(jobs: &[Entity]) -> Vec<Field<Note>> {
    vec![
        Field::Text {
            label: "Title",
            get: |note: &Note| note.title.clone(),
            set: |note: &mut Note, value: String| note.title = value,
        },
        Field::Editor {
            label: "Body",
            get: |note: &Note| note.body.clone(),
            set: |note: &mut Note, value: String| note.body = value,
        },
        Field::Boolean {
            label: "Starred",
            get: |note: &Note| note.starred,
            set: |note: &mut Note, value: bool| note.starred = value,
        },
        Field::Dropdown {
            label: "Job",
            options: DropdownOption::from_entities(jobs),
            get: |note: &Note| note.job_id.clone(),
            set: |note: &mut Note, value: Option<String>| note.job_id = value,
        },
    ]
}

pub fn task_fields(jobs: &[Entity]) -> Vec<Field<Task>> {
    vec![
        Field::Text {
            label: "Content",
            get: |task: &Task| task.content.clone(),
            set: |task: &mut Task, value: String| task.content = value,
        },
        Field::Date {
            label: "Due",
            get: |task: &Task| task.due,
            set: |task: &mut Task, value: Option<NaiveDate>| task.due = value,
        },
        Field::Dropdown {
            label: "Job",
            options: DropdownOption::from_entities(jobs),
            get: |task: &Task| task.job_id.clone(),
            set: |task: &mut Task, value: Option<String>| task.job_id = value,
        },
    ]
}

/// Form state shared by the editing views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forms {
    selection: Option<EntityRef>,
}

impl Forms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, reference: EntityRef) {
        self.selection = Some(reference);
    }

    pub fn selection(&self) -> Option<&EntityRef> {
        self.selection.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}
