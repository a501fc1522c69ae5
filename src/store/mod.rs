pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::errors::AppResult;
use crate::models::{Entity, EntityKind, EntityRef, Field};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    All,
    Never,
    Contains(Field, String),
    Equals(Field, String),
    In(Field, BTreeSet<String>),
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::All => true,
            Self::Never => false,
            Self::Contains(field, needle) => entity
                .value(*field)
                .map(|value| value.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Self::Equals(field, expected) => entity
                .value(*field)
                .map(|value| value == *expected)
                .unwrap_or(false),
            Self::In(field, set) => entity
                .value(*field)
                .map(|value| set.contains(&value))
                .unwrap_or(false),
            Self::Not(inner) => !inner.matches(entity),
            Self::And(parts) => parts.iter().all(|part| part.matches(entity)),
            Self::Or(parts) => parts.iter().any(|part| part.matches(entity)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Unsorted,
    ByLabel,
    NewestFirst,
}

impl SortOrder {
    pub fn apply(self, entities: &mut [Entity]) {
        match self {
            Self::Unsorted => entities.sort_by(|a, b| a.id().cmp(b.id())),
            Self::ByLabel => entities.sort_by(|a, b| {
                a.label()
                    .to_lowercase()
                    .cmp(&b.label().to_lowercase())
                    .then_with(|| a.id().cmp(b.id()))
            }),
            Self::NewestFirst => entities.sort_by(|a, b| {
                b.created()
                    .cmp(&a.created())
                    .then_with(|| a.id().cmp(b.id()))
            }),
        }
    }
}

/// Queryable, mutable object graph the core reads from and writes through.
///
/// Mutations are visible to `fetch`/`get` immediately and become durable on `save`.
pub trait ObjectStore {
    fn fetch(&self, kind: EntityKind, predicate: &Predicate, sort: SortOrder) -> AppResult<Vec<Entity>>;
    fn get(&self, reference: &EntityRef) -> AppResult<Option<Entity>>;
    fn put(&mut self, entity: Entity) -> AppResult<()>;
    fn delete(&mut self, reference: &EntityRef) -> AppResult<bool>;
    fn save(&mut self) -> AppResult<()>;

    fn ids(&self, kind: EntityKind, predicate: &Predicate) -> AppResult<BTreeSet<String>> {
        Ok(self
            .fetch(kind, predicate, SortOrder::Unsorted)?
            .into_iter()
            .map(|entity| entity.id().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Predicate, SortOrder};
    use crate::models::{Entity, Field, Job};
    use std::collections::BTreeSet;

    #[test]
    fn contains_is_case_insensitive() {
        let job = Entity::Job(Job::new("Widget Fix", None));
        assert!(Predicate::Contains(Field::Text, "widget".to_string()).matches(&job));
        assert!(!Predicate::Contains(Field::Text, "gadget".to_string()).matches(&job));
    }

    #[test]
    fn missing_field_never_matches() {
        let job = Entity::Job(Job::new("orphan", None));
        let set = BTreeSet::from(["p-1".to_string()]);
        assert!(!Predicate::In(Field::ProjectId, set).matches(&job));
        assert!(!Predicate::Equals(Field::TermId, String::new()).matches(&job));
    }

    #[test]
    fn composite_predicates_combine() {
        let job = Entity::Job(Job::new("widget fix", Some("p-1")));
        let predicate = Predicate::And(vec![
            Predicate::Contains(Field::Text, "fix".to_string()),
            Predicate::Not(Box::new(Predicate::Contains(Field::Text, "bug".to_string()))),
            Predicate::Or(vec![Predicate::Never, Predicate::Equals(Field::ProjectId, "p-1".to_string())]),
        ]);
        assert!(predicate.matches(&job));
    }

    #[test]
    fn label_sort_breaks_ties_by_id() {
        let mut a = Job::new("same", None);
        a.id = "b".to_string();
        let mut b = Job::new("Same", None);
        b.id = "a".to_string();
        let mut entities = vec![Entity::Job(a), Entity::Job(b)];
        SortOrder::ByLabel.apply(&mut entities);
        assert_eq!(entities[0].id(), "a");
    }
}
