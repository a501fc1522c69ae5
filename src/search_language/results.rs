use crate::errors::AppResult;
use crate::models::{Entity, EntityKind, EntityRef, Field};
use crate::search_language::{Component, Scope};
use crate::store::{ObjectStore, Predicate, SortOrder};
use std::collections::BTreeSet;

const SEARCHABLE: [EntityKind; 9] = [
    EntityKind::Job,
    EntityKind::Project,
    EntityKind::Company,
    EntityKind::Note,
    EntityKind::Task,
    EntityKind::Record,
    EntityKind::Term,
    EntityKind::Definition,
    EntityKind::Person,
];

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    entity: Entity,
}

impl SearchResult {
    pub fn kind(&self) -> EntityKind {
        self.entity.kind()
    }

    pub fn label(&self) -> String {
        self.entity.label()
    }

    pub fn reference(&self) -> EntityRef {
        self.entity.reference()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn into_entity(self) -> Entity {
        self.entity
    }
}

/// Id sets a scoped component narrows the search to. `None` means the level is outside the scope.
#[derive(Debug, Default)]
struct ScopeIds {
    companies: Option<BTreeSet<String>>,
    projects: Option<BTreeSet<String>>,
    jobs: BTreeSet<String>,
}

impl ScopeIds {
    fn predicate_for(&self, kind: EntityKind) -> Predicate {
        match kind {
            EntityKind::Company => self
                .companies
                .clone()
                .map(|ids| Predicate::In(Field::Id, ids))
                .unwrap_or(Predicate::Never),
            EntityKind::Person => self
                .companies
                .clone()
                .map(|ids| Predicate::In(Field::CompanyId, ids))
                .unwrap_or(Predicate::Never),
            EntityKind::Project => self
                .projects
                .clone()
                .map(|ids| Predicate::In(Field::Id, ids))
                .unwrap_or(Predicate::Never),
            EntityKind::Job => Predicate::In(Field::Id, self.jobs.clone()),
            EntityKind::Note
            | EntityKind::Task
            | EntityKind::Record
            | EntityKind::Term
            | EntityKind::Definition => Predicate::In(Field::JobId, self.jobs.clone()),
            EntityKind::Plan => Predicate::Never,
        }
    }
}

pub struct Results<'a> {
    components: &'a BTreeSet<Component>,
    store: &'a dyn ObjectStore,
}

impl<'a> Results<'a> {
    pub fn new(components: &'a BTreeSet<Component>, store: &'a dyn ObjectStore) -> Self {
        Self { components, store }
    }

    /// Runs the components against the live entities of the store. Kinds come back in a fixed
    /// order, each sorted by label.
    pub fn find(&self) -> AppResult<Vec<SearchResult>> {
        if self.components.is_empty() {
            return Ok(Vec::new());
        }

        let mut kinds = BTreeSet::new();
        // Archived entities never show up in Find.
        let mut base = vec![Predicate::Equals(Field::Alive, true.to_string())];
        let mut scopes = Vec::new();

        for component in self.components {
            match component {
                Component::Text { value } => base.push(Predicate::Contains(Field::Text, value.clone())),
                Component::Exclude { value } => base.push(Predicate::Not(Box::new(Predicate::Contains(
                    Field::Text,
                    value.clone(),
                )))),
                Component::On { date } => base.push(Predicate::Equals(Field::Day, date.to_string())),
                Component::Kind { kind } => {
                    kinds.insert(*kind);
                }
                Component::Scoped { scope, value } => scopes.push(self.resolve_scope(*scope, value)?),
            }
        }

        let kinds: Vec<EntityKind> = if kinds.is_empty() {
            SEARCHABLE.to_vec()
        } else {
            kinds.into_iter().collect()
        };

        let mut results = Vec::new();
        for kind in kinds {
            let mut parts = base.clone();
            parts.extend(scopes.iter().map(|scope| scope.predicate_for(kind)));
            let predicate = Predicate::And(parts);
            let found = self.store.fetch(kind, &predicate, SortOrder::ByLabel)?;
            results.extend(found.into_iter().map(|entity| SearchResult { entity }));
        }

        tracing::debug!(components = self.components.len(), results = results.len(), "search executed");
        Ok(results)
    }

    fn resolve_scope(&self, scope: Scope, value: &str) -> AppResult<ScopeIds> {
        let named = Predicate::Contains(Field::Label, value.to_string());
        let ids = match scope {
            Scope::Company => {
                let companies = self.store.ids(EntityKind::Company, &named)?;
                let projects = self
                    .store
                    .ids(EntityKind::Project, &Predicate::In(Field::CompanyId, companies.clone()))?;
                let jobs = self
                    .store
                    .ids(EntityKind::Job, &Predicate::In(Field::ProjectId, projects.clone()))?;
                ScopeIds {
                    companies: Some(companies),
                    projects: Some(projects),
                    jobs,
                }
            }
            Scope::Project => {
                let projects = self.store.ids(EntityKind::Project, &named)?;
                let jobs = self
                    .store
                    .ids(EntityKind::Job, &Predicate::In(Field::ProjectId, projects.clone()))?;
                ScopeIds {
                    companies: None,
                    projects: Some(projects),
                    jobs,
                }
            }
            Scope::Job => ScopeIds {
                companies: None,
                projects: None,
                jobs: self.store.ids(EntityKind::Job, &named)?,
            },
        };
        Ok(ids)
    }
}
