use crate::errors::AppResult;
use crate::models::{Entity, EntityKind, EntityRef, Field, Job, Note, Plan, Task};
use crate::store::{ObjectStore, Predicate, SortOrder};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Working set of ids staged for one day's plan. Ids are non-owning references into the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanningState {
    pub jobs: BTreeSet<String>,
    pub tasks: BTreeSet<String>,
    pub notes: BTreeSet<String>,
    pub projects: BTreeSet<String>,
    pub companies: BTreeSet<String>,
}

impl PlanningState {
    pub fn load(&mut self, plan: &Plan) {
        self.jobs = plan.jobs.clone();
        self.tasks = plan.tasks.clone();
        self.notes = plan.notes.clone();
        self.projects = plan.projects.clone();
        self.companies = plan.companies.clone();
    }

    /// Writes the working set to the plan for `date`, creating that plan if the day has none.
    ///
    /// Lookup-then-branch: two concurrent calls for the same day can both take the create path.
    pub fn finalize(&self, date: NaiveDate, store: &mut dyn ObjectStore) -> AppResult<Plan> {
        let plan = match find_plan(date, store)? {
            Some(mut plan) => {
                tracing::info!(plan = %plan.id, %date, "updating plan");
                self.write_into(&mut plan);
                plan
            }
            None => {
                let mut plan = Plan::new(date);
                tracing::info!(plan = %plan.id, %date, "creating plan");
                self.write_into(&mut plan);
                plan
            }
        };

        store.put(Entity::Plan(plan.clone()))?;
        store.save()?;
        Ok(plan)
    }

    /// Empties the stored plan for `date`, or the working set when that day has no plan.
    pub fn empty(&mut self, date: NaiveDate, store: &mut dyn ObjectStore) -> AppResult<()> {
        match find_plan(date, store)? {
            Some(mut plan) => {
                PlanningState::default().write_into(&mut plan);
                store.put(Entity::Plan(plan))?;
            }
            None => self.clear(),
        }
        store.save()
    }

    /// Deletes every stored plan and the working set.
    pub fn clean(&mut self, store: &mut dyn ObjectStore) -> AppResult<usize> {
        let plans = store.ids(EntityKind::Plan, &Predicate::All)?;
        let mut deleted = 0;
        for id in plans {
            if store.delete(&EntityRef::new(EntityKind::Plan, id))? {
                deleted += 1;
            }
        }
        self.clear();
        store.save()?;
        tracing::info!(deleted, "removed all plans");
        Ok(deleted)
    }

    pub fn reset(&mut self, date: NaiveDate, store: &mut dyn ObjectStore) -> AppResult<bool> {
        let Some(plan) = find_plan(date, store)? else {
            return Ok(false);
        };
        let removed = store.delete(&EntityRef::new(EntityKind::Plan, plan.id))?;
        store.save()?;
        Ok(removed)
    }

    /// Sum of the tasks owned by each staged job. The staged `tasks` set is not consulted.
    pub fn task_count(&self, store: &dyn ObjectStore) -> AppResult<usize> {
        let mut count = 0;
        for job in &self.jobs {
            count += store
                .ids(EntityKind::Task, &Predicate::Equals(Field::JobId, job.clone()))?
                .len();
        }
        Ok(count)
    }

    /// Stages `job` with its project and company.
    pub fn add_job(&mut self, job: &Job, store: &dyn ObjectStore) -> AppResult<()> {
        self.jobs.insert(job.id.clone());
        let Some(project_id) = &job.project_id else {
            return Ok(());
        };
        self.projects.insert(project_id.clone());

        if let Some(Entity::Project(project)) = store.get(&EntityRef::new(EntityKind::Project, project_id))? {
            if let Some(company_id) = project.company_id {
                self.companies.insert(company_id);
            }
        }
        Ok(())
    }

    pub fn add_task(&mut self, task: &Task, store: &dyn ObjectStore) -> AppResult<()> {
        self.tasks.insert(task.id.clone());
        self.add_owner(task.job_id.as_deref(), store)
    }

    pub fn add_note(&mut self, note: &Note, store: &dyn ObjectStore) -> AppResult<()> {
        self.notes.insert(note.id.clone());
        self.add_owner(note.job_id.as_deref(), store)
    }

    /// Unstages a job together with the tasks and notes it owns.
    pub fn remove_job(&mut self, job_id: &str, store: &dyn ObjectStore) -> AppResult<bool> {
        if !self.jobs.remove(job_id) {
            return Ok(false);
        }
        let owned = Predicate::Equals(Field::JobId, job_id.to_string());
        for task in store.ids(EntityKind::Task, &owned)? {
            self.tasks.remove(&task);
        }
        for note in store.ids(EntityKind::Note, &owned)? {
            self.notes.remove(&note);
        }
        Ok(true)
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
            && self.tasks.is_empty()
            && self.notes.is_empty()
            && self.projects.is_empty()
            && self.companies.is_empty()
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
        self.tasks.clear();
        self.notes.clear();
        self.projects.clear();
        self.companies.clear();
    }

    fn add_owner(&mut self, job_id: Option<&str>, store: &dyn ObjectStore) -> AppResult<()> {
        let Some(job_id) = job_id else {
            return Ok(());
        };
        match store.get(&EntityRef::new(EntityKind::Job, job_id))? {
            Some(Entity::Job(job)) => self.add_job(&job, store),
            _ => {
                self.jobs.insert(job_id.to_string());
                Ok(())
            }
        }
    }

    fn write_into(&self, plan: &mut Plan) {
        plan.jobs = self.jobs.clone();
        plan.tasks = self.tasks.clone();
        plan.notes = self.notes.clone();
        plan.projects = self.projects.clone();
        plan.companies = self.companies.clone();
    }
}

fn find_plan(date: NaiveDate, store: &dyn ObjectStore) -> AppResult<Option<Plan>> {
    let found = store.fetch(
        EntityKind::Plan,
        &Predicate::Equals(Field::Day, date.to_string()),
        SortOrder::NewestFirst,
    )?;
    Ok(found.into_iter().find_map(|entity| match entity {
        Entity::Plan(plan) => Some(plan),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::PlanningState;
    use crate::models::{Company, Entity, EntityKind, Job, Note, Project, Task};
    use crate::store::{MemoryStore, ObjectStore, Predicate};
    use chrono::NaiveDate;

    struct Fixture {
        store: MemoryStore,
        company: Company,
        project: Project,
        job: Job,
        tasks: Vec<Task>,
        note: Note,
    }

    fn fixture() -> Fixture {
        let mut store = MemoryStore::new();
        let company = Company::new("Globex");
        let project = Project::new("Acme", Some(&company.id));
        let job = Job::new("widget fix", Some(&project.id));
        let tasks = vec![
            Task::new("cut the widget", Some(&job.id)),
            Task::new("ship the widget", Some(&job.id)),
        ];
        let note = Note::new("widget notes", "body", Some(&job.id));

        store.put(Entity::Company(company.clone())).expect("put company");
        store.put(Entity::Project(project.clone())).expect("put project");
        store.put(Entity::Job(job.clone())).expect("put job");
        for task in &tasks {
            store.put(Entity::Task(task.clone())).expect("put task");
        }
        store.put(Entity::Note(note.clone())).expect("put note");
        store.save().expect("save fixture");

        Fixture {
            store,
            company,
            project,
            job,
            tasks,
            note,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).expect("valid date")
    }

    fn plan_count(store: &MemoryStore) -> usize {
        store
            .ids(EntityKind::Plan, &Predicate::All)
            .expect("plan ids")
            .len()
    }

    #[test]
    fn adding_items_stages_the_owner_chain() {
        let fixture = fixture();
        let mut planning = PlanningState::default();
        planning
            .add_task(&fixture.tasks[0], &fixture.store)
            .expect("add task");
        planning.add_note(&fixture.note, &fixture.store).expect("add note");

        assert!(planning.jobs.contains(&fixture.job.id));
        assert!(planning.projects.contains(&fixture.project.id));
        assert!(planning.companies.contains(&fixture.company.id));
        assert_eq!(planning.tasks.len(), 1);
        assert_eq!(planning.notes.len(), 1);

        assert!(planning.remove_job(&fixture.job.id, &fixture.store).expect("remove"));
        assert!(planning.tasks.is_empty());
        assert!(planning.notes.is_empty());
        assert!(!planning.remove_job(&fixture.job.id, &fixture.store).expect("remove again"));
    }

    #[test]
    fn finalize_twice_keeps_one_plan_per_day() {
        let mut fixture = fixture();
        let mut planning = PlanningState::default();
        planning.add_job(&fixture.job, &fixture.store).expect("add job");

        let first = planning.finalize(day(), &mut fixture.store).expect("first finalize");
        let second = planning.finalize(day(), &mut fixture.store).expect("second finalize");

        assert_eq!(first.id, second.id);
        assert_eq!(plan_count(&fixture.store), 1);
        assert_eq!(second.jobs, planning.jobs);
    }

    #[test]
    fn load_hydrates_from_a_plan() {
        let mut fixture = fixture();
        let mut planning = PlanningState::default();
        planning.add_job(&fixture.job, &fixture.store).expect("add job");
        let plan = planning.finalize(day(), &mut fixture.store).expect("finalize");

        let mut loaded = PlanningState::default();
        loaded.load(&plan);
        loaded.load(&plan);
        assert_eq!(loaded, planning);
    }

    #[test]
    fn empty_clears_stored_plan_or_working_set() {
        let mut fixture = fixture();
        let mut planning = PlanningState::default();
        planning.add_job(&fixture.job, &fixture.store).expect("add job");

        planning.empty(day(), &mut fixture.store).expect("empty without plan");
        assert!(planning.is_empty());

        planning.add_job(&fixture.job, &fixture.store).expect("add job");
        let plan = planning.finalize(day(), &mut fixture.store).expect("finalize");
        planning.empty(day(), &mut fixture.store).expect("empty with plan");

        let stored = fixture
            .store
            .get(&crate::models::EntityRef::new(EntityKind::Plan, &plan.id))
            .expect("get plan");
        match stored {
            Some(Entity::Plan(stored)) => assert!(stored.jobs.is_empty()),
            other => panic!("expected plan, got {:?}", other),
        }
        assert_eq!(plan_count(&fixture.store), 1);
    }

    #[test]
    fn reset_and_clean_delete_plans() {
        let mut fixture = fixture();
        let mut planning = PlanningState::default();
        planning.add_job(&fixture.job, &fixture.store).expect("add job");
        let other_day = day().succ_opt().expect("next day");

        planning.finalize(day(), &mut fixture.store).expect("finalize");
        planning.finalize(other_day, &mut fixture.store).expect("finalize other");
        assert_eq!(plan_count(&fixture.store), 2);

        assert!(planning.reset(day(), &mut fixture.store).expect("reset"));
        assert!(!planning.reset(day(), &mut fixture.store).expect("reset again"));
        assert_eq!(plan_count(&fixture.store), 1);
        assert!(!planning.is_empty());

        assert_eq!(planning.clean(&mut fixture.store).expect("clean"), 1);
        assert_eq!(plan_count(&fixture.store), 0);
        assert!(planning.is_empty());
    }

    #[test]
    fn task_count_follows_staged_jobs() {
        let fixture = fixture();
        let mut planning = PlanningState::default();
        planning
            .add_task(&fixture.tasks[0], &fixture.store)
            .expect("add task");

        // One task staged, but the job owns two.
        assert_eq!(planning.tasks.len(), 1);
        assert_eq!(planning.task_count(&fixture.store).expect("count"), 2);

        planning.jobs.clear();
        assert_eq!(planning.task_count(&fixture.store).expect("count"), 0);
    }
}
