use crate::errors::AppResult;
use crate::inspector::Inspectable;
use crate::search_language::{Component, Parser, Results, SearchResult};
use crate::store::ObjectStore;
use std::collections::{BTreeSet, VecDeque};

pub const DEFAULT_SEARCH_HISTORY: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    pub text: Option<String>,
    pub components: BTreeSet<Component>,
    pub has_results: bool,
    pub inspecting: Option<Inspectable>,
    history: VecDeque<String>,
    history_capacity: usize,
}

impl Default for Search {
    fn default() -> Self {
        Self::with_history_capacity(DEFAULT_SEARCH_HISTORY)
    }
}

impl Search {
    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            text: None,
            components: BTreeSet::new(),
            has_results: false,
            inspecting: None,
            history: VecDeque::new(),
            history_capacity: history_capacity.max(1),
        }
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    /// Parses the current text (when there is any), runs the query and remembers
    /// the text once it produced results.
    pub fn results(&mut self, store: &dyn ObjectStore) -> AppResult<Vec<SearchResult>> {
        let text = self.text.clone().unwrap_or_default();
        if !text.trim().is_empty() {
            self.components = Parser::new(&text).parse();
        }

        let found = Results::new(&self.components, store).find()?;
        self.has_results = !found.is_empty();
        if self.has_results {
            self.add_to_history(&text);
        }
        Ok(found)
    }

    pub fn add_to_history(&mut self, label: &str) {
        let label = label.trim();
        if label.is_empty() || self.history.iter().any(|entry| entry == label) {
            return;
        }
        if self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(label.to_string());
    }

    pub fn remove_from_history(&mut self, label: &str) -> bool {
        let before = self.history.len();
        self.history.retain(|entry| entry != label.trim());
        self.history.len() != before
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Abandons the search entirely.
    pub fn reset(&mut self) {
        self.components.clear();
        self.text = None;
        self.has_results = false;
        self.inspecting = None;
    }

    /// Closes the detail panel but keeps the result set.
    pub fn cancel(&mut self) {
        self.inspecting = None;
        self.text = None;
    }

    pub fn inspect(&mut self, item: impl Into<Inspectable>) {
        self.inspecting = Some(item.into());
    }
}

#[cfg(test)]
mod tests {
    use super::Search;
    use crate::inspector::Inspectable;
    use crate::models::{Entity, Job, Project};
    use crate::search_language::Component;
    use crate::store::{MemoryStore, ObjectStore};

    fn searching() -> Search {
        let mut search = Search::default();
        search.components.insert(Component::text("a"));
        search.text = Some("x".to_string());
        search.has_results = true;
        search.inspect(Entity::Job(Job::new("widget", None)));
        search
    }

    #[test]
    fn history_is_a_bounded_fifo() {
        let mut search = Search::default();
        for index in 0..25 {
            search.add_to_history(&format!("query {}", index));
        }
        assert_eq!(search.history_len(), 20);
        let history: Vec<&str> = search.history().collect();
        assert_eq!(history.first(), Some(&"query 5"));
        assert_eq!(history.last(), Some(&"query 24"));
        assert!(!history.contains(&"query 0"));
    }

    #[test]
    fn history_ignores_blank_and_duplicate_labels() {
        let mut search = Search::default();
        search.add_to_history("");
        search.add_to_history("   ");
        search.add_to_history("acme");
        search.add_to_history("acme");
        assert_eq!(search.history_len(), 1);
        assert!(search.remove_from_history("acme"));
        assert!(!search.remove_from_history("acme"));
        search.add_to_history("again");
        search.clear_history();
        assert_eq!(search.history_len(), 0);
    }

    #[test]
    fn cancel_keeps_components() {
        let mut search = searching();
        search.cancel();
        assert_eq!(search.components.len(), 1);
        assert!(search.components.contains(&Component::text("a")));
        assert!(search.has_results);
        assert!(search.text.is_none());
        assert!(search.inspecting.is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut search = searching();
        search.reset();
        assert!(search.components.is_empty());
        assert!(search.text.is_none());
        assert!(!search.has_results);
        assert!(search.inspecting.is_none());
    }

    #[test]
    fn results_track_has_results_and_history() {
        let mut store = MemoryStore::new();
        let project = Project::new("Acme", None);
        store.put(Entity::Project(project.clone())).expect("put project");
        store
            .put(Entity::Job(Job::new("widget fix", Some(&project.id))))
            .expect("put job");

        let mut search = Search::default();
        search.set_text("nothing-matches");
        assert!(search.results(&store).expect("results").is_empty());
        assert!(!search.has_results);
        assert_eq!(search.history_len(), 0);

        search.set_text("widget");
        let found = search.results(&store).expect("results");
        assert_eq!(found.len(), 1);
        assert!(search.has_results);
        assert_eq!(search.history().collect::<Vec<_>>(), vec!["widget"]);
    }

    #[test]
    fn inspecting_accepts_entities() {
        let mut search = Search::default();
        search.inspect(Entity::Project(Project::new("Acme", None)));
        assert!(matches!(search.inspecting, Some(Inspectable::Project(_))));
    }
}
