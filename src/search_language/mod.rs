pub mod parser;
pub mod results;

pub use parser::Parser;
pub use results::{Results, SearchResult};

use crate::models::EntityKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Company,
    Project,
    Job,
}

impl Scope {
    pub fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "company" | "client" => Some(Self::Company),
            "project" => Some(Self::Project),
            "job" => Some(Self::Job),
            _ => None,
        }
    }
}

/// A single predicate produced from search input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    Text { value: String },
    Exclude { value: String },
    Scoped { scope: Scope, value: String },
    Kind { kind: EntityKind },
    On { date: NaiveDate },
}

impl Component {
    pub fn text(value: &str) -> Self {
        Self::Text {
            value: value.to_string(),
        }
    }

    pub fn scoped(scope: Scope, value: &str) -> Self {
        Self::Scoped {
            scope,
            value: value.to_string(),
        }
    }
}
