use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_CLI_HISTORY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Success,
    Error,
    Warning,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppType {
    #[default]
    Log,
    Query,
    Set,
    Plan,
    Task,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryLine {
    pub id: Uuid,
    pub time: DateTime<Utc>,
    pub command: String,
    pub status: Status,
    pub message: String,
    pub app_type: AppType,
    pub job: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub status: Status,
    pub message: String,
}

impl CommandOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: Status::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }

    pub fn standard(message: impl Into<String>) -> Self {
        Self {
            status: Status::Standard,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub domain: String,
    pub method: String,
    pub value: String,
}

/// Splits `@domain.method=value` on the first `.` and the first `=` after it.
/// The value keeps any further `.` or `=` characters.
pub fn parse_command(raw: &str) -> Option<ParsedCommand> {
    let body = raw.strip_prefix('@')?;
    let (domain, rest) = body.split_once('.')?;
    let (method, value) = rest.split_once('=')?;
    Some(ParsedCommand {
        domain: domain.to_string(),
        method: method.to_string(),
        value: value.to_string(),
    })
}

type Handler = Box<dyn FnMut(&str) -> CommandOutcome + Send>;

#[derive(Default)]
pub struct CommandRouter {
    handlers: BTreeMap<(String, String), Handler>,
    fallback: Option<Handler>,
}

impl fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRouter")
            .field("commands", &self.handlers.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, domain: &str, method: &str, handler: F)
    where
        F: FnMut(&str) -> CommandOutcome + Send + 'static,
    {
        self.handlers
            .insert((domain.to_string(), method.to_string()), Box::new(handler));
    }

    /// Handler for input that does not start with `@`.
    pub fn set_fallback<F>(&mut self, handler: F)
    where
        F: FnMut(&str) -> CommandOutcome + Send + 'static,
    {
        self.fallback = Some(Box::new(handler));
    }

    /// Routes the trimmed command. Parse failures echo `raw` exactly as typed.
    fn dispatch(&mut self, raw: &str) -> CommandOutcome {
        let command = raw.trim();
        if !command.starts_with('@') {
            return match self.fallback.as_mut() {
                Some(handler) => handler(command),
                None => CommandOutcome::standard(command),
            };
        }

        let Some(parsed) = parse_command(command) else {
            return CommandOutcome::error(format!("Unable to parse command {}", raw));
        };

        match self
            .handlers
            .get_mut(&(parsed.domain.clone(), parsed.method.clone()))
        {
            Some(handler) => handler(&parsed.value),
            None => CommandOutcome::error(format!("Invalid command: @{}.{}", parsed.domain, parsed.method)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandLineSession {
    pub app_type: AppType,
    history: Vec<HistoryLine>,
    max_history: usize,
}

impl Default for CommandLineSession {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CLI_HISTORY)
    }
}

impl CommandLineSession {
    pub fn with_capacity(max_history: usize) -> Self {
        Self {
            app_type: AppType::default(),
            history: Vec::new(),
            max_history: max_history.max(1),
        }
    }

    pub fn execute(&mut self, raw: &str, router: &mut CommandRouter, job: Option<&str>) -> &HistoryLine {
        let outcome = router.dispatch(raw);
        let command = raw.trim();
        match outcome.status {
            Status::Error => tracing::warn!(command = %command, message = %outcome.message, "command failed"),
            _ => tracing::debug!(command = %command, status = ?outcome.status, "command handled"),
        }

        self.append(HistoryLine {
            id: Uuid::new_v4(),
            time: Utc::now(),
            command: command.to_string(),
            status: outcome.status,
            message: outcome.message,
            app_type: self.app_type,
            job: job.map(ToString::to_string),
        })
    }

    fn append(&mut self, line: HistoryLine) -> &HistoryLine {
        self.history.push(line);
        if self.history.len() > self.max_history {
            let excess = self.history.len() - self.max_history;
            self.history.drain(..excess);
        }
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[HistoryLine] {
        &self.history
    }

    /// Deep copy of the history for filtering without touching the session.
    pub fn snapshot(&self) -> Vec<HistoryLine> {
        self.history.clone()
    }

    pub fn filter(&self, query: &str) -> Vec<HistoryLine> {
        let query = query.to_lowercase();
        self.snapshot()
            .into_iter()
            .filter(|line| {
                line.command.to_lowercase().contains(&query) || line.message.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
