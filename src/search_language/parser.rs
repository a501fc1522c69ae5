use crate::models::EntityKind;
use crate::search_language::{Component, Scope};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<key>[A-Za-z]+):(?:"(?P<quoted>[^"]*)"|(?P<value>\S+))|"(?P<phrase>[^"]*)"|(?P<word>\S+)"#)
        .expect("valid search token regex")
});

pub struct Parser<'a> {
    text: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn parse(&self) -> BTreeSet<Component> {
        let mut components = BTreeSet::new();

        for caps in TOKEN_RE.captures_iter(self.text) {
            let raw = caps.get(0).map(|m| m.as_str()).unwrap_or_default();

            if let Some(key) = caps.name("key") {
                let value = caps
                    .name("quoted")
                    .or_else(|| caps.name("value"))
                    .map(|m| m.as_str().trim().trim_matches('"'))
                    .unwrap_or_default();
                if let Some(component) = keyed_component(key.as_str(), value, raw) {
                    components.insert(component);
                }
                continue;
            }

            if let Some(phrase) = caps.name("phrase") {
                let phrase = phrase.as_str().trim();
                if !phrase.is_empty() {
                    components.insert(Component::text(phrase));
                }
                continue;
            }

            if let Some(word) = caps.name("word") {
                if let Some(component) = word_component(word.as_str()) {
                    components.insert(component);
                }
            }
        }

        components
    }
}

fn keyed_component(key: &str, value: &str, raw: &str) -> Option<Component> {
    if let Some(scope) = Scope::parse(key) {
        if value.is_empty() {
            return None;
        }
        return Some(Component::scoped(scope, value));
    }

    match key.to_ascii_lowercase().as_str() {
        "type" | "kind" | "is" => match EntityKind::parse(value) {
            Some(kind) => Some(Component::Kind { kind }),
            None => word_component(raw),
        },
        "on" | "date" => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => Some(Component::On { date }),
            Err(_) => word_component(raw),
        },
        _ => word_component(raw),
    }
}

fn word_component(word: &str) -> Option<Component> {
    let word = word.trim_matches('"');
    if let Some(excluded) = word.strip_prefix('-') {
        let excluded = excluded.trim_matches('"');
        if excluded.is_empty() {
            return None;
        }
        return Some(Component::Exclude {
            value: excluded.to_string(),
        });
    }
    if word.is_empty() {
        return None;
    }
    Some(Component::text(word))
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::models::EntityKind;
    use crate::search_language::{Component, Scope};
    use chrono::NaiveDate;

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(Parser::new("").parse().is_empty());
        assert!(Parser::new("   \t ").parse().is_empty());
        assert!(Parser::new("\"\" -").parse().is_empty());
    }

    #[test]
    fn scoped_filter_and_free_text() {
        let components = Parser::new("project:Acme widget").parse();
        assert!(components.contains(&Component::scoped(Scope::Project, "Acme")));
        assert!(components.contains(&Component::text("widget")));
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn quoted_values_keep_spaces() {
        let components = Parser::new(r#"company:"Acme Corp" "release notes""#).parse();
        assert!(components.contains(&Component::scoped(Scope::Company, "Acme Corp")));
        assert!(components.contains(&Component::text("release notes")));
    }

    #[test]
    fn unterminated_quote_is_dropped_from_scoped_value() {
        let components = Parser::new(r#"project:"Acme widget"#).parse();
        assert!(components.contains(&Component::scoped(Scope::Project, "Acme")));
        assert!(components.contains(&Component::text("widget")));
        assert!(Parser::new(r#"job:""#).parse().is_empty());
    }

    #[test]
    fn kinds_dates_and_exclusions() {
        let components = Parser::new("type:notes on:2024-02-29 -draft").parse();
        assert!(components.contains(&Component::Kind { kind: EntityKind::Note }));
        assert!(components.contains(&Component::On {
            date: NaiveDate::from_ymd_opt(2024, 2, 29).expect("date"),
        }));
        assert!(components.contains(&Component::Exclude {
            value: "draft".to_string()
        }));
    }

    #[test]
    fn unknown_keys_and_bad_values_become_text() {
        let components = Parser::new("https://example.com type:widget on:tomorrow").parse();
        assert!(components.contains(&Component::text("https://example.com")));
        assert!(components.contains(&Component::text("type:widget")));
        assert!(components.contains(&Component::text("on:tomorrow")));
    }

    #[test]
    fn parsing_is_deterministic() {
        let input = "job:\"widget fix\" alpha beta alpha";
        assert_eq!(Parser::new(input).parse(), Parser::new(input).parse());
        assert_eq!(Parser::new(input).parse().len(), 3);
    }
}
