//! Site preset lookup service.
//!
//! Finds the previous/next element of well-known sites with hand-written
//! CSS selectors before any heuristic runs.

use regex::Regex;

use crate::document::{Document, Node};
use crate::error::{AppError, Result};
use crate::models::{Direction, PresetEntry, PresetRule, PresetTarget};
use crate::utils::normalize_whitespace;

/// A preset rule with its URL pattern compiled.
struct CompiledRule {
    rule: PresetRule,
    url: Regex,
}

/// Outcome of a preset lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetOutcome {
    /// No rule applies to the page
    NoMatch,

    /// The rule's element was found
    Found(PresetEntry),

    /// A rule applies but its element is missing or unusable
    NotFound { name: String },
}

/// Service resolving previous/next links through site presets.
pub struct PresetNavi {
    rules: Vec<CompiledRule>,
}

impl PresetNavi {
    /// Compile the URL patterns of the given rules.
    pub fn new(rules: &[PresetRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let url = Regex::new(&rule.url).map_err(|e| AppError::pattern(&rule.url, e))?;
                Ok(CompiledRule {
                    rule: rule.clone(),
                    url,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Number of loaded rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up the sibling in `direction` with the first rule matching the
    /// document URL.
    pub fn get_data(&self, doc: &dyn Document, direction: Direction) -> PresetOutcome {
        let url = doc.url();
        let Some(compiled) = self.rules.iter().find(|r| r.url.is_match(url)) else {
            return PresetOutcome::NoMatch;
        };
        let rule = &compiled.rule;

        let selector = match direction {
            Direction::Prev => &rule.prev,
            Direction::Next => &rule.next,
        };

        let node = match doc.select_first(selector) {
            Ok(node) => node,
            Err(e) => {
                log::warn!("Preset '{}' has a broken selector: {}", rule.name, e);
                None
            }
        };

        match node.and_then(|node| Self::entry(&rule.name, &node)) {
            Some(entry) => {
                log::debug!("Preset '{}' found {} link", rule.name, direction);
                PresetOutcome::Found(entry)
            }
            None => {
                log::debug!(
                    "Preset '{}' matched {} but found no {} element",
                    rule.name,
                    url,
                    direction
                );
                PresetOutcome::NotFound {
                    name: rule.name.clone(),
                }
            }
        }
    }

    fn entry(name: &str, node: &Node) -> Option<PresetEntry> {
        if let Some(href) = node.href.as_deref() {
            let title = Some(normalize_whitespace(node.attr("title").unwrap_or_default()))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| normalize_whitespace(&node.text));
            return Some(PresetEntry {
                name: name.to_string(),
                title,
                target: PresetTarget::Url(href.to_string()),
            });
        }

        if node.tag == "input" {
            let value = node.attr("value").map(normalize_whitespace).unwrap_or_default();
            if let Some(form_index) = node.form_index.filter(|_| !value.is_empty()) {
                return Some(PresetEntry {
                    name: name.to_string(),
                    title: value,
                    target: PresetTarget::Submit { form_index },
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HtmlDocument;
    use crate::models::Config;

    fn presets() -> PresetNavi {
        PresetNavi::new(&Config::default().presets).unwrap()
    }

    #[test]
    fn test_default_rules_compile() {
        assert_eq!(presets().len(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let rules = vec![PresetRule {
            name: "broken".to_string(),
            url: "(".to_string(),
            prev: "a".to_string(),
            next: "a".to_string(),
        }];
        assert!(matches!(
            PresetNavi::new(&rules),
            Err(AppError::Pattern { .. })
        ));
    }

    #[test]
    fn test_no_rule_matches() {
        let doc = HtmlDocument::parse("http://example.com/", "<a href='/x'>x</a>").unwrap();
        assert_eq!(presets().get_data(&doc, Direction::Next), PresetOutcome::NoMatch);
    }

    #[test]
    fn test_google_next_link() {
        let doc = HtmlDocument::parse(
            "https://www.google.com/search?q=rust",
            r#"<table id="nav"><tr>
                 <td><a href="/search?q=rust&start=0">Previous</a></td>
                 <td><b>2</b></td>
                 <td><a href="/search?q=rust&start=20" title=" Next   page ">Next</a></td>
               </tr></table>"#,
        )
        .unwrap();

        let PresetOutcome::Found(entry) = presets().get_data(&doc, Direction::Next) else {
            panic!("expected a preset entry");
        };
        assert_eq!(entry.name, "Google Search");
        assert_eq!(entry.title, "Next page");
        assert_eq!(
            entry.target,
            PresetTarget::Url("https://www.google.com/search?q=rust&start=20".to_string())
        );
    }

    #[test]
    fn test_duckduckgo_submit_button() {
        let doc = HtmlDocument::parse(
            "https://duckduckgo.com/html?q=rust",
            r#"<form action="/html"><input class="navbutton" type="submit" value="< Prev"></form>
               <form action="/html"><input class="navbutton" type="submit" value="Next Page >"></form>"#,
        )
        .unwrap();

        let PresetOutcome::Found(entry) = presets().get_data(&doc, Direction::Next) else {
            panic!("expected a preset entry");
        };
        assert_eq!(entry.title, "Next Page >");
        assert_eq!(entry.target, PresetTarget::Submit { form_index: 1 });
    }

    #[test]
    fn test_matching_rule_without_element() {
        let doc = HtmlDocument::parse("https://duckduckgo.com/lite?q=x", "<p>no results</p>").unwrap();
        assert_eq!(
            presets().get_data(&doc, Direction::Prev),
            PresetOutcome::NotFound {
                name: "DuckDuckGo Search".to_string()
            }
        );
    }
}
