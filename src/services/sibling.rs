//! Previous/next page lookup service.
//!
//! Strategies are tried in order and the first one yielding candidates wins:
//!
//! 1. site presets
//! 2. declared `prev`/`next` relation links
//! 3. heuristic search over the hyperlinks of the page
//! 4. guessing by incrementing or decrementing a number in the URL

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Document, Node};
use crate::error::Result;
use crate::models::{
    Config, Direction, LimitsConfig, NumberingEntry, ScanType, ScoredEntry, SiblingEntry,
    SiblingResult,
};
use crate::services::classifier::LinkClassifier;
use crate::services::preset::{PresetNavi, PresetOutcome};
use crate::services::scorer::NaviLinkScorer;
use crate::utils::{BaseDomainResolver, StripMode, UriView, leaf, normalize_whitespace};

/// `?page=12`, `&p=3` or a bare `?12`; the number must end the parameter.
static QUERY_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([?&](?:[a-z_-]{1,20}=)?)(\d{1,12})").expect("valid numbering pattern")
});

/// `/abc12`, `/abc12.html` or `/12/` right before the end of the path.
static PATH_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(/[a-z0-9_-]{0,20}?)(\d{1,12})(\.[0-9A-Za-z_]+|/)?(?:$|\?)")
        .expect("valid numbering pattern")
});

/// Sources of candidate anchor text, tried in order.
const TEXT_SOURCES: &[fn(&Node) -> Option<String>] =
    &[anchor_text, title_attr, image_alt, image_title, image_leaf];

fn anchor_text(node: &Node) -> Option<String> {
    Some(node.text.clone())
}

fn title_attr(node: &Node) -> Option<String> {
    node.attr("title").map(str::to_string)
}

fn image_alt(node: &Node) -> Option<String> {
    node.image.as_ref()?.alt.clone()
}

fn image_title(node: &Node) -> Option<String> {
    node.image.as_ref()?.title.clone()
}

fn image_leaf(node: &Node) -> Option<String> {
    let src = node.image.as_ref()?.src.as_deref()?;
    Some(leaf(src).to_string())
}

/// A number found in the URL and where it sits.
struct NumberMatch {
    start: usize,
    end: usize,
    leading: String,
    digits: String,
    trailing: String,
}

/// Results of the current page, per direction.
struct PageMemo {
    key: String,
    results: HashMap<Direction, Option<SiblingResult>>,
}

/// Service finding the previous and next pages of a document.
pub struct SiblingNavi {
    classifier: LinkClassifier,
    presets: PresetNavi,
    scorer: NaviLinkScorer,
    limits: LimitsConfig,
    resolver: BaseDomainResolver,
    memo: Option<PageMemo>,
}

impl SiblingNavi {
    /// Create the service from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            classifier: LinkClassifier::new(config),
            presets: PresetNavi::new(&config.presets)?,
            scorer: NaviLinkScorer::new(config.scoring.clone()),
            limits: config.limits.clone(),
            resolver: BaseDomainResolver::new(config.base_domain.overrides.clone()),
            memo: None,
        })
    }

    /// Use another link classifier for the declared relation lookup.
    pub fn with_classifier(mut self, classifier: LinkClassifier) -> Self {
        self.classifier = classifier;
        self.memo = None;
        self
    }

    /// The link classifier shared with the declared relation lookup.
    pub fn classifier(&mut self) -> &mut LinkClassifier {
        &mut self.classifier
    }

    /// URL of the previous page.
    pub fn get_prev(&mut self, doc: &dyn Document) -> Option<String> {
        self.url_for(doc, Direction::Prev)
    }

    /// URL of the next page.
    pub fn get_next(&mut self, doc: &dyn Document) -> Option<String> {
        self.url_for(doc, Direction::Next)
    }

    fn url_for(&mut self, doc: &dyn Document, direction: Direction) -> Option<String> {
        self.get_result(doc, direction)
            .and_then(|result| result.first_url().map(str::to_string))
    }

    /// Candidates in `direction` and the strategy that found them. Computed
    /// once per page and direction.
    pub fn get_result(&mut self, doc: &dyn Document, direction: Direction) -> Option<SiblingResult> {
        let key = UriView::parse(doc.url(), StripMode::StripFragment, &self.resolver)
            .map_or_else(|| doc.url().to_string(), |uri| uri.spec);

        if let Some(memo) = &self.memo {
            if memo.key == key {
                if let Some(result) = memo.results.get(&direction) {
                    return result.clone();
                }
            }
        }

        let result = self.scan(doc, direction);

        let memo = match self.memo.take() {
            Some(memo) if memo.key == key => memo,
            _ => PageMemo {
                key,
                results: HashMap::new(),
            },
        };
        let memo = self.memo.insert(memo);
        memo.results.insert(direction, result.clone());

        result
    }

    fn scan(&mut self, doc: &dyn Document, direction: Direction) -> Option<SiblingResult> {
        match self.presets.get_data(doc, direction) {
            PresetOutcome::Found(entry) => {
                return Some(SiblingResult {
                    list: vec![SiblingEntry::Preset(entry)],
                    scan_type: ScanType::Preset,
                });
            }
            PresetOutcome::NotFound { name } => {
                log::debug!("Preset '{}' gave nothing, trying other strategies", name);
            }
            PresetOutcome::NoMatch => {}
        }

        if let Some(entry) = self.classifier.get_data(doc, direction.as_str()) {
            return Some(SiblingResult {
                list: vec![SiblingEntry::Official(entry)],
                scan_type: ScanType::Official,
            });
        }

        let searched = self.guess_by_searching(doc, direction);
        if !searched.is_empty() {
            return Some(SiblingResult {
                list: searched.into_iter().map(SiblingEntry::Searching).collect(),
                scan_type: ScanType::Searching,
            });
        }

        let numbered = self.guess_by_numbering(doc.url(), direction);
        if !numbered.is_empty() {
            return Some(SiblingResult {
                list: numbered.into_iter().map(SiblingEntry::Numbering).collect(),
                scan_type: ScanType::Numbering,
            });
        }

        log::debug!("No {} page found for {}", direction, doc.url());
        None
    }

    /// Score the hyperlinks of the page and keep the best candidates.
    pub fn guess_by_searching(&mut self, doc: &dyn Document, direction: Direction) -> Vec<ScoredEntry> {
        let Some(uri) = UriView::parse(doc.url(), StripMode::StripFragment, &self.resolver) else {
            return Vec::new();
        };

        let links = doc.hyperlinks();
        let max_links = self.limits.max_scanning_links;
        let scanned: Vec<&Node> = if links.len() > max_links {
            let half = max_links / 2;
            links[..half].iter().chain(&links[links.len() - half..]).collect()
        } else {
            links.iter().collect()
        };

        let mut entries: Vec<ScoredEntry> = Vec::new();

        for node in scanned {
            let Some(url) = node.href.as_deref() else {
                continue;
            };
            if entries.iter().any(|entry| entry.url == url) {
                continue;
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                continue;
            }
            if uri.is_same_page(url) || !uri.is_same_base_domain(url) {
                continue;
            }

            for source in TEXT_SOURCES {
                let Some(text) = source(node).map(|text| normalize_whitespace(&text)) else {
                    continue;
                };
                if text.is_empty() {
                    continue;
                }

                let score = self.scorer.score(&uri, direction, &text, url);
                if score > 0.0 {
                    entries.push(ScoredEntry {
                        title: text,
                        url: url.to_string(),
                        score,
                    });
                    break;
                }
            }

            if entries.len() >= self.limits.max_scored_entries {
                break;
            }
        }

        entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        entries.truncate(self.limits.max_siblings);
        entries
    }

    /// Guess siblings by shifting the page numbers found in `url`.
    pub fn guess_by_numbering(&self, url: &str, direction: Direction) -> Vec<NumberingEntry> {
        let Some(uri) = UriView::parse(url, StripMode::StripFragment, &self.resolver) else {
            return Vec::new();
        };
        if !uri.has_path() {
            return Vec::new();
        }

        let spec = uri.spec.as_str();
        let mut entries = Vec::new();

        for found in query_numbers(spec).into_iter().chain(path_numbers(spec)) {
            let Ok(old) = found.digits.parse::<i64>() else {
                continue;
            };
            let new = old + direction.step();
            if new <= 0 {
                continue;
            }

            let there = format!(
                "{}{:0width$}{}",
                found.leading,
                new,
                found.trailing,
                width = found.digits.len()
            );
            entries.push(NumberingEntry {
                here: spec[found.start..found.end].to_string(),
                url: format!("{}{}{}", &spec[..found.start], there, &spec[found.end..]),
                there,
            });
        }

        entries.truncate(self.limits.max_siblings);
        entries
    }
}

fn query_numbers(spec: &str) -> Vec<NumberMatch> {
    let mut found = Vec::new();
    let mut at = 0;

    while let Some(caps) = QUERY_NUMBER.captures_at(spec, at) {
        let (Some(whole), Some(leading), Some(digits)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            break;
        };

        let ends_param = spec[digits.end()..].chars().next().is_none_or(|c| c == '&');
        if !ends_param {
            at = whole.start() + 1;
            continue;
        }

        found.push(NumberMatch {
            start: whole.start(),
            end: digits.end(),
            leading: leading.as_str().to_string(),
            digits: digits.as_str().to_string(),
            trailing: String::new(),
        });
        at = digits.end();
    }

    found
}

fn path_numbers(spec: &str) -> Vec<NumberMatch> {
    PATH_NUMBER
        .captures_iter(spec)
        .filter_map(|caps| {
            let leading = caps.get(1)?;
            let digits = caps.get(2)?;
            let trailing = caps.get(3);
            Some(NumberMatch {
                start: leading.start(),
                end: trailing.map_or(digits.end(), |t| t.end()),
                leading: leading.as_str().to_string(),
                digits: digits.as_str().to_string(),
                trailing: trailing.map_or_else(String::new, |t| t.as_str().to_string()),
            })
        })
        .collect()
}
