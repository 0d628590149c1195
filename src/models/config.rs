//! Application configuration structures.

use std::fs;
use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scan and output caps
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Heuristic scoring weights
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Base domain exceptions
    #[serde(default)]
    pub base_domain: BaseDomainConfig,

    /// Site-specific previous/next rules
    #[serde(default = "defaults::presets")]
    pub presets: Vec<PresetRule>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if limits.max_items_per_type == 0 {
            return Err(AppError::validation("limits.max_items_per_type must be > 0"));
        }
        if limits.max_scanning_links < 2 {
            return Err(AppError::validation("limits.max_scanning_links must be >= 2"));
        }
        if limits.max_scored_entries == 0 {
            return Err(AppError::validation("limits.max_scored_entries must be > 0"));
        }
        if limits.max_siblings == 0 {
            return Err(AppError::validation("limits.max_siblings must be > 0"));
        }

        let text = &self.scoring.text;
        let text_weights = [
            text.match_sign,
            text.match_word,
            text.no_opposite_word,
            text.less_text,
        ];
        if text_weights.iter().any(|w| !w.is_finite() || *w < 0.0)
            || text_weights.iter().sum::<f64>() <= 0.0
        {
            return Err(AppError::validation(
                "scoring.text weights must be non-negative with a positive sum",
            ));
        }

        let url = &self.scoring.url;
        let url_weights = [url.length_rate, url.content_rate];
        if url_weights.iter().any(|w| !w.is_finite() || *w < 0.0)
            || url_weights.iter().sum::<f64>() <= 0.0
        {
            return Err(AppError::validation(
                "scoring.url weights must be non-negative with a positive sum",
            ));
        }

        if self
            .base_domain
            .overrides
            .iter()
            .any(|host| host.trim().is_empty())
        {
            return Err(AppError::validation("base_domain.overrides has an empty host"));
        }

        for preset in &self.presets {
            preset.validate()?;
        }
        Ok(())
    }
}

/// Scan and output caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum unique entries kept per link type
    #[serde(default = "defaults::max_items_per_type")]
    pub max_items_per_type: usize,

    /// Maximum links examined by the heuristic search (first and last half)
    #[serde(default = "defaults::max_scanning_links")]
    pub max_scanning_links: usize,

    /// Maximum scored candidates accumulated before ranking
    #[serde(default = "defaults::max_scored_entries")]
    pub max_scored_entries: usize,

    /// Maximum guessed siblings returned
    #[serde(default = "defaults::max_siblings")]
    pub max_siblings: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_items_per_type: defaults::max_items_per_type(),
            max_scanning_links: defaults::max_scanning_links(),
            max_scored_entries: defaults::max_scored_entries(),
            max_siblings: defaults::max_siblings(),
        }
    }
}

/// Relative weights of the sibling scorers. Each group is normalized to sum to 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub text: TextWeights,

    #[serde(default)]
    pub url: UrlWeights,
}

/// Weights of the anchor text signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextWeights {
    /// An arrow glyph at the start or end of the text
    #[serde(default = "defaults::match_sign")]
    pub match_sign: f64,

    /// A direction keyword
    #[serde(default = "defaults::match_word")]
    pub match_word: f64,

    /// No opposite direction keyword in the remaining text
    #[serde(default = "defaults::no_opposite_word")]
    pub no_opposite_word: f64,

    /// Little unrelated text around the match
    #[serde(default = "defaults::less_text")]
    pub less_text: f64,
}

impl Default for TextWeights {
    fn default() -> Self {
        Self {
            match_sign: defaults::match_sign(),
            match_word: defaults::match_word(),
            no_opposite_word: defaults::no_opposite_word(),
            less_text: defaults::less_text(),
        }
    }
}

/// Weights of the URL similarity signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlWeights {
    #[serde(default = "defaults::length_rate")]
    pub length_rate: f64,

    #[serde(default = "defaults::content_rate")]
    pub content_rate: f64,
}

impl Default for UrlWeights {
    fn default() -> Self {
        Self {
            length_rate: defaults::length_rate(),
            content_rate: defaults::content_rate(),
        }
    }
}

/// Hosts whose base domain is the listed suffix rather than the public suffix
/// list answer (e.g. user sites on `github.io`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseDomainConfig {
    #[serde(default = "defaults::base_domain_overrides")]
    pub overrides: Vec<String>,
}

impl Default for BaseDomainConfig {
    fn default() -> Self {
        Self {
            overrides: defaults::base_domain_overrides(),
        }
    }
}

/// Site-specific rule locating the previous/next element by CSS selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetRule {
    /// Display name
    pub name: String,

    /// Regex matched against the page URL
    pub url: String,

    /// Selector of the previous page element
    pub prev: String,

    /// Selector of the next page element
    pub next: String,
}

impl PresetRule {
    /// Check that the URL pattern and both selectors compile.
    pub fn validate(&self) -> Result<()> {
        Regex::new(&self.url).map_err(|e| AppError::pattern(&self.url, e))?;
        for selector in [&self.prev, &self.next] {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        Ok(())
    }
}

mod defaults {
    use super::PresetRule;

    pub fn max_items_per_type() -> usize {
        20
    }
    pub fn max_scanning_links() -> usize {
        200
    }
    pub fn max_scored_entries() -> usize {
        100
    }
    pub fn max_siblings() -> usize {
        3
    }

    pub fn match_sign() -> f64 {
        50.0
    }
    pub fn match_word() -> f64 {
        50.0
    }
    pub fn no_opposite_word() -> f64 {
        25.0
    }
    pub fn less_text() -> f64 {
        20.0
    }
    pub fn length_rate() -> f64 {
        30.0
    }
    pub fn content_rate() -> f64 {
        70.0
    }

    pub fn base_domain_overrides() -> Vec<String> {
        vec!["github.io".to_string()]
    }

    pub fn presets() -> Vec<PresetRule> {
        vec![
            PresetRule {
                name: "Google Search".to_string(),
                url: r"^https?://www\.google\.(?:com|co\.jp)/(?:#|search|webhp).+".to_string(),
                prev: "a#pnprev, #nav td:first-child > a".to_string(),
                next: "a#pnnext, #nav td:last-child > a".to_string(),
            },
            PresetRule {
                name: "DuckDuckGo Search".to_string(),
                url: r"^https?://duckduckgo\.com/(?:html|lite)".to_string(),
                prev: r#"input.navbutton[value*="Prev"]"#.to_string(),
                next: r#"input.navbutton[value*="Next"]"#.to_string(),
            },
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            scoring: ScoringConfig::default(),
            base_domain: BaseDomainConfig::default(),
            presets: defaults::presets(),
        }
    }
}
