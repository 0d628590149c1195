//! Sibling (previous/next page) results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Entry;

/// Direction of a sibling page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Prev => Direction::Next,
            Direction::Next => Direction::Prev,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Prev => "prev",
            Direction::Next => "next",
        }
    }

    /// Step applied to page numbers when guessing by numbering.
    pub fn step(self) -> i64 {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prev" | "previous" => Ok(Direction::Prev),
            "next" => Ok(Direction::Next),
            other => Err(AppError::validation(format!("unknown direction '{other}'"))),
        }
    }
}

/// Which strategy produced a sibling result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Preset,
    Official,
    Searching,
    Numbering,
}

impl ScanType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanType::Preset => "preset",
            ScanType::Official => "official",
            ScanType::Searching => "searching",
            ScanType::Numbering => "numbering",
        }
    }
}

/// Where a preset entry leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetTarget {
    /// Navigate to the URL
    Url(String),

    /// Submit the form at this document-order position
    Submit { form_index: usize },
}

/// A sibling link resolved through a site preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetEntry {
    /// Preset rule name
    pub name: String,
    pub title: String,
    pub target: PresetTarget,
}

/// A candidate found by heuristic link search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub title: String,
    pub url: String,
    pub score: f64,
}

/// A candidate inferred by changing a number in the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingEntry {
    /// Matched substring of the current URL
    pub here: String,
    /// Replacement substring
    pub there: String,
    pub url: String,
}

/// One item of a sibling result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SiblingEntry {
    Preset(PresetEntry),
    Official(Entry),
    Searching(ScoredEntry),
    Numbering(NumberingEntry),
}

impl SiblingEntry {
    /// Target URL, if the entry navigates to one.
    pub fn url(&self) -> Option<&str> {
        match self {
            SiblingEntry::Preset(entry) => match &entry.target {
                PresetTarget::Url(url) => Some(url),
                PresetTarget::Submit { .. } => None,
            },
            SiblingEntry::Official(entry) => entry.url(),
            SiblingEntry::Searching(entry) => Some(&entry.url),
            SiblingEntry::Numbering(entry) => Some(&entry.url),
        }
    }

    /// Display text of the entry.
    pub fn format(&self) -> String {
        match self {
            SiblingEntry::Preset(entry) => format!("[{}] {}", entry.name, entry.title),
            SiblingEntry::Official(entry) => entry.format(),
            SiblingEntry::Searching(entry) => format!("{} ({:.5})", entry.title, entry.score),
            SiblingEntry::Numbering(entry) => format!("{} -> {}", entry.here, entry.there),
        }
    }
}

/// Result of a sibling lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiblingResult {
    pub list: Vec<SiblingEntry>,
    pub scan_type: ScanType,
}

impl SiblingResult {
    /// URL of the best candidate.
    pub fn first_url(&self) -> Option<&str> {
        self.list.first().and_then(SiblingEntry::url)
    }
}
