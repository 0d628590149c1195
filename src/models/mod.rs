// src/models/mod.rs

//! Domain models for the navigation link library.
//!
//! This module contains all data structures used throughout the library,
//! organized by their primary purpose.

pub mod config;
mod entry;
mod sibling;
pub mod types;

// Re-export all public types
pub use config::{
    BaseDomainConfig, Config, LimitsConfig, PresetRule, ScoringConfig, TextWeights, UrlWeights,
};
pub use entry::{AttrValue, Entry, LinkEntry, LinkLists, MetaEntry, TypedBucket};
pub use sibling::{
    Direction, NumberingEntry, PresetEntry, PresetTarget, ScanType, ScoredEntry, SiblingEntry,
    SiblingResult,
};
