//! Service layer for the navigation link library.
//!
//! This module contains the business logic for:
//! - Link classification (`LinkClassifier`)
//! - Site presets (`PresetNavi`)
//! - Heuristic link scoring (`NaviLinkScorer`)
//! - Previous/next page lookup (`SiblingNavi`)
//! - Parent/top page lookup (`UpperNavi`)

pub mod classifier;
pub mod feed;
pub mod preset;
pub mod scorer;
mod sibling;
mod upper;

pub use classifier::LinkClassifier;
pub use feed::{FeedValidator, MimeFeedValidator};
pub use preset::{PresetNavi, PresetOutcome};
pub use scorer::{NaviLinkScorer, TextScorer, UrlScorer};
pub use sibling::SiblingNavi;
pub use upper::UpperNavi;
