// src/lib.rs

//! NaviLink Library
//!
//! Finds the navigation links of an HTML document: declared relation links
//! sorted by type, the previous and next pages (declared, preset, or guessed)
//! and the upper pages of its URL.

pub mod document;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use document::{Document, HtmlDocument, Node};
pub use error::{AppError, Result};
pub use models::{Config, Direction, SiblingResult};
pub use services::{LinkClassifier, SiblingNavi, UpperNavi};
