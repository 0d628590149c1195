//! Link and meta entries collected from a document, grouped into typed buckets.

use serde::{Deserialize, Serialize};

/// Value of an annotation attached to a link entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Single(String),
    List(Vec<String>),
}

impl AttrValue {
    /// Render the value for display, joining lists with commas.
    pub fn joined(&self) -> String {
        match self {
            AttrValue::Single(value) => value.clone(),
            AttrValue::List(values) => values.join(","),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            AttrValue::Single(value) => value.is_empty(),
            AttrValue::List(values) => values.is_empty(),
        }
    }
}

/// A link found through a relation attribute or a script reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Display title
    pub title: String,

    /// Ordered annotations (`media`, `hreflang`, `type`, `rel`, ...)
    #[serde(default)]
    pub attributes: Vec<(String, AttrValue)>,

    /// Absolute URL of the target
    pub url: String,
}

impl LinkEntry {
    /// Format the entry as `title [name: value ...]`, omitting empty annotations.
    pub fn format(&self) -> String {
        let attributes = self
            .attributes
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| format!("{}: {}", name, value.joined()))
            .collect::<Vec<_>>()
            .join(" ");

        if attributes.is_empty() {
            self.title.clone()
        } else {
            format!("{} [{}]", self.title, attributes)
        }
    }
}

/// A `<meta>` name/content pair. Never carries a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub name: String,
    pub content: String,
}

impl MetaEntry {
    /// Format the entry as `name: content`.
    pub fn format(&self) -> String {
        format!("{}: {}", self.name, self.content)
    }
}

/// An item of a typed bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Link(LinkEntry),
    Meta(MetaEntry),
}

impl Entry {
    /// URL of a link entry; meta entries have none.
    pub fn url(&self) -> Option<&str> {
        match self {
            Entry::Link(link) => Some(&link.url),
            Entry::Meta(_) => None,
        }
    }

    /// Display text of the entry.
    pub fn format(&self) -> String {
        match self {
            Entry::Link(link) => link.format(),
            Entry::Meta(meta) => meta.format(),
        }
    }
}

/// Entries of one link type in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedBucket {
    /// Link type (`next`, `stylesheet`, an unregistered rel value, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Unique entries
    pub list: Vec<Entry>,

    /// Whether the source list was cut at the per-type cap
    pub trimmed: bool,
}

impl TypedBucket {
    /// Build a bucket from raw entries, dropping duplicates and stopping once
    /// `cap` unique entries have been collected.
    pub fn collect(kind: impl Into<String>, entries: Vec<Entry>, cap: usize) -> Self {
        let mut list: Vec<Entry> = Vec::new();
        let mut trimmed = false;

        for entry in entries {
            if list.contains(&entry) {
                continue;
            }
            list.push(entry);

            if list.len() >= cap {
                trimmed = true;
                break;
            }
        }

        Self {
            kind: kind.into(),
            list,
            trimmed,
        }
    }

    /// Display label with the item count when there are several items.
    pub fn label(&self) -> String {
        let title = capitalize(&self.kind);
        if self.list.len() > 1 {
            format!("{} ({})", title, self.list.len())
        } else {
            title
        }
    }
}

/// Classification result of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkLists {
    /// Registered navigation types in declared order
    pub navi: Vec<TypedBucket>,

    /// Unregistered relation types in lexicographic order
    pub sub_navi: Vec<TypedBucket>,

    /// Page information types in declared order
    pub info: Vec<TypedBucket>,
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(title: &str, url: &str) -> Entry {
        Entry::Link(LinkEntry {
            title: title.to_string(),
            attributes: vec![],
            url: url.to_string(),
        })
    }

    #[test]
    fn test_collect_drops_duplicates_in_order() {
        let bucket = TypedBucket::collect(
            "next",
            vec![
                link("a", "http://x/a"),
                link("b", "http://x/b"),
                link("a", "http://x/a"),
            ],
            20,
        );
        assert_eq!(bucket.list.len(), 2);
        assert_eq!(bucket.list[0].url(), Some("http://x/a"));
        assert!(!bucket.trimmed);
    }

    #[test]
    fn test_collect_caps_and_marks_trimmed() {
        let entries = (0..25)
            .map(|i| link("t", &format!("http://x/{i}")))
            .collect();
        let bucket = TypedBucket::collect("script", entries, 20);
        assert_eq!(bucket.list.len(), 20);
        assert!(bucket.trimmed);
    }

    #[test]
    fn test_entries_differing_in_attributes_are_distinct() {
        let mut with_rel = LinkEntry {
            title: "a".to_string(),
            attributes: vec![],
            url: "http://x/a".to_string(),
        };
        let plain = Entry::Link(with_rel.clone());
        with_rel.attributes.push((
            "rel".to_string(),
            AttrValue::List(vec!["start".to_string()]),
        ));
        let bucket = TypedBucket::collect("first", vec![plain, Entry::Link(with_rel)], 20);
        assert_eq!(bucket.list.len(), 2);
    }

    #[test]
    fn test_format_skips_empty_annotations() {
        let entry = LinkEntry {
            title: "Style".to_string(),
            attributes: vec![
                ("media".to_string(), AttrValue::Single("all".to_string())),
                ("rel".to_string(), AttrValue::List(vec![])),
            ],
            url: "http://x/s.css".to_string(),
        };
        assert_eq!(entry.format(), "Style [media: all]");
    }

    #[test]
    fn test_label_counts_items() {
        let bucket = TypedBucket::collect(
            "stylesheet",
            vec![link("a", "http://x/a"), link("b", "http://x/b")],
            20,
        );
        assert_eq!(bucket.label(), "Stylesheet (2)");
    }
}
