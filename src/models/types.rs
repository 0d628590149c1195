//! Declared link types and the relation token lookup table.

use std::collections::HashMap;
use std::sync::LazyLock;

/// A registered navigation type and its synonyms.
#[derive(Debug, Clone, Copy)]
pub struct NaviLinkType {
    pub kind: &'static str,
    pub synonyms: &'static [&'static str],
}

/// Registered navigation types in display order.
pub const NAVI_LINK_TYPES: &[NaviLinkType] = &[
    NaviLinkType { kind: "top", synonyms: &["home", "origin"] },
    NaviLinkType { kind: "up", synonyms: &["parent"] },
    NaviLinkType { kind: "first", synonyms: &["begin", "start"] },
    NaviLinkType { kind: "prev", synonyms: &["previous"] },
    NaviLinkType { kind: "next", synonyms: &["child"] },
    NaviLinkType { kind: "last", synonyms: &["end"] },
    NaviLinkType { kind: "contents", synonyms: &["toc"] },
    NaviLinkType { kind: "index", synonyms: &[] },
    NaviLinkType { kind: "chapter", synonyms: &[] },
    NaviLinkType { kind: "section", synonyms: &[] },
    NaviLinkType { kind: "subsection", synonyms: &[] },
    NaviLinkType { kind: "appendix", synonyms: &[] },
    NaviLinkType { kind: "bookmark", synonyms: &[] },
    NaviLinkType { kind: "glossary", synonyms: &[] },
    NaviLinkType { kind: "help", synonyms: &[] },
    NaviLinkType { kind: "search", synonyms: &[] },
    NaviLinkType { kind: "author", synonyms: &["made"] },
    NaviLinkType { kind: "copyright", synonyms: &[] },
    NaviLinkType { kind: "alternate", synonyms: &[] },
];

/// Page information types in display order.
pub const PAGE_INFO_TYPES: &[&str] = &["meta", "feed", "stylesheet", "script", "favicon"];

/// Display labels of feed MIME types.
const FEED_LABELS: &[(&str, &str)] = &[
    ("application/rss+xml", "RSS"),
    ("application/atom+xml", "ATOM"),
    ("text/xml", "XML"),
    ("application/xml", "XML"),
    ("application/rdf+xml", "XML"),
];

/// Label of a feed MIME type, `RSS` when unknown.
pub fn feed_label(mime: &str) -> &'static str {
    FEED_LABELS
        .iter()
        .find(|(kind, _)| kind.eq_ignore_ascii_case(mime))
        .map_or("RSS", |(_, label)| label)
}

/// Resolution of a relation token against the registered types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelKind<'a> {
    /// A registered type (synonyms folded)
    Registered(&'static str),
    /// Any other relation value
    Unregistered(&'a str),
}

/// Token to canonical type map built once from [`NAVI_LINK_TYPES`].
pub struct TypeTable {
    canonical: HashMap<&'static str, &'static str>,
    order: HashMap<&'static str, usize>,
}

static TYPE_TABLE: LazyLock<TypeTable> = LazyLock::new(|| TypeTable::new(NAVI_LINK_TYPES));

impl TypeTable {
    fn new(types: &'static [NaviLinkType]) -> Self {
        let mut canonical = HashMap::new();
        let mut order = HashMap::new();

        for (index, navi) in types.iter().enumerate() {
            canonical.insert(navi.kind, navi.kind);
            order.insert(navi.kind, index);
            for synonym in navi.synonyms {
                canonical.insert(*synonym, navi.kind);
            }
        }

        Self { canonical, order }
    }

    /// The shared table of registered navigation types.
    pub fn global() -> &'static TypeTable {
        &TYPE_TABLE
    }

    /// Fold a lowercase relation token into its type.
    pub fn resolve<'a>(&self, token: &'a str) -> RelKind<'a> {
        match self.canonical.get(token) {
            Some(kind) => RelKind::Registered(kind),
            None => RelKind::Unregistered(token),
        }
    }

    /// Display position of a registered type.
    pub fn position(&self, kind: &str) -> Option<usize> {
        self.order.get(kind).copied()
    }
}

/// Display position of a page information type.
pub fn page_info_position(kind: &str) -> Option<usize> {
    PAGE_INFO_TYPES.iter().position(|t| *t == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_fold_to_registered_type() {
        let table = TypeTable::global();
        assert_eq!(table.resolve("home"), RelKind::Registered("top"));
        assert_eq!(table.resolve("origin"), RelKind::Registered("top"));
        assert_eq!(table.resolve("previous"), RelKind::Registered("prev"));
        assert_eq!(table.resolve("next"), RelKind::Registered("next"));
    }

    #[test]
    fn test_unknown_token_is_unregistered() {
        let table = TypeTable::global();
        assert_eq!(table.resolve("canonical"), RelKind::Unregistered("canonical"));
    }

    #[test]
    fn test_positions_follow_declared_order() {
        let table = TypeTable::global();
        assert!(table.position("top") < table.position("prev"));
        assert!(table.position("prev") < table.position("next"));
        assert_eq!(table.position("canonical"), None);
        assert_eq!(page_info_position("meta"), Some(0));
        assert_eq!(page_info_position("favicon"), Some(4));
    }

    #[test]
    fn test_feed_label() {
        assert_eq!(feed_label("application/atom+xml"), "ATOM");
        assert_eq!(feed_label("application/rdf+xml"), "XML");
        assert_eq!(feed_label("application/x-unknown"), "RSS");
    }
}
