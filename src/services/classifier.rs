//! Link classification service.
//!
//! Sorts the relation links, metas and scripts of a document into typed
//! buckets: registered navigation types, unregistered ("sub") relation types
//! and page information.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::document::{Document, Node};
use crate::models::types::{RelKind, TypeTable, feed_label, page_info_position};
use crate::models::{AttrValue, Config, Entry, LinkEntry, LinkLists, MetaEntry, TypedBucket};
use crate::services::feed::{FeedValidator, MimeFeedValidator};
use crate::utils::{BaseDomainResolver, StripMode, UriView, leaf, normalize_whitespace};

/// Lowercase relation tokens of one element in first-seen order.
struct RelTokens(Vec<String>);

impl RelTokens {
    fn parse(value: &str) -> Self {
        let mut tokens: Vec<String> = Vec::new();
        for token in value.split_whitespace().map(str::to_lowercase) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        Self(tokens)
    }

    fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    /// The other tokens of a multi-token relation.
    fn except(&self, token: &str) -> Vec<String> {
        if self.0.len() > 1 {
            self.0.iter().filter(|t| *t != token).cloned().collect()
        } else {
            Vec::new()
        }
    }

    fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Entries grouped by type in scan order, before dedup and capping.
#[derive(Default)]
struct RawBuckets {
    order: Vec<String>,
    entries: HashMap<String, Vec<Entry>>,
}

impl RawBuckets {
    fn add(&mut self, kind: &str, entry: Entry) {
        if !self.entries.contains_key(kind) {
            self.order.push(kind.to_string());
        }
        self.entries.entry(kind.to_string()).or_default().push(entry);
    }

    fn into_buckets(
        mut self,
        cap: usize,
        compare: impl Fn(&str, &str) -> Ordering,
    ) -> Vec<TypedBucket> {
        let mut kinds = std::mem::take(&mut self.order);
        kinds.sort_by(|a, b| compare(a, b));
        kinds
            .into_iter()
            .map(|kind| {
                let entries = self.entries.remove(&kind).unwrap_or_default();
                TypedBucket::collect(kind, entries, cap)
            })
            .collect()
    }
}

/// Classifies document links into typed buckets and memoizes the result per
/// document URL (fragment changes do not invalidate it).
pub struct LinkClassifier {
    validator: Box<dyn FeedValidator>,
    resolver: BaseDomainResolver,
    max_items_per_type: usize,
    /// Fragmentless document URL and its classification
    cache: Option<(String, LinkLists)>,
}

impl LinkClassifier {
    /// Create a classifier with the MIME based feed validator.
    pub fn new(config: &Config) -> Self {
        Self {
            validator: Box::new(MimeFeedValidator),
            resolver: BaseDomainResolver::new(config.base_domain.overrides.clone()),
            max_items_per_type: config.limits.max_items_per_type,
            cache: None,
        }
    }

    /// Replace the feed validator.
    pub fn with_validator(mut self, validator: Box<dyn FeedValidator>) -> Self {
        self.validator = validator;
        self.cache = None;
        self
    }

    /// Classification of the document, computed once per page.
    pub fn lists(&mut self, doc: &dyn Document) -> &LinkLists {
        let key = UriView::parse(doc.url(), StripMode::StripFragment, &self.resolver)
            .map_or_else(|| doc.url().to_string(), |uri| uri.spec);

        let entry = match self.cache.take() {
            Some((cached, lists)) if cached == key => (cached, lists),
            _ => {
                log::debug!("Classifying links of {}", key);
                let lists = self.classify(doc);
                (key, lists)
            }
        };

        &self.cache.insert(entry).1
    }

    /// Registered navigation buckets.
    pub fn navi_list(&mut self, doc: &dyn Document) -> &[TypedBucket] {
        &self.lists(doc).navi
    }

    /// Unregistered relation buckets.
    pub fn sub_navi_list(&mut self, doc: &dyn Document) -> &[TypedBucket] {
        &self.lists(doc).sub_navi
    }

    /// Page information buckets.
    pub fn info_list(&mut self, doc: &dyn Document) -> &[TypedBucket] {
        &self.lists(doc).info
    }

    /// First entry of the registered navigation bucket of `kind`.
    pub fn get_data(&mut self, doc: &dyn Document, kind: &str) -> Option<Entry> {
        self.navi_list(doc)
            .iter()
            .find(|bucket| bucket.kind == kind)
            .and_then(|bucket| bucket.list.first().cloned())
    }

    /// Classify a document without consulting the cache.
    pub fn classify(&self, doc: &dyn Document) -> LinkLists {
        let mut navi = RawBuckets::default();
        let mut sub_navi = RawBuckets::default();
        let mut info = RawBuckets::default();

        Self::scan_meta(&mut info, doc);
        Self::scan_script(&mut info, doc);

        for node in doc.relation_links() {
            let Some(rel) = node
                .attr("rel")
                .filter(|rel| !rel.trim().is_empty())
                .or_else(|| node.attr("rev"))
                .filter(|rel| !rel.trim().is_empty())
            else {
                continue;
            };

            let Some(href) = node.href.as_deref() else {
                continue;
            };
            if !Self::is_linkable(href) {
                continue;
            }

            let rels = RelTokens::parse(rel);

            if !self.scan_info_link(&mut info, &node, &rels)
                && !Self::scan_navi_link(&mut navi, &node, &rels)
            {
                Self::scan_sub_navi_link(&mut sub_navi, &node, &rels);
            }
        }

        let cap = self.max_items_per_type;
        let table = TypeTable::global();

        LinkLists {
            navi: navi.into_buckets(cap, |a, b| table.position(a).cmp(&table.position(b))),
            sub_navi: sub_navi.into_buckets(cap, |a, b| a.cmp(b)),
            info: info.into_buckets(cap, |a, b| page_info_position(a).cmp(&page_info_position(b))),
        }
    }

    fn is_linkable(href: &str) -> bool {
        let lower = href.to_ascii_lowercase();
        lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("mailto:")
    }

    fn scan_meta(list: &mut RawBuckets, doc: &dyn Document) {
        let metas = doc.metas();

        let has_content_type = metas.iter().any(|meta| {
            meta.attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"))
        });
        if !has_content_type {
            list.add(
                "meta",
                Entry::Meta(MetaEntry {
                    name: "Content-Type".to_string(),
                    content: format!("{};charset={}", doc.content_type(), doc.charset()),
                }),
            );
        }

        for meta in &metas {
            if let Some(entry) = Self::meta_entry(meta) {
                list.add("meta", Entry::Meta(entry));
            }
        }
    }

    fn scan_script(list: &mut RawBuckets, doc: &dyn Document) {
        for script in doc.scripts() {
            if let Some(entry) = Self::node_entry(&script, Vec::new()) {
                list.add("script", Entry::Link(entry));
            }
        }
    }

    fn scan_info_link(&self, list: &mut RawBuckets, node: &Node, rels: &RelTokens) -> bool {
        let has_type = node.attr("type").is_some_and(|t| !t.trim().is_empty());
        let mut attributes = Vec::new();

        let kind = if rels.contains("feed")
            || (has_type && rels.contains("alternate") && !rels.contains("stylesheet"))
        {
            match self.validator.feed_type(node, rels.contains("feed")) {
                Ok(Some(mime)) => {
                    attributes.push(("type".to_string(), single(feed_label(&mime))));
                    Some("feed")
                }
                Ok(None) => None,
                Err(e) => {
                    log::debug!("Feed check failed for {:?}: {}", node.href, e);
                    None
                }
            }
        } else if rels.contains("stylesheet") {
            let media = node
                .attr("media")
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or("all");
            attributes.push(("media".to_string(), single(media)));
            Some("stylesheet")
        } else if rels.contains("icon") {
            if let Some(mime) = node.attr("type").filter(|t| !t.trim().is_empty()) {
                attributes.push(("type".to_string(), single(mime)));
            }
            Some("favicon")
        } else {
            None
        };

        let Some(kind) = kind else {
            return false;
        };
        if let Some(entry) = Self::node_entry(node, attributes) {
            list.add(kind, Entry::Link(entry));
        }
        true
    }

    fn scan_navi_link(list: &mut RawBuckets, node: &Node, rels: &RelTokens) -> bool {
        let mut base = Vec::new();
        if rels.contains("alternate") {
            for name in ["media", "hreflang"] {
                if let Some(value) = node.attr(name).filter(|v| !v.trim().is_empty()) {
                    base.push((name.to_string(), single(value)));
                }
            }
        }

        let table = TypeTable::global();
        let mut found = 0;

        for token in rels.iter() {
            if let RelKind::Registered(kind) = table.resolve(token) {
                let mut attributes = base.clone();
                attributes.push(("rel".to_string(), AttrValue::List(rels.except(token))));
                if let Some(entry) = Self::node_entry(node, attributes) {
                    list.add(kind, Entry::Link(entry));
                }
                found += 1;
            }
        }

        found > 0
    }

    fn scan_sub_navi_link(list: &mut RawBuckets, node: &Node, rels: &RelTokens) {
        let table = TypeTable::global();

        for token in rels.iter() {
            if let RelKind::Unregistered(kind) = table.resolve(token) {
                let attributes = vec![("rel".to_string(), AttrValue::List(rels.except(token)))];
                if let Some(entry) = Self::node_entry(node, attributes) {
                    list.add(kind, Entry::Link(entry));
                }
            }
        }
    }

    fn meta_entry(node: &Node) -> Option<MetaEntry> {
        let content = normalize_whitespace(node.attr("content")?);
        if content.is_empty() {
            return None;
        }

        let name = ["name", "http-equiv", "property", "itemprop"]
            .into_iter()
            .filter_map(|attr| node.attr(attr))
            .map(normalize_whitespace)
            .find(|name| !name.is_empty())?;

        Some(MetaEntry { name, content })
    }

    fn node_entry(node: &Node, attributes: Vec<(String, AttrValue)>) -> Option<LinkEntry> {
        let url = node
            .href
            .as_deref()
            .or(node.src.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())?
            .to_string();

        let title = Some(normalize_whitespace(node.attr("title").unwrap_or_default()))
            .filter(|t| !t.is_empty())
            .or_else(|| {
                (!matches!(node.tag.as_str(), "script" | "link"))
                    .then(|| normalize_whitespace(&node.text))
                    .filter(|t| !t.is_empty())
            })
            .unwrap_or_else(|| leaf(&url).to_string());

        Some(LinkEntry {
            title,
            attributes,
            url,
        })
    }
}

fn single(value: &str) -> AttrValue {
    AttrValue::Single(value.to_string())
}
