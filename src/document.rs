// src/document.rs

//! Document access.
//!
//! The navigation components only read a document through the [`Document`]
//! trait, which hands out owned [`Node`] snapshots. [`HtmlDocument`] is the
//! `scraper` backed implementation.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::utils::resolve_url;

/// First image inside a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageInfo {
    pub alt: Option<String>,
    pub title: Option<String>,
    /// Raw `src` attribute value
    pub src: Option<String>,
}

/// Snapshot of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Lowercase local name
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content, not normalized
    pub text: String,
    /// Absolute `href`, if present and resolvable
    pub href: Option<String>,
    /// Absolute `src`, if present and resolvable
    pub src: Option<String>,
    /// Document-order position of the owning form
    pub form_index: Option<usize>,
    pub image: Option<ImageInfo>,
}

impl Node {
    /// Attribute value by (lowercase) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Read access to a rendered document.
pub trait Document {
    /// Document URL
    fn url(&self) -> &str;

    /// MIME type, e.g. `text/html`
    fn content_type(&self) -> &str;

    /// Character encoding, e.g. `UTF-8`
    fn charset(&self) -> &str;

    /// All `<meta>` elements
    fn metas(&self) -> Vec<Node>;

    /// All `<script>` elements with a `src`
    fn scripts(&self) -> Vec<Node>;

    /// Elements carrying `rel` or `rev` together with `href`
    fn relation_links(&self) -> Vec<Node>;

    /// Hyperlinks (`<a href>`, `<area href>`) in document order
    fn hyperlinks(&self) -> Vec<Node>;

    /// First element matching a CSS selector.
    fn select_first(&self, selector: &str) -> Result<Option<Node>>;
}

macro_rules! static_selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).expect("valid static selector"));
    };
}

static_selector!(META, "meta");
static_selector!(SCRIPT, "script[src]");
static_selector!(RELATION, "[rel][href], [rev][href]");
static_selector!(HYPERLINK, "a[href], area[href]");
static_selector!(FORM, "form");
static_selector!(IMAGE, "img");
static_selector!(BASE, "base[href]");

const FORM_CONTROLS: &[&str] = &["input", "button", "select", "textarea"];

/// HTML document parsed with `scraper`.
pub struct HtmlDocument {
    html: Html,
    url: Url,
    base: Url,
    content_type: String,
    charset: String,
}

impl HtmlDocument {
    /// Parse an HTML source served from `url`.
    pub fn parse(url: &str, source: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        let html = Html::parse_document(source);

        let base = html
            .select(&BASE)
            .next()
            .and_then(|base| base.value().attr("href"))
            .and_then(|href| url.join(href.trim()).ok())
            .unwrap_or_else(|| url.clone());
        let charset = Self::declared_charset(&html).unwrap_or_else(|| "UTF-8".to_string());

        Ok(Self {
            html,
            url,
            base,
            content_type: "text/html".to_string(),
            charset,
        })
    }

    /// Apply a `Content-Type` header value such as `text/html; charset=EUC-JP`.
    pub fn apply_content_type_header(&mut self, header: &str) {
        let mut parts = header.split(';');
        if let Some(mime) = parts.next().map(str::trim).filter(|m| !m.is_empty()) {
            self.content_type = mime.to_lowercase();
        }
        if let Some(charset) = parts.find_map(Self::charset_param) {
            self.charset = charset;
        }
    }

    fn declared_charset(html: &Html) -> Option<String> {
        html.select(&META).find_map(|meta| {
            let meta = meta.value();
            if let Some(charset) = meta.attr("charset") {
                return Some(charset.trim().to_string());
            }
            let is_content_type = meta
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"));
            if is_content_type {
                return meta
                    .attr("content")
                    .and_then(|content| content.split(';').find_map(Self::charset_param));
            }
            None
        })
    }

    fn charset_param(param: &str) -> Option<String> {
        let (key, value) = param.trim().split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    }

    fn node(&self, element: ElementRef<'_>) -> Node {
        let value = element.value();
        let tag = value.name().to_lowercase();

        let form_index = if FORM_CONTROLS.contains(&tag.as_str()) {
            self.form_index(element)
        } else {
            None
        };

        let image = element.select(&IMAGE).next().map(|img| {
            let img = img.value();
            ImageInfo {
                alt: img.attr("alt").map(str::to_string),
                title: img.attr("title").map(str::to_string),
                src: img.attr("src").map(str::to_string),
            }
        });

        Node {
            attributes: value
                .attrs()
                .map(|(name, value)| (name.to_lowercase(), value.to_string()))
                .collect(),
            text: element.text().collect(),
            href: value.attr("href").and_then(|href| resolve_url(&self.base, href)),
            src: value.attr("src").and_then(|src| resolve_url(&self.base, src)),
            form_index,
            image,
            tag,
        }
    }

    /// Position of the form owning a control, honouring the `form` attribute.
    fn form_index(&self, control: ElementRef<'_>) -> Option<usize> {
        let mut forms = self.html.select(&FORM);

        if let Some(form_id) = control.value().attr("form") {
            return forms.position(|form| form.value().id() == Some(form_id));
        }

        let owner = control
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|ancestor| ancestor.value().name().eq_ignore_ascii_case("form"))?;
        forms.position(|form| (*form).id() == (*owner).id())
    }

    fn collect(&self, selector: &Selector) -> Vec<Node> {
        self.html
            .select(selector)
            .map(|element| self.node(element))
            .collect()
    }
}

impl Document for HtmlDocument {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn charset(&self) -> &str {
        &self.charset
    }

    fn metas(&self) -> Vec<Node> {
        self.collect(&META)
    }

    fn scripts(&self) -> Vec<Node> {
        self.collect(&SCRIPT)
    }

    fn relation_links(&self) -> Vec<Node> {
        self.collect(&RELATION)
    }

    fn hyperlinks(&self) -> Vec<Node> {
        self.collect(&HYPERLINK)
    }

    fn select_first(&self, selector: &str) -> Result<Option<Node>> {
        let parsed =
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        Ok(self.html.select(&parsed).next().map(|element| self.node(element)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
          <meta charset="Shift_JIS">
          <meta name="description" content="A page">
          <script src="/js/app.js"></script>
          <script>var inline = 1;</script>
          <link rel="next" href="page2.html">
        </head><body>
          <a href="/about" title="About us">About <img src="i/about.png" alt="about"></a>
          <area href="map.html">
          <form id="search"></form>
          <form id="pager"><input type="submit" value="Next"></form>
          <input id="outside" form="search" value="Go">
        </body></html>
    "#;

    fn document() -> HtmlDocument {
        HtmlDocument::parse("http://example.com/dir/page1.html", PAGE).unwrap()
    }

    #[test]
    fn test_collects_nodes_with_resolved_urls() {
        let doc = document();
        assert_eq!(doc.metas().len(), 2);
        let scripts = doc.scripts();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].src.as_deref(), Some("http://example.com/js/app.js"));

        let relations = doc.relation_links();
        assert_eq!(relations.len(), 1);
        assert_eq!(
            relations[0].href.as_deref(),
            Some("http://example.com/dir/page2.html")
        );
    }

    #[test]
    fn test_hyperlinks_include_area_and_images() {
        let links = document().hyperlinks();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].attr("title"), Some("About us"));
        let image = links[0].image.as_ref().unwrap();
        assert_eq!(image.alt.as_deref(), Some("about"));
        assert_eq!(image.src.as_deref(), Some("i/about.png"));
        assert_eq!(links[1].tag, "area");
    }

    #[test]
    fn test_charset_and_content_type() {
        let mut doc = document();
        assert_eq!(doc.charset(), "Shift_JIS");
        assert_eq!(doc.content_type(), "text/html");
        doc.apply_content_type_header("application/xhtml+xml; charset=EUC-JP");
        assert_eq!(doc.content_type(), "application/xhtml+xml");
        assert_eq!(doc.charset(), "EUC-JP");
    }

    #[test]
    fn test_form_index_of_controls() {
        let doc = document();
        let inside = doc.select_first("form#pager input").unwrap().unwrap();
        assert_eq!(inside.form_index, Some(1));
        let outside = doc.select_first("#outside").unwrap().unwrap();
        assert_eq!(outside.form_index, Some(0));
    }

    #[test]
    fn test_select_first_rejects_invalid_selector() {
        assert!(document().select_first("[[invalid").is_err());
    }

    #[test]
    fn test_base_href_is_honoured() {
        let doc = HtmlDocument::parse(
            "http://example.com/a/b.html",
            r#"<html><head><base href="http://cdn.example.com/x/"></head>
               <body><a href="c.html">c</a></body></html>"#,
        )
        .unwrap();
        assert_eq!(
            doc.hyperlinks()[0].href.as_deref(),
            Some("http://cdn.example.com/x/c.html")
        );
    }
}
