// src/utils/uri.rs

//! Structured URL views used by every navigation component.

use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use url::{Host, Position, Url};

/// How much of the URL tail a view keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StripMode {
    #[default]
    None,
    /// Drop the fragment
    StripFragment,
    /// Drop the query and the fragment
    StripQuery,
}

/// Computes the registrable ("base") domain of a host.
///
/// Hosts ending with one of the override suffixes use the suffix itself,
/// everything else is looked up in the public suffix list.
#[derive(Debug, Clone)]
pub struct BaseDomainResolver {
    overrides: Arc<[String]>,
}

impl BaseDomainResolver {
    pub fn new(overrides: impl IntoIterator<Item = String>) -> Self {
        Self {
            overrides: overrides
                .into_iter()
                .map(|host| host.trim().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Base domain of a parsed URL, or an empty string for hostless URLs.
    pub fn base_domain(&self, url: &Url) -> String {
        let Some(host) = url.host() else {
            return String::new();
        };

        match host {
            Host::Domain(domain) => {
                let domain = domain.trim_end_matches('.');
                if matches!(url.scheme(), "http" | "https" | "ftp") {
                    if let Some(suffix) = self.overrides.iter().find(|suffix| {
                        domain == suffix.as_str() || domain.ends_with(&format!(".{suffix}"))
                    }) {
                        return suffix.clone();
                    }
                }
                psl::domain_str(domain).unwrap_or(domain).to_string()
            }
            Host::Ipv4(addr) => addr.to_string(),
            Host::Ipv6(addr) => addr.to_string(),
        }
    }
}

impl Default for BaseDomainResolver {
    fn default() -> Self {
        Self::new(["github.io".to_string()])
    }
}

/// Normalized view of a URL.
#[derive(Debug, Clone)]
pub struct UriView {
    pub scheme: String,
    /// Host without brackets or port; empty for hostless URLs
    pub host: String,
    pub base_domain: String,
    /// Scheme, userinfo, host and port
    pub pre_path: String,
    /// Path plus whatever query and fragment the strip mode keeps
    pub path: String,
    /// Full URL after stripping
    pub spec: String,
    no_ref_spec: String,
    resolver: BaseDomainResolver,
}

impl UriView {
    /// Parse a URL into a view. Returns `None` for unparsable input.
    pub fn parse(raw: &str, mode: StripMode, resolver: &BaseDomainResolver) -> Option<Self> {
        let url = match Url::parse(raw.trim()) {
            Ok(url) => url,
            Err(e) => {
                log::debug!("Cannot parse URL '{}': {}", raw, e);
                return None;
            }
        };

        let host = match url.host() {
            Some(Host::Ipv6(addr)) => addr.to_string(),
            Some(_) => url.host_str().unwrap_or_default().to_string(),
            None => String::new(),
        };

        let full_spec = url.as_str();
        let full_path = &url[Position::BeforePath..];
        let (path, spec) = match mode {
            StripMode::None => (full_path.to_string(), full_spec.to_string()),
            StripMode::StripFragment => (remove_ref(full_path), remove_ref(full_spec)),
            StripMode::StripQuery => (
                remove_ref(&remove_query(full_path)),
                remove_ref(&remove_query(full_spec)),
            ),
        };

        Some(Self {
            scheme: url.scheme().to_string(),
            host,
            base_domain: resolver.base_domain(&url),
            pre_path: url[..Position::BeforePath].to_string(),
            path,
            spec,
            no_ref_spec: remove_ref(full_spec),
            resolver: resolver.clone(),
        })
    }

    /// Whether the path is anything other than the root.
    pub fn has_path(&self) -> bool {
        self.path != "/"
    }

    /// Whether `other` addresses the same document, ignoring fragments.
    pub fn is_same_page(&self, other: &str) -> bool {
        let other = Url::parse(other.trim())
            .map(String::from)
            .unwrap_or_else(|_| other.to_string());
        remove_ref(&other) == self.no_ref_spec
    }

    /// Whether `other` belongs to the same base domain.
    pub fn is_same_base_domain(&self, other: &str) -> bool {
        Url::parse(other.trim())
            .map(|url| self.resolver.base_domain(&url) == self.base_domain)
            .unwrap_or(false)
    }

    /// Re-parse another URL with the same base domain rules.
    pub fn sibling(&self, raw: &str, mode: StripMode) -> Option<Self> {
        Self::parse(raw, mode, &self.resolver)
    }
}

fn remove_query(url: &str) -> String {
    let (head, fragment) = match url.find('#') {
        Some(index) => url.split_at(index),
        None => (url, ""),
    };
    let head = head.split_once('?').map_or(head, |(before, _)| before);
    format!("{head}{fragment}")
}

fn remove_ref(url: &str) -> String {
    url.split_once('#')
        .map_or(url, |(before, _)| before)
        .to_string()
}

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}

/// Last path segment of a URL, or the URL itself when that segment is empty.
pub fn leaf(url: &str) -> &str {
    if url.is_empty() {
        return "";
    }
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let start = url[..end].rfind('/').map_or(0, |index| index + 1);
    let tail = &url[start..];
    if tail.is_empty() { url } else { tail }
}

static ESCAPED_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(?:25)?([0-9A-Fa-f]{2})").expect("valid escape pattern"));

/// Decode percent-escaped URL-reserved characters, including double-escaped
/// (`%25xx`) forms. Other escapes are kept as they are.
pub fn unescape_url_chars(url: &str) -> String {
    ESCAPED_CHAR
        .replace_all(url, |caps: &Captures| {
            let decoded = match caps[1].to_ascii_lowercase().as_str() {
                "21" => Some('!'),
                "23" => Some('#'),
                "24" => Some('$'),
                "25" => Some('%'),
                "26" => Some('&'),
                "27" => Some('\''),
                "28" => Some('('),
                "29" => Some(')'),
                "2a" => Some('*'),
                "2b" => Some('+'),
                "2c" => Some(','),
                "2d" => Some('-'),
                "2e" => Some('.'),
                "2f" => Some('/'),
                "3a" => Some(':'),
                "3b" => Some(';'),
                "3d" => Some('='),
                "3f" => Some('?'),
                "40" => Some('@'),
                "5f" => Some('_'),
                "7e" => Some('~'),
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(url: &str, mode: StripMode) -> UriView {
        UriView::parse(url, mode, &BaseDomainResolver::default()).unwrap()
    }

    #[test]
    fn test_parse_components() {
        let uri = view("http://www.example.com:8080/a/b.html?x=1#top", StripMode::None);
        assert_eq!(uri.scheme, "http");
        assert_eq!(uri.host, "www.example.com");
        assert_eq!(uri.base_domain, "example.com");
        assert_eq!(uri.pre_path, "http://www.example.com:8080");
        assert_eq!(uri.path, "/a/b.html?x=1#top");
    }

    #[test]
    fn test_strip_modes() {
        let url = "http://example.com/a?x=1#top";
        assert_eq!(view(url, StripMode::StripFragment).spec, "http://example.com/a?x=1");
        assert_eq!(view(url, StripMode::StripFragment).path, "/a?x=1");
        assert_eq!(view(url, StripMode::StripQuery).spec, "http://example.com/a");
        assert_eq!(view(url, StripMode::StripQuery).path, "/a");
    }

    #[test]
    fn test_has_path() {
        assert!(!view("http://example.com", StripMode::None).has_path());
        assert!(view("http://example.com/a", StripMode::None).has_path());
        assert!(view("http://example.com/?q=1", StripMode::StripFragment).has_path());
    }

    #[test]
    fn test_unparsable_url_is_none() {
        assert!(UriView::parse("not a url", StripMode::None, &BaseDomainResolver::default()).is_none());
    }

    #[test]
    fn test_is_same_page_ignores_fragment() {
        let uri = view("http://example.com/a?x=1#one", StripMode::StripFragment);
        assert!(uri.is_same_page("http://example.com/a?x=1#two"));
        assert!(uri.is_same_page("http://EXAMPLE.com/a?x=1"));
        assert!(!uri.is_same_page("http://example.com/a?x=2"));
    }

    #[test]
    fn test_is_same_base_domain() {
        let uri = view("http://www.example.com/", StripMode::None);
        assert!(uri.is_same_base_domain("https://blog.example.com/post"));
        assert!(!uri.is_same_base_domain("https://example.org/"));
        assert!(!uri.is_same_base_domain("::garbage::"));
    }

    #[test]
    fn test_base_domain_override() {
        let uri = view("http://gitbookio.github.io/javascript/", StripMode::None);
        assert_eq!(uri.base_domain, "github.io");

        let lookalike = view("http://www.notgithub.io/", StripMode::None);
        assert_eq!(lookalike.base_domain, "notgithub.io");
    }

    #[test]
    fn test_base_domain_of_ip_and_file() {
        assert_eq!(view("http://127.0.0.1/a", StripMode::None).base_domain, "127.0.0.1");
        assert_eq!(view("file:///C:/dir/file.txt", StripMode::None).base_domain, "");
        assert_eq!(view("file:///C:/dir/file.txt", StripMode::None).host, "");
    }

    #[test]
    fn test_leaf() {
        assert_eq!(leaf("http://x.com/a/b.css"), "b.css");
        assert_eq!(leaf("http://x.com/a/b.css?v=1"), "b.css?v=1");
        assert_eq!(leaf("http://x.com/a/"), "http://x.com/a/");
        assert_eq!(leaf(""), "");
    }

    #[test]
    fn test_unescape_url_chars() {
        assert_eq!(
            unescape_url_chars("http%3A%2F%2Fexample.com%2Fa%3Fb%3D1"),
            "http://example.com/a?b=1"
        );
        assert_eq!(unescape_url_chars("%252F"), "/");
        assert_eq!(unescape_url_chars("%E3%81%82"), "%E3%81%82");
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html").as_deref(),
            Some("https://example.com/path/page.html")
        );
        assert_eq!(
            resolve_url(&base, "/root.html").as_deref(),
            Some("https://example.com/root.html")
        );
        assert_eq!(resolve_url(&base, "  "), None);
    }
}
