//! Upper (parent and top) page lookup service.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Config;
use crate::utils::{BaseDomainResolver, StripMode, UriView};

static INDEX_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/(?:index\.html?)?$").expect("valid index pattern"));

static DRIVE_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(file:///[a-z]:/).+").expect("valid drive pattern"));

/// Service deriving the parent and top pages from a URL alone.
pub struct UpperNavi {
    resolver: BaseDomainResolver,
}

impl UpperNavi {
    pub fn new(config: &Config) -> Self {
        Self {
            resolver: BaseDomainResolver::new(config.base_domain.overrides.clone()),
        }
    }

    /// Upper URLs from the parent up to the top, in order.
    pub fn get_list(&self, url: &str) -> Vec<String> {
        let mut list = Vec::new();
        let mut current = self.parse(url);

        while let Some(uri) = current {
            let Some(parent) = Self::parent_of(&uri) else {
                break;
            };
            if parent == uri.spec || list.contains(&parent) {
                break;
            }
            current = uri.sibling(&parent, StripMode::StripQuery);
            list.push(parent);
        }

        list
    }

    /// URL one level up: the parent directory, or the upper host at the root.
    pub fn get_parent(&self, url: &str) -> Option<String> {
        Self::parent_of(&self.parse(url)?)
    }

    /// Root of the site, or of the drive for local files.
    pub fn get_top(&self, url: &str) -> Option<String> {
        let uri = self.parse(url)?;

        if uri.scheme == "file" {
            return DRIVE_ROOT
                .captures(&uri.spec)
                .and_then(|caps| caps.get(1))
                .map(|root| root.as_str().to_string());
        }

        if uri.has_path() {
            Some(format!("{}/", uri.pre_path))
        } else {
            Self::upper_host(&uri)
        }
    }

    fn parse(&self, url: &str) -> Option<UriView> {
        UriView::parse(url, StripMode::StripQuery, &self.resolver)
    }

    fn parent_of(uri: &UriView) -> Option<String> {
        if !uri.has_path() {
            return Self::upper_host(uri);
        }

        let path = INDEX_TAIL.replace(&uri.path, "");
        let mut segments: Vec<&str> = path.split('/').collect();
        segments.pop();

        let url = format!("{}{}/", uri.pre_path, segments.join("/"));
        (url != "file:///").then_some(url)
    }

    /// `http://www.example.com/` to `http://example.com/`; nothing once the
    /// host is the base domain itself.
    fn upper_host(uri: &UriView) -> Option<String> {
        if uri.host.is_empty() || uri.base_domain == uri.host {
            return None;
        }

        let (_, upper) = uri.host.split_once('.')?;
        Some(format!("{}://{}/", uri.scheme, upper))
    }
}

impl Default for UpperNavi {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_of_directory_and_file() {
        let upper = UpperNavi::default();
        assert_eq!(
            upper.get_parent("http://example.com/a/b/c.html?x=1").as_deref(),
            Some("http://example.com/a/b/")
        );
        assert_eq!(
            upper.get_parent("http://example.com/a/b/").as_deref(),
            Some("http://example.com/a/")
        );
        assert_eq!(
            upper.get_parent("http://example.com/a/index.html").as_deref(),
            Some("http://example.com/")
        );
    }

    #[test]
    fn test_parent_at_root_climbs_host() {
        let upper = UpperNavi::default();
        assert_eq!(
            upper.get_parent("http://www.example.com/").as_deref(),
            Some("http://example.com/")
        );
        assert_eq!(upper.get_parent("http://example.com/"), None);
        assert_eq!(upper.get_parent("http://127.0.0.1/"), None);
    }

    #[test]
    fn test_top() {
        let upper = UpperNavi::default();
        assert_eq!(
            upper.get_top("https://sub.example.com/a/b/c").as_deref(),
            Some("https://sub.example.com/")
        );
        assert_eq!(
            upper.get_top("https://sub.example.com/").as_deref(),
            Some("https://example.com/")
        );
        assert_eq!(
            upper.get_top("file:///C:/dir/file.txt").as_deref(),
            Some("file:///C:/")
        );
        assert_eq!(upper.get_top("file:///home/user/file.txt"), None);
    }

    #[test]
    fn test_list_climbs_to_base_domain() {
        let upper = UpperNavi::default();
        assert_eq!(
            upper.get_list("http://www.example.com/a/b/c.html"),
            vec![
                "http://www.example.com/a/b/",
                "http://www.example.com/a/",
                "http://www.example.com/",
                "http://example.com/",
            ]
        );
    }

    #[test]
    fn test_list_of_local_file_stops_at_root() {
        let upper = UpperNavi::default();
        assert_eq!(
            upper.get_list("file:///C:/dir/file.txt"),
            vec!["file:///C:/dir/", "file:///C:/"]
        );
    }

    #[test]
    fn test_override_suffix_is_the_last_upper_host() {
        let upper = UpperNavi::default();
        assert_eq!(
            upper.get_parent("https://someone.github.io/").as_deref(),
            Some("https://github.io/")
        );
        assert_eq!(upper.get_parent("https://github.io/"), None);
    }
}
