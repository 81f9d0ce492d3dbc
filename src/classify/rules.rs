//! Classification rules and the named predicates they are built from

use crate::classify::DiscoveredLink;
use crate::config::RulesConfig;
use crate::extract::ExtractorKind;
use crate::url::{contains_any, is_from_any_domain, last_segment, path_extension};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static SHORT_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[A-Za-z0-9]{1,5}$").expect("short extension pattern is valid"));

/// Whether the URL's last path segment ends in a 1 to 5 character alphanumeric extension
///
/// URLs with a query string never qualify.
pub fn has_short_extension(url: &Url) -> bool {
    url.query().is_none() && SHORT_EXTENSION.is_match(last_segment(url.path()))
}

/// Whether the URL's path or query contains any of the denied substrings
///
/// The host is not searched, so a site named `nextlevel.example` is not
/// caught by a `next` entry.
pub fn contains_denied_path(url: &Url, denied: &[String]) -> bool {
    match url.query() {
        Some(query) => contains_any(&format!("{}?{}", url.path(), query), denied),
        None => contains_any(url.path(), denied),
    }
}

/// Whether the URL path's extension is in the denied set (case-insensitive)
pub fn has_denied_extension(url: &Url, denied: &[String]) -> bool {
    match path_extension(url) {
        Some(extension) => denied.iter().any(|d| d.eq_ignore_ascii_case(&extension)),
        None => false,
    }
}

/// Whether the URL's host is one of the domains or a subdomain of one
///
/// An empty list allows every host.
pub fn is_from_allowed_domain(url: &Url, domains: &[String]) -> bool {
    is_from_any_domain(url, domains)
}

/// Restrictions on the link URL itself
#[derive(Debug, Clone, Default)]
pub struct UrlPredicate {
    /// Only links whose URL has a short trailing extension
    pub require_short_extension: bool,

    /// Reject URLs containing any of these substrings
    pub denied_substrings: Vec<String>,

    /// Reject URLs whose path extension is in this set
    pub denied_extensions: Vec<String>,

    /// Only hosts within these domains; `None` means any host
    pub allowed_domains: Option<Vec<String>>,
}

impl UrlPredicate {
    pub fn matches(&self, url: &Url) -> bool {
        if self.require_short_extension && !has_short_extension(url) {
            return false;
        }
        if contains_denied_path(url, &self.denied_substrings) {
            return false;
        }
        if has_denied_extension(url, &self.denied_extensions) {
            return false;
        }
        match &self.allowed_domains {
            Some(domains) => is_from_allowed_domain(url, domains),
            None => true,
        }
    }
}

/// Restrictions on the element a link was found in
#[derive(Debug, Clone, Default)]
pub struct TagPredicate {
    /// Accepted element names; empty accepts any element
    pub tags: Vec<String>,

    /// Accepted attribute names; empty accepts any attribute
    pub attributes: Vec<String>,
}

impl TagPredicate {
    pub fn new(tags: &[&str], attributes: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn matches(&self, tag: Option<&str>, attribute: Option<&str>) -> bool {
        accepts(&self.tags, tag) && accepts(&self.attributes, attribute)
    }
}

fn accepts(allowed: &[String], value: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    value.is_some_and(|v| allowed.iter().any(|a| a.eq_ignore_ascii_case(v)))
}

/// One routing rule: which links it accepts and where they go
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub name: String,
    pub url: UrlPredicate,
    pub tag: TagPredicate,
    pub kind: ExtractorKind,
    /// Whether responses fetched through this rule are scanned for more links
    pub follow: bool,
}

impl ClassificationRule {
    pub fn matches(&self, link: &DiscoveredLink) -> bool {
        self.tag
            .matches(link.html_tag.as_deref(), link.html_attribute.as_deref())
            && self.url.matches(&link.url)
    }
}

/// Builds the file, page and video rules from configuration
///
/// # Arguments
///
/// * `config` - The `[rules]` table
/// * `site_domain` - Host of the login URL, used when no allowed domain is configured
pub fn default_rules(config: &RulesConfig, site_domain: &str) -> Vec<ClassificationRule> {
    let allowed_domains = if config.allowed_domains.is_empty() {
        vec![site_domain.to_string()]
    } else {
        config.allowed_domains.clone()
    };

    vec![
        ClassificationRule {
            name: "file".to_string(),
            url: UrlPredicate {
                require_short_extension: true,
                denied_substrings: config.denied_file_paths.clone(),
                denied_extensions: config.denied_file_extensions.clone(),
                allowed_domains: None,
            },
            tag: TagPredicate::new(&["a", "area"], &["href"]),
            kind: ExtractorKind::File,
            follow: false,
        },
        ClassificationRule {
            name: "page".to_string(),
            url: UrlPredicate {
                require_short_extension: false,
                denied_substrings: config.ignored_paths.clone(),
                denied_extensions: config.denied_page_extensions.clone(),
                allowed_domains: Some(allowed_domains),
            },
            tag: TagPredicate::new(&["a", "area"], &["href"]),
            kind: ExtractorKind::Page,
            follow: true,
        },
        ClassificationRule {
            name: "video".to_string(),
            url: UrlPredicate {
                allowed_domains: Some(config.video_domains.clone()),
                ..UrlPredicate::default()
            },
            tag: TagPredicate::new(&["iframe"], &["src", "data-src"]),
            kind: ExtractorKind::Video,
            follow: false,
        },
    ]
}
