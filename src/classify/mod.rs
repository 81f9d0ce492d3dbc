//! Link classification
//!
//! Every discovered link is tested against every rule. Each rule that matches
//! produces its own route, so one link may be fetched once per extractor kind;
//! a link no rule matches is dropped.

mod link;
mod rules;

pub use link::DiscoveredLink;
pub use rules::{
    contains_denied_path, default_rules, has_denied_extension, has_short_extension,
    is_from_allowed_domain, ClassificationRule, TagPredicate, UrlPredicate,
};

use crate::config::RulesConfig;
use crate::crawler::Request;
use crate::extract::ExtractorKind;

/// A follow-up fetch produced by one matching rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub kind: ExtractorKind,
    pub request: Request,
}

/// Ordered set of classification rules
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    rules: Vec<ClassificationRule>,
}

impl LinkClassifier {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// Builds the standard file, page and video rules
    pub fn from_config(config: &RulesConfig, site_domain: &str) -> Self {
        Self::new(default_rules(config, site_domain))
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Routes a link to every extractor whose rule accepts it
    ///
    /// Each route's request carries the originating response URL as its
    /// referrer, the rule's extractor kind and the rule's follow flag.
    pub fn classify(&self, link: &DiscoveredLink) -> Vec<Route> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(link))
            .map(|rule| {
                tracing::trace!("{} matched rule '{}'", link.url, rule.name);
                Route {
                    kind: rule.kind,
                    request: Request::get(link.url.clone())
                        .with_referrer(link.originating_response_url.as_str())
                        .with_extractor(rule.kind)
                        .following(rule.follow),
                }
            })
            .collect()
    }
}
