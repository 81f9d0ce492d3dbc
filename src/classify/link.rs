use url::Url;

/// A link found in a fetched response, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Absolute target URL
    pub url: Url,

    /// URL of the response the link was found in
    pub originating_response_url: Url,

    /// Referrer of the request that produced the originating response
    pub referrer_header: Option<String>,

    /// Lower-case name of the element carrying the link (`a`, `iframe`, ...)
    pub html_tag: Option<String>,

    /// Attribute the URL was read from (`href`, `src`, ...)
    pub html_attribute: Option<String>,
}

impl DiscoveredLink {
    pub fn new(url: Url, originating_response_url: Url) -> Self {
        Self {
            url,
            originating_response_url,
            referrer_header: None,
            html_tag: None,
            html_attribute: None,
        }
    }

    /// Records the element and attribute the link came from
    pub fn from_element(mut self, tag: &str, attribute: &str) -> Self {
        self.html_tag = Some(tag.to_ascii_lowercase());
        self.html_attribute = Some(attribute.to_ascii_lowercase());
        self
    }

    pub fn with_referrer_header(mut self, referrer: Option<&str>) -> Self {
        self.referrer_header = referrer.map(str::to_string);
        self
    }
}
