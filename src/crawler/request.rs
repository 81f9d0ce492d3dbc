//! Request and response types exchanged with the fetch engine

use crate::extract::ExtractorKind;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use std::borrow::Cow;
use url::Url;

/// A request for the fetch engine
///
/// Besides what goes on the wire (URL, optional form body, referrer) a request
/// carries its routing: which extractor handles the response and whether the
/// response is scanned for further links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Target URL
    pub url: Url,

    /// Form fields; `Some` turns the request into a urlencoded POST
    pub form: Option<Vec<(String, String)>>,

    /// URL of the page that linked here, sent as the `Referer` header
    pub referrer: Option<String>,

    /// Extractor the response is routed to, if any
    pub extractor: Option<ExtractorKind>,

    /// Whether links found in the response are classified and scheduled
    pub follow: bool,

    /// Schedule even if this URL was already seen
    pub bypass_dedup: bool,
}

impl Request {
    /// A plain GET with no routing
    pub fn get(url: Url) -> Self {
        Self {
            url,
            form: None,
            referrer: None,
            extractor: None,
            follow: false,
            bypass_dedup: false,
        }
    }

    /// A urlencoded form POST
    pub fn post_form(url: Url, fields: Vec<(String, String)>) -> Self {
        Self {
            form: Some(fields),
            ..Self::get(url)
        }
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_extractor(mut self, kind: ExtractorKind) -> Self {
        self.extractor = Some(kind);
        self
    }

    pub fn following(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    pub fn bypassing_dedup(mut self) -> Self {
        self.bypass_dedup = true;
        self
    }

    pub fn is_form_post(&self) -> bool {
        self.form.is_some()
    }
}

/// A fetched response together with the request that produced it
#[derive(Debug, Clone)]
pub struct Response {
    /// Final URL after redirects
    pub url: Url,

    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Raw body bytes
    pub body: Vec<u8>,

    /// The request this response answers
    pub request: Request,
}

impl Response {
    pub fn new(request: Request, url: Url, status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            url,
            status,
            headers,
            body,
            request,
        }
    }

    /// Body decoded as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Referrer of the request that produced this response
    pub fn referrer(&self) -> Option<&str> {
        self.request.referrer.as_deref().filter(|r| !r.is_empty())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Whether the body is HTML and worth scanning for links
    ///
    /// A missing Content-Type counts as HTML.
    pub fn is_html(&self) -> bool {
        match self.content_type() {
            Some(content_type) => {
                let content_type = content_type.to_ascii_lowercase();
                content_type.contains("text/html") || content_type.contains("application/xhtml")
            }
            None => true,
        }
    }
}
