//! Navigation context captured once per page load.

use super::config::origin_of;
use secrecy::SecretString;
use url::{form_urlencoded, Url};

pub const TOKEN_PARAM: &str = "token";
pub const SOURCE_PARAM: &str = "source";

/// What the page load was given: where it came from and what it carries.
/// Immutable once captured.
#[derive(Debug, Clone, Default)]
pub struct NavigationContext {
    referrer_origin: Option<String>,
    source_tag: Option<String>,
    token: Option<SecretString>,
}

impl NavigationContext {
    /// Captures the context from the page URL and the document referrer.
    #[must_use]
    pub fn capture(page_url: &Url, referrer: Option<&str>) -> Self {
        Self::from_query(page_url.query(), referrer)
    }

    /// Captures the context from a raw query string (without the leading `?`).
    #[must_use]
    pub fn from_query(query: Option<&str>, referrer: Option<&str>) -> Self {
        let mut source_tag = None;
        let mut token = None;

        // First occurrence wins, like URLSearchParams.get.
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                SOURCE_PARAM if source_tag.is_none() => source_tag = Some(value.into_owned()),
                TOKEN_PARAM if token.is_none() => token = Some(value.into_owned()),
                _ => {}
            }
        }

        Self {
            referrer_origin: referrer.and_then(referrer_origin),
            source_tag,
            token: token
                .filter(|value| !value.is_empty())
                .map(SecretString::from),
        }
    }

    #[must_use]
    pub fn new(
        referrer_origin: Option<String>,
        source_tag: Option<String>,
        token: Option<SecretString>,
    ) -> Self {
        Self {
            referrer_origin,
            source_tag,
            token,
        }
    }

    #[must_use]
    pub fn referrer_origin(&self) -> Option<&str> {
        self.referrer_origin.as_deref()
    }

    #[must_use]
    pub fn source_tag(&self) -> Option<&str> {
        self.source_tag.as_deref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}

fn referrer_origin(referrer: &str) -> Option<String> {
    let referrer = referrer.trim();
    if referrer.is_empty() {
        return None;
    }
    Url::parse(referrer).ok().as_ref().and_then(origin_of)
}
