//! Static gate configuration. Nothing here changes after the gate is built.

use std::{collections::BTreeSet, time::Duration};
use url::Url;

pub const DEFAULT_TRUSTED_ORIGIN: &str = "https://nextstep-nexn.onrender.com";
pub const DEFAULT_SOURCE_TAG: &str = "nextstep-nexn";
pub const DEFAULT_SITE_NAME: &str = "NextStep";
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Origins permitted as the referrer of a gated page load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowedOriginSet {
    origins: BTreeSet<String>,
}

impl AllowedOriginSet {
    /// Builds the set from URLs, keeping only their tuple origin.
    /// URLs with an opaque origin (e.g. `data:`) are skipped.
    pub fn new<'a>(urls: impl IntoIterator<Item = &'a Url>) -> Self {
        let origins = urls.into_iter().filter_map(origin_of).collect();
        Self { origins }
    }

    /// Parses each entry as a URL.
    ///
    /// # Errors
    /// Returns an error naming the first entry that is not a valid URL.
    pub fn parse<I, S>(entries: I) -> Result<Self, url::ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = entries
            .into_iter()
            .map(|entry| Url::parse(entry.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(&urls))
    }

    /// An absent origin is never a member.
    #[must_use]
    pub fn contains(&self, origin: Option<&str>) -> bool {
        origin.is_some_and(|origin| self.origins.contains(origin))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }
}

/// Serialized `scheme://host[:port]` origin, `None` when the origin is opaque.
pub(crate) fn origin_of(url: &Url) -> Option<String> {
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

#[derive(Clone, Debug)]
pub struct GateConfig {
    pub allowed_origins: AllowedOriginSet,
    pub source_tag: String,
    pub canonical_origin: Url,
    pub site_name: String,
    pub exchange_timeout: Duration,
}

impl GateConfig {
    #[must_use]
    pub fn new(allowed_origins: AllowedOriginSet, canonical_origin: Url) -> Self {
        Self {
            allowed_origins,
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
            canonical_origin,
            site_name: DEFAULT_SITE_NAME.to_string(),
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_source_tag(mut self, tag: impl Into<String>) -> Self {
        self.source_tag = tag.into();
        self
    }

    #[must_use]
    pub fn with_site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = name.into();
        self
    }

    #[must_use]
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        // The default origin is a constant and always parses.
        let canonical = Url::parse(DEFAULT_TRUSTED_ORIGIN)
            .unwrap_or_else(|_| unreachable!("default trusted origin is a valid URL"));
        let allowed = AllowedOriginSet::new([&canonical]);
        Self::new(allowed, canonical)
    }
}
