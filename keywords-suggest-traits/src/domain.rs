//! Data types for keywords and the suggestions made for them.

use std::fmt;

use fake::{faker::lorem::en::Words, Fake};
use serde::Serialize;
use thiserror::Error;

/// The providers suggestions are gathered from. The set is closed: every
/// request asks each of these exactly once.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// A general web search engine.
    Google,
    /// A video platform.
    Youtube,
    /// A short-video platform.
    Tiktok,
    /// A photo platform, suggesting hashtags.
    Instagram,
}

impl ProviderId {
    /// Every provider, in the order their fields appear in responses.
    pub const ALL: [ProviderId; 4] = [Self::Google, Self::Youtube, Self::Tiktok, Self::Instagram];

    /// The name used for this provider in responses, logs, and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Youtube => "youtube",
            Self::Tiktok => "tiktok",
            Self::Instagram => "instagram",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

/// A keyword was not usable as a query.
#[derive(Debug, Error, PartialEq)]
#[error("Missing query parameter: q")]
pub struct InvalidKeyword;

/// A validated search keyword: never empty, with surrounding whitespace removed.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    /// Validate a raw query parameter.
    ///
    /// # Errors
    /// If `raw` is missing, or is empty after trimming whitespace.
    pub fn parse(raw: Option<&str>) -> Result<Self, InvalidKeyword> {
        match raw.map(str::trim) {
            Some(trimmed) if !trimmed.is_empty() => Ok(Self(trimmed.to_string())),
            _ => Err(InvalidKeyword),
        }
    }

    /// The keyword as typed, minus surrounding whitespace.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The keyword percent-encoded for use as a URL query value.
    pub fn percent_encoded(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

impl<F> fake::Dummy<F> for Keyword {
    fn dummy_with_rng<R: rand::Rng + ?Sized>(_config: &F, rng: &mut R) -> Self {
        Self(Words(1..4).fake_with_rng::<Vec<String>, R>(rng).join(" "))
    }
}

/// A hashtag suggested by the photo platform.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Hashtag {
    /// The hashtag without the leading `#`.
    pub name: String,
    /// How many posts use the hashtag, if the provider said.
    pub count: Option<u64>,
}

/// A normalized suggestion from any provider.
///
/// Serializes as a bare string for search terms, and as `{name, count}` for
/// hashtags.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Suggestion {
    /// A suggested search term.
    Term(String),
    /// A suggested hashtag.
    Hashtag(Hashtag),
}

impl From<&str> for Suggestion {
    fn from(term: &str) -> Self {
        Self::Term(term.to_string())
    }
}

/// The combined suggestions for one keyword.
///
/// Every provider field is always present in the serialized form, as an
/// array, no matter which providers failed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedResult {
    /// The keyword the suggestions are for.
    pub keyword: Keyword,
    /// Suggestions from the web search engine.
    pub google: Vec<Suggestion>,
    /// Suggestions from the video platform.
    pub youtube: Vec<Suggestion>,
    /// Suggestions from the short-video platform.
    pub tiktok: Vec<Suggestion>,
    /// Hashtags from the photo platform.
    pub instagram: Vec<Suggestion>,
}

impl AggregatedResult {
    /// A result for `keyword` with no suggestions from any provider.
    pub fn empty(keyword: Keyword) -> Self {
        Self {
            keyword,
            google: Vec::new(),
            youtube: Vec::new(),
            tiktok: Vec::new(),
            instagram: Vec::new(),
        }
    }

    /// The suggestion list belonging to `provider`.
    pub fn field_mut(&mut self, provider: ProviderId) -> &mut Vec<Suggestion> {
        match provider {
            ProviderId::Google => &mut self.google,
            ProviderId::Youtube => &mut self.youtube,
            ProviderId::Tiktok => &mut self.tiktok,
            ProviderId::Instagram => &mut self.instagram,
        }
    }
}
