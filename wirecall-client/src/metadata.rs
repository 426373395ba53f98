//! Header and trailer metadata.

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};

/// Metadata received from a peer, as header or trailer.
///
/// Thin wrapper around [`HeaderMap`] with string-oriented accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    headers: HeaderMap,
}

impl Metadata {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build metadata from string pairs. Pairs that are not valid header
    /// names or values are skipped.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut headers = HeaderMap::new();
        for (key, value) in pairs {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(key),
                HeaderValue::try_from(value),
            ) {
                headers.append(name, value);
            }
        }
        Self { headers }
    }

    /// Get a value by key. `None` if absent or not valid UTF-8.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        self.headers.get(key).map(|v| v.as_bytes())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.headers.contains_key(key)
    }

    /// All values for a key that appears more than once.
    pub fn get_all(&self, key: &str) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(key)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }
}

impl From<HeaderMap> for Metadata {
    fn from(headers: HeaderMap) -> Self {
        Self::new(headers)
    }
}

impl From<Metadata> for HeaderMap {
    fn from(metadata: Metadata) -> Self {
        metadata.headers
    }
}
