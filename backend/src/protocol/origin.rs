//! Target origins for outbound messages.

use std::fmt;

use serde::{Serialize, Serializer};
use url::{Origin, Url};

/// Reasons a string cannot be used as a target origin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetOriginError {
    /// The value is not an absolute URL (this covers `*` and `null`).
    #[error("target origin is not an absolute URL: {0}")]
    Unparsable(String),
    /// The URL has an opaque origin, such as `data:` or `file:`.
    #[error("target origin is opaque: {0}")]
    Opaque(String),
}

/// A concrete `scheme://host[:port]` origin.
///
/// Wildcard and opaque origins cannot be represented, so a message can only
/// ever be addressed to one specific frame origin.
///
/// # Examples
/// ```
/// use portal::protocol::TargetOrigin;
///
/// let origin = TargetOrigin::parse("https://portal.example/app/").expect("tuple origin");
/// assert_eq!(origin.as_str(), "https://portal.example");
/// assert!(TargetOrigin::parse("*").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOrigin {
    origin: Origin,
    serialized: String,
}

impl TargetOrigin {
    /// Parse a URL or origin string and keep its tuple origin.
    pub fn parse(value: &str) -> Result<Self, TargetOriginError> {
        let url = Url::parse(value.trim())
            .map_err(|_| TargetOriginError::Unparsable(value.to_owned()))?;
        Self::from_url(&url)
    }

    /// Tuple origin of an already parsed URL.
    pub fn from_url(url: &Url) -> Result<Self, TargetOriginError> {
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(TargetOriginError::Opaque(url.to_string()));
        }
        let serialized = origin.ascii_serialization();
        Ok(Self { origin, serialized })
    }

    /// The parsed origin.
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// ASCII serialization, e.g. `http://localhost:3000`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.serialized
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}

impl Serialize for TargetOrigin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.serialized)
    }
}
