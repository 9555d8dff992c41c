//! Sender-origin allow-list.

use std::collections::BTreeSet;

use crate::protocol::{TargetOrigin, TargetOriginError};

/// Fixed set of origins whose messages the bridge accepts.
///
/// Comparison is on the serialized tuple origin, so `https://a.example/x`
/// and `https://a.example:443` both match an entry of `https://a.example`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginGuard {
    allowed: BTreeSet<String>,
}

impl OriginGuard {
    /// Guard accepting exactly the given origins.
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = TargetOrigin>) -> Self {
        Self {
            allowed: allowed
                .into_iter()
                .map(|origin| origin.as_str().to_owned())
                .collect(),
        }
    }

    /// Parse a list of origin strings.
    ///
    /// # Errors
    /// Returns the first entry that is not a tuple origin.
    pub fn parse<'a>(entries: impl IntoIterator<Item = &'a str>) -> Result<Self, TargetOriginError> {
        let origins = entries
            .into_iter()
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(TargetOrigin::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(origins))
    }

    /// Whether a sender origin, as reported by the browser, is listed.
    #[must_use]
    pub fn is_trusted(&self, sender: &str) -> bool {
        TargetOrigin::parse(sender)
            .map(|origin| self.allowed.contains(origin.as_str()))
            .unwrap_or(false)
    }

    /// Listed origins in sorted order.
    pub fn allowed(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn guard() -> OriginGuard {
        OriginGuard::parse(["http://localhost:3000", " https://portal.example ", ""])
            .expect("valid allow-list")
    }

    #[rstest]
    #[case("http://localhost:3000", true)]
    #[case("https://portal.example", true)]
    #[case("https://portal.example:443", true)]
    #[case("http://localhost:3001", false)]
    #[case("https://portal.example.evil.test", false)]
    #[case("http://portal.example", false)]
    #[case("null", false)]
    #[case("*", false)]
    #[case("", false)]
    fn evaluates_sender_origins(guard: OriginGuard, #[case] sender: &str, #[case] expected: bool) {
        assert_eq!(guard.is_trusted(sender), expected);
    }

    #[rstest]
    fn rejects_wildcard_entries() {
        assert!(OriginGuard::parse(["http://localhost:3000", "*"]).is_err());
    }

    #[rstest]
    fn blank_entries_are_skipped(guard: OriginGuard) {
        assert_eq!(
            guard.allowed().collect::<Vec<_>>(),
            ["http://localhost:3000", "https://portal.example"]
        );
    }
}
