//! Booking URL construction
//!
//! Calendly-style providers pre-fill custom questions from query
//! parameters; the first question is `a1`. URLs are practically capped
//! around 2000 characters, so the embedded description is truncated to
//! 1500 and the full text goes to the stores instead.

use url::Url;

use lexai_core::DescriptionStore;

use crate::BookingError;

/// Maximum description length (chars) embedded in the URL
pub const MAX_DESCRIPTION_LEN: usize = 1500;

/// Durable-store key holding the most recent description
pub const LAST_DESCRIPTION_KEY: &str = "last_calendly_description";

/// Session-store key holding the current description
pub const SESSION_DESCRIPTION_KEY: &str = "calendly_description";

/// Builds booking URLs with an embedded case description
#[derive(Debug, Clone)]
pub struct BookingLinkBuilder {
    base_url: Url,
}

impl BookingLinkBuilder {
    /// Create a builder for the configured booking URL
    ///
    /// The base URL may already carry query parameters (month pre-selection
    /// and similar); they are preserved on every built link.
    pub fn new(base_url: &str) -> Result<Self, BookingError> {
        let base_url = Url::parse(base_url).map_err(|e| BookingError::InvalidUrl(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(BookingError::InvalidUrl(format!(
                "unsupported scheme: {}",
                base_url.scheme()
            )));
        }
        Ok(Self { base_url })
    }

    /// Build a booking URL carrying the (possibly truncated) description
    ///
    /// The value is encoded exactly once by the query serializer; any
    /// pre-existing `a1` is replaced, all other parameters survive.
    pub fn build(&self, description: &str) -> String {
        let embedded = truncate_description(description);

        let mut url = self.base_url.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "a1")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("a1", &embedded);

        url.to_string()
    }

    /// Persist the untruncated description, then build the URL
    ///
    /// The full text is written to the durable store under a
    /// timestamp-namespaced key and under [`LAST_DESCRIPTION_KEY`], and to
    /// the session store under [`SESSION_DESCRIPTION_KEY`]. Store failures
    /// are logged and never block the hand-off.
    pub async fn build_and_persist(
        &self,
        description: &str,
        durable: &dyn DescriptionStore,
        session: &dyn DescriptionStore,
    ) -> String {
        let stamp = chrono::Utc::now().timestamp_millis();
        let stamped_key = format!("calendly_desc_{stamp}");

        for (store, key) in [
            (durable, stamped_key.as_str()),
            (durable, LAST_DESCRIPTION_KEY),
            (session, SESSION_DESCRIPTION_KEY),
        ] {
            if let Err(e) = store.set(key, description).await {
                tracing::warn!(key, error = %e, "failed to persist description");
            }
        }

        self.build(description)
    }
}

/// Truncate to the URL-safe cap, appending `...` when cut
fn truncate_description(description: &str) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_LEN {
        return description.to_string();
    }
    let truncated: String = description.chars().take(MAX_DESCRIPTION_LEN).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    const BASE: &str = "https://calendly.com/exemplo/30min/?month=2026-01";

    fn param(url: &str, key: &str) -> Option<String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(BookingLinkBuilder::new("not a url").is_err());
        assert!(BookingLinkBuilder::new("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_preserves_existing_params() {
        let builder = BookingLinkBuilder::new(BASE).unwrap();
        let link = builder.build("descrição do caso");

        assert_eq!(param(&link, "month").as_deref(), Some("2026-01"));
        assert_eq!(param(&link, "a1").as_deref(), Some("descrição do caso"));
    }

    #[test]
    fn test_encodes_exactly_once() {
        let builder = BookingLinkBuilder::new(BASE).unwrap();
        let link = builder.build("ação & reunião: 50%");

        // Decoding the parameter back out yields the original text
        assert_eq!(param(&link, "a1").as_deref(), Some("ação & reunião: 50%"));
        assert!(!link.contains("%25C3"), "double-encoded value in {link}");
    }

    #[test]
    fn test_truncates_long_descriptions() {
        let builder = BookingLinkBuilder::new(BASE).unwrap();
        let long = "x".repeat(4000);
        let link = builder.build(&long);

        let embedded = param(&link, "a1").unwrap();
        assert_eq!(embedded.chars().count(), MAX_DESCRIPTION_LEN + 3);
        assert!(embedded.ends_with("..."));
        // Prefix of the original, never corrupted
        assert!(long.starts_with(embedded.trim_end_matches("...")));
    }

    #[test]
    fn test_replaces_previous_a1() {
        let builder = BookingLinkBuilder::new(&format!("{BASE}&a1=antigo")).unwrap();
        let link = builder.build("novo");

        let url = Url::parse(&link).unwrap();
        let a1s: Vec<_> = url.query_pairs().filter(|(k, _)| k == "a1").collect();
        assert_eq!(a1s.len(), 1);
        assert_eq!(a1s[0].1, "novo");
    }

    #[tokio::test]
    async fn test_persists_full_description() {
        let durable = InMemoryStore::new();
        let session = InMemoryStore::new();
        let builder = BookingLinkBuilder::new(BASE).unwrap();

        let long = "y".repeat(2000);
        let link = builder.build_and_persist(&long, &durable, &session).await;

        // URL carries the truncated text, stores the full text
        assert_eq!(
            param(&link, "a1").unwrap().chars().count(),
            MAX_DESCRIPTION_LEN + 3
        );
        assert_eq!(durable.get(LAST_DESCRIPTION_KEY).as_deref(), Some(&long[..]));
        assert_eq!(
            session.get(SESSION_DESCRIPTION_KEY).as_deref(),
            Some(&long[..])
        );
        assert!(durable
            .keys()
            .iter()
            .any(|k| k.starts_with("calendly_desc_")));
    }
}
