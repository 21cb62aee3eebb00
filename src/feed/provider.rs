use crate::emoji::EmojiRecord;
use crate::feed::parser::{parse_feed, ParseResult};
use crate::feed::source::{FeedSource, FetchError};
use thiserror::Error;

/// Published emoji feeds, in the order their records are concatenated.
pub const FEED_NAMES: [&str; 3] = ["emoji-sequences", "emoji-zwj-sequences", "emoji-test"];

/// A feed could not be retrieved. Carries the feed name so callers can tell
/// which source failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("get {feed}: {source}")]
    Fetch {
        feed: String,
        #[source]
        source: FetchError,
    },
}

impl ProviderError {
    /// Name of the feed that failed.
    pub fn feed(&self) -> &str {
        match self {
            ProviderError::Fetch { feed, .. } => feed,
        }
    }
}

/// Turns feed names into emoji records using a [`FeedSource`].
///
/// Feeds are fetched one at a time in the order given. The first fetch
/// failure aborts the whole call and records already parsed are dropped.
#[derive(Debug, Clone)]
pub struct Provider<S> {
    source: S,
}

impl<S: FeedSource> Provider<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// All records from [`FEED_NAMES`]: sequences, then ZWJ sequences, then
    /// the test file.
    pub async fn all_emojis(&self) -> Result<Vec<EmojiRecord>, ProviderError> {
        self.emojis_from(FEED_NAMES).await
    }

    /// Records from the given feeds, concatenated in iteration order.
    pub async fn emojis_from<I, T>(&self, feeds: I) -> Result<Vec<EmojiRecord>, ProviderError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut all = Vec::new();
        for feed in feeds {
            let records = self.emojis(feed.as_ref()).await?;
            all.extend(records);
        }
        Ok(all)
    }

    /// Records from a single feed.
    pub async fn emojis(&self, feed: &str) -> Result<Vec<EmojiRecord>, ProviderError> {
        let bytes = self
            .source
            .fetch(feed)
            .await
            .map_err(|source| ProviderError::Fetch {
                feed: feed.to_string(),
                source,
            })?;

        let text = String::from_utf8_lossy(&bytes);
        let ParseResult { records, skipped } = parse_feed(feed, &text);

        tracing::info!(
            feed = %feed,
            records = records.len(),
            skipped = skipped,
            "Loaded emoji feed"
        );

        Ok(records)
    }
}
