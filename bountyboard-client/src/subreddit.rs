use crate::api::{ErrorKind, PostSource, Subreddit, SubredditId};

/// The subreddits offered by the listing's filter
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubredditDirectory {
    subreddits: Vec<Subreddit>,
}

impl SubredditDirectory {
    /// Never fails: without subreddits the filter only offers "all"
    pub async fn load<S: PostSource + ?Sized>(source: &S) -> SubredditDirectory {
        match source.fetch_subreddits().await {
            Ok(subreddits) => SubredditDirectory { subreddits },
            Err(err) => {
                match err.kind() {
                    ErrorKind::MalformedResponse => {
                        tracing::error!(?err, "subreddit data is not a list")
                    }
                    _ => tracing::warn!(?err, "failed fetching subreddits"),
                }
                SubredditDirectory::default()
            }
        }
    }

    pub fn subreddits(&self) -> &[Subreddit] {
        &self.subreddits
    }

    pub fn is_empty(&self) -> bool {
        self.subreddits.is_empty()
    }

    pub fn name(&self, id: SubredditId) -> Option<&str> {
        self.subreddits
            .iter()
            .find(|s| s.id == id)
            .map(|s| &s.name as &str)
    }

    pub fn by_name(&self, name: &str) -> Option<&Subreddit> {
        let name = name.strip_prefix("r/").unwrap_or(name);
        self.subreddits
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}
