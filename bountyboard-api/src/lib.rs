use async_trait::async_trait;
use chrono::Utc;

pub type Time = chrono::DateTime<Utc>;

/// Number of posts the remote listing returns per page
pub const PAGE_SIZE: usize = 10;

mod comment;
pub use comment::{CommentId, CommentRecord};

mod error;
pub use error::{Error, ErrorKind};

mod post;
pub use post::{Paginated, PostDetail, PostId, PostSummary};

mod query;
pub use query::{FeedQuery, SortKey};

mod subreddit;
pub use subreddit::{Subreddit, SubredditId};

/// The remote API, as seen by the client
///
/// Implemented over HTTP by the command line tool and in memory by the mock
/// server.
#[async_trait]
pub trait PostSource {
    /// Fails with `Error::NotFound` when `query.page` is past the last page
    async fn fetch_posts(&self, query: &FeedQuery) -> Result<Paginated<PostSummary>, Error>;
    async fn fetch_subreddits(&self) -> Result<Vec<Subreddit>, Error>;
    async fn fetch_post(&self, post: PostId) -> Result<PostDetail, Error>;
    async fn fetch_comments(&self, post: PostId) -> Result<Vec<CommentRecord>, Error>;
}

#[async_trait]
impl<S: PostSource + Send + Sync + ?Sized> PostSource for std::sync::Arc<S> {
    async fn fetch_posts(&self, query: &FeedQuery) -> Result<Paginated<PostSummary>, Error> {
        (**self).fetch_posts(query).await
    }

    async fn fetch_subreddits(&self) -> Result<Vec<Subreddit>, Error> {
        (**self).fetch_subreddits().await
    }

    async fn fetch_post(&self, post: PostId) -> Result<PostDetail, Error> {
        (**self).fetch_post(post).await
    }

    async fn fetch_comments(&self, post: PostId) -> Result<Vec<CommentRecord>, Error> {
        (**self).fetch_comments(post).await
    }
}

pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Number of pages needed to show `count` items, `0` for an empty listing
pub fn total_pages(count: u64, page_size: usize) -> u64 {
    let page_size = page_size.max(1) as u64;
    (count + page_size - 1) / page_size
}
