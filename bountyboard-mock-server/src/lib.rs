use std::{cmp::Reverse, path::Path};

use anyhow::Context;
use async_trait::async_trait;
use bountyboard_api::{
    CommentRecord, Error, FeedQuery, Paginated, PostDetail, PostId, PostSource, PostSummary,
    SortKey, Subreddit, SubredditId, PAGE_SIZE,
};
use tokio::sync::Mutex;

/// Everything the mock server knows about, as stored in a JSON fixture
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Fixture {
    pub subreddits: Vec<Subreddit>,
    pub posts: Vec<PostDetail>,
    pub comments: Vec<CommentRecord>,
}

impl Fixture {
    pub fn load(path: &Path) -> anyhow::Result<Fixture> {
        let data = std::fs::read(path)
            .with_context(|| format!("reading fixture file {:?}", path))?;
        serde_json::from_slice(&data).with_context(|| format!("parsing fixture file {:?}", path))
    }
}

#[derive(Debug)]
struct State {
    data: Fixture,
    page_size: usize,
    failure: Option<Error>,
}

/// In-memory stand-in for the remote API
pub struct MockServer(Mutex<State>);

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::from_fixture(Fixture::default())
    }

    pub fn from_fixture(data: Fixture) -> MockServer {
        MockServer(Mutex::new(State {
            data,
            page_size: PAGE_SIZE,
            failure: None,
        }))
    }

    pub async fn add_subreddit(&self, s: Subreddit) {
        self.0.lock().await.data.subreddits.push(s);
    }

    pub async fn add_post(&self, p: PostDetail) {
        self.0.lock().await.data.posts.push(p);
    }

    pub async fn add_comment(&self, c: CommentRecord) {
        self.0.lock().await.data.comments.push(c);
    }

    /// Remove all the posts `f` returns true for, along with their comments
    pub async fn remove_posts(&self, f: impl Fn(&PostDetail) -> bool) {
        let mut state = self.0.lock().await;
        let removed = state
            .data
            .posts
            .iter()
            .filter(|p| f(p))
            .map(|p| p.summary.id)
            .collect::<Vec<_>>();
        state.data.posts.retain(|p| !removed.contains(&p.summary.id));
        state
            .data
            .comments
            .retain(|c| !c.post.map(|p| removed.contains(&p)).unwrap_or(false));
    }

    /// Make every request fail with `err` until `None` is set again
    pub async fn set_failure(&self, err: Option<Error>) {
        self.0.lock().await.failure = err;
    }

    pub async fn num_posts(&self) -> usize {
        self.0.lock().await.data.posts.len()
    }

    pub async fn fixture(&self) -> Fixture {
        self.0.lock().await.data.clone()
    }

    async fn state(&self) -> Result<tokio::sync::MutexGuard<'_, State>, Error> {
        let state = self.0.lock().await;
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(state),
        }
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

fn matches(p: &PostDetail, q: &FeedQuery) -> bool {
    if let Some(s) = q.subreddit() {
        if p.summary.subreddit != Some(s) {
            return false;
        }
    }
    let term = q.search_term().to_lowercase();
    term.is_empty()
        || p.summary.title.to_lowercase().contains(&term)
        || p.summary
            .body
            .as_ref()
            .map(|b| b.to_lowercase().contains(&term))
            .unwrap_or(false)
}

fn page_url(page: u64, q: &FeedQuery) -> String {
    let mut res = String::from("/api/posts?");
    for (i, (k, v)) in q.clone().with_page(page).to_query_pairs().iter().enumerate() {
        if i != 0 {
            res.push('&');
        }
        res.push_str(&format!("{k}={v}"));
    }
    res
}

#[async_trait]
impl PostSource for MockServer {
    async fn fetch_posts(&self, q: &FeedQuery) -> Result<Paginated<PostSummary>, Error> {
        let state = self.state().await?;
        let mut posts = state
            .data
            .posts
            .iter()
            .filter(|p| matches(p, q))
            .map(|p| p.summary.clone())
            .collect::<Vec<_>>();
        match q.sort_key() {
            SortKey::Date => posts.sort_by_key(|p| Reverse(p.submission_date)),
            SortKey::Upvotes => posts.sort_by_key(|p| Reverse(p.upvotes)),
            SortKey::Comments => posts.sort_by_key(|p| Reverse(p.comments_count)),
        }

        // The first page always exists, even when empty
        let count = posts.len() as u64;
        let page_size = state.page_size as u64;
        let offset = (q.page() - 1).saturating_mul(page_size);
        if q.page() > 1 && offset >= count {
            tracing::debug!(page = q.page(), count, "mock server answering not found");
            return Err(Error::NotFound);
        }
        let results = posts
            .into_iter()
            .skip(offset as usize)
            .take(state.page_size)
            .collect::<Vec<_>>();
        Ok(Paginated {
            count,
            next: (offset + page_size < count).then(|| page_url(q.page() + 1, q)),
            previous: (q.page() > 1).then(|| page_url(q.page() - 1, q)),
            results,
        })
    }

    async fn fetch_subreddits(&self) -> Result<Vec<Subreddit>, Error> {
        Ok(self.state().await?.data.subreddits.clone())
    }

    async fn fetch_post(&self, post: PostId) -> Result<PostDetail, Error> {
        self.state()
            .await?
            .data
            .posts
            .iter()
            .find(|p| p.summary.id == post)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn fetch_comments(&self, post: PostId) -> Result<Vec<CommentRecord>, Error> {
        let state = self.state().await?;
        if !state.data.posts.iter().any(|p| p.summary.id == post) {
            return Err(Error::NotFound);
        }
        Ok(state
            .data
            .comments
            .iter()
            .filter(|c| c.post == Some(post))
            .cloned()
            .collect())
    }
}

/// Builds a post for tests, with submission dates going back in time as `id`
/// grows
pub fn test_post(id: i64, subreddit: &Subreddit, title: &str, upvotes: u64) -> PostDetail {
    use bountyboard_api::Time;
    let base: Time = "2024-06-01T00:00:00Z".parse().expect("valid constant date");
    PostDetail {
        summary: PostSummary {
            id: PostId(id),
            title: String::from(title),
            body: Some(format!("Body of post {id}")),
            subreddit: Some(subreddit.id),
            subreddit_name: subreddit.name.clone(),
            upvotes,
            comments_count: 0,
            submission_date: Some(base - chrono::Duration::minutes(id)),
        },
        author: format!("author{id}"),
        post_url: None,
    }
}

pub fn test_subreddit(id: i64, name: &str) -> Subreddit {
    Subreddit {
        id: SubredditId(id),
        name: String::from(name),
        description: None,
    }
}
