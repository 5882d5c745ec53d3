use crate::{SubredditId, Time};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct PostId(pub i64);

/// One entry of the posts listing
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,

    /// The listing endpoint may leave the body out
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub subreddit: Option<SubredditId>,
    pub subreddit_name: String,

    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub comments_count: u64,

    #[serde(default)]
    pub submission_date: Option<Time>,
}

impl PostSummary {
    /// First `max_chars` characters of the body, followed by `...` if cut
    pub fn excerpt(&self, max_chars: usize) -> String {
        let body = match &self.body {
            None => return String::new(),
            Some(b) => b,
        };
        match body.char_indices().nth(max_chars) {
            None => body.clone(),
            Some((cut, _)) => format!("{}...", &body[..cut]),
        }
    }
}

/// A post as returned by the detail endpoint
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,

    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub author: String,

    #[serde(default)]
    pub post_url: Option<String>,
}

/// Page-number paginated answer of the remote API
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}
