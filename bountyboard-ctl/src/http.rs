use async_trait::async_trait;
use bountyboard_client::api::{
    CommentRecord, Error, FeedQuery, Paginated, PostDetail, PostId, PostSource, PostSummary,
    Subreddit,
};

/// The remote API, reached over HTTP
pub struct HttpPostSource {
    client: reqwest::Client,
    host: String,
}

impl HttpPostSource {
    pub fn new(host: impl Into<String>) -> HttpPostSource {
        let host = host.into();
        HttpPostSource {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>, Error> {
        let url = format!("{}/api/{}", self.host, path);
        tracing::debug!(%url, ?query, "sending request");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::from_status(status, &body));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl PostSource for HttpPostSource {
    async fn fetch_posts(&self, query: &FeedQuery) -> Result<Paginated<PostSummary>, Error> {
        let body = self.get("posts", &query.to_query_pairs()).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_subreddits(&self) -> Result<Vec<Subreddit>, Error> {
        let body = self.get("subreddits", &[]).await?;
        Subreddit::parse_list(&body)
    }

    async fn fetch_post(&self, post: PostId) -> Result<PostDetail, Error> {
        let body = self.get(&format!("posts/{}", post.0), &[]).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_comments(&self, post: PostId) -> Result<Vec<CommentRecord>, Error> {
        let body = self.get(&format!("posts/{}/comments", post.0), &[]).await?;
        serde_json::from_slice(&body).map_err(|e| {
            Error::MalformedResponse(format!("comments of post {} are not a list: {e}", post.0))
        })
    }
}
