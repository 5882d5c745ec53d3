#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct SubredditId(pub i64);

impl std::fmt::Display for SubredditId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Subreddit {
    pub id: SubredditId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Subreddit {
    /// Parse the subreddits endpoint answer, which is either a bare list or a
    /// paginated object
    pub fn parse_list(body: &[u8]) -> Result<Vec<Subreddit>, crate::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Answer {
            List(Vec<Subreddit>),
            Paginated { results: Vec<Subreddit> },
        }

        match serde_json::from_slice::<Answer>(body) {
            Ok(Answer::List(l)) => Ok(l),
            Ok(Answer::Paginated { results }) => Ok(results),
            Err(e) => Err(crate::Error::MalformedResponse(format!(
                "subreddit data is not a list: {e}"
            ))),
        }
    }
}
