use std::{fmt, str::FromStr};

use crate::SubredditId;

#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Upvotes,
    Comments,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Upvotes => "upvotes",
            SortKey::Comments => "comments",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<SortKey, String> {
        match s {
            "date" => Ok(SortKey::Date),
            "upvotes" => Ok(SortKey::Upvotes),
            "comments" => Ok(SortKey::Comments),
            _ => Err(format!(
                "unknown sort key {s:?}, expected one of date, upvotes, comments"
            )),
        }
    }
}

/// Parameters of one request to the posts listing
///
/// Changing the search term, the subreddit filter or the sort key always
/// brings `page` back to 1, as the result set may have changed size.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct FeedQuery {
    search_term: String,

    /// `None` means all subreddits
    subreddit: Option<SubredditId>,

    sort_key: SortKey,

    /// Always at least 1
    page: u64,
}

impl Default for FeedQuery {
    fn default() -> FeedQuery {
        FeedQuery {
            search_term: String::new(),
            subreddit: None,
            sort_key: SortKey::Date,
            page: 1,
        }
    }
}

impl FeedQuery {
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn subreddit(&self) -> Option<SubredditId> {
        self.subreddit
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    pub fn set_subreddit(&mut self, subreddit: Option<SubredditId>) {
        self.subreddit = subreddit;
        self.page = 1;
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
        self.page = 1;
    }

    /// Sets the page without any upper bound, pages below 1 become 1
    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> FeedQuery {
        self.set_search_term(term);
        self
    }

    pub fn with_subreddit(mut self, subreddit: Option<SubredditId>) -> FeedQuery {
        self.set_subreddit(subreddit);
        self
    }

    pub fn with_sort_key(mut self, sort_key: SortKey) -> FeedQuery {
        self.set_sort_key(sort_key);
        self
    }

    pub fn with_page(mut self, page: u64) -> FeedQuery {
        self.set_page(page);
        self
    }

    /// URL query parameters for the posts listing endpoint
    pub fn to_query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("page", self.page.to_string()),
            ("search", self.search_term.clone()),
            (
                "subreddit",
                self.subreddit.map(|s| s.to_string()).unwrap_or_default(),
            ),
            ("sort", self.sort_key.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let q = FeedQuery::default();
        assert_eq!(q.search_term(), "");
        assert_eq!(q.subreddit(), None);
        assert_eq!(q.sort_key(), SortKey::Date);
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn filter_changes_reset_page() {
        let q = FeedQuery::default().with_page(4).with_search_term("logo");
        assert_eq!(q.page(), 1);
        let q = q.with_page(3).with_subreddit(Some(SubredditId(2)));
        assert_eq!(q.page(), 1);
        let q = q.with_page(7).with_sort_key(SortKey::Comments);
        assert_eq!(q.page(), 1);
        assert_eq!(q.search_term(), "logo");
        assert_eq!(q.subreddit(), Some(SubredditId(2)));
    }

    #[test]
    fn page_zero_becomes_one() {
        assert_eq!(FeedQuery::default().with_page(0).page(), 1);
    }

    #[test]
    fn query_pairs() {
        let q = FeedQuery::default()
            .with_sort_key(SortKey::Upvotes)
            .with_page(3);
        assert_eq!(
            q.to_query_pairs(),
            [
                ("page", String::from("3")),
                ("search", String::new()),
                ("subreddit", String::new()),
                ("sort", String::from("upvotes")),
            ]
        );
        let q = q.with_subreddit(Some(SubredditId(42)));
        assert_eq!(q.to_query_pairs()[2].1, "42");
    }

    #[test]
    fn sort_key_round_trips_through_str() {
        for k in [SortKey::Date, SortKey::Upvotes, SortKey::Comments] {
            assert_eq!(k.as_str().parse::<SortKey>(), Ok(k));
        }
        assert!("hot".parse::<SortKey>().is_err());
    }

    #[test]
    fn any_filter_change_resets_page() {
        // Each step is (operation, page, subreddit, search term)
        bolero::check!()
            .with_type::<Vec<(u8, u64, Option<i64>, String)>>()
            .for_each(|ops| {
                let mut q = FeedQuery::default();
                for (op, page, subreddit, term) in ops {
                    match op % 6 {
                        0 => q.set_search_term(term.clone()),
                        1 => q.set_subreddit(subreddit.map(SubredditId)),
                        2 => q.set_sort_key(SortKey::Date),
                        3 => q.set_sort_key(SortKey::Upvotes),
                        4 => q.set_sort_key(SortKey::Comments),
                        _ => {
                            q.set_page(*page);
                            assert!(q.page() >= 1);
                            continue;
                        }
                    }
                    assert_eq!(q.page(), 1);
                }
            });
    }
}
