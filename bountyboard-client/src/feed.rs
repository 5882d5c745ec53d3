use std::sync::Arc;

use crate::{
    api::{
        self, Error, ErrorKind, FeedQuery, Paginated, PostSource, PostSummary, SortKey,
        SubredditId, PAGE_SIZE,
    },
    page_links, PageLink,
};

/// Message shown when the requested page vanished from under the listing
pub const NO_MORE_POSTS: &str = "No more posts available";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FeedConfig {
    /// Number of posts the remote source returns per page
    pub page_size: usize,

    /// How many pages `FeedController::fetch` steps back when pages keep
    /// disappearing, before giving the hand back to the caller
    pub max_corrections: usize,
}

impl Default for FeedConfig {
    fn default() -> FeedConfig {
        FeedConfig {
            page_size: PAGE_SIZE,
            max_corrections: 16,
        }
    }
}

/// The last successfully fetched page of the listing
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeedPage {
    pub items: Vec<PostSummary>,
    pub total_count: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

impl FeedPage {
    /// Pagination controls are only shown when there is more than one page
    pub fn shows_pagination(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn page_links(&self) -> Vec<PageLink> {
        page_links(self.current_page, self.total_pages)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeedErrorKind {
    /// The page ran out of posts, the controller already stepped back
    NoMorePosts,

    /// The last fetch failed, the previously shown page is kept
    Request,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeedError {
    pub kind: FeedErrorKind,
    pub message: String,
}

/// A fetch issued by the controller, to be sent to a `PostSource`
#[must_use = "a fetch request does nothing until sent and applied"]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchRequest {
    seq: u64,
    query: FeedQuery,
}

impl FetchRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    /// Runs the request, without touching the controller that issued it
    pub async fn send<S: PostSource + ?Sized>(self, source: &S) -> FetchResponse {
        let result = source.fetch_posts(&self.query).await;
        FetchResponse {
            seq: self.seq,
            query: self.query,
            result,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchResponse {
    seq: u64,
    query: FeedQuery,
    result: Result<Paginated<PostSummary>, Error>,
}

impl FetchResponse {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    pub fn result(&self) -> &Result<Paginated<PostSummary>, Error> {
        &self.result
    }
}

/// What applying a response did to the controller
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Applied {
    /// The page was replaced
    Updated,

    /// The page did not exist, the controller stepped back one page and wants
    /// this request sent next
    Corrected(FetchRequest),

    /// Page 1 did not exist, there is nothing left to step back to
    NoMorePosts,

    /// The fetch failed, the error state is set and the page left untouched
    Failed,

    /// A more recent fetch was issued since, the response was discarded
    Stale,
}

/// State machine behind the searchable, filterable, paginated posts listing
///
/// Every state change returns a `FetchRequest`. Requests may be sent and
/// their responses applied in any order: only the response to the most
/// recently issued request is ever taken into account.
pub struct FeedController<S: ?Sized> {
    source: Arc<S>,
    config: FeedConfig,
    query: FeedQuery,
    page: Option<FeedPage>,
    error: Option<FeedError>,

    /// Sequence number of the last issued request
    last_seq: u64,
    loading: bool,
}

impl<S: PostSource + Send + Sync + ?Sized> FeedController<S> {
    pub fn new(source: Arc<S>) -> FeedController<S> {
        FeedController::with_config(source, FeedConfig::default())
    }

    pub fn with_config(source: Arc<S>, config: FeedConfig) -> FeedController<S> {
        FeedController {
            source,
            config,
            query: FeedQuery::default(),
            page: None,
            error: None,
            last_seq: 0,
            loading: false,
        }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    /// `None` until the first fetch succeeds
    pub fn page(&self) -> Option<&FeedPage> {
        self.page.as_ref()
    }

    pub fn items(&self) -> &[PostSummary] {
        self.page.as_ref().map(|p| &p.items as &[_]).unwrap_or(&[])
    }

    /// `None` as long as no fetch succeeded
    pub fn total_pages(&self) -> Option<u64> {
        self.page.as_ref().map(|p| p.total_pages)
    }

    pub fn error(&self) -> Option<&FeedError> {
        self.error.as_ref()
    }

    /// Whether the last issued request is still waiting for its response
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn issue(&mut self) -> FetchRequest {
        self.last_seq += 1;
        self.loading = true;
        tracing::debug!(seq = self.last_seq, query = ?self.query, "issuing posts fetch");
        FetchRequest {
            seq: self.last_seq,
            query: self.query.clone(),
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) -> FetchRequest {
        self.query.set_search_term(term);
        self.issue()
    }

    pub fn set_subreddit(&mut self, subreddit: Option<SubredditId>) -> FetchRequest {
        self.query.set_subreddit(subreddit);
        self.issue()
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) -> FetchRequest {
        self.query.set_sort_key(sort_key);
        self.issue()
    }

    /// Clamps `page` to the known page range before fetching it
    ///
    /// Before the first successful fetch the number of pages is not known, so
    /// only the lower bound is enforced and the remote source gets the final
    /// word.
    pub fn set_page(&mut self, page: i64) -> FetchRequest {
        let page = u64::try_from(page).unwrap_or(0).max(1);
        let page = match self.total_pages() {
            Some(total) => page.min(total.max(1)),
            None => page,
        };
        self.query.set_page(page);
        self.issue()
    }

    /// Replaces the whole query at once, eg. when restoring a listing from a
    /// link
    ///
    /// The page is clamped the same way `set_page` does it.
    pub fn set_query(&mut self, query: FeedQuery) -> FetchRequest {
        let page = i64::try_from(query.page()).unwrap_or(i64::MAX);
        self.query = query;
        self.set_page(page)
    }

    /// Fetch the current query again, eg. after a failure
    pub fn refresh(&mut self) -> FetchRequest {
        self.issue()
    }

    pub fn apply(&mut self, resp: FetchResponse) -> Applied {
        if resp.seq != self.last_seq {
            tracing::info!(
                seq = resp.seq,
                last_seq = self.last_seq,
                "discarding stale posts response"
            );
            return Applied::Stale;
        }
        self.loading = false;

        match resp.result {
            Ok(data) => {
                let total_pages = api::total_pages(data.count, self.config.page_size);
                tracing::debug!(
                    seq = resp.seq,
                    count = data.count,
                    total_pages,
                    "applying posts page"
                );
                self.page = Some(FeedPage {
                    items: data.results,
                    total_count: data.count,
                    current_page: resp.query.page(),
                    total_pages,
                });
                self.error = None;
                Applied::Updated
            }
            Err(Error::NotFound) => {
                let requested = resp.query.page();
                let corrected = requested.saturating_sub(1).max(1);
                self.query.set_page(corrected);
                if let Some(page) = &mut self.page {
                    page.items.clear();
                    page.current_page = corrected;
                }
                self.error = Some(FeedError {
                    kind: FeedErrorKind::NoMorePosts,
                    message: String::from(NO_MORE_POSTS),
                });
                if corrected == requested {
                    tracing::info!(page = requested, "first page of posts does not exist");
                    Applied::NoMorePosts
                } else {
                    tracing::info!(
                        requested,
                        corrected,
                        "posts page does not exist, stepping back"
                    );
                    Applied::Corrected(self.issue())
                }
            }
            Err(err) => {
                match err.kind() {
                    ErrorKind::MalformedResponse => {
                        tracing::error!(?err, "received malformed posts listing")
                    }
                    _ => tracing::warn!(?err, "failed fetching posts"),
                }
                self.error = Some(FeedError {
                    kind: FeedErrorKind::Request,
                    message: err.to_string(),
                });
                Applied::Failed
            }
        }
    }

    /// Sends `req` and applies its response, following page corrections up to
    /// the configured limit
    pub async fn fetch(&mut self, req: FetchRequest) -> Applied {
        let mut req = req;
        let mut corrections = 0;
        loop {
            let resp = req.send(&*self.source).await;
            match self.apply(resp) {
                Applied::Corrected(next) if corrections < self.config.max_corrections => {
                    corrections += 1;
                    req = next;
                }
                res => return res,
            }
        }
    }

    /// Fetches the current query, typically for the first load
    pub async fn load(&mut self) -> Applied {
        let req = self.refresh();
        self.fetch(req).await
    }
}
