mod comment;
pub use comment::{CommentNode, CommentTree, Iter as CommentIter};

mod feed;
pub use feed::{
    Applied, FeedConfig, FeedController, FeedError, FeedErrorKind, FeedPage, FetchRequest,
    FetchResponse,
};

mod pagination;
pub use pagination::{page_links, PageLink};

mod subreddit;
pub use subreddit::SubredditDirectory;

mod thread;
pub use thread::{load_thread, Thread};

pub mod api {
    pub use bountyboard_api::*;
}
