use crate::{
    api::{Error, PostDetail, PostId, PostSource},
    CommentTree,
};

/// A post along with its threaded comments
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Thread {
    pub post: PostDetail,
    pub comments: CommentTree,
}

impl Thread {
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

pub async fn load_thread<S: PostSource + ?Sized>(
    source: &S,
    post: PostId,
) -> Result<Thread, Error> {
    let (detail, comments) =
        futures::try_join!(source.fetch_post(post), source.fetch_comments(post))?;
    tracing::debug!(?post, num_comments = comments.len(), "loaded thread");
    Ok(Thread {
        post: detail,
        comments: CommentTree::build(comments),
    })
}
