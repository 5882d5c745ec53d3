use crate::{PostId, Time};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

/// A comment as sent by the remote API, with a flat reference to its parent
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentRecord {
    pub id: CommentId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<PostId>,

    /// Comment this one answers, `None` for a top-level comment
    #[serde(rename = "parent_comment", alias = "parent_comment_id", default)]
    pub parent_id: Option<CommentId>,

    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub author: String,

    pub body: String,

    #[serde(default)]
    pub upvotes: u64,

    #[serde(rename = "submission_date", default)]
    pub submitted_at: Option<Time>,
}
