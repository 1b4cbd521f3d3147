use serde::{Deserialize, Serialize};

/// Visibility flags of a post status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatus {
    /// Status name, e.g. `publish`
    pub name: String,
    /// Visible to everyone
    #[serde(default)]
    pub public: bool,
    /// Visible to the author and to readers of private posts
    #[serde(default)]
    pub private: bool,
    /// Visible to those who may edit the post
    #[serde(default)]
    pub protected: bool,
    /// Used internally, never shown
    #[serde(default)]
    pub internal: bool,
}

impl PostStatus {
    fn flagged(name: &str, public: bool, private: bool, protected: bool, internal: bool) -> Self {
        Self {
            name: name.to_string(),
            public,
            private,
            protected,
            internal,
        }
    }

    /// A publicly visible status
    pub fn public(name: &str) -> Self {
        Self::flagged(name, true, false, false, false)
    }

    /// A status visible to readers of private posts
    pub fn private(name: &str) -> Self {
        Self::flagged(name, false, true, false, false)
    }

    /// A status visible to editors only
    pub fn protected(name: &str) -> Self {
        Self::flagged(name, false, false, true, false)
    }

    /// An internal status
    pub fn internal(name: &str) -> Self {
        Self::flagged(name, false, false, false, true)
    }

    /// The built-in statuses
    pub fn builtins() -> Vec<PostStatus> {
        vec![
            PostStatus::public(PUBLISH),
            PostStatus::protected(FUTURE),
            PostStatus::protected(DRAFT),
            PostStatus::protected(PENDING),
            PostStatus::private(PRIVATE),
            PostStatus::internal(TRASH),
            PostStatus::internal(AUTO_DRAFT),
            PostStatus::internal(INHERIT),
        ]
    }
}

/// Published
pub const PUBLISH: &str = "publish";
/// Scheduled for publication
pub const FUTURE: &str = "future";
/// Draft
pub const DRAFT: &str = "draft";
/// Awaiting review
pub const PENDING: &str = "pending";
/// Private
pub const PRIVATE: &str = "private";
/// In the trash
pub const TRASH: &str = "trash";
/// Created automatically, never saved
pub const AUTO_DRAFT: &str = "auto-draft";
/// Takes the status of the parent post
pub const INHERIT: &str = "inherit";

/// Whether a status counts as published for capability purposes
pub fn is_published(status: &str) -> bool {
    status == PUBLISH || status == FUTURE
}
