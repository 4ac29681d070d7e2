use crate::model::{
    Id,
    post::PostMarker,
    user::{User, UserMarker},
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub post: Id<PostMarker>,
    pub author: User,
    pub body: CommentBody,
    pub created_at: time::UtcDateTime,
}

/// Post and author are set server-side, never taken from the submitting
/// client.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreateComment {
    pub post: Id<PostMarker>,
    pub author: Id<UserMarker>,
    pub body: CommentBody,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct CommentBody(String);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The comment body must not be empty")]
pub struct EmptyCommentBodyError;

impl CommentBody {
    pub fn new(body: String) -> Result<Self, EmptyCommentBodyError> {
        if body.trim().is_empty() {
            Err(EmptyCommentBodyError)
        } else {
            Ok(CommentBody(body))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for CommentBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::CommentBody;

    #[test]
    fn rejects_whitespace_only_bodies() {
        assert!(CommentBody::new(String::new()).is_err());
        assert!(CommentBody::new("   ".to_owned()).is_err());
        assert!(CommentBody::new("hi".to_owned()).is_ok());
    }
}
