use crate::model::{
    Id,
    group::{Group, GroupMarker},
    user::{User, UserMarker},
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: User,
    pub group: Option<Group>,
    pub body: PostBody,
    /// Opaque reference to an uploaded image, resolved by the media
    /// collaborator.
    pub image: Option<String>,
    pub created_at: time::UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreatePost {
    pub author: Id<UserMarker>,
    pub group: Option<Id<GroupMarker>>,
    pub body: PostBody,
    pub image: Option<String>,
}

/// The author-editable part of a post. `created_at` and authorship never
/// change after creation.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostDraft {
    pub group: Option<Id<GroupMarker>>,
    pub body: PostBody,
    pub image: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PostBody(String);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The post body must not be empty")]
pub struct EmptyPostBodyError;

impl PostBody {
    pub fn new(body: String) -> Result<Self, EmptyPostBodyError> {
        if body.trim().is_empty() {
            Err(EmptyPostBodyError)
        } else {
            Ok(PostBody(body))
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

impl Display for PostBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::PostBody;

    #[test]
    fn rejects_whitespace_only_bodies() {
        assert!(PostBody::new(String::new()).is_err());
        assert!(PostBody::new("  \n\t".to_owned()).is_err());
        assert!(PostBody::new("hello".to_owned()).is_ok());
    }
}
