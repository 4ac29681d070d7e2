use crate::model::Id;
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

pub const GROUP_SLUG_MAX_LEN: usize = 64;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct GroupMarker;

/// Administrator-provisioned post category. The slug is the external lookup
/// key and immutable once posts reference the group.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize)]
pub struct Group {
    pub id: Id<GroupMarker>,
    pub slug: GroupSlug,
    pub title: String,
    pub description: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreateGroup {
    pub slug: GroupSlug,
    pub title: String,
    pub description: String,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupSlug(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The group slug is invalid: {0}")]
pub struct InvalidGroupSlugError(String);

impl GroupSlug {
    pub fn new(slug: String) -> Result<Self, InvalidGroupSlugError> {
        let length_ok = !slug.is_empty() && slug.len() <= GROUP_SLUG_MAX_LEN;
        let charset_ok = slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

        if length_ok && charset_ok {
            Ok(GroupSlug(slug))
        } else {
            Err(InvalidGroupSlugError(slug))
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

impl Display for GroupSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::GroupSlug;

    #[test]
    fn accepts_lowercase_digits_dash_underscore() {
        for slug in ["cats", "cats-2", "cat_pictures"] {
            assert!(GroupSlug::new(slug.to_owned()).is_ok(), "{slug}");
        }
    }

    #[test]
    fn rejects_empty_uppercase_and_spaces() {
        for slug in ["", "Cats", "cat pictures", "cats/"] {
            assert!(GroupSlug::new(slug.to_owned()).is_err(), "{slug:?}");
        }
    }
}
