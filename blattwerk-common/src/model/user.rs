use crate::model::Id;
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

pub const USERNAME_MAX_LEN: usize = 150;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

/// A user as the identity collaborator asserts them. Rows are provisioned
/// through [`CreateUser`] upserts, never registered here.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub username: Username,
    pub display_name: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreateUser {
    pub username: Username,
    pub display_name: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The username is invalid: {0}")]
pub struct InvalidUsernameError(String);

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        let length_ok =
            !username.is_empty() && username.chars().count() <= USERNAME_MAX_LEN;
        let charset_ok = username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c));

        if length_ok && charset_ok {
            Ok(Username(username))
        } else {
            Err(InvalidUsernameError(username))
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

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::Username;

    #[test]
    fn accepts_word_characters_and_punctuation() {
        for name in ["leo", "leo.tolstoy", "leo-t", "leo_t", "leo+t@yandex"] {
            assert!(Username::new(name.to_owned()).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_empty_spaces_and_overlong() {
        assert!(Username::new(String::new()).is_err());
        assert!(Username::new("two words".to_owned()).is_err());
        assert!(Username::new("a".repeat(151)).is_err());
    }
}
