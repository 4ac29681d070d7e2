use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use blattwerk_common::model::{
    post::Post,
    user::{CreateUser, User, Username},
};
use blattwerk_db::client::DbClient;
use std::sync::Arc;

/// Header carrying the username the identity collaborator authenticated.
/// The collaborator fronts this service; the header value is trusted as-is.
pub const IDENTITY_HEADER: &str = "x-identity-user";

/// An identity the collaborator vouched for, resolved to a user row. Rows
/// are provisioned on first sight.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    #[must_use]
    pub fn user(&self) -> &User {
        &self.0
    }

    #[must_use]
    pub fn into_user(self) -> User {
        self.0
    }
}

/// Like [`AuthenticatedUser`], but anonymous requests resolve to `None`
/// instead of being redirected to login.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct MaybeUser(pub Option<User>);

async fn resolve_identity<S>(parts: &Parts, state: &S) -> Result<Option<User>, ServerError>
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    let Some(header_value) = parts.headers.get(IDENTITY_HEADER) else {
        return Ok(None);
    };
    let Some(username) = header_value
        .to_str()
        .ok()
        .and_then(|raw| Username::new(raw.to_owned()).ok())
    else {
        // A malformed assertion counts as anonymous.
        return Ok(None);
    };

    let db_client = Arc::<DbClient>::from_ref(state);
    if let Some(user) = db_client.fetch_user_by_username(&username).await? {
        return Ok(Some(user));
    }

    let user = db_client
        .upsert_user(&CreateUser {
            username,
            display_name: None,
        })
        .await?;
    Ok(Some(user))
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve_identity(parts, state)
            .await?
            .map(Self)
            .ok_or(ServerError::Unauthenticated)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_identity(parts, state).await?))
    }
}

/// Posts are mutable by their author alone.
#[must_use]
pub fn can_edit(post: &Post, actor: &User) -> bool {
    post.author.id == actor.id
}

#[cfg(test)]
mod tests {
    use super::can_edit;
    use blattwerk_common::model::{
        post::{Post, PostBody},
        user::{User, Username},
    };
    use time::macros::utc_datetime;

    fn user(id: i64, username: &str) -> User {
        User {
            id: id.into(),
            username: Username::new(username.to_owned()).unwrap(),
            display_name: None,
        }
    }

    #[test]
    fn only_the_author_can_edit() {
        let author = user(1, "anna");
        let other = user(2, "boris");
        let post = Post {
            id: 1.into(),
            author: author.clone(),
            group: None,
            body: PostBody::new("text".to_owned()).unwrap(),
            image: None,
            created_at: utc_datetime!(2025-06-01 12:00),
        };

        assert!(can_edit(&post, &author));
        assert!(!can_edit(&post, &other));
    }
}
