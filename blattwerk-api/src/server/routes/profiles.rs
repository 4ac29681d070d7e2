use crate::server::{
    Result, ServerError, ServerRouter,
    auth::{AuthenticatedUser, MaybeUser},
    json::Json,
    routes::{PageQuery, feed::FollowIndexPath},
};
use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::routing::{RouterExt, TypedPath};
use blattwerk_common::{
    model::{
        post::Post,
        user::{User, Username},
    },
    pagination::{PAGE_SIZE, Page, paginate},
};
use blattwerk_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(profile)
        .typed_get(profile_follow)
        .typed_get(profile_unfollow)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profile/{username}/", rejection(ServerError))]
pub(crate) struct ProfilePath {
    pub username: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct ProfileFeed {
    author: User,
    /// Whether the requesting viewer already follows this author. Always
    /// `false` for anonymous viewers.
    following: bool,
    posts: Page<Post>,
}

async fn profile(
    ProfilePath { username }: ProfilePath,
    State(db): State<Arc<DbClient>>,
    MaybeUser(viewer): MaybeUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<ProfileFeed>> {
    let author = resolve_author(&db, username).await?;
    let posts = db.list_author_posts(author.id).await?;

    let following = match &viewer {
        Some(viewer) => db.is_following(viewer.id, author.id).await?,
        None => false,
    };

    Ok(Json(ProfileFeed {
        author,
        following,
        posts: paginate(posts, PAGE_SIZE, page.number()),
    }))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profile/{username}/follow/", rejection(ServerError))]
struct ProfileFollowPath {
    username: String,
}

async fn profile_follow(
    ProfileFollowPath { username }: ProfileFollowPath,
    State(db): State<Arc<DbClient>>,
    viewer: AuthenticatedUser,
) -> Result<Redirect> {
    let author = resolve_author(&db, username).await?;
    db.follow(viewer.user().id, author.id).await?;

    Ok(Redirect::to(&FollowIndexPath().to_string()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profile/{username}/unfollow/", rejection(ServerError))]
struct ProfileUnfollowPath {
    username: String,
}

async fn profile_unfollow(
    ProfileUnfollowPath { username }: ProfileUnfollowPath,
    State(db): State<Arc<DbClient>>,
    viewer: AuthenticatedUser,
) -> Result<Redirect> {
    let author = resolve_author(&db, username).await?;
    db.unfollow(viewer.user().id, author.id).await?;

    Ok(Redirect::to(&FollowIndexPath().to_string()))
}

pub(crate) async fn resolve_author(db: &DbClient, raw_username: String) -> Result<User> {
    let Ok(username) = Username::new(raw_username.clone()) else {
        return Err(ServerError::UserByUsernameNotFound(raw_username));
    };

    db.fetch_user_by_username(&username)
        .await?
        .ok_or(ServerError::UserByUsernameNotFound(raw_username))
}
