use crate::server::{
    Result, ServerError, ServerRouter,
    anti_forgery::{self, AntiForgeryGuard},
    auth::{AuthenticatedUser, can_edit},
    json::Json,
    routes::profiles::ProfilePath,
};
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{
    extract::cookie::CookieJar,
    routing::{RouterExt, TypedPath},
};
use blattwerk_common::model::{
    Id, ModelValidationError,
    comment::{Comment, CommentBody, CreateComment},
    group::{Group, GroupMarker},
    post::{CreatePost, Post, PostBody, PostDraft, PostMarker},
};
use blattwerk_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(post_detail)
        .typed_get(create_post_form)
        .typed_post(create_post)
        .typed_get(edit_post_form)
        .typed_post(edit_post)
        .typed_post(add_comment)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/", rejection(ServerError))]
pub(crate) struct PostDetailPath {
    pub id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct PostDetail {
    post: Post,
    comments: Vec<Comment>,
    anti_forgery_token: String,
}

async fn post_detail(
    PostDetailPath { id }: PostDetailPath,
    State(db): State<Arc<DbClient>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<PostDetail>)> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;
    let comments = db.list_post_comments(id).await?;

    let (jar, anti_forgery_token) = anti_forgery::issue(jar);

    Ok((
        jar,
        Json(PostDetail {
            post,
            comments,
            anti_forgery_token,
        }),
    ))
}

/// Fields a client may submit for a post; author and creation time are
/// always set server-side.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
struct PostSubmission {
    text: String,
    group: Option<Id<GroupMarker>>,
    image: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct PostForm {
    groups: Vec<Group>,
    anti_forgery_token: String,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/create/", rejection(ServerError))]
struct CreatePostPath();

async fn create_post_form(
    CreatePostPath(): CreatePostPath,
    State(db): State<Arc<DbClient>>,
    _user: AuthenticatedUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<PostForm>)> {
    let groups = db.list_groups().await?;
    let (jar, anti_forgery_token) = anti_forgery::issue(jar);

    Ok((
        jar,
        Json(PostForm {
            groups,
            anti_forgery_token,
        }),
    ))
}

async fn create_post(
    CreatePostPath(): CreatePostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    _guard: AntiForgeryGuard,
    Json(submission): Json<PostSubmission>,
) -> Result<Redirect> {
    let draft = validated_draft(&db, submission).await?;
    let user = user.into_user();

    db.create_post(&CreatePost {
        author: user.id,
        group: draft.group,
        body: draft.body,
        image: draft.image,
    })
    .await?;

    let profile = ProfilePath {
        username: user.username.to_string(),
    };
    Ok(Redirect::to(&profile.to_string()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/edit/", rejection(ServerError))]
struct EditPostPath {
    id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct EditPostForm {
    post: Post,
    groups: Vec<Group>,
    anti_forgery_token: String,
}

async fn edit_post_form(
    EditPostPath { id }: EditPostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    jar: CookieJar,
) -> Result<Response> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    if !can_edit(&post, user.user()) {
        return Ok(redirect_to_detail(id).into_response());
    }

    let groups = db.list_groups().await?;
    let (jar, anti_forgery_token) = anti_forgery::issue(jar);

    Ok((
        jar,
        Json(EditPostForm {
            post,
            groups,
            anti_forgery_token,
        }),
    )
        .into_response())
}

async fn edit_post(
    EditPostPath { id }: EditPostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    _guard: AntiForgeryGuard,
    Json(submission): Json<PostSubmission>,
) -> Result<Redirect> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    if !can_edit(&post, user.user()) {
        // Soft failure: back to the read-only view, nothing touched.
        debug!(post = %id, actor = %user.user().username, "Non-author edit attempt");
        return Ok(redirect_to_detail(id));
    }

    let draft = validated_draft(&db, submission).await?;
    db.update_post(id, &draft).await?;

    Ok(redirect_to_detail(id))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comment/", rejection(ServerError))]
struct AddCommentPath {
    id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
struct CommentSubmission {
    text: String,
}

/// Always answers with the redirect back to the detail view; an invalid
/// comment is rejected and logged, not stored.
async fn add_comment(
    AddCommentPath { id }: AddCommentPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    _guard: AntiForgeryGuard,
    Json(submission): Json<CommentSubmission>,
) -> Result<Redirect> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    match CommentBody::new(submission.text) {
        Ok(body) => {
            db.create_comment(&CreateComment {
                post: post.id,
                author: user.user().id,
                body,
            })
            .await?;
        }
        Err(error) => {
            warn!(%error, post = %id, "Discarding invalid comment");
        }
    }

    Ok(redirect_to_detail(id))
}

fn redirect_to_detail(id: Id<PostMarker>) -> Redirect {
    Redirect::to(&PostDetailPath { id }.to_string())
}

async fn validated_draft(db: &DbClient, submission: PostSubmission) -> Result<PostDraft> {
    let body = PostBody::new(submission.text).map_err(ModelValidationError::from)?;

    if let Some(group_id) = submission.group
        && db.fetch_group(group_id).await?.is_none()
    {
        return Err(ServerError::UnknownGroupChoice(group_id));
    }

    Ok(PostDraft {
        group: submission.group,
        body,
        image: submission.image,
    })
}
