use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    cache::{INDEX_FEED_KEY, ResponseCache},
    json::{Json, RawJson},
    routes::PageQuery,
};
use axum::extract::{Query, State};
use axum_extra::routing::{RouterExt, TypedPath};
use blattwerk_common::{
    model::post::Post,
    pagination::{PAGE_SIZE, Page, paginate},
};
use blattwerk_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(index).typed_get(follow_index)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/", rejection(ServerError))]
struct IndexPath();

/// Landing feed. The rendered body is cached for the configured interval,
/// keyed independent of query parameters, so a fresh post may lag behind.
async fn index(
    IndexPath(): IndexPath,
    State(db): State<Arc<DbClient>>,
    State(cache): State<Arc<ResponseCache>>,
    Query(page): Query<PageQuery>,
) -> Result<RawJson> {
    if let Some(body) = cache.get(INDEX_FEED_KEY).await {
        return Ok(RawJson(body));
    }

    let posts = db.list_posts().await?;
    let page = paginate(posts, PAGE_SIZE, page.number());
    let body = serde_json::to_string(&page)?;
    cache.put(INDEX_FEED_KEY, body.clone()).await;

    Ok(RawJson(body))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/follow/", rejection(ServerError))]
pub(crate) struct FollowIndexPath();

async fn follow_index(
    FollowIndexPath(): FollowIndexPath,
    State(db): State<Arc<DbClient>>,
    viewer: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Post>>> {
    let posts = db.list_followed_posts(viewer.user().id).await?;

    Ok(Json(paginate(posts, PAGE_SIZE, page.number())))
}
