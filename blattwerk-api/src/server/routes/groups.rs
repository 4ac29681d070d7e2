use crate::server::{Result, ServerError, ServerRouter, json::Json, routes::PageQuery};
use axum::extract::{Query, State};
use axum_extra::routing::{RouterExt, TypedPath};
use blattwerk_common::{
    model::{
        group::{Group, GroupSlug},
        post::Post,
    },
    pagination::{PAGE_SIZE, Page, paginate},
};
use blattwerk_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(group_feed)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/group/{slug}/", rejection(ServerError))]
struct GroupFeedPath {
    slug: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct GroupFeed {
    group: Group,
    posts: Page<Post>,
}

async fn group_feed(
    GroupFeedPath { slug }: GroupFeedPath,
    State(db): State<Arc<DbClient>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<GroupFeed>> {
    // A slug that fails validation cannot name a group; same outcome as an
    // unknown one.
    let group = match GroupSlug::new(slug.clone()) {
        Ok(slug) => db.fetch_group_by_slug(&slug).await?,
        Err(_) => None,
    }
    .ok_or(ServerError::GroupBySlugNotFound(slug))?;

    let posts = db.list_group_posts(group.id).await?;
    let posts = paginate(posts, PAGE_SIZE, page.number());

    Ok(Json(GroupFeed { group, posts }))
}
