use crate::server::ServerRouter;
use axum::Router;
use serde::Deserialize;

mod feed;
mod groups;
mod internal;
mod posts;
mod profiles;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(feed::routes())
        .merge(groups::routes())
        .merge(posts::routes())
        .merge(profiles::routes())
        .merge(internal::routes())
}

/// Lenient `?page=` parameter. Anything that does not parse as a page
/// number falls back to the first page instead of rejecting the request.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    #[must_use]
    pub fn number(&self) -> Option<u64> {
        self.page.as_deref().and_then(|raw| raw.parse().ok())
    }
}
