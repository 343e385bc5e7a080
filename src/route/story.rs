use std::sync::Arc;

use aide::axum::{routing::get_with, ApiRouter};
use axum::extract::State;
use macros::route;

use crate::{extract::Json, model::Story, openapi::tag, service::Stories, AppState};

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().api_route("/", get_with(list_stories, list_stories_docs))
}

/// List stories
/// Returns up to ten recent posts with an image, newest first. An empty list
/// is returned when stories cannot be loaded.
#[route(tag = tag::STORY)]
pub async fn list_stories(State(stories): State<Arc<Stories>>) -> Json<Vec<Story>> {
	Json(stories.list().await)
}
