use std::sync::Arc;

use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Query, Session},
	model::FeedPage,
	openapi::tag,
	route::{model::Paginate, RouteError},
	service::{Feed, FeedQuery},
};

/// Get feed
/// Returns one page of every post, newest first.
#[route(tag = tag::FEED)]
pub async fn get_feed(
	State(feed): State<Arc<Feed>>,
	Query(paginate): Query<Paginate>,
) -> Result<Json<FeedPage>, RouteError> {
	Ok(Json(feed.page(paginate.into()).await?))
}

/// Get own feed
/// Returns one page of the signed-in account's posts, newest first.
#[route(tag = tag::FEED, response(status = 401, description = "No valid session"))]
pub async fn get_own_feed(
	State(feed): State<Arc<Feed>>,
	session: Session,
	Query(paginate): Query<Paginate>,
) -> Result<Json<FeedPage>, RouteError> {
	let query = FeedQuery {
		account_id: Some(session.account.id),
		..FeedQuery::from(paginate)
	};

	Ok(Json(feed.page(query).await?))
}
