use std::sync::Arc;

use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Session},
	model::Post,
	openapi::tag,
	route::{model::IdInput, RouteError},
	service::{CreatePost, Posts, UpdatePost},
};

/// Get single post
/// Returns a single post by its unique id.
#[route(tag = tag::POST, response(status = 404, description = "No such post"))]
pub async fn get_post(
	State(posts): State<Arc<Posts>>,
	Path(IdInput { id }): Path<IdInput>,
) -> Result<Json<Post>, RouteError> {
	Ok(Json(posts.get(id).await?))
}

/// Create post
/// Creates a post owned by the signed-in account. Empty `body` and
/// `image_url` are stored as null.
#[route(tag = tag::POST, response(status = 401, description = "No valid session"))]
pub async fn create_post(
	State(posts): State<Arc<Posts>>,
	session: Session,
	Json(input): Json<CreatePost>,
) -> Result<Json<Post>, RouteError> {
	Ok(Json(posts.create(Some(&session.account), input).await?))
}

/// Update post
/// Updates a post owned by the signed-in account.
#[route(tag = tag::POST, response(status = 404, description = "No such post owned by the caller"))]
pub async fn update_post(
	State(posts): State<Arc<Posts>>,
	session: Session,
	Path(IdInput { id }): Path<IdInput>,
	Json(patch): Json<UpdatePost>,
) -> Result<Json<Post>, RouteError> {
	Ok(Json(posts.update(Some(&session.account), id, patch).await?))
}

/// Delete post
/// Deletes a post owned by the signed-in account.
#[route(tag = tag::POST, response(status = 404, description = "No such post owned by the caller"))]
pub async fn delete_post(
	State(posts): State<Arc<Posts>>,
	session: Session,
	Path(IdInput { id }): Path<IdInput>,
) -> Result<(), RouteError> {
	posts.delete(Some(&session.account), id).await?;

	Ok(())
}
