use axum::http::StatusCode;

use crate::{error, service};

pub mod docs;
pub mod feed;
pub mod model;
pub mod post;
pub mod story;

pub type RouteError = error::RouteError<service::Error>;

impl error::ErrorShape for service::Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
			Self::Validation(..) | Self::EmptyUpdate => StatusCode::BAD_REQUEST,
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::Shared(shared) => error::ErrorShape::status(&**shared),
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::NotAuthenticated => error::Message::new("User not authenticated").into_vec(),
			Self::Validation(errors) => error::validation_messages(errors),
			Self::EmptyUpdate => {
				error::Message::new("Provide at least one of title, body or image_url.").into_vec()
			}
			Self::UnknownPost(post) => error::Message::new("The post you requested does not exist.")
				.detail("post", post.to_string())
				.into_vec(),
			Self::Store(..) => error::internal(),
			Self::Shared(shared) => error::ErrorShape::errors(&**shared),
		}
	}
}
