use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{
	error::{self, ErrorResponse},
	extract::{self, Json},
};

pub const SECURITY_SCHEME_SESSION: &str = "Session";
pub const SECURITY_SCHEME_BEARER: &str = "Bearer";

pub mod tag {
	pub const FEED: &str = "Feed";
	pub const POST: &str = "Post";
	pub const STORY: &str = "Story";
}

fn named_tag(name: &str, description: &str) -> Tag {
	Tag {
		name: name.into(),
		description: Some(description.into()),
		..Default::default()
	}
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Activity Feed")
		.summary("Posts, feed pages and stories for the community activity feed")
		.description(include_str!("../README.md"))
		.tag(named_tag(tag::FEED, "Paginated activity feeds"))
		.tag(named_tag(tag::POST, "Creating and managing posts"))
		.tag(named_tag(tag::STORY, "The stories rail"))
		.security_scheme(
			SECURITY_SCHEME_SESSION,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Cookie,
				name: extract::COOKIE_NAME.into(),
				description: Some("A session cookie".into()),
				extensions: Default::default(),
			},
		)
		.security_scheme(
			SECURITY_SCHEME_BEARER,
			SecurityScheme::Http {
				scheme: "bearer".into(),
				bearer_format: None,
				description: Some("A session id sent as a bearer token".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<ErrorResponse<'static>>, _>(|res| {
			res.example(ErrorResponse {
				success: false,
				errors: error::Message::new("Title is required")
					.field("title")
					.into_vec(),
			})
		})
}
