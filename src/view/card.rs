use serde::Serialize;
use uuid::Uuid;

use crate::model::Post;

/// What a feed card shows for one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCard<'a> {
	pub id: Uuid,
	pub title: &'a str,
	/// Only present when the post has a non-empty body.
	pub body: Option<&'a str>,
	/// Shown full width below the body.
	pub image_url: Option<&'a str>,
}

fn shown(value: Option<&String>) -> Option<&str> {
	value.map(String::as_str).filter(|value| !value.is_empty())
}

impl<'a> From<&'a Post> for PostCard<'a> {
	fn from(post: &'a Post) -> Self {
		Self {
			id: post.id,
			title: &post.title,
			body: shown(post.body.as_ref()),
			image_url: shown(post.image_url.as_ref()),
		}
	}
}
