use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::service::FeedQuery;

/// This can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn ten() -> u32 {
	FeedQuery::DEFAULT_LIMIT
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page to return (0-indexed).
	#[serde(default)]
	pub page: u32,
	/// The number of posts per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "ten")]
	pub limit: u32,
}

impl From<Paginate> for FeedQuery {
	fn from(paginate: Paginate) -> Self {
		FeedQuery::page(paginate.page, paginate.limit)
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: Uuid,
}
