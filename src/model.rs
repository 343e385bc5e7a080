use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single activity post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Post {
	/// The unique identifier of the post.
	pub id: Uuid,
	/// The account that created the post.
	pub account_id: Uuid,
	/// The title of the post.
	pub title: String,
	/// Optional free-form description.
	pub body: Option<String>,
	/// Optional image shown full width on the card and in the stories rail.
	pub image_url: Option<String>,
	/// The challenge this activity counts towards.
	pub challenge_id: Uuid,
	/// The creation time of the post. Feeds are ordered by it, newest first.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The row written when a post is created.
///
/// Empty optional fields are already `None` here; `id` and `created_at`
/// are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
	pub account_id: Uuid,
	pub title: String,
	pub body: Option<String>,
	pub image_url: Option<String>,
	pub challenge_id: Uuid,
}

/// The public profile of an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Account {
	pub id: Uuid,
	/// Display name.
	pub name: Option<String>,
	/// Avatar image.
	pub picture_url: Option<String>,
}

/// Author details embedded into a story.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct StoryAuthor {
	pub name: Option<String>,
	pub picture_url: Option<String>,
}

/// A post with an image, as shown in the stories rail.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Story {
	pub id: Uuid,
	pub title: String,
	pub image_url: String,
	/// The posting account, or `null` when it no longer exists.
	pub accounts: Option<StoryAuthor>,
}

/// One page of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
	/// The posts on this page, newest first.
	pub data: Vec<Post>,
	/// Whether rows exist past the end of this page.
	pub has_more: bool,
	/// The number of rows matching the feed, across all pages.
	pub total_count: u64,
	/// The page index to request next, if any.
	pub next_page: Option<u32>,
}
