use serde::Serialize;
use uuid::Uuid;

use crate::model::Story;

/// Placeholders shown while stories load.
pub const SKELETON_COUNT: usize = 5;
pub const EMPTY_TEXT: &str = "No stories";
/// Avatar shown when the author has no picture or no longer exists.
pub const FALLBACK_AVATAR_URL: &str =
	"https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=face";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryCard<'a> {
	pub id: Uuid,
	pub title: &'a str,
	pub image_url: &'a str,
	pub avatar_url: &'a str,
}

impl<'a> From<&'a Story> for StoryCard<'a> {
	fn from(story: &'a Story) -> Self {
		let avatar_url = story
			.accounts
			.as_ref()
			.and_then(|author| author.picture_url.as_deref())
			.filter(|url| !url.is_empty())
			.unwrap_or(FALLBACK_AVATAR_URL);

		Self {
			id: story.id,
			title: &story.title,
			image_url: &story.image_url,
			avatar_url,
		}
	}
}

/// The horizontally scrolling stories rail.
///
/// There is no error state: the stories service already answers failures
/// with an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoriesRail<'a> {
	Loading { skeletons: usize },
	Empty { message: &'static str },
	Stories { cards: Vec<StoryCard<'a>> },
}

impl<'a> StoriesRail<'a> {
	pub fn loading() -> Self {
		Self::Loading {
			skeletons: SKELETON_COUNT,
		}
	}

	pub fn loaded(stories: &'a [Story]) -> Self {
		if stories.is_empty() {
			return Self::Empty {
				message: EMPTY_TEXT,
			};
		}

		Self::Stories {
			cards: stories.iter().map(StoryCard::from).collect(),
		}
	}
}
