use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::{Error, Feed};
use crate::{
	model::{Account, NewPost, Post},
	store::{self, Delete, Insert, Row, Select, Store, Update},
	validate,
};

/// Input for creating a post, as submitted by the creation form.
///
/// Empty `body` and `image_url` mean "not provided".
#[derive(Debug, Clone, Default, Deserialize, Validate, JsonSchema)]
pub struct CreatePost {
	/// The title of the post, 1 to 255 characters.
	#[validate(custom(function = "validate::title"))]
	pub title: String,
	/// Optional description, at most 1000 characters.
	#[validate(custom(function = "validate::body"))]
	#[serde(default)]
	pub body: String,
	/// Optional image URL.
	#[validate(custom(function = "validate::image_url"))]
	#[serde(default)]
	pub image_url: String,
	/// The challenge to post to. Defaults to the configured challenge.
	#[serde(default)]
	pub challenge_id: Option<Uuid>,
}

/// A partial update. Absent fields are left alone; an empty `body` or
/// `image_url` clears the field.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdatePost {
	pub title: Option<String>,
	pub body: Option<String>,
	pub image_url: Option<String>,
}

impl UpdatePost {
	pub fn is_empty(&self) -> bool {
		self.title.is_none() && self.body.is_none() && self.image_url.is_none()
	}

	fn into_patch(self) -> Row {
		let mut patch = Row::new();

		if let Some(title) = self.title {
			patch.insert("title".into(), Value::String(title));
		}

		for (column, value) in [("body", self.body), ("image_url", self.image_url)] {
			if let Some(value) = value {
				patch.insert(
					column.into(),
					validate::non_empty(Some(value)).map_or(Value::Null, Value::String),
				);
			}
		}

		patch
	}
}

impl Validate for UpdatePost {
	fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();

		if let Some(Err(error)) = self.title.as_deref().map(validate::title) {
			errors.add("title", error);
		}

		if let Some(Err(error)) = self.body.as_deref().map(validate::body) {
			errors.add("body", error);
		}

		if let Some(Err(error)) = self.image_url.as_deref().map(validate::image_url) {
			errors.add("image_url", error);
		}

		if errors.is_empty() {
			Ok(())
		} else {
			Err(errors)
		}
	}
}

/// Creates, updates and deletes posts.
///
/// Every successful mutation invalidates the cached feed pages; nothing is
/// applied optimistically.
pub struct Posts {
	store: Store,
	table: String,
	default_challenge_id: Uuid,
	feed: Arc<Feed>,
}

impl Posts {
	pub fn new(store: Store, table: String, default_challenge_id: Uuid, feed: Arc<Feed>) -> Self {
		Self {
			store,
			table,
			default_challenge_id,
			feed,
		}
	}

	/// Creates a post owned by `account`.
	///
	/// Invalid input and a missing account are rejected before the store is
	/// contacted.
	#[tracing::instrument(skip_all, err)]
	pub async fn create(&self, account: Option<&Account>, input: CreatePost) -> Result<Post, Error> {
		input.validate()?;

		let account = account.ok_or(Error::NotAuthenticated)?;

		let new = NewPost {
			account_id: account.id,
			title: input.title,
			body: validate::non_empty(Some(input.body)),
			image_url: validate::non_empty(Some(input.image_url)),
			challenge_id: input.challenge_id.unwrap_or(self.default_challenge_id),
		};

		let row = self
			.store
			.insert(Insert::new(&self.table, store::to_row(&new)?))
			.await?;
		let post = store::from_row::<Post>(row)?;

		tracing::info!(post = %post.id, account = %account.id, "created post");
		self.feed.invalidate();

		Ok(post)
	}

	#[tracing::instrument(skip(self), err)]
	pub async fn get(&self, id: Uuid) -> Result<Post, Error> {
		let selected = self
			.store
			.select(Select::from(&self.table).eq("id", id.to_string()).limit(1))
			.await?;

		let row = selected
			.rows
			.into_iter()
			.next()
			.ok_or(Error::UnknownPost(id))?;

		Ok(store::from_row(row)?)
	}

	/// Applies `patch` to a post owned by `account`.
	#[tracing::instrument(skip(self, account), err)]
	pub async fn update(
		&self,
		account: Option<&Account>,
		id: Uuid,
		patch: UpdatePost,
	) -> Result<Post, Error> {
		patch.validate()?;

		if patch.is_empty() {
			return Err(Error::EmptyUpdate);
		}

		let account = account.ok_or(Error::NotAuthenticated)?;

		let rows = self
			.store
			.update(
				Update::table(&self.table, patch.into_patch())
					.eq("id", id.to_string())
					.eq("account_id", account.id.to_string()),
			)
			.await?;

		let row = rows.into_iter().next().ok_or(Error::UnknownPost(id))?;
		let post = store::from_row::<Post>(row)?;

		self.feed.invalidate();

		Ok(post)
	}

	/// Deletes a post owned by `account`.
	#[tracing::instrument(skip(self, account), err)]
	pub async fn delete(&self, account: Option<&Account>, id: Uuid) -> Result<(), Error> {
		let account = account.ok_or(Error::NotAuthenticated)?;

		let deleted = self
			.store
			.delete(
				Delete::from(&self.table)
					.eq("id", id.to_string())
					.eq("account_id", account.id.to_string()),
			)
			.await?;

		if deleted == 0 {
			return Err(Error::UnknownPost(id));
		}

		self.feed.invalidate();

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		service::{FeedQuery, DEFAULT_CHALLENGE_ID},
		test::*,
	};

	fn services(store: &Arc<store::MemoryStore>) -> (Arc<Feed>, Posts) {
		let feed = Arc::new(Feed::new(store.clone(), "log_activites".into(), CACHE));
		let posts = Posts::new(
			store.clone(),
			"log_activites".into(),
			DEFAULT_CHALLENGE_ID,
			Arc::clone(&feed),
		);

		(feed, posts)
	}

	fn input(title: &str) -> CreatePost {
		CreatePost {
			title: title.into(),
			..CreatePost::default()
		}
	}

	#[tokio::test]
	async fn test_create_maps_empty_fields_to_null() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		let (_, posts) = services(&store);

		let post = posts.create(Some(&account), input("Run")).await.unwrap();

		assert_eq!(post.title, "Run");
		assert_eq!(post.body, None);
		assert_eq!(post.image_url, None);
		assert_eq!(post.challenge_id, DEFAULT_CHALLENGE_ID);
		assert_eq!(post.account_id, account.id);
	}

	#[tokio::test]
	async fn test_create_keeps_provided_fields() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		let (_, posts) = services(&store);
		let challenge = Uuid::new_v4();

		let post = posts
			.create(
				Some(&account),
				CreatePost {
					title: "Ride".into(),
					body: "40km".into(),
					image_url: "https://example.com/ride.jpg".into(),
					challenge_id: Some(challenge),
				},
			)
			.await
			.unwrap();

		assert_eq!(post.body.as_deref(), Some("40km"));
		assert_eq!(post.image_url.as_deref(), Some("https://example.com/ride.jpg"));
		assert_eq!(post.challenge_id, challenge);
	}

	#[tokio::test]
	async fn test_create_without_account_issues_no_request() {
		let store = memory_store();
		let (_, posts) = services(&store);
		let requests = store.requests();

		let error = posts.create(None, input("Run")).await.unwrap_err();

		assert!(matches!(error, Error::NotAuthenticated));
		assert_eq!(error.to_string(), "User not authenticated");
		assert_eq!(store.requests(), requests);
	}

	#[tokio::test]
	async fn test_invalid_input_issues_no_request() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		let (_, posts) = services(&store);
		let requests = store.requests();

		let cases = [
			input(""),
			input(&"a".repeat(256)),
			CreatePost {
				body: "a".repeat(1001),
				..input("Run")
			},
			CreatePost {
				image_url: "not a url".into(),
				..input("Run")
			},
		];

		for case in cases {
			let error = posts.create(Some(&account), case).await.unwrap_err();
			assert!(matches!(error, Error::Validation(..)));
		}

		assert_eq!(store.requests(), requests);
	}

	#[tokio::test]
	async fn test_created_post_appears_in_next_feed_read() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		seed_posts(&store, account.id, 3).await;
		let (feed, posts) = services(&store);

		let before = feed.page(FeedQuery::default()).await.unwrap();
		assert_eq!(before.total_count, 3);

		let post = posts.create(Some(&account), input("Swim")).await.unwrap();

		let after = feed.page(FeedQuery::default()).await.unwrap();
		assert_eq!(after.total_count, 4);
		assert_eq!(after.data[0], post);
	}

	#[tokio::test]
	async fn test_update_patches_and_clears() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		let (_, posts) = services(&store);

		let post = posts
			.create(
				Some(&account),
				CreatePost {
					body: "old".into(),
					..input("Run")
				},
			)
			.await
			.unwrap();

		let updated = posts
			.update(
				Some(&account),
				post.id,
				UpdatePost {
					title: Some("Long run".into()),
					body: Some(String::new()),
					image_url: None,
				},
			)
			.await
			.unwrap();

		assert_eq!(updated.title, "Long run");
		assert_eq!(updated.body, None);
		assert_eq!(updated.created_at, post.created_at);
		assert_eq!(posts.get(post.id).await.unwrap(), updated);
	}

	#[tokio::test]
	async fn test_update_rejects_empty_and_invalid_patches() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		let (_, posts) = services(&store);
		let id = Uuid::new_v4();

		let empty = posts
			.update(Some(&account), id, UpdatePost::default())
			.await
			.unwrap_err();
		assert!(matches!(empty, Error::EmptyUpdate));

		let invalid = posts
			.update(
				Some(&account),
				id,
				UpdatePost {
					title: Some(String::new()),
					..UpdatePost::default()
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(invalid, Error::Validation(..)));
	}

	#[tokio::test]
	async fn test_mutations_are_scoped_to_owner() {
		let store = memory_store();
		let ada = seed_account(&store, "Ada").await;
		let bob = seed_account(&store, "Bob").await;
		let (_, posts) = services(&store);

		let post = posts.create(Some(&ada), input("Run")).await.unwrap();

		let update = posts
			.update(
				Some(&bob),
				post.id,
				UpdatePost {
					title: Some("mine".into()),
					..UpdatePost::default()
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(update, Error::UnknownPost(id) if id == post.id));

		let delete = posts.delete(Some(&bob), post.id).await.unwrap_err();
		assert!(matches!(delete, Error::UnknownPost(..)));

		posts.delete(Some(&ada), post.id).await.unwrap();
		assert!(matches!(
			posts.get(post.id).await.unwrap_err(),
			Error::UnknownPost(..)
		));
	}

	#[tokio::test]
	async fn test_delete_invalidates_feed() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		let (feed, posts) = services(&store);

		let post = posts.create(Some(&account), input("Run")).await.unwrap();
		assert_eq!(feed.page(FeedQuery::default()).await.unwrap().total_count, 1);

		posts.delete(Some(&account), post.id).await.unwrap();
		assert_eq!(feed.page(FeedQuery::default()).await.unwrap().total_count, 0);
	}
}
