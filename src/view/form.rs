use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{service::CreatePost, validate::FieldErrors};

pub const SUBMIT_TEXT: &str = "Create Post";
pub const PENDING_TEXT: &str = "Creating...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
	Title,
	Body,
	ImageUrl,
}

impl Field {
	pub fn name(self) -> &'static str {
		match self {
			Self::Title => "title",
			Self::Body => "body",
			Self::ImageUrl => "image_url",
		}
	}
}

/// The post creation form shown in the create modal.
///
/// Errors are recomputed on every edit. While a submission is pending the
/// form can be neither submitted nor cancelled.
#[derive(Debug, Clone, Default)]
pub struct CreatePostForm {
	input: CreatePost,
	errors: FieldErrors,
	pending: bool,
}

impl CreatePostForm {
	/// An empty form posting to `challenge_id`, or to the default challenge.
	pub fn new(challenge_id: Option<Uuid>) -> Self {
		Self {
			input: CreatePost {
				challenge_id,
				..CreatePost::default()
			},
			..Self::default()
		}
	}

	pub fn value(&self, field: Field) -> &str {
		match field {
			Field::Title => &self.input.title,
			Field::Body => &self.input.body,
			Field::ImageUrl => &self.input.image_url,
		}
	}

	pub fn set(&mut self, field: Field, value: impl Into<String>) {
		let value = value.into();

		match field {
			Field::Title => self.input.title = value,
			Field::Body => self.input.body = value,
			Field::ImageUrl => self.input.image_url = value,
		}

		self.errors = self.check();
	}

	fn check(&self) -> FieldErrors {
		match self.input.validate() {
			Ok(()) => FieldErrors::default(),
			Err(errors) => FieldErrors::from(&errors),
		}
	}

	/// The message to show under `field`, if any.
	pub fn error(&self, field: Field) -> Option<&str> {
		self.errors.first(field.name())
	}

	pub fn is_valid(&self) -> bool {
		self.check().is_empty()
	}

	pub fn is_pending(&self) -> bool {
		self.pending
	}

	pub fn can_submit(&self) -> bool {
		!self.pending && self.is_valid()
	}

	pub fn can_cancel(&self) -> bool {
		!self.pending
	}

	pub fn submit_label(&self) -> &'static str {
		if self.pending {
			PENDING_TEXT
		} else {
			SUBMIT_TEXT
		}
	}

	/// Starts a submission, returning the input to send.
	///
	/// Returns `None` and shows the field errors when the input is invalid,
	/// or when a submission is already pending.
	pub fn submit(&mut self) -> Option<CreatePost> {
		if self.pending {
			return None;
		}

		self.errors = self.check();

		if !self.errors.is_empty() {
			return None;
		}

		self.pending = true;

		Some(self.input.clone())
	}

	/// The post was created: clear the form for the next one.
	pub fn succeeded(&mut self) {
		*self = Self::new(self.input.challenge_id);
	}

	/// The post was not created: keep the input and allow another try.
	pub fn failed(&mut self) {
		self.pending = false;
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::service::DEFAULT_CHALLENGE_ID;

	#[test]
	fn test_starts_invalid_without_errors_shown() {
		let form = CreatePostForm::new(None);

		assert!(!form.can_submit());
		assert_eq!(form.error(Field::Title), None);
		assert_eq!(form.submit_label(), "Create Post");
	}

	#[test]
	fn test_errors_follow_edits() {
		let mut form = CreatePostForm::new(None);

		form.set(Field::Title, "a".repeat(256));
		assert_eq!(form.error(Field::Title), Some("Title too long"));

		form.set(Field::Title, "Run");
		form.set(Field::ImageUrl, "nope");
		assert_eq!(form.error(Field::Title), None);
		assert_eq!(form.error(Field::ImageUrl), Some("Invalid URL"));
		assert!(!form.can_submit());

		form.set(Field::ImageUrl, "");
		form.set(Field::Body, "b".repeat(1001));
		assert_eq!(form.error(Field::Body), Some("Description too long"));
	}

	#[test]
	fn test_invalid_submit_shows_errors() {
		let mut form = CreatePostForm::new(None);

		assert!(form.submit().is_none());
		assert_eq!(form.error(Field::Title), Some("Title is required"));
		assert!(!form.is_pending());
	}

	#[test]
	fn test_pending_then_success_resets() {
		let mut form = CreatePostForm::new(Some(DEFAULT_CHALLENGE_ID));
		form.set(Field::Title, "Run");
		form.set(Field::Body, "easy 5k");

		let input = form.submit().unwrap();
		assert_eq!(input.title, "Run");
		assert_eq!(input.challenge_id, Some(DEFAULT_CHALLENGE_ID));

		assert!(form.is_pending());
		assert!(!form.can_submit());
		assert!(!form.can_cancel());
		assert_eq!(form.submit_label(), "Creating...");
		assert!(form.submit().is_none());

		form.succeeded();
		assert_eq!(form.value(Field::Title), "");
		assert_eq!(form.value(Field::Body), "");
		assert!(!form.is_pending());
	}

	#[test]
	fn test_failure_keeps_input() {
		let mut form = CreatePostForm::new(None);
		form.set(Field::Title, "Run");
		form.submit().unwrap();

		form.failed();

		assert_eq!(form.value(Field::Title), "Run");
		assert!(form.can_submit());
	}
}
