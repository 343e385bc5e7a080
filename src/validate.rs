//! Field validators for post input.
//!
//! Each validator checks one field and returns a [`ValidationError`] whose
//! message is shown next to that field. They are wired into the input types
//! through `#[validate(custom(...))]`, and [`FieldErrors`] flattens the
//! result into a per-field map for the form and the HTTP error body.

use std::{borrow::Cow, collections::BTreeMap};

use validator::{ValidateUrl, ValidationError, ValidationErrors};

pub const TITLE_MAX_CHARS: usize = 255;
pub const BODY_MAX_CHARS: usize = 1000;

fn error(code: &'static str, message: &'static str) -> ValidationError {
	let mut error = ValidationError::new(code);
	error.message = Some(Cow::Borrowed(message));
	error
}

pub fn title(value: &str) -> Result<(), ValidationError> {
	match value.chars().count() {
		0 => Err(error("title_required", "Title is required")),
		n if n > TITLE_MAX_CHARS => Err(error("title_too_long", "Title too long")),
		_ => Ok(()),
	}
}

pub fn body(value: &str) -> Result<(), ValidationError> {
	if value.chars().count() > BODY_MAX_CHARS {
		return Err(error("body_too_long", "Description too long"));
	}

	Ok(())
}

/// An empty string means "no image" and is accepted.
pub fn image_url(value: &str) -> Result<(), ValidationError> {
	if value.is_empty() || value.validate_url() {
		return Ok(());
	}

	Err(error("invalid_url", "Invalid URL"))
}

/// Field name to messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// The first message for `field`, if it failed.
	pub fn first(&self, field: &str) -> Option<&str> {
		self.0
			.get(field)
			.and_then(|messages| messages.first())
			.map(String::as_str)
	}
}

impl From<&ValidationErrors> for FieldErrors {
	fn from(errors: &ValidationErrors) -> Self {
		Self(
			errors
				.field_errors()
				.into_iter()
				.map(|(field, errors)| {
					let messages = errors
						.iter()
						.map(|error| {
							error
								.message
								.as_ref()
								.map_or_else(|| error.code.to_string(), ToString::to_string)
						})
						.collect();

					(field.to_string(), messages)
				})
				.collect(),
		)
	}
}

/// Maps an optional form value to what is stored: empty becomes `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.is_empty())
}
