//! Table-oriented data store.
//!
//! Services never speak SQL directly. They describe a request against a named
//! table ([`Select`], [`Insert`], [`Update`], [`Delete`]) and hand it to a
//! [`DataStore`], which answers with JSON rows. This keeps the feed logic
//! independent of where the rows live.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A single row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Shared handle to the configured store.
pub type Store = Arc<dyn DataStore>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("relation \"{0}\" does not exist")]
	UnknownTable(String),
	#[error("invalid identifier {0:?}")]
	InvalidIdentifier(String),
	#[error("{0}")]
	Remote(String),
	#[error("expected an object row, got {0}")]
	NotAnObject(Value),
	#[error("an update needs at least one column")]
	EmptyPatch,
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("malformed row: {0}")]
	Decode(#[from] serde_json::Error),
}

/// The query-and-mutate contract every backend implements.
#[async_trait]
pub trait DataStore: Send + Sync {
	async fn select(&self, query: Select) -> Result<Selected, Error>;

	/// Inserts a row and returns it as stored, including server-assigned columns.
	async fn insert(&self, insert: Insert) -> Result<Row, Error>;

	/// Returns every row that was changed.
	async fn update(&self, update: Update) -> Result<Vec<Row>, Error>;

	/// Returns the number of rows removed.
	async fn delete(&self, delete: Delete) -> Result<u64, Error>;
}

#[async_trait]
impl<T: DataStore + ?Sized> DataStore for Arc<T> {
	async fn select(&self, query: Select) -> Result<Selected, Error> {
		(**self).select(query).await
	}

	async fn insert(&self, insert: Insert) -> Result<Row, Error> {
		(**self).insert(insert).await
	}

	async fn update(&self, update: Update) -> Result<Vec<Row>, Error> {
		(**self).update(update).await
	}

	async fn delete(&self, delete: Delete) -> Result<u64, Error> {
		(**self).delete(delete).await
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
	Eq(String, Value),
	IsNull(String),
	NotNull(String),
}

impl Filter {
	pub fn column(&self) -> &str {
		match self {
			Self::Eq(column, _) | Self::IsNull(column) | Self::NotNull(column) => column,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
	pub column: String,
	pub ascending: bool,
}

/// Inclusive row range, `from..=to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
	pub from: u64,
	pub to: u64,
}

impl Range {
	pub fn limit(&self) -> u64 {
		self.to - self.from + 1
	}
}

/// A to-one relation embedded into each selected row under `table`.
///
/// The related row is the one whose `foreign_column` equals the parent's
/// `local_column`; when there is none the embedded value is `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
	pub table: String,
	pub local_column: String,
	pub foreign_column: String,
	pub columns: Vec<String>,
}

impl Embed {
	pub fn new(table: impl Into<String>, local_column: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			local_column: local_column.into(),
			foreign_column: "id".into(),
			columns: Vec::new(),
		}
	}

	#[must_use]
	pub fn columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
	pub table: String,
	/// Empty means every column.
	pub columns: Vec<String>,
	pub embeds: Vec<Embed>,
	pub filters: Vec<Filter>,
	pub order: Vec<Order>,
	pub range: Option<Range>,
	/// Ask for the exact number of rows matching the filters, ignoring the range.
	pub count: bool,
}

impl Select {
	pub fn from(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			columns: Vec::new(),
			embeds: Vec::new(),
			filters: Vec::new(),
			order: Vec::new(),
			range: None,
			count: false,
		}
	}

	#[must_use]
	pub fn columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();
		self
	}

	#[must_use]
	pub fn embed(mut self, embed: Embed) -> Self {
		self.embeds.push(embed);
		self
	}

	#[must_use]
	pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
		self.filters.push(Filter::Eq(column.into(), value.into()));
		self
	}

	#[must_use]
	pub fn is_null(mut self, column: impl Into<String>) -> Self {
		self.filters.push(Filter::IsNull(column.into()));
		self
	}

	#[must_use]
	pub fn not_null(mut self, column: impl Into<String>) -> Self {
		self.filters.push(Filter::NotNull(column.into()));
		self
	}

	#[must_use]
	pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
		self.order.push(Order {
			column: column.into(),
			ascending,
		});
		self
	}

	#[must_use]
	pub fn range(mut self, from: u64, to: u64) -> Self {
		self.range = Some(Range { from, to });
		self
	}

	/// Shorthand for `range(0, n - 1)`.
	#[must_use]
	pub fn limit(self, n: u64) -> Self {
		self.range(0, n.saturating_sub(1))
	}

	#[must_use]
	pub fn count_exact(mut self) -> Self {
		self.count = true;
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selected {
	pub rows: Vec<Row>,
	pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
	pub table: String,
	pub row: Row,
}

impl Insert {
	pub fn new(table: impl Into<String>, row: Row) -> Self {
		Self {
			table: table.into(),
			row,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
	pub table: String,
	pub patch: Row,
	pub filters: Vec<Filter>,
}

impl Update {
	pub fn table(table: impl Into<String>, patch: Row) -> Self {
		Self {
			table: table.into(),
			patch,
			filters: Vec::new(),
		}
	}

	#[must_use]
	pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
		self.filters.push(Filter::Eq(column.into(), value.into()));
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
	pub table: String,
	pub filters: Vec<Filter>,
}

impl Delete {
	pub fn from(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			filters: Vec::new(),
		}
	}

	#[must_use]
	pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
		self.filters.push(Filter::Eq(column.into(), value.into()));
		self
	}
}

/// Serializes a value into a [`Row`].
///
/// Anything that does not serialize to a JSON object is rejected.
pub fn to_row<T: serde::Serialize>(value: &T) -> Result<Row, Error> {
	match serde_json::to_value(value)? {
		Value::Object(row) => Ok(row),
		other => Err(Error::NotAnObject(other)),
	}
}

/// Deserializes a [`Row`] into a model.
pub fn from_row<T: serde::de::DeserializeOwned>(row: Row) -> Result<T, Error> {
	Ok(serde_json::from_value(Value::Object(row))?)
}

#[cfg(test)]
mod test {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_limit_is_inclusive_range() {
		let query = Select::from("log_activites").limit(10);

		assert_eq!(query.range, Some(Range { from: 0, to: 9 }));
		assert_eq!(query.range.map(|r| r.limit()), Some(10));
	}

	#[test]
	fn test_builder_collects_filters_in_order() {
		let query = Select::from("log_activites")
			.eq("account_id", "abc")
			.not_null("image_url")
			.order("created_at", false);

		assert_eq!(
			query.filters,
			vec![
				Filter::Eq("account_id".into(), json!("abc")),
				Filter::NotNull("image_url".into()),
			]
		);
		assert_eq!(query.order[0].column, "created_at");
		assert!(!query.order[0].ascending);
	}

	#[test]
	fn test_to_row_rejects_non_objects() {
		let error = to_row(&42).unwrap_err();

		assert!(matches!(error, Error::NotAnObject(Value::Number(..))));
		assert_eq!(error.to_string(), "expected an object row, got 42");
		assert_eq!(to_row(&json!({ "a": 1 })).unwrap()["a"], json!(1));
	}
}
