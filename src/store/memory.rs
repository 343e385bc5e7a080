use std::{
	cmp::Ordering,
	collections::HashMap,
	sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering},
};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{DataStore, Delete, Embed, Error, Filter, Insert, Order, Row, Select, Selected, Update};

/// An in-process store holding every table as a vector of JSON rows.
///
/// It assigns `id` and `created_at` on insert the way the hosted database
/// does. Timestamps are strictly increasing so that ordering by creation
/// time is total. Every request is counted, and a failure can be queued to
/// exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
	tables: RwLock<HashMap<String, Vec<Row>>>,
	requests: AtomicUsize,
	last_created_micros: AtomicU64,
	failure: Mutex<Option<String>>,
}

impl MemoryStore {
	/// Creates a store with the given (empty) tables.
	pub fn new<I, S>(tables: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			tables: RwLock::new(
				tables
					.into_iter()
					.map(|table| (table.into(), Vec::new()))
					.collect(),
			),
			..Self::default()
		}
	}

	/// Number of requests served so far, including failed ones.
	pub fn requests(&self) -> usize {
		self.requests.load(AtomicOrdering::SeqCst)
	}

	/// Makes the next request fail with `message`.
	pub async fn fail_next(&self, message: impl Into<String>) {
		*self.failure.lock().await = Some(message.into());
	}

	async fn begin(&self) -> Result<(), Error> {
		self.requests.fetch_add(1, AtomicOrdering::SeqCst);

		match self.failure.lock().await.take() {
			Some(message) => Err(Error::Remote(message)),
			None => Ok(()),
		}
	}

	fn next_created_at(&self) -> String {
		let now = u64::try_from(Utc::now().timestamp_micros()).unwrap_or_default();
		let previous = self
			.last_created_micros
			.fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |last| {
				Some(now.max(last + 1))
			})
			.unwrap_or(now);
		let micros = now.max(previous + 1);

		DateTime::<Utc>::from_timestamp_micros(i64::try_from(micros).unwrap_or(i64::MAX))
			.unwrap_or_default()
			.to_rfc3339_opts(SecondsFormat::Micros, true)
	}
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
	filters.iter().all(|filter| match filter {
		Filter::Eq(column, value) => row.get(column) == Some(value),
		Filter::IsNull(column) => row.get(column).map_or(true, Value::is_null),
		Filter::NotNull(column) => row.get(column).is_some_and(|value| !value.is_null()),
	})
}

/// Orders two values the way Postgres would for the column types we store:
/// numbers numerically, everything else by its textual form.
fn compare_values(a: &Value, b: &Value) -> Ordering {
	match (a, b) {
		(Value::Number(a), Value::Number(b)) => a
			.as_f64()
			.partial_cmp(&b.as_f64())
			.unwrap_or(Ordering::Equal),
		(Value::String(a), Value::String(b)) => a.cmp(b),
		(Value::Bool(a), Value::Bool(b)) => a.cmp(b),
		(a, b) => a.to_string().cmp(&b.to_string()),
	}
}

fn compare_rows(a: &Row, b: &Row, order: &[Order]) -> Ordering {
	for Order { column, ascending } in order {
		let a = a.get(column).filter(|value| !value.is_null());
		let b = b.get(column).filter(|value| !value.is_null());

		// nulls sort last ascending and first descending
		let ordering = match (a, b) {
			(None, None) => Ordering::Equal,
			(None, Some(_)) => Ordering::Greater,
			(Some(_), None) => Ordering::Less,
			(Some(a), Some(b)) => compare_values(a, b),
		};
		let ordering = if *ascending { ordering } else { ordering.reverse() };

		if ordering != Ordering::Equal {
			return ordering;
		}
	}

	Ordering::Equal
}

fn project(row: &Row, columns: &[String]) -> Row {
	if columns.is_empty() {
		return row.clone();
	}

	columns
		.iter()
		.map(|column| (column.clone(), row.get(column).cloned().unwrap_or(Value::Null)))
		.collect()
}

fn embedded(
	tables: &HashMap<String, Vec<Row>>,
	row: &Row,
	embed: &Embed,
) -> Result<Value, Error> {
	let related = tables
		.get(&embed.table)
		.ok_or_else(|| Error::UnknownTable(embed.table.clone()))?;

	let Some(key) = row.get(&embed.local_column).filter(|key| !key.is_null()) else {
		return Ok(Value::Null);
	};

	Ok(related
		.iter()
		.find(|candidate| candidate.get(&embed.foreign_column) == Some(key))
		.map_or(Value::Null, |found| Value::Object(project(found, &embed.columns))))
}

#[async_trait]
impl DataStore for MemoryStore {
	async fn select(&self, query: Select) -> Result<Selected, Error> {
		self.begin().await?;

		let tables = self.tables.read().await;
		let rows = tables
			.get(&query.table)
			.ok_or_else(|| Error::UnknownTable(query.table.clone()))?;

		let mut matching = rows
			.iter()
			.filter(|row| matches(row, &query.filters))
			.collect::<Vec<_>>();

		matching.sort_by(|a, b| compare_rows(a, b, &query.order));

		let count = query.count.then_some(matching.len() as u64);

		let window: Vec<&Row> = match query.range {
			Some(range) => matching
				.into_iter()
				.skip(usize::try_from(range.from).unwrap_or(usize::MAX))
				.take(usize::try_from(range.limit()).unwrap_or(usize::MAX))
				.collect(),
			None => matching,
		};

		let rows = window
			.into_iter()
			.map(|row| {
				let mut projected = project(row, &query.columns);

				for embed in &query.embeds {
					projected.insert(embed.table.clone(), embedded(&tables, row, embed)?);
				}

				Ok(projected)
			})
			.collect::<Result<Vec<_>, Error>>()?;

		Ok(Selected { rows, count })
	}

	async fn insert(&self, insert: Insert) -> Result<Row, Error> {
		self.begin().await?;

		let mut tables = self.tables.write().await;
		let rows = tables
			.get_mut(&insert.table)
			.ok_or_else(|| Error::UnknownTable(insert.table.clone()))?;

		let mut row = insert.row;

		if row.get("id").map_or(true, Value::is_null) {
			row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
		}

		if row.get("created_at").map_or(true, Value::is_null) {
			row.insert("created_at".into(), Value::String(self.next_created_at()));
		}

		rows.push(row.clone());

		Ok(row)
	}

	async fn update(&self, update: Update) -> Result<Vec<Row>, Error> {
		self.begin().await?;

		let mut tables = self.tables.write().await;
		let rows = tables
			.get_mut(&update.table)
			.ok_or_else(|| Error::UnknownTable(update.table.clone()))?;

		let mut updated = Vec::new();

		for row in rows.iter_mut().filter(|row| matches(row, &update.filters)) {
			for (column, value) in &update.patch {
				row.insert(column.clone(), value.clone());
			}

			updated.push(row.clone());
		}

		Ok(updated)
	}

	async fn delete(&self, delete: Delete) -> Result<u64, Error> {
		self.begin().await?;

		let mut tables = self.tables.write().await;
		let rows = tables
			.get_mut(&delete.table)
			.ok_or_else(|| Error::UnknownTable(delete.table.clone()))?;

		let before = rows.len();
		rows.retain(|row| !matches(row, &delete.filters));

		Ok((before - rows.len()) as u64)
	}
}
