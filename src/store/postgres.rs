use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use super::{DataStore, Delete, Embed, Error, Filter, Insert, Order, Row, Select, Selected, Update};

/// Alias every statement gives its target table.
const ALIAS: &str = "t";

/// A [`DataStore`] backed by a Postgres pool.
///
/// Values travel as `jsonb` and are cast through the table's row type with
/// `jsonb_populate_record`, so a filter on a `uuid` or `timestamptz` column
/// compares typed values rather than text.
#[derive(Debug, Clone)]
pub struct PgStore {
	pool: PgPool,
}

impl PgStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	pub async fn connect(url: &str, max_connections: u32) -> Result<Self, Error> {
		let pool = PgPoolOptions::new()
			.max_connections(max_connections)
			.connect(url)
			.await?;

		Ok(Self::new(pool))
	}

	/// Applies the bundled migrations.
	pub async fn migrate(&self) -> Result<(), Error> {
		sqlx::migrate!()
			.run(&self.pool)
			.await
			.map_err(sqlx::Error::from)?;

		Ok(())
	}
}

/// Quotes an identifier after checking it is a plain name.
fn ident(name: &str) -> Result<String, Error> {
	let mut chars = name.chars();
	let valid = chars
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

	if valid {
		Ok(format!("\"{name}\""))
	} else {
		Err(Error::InvalidIdentifier(name.to_owned()))
	}
}

fn push_projection(
	builder: &mut QueryBuilder<'static, Postgres>,
	alias: &str,
	columns: &[String],
) -> Result<(), Error> {
	if columns.is_empty() {
		builder.push(format!("to_jsonb({alias})"));
		return Ok(());
	}

	let pairs = columns
		.iter()
		.map(|column| Ok(format!("'{column}', {alias}.{}", ident(column)?)))
		.collect::<Result<Vec<_>, Error>>()?;

	builder.push(format!("jsonb_build_object({})", pairs.join(", ")));
	Ok(())
}

fn push_embed(builder: &mut QueryBuilder<'static, Postgres>, embed: &Embed) -> Result<(), Error> {
	let table = ident(&embed.table)?;

	builder.push(format!(" || jsonb_build_object('{}', (SELECT ", embed.table));
	push_projection(builder, "e", &embed.columns)?;
	builder.push(format!(
		" FROM {table} AS e WHERE e.{} = {ALIAS}.{} LIMIT 1))",
		ident(&embed.foreign_column)?,
		ident(&embed.local_column)?,
	));

	Ok(())
}

fn push_filters(
	builder: &mut QueryBuilder<'static, Postgres>,
	table: &str,
	filters: &[Filter],
) -> Result<(), Error> {
	for (index, filter) in filters.iter().enumerate() {
		builder.push(if index == 0 { " WHERE " } else { " AND " });

		let column = ident(filter.column())?;

		match filter {
			Filter::Eq(name, value) => {
				let mut record = Row::new();
				record.insert(name.clone(), value.clone());

				builder.push(format!(
					"{ALIAS}.{column} = (jsonb_populate_record(NULL::{table}, "
				));
				builder.push_bind(Value::Object(record));
				builder.push(format!(")).{column}"));
			}
			Filter::IsNull(..) => {
				builder.push(format!("{ALIAS}.{column} IS NULL"));
			}
			Filter::NotNull(..) => {
				builder.push(format!("{ALIAS}.{column} IS NOT NULL"));
			}
		}
	}

	Ok(())
}

fn push_order(builder: &mut QueryBuilder<'static, Postgres>, order: &[Order]) -> Result<(), Error> {
	let terms = order
		.iter()
		.map(|order| {
			Ok(format!(
				"{ALIAS}.{} {}",
				ident(&order.column)?,
				if order.ascending { "ASC" } else { "DESC" }
			))
		})
		.collect::<Result<Vec<_>, Error>>()?;

	if !terms.is_empty() {
		builder.push(format!(" ORDER BY {}", terms.join(", ")));
	}

	Ok(())
}

fn select_sql(query: &Select) -> Result<QueryBuilder<'static, Postgres>, Error> {
	let table = ident(&query.table)?;
	let mut builder = QueryBuilder::new("SELECT ");

	push_projection(&mut builder, ALIAS, &query.columns)?;

	for embed in &query.embeds {
		push_embed(&mut builder, embed)?;
	}

	builder.push(format!(" FROM {table} AS {ALIAS}"));
	push_filters(&mut builder, &table, &query.filters)?;
	push_order(&mut builder, &query.order)?;

	if let Some(range) = query.range {
		builder.push(format!(" LIMIT {} OFFSET {}", range.limit(), range.from));
	}

	Ok(builder)
}

fn count_sql(query: &Select) -> Result<QueryBuilder<'static, Postgres>, Error> {
	let table = ident(&query.table)?;
	let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {table} AS {ALIAS}"));

	push_filters(&mut builder, &table, &query.filters)?;
	Ok(builder)
}

fn insert_sql(insert: Insert) -> Result<QueryBuilder<'static, Postgres>, Error> {
	let table = ident(&insert.table)?;
	let mut builder = QueryBuilder::new(format!("INSERT INTO {table} AS {ALIAS}"));

	if insert.row.is_empty() {
		builder.push(format!(" DEFAULT VALUES RETURNING to_jsonb({ALIAS})"));
		return Ok(builder);
	}

	let columns = insert
		.row
		.keys()
		.map(|column| ident(column))
		.collect::<Result<Vec<_>, Error>>()?;
	let values = columns
		.iter()
		.map(|column| format!("r.{column}"))
		.collect::<Vec<_>>();

	builder.push(format!(
		" ({}) SELECT {} FROM jsonb_populate_record(NULL::{table}, ",
		columns.join(", "),
		values.join(", "),
	));
	builder.push_bind(Value::Object(insert.row));
	builder.push(format!(") AS r RETURNING to_jsonb({ALIAS})"));

	Ok(builder)
}

fn update_sql(update: Update) -> Result<QueryBuilder<'static, Postgres>, Error> {
	let table = ident(&update.table)?;

	if update.patch.is_empty() {
		return Err(Error::EmptyPatch);
	}

	let assignments = update
		.patch
		.keys()
		.map(|column| ident(column).map(|column| format!("{column} = r.{column}")))
		.collect::<Result<Vec<_>, Error>>()?;

	let mut builder = QueryBuilder::new(format!(
		"UPDATE {table} AS {ALIAS} SET {} FROM jsonb_populate_record(NULL::{table}, ",
		assignments.join(", "),
	));
	builder.push_bind(Value::Object(update.patch));
	builder.push(") AS r");
	push_filters(&mut builder, &table, &update.filters)?;
	builder.push(format!(" RETURNING to_jsonb({ALIAS})"));

	Ok(builder)
}

fn delete_sql(delete: &Delete) -> Result<QueryBuilder<'static, Postgres>, Error> {
	let table = ident(&delete.table)?;
	let mut builder = QueryBuilder::new(format!("DELETE FROM {table} AS {ALIAS}"));

	push_filters(&mut builder, &table, &delete.filters)?;
	Ok(builder)
}

fn into_row(value: Value) -> Result<Row, Error> {
	match value {
		Value::Object(row) => Ok(row),
		other => Err(Error::NotAnObject(other)),
	}
}

#[async_trait]
impl DataStore for PgStore {
	#[tracing::instrument(skip_all, fields(table = %query.table))]
	async fn select(&self, query: Select) -> Result<Selected, Error> {
		let rows = select_sql(&query)?
			.build_query_scalar::<Value>()
			.fetch_all(&self.pool)
			.await?
			.into_iter()
			.map(into_row)
			.collect::<Result<Vec<_>, Error>>()?;

		let count = if query.count {
			let count = count_sql(&query)?
				.build_query_scalar::<i64>()
				.fetch_one(&self.pool)
				.await?;

			Some(u64::try_from(count).unwrap_or_default())
		} else {
			None
		};

		Ok(Selected { rows, count })
	}

	#[tracing::instrument(skip_all, fields(table = %insert.table))]
	async fn insert(&self, insert: Insert) -> Result<Row, Error> {
		let row = insert_sql(insert)?
			.build_query_scalar::<Value>()
			.fetch_one(&self.pool)
			.await?;

		into_row(row)
	}

	#[tracing::instrument(skip_all, fields(table = %update.table))]
	async fn update(&self, update: Update) -> Result<Vec<Row>, Error> {
		update_sql(update)?
			.build_query_scalar::<Value>()
			.fetch_all(&self.pool)
			.await?
			.into_iter()
			.map(into_row)
			.collect()
	}

	#[tracing::instrument(skip_all, fields(table = %delete.table))]
	async fn delete(&self, delete: Delete) -> Result<u64, Error> {
		let result = delete_sql(&delete)?.build().execute(&self.pool).await?;

		Ok(result.rows_affected())
	}
}
