use serde_json::Value;
use uuid::Uuid;

use super::Tables;
use crate::{
	model::Account,
	store::{self, Embed, Select, Store},
};

/// Resolves session tokens to the signed-in account.
pub struct Auth {
	store: Store,
	tables: Tables,
}

impl Auth {
	pub fn new(store: Store, tables: Tables) -> Self {
		Self { store, tables }
	}

	/// Returns the account owning `session_id`, or `None` for an unknown session.
	///
	/// The session id is a bearer credential and is never recorded.
	#[tracing::instrument(skip_all, err)]
	pub async fn resolve(&self, session_id: Uuid) -> Result<Option<Account>, store::Error> {
		let select = Select::from(&self.tables.sessions)
			.columns(["account_id"])
			.embed(Embed::new(&self.tables.accounts, "account_id").columns([
				"id",
				"name",
				"picture_url",
			]))
			.eq("id", session_id.to_string())
			.limit(1);

		let Some(mut row) = self.store.select(select).await?.rows.into_iter().next() else {
			return Ok(None);
		};

		match row.remove(&self.tables.accounts) {
			Some(Value::Object(account)) => Ok(Some(store::from_row(account)?)),
			_ => Ok(None),
		}
	}
}
