#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod openapi;
pub mod route;
pub mod service;
pub mod store;
pub mod trace;
pub mod validate;
pub mod view;


use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{Extension, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use uuid::Uuid;

use crate::{
	config::{Config, StoreConfig},
	model::Account,
	service::{Auth, Feed, Posts, Settings, Stories, Tables},
	store::{DataStore, Insert, MemoryStore, PgStore, Store},
};

pub type AppState = State;

/// The shared application state.
///
/// Every service is wired to the same store; handlers extract the one they
/// need with `State<Arc<...>>`.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub auth: Arc<Auth>,
	pub feed: Arc<Feed>,
	pub posts: Arc<Posts>,
	pub stories: Arc<Stories>,
}

impl State {
	pub fn new(store: &Store, settings: &Settings) -> Self {
		let Settings {
			tables,
			default_challenge_id,
			cache,
		} = settings;

		let feed = Arc::new(Feed::new(store.clone(), tables.posts.clone(), *cache));

		Self {
			auth: Arc::new(Auth::new(store.clone(), tables.clone())),
			posts: Arc::new(Posts::new(
				store.clone(),
				tables.posts.clone(),
				*default_challenge_id,
				Arc::clone(&feed),
			)),
			stories: Arc::new(Stories::new(store.clone(), tables.clone(), *cache)),
			feed,
		}
	}
}

/// Opens the configured store. Postgres is migrated before use.
///
/// The memory store starts empty apart from the developer session, when one
/// is configured.
pub async fn connect(config: &Config) -> Result<Store, store::Error> {
	Ok(match &config.store {
		StoreConfig::Memory => {
			let tables = &config.settings.tables;
			let store = MemoryStore::new([&tables.posts, &tables.accounts, &tables.sessions]);

			if let Some(session) = config.dev_session {
				seed_dev_session(&store, tables, session).await?;
				tracing::info!("signed a developer account in on the memory store");
			}

			Arc::new(store)
		}
		StoreConfig::Postgres {
			url,
			max_connections,
		} => {
			if config.dev_session.is_some() {
				tracing::warn!("DEV_SESSION is ignored by the postgres store");
			}

			let store = PgStore::connect(url, *max_connections).await?;
			store.migrate().await?;

			Arc::new(store)
		}
	})
}

async fn seed_dev_session(
	store: &MemoryStore,
	tables: &Tables,
	session: Uuid,
) -> Result<(), store::Error> {
	let account = store
		.insert(Insert::new(
			&tables.accounts,
			store::to_row(&json!({ "name": "Developer", "picture_url": null }))?,
		))
		.await?;
	let account = store::from_row::<Account>(account)?;

	store
		.insert(Insert::new(
			&tables.sessions,
			store::to_row(&json!({ "id": session, "account_id": account.id }))?,
		))
		.await?;

	Ok(())
}

/// Builds the HTTP router, including the generated OpenAPI document.
pub fn router(state: State) -> Router {
	aide::gen::extract_schemas(true);

	let mut api = OpenApi::default();

	let router = ApiRouter::new()
		.nest("/feed", route::feed::routes())
		.nest("/stories", route::story::routes())
		.nest("/posts", route::post::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.with_state(state);

	router.layer(Extension(Arc::new(api))).layer(
		ServiceBuilder::new()
			.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
			.layer(TraceLayer::new_for_http())
			.layer(PropagateRequestIdLayer::x_request_id())
			.layer(CompressionLayer::new())
			.layer(CorsLayer::permissive()),
	)
}
