//! Process configuration, read from the environment (and `.env`).
//!
//! | Variable | Default |
//! |---|---|
//! | `STORE` | `postgres` when `DATABASE_URL` is set, otherwise `memory` |
//! | `DATABASE_URL` | required for `postgres` |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |
//! | `HOST` | `127.0.0.1` |
//! | `PORT` | `3000` |
//! | `POSTS_TABLE` | `log_activites` |
//! | `ACCOUNTS_TABLE` | `accounts` |
//! | `SESSIONS_TABLE` | `sessions` |
//! | `DEFAULT_CHALLENGE_ID` | `73722bf4-4213-4feb-8848-bbb5ef422989` |
//! | `CACHE_TTL_SECS` | `60` |
//! | `CACHE_CAPACITY` | `1000` entries per cache |
//! | `DEV_SESSION` | unset; with `memory`, signs a seeded developer account in under this session id |
//! | `LOG_LEVEL` | `info` |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset, no export |

use std::{net::IpAddr, str::FromStr, time::Duration};

use tracing::level_filters::LevelFilter;
use uuid::Uuid;

use crate::service::{CacheSettings, Settings, Tables};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} has an invalid value {value:?}")]
	Invalid { name: &'static str, value: String },
}

/// Which [`DataStore`](crate::store::DataStore) backs the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
	Postgres {
		url: String,
		max_connections: u32,
	},
	Memory,
}

impl StoreConfig {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Postgres { .. } => "postgres",
			Self::Memory => "memory",
		}
	}
}

#[derive(Debug, Clone)]
pub struct Config {
	pub store: StoreConfig,
	pub host: IpAddr,
	pub port: u16,
	pub settings: Settings,
	/// Session seeded into the memory store, so the signed-in routes can be
	/// used without an identity provider.
	pub dev_session: Option<Uuid>,
	pub log_level: LevelFilter,
	pub otlp_endpoint: Option<String>,
}

fn parse<T: FromStr>(
	name: &'static str,
	value: Option<String>,
	default: T,
) -> Result<T, ConfigError> {
	match value {
		None => Ok(default),
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| ConfigError::Invalid { name, value }),
	}
}

impl Config {
	/// Loads `.env` if present, then reads the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		dotenvy::dotenv().ok();

		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through `lookup`. Empty values count as unset.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

		let database_url = var("DATABASE_URL");
		let kind = var("STORE");
		let store = match kind.as_deref() {
			Some("memory") => StoreConfig::Memory,
			None if database_url.is_none() => StoreConfig::Memory,
			Some("postgres") | None => StoreConfig::Postgres {
				url: database_url.ok_or(ConfigError::Missing("DATABASE_URL"))?,
				max_connections: parse(
					"DATABASE_MAX_CONNECTIONS",
					var("DATABASE_MAX_CONNECTIONS"),
					10,
				)?,
			},
			Some(other) => {
				return Err(ConfigError::Invalid {
					name: "STORE",
					value: other.into(),
				})
			}
		};

		let defaults = Settings::default();
		let tables = Tables {
			posts: var("POSTS_TABLE").unwrap_or(defaults.tables.posts),
			accounts: var("ACCOUNTS_TABLE").unwrap_or(defaults.tables.accounts),
			sessions: var("SESSIONS_TABLE").unwrap_or(defaults.tables.sessions),
		};

		let settings = Settings {
			tables,
			default_challenge_id: parse(
				"DEFAULT_CHALLENGE_ID",
				var("DEFAULT_CHALLENGE_ID"),
				defaults.default_challenge_id,
			)?,
			cache: CacheSettings {
				ttl: Duration::from_secs(parse(
					"CACHE_TTL_SECS",
					var("CACHE_TTL_SECS"),
					defaults.cache.ttl.as_secs(),
				)?),
				capacity: parse(
					"CACHE_CAPACITY",
					var("CACHE_CAPACITY"),
					defaults.cache.capacity,
				)?,
			},
		};

		Ok(Self {
			store,
			host: parse("HOST", var("HOST"), IpAddr::from([127, 0, 0, 1]))?,
			port: parse("PORT", var("PORT"), 3000)?,
			settings,
			dev_session: var("DEV_SESSION")
				.map(|value| parse("DEV_SESSION", Some(value), Uuid::nil()))
				.transpose()?,
			log_level: parse("LOG_LEVEL", var("LOG_LEVEL"), LevelFilter::INFO)?,
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
		})
	}
}
