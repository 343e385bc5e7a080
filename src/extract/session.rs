use std::sync::Arc;

use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request, StatusCode},
};
use uuid::Uuid;

use crate::{
	error::{self, RouteError},
	model::Account,
	openapi::{SECURITY_SCHEME_BEARER, SECURITY_SCHEME_SESSION},
	service::Auth,
};

pub const COOKIE_NAME: &str = "session";
pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// Why a request could not be tied to an account.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("no session cookie or bearer token")]
	NoSession,
	#[error("invalid session")]
	InvalidSession,
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		StatusCode::UNAUTHORIZED
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let content = match self {
			Self::NoSession => "User not authenticated",
			Self::InvalidSession => "Your session is invalid or has expired.",
		};

		error::Message::new(content).into_vec()
	}
}

/// The signed-in account of the request.
///
/// The session id is read from an `Authorization: Bearer <id>` header, or
/// failing that from the `session` cookie.
///
/// ```rust,ignore
/// async fn route(session: Session) {
///   println!("{:?}", session.account.name);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub account: Account,
}

fn session_token(parts: &request::Parts) -> Result<String, Error> {
	if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
		let value = value.to_str().map_err(|_| Error::InvalidSession)?;

		return value
			.strip_prefix(AUTHORIZATION_PREFIX)
			.map(str::to_owned)
			.ok_or(Error::InvalidSession);
	}

	parts
		.headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == COOKIE_NAME)
		.map(|cookie| cookie.value().to_owned())
		.ok_or(Error::NoSession)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Arc<Auth>: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let token = session_token(parts)?;
		let id = Uuid::parse_str(token.trim()).map_err(|_| Error::InvalidSession)?;

		let auth = Arc::<Auth>::from_ref(state);
		let account = auth.resolve(id).await?.ok_or(Error::InvalidSession)?;

		Ok(Self { id, account })
	}
}

impl OperationInput for Session {
	/// Adds the session cookie and bearer token requirements to the operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}
