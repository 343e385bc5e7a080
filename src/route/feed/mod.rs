use aide::axum::{routing::get_with, ApiRouter};

use crate::AppState;

pub mod route;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(get_feed, get_feed_docs))
		.api_route("/me", get_with(get_own_feed, get_own_feed_docs))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_feed_pages() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		let titles = seed_posts(&store, account.id, 25).await;
		let app = app(store);

		let response = app.get("/feed").add_query_param("page", 2).await;

		assert_eq!(response.status_code(), 200);

		let page = response.json::<Value>();
		assert_eq!(page["data"].as_array().unwrap().len(), 5);
		assert_eq!(page["data"][4]["title"], titles[0]);
		assert_eq!(page["hasMore"], false);
		assert_eq!(page["totalCount"], 25);
		assert_eq!(page["nextPage"], Value::Null);
	}

	#[tokio::test]
	async fn test_feed_rejects_out_of_range_limit() {
		let app = app(memory_store());

		let response = app.get("/feed").add_query_param("limit", 500).await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "limit");
	}

	#[tokio::test]
	async fn test_own_feed_requires_session() {
		let store = memory_store();
		let ada = seed_account(&store, "Ada").await;
		let bob = seed_account(&store, "Bob").await;
		seed_posts(&store, ada.id, 2).await;
		seed_posts(&store, bob.id, 3).await;
		let session = seed_session(&store, bob.id).await;
		let app = app(store);

		let response = app.get("/feed/me").await;
		assert_eq!(response.status_code(), 401);

		let response = app
			.get("/feed/me")
			.add_header(AUTHORIZATION, bearer(session))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["totalCount"], 3);
	}

	#[sqlx::test]
	async fn test_feed_pages_over_postgres(pool: sqlx::PgPool) {
		let store = pg_store(pool);
		let account = seed_account(&store, "Ada").await;
		let titles = seed_posts(&store, account.id, 25).await;
		let session = seed_session(&store, account.id).await;
		let app = app(store);

		let first = app.get("/feed").await.json::<Value>();
		assert_eq!(first["data"].as_array().unwrap().len(), 10);
		assert_eq!(first["data"][0]["title"], titles[24]);
		assert_eq!(first["hasMore"], true);
		assert_eq!(first["totalCount"], 25);
		assert_eq!(first["nextPage"], 1);

		let last = app
			.get("/feed")
			.add_query_param("page", 2)
			.await
			.json::<Value>();
		assert_eq!(last["data"].as_array().unwrap().len(), 5);
		assert_eq!(last["data"][4]["title"], titles[0]);
		assert_eq!(last["hasMore"], false);

		let own = app
			.get("/feed/me")
			.add_header(AUTHORIZATION, bearer(session))
			.await
			.json::<Value>();
		assert_eq!(own["totalCount"], 25);
	}
}
