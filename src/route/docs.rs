use std::sync::Arc;

use aide::{
	axum::{routing::get, ApiRouter, IntoApiResponse},
	openapi::OpenApi,
};
use axum::{response::IntoResponse, Extension};

use crate::{extract::Json, AppState};

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().route("/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(api.as_ref()).into_response()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_serves_openapi_document() {
		let app = app(memory_store());

		let api = app.get("/docs/api.json").await.json::<Value>();

		assert_eq!(api["info"]["title"], "Activity Feed");
		let paths = api["paths"].as_object().unwrap();
		assert!(paths.keys().any(|path| path.starts_with("/feed")));
		assert!(paths.keys().any(|path| path.starts_with("/stories")));
		assert!(paths.keys().any(|path| path.starts_with("/posts/")));
	}

	#[tokio::test]
	async fn test_operations_documented_from_doc_comments() {
		let app = app(memory_store());

		let api = app.get("/docs/api.json").await.json::<Value>();
		let paths = api["paths"].as_object().unwrap();
		let (_, post) = paths
			.iter()
			.find(|(path, _)| path.starts_with("/posts/"))
			.unwrap();

		assert_eq!(post["get"]["summary"], "Get single post");
		assert_eq!(
			post["get"]["description"],
			"Returns a single post by its unique id."
		);
		assert_eq!(post["get"]["tags"], json!(["Post"]));
		assert_eq!(
			post["get"]["responses"]["404"]["description"],
			"No such post"
		);

		let summaries = paths
			.values()
			.filter_map(|item| item["get"]["summary"].as_str())
			.collect::<Vec<_>>();
		assert!(summaries.contains(&"Get feed"));
		assert!(summaries.contains(&"List stories"));
	}
}
