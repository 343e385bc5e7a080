use activity_feed::{config::Config, connect, router, trace, State};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::from_env()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	let store = connect(&config).await?;
	let app = router(State::new(&store, &config.settings));

	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!(
		address = %listener.local_addr()?,
		store = config.store.name(),
		"listening"
	);

	axum::serve(listener, app).await?;

	Ok(())
}
