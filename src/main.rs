use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cuet_prep::content::{QuestionBank, SimilarityIndex};
use cuet_prep::remote::RemoteGenerator;
use cuet_prep::selection::SelectionOrchestrator;
use cuet_prep::state::AppState;
use cuet_prep::storage::{MemoryStorage, SqliteStorage, StoragePort};
use cuet_prep::store::MistakeStore;
use cuet_prep::{config, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cuet_prep=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let storage_path = config::load_storage_path();
  let storage: Box<dyn StoragePort> = match SqliteStorage::open(&storage_path) {
    Ok(storage) => Box::new(storage),
    Err(e) => {
      // Degraded mode: the session works, nothing survives a restart
      tracing::warn!("Falling back to in-memory storage: {}", e);
      Box::new(MemoryStorage::new())
    }
  };
  let store = Arc::new(Mutex::new(MistakeStore::new(storage)));

  let bank = QuestionBank::load(config::load_bank_path().as_deref());
  tracing::info!("Question bank ready with {} published questions", bank.len());
  let index = Arc::new(SimilarityIndex::build(&bank));

  let remote = Arc::new(RemoteGenerator::from_endpoint(config::load_remote_endpoint()));
  let orchestrator = Arc::new(SelectionOrchestrator::new(
    Arc::clone(&store),
    index,
    remote,
  ));

  let app = handlers::router(AppState::new(store, orchestrator))
    .layer(TraceLayer::new_for_http());

  let bind_addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config::SERVER_PORT);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
