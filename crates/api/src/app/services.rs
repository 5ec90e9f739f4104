use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::Mutex;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use pantry_ai::{ChatRelay, CompletionClient, OpenAiCompletionClient, RelaySettings};
use pantry_infra::{
    blob_store::{BlobStore, InMemoryBlobStore, LocalFsBlobStore},
    document_store::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, INVENTORY_COLLECTION},
    AppConfig, LedgerError, LedgerManager,
};
use pantry_inventory::InventoryItem;

/// Shared handles behind every route.
///
/// The chat session is a single shared transcript; requests queue on its lock so
/// messages keep their order.
#[derive(Clone)]
pub struct AppServices {
    pub ledger: Arc<LedgerManager>,
    pub blobs: Arc<dyn BlobStore>,
    pub chat: Arc<Mutex<ChatRelay>>,
}

impl AppServices {
    /// Wire explicitly constructed collaborators together.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        completion: Arc<dyn CompletionClient>,
        relay_settings: RelaySettings,
    ) -> Self {
        Self {
            ledger: Arc::new(LedgerManager::new(store, blobs.clone())),
            blobs,
            chat: Arc::new(Mutex::new(ChatRelay::new(completion, relay_settings))),
        }
    }

    /// In-memory stores with the given completion client (tests/dev).
    pub fn in_memory(completion: Arc<dyn CompletionClient>, blob_base_url: &str) -> Self {
        Self::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryBlobStore::new(blob_base_url)),
            completion,
            RelaySettings::default(),
        )
    }
}

/// Build services from configuration and perform the startup reload.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, LedgerError> {
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres document store");
            Arc::new(PostgresDocumentStore::connect(url, INVENTORY_COLLECTION).await?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; inventory is kept in memory");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    let blobs: Arc<dyn BlobStore> = match &config.blob_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using filesystem blob store");
            Arc::new(LocalFsBlobStore::new(dir.clone(), config.blob_base_url.clone()))
        }
        None => Arc::new(InMemoryBlobStore::new(config.blob_base_url.clone())),
    };

    let completion = Arc::new(OpenAiCompletionClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
    ));
    let relay_settings = RelaySettings {
        model: config.chat_model.clone(),
        system_prompt: config.system_prompt.clone(),
    };

    let services = AppServices::new(store, blobs, completion, relay_settings);
    let items = services.ledger.reload().await?;
    tracing::info!(items = items.len(), "initial inventory loaded");

    Ok(services)
}

/// SSE stream: the current snapshot first, then one event per reload.
pub fn inventory_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    // Subscribe before reading the snapshot so no reload falls in between.
    let rx = services.ledger.subscribe();
    let current = services.ledger.snapshot();

    let initial = tokio_stream::iter(vec![Ok::<_, Infallible>(snapshot_event(&current))]);
    let updates = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(items) => Some(Ok(snapshot_event(&items))),
        // Lagged receivers pick up again at the next reload.
        Err(_) => None,
    });

    Sse::new(initial.chain(updates)).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

fn snapshot_event(items: &[InventoryItem]) -> SseEvent {
    let data = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
    SseEvent::default().event("inventory.snapshot").data(data)
}
