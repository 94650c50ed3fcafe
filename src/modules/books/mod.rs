pub mod models;
pub mod routes;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};

use store::BookStore;

/// Books module: owns the process-wide book store and exposes it over HTTP
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self { store }
    }

    /// Handle to the store shared with every request
    pub fn store(&self) -> &BookStore {
        &self.store
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.books.seed && self.store.is_empty().await {
            self.store.seed([models::sample_book()]).await;
        }

        let books = self.store.len().await;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::api_router(self.store.clone()).0
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let (_, api) = routes::api_router(self.store.clone());
        match serde_json::to_value(api) {
            Ok(document) => Some(document),
            Err(error) => {
                tracing::error!(module = self.name(), %error, "failed to serialize OpenAPI fragment");
                None
            }
        }
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let books = self.store.len().await;
        tracing::info!(module = self.name(), books, "books module stopped");
        Ok(())
    }
}

/// Create the books module around a fresh store
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(BookStore::new()))
}
