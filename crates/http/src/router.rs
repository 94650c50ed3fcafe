//! Router builder for the bookshelf HTTP server

use anyhow::Context;
use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode, Uri},
    Router,
};
use std::time::Duration;
use tower::ServiceExt;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa_swagger_ui::SwaggerUi;
use uuid::{Timestamp, Uuid};

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

/// Path serving the interactive documentation.
pub const DOCS_PATH: &str = "/api-docs";
/// Path serving the raw OpenAPI document.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/{module_name}`.
    ///
    /// The module root also answers with a trailing slash.
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let root = module_root(module_name);
        let root_alias = module_router.clone().map_request(rewrite_to_module_root);

        self.router = self
            .router
            .route_service(&format!("{}/", root), root_alias)
            .nest(&root, module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed on the response.
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_millis(timeout_ms),
            ));
        self
    }

    /// Serve the merged OpenAPI document and Swagger UI.
    ///
    /// Fails when the merged document is not a valid OpenAPI description.
    pub fn with_openapi(
        mut self,
        registry: &ModuleRegistry,
        settings: &Settings,
    ) -> anyhow::Result<Self> {
        let openapi_spec = collect_openapi(registry, settings);

        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec)
            .context("merged OpenAPI document is not a valid OpenAPI description")?;

        tracing::info!(
            paths = openapi_obj.paths.paths.len(),
            "serving API documentation at {}",
            DOCS_PATH
        );

        self.router = self
            .router
            .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_JSON_PATH, openapi_obj));

        Ok(self)
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the base document with every module's fragment.
pub fn collect_openapi(registry: &ModuleRegistry, settings: &Settings) -> serde_json::Value {
    let mut openapi_spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Books API",
            "version": "1.0.0",
            "description": "CRUD API for managing books."
        },
        "servers": [
            { "url": format!("http://localhost:{}/", settings.server.port) }
        ],
        "paths": {},
        "components": {
            "schemas": {}
        },
        "tags": []
    });

    openapi_spec["paths"]["/healthz"] = serde_json::json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": {
                                "type": "string"
                            }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
            for (path, path_item) in paths {
                let prefixed_path = prefixed_path(module.name(), path);
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }

        if let Some(tags) = module_spec.get("tags").and_then(|t| t.as_array()) {
            if let Some(merged) = openapi_spec["tags"].as_array_mut() {
                for tag in tags {
                    let name = tag.get("name");
                    if !merged.iter().any(|known| known.get("name") == name) {
                        merged.push(tag.clone());
                    }
                }
            }
        }
    }

    openapi_spec
}

fn module_root(module_name: &str) -> String {
    format!("/api/{}", module_name)
}

/// `/` addresses the module root itself, so it maps to `/api/{module}`.
fn prefixed_path(module_name: &str, path: &str) -> String {
    let root = module_root(module_name);
    match path {
        "" | "/" => root,
        _ => format!("{}{}", root, path),
    }
}

/// Point a request for `/api/{module}/` at the module router's own root.
fn rewrite_to_module_root(mut request: Request) -> Request {
    let target = match request.uri().query() {
        Some(query) => format!("/?{}", query),
        None => "/".to_string(),
    };
    if let Ok(uri) = target.parse::<Uri>() {
        *request.uri_mut() = uri;
    }
    request
}

/// Request ID generator producing time-ordered UUIDs
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
