use crate::config::ServerConfig;
use crate::features::catalog::controller::CatalogController;
use crate::features::catalog::repo::xlsx::XlsxCatalogSource;
use crate::features::catalog::repo::{CatalogLoader, CatalogSource};
use crate::features::catalog::service::CatalogService;
use crate::features::cost_estimation::controller::CostEstimationController;
use crate::features::cost_estimation::service::CostEstimationService;
use crate::features::instance_query::controller::InstanceQueryController;
use crate::features::instance_query::service::InstanceQueryService;
use crate::features::observability::controller::ObservabilityController;
use crate::shared::error::{PricingError, PricingResult};
use crate::shared::types::{
    ApiIndexResponse, CatalogMetadata, EstimateResponse, FilterOptions, HealthResponse,
    InstancePage, RawEstimateQuery, RawQueryParameters, RefreshResponse,
};
use axum::extract::{MatchedPath, Query, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tower::Layer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const API_ENDPOINTS: [&str; 7] = [
    "/api/metadata",
    "/api/instances",
    "/api/filter-options",
    "/api/refresh-data",
    "/api/health",
    "/api/estimate",
    "/metrics",
];

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<CatalogService>,
    pub catalog: Arc<CatalogController>,
    pub instances: Arc<InstanceQueryController>,
    pub estimates: Arc<CostEstimationController>,
    pub observability: Arc<ObservabilityController>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        usd_to_inr: f64,
        observability: Arc<ObservabilityController>,
    ) -> Self {
        let catalog_service = Arc::new(
            CatalogService::new(CatalogLoader::new(source))
                .with_observability(Arc::clone(&observability)),
        );

        let query_service = Arc::new(InstanceQueryService::new(Arc::clone(&catalog_service)));
        let estimate_service = Arc::new(CostEstimationService::new(
            Arc::clone(&catalog_service),
            usd_to_inr,
        ));

        Self {
            catalog: Arc::new(CatalogController::new(Arc::clone(&catalog_service))),
            instances: Arc::new(InstanceQueryController::new(query_service)),
            estimates: Arc::new(CostEstimationController::new(estimate_service)),
            catalog_service,
            observability,
        }
    }
}

/// Routes, middleware and CORS headers. Paths are matched exactly; see
/// [`app`] for the trailing-slash handling.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(api_index).fallback(method_fallback))
        .route("/api/health", get(health).fallback(method_fallback))
        .route("/api/metadata", get(metadata).fallback(method_fallback))
        .route("/api/instances", get(list_instances).fallback(method_fallback))
        .route(
            "/api/filter-options",
            get(filter_options).fallback(method_fallback),
        )
        .route(
            "/api/refresh-data",
            post(refresh_data).fallback(method_fallback),
        )
        .route("/api/estimate", get(estimate).fallback(method_fallback))
        .route("/metrics", get(metrics).fallback(method_fallback))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .with_state(state)
}

/// Router with trailing slashes trimmed before routing
pub fn app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

async fn api_index() -> Json<ApiIndexResponse> {
    Json(ApiIndexResponse {
        status: "ok".to_string(),
        message: "AWS EC2 Cost Calculator API".to_string(),
        endpoints: API_ENDPOINTS.iter().map(ToString::to_string).collect(),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn metadata(State(state): State<AppState>) -> Json<CatalogMetadata> {
    Json(state.catalog.metadata().await)
}

// A query string that fails to deserialize is treated as empty.
async fn list_instances(
    State(state): State<AppState>,
    query: Option<Query<RawQueryParameters>>,
) -> Json<InstancePage> {
    let raw = query.map(|Query(raw)| raw).unwrap_or_default();
    Json(state.instances.list_instances(raw).await)
}

async fn filter_options(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(state.instances.filter_options().await)
}

async fn refresh_data(State(state): State<AppState>) -> Json<RefreshResponse> {
    Json(state.catalog.refresh().await)
}

async fn estimate(
    State(state): State<AppState>,
    query: Option<Query<RawEstimateQuery>>,
) -> PricingResult<Json<EstimateResponse>> {
    let raw = query.map(|Query(raw)| raw).unwrap_or_default();
    state.estimates.estimate(raw).await.map(Json)
}

async fn metrics(State(state): State<AppState>) -> PricingResult<Response> {
    let body = state.observability.render_metrics()?;
    Ok(([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response())
}

/// Preflight requests succeed on every route; other unsupported methods get 405.
async fn method_fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    PricingError::MethodNotAllowed(method.to_string()).into_response()
}

async fn not_found(method: Method, uri: Uri) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    PricingError::EndpointNotFound(uri.path().to_string()).into_response()
}

async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    state.observability.record_api_request(
        &endpoint,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %detail, "Request handler panicked");
    PricingError::Internal(detail).into_response()
}

/// HTTP server for the pricing API
pub struct PricingServer {
    config: ServerConfig,
    state: AppState,
}

impl PricingServer {
    pub fn new(config: ServerConfig) -> PricingResult<Self> {
        let observability = ObservabilityController::with_new_registry()?;
        let source = Arc::new(XlsxCatalogSource::new(config.data_path.clone()));
        let state = AppState::new(source, config.usd_to_inr, observability);

        Ok(Self { config, state })
    }

    /// Bind and serve until Ctrl-C
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        if self.config.preload_catalog {
            let catalog = self.state.catalog_service.get_cached().await;
            info!(
                instances = catalog.len(),
                origin = ?catalog.origin,
                "Catalog preloaded"
            );
        }

        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!(
            addr = %self.config.addr,
            data_path = %self.config.data_path.display(),
            "EC2 pricing API listening"
        );

        let service = axum::ServiceExt::<Request>::into_make_service(app(self.state));
        axum::serve(listener, service)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("EC2 pricing API stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::repo::{MockCatalogSource, SampleCatalogSource};
    use axum::body::Body;
    use ec2_pricing_core::{sample_catalog, Catalog, PricingProfile};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn sample_state() -> AppState {
        AppState::new(
            Arc::new(SampleCatalogSource::new()),
            83.5,
            ObservabilityController::with_new_registry().unwrap(),
        )
    }

    async fn send(state: AppState, method: Method, uri: &str) -> Response {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app(state).oneshot(request).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    async fn json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(sample_state(), Method::GET, "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);

        let body = json(response).await;
        assert_eq!(body["status"], "OK");
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_metadata_of_sample_catalog() {
        let response = send(sample_state(), Method::GET, "/api/metadata").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["totalInstances"], 10);
        assert_eq!(body["pagesComplete"], "Sample Data");
        assert_eq!(body["progress"], "10/394 (2.4%)");
    }

    #[tokio::test]
    async fn test_instances_first_page() {
        let response = send(sample_state(), Method::GET, "/api/instances?page=1&limit=10").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["instances"].as_array().unwrap().len(), 10);
        assert_eq!(body["instances"][0]["instanceName"], "t3a.nano");
        assert_eq!(body["instances"][0]["vCPUs"], 2);
        assert_eq!(body["pagination"]["currentPage"], 1);
        assert_eq!(body["pagination"]["totalPages"], 1);
        assert_eq!(body["pagination"]["startIndex"], 1);
        assert_eq!(body["pagination"]["endIndex"], 10);
    }

    #[tokio::test]
    async fn test_instances_conjunctive_search() {
        let response = send(sample_state(), Method::GET, "/api/instances?search=t3%20nano").await;
        let body = json(response).await;
        let names: Vec<&str> = body["instances"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["instanceName"].as_str().unwrap())
            .collect();

        assert!(names.contains(&"t3a.nano"));
        assert!(names.contains(&"t3.nano"));
        assert!(!names.contains(&"t2.micro"));
    }

    #[tokio::test]
    async fn test_instances_bad_params_are_coerced() {
        let response = send(
            sample_state(),
            Method::GET,
            "/api/instances?limit=7&page=abc",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["pagination"]["itemsPerPage"], 10);
        assert_eq!(body["pagination"]["currentPage"], 0);
        assert!(body["instances"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_options() {
        let response = send(sample_state(), Method::GET, "/api/filter-options").await;
        let body = json(response).await;

        assert_eq!(body["families"], serde_json::json!(["c5", "m5", "t2", "t3", "t3a"]));
        assert_eq!(body["vcpus"], serde_json::json!([1, 2]));
        assert_eq!(body["memories"], serde_json::json!(["0.5", "1", "2", "4", "8"]));
    }

    #[tokio::test]
    async fn test_refresh_data_reloads_source() {
        let mut source = MockCatalogSource::new();
        source.expect_describe().return_const("mock".to_string());
        let mut reads = 0;
        source.expect_read().times(2).returning(move || {
            reads += 1;
            let instances = sample_catalog().instances.into_iter().take(reads * 3).collect();
            Ok(Catalog::from_spreadsheet(PricingProfile::default(), instances))
        });
        let state = AppState::new(
            Arc::new(source),
            83.5,
            ObservabilityController::with_new_registry().unwrap(),
        );

        let body = json(send(state.clone(), Method::GET, "/api/metadata").await).await;
        assert_eq!(body["totalInstances"], 3);

        let response = send(state.clone(), Method::POST, "/api/refresh-data").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["message"], "Data refreshed successfully");
        assert_eq!(body["totalInstances"], 6);

        let body = json(send(state, Method::GET, "/api/metadata").await).await;
        assert_eq!(body["totalInstances"], 6);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        for (method, uri) in [
            (Method::GET, "/api/refresh-data"),
            (Method::POST, "/api/instances"),
            (Method::DELETE, "/api/metadata"),
        ] {
            let response = send(sample_state(), method, uri).await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_cors(&response);
            assert_eq!(json(response).await, serde_json::json!({ "error": "Method not allowed" }));
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = send(sample_state(), Method::GET, "/api/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_cors(&response);
        assert_eq!(json(response).await, serde_json::json!({ "error": "Endpoint not found" }));
    }

    #[tokio::test]
    async fn test_options_preflight_is_empty_200() {
        for uri in ["/api/instances", "/api/refresh-data", "/api/does-not-exist"] {
            let response = send(sample_state(), Method::OPTIONS, uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_cors(&response);
            assert!(body_bytes(response).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_trailing_slash_is_trimmed() {
        let response = send(sample_state(), Method::GET, "/api/health/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(sample_state(), Method::GET, "/api/").await;
        let body = json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "AWS EC2 Cost Calculator API");
        assert!(body["endpoints"]
            .as_array()
            .unwrap()
            .contains(&Value::from("/api/instances")));
    }

    #[tokio::test]
    async fn test_estimate() {
        let response = send(
            sample_state(),
            Method::GET,
            "/api/estimate?instance=t3a.nano&count=3&currency=INR",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["plan"], "on-demand");
        assert_eq!(body["instanceCount"], 3);
        assert_eq!(body["currency"], "INR");
        assert!((body["monthlyCost"].as_f64().unwrap() - 16.863).abs() < 1e-9);
        assert_eq!(body["exchangeRate"], 83.5);
        assert!(body["breakdown"]["savingsPlanHourlyRate"].is_number());
    }

    #[tokio::test]
    async fn test_estimate_unknown_instance() {
        let response = send(sample_state(), Method::GET, "/api/estimate?instance=z9.huge").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await, serde_json::json!({ "error": "Instance not found" }));
    }

    #[tokio::test]
    async fn test_metrics_records_matched_routes() {
        let state = sample_state();
        send(state.clone(), Method::GET, "/api/health").await;
        send(state.clone(), Method::GET, "/api/nope").await;

        let response = send(state, Method::GET, "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(text.contains("pricing_api_request_total{endpoint=\"/api/health\",status=\"200\"} 1"));
        assert!(text.contains("pricing_api_request_total{endpoint=\"unmatched\",status=\"404\"} 1"));
    }

    async fn boom() -> &'static str {
        panic!("boom")
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let router = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ));

        let request = axum::http::Request::builder()
            .uri("/boom")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(json(response).await, serde_json::json!({ "error": "Internal server error" }));
    }
}
