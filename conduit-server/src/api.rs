use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use conduit_models::{
    Channel, CreateChannelRequest, DeleteChannelRequest, ListChannelsQuery,
    PublishMessageRequest, PublishMessageResponse, UpdateChannelRequest,
};
use conduit_orchestrations::messaging::MessagePublisher;
use conduit_orchestrations::{ChannelError, ChannelKey, ChannelOrchestrator, ErrorKind};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared API state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: ChannelOrchestrator,
    pub publisher: MessagePublisher,
}

impl AppState {
    pub fn new(orchestrator: ChannelOrchestrator) -> Self {
        let services = orchestrator.services();
        let publisher = MessagePublisher::new(
            services.topics.clone(),
            services.topology.fan_out_topic_arn.clone(),
        );
        Self {
            orchestrator,
            publisher,
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/channels", get(list_channels).post(create_channel))
        .route("/api/channels/delete", post(delete_channel))
        .route("/api/channels/update", post(update_channel))
        .route("/api/messages", post(publish_message))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("✓ API server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

// ============================================================================
// Health Check
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "conduit",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ============================================================================
// Channels
// ============================================================================

async fn create_channel(
    State(state): State<AppState>,
    body: Result<Json<CreateChannelRequest>, JsonRejection>,
) -> Result<Json<Channel>, AppError> {
    let Json(request) = body?;
    let name = request
        .name
        .ok_or_else(|| AppError::BadRequest("missing required key 'name'".to_string()))?;

    let channel = state.orchestrator.create_channel(&name).await?;
    Ok(Json(channel))
}

async fn delete_channel(
    State(state): State<AppState>,
    body: Result<Json<DeleteChannelRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = body?;

    // The immutable id wins when both keys are present
    let key = match (request.id, request.name) {
        (Some(id), _) => {
            let id = id
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("id must be an integer, got '{}'", id)))?;
            ChannelKey::Id(id)
        }
        (None, Some(name)) => ChannelKey::Alias(name),
        (None, None) => {
            return Err(AppError::BadRequest("missing required key 'id' or 'name'".to_string()))
        }
    };

    state.orchestrator.delete_channel(key).await?;
    Ok(StatusCode::OK)
}

async fn update_channel(
    State(state): State<AppState>,
    body: Result<Json<UpdateChannelRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = body?;
    if request.channel.trim().is_empty() {
        return Err(AppError::BadRequest("missing required key 'channel'".to_string()));
    }

    tracing::info!(
        channel = %request.channel,
        account = %request.account,
        action = %request.request.action,
        "Channel update requested"
    );

    let key = ChannelKey::from_reference(&request.channel);
    state.orchestrator.update_channel(key, &request.request).await?;
    Ok(StatusCode::OK)
}

async fn list_channels(
    State(state): State<AppState>,
    Query(query): Query<ListChannelsQuery>,
) -> Result<Json<Vec<Channel>>, AppError> {
    match query.kind.as_deref() {
        None | Some("all") => Ok(Json(state.orchestrator.list_channels().await?)),
        Some(other) => Err(AppError::BadRequest(format!("unsupported list type '{}'", other))),
    }
}

// ============================================================================
// Messages
// ============================================================================

async fn publish_message(
    State(state): State<AppState>,
    body: Result<Json<PublishMessageRequest>, JsonRejection>,
) -> Result<Json<PublishMessageResponse>, AppError> {
    let Json(request) = body?;
    let message_id = state.publisher.publish(&request).await?;
    Ok(Json(PublishMessageResponse { message_id }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    /// Malformed body, rejected before any orchestration starts
    BadRequest(String),
    Channel(ChannelError),
}

impl From<ChannelError> for AppError {
    fn from(err: ChannelError) -> Self {
        AppError::Channel(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Remote => StatusCode::BAD_GATEWAY,
        ErrorKind::Registry | ErrorKind::Configuration | ErrorKind::Runtime => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (kind, message) = match self {
            AppError::BadRequest(msg) => (ErrorKind::Validation, msg),
            AppError::Channel(err) => (err.kind(), err.to_string()),
        };
        let status = status_for(kind);

        if status.is_server_error() {
            tracing::error!(kind = kind.as_str(), "Request failed: {}", message);
        } else {
            tracing::warn!(kind = kind.as_str(), "Request rejected: {}", message);
        }

        let body = Json(serde_json::json!({
            "error": message,
            "kind": kind.as_str()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;

    use conduit_orchestrations::cloud::{ops, LocalCloud};
    use conduit_orchestrations::store::MemoryRegistry;
    use conduit_orchestrations::topology::{ChannelServices, SharedTopology};
    use duroxide::providers::sqlite::SqliteProvider;
    use tower::ServiceExt;

    async fn test_app() -> (Router, LocalCloud) {
        let cloud = LocalCloud::default();
        cloud.bootstrap_shared().await.unwrap();
        let topology = SharedTopology::resolve(None, None, &cloud).await.unwrap();
        let services =
            ChannelServices::local(cloud.clone(), Arc::new(MemoryRegistry::new()), topology);
        let store = Arc::new(SqliteProvider::new_in_memory().await.unwrap());
        let orchestrator = ChannelOrchestrator::start(store, Arc::new(services)).await;
        (create_router(AppState::new(orchestrator)), cloud)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json(bytes: &[u8]) -> serde_json::Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _cloud) = test_app().await;
        let (status, body) = send(&app, "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["status"], "healthy");
    }

    #[tokio::test]
    async fn test_create_returns_channel_payload() {
        let (app, _cloud) = test_app().await;
        let (status, body) = send(&app, "POST", "/api/channels", r#"{"name":"sports"}"#).await;
        assert_eq!(status, StatusCode::OK);

        let channel = json(&body);
        assert_eq!(channel["ID"], 1);
        assert_eq!(channel["Alias"], "sports");
        for key in ["TableARN", "QueueARN", "EndpointTopicARN", "SubscriptionARN"] {
            assert!(!channel[key].as_str().unwrap().is_empty(), "{} empty", key);
        }
    }

    #[tokio::test]
    async fn test_create_without_name_is_bad_request() {
        let (app, cloud) = test_app().await;
        let (status, body) = send(&app, "POST", "/api/channels", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["kind"], "validation");
        assert!(cloud.table_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (app, _cloud) = test_app().await;
        let (status, body) = send(&app, "POST", "/api/channels", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["kind"], "validation");
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let (app, _cloud) = test_app().await;
        send(&app, "POST", "/api/channels", r#"{"name":"sports"}"#).await;
        let (status, body) = send(&app, "POST", "/api/channels", r#"{"name":"sports"}"#).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json(&body)["kind"], "conflict");
    }

    #[tokio::test]
    async fn test_remote_failure_is_bad_gateway() {
        let (app, cloud) = test_app().await;
        cloud.fail_on(ops::CREATE_TABLE).await;
        let (status, body) = send(&app, "POST", "/api/channels", r#"{"name":"sports"}"#).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json(&body)["kind"], "remote");
    }

    #[tokio::test]
    async fn test_delete_by_id_then_not_found() {
        let (app, _cloud) = test_app().await;
        send(&app, "POST", "/api/channels", r#"{"name":"sports"}"#).await;

        let (status, body) = send(&app, "POST", "/api/channels/delete", r#"{"id":"1"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        let (status, body) = send(&app, "POST", "/api/channels/delete", r#"{"name":"sports"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_delete_with_non_numeric_id_is_bad_request() {
        let (app, _cloud) = test_app().await;
        let (status, _) = send(&app, "POST", "/api/channels/delete", r#"{"id":"one"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_rename_and_list() {
        let (app, _cloud) = test_app().await;
        send(&app, "POST", "/api/channels", r#"{"name":"foo"}"#).await;

        let body = r#"{"channel":"foo","account":"7","request":{"action":"ChangeChannelName","parameters":[{"name":"bar"}]}}"#;
        let (status, response) = send(&app, "POST", "/api/channels/update", body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.is_empty());

        let (status, body) = send(&app, "GET", "/api/channels?type=all", "").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json(&body);
        assert_eq!(rows.as_array().unwrap().len(), 1);
        assert_eq!(rows[0]["Alias"], "bar");
    }

    #[tokio::test]
    async fn test_update_with_wrong_arity_is_bad_request() {
        let (app, _cloud) = test_app().await;
        send(&app, "POST", "/api/channels", r#"{"name":"foo"}"#).await;

        let body = r#"{"channel":"1","account":"7","request":{"action":"ChangeChannelName","parameters":[]}}"#;
        let (status, body) = send(&app, "POST", "/api/channels/update", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["kind"], "validation");
    }

    #[tokio::test]
    async fn test_unknown_update_action_is_ok() {
        let (app, _cloud) = test_app().await;
        send(&app, "POST", "/api/channels", r#"{"name":"foo"}"#).await;

        let body = r#"{"channel":"1","account":"7","request":{"action":"Archive","parameters":[]}}"#;
        let (status, _) = send(&app, "POST", "/api/channels/update", body).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_update_action_on_missing_channel_is_ok() {
        let (app, _cloud) = test_app().await;

        let body = r#"{"channel":"ghost","account":"7","request":{"action":"Archive","parameters":[]}}"#;
        let (status, response) = send(&app, "POST", "/api/channels/update", body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.is_empty());
    }

    #[test]
    fn test_runtime_failure_is_server_error() {
        assert_eq!(status_for(ErrorKind::Runtime), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_publish_returns_message_id() {
        let (app, _cloud) = test_app().await;
        send(&app, "POST", "/api/channels", r#"{"name":"sports"}"#).await;

        let body = r#"{"message":"goal","channel":"sports","account":"42","timestamp":"1700000000"}"#;
        let (status, response) = send(&app, "POST", "/api/messages", body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!json(&response)["message_id"].as_str().unwrap().is_empty());

        let bad = r#"{"message":"goal","channel":"sports","account":"x","timestamp":"1"}"#;
        let (status, _) = send(&app, "POST", "/api/messages", bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
