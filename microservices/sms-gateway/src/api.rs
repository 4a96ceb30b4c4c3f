//! JSON API of the gateway service

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use smsgate_core::{
    CampaignReport, DispatchSettings, GatewayError, ReceivedMessage, Recipient,
};
use smsgate_proto::ApiResponse;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::client::{GatewayStatus, PortReport, TaskStatusReport};
use crate::dispatcher::CampaignDispatcher;
use crate::export::received_to_csv;
use crate::metrics::MetricsSnapshot;
use crate::time_window::TimeWindow;

/// Inbox window used when a query names none
pub const DEFAULT_INBOX_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<CampaignDispatcher>,
    pub settings: DispatchSettings,
    /// One campaign at a time per process; ports are positional
    campaign_gate: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(dispatcher: Arc<CampaignDispatcher>, settings: DispatchSettings) -> Self {
        Self {
            dispatcher,
            settings,
            campaign_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Wait until every started or queued campaign has finished
    pub async fn drain_campaigns(&self) {
        let _idle = self.campaign_gate.lock().await;
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Probes
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .route("/status", get(gateway_status))
        // Outbound
        .route("/campaigns", post(run_campaign))
        .route("/tasks/{id}", get(task_status))
        // Device
        .route("/ports", get(ports))
        // Inbound
        .route("/inbox/query", post(query_inbox))
        .route("/inbox/export", get(export_inbox))
        .with_state(state)
}

type ApiFailure = (StatusCode, Json<ApiResponse<()>>);
type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiFailure>;

fn failure(err: GatewayError) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::err(err.error_code(), err.to_string())))
}

async fn health() -> &'static str {
    "OK"
}

async fn ready(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.dispatcher.client().check_reachable().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "gateway unreachable")
    }
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.dispatcher.metrics().snapshot())
}

async fn gateway_status(State(state): State<AppState>) -> Json<ApiResponse<GatewayStatus>> {
    Json(ApiResponse::ok(
        state.dispatcher.client().check_status().await,
    ))
}

#[derive(Debug, Deserialize)]
struct CampaignRequest {
    recipients: Vec<Recipient>,
    delay_ms: Option<i64>,
    port_count: Option<u8>,
}

async fn run_campaign(
    State(state): State<AppState>,
    Json(req): Json<CampaignRequest>,
) -> ApiResult<CampaignReport> {
    let settings = DispatchSettings::new(
        req.delay_ms
            .unwrap_or(state.settings.delay().as_millis() as i64),
        req.port_count.unwrap_or(state.settings.port_count()),
    )
    .map_err(failure)?;

    // Detached from the request: a dropped connection must not cut the
    // campaign short.
    let gate = state.campaign_gate.clone();
    let dispatcher = state.dispatcher.clone();
    let campaign = tokio::spawn(async move {
        let _gate = gate.lock_owned().await;
        dispatcher.run_campaign(&req.recipients, &settings).await
    });

    let report = campaign.await.map_err(|e| {
        error!(error = %e, "Campaign task failed");
        failure(GatewayError::Internal(format!("Campaign task failed: {}", e)))
    })?;

    Ok(Json(ApiResponse::ok(report)))
}

async fn task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TaskStatusReport> {
    let report = state
        .dispatcher
        .client()
        .query_task_status(&id)
        .await
        .map_err(failure)?;
    Ok(Json(ApiResponse::ok(report)))
}

async fn ports(State(state): State<AppState>) -> ApiResult<PortReport> {
    let report = state
        .dispatcher
        .client()
        .port_report()
        .await
        .map_err(failure)?;
    Ok(Json(ApiResponse::ok(report)))
}

#[derive(Debug, Default, Deserialize)]
struct InboxQuery {
    begintime: Option<String>,
    endtime: Option<String>,
    hours: Option<i64>,
    #[serde(alias = "port")]
    ports: Option<String>,
    #[serde(alias = "phonenum")]
    phone: Option<String>,
}

impl InboxQuery {
    fn window(&self) -> Result<TimeWindow, GatewayError> {
        match (&self.begintime, &self.endtime) {
            (Some(begin), Some(end)) => TimeWindow::new(begin.as_str(), end.as_str()),
            (None, None) => TimeWindow::last_hours(self.hours.unwrap_or(DEFAULT_INBOX_HOURS)),
            _ => Err(GatewayError::Validation(
                "begintime and endtime must be given together".to_string(),
            )),
        }
    }
}

async fn fetch_inbox(state: &AppState, query: &InboxQuery) -> Result<Vec<ReceivedMessage>, ApiFailure> {
    let window = query.window().map_err(failure)?;

    let messages = state
        .dispatcher
        .client()
        .query_received(&window, query.ports.as_deref(), query.phone.as_deref())
        .await
        .map_err(failure)?;

    info!(
        begintime = %window.begintime,
        endtime = %window.endtime,
        count = messages.len(),
        "Inbox query served"
    );
    Ok(messages)
}

async fn query_inbox(
    State(state): State<AppState>,
    Json(query): Json<InboxQuery>,
) -> ApiResult<Vec<ReceivedMessage>> {
    let messages = fetch_inbox(&state, &query).await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// Same window and filters as `/inbox/query`, taken from the query string
async fn export_inbox(
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
) -> Result<Response, ApiFailure> {
    let messages = fetch_inbox(&state, &query).await?;

    if messages.is_empty() {
        warn!("Inbox export found no messages");
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err("NOT_FOUND", "No messages found")),
        ));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"received_messages.csv\"",
            ),
        ],
        received_to_csv(&messages),
    )
        .into_response())
}
