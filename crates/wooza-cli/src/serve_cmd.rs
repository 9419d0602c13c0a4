use std::net::SocketAddr;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use wooza_core::PlanService;
use wooza_core::plan::validate::{ALREADY_EXISTS, InvalidField};
use wooza_core::plan::{PlanError, PlanPayload, QueryParams};
use wooza_db::models::Plan;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Error response: `{"error": {"code", "message", "invalid_fields"?}}`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    invalid_fields: Vec<InvalidField>,
}

impl AppError {
    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn new(status: StatusCode) -> Self {
        Self {
            status,
            invalid_fields: Vec::new(),
        }
    }

    fn with_fields(mut self, invalid_fields: Vec<InvalidField>) -> Self {
        self.invalid_fields = invalid_fields;
        self
    }

    fn message(&self) -> &'static str {
        match self.status {
            StatusCode::BAD_REQUEST => "Bad Request.",
            StatusCode::NOT_FOUND => "Not Found.",
            _ => "Internal Server Error.",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: u16,
    message: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    invalid_fields: Vec<InvalidField>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.status.as_u16(),
                message: self.message(),
                invalid_fields: self.invalid_fields,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Invalid(fields) => {
                tracing::debug!(errors = fields.len(), "rejected plan payload");
                Self::bad_request().with_fields(fields)
            }
            PlanError::NotFound(id) => {
                tracing::debug!(id, "plan not found");
                Self::not_found()
            }
            // Duplicate codes keep the 500 status existing clients expect.
            PlanError::CodeExists(code) => {
                tracing::warn!(plan_code = %code, "plan code already exists");
                Self::internal().with_fields(vec![InvalidField::new("plan_code", ALREADY_EXISTS)])
            }
            PlanError::Filter(err) => {
                tracing::debug!(error = %err, "rejected list filter");
                Self::bad_request().with_fields(vec![InvalidField::new("ddds", "is not a valid list.")])
            }
            PlanError::Store(err) => {
                tracing::error!(error = %format!("{err:#}"), "plan store failure");
                Self::internal()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Success envelope. `total` is only present on list responses.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: Vec<Plan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    pub status_code: u16,
}

impl DataResponse {
    fn single(plan: Plan) -> Self {
        Self {
            data: vec![plan],
            total: None,
            status_code: StatusCode::OK.as_u16(),
        }
    }
}

impl IntoResponse for DataResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(service: PlanService) -> Router {
    Router::new()
        .route("/plans/create", post(create_plan).fallback(wrong_method))
        .route(
            "/plans/update/{id}",
            post(update_plan).put(update_plan).fallback(wrong_method),
        )
        .route("/plans/delete/{id}", post(delete_plan).fallback(wrong_method))
        .route("/plans/", get(list_plans).fallback(wrong_method))
        .route("/plans", get(list_plans).fallback(wrong_method))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(service: PlanService, bind: &str, port: u16) -> Result<()> {
    let app = build_router(service);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("wooza serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("wooza serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl+C; shutting down");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn wrong_method() -> AppError {
    AppError::bad_request()
}

fn decode_payload(body: &Bytes) -> Result<PlanPayload, AppError> {
    PlanPayload::from_json(body).map_err(|err| {
        tracing::debug!(error = %err, "undecodable plan body");
        AppError::bad_request()
    })
}

/// Path ids that are not integers address no plan.
fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>().map_err(|_| AppError::not_found())
}

async fn create_plan(
    State(service): State<PlanService>,
    body: Bytes,
) -> Result<DataResponse, AppError> {
    let payload = decode_payload(&body)?;
    let plan = service.create(&payload).await?;
    Ok(DataResponse::single(plan))
}

async fn update_plan(
    State(service): State<PlanService>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<DataResponse, AppError> {
    let id = parse_id(&id)?;
    let payload = decode_payload(&body)?;
    let plan = service.update(id, &payload).await?;
    Ok(DataResponse::single(plan))
}

async fn delete_plan(
    State(service): State<PlanService>,
    Path(id): Path<String>,
) -> Result<DataResponse, AppError> {
    let id = parse_id(&id)?;
    let snapshot = service.delete(id).await?;
    Ok(DataResponse::single(snapshot))
}

async fn list_plans(
    State(service): State<PlanService>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<DataResponse, AppError> {
    let params: QueryParams = pairs.into_iter().collect();
    let plans = service.list(&params).await?;

    let status = if plans.is_empty() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    Ok(DataResponse {
        total: Some(plans.len()),
        data: plans,
        status_code: status.as_u16(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
