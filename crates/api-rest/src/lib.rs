//! # API REST
//!
//! REST API for StudyCoor.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialisation, CORS, status codes)
//!
//! All compliance semantics live in `studycoor-core`; handlers only translate requests and map
//! errors onto status codes.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studycoor_core::{
    describe_token, ActualBreakdown, Bottle, CalculationRecord, ComplianceBreakdown,
    ComplianceEngine, ComplianceResult, CoreConfig, CoreError, DosingDefaults, DosingFrequency,
    DrugRecord, DrugResult, ExpectedBreakdown, VisitRecord, VisitResult,
};
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
}

impl AppState {
    pub fn new(cfg: CoreConfig) -> Self {
        Self { cfg: Arc::new(cfg) }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Human-readable message suitable for display.
    pub error: String,
    /// Stable machine-readable kind.
    pub kind: String,
    /// Drug whose computation failed, for visits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drug: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlagDescriptionRes {
    pub token: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FrequencyRes {
    pub code: DosingFrequency,
    pub label: String,
    /// Absent for `PRN`.
    pub doses_per_day: Option<u32>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_frequencies, compute_compliance, compute_visit, describe_flag),
    components(schemas(
        HealthRes,
        ErrorRes,
        FlagDescriptionRes,
        FrequencyRes,
        CalculationRecord,
        VisitRecord,
        DrugRecord,
        Bottle,
        DosingDefaults,
        DosingFrequency,
        ComplianceResult,
        ComplianceBreakdown,
        ExpectedBreakdown,
        ActualBreakdown,
        VisitResult,
        DrugResult,
    ))
)]
pub struct ApiDoc;

/// Error returned by handlers, rendered as [`ErrorRes`].
#[derive(Debug)]
pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

/// Bodies that fail to deserialise share the `400 invalid_input` response of malformed dates.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CoreError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, drug) = match &self.0 {
            CoreError::Compliance(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.kind(), None),
            CoreError::Visit(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.source.kind(),
                Some(e.drug.clone()),
            ),
            CoreError::YamlSerialization(_) => {
                tracing::error!("Render error: {:?}", self.0);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorRes {
                        error: "Internal error".into(),
                        kind: "internal".into(),
                        drug: None,
                    }),
                )
                    .into_response();
            }
            _ => (StatusCode::BAD_REQUEST, "invalid_input", None),
        };

        tracing::warn!("Rejected request ({kind}): {}", self.0);
        (
            status,
            Json(ErrorRes {
                error: self.0.to_string(),
                kind: kind.into(),
                drug,
            }),
        )
            .into_response()
    }
}

/// Build the REST router, including Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/frequencies", get(list_frequencies))
        .route("/compliance", post(compute_compliance))
        .route("/visits", post(compute_visit))
        .route("/flags/:token", get(describe_flag))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "StudyCoor REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/frequencies",
    responses(
        (status = 200, description = "Supported dosing frequencies", body = [FrequencyRes])
    )
)]
#[axum::debug_handler]
async fn list_frequencies() -> Json<Vec<FrequencyRes>> {
    Json(
        DosingFrequency::ALL
            .into_iter()
            .map(|f| FrequencyRes {
                code: f,
                label: f.label().into(),
                doses_per_day: f.doses_per_day(),
            })
            .collect(),
    )
}

#[utoipa::path(
    post,
    path = "/compliance",
    request_body = CalculationRecord,
    responses(
        (status = 200, description = "Compliance computed", body = ComplianceResult),
        (status = 400, description = "Body does not match the record schema, or a malformed date", body = ErrorRes),
        (status = 422, description = "Input failed validation", body = ErrorRes)
    )
)]
/// Compute compliance for a single calculation request.
///
/// Uses the calendar resolved at startup for day boundaries.
///
/// # Errors
/// Returns `400 Bad Request` for bodies that do not match the record schema (unknown keys,
/// unknown frequency codes, wrong types) or carry malformed dates, and
/// `422 Unprocessable Entity` when the input fails validation (negative values, end before start, returned above dispensed).
#[axum::debug_handler]
async fn compute_compliance(
    State(state): State<AppState>,
    req: Result<Json<CalculationRecord>, JsonRejection>,
) -> Result<Json<ComplianceResult>, ApiError> {
    let Json(req) = req?;
    let input = req.to_input()?;
    let result =
        ComplianceEngine::compute(&input, state.cfg.calendar()).map_err(CoreError::from)?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/visits",
    request_body = VisitRecord,
    responses(
        (status = 200, description = "Compliance computed for every drug", body = VisitResult),
        (status = 400, description = "Malformed date or input", body = ErrorRes),
        (status = 422, description = "A drug failed validation", body = ErrorRes)
    )
)]
/// Compute compliance for every drug of a multi-drug visit.
///
/// All-or-nothing: if any drug fails validation no results are returned.
#[axum::debug_handler]
async fn compute_visit(
    State(state): State<AppState>,
    req: Result<Json<VisitRecord>, JsonRejection>,
) -> Result<Json<VisitResult>, ApiError> {
    let Json(req) = req?;
    let visit = req.to_visit()?;
    let result = visit.compute(state.cfg.calendar()).map_err(CoreError::from)?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/flags/{token}",
    params(
        ("token" = String, Path, description = "Stored flag token, e.g. HOLD_DAYS:2")
    ),
    responses(
        (status = 200, description = "Human description of the flag", body = FlagDescriptionRes)
    )
)]
#[axum::debug_handler]
async fn describe_flag(Path(token): Path<String>) -> Json<FlagDescriptionRes> {
    let description = describe_token(&token);
    Json(FlagDescriptionRes { token, description })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(CoreConfig::default()))
    }

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app().oneshot(req).await.expect("response");
        let status = res.status();
        let bytes = res
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn computes_single_calculation() {
        let (status, body) = send(post_json(
            "/compliance",
            serde_json::json!({
                "start_date": "2025-02-01",
                "end_date": "2025-02-14",
                "frequency": "BID",
                "dispensed": 40,
                "returned": 10,
                "missed_doses": 2,
                "hold_days": 2,
                "partial_dose_enabled": true
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expected_doses"], 24.0);
        assert_eq!(body["actual_doses"], 28.0);
        assert_eq!(body["flags"], serde_json::json!(["OVERUSE", "HOLD_DAYS:2"]));
        assert_eq!(body["breakdown"]["expected"]["effective_days"], 12);
    }

    #[tokio::test]
    async fn validation_failure_is_unprocessable() {
        let (status, body) = send(post_json(
            "/compliance",
            serde_json::json!({
                "start_date": "2025-02-01",
                "end_date": "2025-02-01",
                "dispensed": 10,
                "returned": 12
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "returned_exceeds_dispensed");
        assert_eq!(body["error"], "Returned cannot exceed dispensed.");
    }

    #[tokio::test]
    async fn malformed_date_is_bad_request() {
        let (status, body) = send(post_json(
            "/compliance",
            serde_json::json!({
                "start_date": "yesterday",
                "end_date": "2025-02-01"
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn unknown_frequency_is_bad_request() {
        let (status, body) = send(post_json(
            "/compliance",
            serde_json::json!({
                "start_date": "2025-02-01",
                "end_date": "2025-02-14",
                "frequency": "Q4H",
                "dispensed": 10
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_input");
        assert!(body["error"]
            .as_str()
            .expect("error text")
            .contains("Q4H"));
    }

    #[tokio::test]
    async fn unknown_key_is_bad_request() {
        let (status, body) = send(post_json(
            "/compliance",
            serde_json::json!({
                "start_date": "2025-02-01",
                "end_date": "2025-02-14",
                "dispensed": 10,
                "site_code": "S01"
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn visit_missing_dates_is_bad_request() {
        let (status, body) = send(post_json(
            "/visits",
            serde_json::json!({
                "drugs": [{ "name": "Drug A", "dispensed": 10 }]
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn visit_failure_names_drug() {
        let (status, body) = send(post_json(
            "/visits",
            serde_json::json!({
                "start_date": "2025-05-01",
                "end_date": "2025-05-10",
                "drugs": [
                    { "name": "Drug A", "dispensed": 10 },
                    { "name": "Drug B", "dispensed": 1, "returned": 5 }
                ]
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["drug"], "Drug B");
    }

    #[tokio::test]
    async fn visit_returns_every_drug_in_order() {
        let (status, body) = send(post_json(
            "/visits",
            serde_json::json!({
                "start_date": "2025-05-01",
                "end_date": "2025-05-10",
                "drugs": [
                    { "name": "Drug A", "dispensed": 10 },
                    { "name": "Drug B", "frequency": "BID", "dispensed": 20 }
                ]
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["drugs"][0]["name"], "Drug A");
        assert_eq!(body["drugs"][1]["result"]["expected_doses"], 20.0);
    }

    #[tokio::test]
    async fn describes_flag_tokens() {
        let (status, body) = send(get("/flags/HOLD_DAYS:1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "Paused for 1 hold day");
    }

    #[tokio::test]
    async fn lists_frequencies() {
        let (status, body) = send(get("/frequencies")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["code"], "QD");
        assert_eq!(body[4]["doses_per_day"], serde_json::Value::Null);
    }
}
