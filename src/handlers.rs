use crate::config::Config;
use crate::errors::AppError;
use crate::models::CompanyRecord;
use crate::services::{LookupOutcome, RegistryLookupService};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use regex::Regex;
use serde_json::json;
use std::sync::{Arc, LazyLock};

/// Route-level NIP shape check; the service validates again.
static NIP_PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{10}$").expect("NIP path pattern is a valid regex")
});

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// CEIDG lookup pipeline (client, cache, circuit breaker).
    pub lookup: RegistryLookupService,
}

/// Health check endpoint.
///
/// Returns the service status, version, and lookup cache size.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "cache_entries": state.lookup.cached_entries()
        })),
    )
}

/// GET /api/v1/ceidg/companies/:nip
///
/// Returns the CEIDG company registered under a 10-digit NIP.
///
/// # Returns
///
/// * `200` - The company record, with `null` for every missing optional field.
/// * `404` - Malformed NIP, or no company registered under it.
/// * `503` - CEIDG is unavailable; `Retry-After` says when to try again.
#[utoipa::path(
    get,
    path = "/api/v1/ceidg/companies/{nip}",
    tag = "ceidg",
    params(("nip" = String, Path, description = "10-digit Polish tax identifier (NIP)")),
    responses(
        (status = 200, description = "Company found", body = CompanyRecord),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Invalid NIP or company not found"),
        (status = 503, description = "CEIDG unavailable, see Retry-After")
    ),
    security(("bearer" = []))
)]
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(nip): Path<String>,
) -> Result<Json<CompanyRecord>, AppError> {
    tracing::info!("GET /ceidg/companies/{}", nip);

    if !NIP_PATH_PATTERN.is_match(&nip) {
        return Err(AppError::NotFound(format!(
            "Invalid NIP format: {}. NIP must be exactly 10 digits.",
            nip
        )));
    }

    match state.lookup.find_by_nip(&nip).await {
        LookupOutcome::Found(company) => Ok(Json(company.as_ref().clone())),
        LookupOutcome::NotFound(reason) => {
            tracing::debug!("NIP {} not found: {:?}", nip, reason);
            Err(AppError::NotFound(format!(
                "Company with NIP {} not found in CEIDG registry",
                nip
            )))
        }
        LookupOutcome::ServiceUnavailable { retry_after } => Err(AppError::ServiceUnavailable {
            message: "Unable to fetch company data from CEIDG. Please try again later."
                .to_string(),
            retry_after,
        }),
    }
}
