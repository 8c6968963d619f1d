use crate::auth;
use crate::handlers::{self, AppState};
use crate::openapi::ApiDoc;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the application router.
///
/// API routes sit behind bearer-token auth and, when `rate_limited` is set,
/// a per-IP limiter of 10 req/s with a burst of 20. The per-IP limiter needs
/// the peer address, so serve with `into_make_service_with_connect_info`.
/// `/health` and the docs bypass both.
pub fn build_app(state: Arc<AppState>, rate_limited: bool) -> anyhow::Result<Router> {
    let mut api_routes = Router::new()
        .route("/api/v1/ceidg/companies/:nip", get(handlers::get_company))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_access_token,
        ));

    if rate_limited {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(10)
                .burst_size(20)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
        );

        api_routes = api_routes.layer(ServiceBuilder::new().layer(GovernorLayer {
            config: governor_conf,
        }));
    }

    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app)
}
