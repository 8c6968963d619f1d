use crate::models::{Address, CompanyRecord};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CEIDG Lookup API",
        description = "Company data from the Polish Central Register and Information on Business (CEIDG), by NIP"
    ),
    paths(crate::handlers::health, crate::handlers::get_company),
    components(schemas(CompanyRecord, Address)),
    modifiers(&BearerAuth),
    tags(
        (name = "ceidg", description = "CEIDG company lookup"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
