//! CEIDG Company Lookup API Library
//!
//! This library looks up Polish businesses in the CEIDG registry
//! (Centralna Ewidencja i Informacja o Działalności Gospodarczej) by NIP and
//! serves the merged, cached company record over HTTP.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core lookup logic.
//! - `integrations`: External service integrations.
//! - `auth`: Bearer token middleware.
//! - `cache`: Single-flight lookup cache.
//! - `ceidg_client`: CEIDG registry client (search + detail merge).
//! - `circuit_breaker`: Circuit breaker for registry calls.
//! - `classifier`: Upstream response classification.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `mapping`: Payload to domain record mapping.
//! - `models`: Company and address models.
//! - `nip`: NIP normalization and validation.
//! - `openapi`: OpenAPI document.
//! - `routes`: Router assembly.
//! - `services`: The lookup service tying it all together.

pub mod api;
pub mod core;
pub mod integrations;

pub mod auth;
pub mod cache;
pub mod ceidg_client;
pub mod circuit_breaker;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod mapping;
pub mod models;
pub mod nip;
pub mod openapi;
pub mod routes;
pub mod services;
