use crate::cache::{Absence, CachedLookup, ComputeFailed, LookupCache, CACHE_TTL};
use crate::ceidg_client::{CeidgClient, FetchResult};
use crate::circuit_breaker::{create_registry_circuit_breaker, RegistryCircuitBreaker};
use crate::config::Config;
use crate::errors::AppError;
use crate::mapping::{self, MappingError};
use crate::models::CompanyRecord;
use crate::nip::Nip;
use failsafe::futures::CircuitBreaker;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Retry hint handed to callers when the registry is unavailable.
pub const RETRY_AFTER: Duration = Duration::from_secs(60);

/// Outcome of a company lookup, as seen by the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Arc<CompanyRecord>),
    NotFound(NotFoundReason),
    /// The registry could not be queried; retry after the given delay.
    ServiceUnavailable { retry_after: Duration },
}

/// Why a lookup found nothing. All of these look the same to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The input is not a 10-digit NIP; the registry was never asked.
    InvalidFormat,
    /// The registry has no company under this NIP.
    NotRegistered,
    /// The registry rejected the NIP as invalid.
    RejectedByRegistry,
}

impl From<Absence> for NotFoundReason {
    fn from(absence: Absence) -> Self {
        match absence {
            Absence::NotRegistered => NotFoundReason::NotRegistered,
            Absence::RejectedByRegistry => NotFoundReason::RejectedByRegistry,
        }
    }
}

/// Why a cache-miss lookup could not produce an answer. Never cached.
#[derive(Debug)]
pub enum LookupFailure {
    /// Non-transient upstream error.
    Upstream { status: u16, body: String },
    /// Network or timeout failure reaching CEIDG.
    Transport(String),
    /// CEIDG returned a company we could not map.
    Mapping(MappingError),
    /// Too many recent upstream failures; the call was not attempted.
    CircuitOpen,
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::Upstream { status, body } => {
                write!(f, "CEIDG API error {}: {}", status, body)
            }
            LookupFailure::Transport(reason) => write!(f, "CEIDG transport error: {}", reason),
            LookupFailure::Mapping(e) => write!(f, "CEIDG payload mapping error: {}", e),
            LookupFailure::CircuitOpen => write!(f, "CEIDG circuit breaker is open"),
        }
    }
}

impl std::error::Error for LookupFailure {}

enum Fetched {
    Company(Value),
    Absent(Absence),
}

/// Looks companies up in CEIDG by NIP, with caching.
///
/// Owns the registry client, the lookup cache and the circuit breaker; all
/// three are cheap to clone and safe to share between request tasks.
#[derive(Clone)]
pub struct RegistryLookupService {
    client: CeidgClient,
    cache: LookupCache,
    breaker: RegistryCircuitBreaker,
}

impl RegistryLookupService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = CeidgClient::new(&config.ceidg_api_url, config.ceidg_api_key.clone())?;
        let cache = LookupCache::new(CACHE_TTL, config.cache_max_capacity);

        Ok(Self::with_components(
            client,
            cache,
            create_registry_circuit_breaker(),
        ))
    }

    pub fn with_components(
        client: CeidgClient,
        cache: LookupCache,
        breaker: RegistryCircuitBreaker,
    ) -> Self {
        Self {
            client,
            cache,
            breaker,
        }
    }

    /// Approximate number of cached lookups, found or absent.
    pub fn cached_entries(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Finds a company by raw NIP input.
    ///
    /// Malformed input never reaches the cache or the registry. Registry
    /// "not found" answers are cached for [`CACHE_TTL`]; failures are not.
    pub async fn find_by_nip(&self, raw: &str) -> LookupOutcome {
        let nip = match Nip::parse(raw) {
            Ok(nip) => nip,
            Err(e) => {
                tracing::info!("Rejected NIP input '{}': {}", raw, e);
                return LookupOutcome::NotFound(NotFoundReason::InvalidFormat);
            }
        };

        match self.cache.get_or_compute(nip.clone(), self.load(&nip)).await {
            Ok(CachedLookup::Found(company)) => LookupOutcome::Found(company),
            Ok(CachedLookup::Absent(absence)) => {
                tracing::info!("No CEIDG company for NIP {} ({:?})", nip, absence);
                LookupOutcome::NotFound(absence.into())
            }
            Err(ComputeFailed(cause)) => {
                tracing::error!("Failed to fetch company {} from CEIDG: {}", nip, cause);
                LookupOutcome::ServiceUnavailable {
                    retry_after: RETRY_AFTER,
                }
            }
        }
    }

    /// Cache-miss path: registry call through the circuit breaker, then mapping.
    async fn load(&self, nip: &Nip) -> Result<CachedLookup, LookupFailure> {
        tracing::debug!("Lookup cache MISS for NIP {}", nip);

        let fetched = self
            .breaker
            .call(async {
                match self.client.fetch(nip).await {
                    FetchResult::Found(payload) => Ok(Fetched::Company(payload)),
                    FetchResult::NotFound => Ok(Fetched::Absent(Absence::NotRegistered)),
                    FetchResult::InvalidFormat => Ok(Fetched::Absent(Absence::RejectedByRegistry)),
                    FetchResult::Error { status, body } => {
                        Err(LookupFailure::Upstream { status, body })
                    }
                    FetchResult::TransportFailure(reason) => Err(LookupFailure::Transport(reason)),
                }
            })
            .await
            .map_err(|e| match e {
                failsafe::Error::Inner(failure) => failure,
                failsafe::Error::Rejected => LookupFailure::CircuitOpen,
            })?;

        match fetched {
            Fetched::Absent(absence) => Ok(CachedLookup::Absent(absence)),
            Fetched::Company(payload) => {
                // Not cached: every retry for this NIP re-fetches until CEIDG fixes the record
                let company = mapping::company_from_payload(&payload).map_err(|e| {
                    tracing::warn!("Unusable CEIDG record for NIP {}: {}", nip, e);
                    LookupFailure::Mapping(e)
                })?;
                if let Some(address) = &company.business_address {
                    tracing::info!(
                        "Fetched CEIDG company {} '{}' ({})",
                        company.nip,
                        company.name,
                        address.format_single_line()
                    );
                } else {
                    tracing::info!("Fetched CEIDG company {} '{}'", company.nip, company.name);
                }
                Ok(CachedLookup::Found(Arc::new(company)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_service() -> RegistryLookupService {
        // Port 9 (discard) is never listened on in test environments
        let client = CeidgClient::with_timeout(
            "http://127.0.0.1:9/firmy",
            "key".to_string(),
            Duration::from_millis(200),
        )
        .unwrap();
        RegistryLookupService::with_components(
            client,
            LookupCache::default(),
            create_registry_circuit_breaker(),
        )
    }

    #[tokio::test]
    async fn test_malformed_nip_is_not_found_without_upstream_call() {
        let service = offline_service();

        assert_eq!(
            service.find_by_nip("12345").await,
            LookupOutcome::NotFound(NotFoundReason::InvalidFormat)
        );
        assert_eq!(
            service.find_by_nip("").await,
            LookupOutcome::NotFound(NotFoundReason::InvalidFormat)
        );
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_service_unavailable() {
        let service = offline_service();

        assert_eq!(
            service.find_by_nip("1234567890").await,
            LookupOutcome::ServiceUnavailable {
                retry_after: RETRY_AFTER
            }
        );
    }

    #[test]
    fn test_absence_maps_to_not_found_reason() {
        assert_eq!(
            NotFoundReason::from(Absence::NotRegistered),
            NotFoundReason::NotRegistered
        );
        assert_eq!(
            NotFoundReason::from(Absence::RejectedByRegistry),
            NotFoundReason::RejectedByRegistry
        );
    }
}
