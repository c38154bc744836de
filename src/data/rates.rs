//! Exchange-rate resolution against the Frankfurter API.
//!
//! The resolver is infallible by contract: every resolution yields a
//! numeric multiplier. The degradation ladder is
//!
//! 1. base currency: 1.0, no lookup
//! 2. fresh cache entry (per target currency, bounded TTL)
//! 3. live lookup (blocking HTTP, short timeout)
//! 4. static offline table, then a generic conservative default
//!
//! The live boundary is the `RateSource` trait so tests can count
//! fetches, and cache expiry runs against an injectable clock so tests
//! manipulate time rather than the call flow.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::Currency;

const BASE_URL: &str = "https://api.frankfurter.app/latest";

/// Live lookups must not hang the quotation flow beyond this.
const FETCH_TIMEOUT: Duration = Duration::from_secs(2);

/// A fetched rate is reused for this window before re-fetching.
pub const RATE_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Approximate offline multipliers from CNY, used when the live lookup
/// is unavailable.
const FALLBACK_RATES: &[(Currency, f64)] = &[
    (Currency::Usd, 0.138),
    (Currency::Eur, 0.127),
    (Currency::Gbp, 0.109),
];

/// Conservative default for currencies missing from the offline table.
const GENERIC_FALLBACK_RATE: f64 = 0.14;

/// Where a resolved multiplier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    /// Target equals the base currency; multiplier is exactly 1.0.
    Base,
    /// Freshly fetched from the rate service.
    Live,
    /// Served from the in-memory cache within its TTL.
    Cached,
    /// Offline table (or generic default) after a failed/skipped lookup.
    Fallback,
}

/// A multiplier from base currency to the target currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRate {
    pub multiplier: f64,
    pub origin: RateOrigin,
}

/// Boundary for the live lookup.
pub trait RateSource: Send + Sync {
    fn fetch(&self, target: Currency) -> Result<f64, String>;
}

/// Blocking HTTP source for the Frankfurter currency endpoint.
pub struct HttpRateSource {
    http: Client,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

impl HttpRateSource {
    pub fn new() -> Result<Self, String> {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self { http })
    }
}

impl RateSource for HttpRateSource {
    fn fetch(&self, target: Currency) -> Result<f64, String> {
        let resp = self
            .http
            .get(BASE_URL)
            .query(&[("from", Currency::BASE.code()), ("to", target.code())])
            .send()
            .map_err(|e| format!("rate request failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("rate request failed: {e}"))?;

        let body: RatesResponse = resp
            .json()
            .map_err(|e| format!("failed to parse rate response: {e}"))?;

        let rate = body
            .rates
            .get(target.code())
            .copied()
            .ok_or_else(|| format!("response missing rate for {}", target.code()))?;

        if !(rate.is_finite() && rate > 0.0) {
            return Err(format!("invalid rate {rate} for {}", target.code()));
        }
        Ok(rate)
    }
}

struct CachedRate {
    multiplier: f64,
    fetched_at: SystemTime,
}

type Clock = Box<dyn Fn() -> SystemTime + Send + Sync>;

/// Rate resolver with per-currency TTL caching.
///
/// The cache is the only shared mutable state in the application. Writes
/// are idempotent overwrites (last write wins), so a redundant
/// recomputation is harmless.
pub struct RateResolver {
    source: Option<Box<dyn RateSource>>,
    cache: Mutex<HashMap<Currency, CachedRate>>,
    ttl: Duration,
    clock: Clock,
}

impl RateResolver {
    /// Resolver backed by the live Frankfurter endpoint.
    ///
    /// If the HTTP client cannot be built at all, the resolver degrades
    /// to offline mode rather than failing the quotation.
    pub fn live() -> Self {
        match HttpRateSource::new() {
            Ok(source) => Self::with_source(Box::new(source)),
            Err(err) => {
                eprintln!("[rates] {err}; falling back to offline rates");
                Self::offline()
            }
        }
    }

    /// Resolver that never touches the network (offline table only).
    pub fn offline() -> Self {
        Self {
            source: None,
            cache: Mutex::new(HashMap::new()),
            ttl: RATE_CACHE_TTL,
            clock: Box::new(SystemTime::now),
        }
    }

    /// Resolver over an explicit source (tests, alternative endpoints).
    pub fn with_source(source: Box<dyn RateSource>) -> Self {
        Self {
            source: Some(source),
            cache: Mutex::new(HashMap::new()),
            ttl: RATE_CACHE_TTL,
            clock: Box::new(SystemTime::now),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replace the cache clock (tests manipulate time, not call flow).
    pub fn with_clock(mut self, clock: impl Fn() -> SystemTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Resolve the multiplier from the base currency to `target`.
    ///
    /// Never fails: any lookup problem degrades to the offline table.
    pub fn resolve(&self, target: Currency) -> ResolvedRate {
        if target.is_base() {
            return ResolvedRate {
                multiplier: 1.0,
                origin: RateOrigin::Base,
            };
        }

        let now = (self.clock)();
        if let Some(hit) = self.cached(target, now) {
            return ResolvedRate {
                multiplier: hit,
                origin: RateOrigin::Cached,
            };
        }

        if let Some(source) = &self.source {
            match source.fetch(target) {
                Ok(multiplier) => {
                    self.store(target, multiplier, now);
                    return ResolvedRate {
                        multiplier,
                        origin: RateOrigin::Live,
                    };
                }
                Err(err) => {
                    eprintln!(
                        "[rates] live lookup for {} failed: {err}; using offline fallback",
                        target.code()
                    );
                }
            }
        }

        ResolvedRate {
            multiplier: fallback_rate(target),
            origin: RateOrigin::Fallback,
        }
    }

    fn cached(&self, target: Currency, now: SystemTime) -> Option<f64> {
        let cache = self.cache.lock().ok()?;
        let entry = cache.get(&target)?;
        let fresh = now
            .duration_since(entry.fetched_at)
            .map(|age| age <= self.ttl)
            .unwrap_or(false);
        fresh.then_some(entry.multiplier)
    }

    fn store(&self, target: Currency, multiplier: f64, fetched_at: SystemTime) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                target,
                CachedRate {
                    multiplier,
                    fetched_at,
                },
            );
        }
    }
}

/// Offline multiplier for a target currency.
pub fn fallback_rate(target: Currency) -> f64 {
    FALLBACK_RATES
        .iter()
        .find(|(c, _)| *c == target)
        .map(|(_, rate)| *rate)
        .unwrap_or(GENERIC_FALLBACK_RATE)
}
