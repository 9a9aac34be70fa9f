//! Lifetime tiers for cached values.

use std::time::Duration;

/// Countries, cities, sports and amenities. Rarely written, read by every wizard.
pub const REFERENCE: Duration = Duration::from_secs(60 * 60);

/// Single-entity lookups such as an academic profile.
pub const DETAIL: Duration = Duration::from_secs(10 * 60);

/// Dashboard aggregations. Booking writes also invalidate these explicitly.
pub const DASHBOARD: Duration = Duration::from_secs(5 * 60);

/// Paginated tenant lists; matches the default `CACHE_TTL_SECONDS`.
pub const LIST: Duration = Duration::from_secs(5 * 60);
