pub mod asset;
pub mod asset_search;
pub mod user;

/// Audit timestamp: RFC 3339 UTC with fixed microsecond precision, so string
/// order matches chronological order.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
