use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in microseconds since the UNIX epoch.
///
/// Conversations record this value as their creation timestamp so that
/// callers layering timeouts or diagnostics on top of the table can tell how
/// long a request has been outstanding.
///
/// A clock set before the epoch yields `0` rather than an error; the value is
/// only ever used for bookkeeping, never for correlation.
///
/// # Example:
/// ```rust
/// use ribbon_bridge::utils::now;
/// let created_at = now();
/// assert!(created_at > 0);
/// ```
pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
