//! Document number allocation.
//!
//! Numbers are per store/kind/series and must not collide with documents
//! already issued. The storage layer supplies the taken numbers; this is
//! the pure allocation rule.

use fiscoerp_core::{DomainError, DomainResult};
use fiscoerp_fiscal::{DocumentKind, FiscalConfig};

/// Upper bound on the sequential scan for a free number.
const NUMBER_SCAN_LIMIT: u32 = 1000;

/// Find the next free document number for `kind`.
///
/// Starts from the store's configured next number and skips numbers already
/// taken (a crash between allocation and the configuration update can leave
/// gaps or stale counters behind). Exhausting the scan window is a hard
/// error pointing at the store's fiscal configuration.
pub fn next_available_number(
    config: &FiscalConfig,
    kind: DocumentKind,
    taken: &[u32],
) -> DomainResult<u32> {
    let mut number = config.next_number_for(kind).max(1);
    for _ in 0..NUMBER_SCAN_LIMIT {
        if !taken.contains(&number) {
            return Ok(number);
        }
        number = number
            .checked_add(1)
            .ok_or_else(|| DomainError::invalid_numeric("document number overflow"))?;
    }
    Err(DomainError::conflict(
        "no free document number found; check the store fiscal configuration",
    ))
}
