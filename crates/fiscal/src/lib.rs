//! `fiscoerp-fiscal` — tax calculation engine for outbound sale documents.
//!
//! Pure, deterministic computation: per-line tax breakdowns under the legacy
//! regime (ICMS, ICMS-ST, PIS, COFINS, IPI), the 2026 reform taxes (IBS/CBS)
//! behind a per-store feature flag, invoice-level aggregation, and the
//! storage-safe snapshot codec used to freeze amounts at authorization time.
//! No IO, no storage, no HTTP.

pub mod aggregator;
pub mod breakdown;
pub mod calculator;
pub mod config;
pub mod line;
pub mod snapshot;

pub use aggregator::{InvoiceTotals, ReformTotals, aggregate_lines};
pub use breakdown::TaxBreakdown;
pub use calculator::{compute_line, pilot_default_cbs_rate, pilot_default_ibs_rate};
pub use config::{DocumentKind, FiscalConfig, FiscalEnvironment, regime_is_simples};
pub use line::{
    LineId, ProductId, ProductLine, ProductTaxProfile, ReformProfile, ServiceId, ServiceLine,
    TaxableLine,
};
pub use snapshot::{SnapshotError, SnapshotRecord, decode_records, encode_line};
