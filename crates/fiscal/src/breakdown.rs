//! Per-line tax breakdown value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fiscoerp_core::ValueObject;

/// Tax breakdown of a single line: a (base, value) pair per tax, the
/// resolved reform rates, and the pass-through classification codes.
///
/// Invariants: every base and value is ≥ 0, and a tax's value is non-zero
/// only when its base is non-zero. Under the Simples regime several taxes
/// legitimately carry a non-zero base with a zero value — the base is
/// disclosed on the document, the amount is settled in the monthly payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub icms_base: Decimal,
    pub icms_value: Decimal,
    pub icms_st_base: Decimal,
    pub icms_st_value: Decimal,
    pub pis_base: Decimal,
    pub pis_value: Decimal,
    pub cofins_base: Decimal,
    pub cofins_value: Decimal,
    pub ipi_base: Decimal,
    pub ipi_value: Decimal,
    pub ibs_base: Decimal,
    pub ibs_value: Decimal,
    /// Resolved IBS rate (percent): line override, store default, or pilot
    /// default. Zero while the reform flag is down.
    pub ibs_rate: Decimal,
    pub cbs_base: Decimal,
    pub cbs_value: Decimal,
    pub cbs_rate: Decimal,
    pub tax_class_code: Option<String>,
    pub ibs_cst: Option<String>,
    pub cbs_cst: Option<String>,
}

impl ValueObject for TaxBreakdown {}

impl TaxBreakdown {
    /// True when every base and value is zero (the no-op breakdown of a
    /// line without fiscal data).
    pub fn is_zero(&self) -> bool {
        [
            self.icms_base,
            self.icms_value,
            self.icms_st_base,
            self.icms_st_value,
            self.pis_base,
            self.pis_value,
            self.cofins_base,
            self.cofins_value,
            self.ipi_base,
            self.ipi_value,
            self.ibs_base,
            self.ibs_value,
            self.cbs_base,
            self.cbs_value,
        ]
        .iter()
        .all(Decimal::is_zero)
    }
}
