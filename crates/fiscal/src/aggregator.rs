//! Invoice-level tax aggregation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fiscoerp_core::{DomainError, DomainResult, ValueObject};

use crate::breakdown::TaxBreakdown;
use crate::calculator::compute_line;
use crate::config::{FiscalConfig, regime_is_simples};
use crate::line::TaxableLine;

/// Invoice-level tax totals: field-wise sums of the per-line breakdowns
/// plus the monetary document totals.
///
/// `freight`, `insurance`, `discount` and `other_charges` are part of the
/// document schema but nothing upstream feeds them today; they stay zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
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
    pub cbs_base: Decimal,
    pub cbs_value: Decimal,
    /// Sum of line totals.
    pub goods_subtotal: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    pub discount: Decimal,
    pub other_charges: Decimal,
    /// Regime label of the store at computation time (empty when unknown).
    pub tax_regime: String,
    pub is_simples: bool,
}

impl ValueObject for InvoiceTotals {}

impl InvoiceTotals {
    fn accumulate(&mut self, taxes: &TaxBreakdown) -> DomainResult<()> {
        add_to(&mut self.icms_base, taxes.icms_base)?;
        add_to(&mut self.icms_value, taxes.icms_value)?;
        add_to(&mut self.icms_st_base, taxes.icms_st_base)?;
        add_to(&mut self.icms_st_value, taxes.icms_st_value)?;
        add_to(&mut self.pis_base, taxes.pis_base)?;
        add_to(&mut self.pis_value, taxes.pis_value)?;
        add_to(&mut self.cofins_base, taxes.cofins_base)?;
        add_to(&mut self.cofins_value, taxes.cofins_value)?;
        add_to(&mut self.ipi_base, taxes.ipi_base)?;
        add_to(&mut self.ipi_value, taxes.ipi_value)?;
        add_to(&mut self.ibs_base, taxes.ibs_base)?;
        add_to(&mut self.ibs_value, taxes.ibs_value)?;
        add_to(&mut self.cbs_base, taxes.cbs_base)?;
        add_to(&mut self.cbs_value, taxes.cbs_value)?;
        Ok(())
    }
}

fn add_to(slot: &mut Decimal, amount: Decimal) -> DomainResult<()> {
    *slot = slot
        .checked_add(amount)
        .ok_or_else(|| DomainError::invalid_numeric("invoice totals overflow"))?;
    Ok(())
}

/// The four reform aggregates cached at invoice level when a document is
/// authorized. Legacy totals have no such cache — they live only inside
/// the snapshot records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReformTotals {
    pub ibs_base: Decimal,
    pub ibs_value: Decimal,
    pub cbs_base: Decimal,
    pub cbs_value: Decimal,
}

impl ReformTotals {
    pub fn of(totals: &InvoiceTotals) -> Self {
        Self {
            ibs_base: totals.ibs_base,
            ibs_value: totals.ibs_value,
            cbs_base: totals.cbs_base,
            cbs_value: totals.cbs_value,
        }
    }
}

/// Compute invoice totals from the current lines.
///
/// One [`compute_line`] per line, summed field-wise; `goods_subtotal` is
/// the sum of line totals. An empty line list yields all-zero totals — not
/// an error. Regime flags are set once from the call inputs (they do not
/// vary across lines of one invoice).
pub fn aggregate_lines(
    lines: &[TaxableLine],
    regime: Option<&str>,
    config: Option<&FiscalConfig>,
) -> DomainResult<InvoiceTotals> {
    let mut totals = InvoiceTotals {
        tax_regime: regime.unwrap_or_default().to_string(),
        is_simples: regime_is_simples(regime),
        ..InvoiceTotals::default()
    };

    for line in lines {
        let taxes = compute_line(line, regime, config)?;
        totals.accumulate(&taxes)?;
        add_to(&mut totals.goods_subtotal, line.line_total()?)?;
    }

    Ok(totals)
}
