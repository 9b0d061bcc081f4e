//! Per-line tax computation.
//!
//! One pure function, [`compute_line`], keyed by the line's tax-situation
//! codes (CSOSN/CST) and the store's regime and configuration. Two
//! frameworks coexist: the legacy goods taxes, and the 2026 reform taxes
//! (IBS/CBS) gated behind [`FiscalConfig::reform_enabled`] so stores can be
//! migrated one at a time without disturbing legacy behavior.

use rust_decimal::Decimal;

use fiscoerp_core::{DomainResult, percent_of};

use crate::breakdown::TaxBreakdown;
use crate::config::{FiscalConfig, regime_is_simples};
use crate::line::{ProductTaxProfile, ReformProfile, TaxableLine};

/// Pilot-phase IBS default rate (percent), used when neither the line nor
/// the store configuration specifies one.
pub fn pilot_default_ibs_rate() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

/// Pilot-phase CBS default rate (percent).
pub fn pilot_default_cbs_rate() -> Decimal {
    Decimal::new(90, 2) // 0.90
}

/// Compute the tax breakdown of one sale line.
///
/// Missing optional inputs are never an error: no fiscal profile, no
/// configuration, or an unknown regime all degrade to zeros. The only
/// failure mode is unusable numeric input (zero/negative quantity or
/// price, overflow), which is a hard error — the caller's operation must
/// abort rather than understate a liability.
pub fn compute_line(
    line: &TaxableLine,
    regime: Option<&str>,
    config: Option<&FiscalConfig>,
) -> DomainResult<TaxBreakdown> {
    line.validate()?;
    let total = line.line_total()?;

    let mut taxes = TaxBreakdown::default();
    match line {
        TaxableLine::Product(product) => {
            if let Some(fiscal) = &product.fiscal {
                legacy_product_taxes(&mut taxes, fiscal, total, regime)?;
                reform_taxes(&mut taxes, &fiscal.reform, total, config)?;
            }
        }
        // Services carry no ICMS/ICMS-ST/PIS/COFINS/IPI; those are settled
        // through the reform taxes once the flag is up.
        TaxableLine::Service(service) => {
            if let Some(fiscal) = &service.fiscal {
                reform_taxes(&mut taxes, fiscal, total, config)?;
            }
        }
    }

    Ok(taxes)
}

/// Legacy goods taxes, keyed by the product's situation codes.
fn legacy_product_taxes(
    taxes: &mut TaxBreakdown,
    fiscal: &ProductTaxProfile,
    total: Decimal,
    regime: Option<&str>,
) -> DomainResult<()> {
    let is_simples = regime_is_simples(regime);
    let icms_cst = fiscal.icms_cst.as_deref().unwrap_or("000");

    if icms_cst == "102" && is_simples {
        // Simples Nacional, no credit allowed: ICMS/PIS/COFINS are bundled
        // into the monthly payment on gross revenue. The document discloses
        // the base; the per-line value stays zero.
        taxes.icms_base = total;
        taxes.pis_base = total;
        taxes.cofins_base = total;
    } else if icms_cst == "00" {
        // Standard regime, fully taxed.
        taxes.icms_base = total;
        taxes.icms_value = percent_of(total, fiscal.icms_rate.unwrap_or_default())?;

        if fiscal.pis_cst.as_deref().unwrap_or("01") == "01" {
            taxes.pis_base = total;
            taxes.pis_value = percent_of(total, fiscal.pis_rate.unwrap_or_default())?;
        }
        if fiscal.cofins_cst.as_deref().unwrap_or("01") == "01" {
            taxes.cofins_base = total;
            taxes.cofins_value = percent_of(total, fiscal.cofins_rate.unwrap_or_default())?;
        }
    } else if fiscal.icms_rate.is_some_and(|rate| rate > Decimal::ZERO) {
        // Other CSOSN/CST codes vary by legislation and have no computation
        // rule here: disclose the base, compute no value.
        taxes.icms_base = total;
    }

    // ICMS-ST is independent of the branch above and applies even under
    // Simples. Requires both a situation code and a non-zero rate.
    if fiscal.icms_st_cst.as_deref().is_some_and(|code| !code.is_empty()) {
        if let Some(st_rate) = fiscal.icms_st_rate.filter(|rate| !rate.is_zero()) {
            taxes.icms_st_base = total;
            taxes.icms_st_value = percent_of(total, st_rate)?;
        }
    }

    // IPI on the sale direction.
    match fiscal.ipi_sale_cst.as_deref().unwrap_or("52") {
        "52" => {
            // Taxed at zero rate: base disclosed, value zero.
            taxes.ipi_base = total;
        }
        "00" | "01" | "02" | "03" => {
            taxes.ipi_base = total;
            taxes.ipi_value = percent_of(total, fiscal.ipi_sale_rate.unwrap_or_default())?;
        }
        _ => {}
    }

    Ok(())
}

/// Reform taxes (IBS/CBS), both line variants, gated by the store flag.
fn reform_taxes(
    taxes: &mut TaxBreakdown,
    reform: &ReformProfile,
    total: Decimal,
    config: Option<&FiscalConfig>,
) -> DomainResult<()> {
    let Some(config) = config else {
        return Ok(());
    };
    if !config.reform_enabled {
        return Ok(());
    }

    // Codes pass through verbatim; absent stays absent.
    taxes.tax_class_code = reform.tax_class_code.clone();
    taxes.ibs_cst = reform.ibs_cst.clone();
    taxes.cbs_cst = reform.cbs_cst.clone();

    taxes.ibs_rate = resolve_rate(reform.ibs_rate, config.default_ibs_rate, pilot_default_ibs_rate());
    taxes.cbs_rate = resolve_rate(reform.cbs_rate, config.default_cbs_rate, pilot_default_cbs_rate());

    taxes.ibs_base = total;
    taxes.ibs_value = percent_of(total, taxes.ibs_rate)?;
    taxes.cbs_base = total;
    taxes.cbs_value = percent_of(total, taxes.cbs_rate)?;

    Ok(())
}

/// Rate priority: line override (when positive) → store default → pilot
/// default.
fn resolve_rate(line: Option<Decimal>, store: Option<Decimal>, pilot: Decimal) -> Decimal {
    match line {
        Some(rate) if rate > Decimal::ZERO => rate,
        _ => store.unwrap_or(pilot),
    }
}
