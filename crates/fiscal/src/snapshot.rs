//! Snapshot codec: freeze per-line tax results into storage-safe records
//! and rebuild invoice totals from them.
//!
//! Records use only primitive JSON shapes (objects, strings, numbers);
//! decimals travel as strings, which survives any JSON storage without
//! precision loss.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use fiscoerp_core::{DomainError, DomainResult};

use crate::aggregator::{InvoiceTotals, ReformTotals};
use crate::breakdown::TaxBreakdown;
use crate::config::regime_is_simples;
use crate::line::{LineId, ProductId, ServiceId, TaxableLine};

/// Failure to rebuild totals from persisted snapshot records.
///
/// Soft at the read boundary: the invoice read path logs it and falls back
/// to live recomputation; it never crosses the engine's public surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot record {index} is not an object")]
    RecordShape { index: usize },

    #[error("snapshot record {index} has no tax breakdown")]
    MissingTaxes { index: usize },

    #[error("snapshot record {index}: `{field}` is not numeric")]
    NonNumeric { index: usize, field: &'static str },

    #[error("snapshot totals overflow on `{field}`")]
    Overflow { field: &'static str },
}

/// One frozen line in primitive form, as persisted by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub line_id: LineId,
    pub product_id: Option<ProductId>,
    pub service_id: Option<ServiceId>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub taxes: TaxBreakdown,
}

impl SnapshotRecord {
    /// Serialize into the generic JSON value the storage layer persists.
    pub fn into_value(self) -> DomainResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| DomainError::invariant(format!("snapshot record serialization failed: {e}")))
    }
}

/// Capture one line together with its computed breakdown.
pub fn encode_line(line: &TaxableLine, taxes: &TaxBreakdown) -> DomainResult<SnapshotRecord> {
    Ok(SnapshotRecord {
        line_id: line.line_id(),
        product_id: line.product_id(),
        service_id: line.service_id(),
        description: line.description().to_string(),
        quantity: line.quantity(),
        unit_price: line.unit_price(),
        line_total: line.line_total()?,
        taxes: taxes.clone(),
    })
}

/// Rebuild invoice totals from persisted snapshot records.
///
/// Legacy tax totals are resummed from the records — the snapshot is their
/// only durable home. The IBS/CBS aggregates come from the invoice's cached
/// `reform` totals instead of being resummed (only those four fields are
/// cached at invoice level in the stored schema). Regime flags come from
/// the store's *current* configuration, exactly as the live path sets them.
///
/// A record without a usable `taxes` object, or with a non-numeric amount,
/// is a decode failure — never silently read as zero. A field that is
/// absent altogether reads as zero, matching what the aggregator would
/// have written.
pub fn decode_records(
    records: &[Value],
    reform: &ReformTotals,
    regime: Option<&str>,
) -> Result<InvoiceTotals, SnapshotError> {
    let mut totals = InvoiceTotals {
        ibs_base: reform.ibs_base,
        ibs_value: reform.ibs_value,
        cbs_base: reform.cbs_base,
        cbs_value: reform.cbs_value,
        tax_regime: regime.unwrap_or_default().to_string(),
        is_simples: regime_is_simples(regime),
        ..InvoiceTotals::default()
    };

    for (index, record) in records.iter().enumerate() {
        let record = record
            .as_object()
            .ok_or(SnapshotError::RecordShape { index })?;
        let taxes = record
            .get("taxes")
            .and_then(Value::as_object)
            .ok_or(SnapshotError::MissingTaxes { index })?;

        add_to(&mut totals.icms_base, field_decimal(taxes, "icms_base", index)?, "icms_base")?;
        add_to(&mut totals.icms_value, field_decimal(taxes, "icms_value", index)?, "icms_value")?;
        add_to(&mut totals.icms_st_base, field_decimal(taxes, "icms_st_base", index)?, "icms_st_base")?;
        add_to(&mut totals.icms_st_value, field_decimal(taxes, "icms_st_value", index)?, "icms_st_value")?;
        add_to(&mut totals.pis_base, field_decimal(taxes, "pis_base", index)?, "pis_base")?;
        add_to(&mut totals.pis_value, field_decimal(taxes, "pis_value", index)?, "pis_value")?;
        add_to(&mut totals.cofins_base, field_decimal(taxes, "cofins_base", index)?, "cofins_base")?;
        add_to(&mut totals.cofins_value, field_decimal(taxes, "cofins_value", index)?, "cofins_value")?;
        add_to(&mut totals.ipi_base, field_decimal(taxes, "ipi_base", index)?, "ipi_base")?;
        add_to(&mut totals.ipi_value, field_decimal(taxes, "ipi_value", index)?, "ipi_value")?;
        add_to(&mut totals.goods_subtotal, field_decimal(record, "line_total", index)?, "line_total")?;
    }

    Ok(totals)
}

fn add_to(slot: &mut Decimal, amount: Decimal, field: &'static str) -> Result<(), SnapshotError> {
    *slot = slot
        .checked_add(amount)
        .ok_or(SnapshotError::Overflow { field })?;
    Ok(())
}

/// Absent field: zero. Present field: must parse as a decimal.
fn field_decimal(
    object: &Map<String, Value>,
    field: &'static str,
    index: usize,
) -> Result<Decimal, SnapshotError> {
    match object.get(field) {
        None => Ok(Decimal::ZERO),
        Some(value) => decimal_value(value).ok_or(SnapshotError::NonNumeric { index, field }),
    }
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => {
            let repr = n.to_string();
            repr.parse().ok().or_else(|| Decimal::from_scientific(&repr).ok())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate_lines;
    use crate::calculator::compute_line;
    use crate::line::{ProductLine, ProductTaxProfile};
    use fiscoerp_core::EntityId;
    use serde_json::json;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn standard_line(total: &str) -> TaxableLine {
        TaxableLine::Product(ProductLine {
            line_id: LineId::new(EntityId::new()),
            product_id: Some(ProductId::new(EntityId::new())),
            description: "Shampoo neutro 500ml".to_string(),
            quantity: d("1.000"),
            unit_price: d(total),
            discount: Decimal::ZERO,
            fiscal: Some(ProductTaxProfile {
                icms_cst: Some("00".to_string()),
                icms_rate: Some(d("18.00")),
                pis_cst: Some("01".to_string()),
                pis_rate: Some(d("1.65")),
                cofins_cst: Some("01".to_string()),
                cofins_rate: Some(d("7.60")),
                ..ProductTaxProfile::default()
            }),
        })
    }

    fn encode_lines(lines: &[TaxableLine]) -> Vec<Value> {
        lines
            .iter()
            .map(|line| {
                let taxes = compute_line(line, Some("LUCRO_PRESUMIDO"), None).unwrap();
                encode_line(line, &taxes).unwrap().into_value().unwrap()
            })
            .collect()
    }

    #[test]
    fn decode_resums_legacy_fields_from_records() {
        let lines = vec![standard_line("100.00"), standard_line("50.00")];
        let records = encode_lines(&lines);

        let decoded =
            decode_records(&records, &ReformTotals::default(), Some("LUCRO_PRESUMIDO")).unwrap();
        let live = aggregate_lines(&lines, Some("LUCRO_PRESUMIDO"), None).unwrap();

        assert_eq!(decoded.icms_base, live.icms_base);
        assert_eq!(decoded.icms_value, live.icms_value);
        assert_eq!(decoded.pis_value, live.pis_value);
        assert_eq!(decoded.cofins_value, live.cofins_value);
        assert_eq!(decoded.goods_subtotal, d("150.00"));
        assert_eq!(decoded.tax_regime, "LUCRO_PRESUMIDO");
        assert!(!decoded.is_simples);
    }

    #[test]
    fn reform_aggregates_come_from_the_cache_not_the_records() {
        // Records deliberately carry no IBS/CBS amounts; the cache does.
        let records = encode_lines(&[standard_line("100.00")]);
        let cache = ReformTotals {
            ibs_base: d("100.00"),
            ibs_value: d("0.10"),
            cbs_base: d("100.00"),
            cbs_value: d("0.90"),
        };

        let decoded = decode_records(&records, &cache, None).unwrap();
        assert_eq!(decoded.ibs_base, d("100.00"));
        assert_eq!(decoded.ibs_value, d("0.10"));
        assert_eq!(decoded.cbs_base, d("100.00"));
        assert_eq!(decoded.cbs_value, d("0.90"));
    }

    #[test]
    fn record_without_taxes_fails_to_decode() {
        let record = json!({
            "line_id": EntityId::new(),
            "description": "sem impostos",
            "line_total": "10.00",
        });
        let err = decode_records(&[record], &ReformTotals::default(), None).unwrap_err();
        assert_eq!(err, SnapshotError::MissingTaxes { index: 0 });
    }

    #[test]
    fn non_numeric_amount_fails_to_decode() {
        let record = json!({
            "line_total": "10.00",
            "taxes": { "icms_base": "not-a-number" },
        });
        let err = decode_records(&[record], &ReformTotals::default(), None).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::NonNumeric { index: 0, field: "icms_base" }
        );

        // JSON null is present-but-unusable, not absent.
        let record = json!({
            "line_total": "10.00",
            "taxes": { "pis_value": null },
        });
        let err = decode_records(&[record], &ReformTotals::default(), None).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::NonNumeric { index: 0, field: "pis_value" }
        );
    }

    #[test]
    fn absent_fields_read_as_zero() {
        // Minimal record written by an older schema: only ICMS present.
        let record = json!({
            "line_total": 25.5,
            "taxes": { "icms_base": 25.5, "icms_value": 4.59 },
        });
        let decoded = decode_records(&[record], &ReformTotals::default(), None).unwrap();
        assert_eq!(decoded.icms_base, d("25.5"));
        assert_eq!(decoded.icms_value, d("4.59"));
        assert_eq!(decoded.pis_base, Decimal::ZERO);
        assert_eq!(decoded.ipi_value, Decimal::ZERO);
        assert_eq!(decoded.goods_subtotal, d("25.5"));
    }

    #[test]
    fn non_object_record_fails_to_decode() {
        let err = decode_records(&[json!("oops")], &ReformTotals::default(), None).unwrap_err();
        assert_eq!(err, SnapshotError::RecordShape { index: 0 });
    }

    #[test]
    fn encoded_record_round_trips_through_json() {
        let line = standard_line("123.45");
        let taxes = compute_line(&line, Some("LUCRO_PRESUMIDO"), None).unwrap();
        let record = encode_line(&line, &taxes).unwrap();
        let value = record.clone().into_value().unwrap();
        let back: SnapshotRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
