//! Freeze-on-authorization and read-with-fallback.
//!
//! Once a document is authorized its tax amounts must never change, even if
//! the store's configuration or rates change afterwards. `freeze` computes
//! totals and the per-line snapshot once and commits them together with the
//! status transition; `totals` serves the frozen amounts back, degrading to
//! live recomputation when the stored snapshot is missing or unreadable.

use fiscoerp_core::{DomainError, DomainResult};
use fiscoerp_fiscal::{
    FiscalConfig, InvoiceTotals, ReformTotals, TaxableLine, aggregate_lines, compute_line,
    decode_records, encode_line,
};

use crate::invoice::{Invoice, InvoiceStatus};

impl Invoice {
    /// Compute tax totals and the per-line snapshot, then authorize —
    /// one atomic commit.
    ///
    /// Requires a draft (or processing) invoice with at least one line.
    /// Calling it on an already-authorized invoice is an idempotent no-op:
    /// the existing snapshot stays byte-identical and no recomputation
    /// happens. Rejected/cancelled invoices are refused outright.
    ///
    /// Any computation failure aborts before the commit point, leaving the
    /// status untouched — an invoice never becomes Authorized with partial
    /// tax state.
    pub fn freeze(
        &mut self,
        lines: &[TaxableLine],
        config: Option<&FiscalConfig>,
    ) -> DomainResult<()> {
        // The status doubles as the optimistic guard: re-checked here,
        // inside the same mutation that writes the snapshot, so a second
        // freeze of an already-authorized invoice is a no-op read rather
        // than a conflicting write.
        match self.status() {
            InvoiceStatus::Authorized => return Ok(()),
            InvoiceStatus::Rejected | InvoiceStatus::Cancelled => {
                return Err(DomainError::conflict(
                    "cannot authorize a rejected or cancelled invoice",
                ));
            }
            InvoiceStatus::Draft | InvoiceStatus::Processing => {}
        }

        if lines.is_empty() {
            return Err(DomainError::validation(
                "cannot authorize an invoice without lines",
            ));
        }

        let regime = config.map(|c| c.tax_regime.as_str());
        let totals = aggregate_lines(lines, regime, config)?;

        let mut records = Vec::with_capacity(lines.len());
        for line in lines {
            let taxes = compute_line(line, regime, config)?;
            records.push(encode_line(line, &taxes)?.into_value()?);
        }

        // Commit point: everything fallible happened above, so the cache,
        // snapshot and status land together or not at all.
        self.reform_cache = Some(ReformTotals::of(&totals));
        self.snapshot = records;
        self.status = InvoiceStatus::Authorized;
        tracing::debug!(invoice = %self.id_typed(), lines = lines.len(), "tax snapshot frozen");
        Ok(())
    }

    /// Invoice tax totals.
    ///
    /// Authorized invoices with a snapshot read the frozen amounts; a
    /// snapshot that fails to decode is logged and transparently replaced
    /// by live recomputation (self-healing — the decode error never reaches
    /// the caller). Every other state, an empty snapshot, or
    /// `force_recompute` computes from the *current* lines and
    /// configuration — the only path that reflects changes made after
    /// authorization.
    pub fn totals(
        &self,
        lines: &[TaxableLine],
        config: Option<&FiscalConfig>,
        force_recompute: bool,
    ) -> DomainResult<InvoiceTotals> {
        let regime = config.map(|c| c.tax_regime.as_str());

        if self.status() == InvoiceStatus::Authorized && self.has_snapshot() && !force_recompute {
            let reform = self.reform_cache.unwrap_or_default();
            match decode_records(self.snapshot(), &reform, regime) {
                Ok(totals) => return Ok(totals),
                Err(error) => {
                    tracing::warn!(
                        invoice = %self.id_typed(),
                        %error,
                        "stored tax snapshot is invalid; recomputing from live lines"
                    );
                }
            }
        }

        aggregate_lines(lines, regime, config)
    }
}
