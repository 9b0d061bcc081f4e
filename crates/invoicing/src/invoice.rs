//! Outbound fiscal document: identity, status lifecycle, frozen tax state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fiscoerp_core::{DomainError, DomainResult, Entity, EntityId, StoreId};
use fiscoerp_fiscal::{DocumentKind, ReformTotals};

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub EntityId);

impl InvoiceId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Invoice status lifecycle.
///
/// Draft → Processing → Authorized is the happy path; Rejected and
/// Cancelled are terminal. Only the Draft → Authorized transition writes
/// tax state (see [`Invoice::freeze`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Processing,
    Authorized,
    Rejected,
    Cancelled,
}

/// Outbound fiscal document (NF-e / NFC-e).
///
/// Carries the only durable tax state in the system: the per-line snapshot
/// and the four cached reform aggregates, both written exactly once at
/// authorization. Legacy totals are **not** cached at invoice level — they
/// exist only inside the snapshot records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    store_id: StoreId,
    kind: DocumentKind,
    series: String,
    number: u32,
    pub(crate) status: InvoiceStatus,
    issued_at: Option<DateTime<Utc>>,
    cancel_reason: Option<String>,
    pub(crate) reform_cache: Option<ReformTotals>,
    pub(crate) snapshot: Vec<Value>,
}

impl Invoice {
    /// Create a new draft invoice.
    pub fn draft(
        id: InvoiceId,
        store_id: StoreId,
        kind: DocumentKind,
        series: impl Into<String>,
        number: u32,
        issued_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let series = series.into();
        if series.is_empty() {
            return Err(DomainError::validation("invoice series cannot be empty"));
        }
        if number == 0 {
            return Err(DomainError::validation("invoice number must be positive"));
        }
        Ok(Self {
            id,
            store_id,
            kind,
            series,
            number,
            status: InvoiceStatus::Draft,
            issued_at: Some(issued_at),
            cancel_reason: None,
            reform_cache: None,
            snapshot: Vec::new(),
        })
    }

    /// Rebuild an invoice from persisted state (storage-layer rehydration).
    ///
    /// Accepts state as stored, including legacy rows written before the
    /// current snapshot schema; the read path copes with those via its
    /// decode fallback.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: InvoiceId,
        store_id: StoreId,
        kind: DocumentKind,
        series: String,
        number: u32,
        status: InvoiceStatus,
        issued_at: Option<DateTime<Utc>>,
        cancel_reason: Option<String>,
        reform_cache: Option<ReformTotals>,
        snapshot: Vec<Value>,
    ) -> Self {
        Self {
            id,
            store_id,
            kind,
            series,
            number,
            status,
            issued_at,
            cancel_reason,
            reform_cache,
            snapshot,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    /// Cached reform aggregates, present once the invoice is authorized.
    pub fn reform_cache(&self) -> Option<&ReformTotals> {
        self.reform_cache.as_ref()
    }

    /// Frozen per-line records, empty until the invoice is authorized.
    pub fn snapshot(&self) -> &[Value] {
        &self.snapshot
    }

    pub fn has_snapshot(&self) -> bool {
        !self.snapshot.is_empty()
    }

    /// Lines may be added or edited upstream only while the invoice is a
    /// draft.
    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, InvoiceStatus::Draft)
    }

    /// Hand the document to the tax authority: Draft → Processing.
    pub fn submit(&mut self) -> DomainResult<()> {
        if self.status != InvoiceStatus::Draft {
            return Err(DomainError::conflict("only draft invoices can be submitted"));
        }
        self.status = InvoiceStatus::Processing;
        Ok(())
    }

    /// Authority refused the document: Draft/Processing → Rejected.
    pub fn reject(&mut self) -> DomainResult<()> {
        match self.status {
            InvoiceStatus::Draft | InvoiceStatus::Processing => {
                self.status = InvoiceStatus::Rejected;
                Ok(())
            }
            _ => Err(DomainError::conflict(
                "only draft or processing invoices can be rejected",
            )),
        }
    }

    /// Cancel before authorization: Draft/Processing → Cancelled.
    ///
    /// Cancelling an authorized document requires the tax-authority
    /// round-trip, which is handled outside this engine; refusing it here
    /// keeps the invariant that rejected/cancelled invoices never carry a
    /// snapshot.
    pub fn cancel(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        match self.status {
            InvoiceStatus::Draft | InvoiceStatus::Processing => {
                self.status = InvoiceStatus::Cancelled;
                self.cancel_reason = Some(reason.into());
                Ok(())
            }
            InvoiceStatus::Authorized => Err(DomainError::conflict(
                "authorized invoices are cancelled through the tax authority flow",
            )),
            _ => Err(DomainError::conflict("invoice is already rejected or cancelled")),
        }
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
