//! Taxable sale lines: the normalized view of order lines the engine
//! computes over.
//!
//! A line is either a product or a service — an explicit sum type, so the
//! calculator's branches are exhaustively checked instead of probing for
//! attributes. The fiscal attribute sets are `Option`al wholesale: a line
//! whose product was deleted (or never completed fiscal registration)
//! carries `None` and contributes an all-zero breakdown rather than an
//! error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fiscoerp_core::{DomainError, DomainResult, EntityId, round_half_up_2};

/// Identifier of a sale line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub EntityId);

impl LineId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of a catalog product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub EntityId);

impl ProductId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of a catalog service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub EntityId);

impl ServiceId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Reform (IBS/CBS) tax attributes of a product or service.
///
/// Every field is optional: codes pass through to the breakdown verbatim
/// (no default synthesis), and an absent or zero rate falls back to the
/// store default, then to the pilot-phase default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReformProfile {
    /// Tax classification code (cClassTrib).
    pub tax_class_code: Option<String>,
    pub ibs_cst: Option<String>,
    pub cbs_cst: Option<String>,
    /// Line-level IBS rate override (percent).
    pub ibs_rate: Option<Decimal>,
    /// Line-level CBS rate override (percent).
    pub cbs_rate: Option<Decimal>,
}

/// Legacy-regime tax attributes of a product, as registered in the catalog.
///
/// Codes select the computation branch; rates are percentages. Absent codes
/// take the catalog defaults ("000" for ICMS, "01" for PIS/COFINS, "52" for
/// IPI on the sale direction).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTaxProfile {
    /// CSOSN/CST selecting the ICMS branch (e.g. "102" Simples, "00" fully
    /// taxed under the standard regime).
    pub icms_cst: Option<String>,
    pub icms_rate: Option<Decimal>,
    /// ICMS-ST situation code; substitution applies only when both code and
    /// a non-zero rate are present.
    pub icms_st_cst: Option<String>,
    pub icms_st_rate: Option<Decimal>,
    pub pis_cst: Option<String>,
    pub pis_rate: Option<Decimal>,
    pub cofins_cst: Option<String>,
    pub cofins_rate: Option<Decimal>,
    /// IPI situation code on the sale direction ("52" = taxed at zero rate).
    pub ipi_sale_cst: Option<String>,
    pub ipi_sale_rate: Option<Decimal>,
    pub reform: ReformProfile,
}

/// A product line of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    pub line_id: LineId,
    pub product_id: Option<ProductId>,
    pub description: String,
    /// Quantity, 3 decimal places.
    pub quantity: Decimal,
    /// Unit price, 2 decimal places.
    pub unit_price: Decimal,
    pub discount: Decimal,
    /// `None` when the referenced product was deleted or has no fiscal
    /// registration: the line contributes a no-op breakdown.
    pub fiscal: Option<ProductTaxProfile>,
}

/// A service line of a sale. Services carry no legacy goods taxes — only
/// the reform attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub line_id: LineId,
    pub service_id: Option<ServiceId>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub fiscal: Option<ReformProfile>,
}

/// A sale line as seen by the tax engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxableLine {
    Product(ProductLine),
    Service(ServiceLine),
}

impl TaxableLine {
    pub fn line_id(&self) -> LineId {
        match self {
            TaxableLine::Product(line) => line.line_id,
            TaxableLine::Service(line) => line.line_id,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            TaxableLine::Product(line) => &line.description,
            TaxableLine::Service(line) => &line.description,
        }
    }

    pub fn quantity(&self) -> Decimal {
        match self {
            TaxableLine::Product(line) => line.quantity,
            TaxableLine::Service(line) => line.quantity,
        }
    }

    pub fn unit_price(&self) -> Decimal {
        match self {
            TaxableLine::Product(line) => line.unit_price,
            TaxableLine::Service(line) => line.unit_price,
        }
    }

    pub fn discount(&self) -> Decimal {
        match self {
            TaxableLine::Product(line) => line.discount,
            TaxableLine::Service(line) => line.discount,
        }
    }

    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            TaxableLine::Product(line) => line.product_id,
            TaxableLine::Service(_) => None,
        }
    }

    pub fn service_id(&self) -> Option<ServiceId> {
        match self {
            TaxableLine::Product(_) => None,
            TaxableLine::Service(line) => line.service_id,
        }
    }

    /// Quantity × unit price − discount, rounded half-up to 2 decimal
    /// places.
    ///
    /// The only rounded amount in the engine; tax values computed from it
    /// keep full precision.
    pub fn line_total(&self) -> DomainResult<Decimal> {
        let gross = self
            .quantity()
            .checked_mul(self.unit_price())
            .ok_or_else(|| DomainError::invalid_numeric("line amount overflow"))?;
        let net = gross
            .checked_sub(self.discount())
            .ok_or_else(|| DomainError::invalid_numeric("line amount overflow"))?;
        Ok(round_half_up_2(net))
    }

    /// Reject unusable numeric inputs before any tax is computed.
    ///
    /// Hard errors: coercing a bad quantity or price to zero would
    /// understate a tax liability.
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity() <= Decimal::ZERO {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        if self.unit_price() <= Decimal::ZERO {
            return Err(DomainError::validation("line unit price must be positive"));
        }
        if self.discount() < Decimal::ZERO {
            return Err(DomainError::validation("line discount cannot be negative"));
        }
        if self.line_total()? <= Decimal::ZERO {
            return Err(DomainError::validation("line total must be positive"));
        }
        Ok(())
    }
}
