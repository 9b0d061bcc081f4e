//! Store-level fiscal configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Issuing environment for fiscal documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalEnvironment {
    Homologation,
    Production,
}

/// Kind of outbound fiscal document a store can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Nfe,
    Nfce,
}

impl core::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DocumentKind::Nfe => f.write_str("NF-e"),
            DocumentKind::Nfce => f.write_str("NFC-e"),
        }
    }
}

/// Fiscal configuration of a store.
///
/// At most one per store, and every engine entry point accepts it as
/// `Option<&FiscalConfig>`: an absent configuration means "reform disabled,
/// regime unknown" and is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalConfig {
    /// Tax regime label, free text (e.g. `SIMPLES_NACIONAL`,
    /// `LUCRO_PRESUMIDO`, `LUCRO_REAL`). The Simples regime is detected by
    /// substring, see [`regime_is_simples`].
    pub tax_regime: String,
    pub state_registration: String,
    pub environment: FiscalEnvironment,
    pub nfe_series: String,
    pub nfce_series: String,
    pub next_nfe_number: u32,
    pub next_nfce_number: u32,
    /// Feature flag for the 2026 reform taxes (IBS/CBS). Ships off: with
    /// the flag down the engine behaves exactly as before the reform.
    pub reform_enabled: bool,
    /// Store default IBS rate (percent) for products that don't specify one.
    /// `None` resolves to the pilot-phase default.
    pub default_ibs_rate: Option<Decimal>,
    /// Store default CBS rate (percent); `None` resolves to the pilot-phase
    /// default.
    pub default_cbs_rate: Option<Decimal>,
}

impl Default for FiscalConfig {
    fn default() -> Self {
        Self {
            tax_regime: String::new(),
            state_registration: String::new(),
            environment: FiscalEnvironment::Homologation,
            nfe_series: "001".to_string(),
            nfce_series: "001".to_string(),
            next_nfe_number: 1,
            next_nfce_number: 1,
            reform_enabled: false,
            default_ibs_rate: None,
            default_cbs_rate: None,
        }
    }
}

impl FiscalConfig {
    pub fn new(tax_regime: impl Into<String>) -> Self {
        Self {
            tax_regime: tax_regime.into(),
            ..Self::default()
        }
    }

    pub fn is_simples(&self) -> bool {
        regime_is_simples(Some(&self.tax_regime))
    }

    pub fn series_for(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Nfe => &self.nfe_series,
            DocumentKind::Nfce => &self.nfce_series,
        }
    }

    pub fn next_number_for(&self, kind: DocumentKind) -> u32 {
        match kind {
            DocumentKind::Nfe => self.next_nfe_number,
            DocumentKind::Nfce => self.next_nfce_number,
        }
    }
}

/// True when the regime label names the Simples Nacional election.
///
/// Case-insensitive substring match: the label is operator-entered free text
/// (`SIMPLES_NACIONAL`, `Simples Nacional`, ...).
pub fn regime_is_simples(regime: Option<&str>) -> bool {
    regime.is_some_and(|r| r.to_ascii_uppercase().contains("SIMPLES"))
}
