//! Incentive document model: redemption packages offered for a chosen
//! recommendation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Disclaimer, check_unit_range};
use crate::error::ContractError;

/// Non-monetary extra attached to a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perk {
    Donation,
    Tree,
    ExtraData,
    None,
}

impl Default for Perk {
    fn default() -> Self {
        Self::None
    }
}

impl Perk {
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Display label for the perk.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Donation => "Bağış",
            Self::Tree => "Fidan",
            Self::ExtraData => "Ek internet",
            Self::None => "-",
        }
    }
}

impl std::fmt::Display for Perk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Donation => write!(f, "donation"),
            Self::Tree => write!(f, "tree"),
            Self::ExtraData => write!(f, "extra_data"),
            Self::None => write!(f, "none"),
        }
    }
}

/// What a package is worth. Fields are not mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageValue {
    pub cash_amount_try: Option<u32>,
    pub carbon_points: Option<u32>,
    #[serde(default)]
    pub perk: Perk,
}

impl PackageValue {
    pub fn is_empty(&self) -> bool {
        self.cash_amount_try.is_none() && self.carbon_points.is_none() && !self.perk.is_present()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageUi {
    pub badge: String,
    pub cta_label: String,
}

/// One redemption option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentivePackage {
    pub package_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub value: PackageValue,
    pub ui: PackageUi,
}

/// Packages offered for a chosen recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveResult {
    pub request_id: String,
    pub model_version: String,
    pub selected_option_id: String,
    pub packages: Vec<IncentivePackage>,
    pub accept_score: f64,
    pub impact_score: f64,
    #[serde(default)]
    pub notes: Vec<String>,
    pub disclaimer: Disclaimer,
}

impl IncentiveResult {
    /// Look up a package by id.
    pub fn package(&self, package_id: &str) -> Option<&IncentivePackage> {
        self.packages.iter().find(|p| p.package_id == package_id)
    }

    /// Check the document-level invariants.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.packages.is_empty() {
            return Err(ContractError::Empty {
                field: "packages".into(),
            });
        }
        check_unit_range("accept_score", self.accept_score)?;
        check_unit_range("impact_score", self.impact_score)?;

        let mut seen = HashSet::new();
        for pkg in &self.packages {
            if pkg.package_id.is_empty() {
                return Err(ContractError::Empty {
                    field: "packages[].package_id".into(),
                });
            }
            if !seen.insert(pkg.package_id.as_str()) {
                return Err(ContractError::DuplicateId {
                    field: "package_id".into(),
                    id: pkg.package_id.clone(),
                });
            }
            if pkg.value.is_empty() {
                return Err(ContractError::EmptyPackage {
                    id: pkg.package_id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::fixtures;

    #[test]
    fn parses_fixture_document() {
        let result = fixtures::incentive_a();
        let ids: Vec<_> = result.packages.iter().map(|p| p.package_id.as_str()).collect();
        assert_eq!(ids, ["cash", "carbon_points", "hybrid"]);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn null_amounts_decode_as_none() {
        let result = fixtures::incentive_a();
        let cash = result.package("cash").unwrap();
        assert!(cash.value.cash_amount_try.is_some());
        assert!(cash.value.carbon_points.is_none());
    }

    #[test]
    fn perk_only_package_is_valid() {
        let value = PackageValue {
            cash_amount_try: None,
            carbon_points: None,
            perk: Perk::Tree,
        };
        assert!(!value.is_empty());
    }

    #[test]
    fn rejects_package_without_any_value() {
        let mut result = fixtures::incentive_a();
        result.packages[2].value = PackageValue::default();
        assert_eq!(
            result.validate(),
            Err(ContractError::EmptyPackage { id: "hybrid".into() })
        );
    }

    #[test]
    fn rejects_duplicate_package_ids() {
        let mut result = fixtures::incentive_a();
        result.packages[1].package_id = "cash".into();
        assert!(matches!(
            result.validate(),
            Err(ContractError::DuplicateId { id, .. }) if id == "cash"
        ));
    }

    #[test]
    fn rejects_accept_score_out_of_range() {
        let mut result = fixtures::incentive_a();
        result.accept_score = -0.1;
        assert!(matches!(
            result.validate(),
            Err(ContractError::OutOfRange { field, .. }) if field == "accept_score"
        ));
    }

    #[test]
    fn perk_serde_matches_display() {
        for perk in [Perk::Donation, Perk::Tree, Perk::ExtraData, Perk::None] {
            let json = serde_json::to_string(&perk).unwrap();
            assert_eq!(json, format!("\"{perk}\""));
        }
    }
}
