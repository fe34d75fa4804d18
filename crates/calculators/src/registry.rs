use crate::catalog;
use crate::error::CalcError;
use crate::Calculator;
use core_types::Category;
use tracing::debug;

/// The catalog, one section per category, in display order.
const SECTIONS: &[&[Calculator]] = &[
    catalog::meta::CALCULATORS,
    catalog::general::CALCULATORS,
    catalog::order_flow::CALCULATORS,
    catalog::market_analysis::CALCULATORS,
    catalog::trading_analytics::CALCULATORS,
    catalog::risk::CALCULATORS,
    catalog::portfolio::CALCULATORS,
    catalog::quant::CALCULATORS,
    catalog::backtesting::CALCULATORS,
    catalog::valuation::CALCULATORS,
    catalog::stocks::CALCULATORS,
    catalog::forex::CALCULATORS,
    catalog::options::CALCULATORS,
    catalog::crypto::CALCULATORS,
    catalog::taxes::CALCULATORS,
    catalog::commodities::CALCULATORS,
];

/// Every registered calculator, in catalog order.
pub fn all() -> impl Iterator<Item = &'static Calculator> {
    SECTIONS.iter().flat_map(|section| section.iter())
}

/// Looks up a calculator by its stable id.
pub fn find(id: &str) -> Result<&'static Calculator, CalcError> {
    all().find(|c| c.id == id).ok_or_else(|| {
        debug!(id, "calculator lookup missed");
        CalcError::UnknownCalculator(id.to_string())
    })
}

/// The calculators of one category, in catalog order.
pub fn by_category(category: Category) -> impl Iterator<Item = &'static Calculator> {
    all().filter(move |c| c.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let mut seen = HashSet::new();
        for calculator in all() {
            assert!(seen.insert(calculator.id), "duplicate id {}", calculator.id);
        }
        assert_eq!(seen.len(), 134);
    }

    #[test]
    fn sections_hold_only_their_own_category() {
        for section in SECTIONS {
            let first = section[0].category;
            assert!(section.iter().all(|c| c.category == first));
        }
        let order: Vec<Category> = SECTIONS.iter().map(|s| s[0].category).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn every_calculator_declares_unique_field_names() {
        for calculator in all() {
            let mut names = HashSet::new();
            for field in calculator.inputs {
                assert!(
                    names.insert(field.name),
                    "{} declares {} twice",
                    calculator.id,
                    field.name
                );
            }
        }
    }

    #[test]
    fn unknown_ids_are_reported() {
        let err = find("does-not-exist").unwrap_err();
        assert_eq!(err.to_string(), "Calculator 'does-not-exist' not found");
        assert_eq!(find("black-scholes").unwrap().category, Category::Options);
    }

    #[test]
    fn crypto_tax_is_registered_once_under_taxes() {
        let hits: Vec<_> = all().filter(|c| c.id == "crypto-tax-advanced").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, Category::Taxes);
    }
}
