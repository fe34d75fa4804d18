use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The declared type of a calculator input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// A scalar number. A value containing a comma is carried through as a series.
    Number,
    /// Free single-line text (a method name, a timestamp, a comma-separated series).
    Text,
    /// Multi-line text holding series or row records.
    TextArea,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Number => "number",
            InputKind::Text => "text",
            InputKind::TextArea => "textarea",
        }
    }
}

/// The side of a vanilla option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl FromStr for OptionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            other => Err(CoreError::InvalidInput(
                "option type".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// The catalog sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Meta,
    GeneralTrading,
    OrderFlow,
    MarketAnalysis,
    TradingAnalytics,
    RiskManagement,
    PortfolioStrategy,
    QuantitativeFinance,
    Backtesting,
    Valuation,
    StocksAndBonds,
    ForexAndFutures,
    Options,
    Crypto,
    Taxes,
    Commodities,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::Meta,
        Category::GeneralTrading,
        Category::OrderFlow,
        Category::MarketAnalysis,
        Category::TradingAnalytics,
        Category::RiskManagement,
        Category::PortfolioStrategy,
        Category::QuantitativeFinance,
        Category::Backtesting,
        Category::Valuation,
        Category::StocksAndBonds,
        Category::ForexAndFutures,
        Category::Options,
        Category::Crypto,
        Category::Taxes,
        Category::Commodities,
    ];

    /// The human-readable section title.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Meta => "Meta Calculators",
            Category::GeneralTrading => "General Trading",
            Category::OrderFlow => "Order Flow & Microstructure",
            Category::MarketAnalysis => "Advanced Market Analysis",
            Category::TradingAnalytics => "Advanced Trading Analytics",
            Category::RiskManagement => "Risk Management",
            Category::PortfolioStrategy => "Portfolio Strategy",
            Category::QuantitativeFinance => "Quantitative Finance",
            Category::Backtesting => "Backtesting & Strategy Engineering",
            Category::Valuation => "Investment Valuation",
            Category::StocksAndBonds => "Stocks & Bonds",
            Category::ForexAndFutures => "Forex & Futures",
            Category::Options => "Options",
            Category::Crypto => "Cryptocurrency",
            Category::Taxes => "Taxes & Compliance",
            Category::Commodities => "Commodities & Niche",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    /// Matches a category by its label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownCategory(wanted.to_string()))
    }
}
