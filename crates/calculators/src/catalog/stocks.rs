use super::{ensure, kv};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::{Calculator, Compute, Outcome};
use analytics::bisection;
use core_types::{format_currency, format_number, format_percent, Category, InputField};
use tracing::debug;

pub const CALCULATORS: &[Calculator] = &[
    DIVIDEND_YIELD,
    EPS,
    STOCK_ROI,
    STOCK_SPLIT,
    BOND_YTM,
    COUPON_PAYMENT,
];

pub const DIVIDEND_YIELD: Calculator = Calculator {
    id: "dividend-yield",
    name: "Dividend Yield",
    description: "Calculate the dividend yield of a stock as a percentage of its price.",
    category: Category::StocksAndBonds,
    inputs: &[
        InputField::number("annualDividend", "Annual Dividend per Share", "5.00"),
        InputField::number("stockPrice", "Current Stock Price", "120.00"),
    ],
    compute: Compute::Pure(dividend_yield),
};

fn dividend_yield(i: &Inputs) -> Outcome {
    let price = i.number("stockPrice")?;
    ensure(price > 0.0, "Stock price must be positive.")?;
    Ok(vec![kv(
        "Dividend Yield",
        format_percent(i.number("annualDividend")? / price),
    )])
}

pub const EPS: Calculator = Calculator {
    id: "eps",
    name: "Earnings Per Share (EPS)",
    description: "Calculate a company's profitability on a per-share basis.",
    category: Category::StocksAndBonds,
    inputs: &[
        InputField::number("netIncome", "Net Income", "10000000"),
        InputField::number("prefDividends", "Preferred Dividends", "1000000").default_value("0"),
        InputField::number("shares", "Outstanding Shares", "5000000"),
    ],
    compute: Compute::Pure(eps),
};

fn eps(i: &Inputs) -> Outcome {
    let shares = i.number("shares")?;
    ensure(shares > 0.0, "Outstanding shares must be positive.")?;
    let earnings = i.number("netIncome")? - i.number_or("prefDividends", 0.0)?;
    Ok(vec![kv("Earnings Per Share (EPS)", format_currency(earnings / shares))])
}

pub const STOCK_ROI: Calculator = Calculator {
    id: "stock-roi",
    name: "Stock ROI",
    description: "Calculate the total Return on Investment for a stock, including dividends.",
    category: Category::StocksAndBonds,
    inputs: &[
        InputField::number("purchasePrice", "Purchase Price per Share", "100"),
        InputField::number("sellPrice", "Current/Sell Price per Share", "120"),
        InputField::number("dividends", "Total Dividends Received per Share", "5").default_value("0"),
    ],
    compute: Compute::Pure(stock_roi),
};

fn stock_roi(i: &Inputs) -> Outcome {
    let cost = i.number("purchasePrice")?;
    ensure(cost > 0.0, "Purchase price must be positive.")?;
    let gain = i.number("sellPrice")? - cost + i.number_or("dividends", 0.0)?;
    Ok(vec![kv("Total ROI", format_percent(gain / cost))])
}

pub const STOCK_SPLIT: Calculator = Calculator {
    id: "stock-split",
    name: "Stock Split",
    description: "Calculate your new share count and price after a stock split or reverse split.",
    category: Category::StocksAndBonds,
    inputs: &[
        InputField::number("shares", "Current Number of Shares", "100"),
        InputField::number("price", "Current Share Price", "200"),
        InputField::number("split_for", "Split Ratio (For)", "2")
            .info("e.g., for a 2-for-1 split, enter 2"),
        InputField::number("split_from", "Split Ratio (From)", "1")
            .info("e.g., for a 2-for-1 split, enter 1"),
    ],
    compute: Compute::Pure(stock_split),
};

fn stock_split(i: &Inputs) -> Outcome {
    let split_for = i.number("split_for")?;
    let split_from = i.number("split_from")?;
    ensure(split_from > 0.0, "Split ratio \"from\" value must be positive.")?;
    ensure(split_for > 0.0, "Split ratio \"for\" value must be positive.")?;

    let ratio = split_for / split_from;
    Ok(vec![
        kv("New Number of Shares", format_number(i.number("shares")? * ratio, 2)),
        kv("New Price per Share", format_currency(i.number("price")? / ratio)),
    ])
}

pub const BOND_YTM: Calculator = Calculator {
    id: "bond-ytm",
    name: "Bond Yield to Maturity (YTM)",
    description: "Estimate the total return anticipated on a bond if it is held until it matures.",
    category: Category::StocksAndBonds,
    inputs: &[
        InputField::number("currentPrice", "Current Bond Price", "950"),
        InputField::number("faceValue", "Bond Face Value (Par)", "1000"),
        InputField::number("couponRate", "Annual Coupon Rate (%)", "5"),
        InputField::number("years", "Years to Maturity", "10"),
    ],
    compute: Compute::Pure(bond_ytm),
};

/// Longest maturity the yield search accepts; `bond_price` walks every coupon year.
const MAX_BOND_YEARS: f64 = 1_000.0;

/// Annual-pay bond price at `rate`: whole-year coupons plus the discounted face value.
fn bond_price(face: f64, coupon: f64, years: f64, rate: f64) -> f64 {
    let coupons: f64 = (1_i32..)
        .map(f64::from)
        .take_while(|t| *t <= years)
        .map(|t| coupon / (1.0 + rate).powf(t))
        .sum();
    coupons + face / (1.0 + rate).powf(years)
}

fn bond_ytm(i: &Inputs) -> Outcome {
    let price = i.number("currentPrice")?;
    let face = i.number("faceValue")?;
    let coupon = i.number("couponRate")? / 100.0 * face;
    let years = i.number("years")?;
    ensure(years > 0.0, "Years to maturity must be positive.")?;
    ensure(
        years <= MAX_BOND_YEARS,
        "Years to maturity must be at most 1000.",
    )?;

    // Price falls as yield rises, so search the negated curve.
    let ytm = bisection(
        |rate| -bond_price(face, coupon, years, rate),
        -price,
        0.0,
        1.0,
        1e-6,
        100,
    );
    let residual = (bond_price(face, coupon, years, ytm) - price).abs();
    debug!(ytm, residual, "bond yield search finished");
    if ytm >= 0.99 || residual > 1e-3 * face.abs().max(1.0) {
        return Err(CalcError::non_convergence(
            "Could not converge to a solution. Please check input values.",
        ));
    }
    Ok(vec![kv("Yield to Maturity (YTM)", format_percent(ytm))])
}

pub const COUPON_PAYMENT: Calculator = Calculator {
    id: "coupon-payment",
    name: "Coupon Payment",
    description: "Calculate the periodic coupon payment from a bond.",
    category: Category::StocksAndBonds,
    inputs: &[
        InputField::number("faceValue", "Bond Face Value (Par)", "1000"),
        InputField::number("couponRate", "Annual Coupon Rate (%)", "5"),
        InputField::number("frequency", "Payments per Year", "2"),
    ],
    compute: Compute::Pure(coupon_payment),
};

fn coupon_payment(i: &Inputs) -> Outcome {
    let frequency = i.number("frequency")?;
    ensure(frequency > 0.0, "Payment frequency must be positive.")?;
    let annual = i.number("faceValue")? * i.number("couponRate")? / 100.0;
    Ok(vec![kv("Coupon Payment", format_currency(annual / frequency))])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, value_of};
    use super::*;

    #[test]
    fn yield_and_roi() {
        let out = run(&DIVIDEND_YIELD, &[("annualDividend", "5"), ("stockPrice", "125")]).unwrap();
        assert_eq!(value_of(&out, "Dividend Yield"), "4.00%");

        let out = run(&STOCK_ROI, &[("purchasePrice", "100"), ("sellPrice", "120")]).unwrap();
        assert_eq!(value_of(&out, "Total ROI"), "20.00%");
        let out = run(
            &STOCK_ROI,
            &[("purchasePrice", "100"), ("sellPrice", "120"), ("dividends", "5")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Total ROI"), "25.00%");
    }

    #[test]
    fn eps_subtracts_preferred_dividends() {
        let out = run(
            &EPS,
            &[("netIncome", "10000000"), ("prefDividends", "1000000"), ("shares", "5000000")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Earnings Per Share (EPS)"), "$1.80");

        let err = run(&EPS, &[("netIncome", "1"), ("shares", "0")]).unwrap_err();
        assert_eq!(err.to_string(), "Outstanding shares must be positive.");
    }

    #[test]
    fn reverse_split() {
        let out = run(
            &STOCK_SPLIT,
            &[("shares", "100"), ("price", "2"), ("split_for", "1"), ("split_from", "10")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "New Number of Shares"), "10.00");
        assert_eq!(value_of(&out, "New Price per Share"), "$20.00");
    }

    #[test]
    fn par_bond_yields_its_coupon() {
        let out = run(
            &BOND_YTM,
            &[("currentPrice", "1000"), ("faceValue", "1000"), ("couponRate", "5"), ("years", "10")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Yield to Maturity (YTM)"), "5.00%");
    }

    #[test]
    fn discount_bond_yields_more_than_its_coupon() {
        let out = run(
            &BOND_YTM,
            &[("currentPrice", "950"), ("faceValue", "1000"), ("couponRate", "5"), ("years", "10")],
        )
        .unwrap();
        let ytm: f64 = value_of(&out, "Yield to Maturity (YTM)")
            .trim_end_matches('%')
            .parse()
            .unwrap();
        assert!((5.6..5.8).contains(&ytm), "ytm {ytm}");
    }

    #[test]
    fn unreachable_price_is_non_convergent() {
        let err = run(
            &BOND_YTM,
            &[("currentPrice", "5"), ("faceValue", "1000"), ("couponRate", "5"), ("years", "10")],
        )
        .unwrap_err();
        assert!(matches!(err, CalcError::NonConvergence(_)));
    }

    #[test]
    fn maturity_is_bounded() {
        let err = run(
            &BOND_YTM,
            &[("currentPrice", "950"), ("faceValue", "1000"), ("couponRate", "5"), ("years", "1e12")],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Years to maturity must be at most 1000.");
    }

    #[test]
    fn semiannual_coupon() {
        let out = run(
            &COUPON_PAYMENT,
            &[("faceValue", "1000"), ("couponRate", "5"), ("frequency", "2")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Coupon Payment"), "$25.00");
    }
}
