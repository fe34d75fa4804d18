use super::{ensure, kv, max_of, min_of, tail};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::parse::{non_blank_lines, parse_number};
use crate::{Calculator, Compute, Outcome};
use analytics::{correlation, mean, std_dev};
use chrono::{NaiveDate, NaiveDateTime};
use core_types::{format_number, format_percent, Category, InputField};
use itertools::Itertools;

pub const CALCULATORS: &[Calculator] = &[
    MOVING_AVERAGE,
    VWAP_TWAP,
    REALIZED_VOLATILITY,
    ALPHA_BETA,
    MFE_MAE,
    HISTORICAL_VOLATILITY,
    MARKET_CORRELATION,
    PRICE_ELASTICITY,
    STDDEV_PRICE_RANGE,
    TRADE_DURATION,
    Z_SCORE,
    FVG,
    PREMIUM_DISCOUNT,
];

const TRADING_DAYS: f64 = 252.0;

pub const MOVING_AVERAGE: Calculator = Calculator {
    id: "moving-average",
    name: "Moving Average (SMA/EMA/WMA)",
    description: "Calculate Simple, Exponential, and Weighted Moving Averages for a data series.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::textarea("prices", "Closing Prices", "100, 102, 101, 103, 105")
            .info("Comma-separated values"),
        InputField::number("period", "Period", "3"),
    ],
    compute: Compute::Pure(moving_average),
};

fn moving_average(i: &Inputs) -> Outcome {
    let prices = i.series("prices");
    let period = i.count("period")?;
    ensure(period > 0, "Period must be positive.")?;
    ensure(
        prices.len() >= period,
        &format!("Not enough data for period {period}."),
    )?;

    let recent = tail(&prices, period);
    let sma = mean(recent);

    // EMA is seeded with the SMA of the first window and rolled over the rest.
    let k = 2.0 / (period as f64 + 1.0);
    let seed = mean(&prices[..period]);
    let ema = prices[period..]
        .iter()
        .fold(seed, |acc, price| price * k + acc * (1.0 - k));

    let weight_sum = (period * (period + 1) / 2) as f64;
    let wma = recent
        .iter()
        .enumerate()
        .map(|(idx, p)| p * (idx + 1) as f64)
        .sum::<f64>()
        / weight_sum;

    Ok(vec![
        kv(format!("SMA ({period})"), format_number(sma, 4)),
        kv(format!("EMA ({period})"), format_number(ema, 4)),
        kv(format!("WMA ({period})"), format_number(wma, 4)),
    ])
}

pub const VWAP_TWAP: Calculator = Calculator {
    id: "vwap-twap",
    name: "VWAP & TWAP",
    description: "Calculate Volume-Weighted and Time-Weighted Average Prices.",
    category: Category::MarketAnalysis,
    inputs: &[InputField::textarea(
        "data",
        "Trade Data (Price,Volume)",
        "100.10,500\n100.25,300\n100.15,700",
    )
    .info("Enter each period on a new line: Price,Volume")],
    compute: Compute::Pure(vwap_twap),
};

fn vwap_twap(i: &Inputs) -> Outcome {
    let text = i.text("data");
    let mut total_pv = 0.0;
    let mut total_volume = 0.0;
    let mut total_price = 0.0;
    let mut periods = 0usize;

    for line in non_blank_lines(&text) {
        let Some((price, volume)) = line.split(',').collect_tuple() else {
            return Err(CalcError::malformed(format!(
                "Invalid format for line: \"{line}\""
            )));
        };
        match (parse_number(price.trim()), parse_number(volume.trim())) {
            (Some(price), Some(volume)) if volume >= 0.0 => {
                total_pv += price * volume;
                total_volume += volume;
                total_price += price;
                periods += 1;
            }
            _ => {
                return Err(CalcError::malformed(format!(
                    "Invalid number in line: \"{line}\""
                )));
            }
        }
    }
    ensure(periods > 0, "No trade data entered.")?;
    ensure(total_volume != 0.0, "Total volume cannot be zero.")?;

    Ok(vec![
        kv("VWAP (Volume-Weighted)", format_number(total_pv / total_volume, 4)),
        kv("TWAP (Time-Weighted)", format_number(total_price / periods as f64, 4)),
    ])
}

/// Natural log returns between consecutive prices.
fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

pub const REALIZED_VOLATILITY: Calculator = Calculator {
    id: "realized-volatility",
    name: "Realized Volatility",
    description: "Calculate the historical annualized volatility of an asset from price data.",
    category: Category::MarketAnalysis,
    inputs: &[InputField::textarea("prices", "Closing Prices", "100, 101, 100.5, 102, 101.5")
        .info("Comma-separated values")],
    compute: Compute::Pure(realized_volatility),
};

fn realized_volatility(i: &Inputs) -> Outcome {
    let prices = i.series("prices");
    ensure(prices.len() >= 2, "At least two prices are needed.")?;
    ensure(
        prices[..prices.len() - 1].iter().all(|p| *p != 0.0),
        "Price cannot be zero.",
    )?;
    let annualized = std_dev(&log_returns(&prices)) * TRADING_DAYS.sqrt();
    Ok(vec![kv("Annualized Volatility", format_percent(annualized))])
}

pub const ALPHA_BETA: Calculator = Calculator {
    id: "alpha-beta",
    name: "Alpha & Beta",
    description: "Calculate the Alpha and Beta of an asset relative to a benchmark market index.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::textarea("assetReturns", "Asset Returns (%)", "2, -1, 3, 1.5, 2.5")
            .info("Comma-separated values"),
        InputField::textarea("marketReturns", "Market Returns (%)", "1, -0.5, 2, 1, 1.5")
            .info("Comma-separated values"),
        InputField::number("riskFreeRate", "Annual Risk-Free Rate (%)", "3"),
    ],
    compute: Compute::Pure(alpha_beta),
};

fn alpha_beta(i: &Inputs) -> Outcome {
    let stock: Vec<f64> = i.series("assetReturns").iter().map(|r| r / 100.0).collect();
    let market: Vec<f64> = i.series("marketReturns").iter().map(|r| r / 100.0).collect();
    ensure(
        stock.len() == market.len() && stock.len() >= 2,
        "Series must have same length and at least 2 points.",
    )?;

    let n = stock.len() as f64;
    let (mean_s, mean_m) = (mean(&stock), mean(&market));
    let covariance = stock
        .iter()
        .zip(&market)
        .map(|(s, m)| (s - mean_s) * (m - mean_m))
        .sum::<f64>()
        / (n - 1.0);
    let variance_m = market.iter().map(|m| (m - mean_m).powi(2)).sum::<f64>() / (n - 1.0);
    ensure(variance_m != 0.0, "Market variance cannot be zero.")?;

    let beta = covariance / variance_m;
    // The annual risk-free rate is spread evenly over the observed periods.
    let rf = i.number("riskFreeRate")? / 100.0 / n;
    let alpha = (mean_s - rf) - beta * (mean_m - rf);

    Ok(vec![
        kv("Beta", format_number(beta, 3)),
        kv("Alpha (Period)", format_percent(alpha)),
        kv("Alpha (Annualized)", format_percent(alpha * n)),
    ])
}

pub const MFE_MAE: Calculator = Calculator {
    id: "mfe-mae",
    name: "MFE / MAE",
    description: "Calculate Maximum Favorable and Adverse Excursion from trade prices.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::number("entryPrice", "Entry Price", "100"),
        InputField::textarea("tradePrices", "Intra-Trade Prices", "101, 102.5, 99.5, 103, 101.5")
            .info("Comma-separated prices during the trade"),
    ],
    compute: Compute::Pure(mfe_mae),
};

fn mfe_mae(i: &Inputs) -> Outcome {
    let entry = i.number("entryPrice")?;
    let prices = i.series("tradePrices");
    ensure(!prices.is_empty(), "At least one intra-trade price is needed.")?;
    Ok(vec![
        kv("Max Favorable Excursion (MFE)", format_number(max_of(&prices) - entry, 4)),
        kv("Max Adverse Excursion (MAE)", format_number(entry - min_of(&prices), 4)),
    ])
}

pub const HISTORICAL_VOLATILITY: Calculator = Calculator {
    id: "historical-volatility",
    name: "Historical Volatility (HV)",
    description: "Calculate the annualized historical volatility from a series of closing prices.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::textarea("prices", "Closing Prices", "100,102,101,103,105")
            .info("Comma-separated daily closing prices"),
        InputField::number("tradingDays", "Trading Days in Year", "252").default_value("252"),
    ],
    compute: Compute::Pure(historical_volatility),
};

fn historical_volatility(i: &Inputs) -> Outcome {
    let prices = i.series("prices");
    ensure(prices.len() >= 2, "At least two price points are required.")?;
    let days = i.number("tradingDays")?;
    ensure(days > 0.0, "Trading days must be positive.")?;
    let hv = std_dev(&log_returns(&prices)) * days.sqrt();
    Ok(vec![kv("Annualized Historical Volatility", format_percent(hv))])
}

pub const MARKET_CORRELATION: Calculator = Calculator {
    id: "market-correlation",
    name: "Market Correlation",
    description: "Calculate the correlation coefficient between two sets of price data.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::textarea("assetA", "Asset A Prices", "10, 12, 15, 14, 16")
            .info("Comma-separated values"),
        InputField::textarea("assetB", "Asset B Prices", "100, 105, 112, 110, 115")
            .info("Comma-separated values"),
    ],
    compute: Compute::Pure(market_correlation),
};

/// Plain-language strength of a correlation coefficient.
pub(crate) fn describe_correlation(corr: f64) -> &'static str {
    match corr {
        c if c > 0.7 => "Strong positive correlation",
        c if c > 0.3 => "Moderate positive correlation",
        c if c > 0.0 => "Weak positive correlation",
        c if c < -0.7 => "Strong negative correlation",
        c if c < -0.3 => "Moderate negative correlation",
        c if c < 0.0 => "Weak negative correlation",
        _ => "No correlation",
    }
}

fn market_correlation(i: &Inputs) -> Outcome {
    let a = i.series("assetA");
    let b = i.series("assetB");
    ensure(
        a.len() == b.len() && a.len() >= 2,
        "Series must have the same length and at least 2 data points.",
    )?;
    let corr = correlation(&a, &b);
    Ok(vec![
        kv("Correlation Coefficient", format_number(corr, 4)),
        kv("Interpretation", describe_correlation(corr)),
    ])
}

pub const PRICE_ELASTICITY: Calculator = Calculator {
    id: "price-elasticity",
    name: "Price Elasticity",
    description: "Calculate the price elasticity of demand between two price/quantity points.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::number("price1", "Initial Price", "10"),
        InputField::number("quantity1", "Initial Quantity Demanded", "1000"),
        InputField::number("price2", "New Price", "12"),
        InputField::number("quantity2", "New Quantity Demanded", "800"),
    ],
    compute: Compute::Pure(price_elasticity),
};

fn price_elasticity(i: &Inputs) -> Outcome {
    let (p1, q1) = (i.number("price1")?, i.number("quantity1")?);
    let (p2, q2) = (i.number("price2")?, i.number("quantity2")?);
    ensure(
        p1 != p2 && q1 != q2,
        "Prices and quantities must change to calculate elasticity.",
    )?;

    // Midpoint (arc) method.
    let change_q = (q2 - q1) / ((q1 + q2) / 2.0);
    let change_p = (p2 - p1) / ((p1 + p2) / 2.0);
    ensure(change_p != 0.0, "Price change cannot be zero.")?;
    let elasticity = change_q / change_p;

    let interpretation = if elasticity.abs() > 1.0 {
        "Elastic (demand is sensitive to price)"
    } else if elasticity.abs() < 1.0 {
        "Inelastic (demand is not sensitive to price)"
    } else {
        "Unit Elastic"
    };
    Ok(vec![
        kv("Price Elasticity of Demand", format_number(elasticity, 3)),
        kv("Interpretation", interpretation),
    ])
}

pub const STDDEV_PRICE_RANGE: Calculator = Calculator {
    id: "stddev-price-range",
    name: "Std. Dev. Price Range",
    description: "Calculate price bands based on standard deviations from a moving average.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::textarea("prices", "Closing Prices", "100, 102, 101, 103, 105, 104, 106, 107")
            .info("Comma-separated values"),
        InputField::number("period", "MA Period", "5"),
        InputField::number("stddevs", "Standard Deviations", "2"),
    ],
    compute: Compute::Pure(stddev_price_range),
};

fn stddev_price_range(i: &Inputs) -> Outcome {
    let prices = i.series("prices");
    let period = i.count("period")?;
    let width = i.number("stddevs")?;
    ensure(period > 0, "Period must be positive.")?;
    ensure(
        prices.len() >= period,
        &format!("Not enough data for period {period}."),
    )?;

    let recent = tail(&prices, period);
    let sma = mean(recent);
    let sd = std_dev(recent);
    Ok(vec![
        kv(format!("+{width} SD Upper Band"), format_number(sma + sd * width, 2)),
        kv(format!("Moving Average ({period})"), format_number(sma, 2)),
        kv(format!("-{width} SD Lower Band"), format_number(sma - sd * width, 2)),
    ])
}

pub const TRADE_DURATION: Calculator = Calculator {
    id: "trade-duration",
    name: "Trade Duration",
    description: "Calculate the duration of a trade in various units.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::text("entryTime", "Entry Timestamp", "2023-10-27 09:30:00")
            .info("Format: YYYY-MM-DD HH:MM:SS"),
        InputField::text("exitTime", "Exit Timestamp", "2023-10-27 15:45:00")
            .info("Format: YYYY-MM-DD HH:MM:SS"),
    ],
    compute: Compute::Pure(trade_duration),
};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a wall-clock timestamp, accepting a bare date as midnight.
pub(crate) fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn trade_duration(i: &Inputs) -> Outcome {
    let (Some(entry), Some(exit)) = (
        parse_timestamp(&i.text("entryTime")),
        parse_timestamp(&i.text("exitTime")),
    ) else {
        return Err(CalcError::domain("Invalid date format."));
    };
    let elapsed = exit - entry;
    ensure(elapsed.num_milliseconds() >= 0, "Exit time cannot be before entry time.")?;

    let seconds = elapsed.num_milliseconds() as f64 / 1000.0;
    Ok(vec![
        kv("Duration (Hours)", format_number(seconds / 3600.0, 2)),
        kv("Duration (Minutes)", format_number(seconds / 60.0, 2)),
        kv("Duration (Seconds)", format_number(seconds, 0)),
    ])
}

pub const Z_SCORE: Calculator = Calculator {
    id: "z-score",
    name: "Z-Score",
    description: "Calculate how many standard deviations a data point is from the mean.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::textarea("data", "Data Series", "10, 12, 15, 14, 16, 13, 11")
            .info("Comma-separated values"),
        InputField::number("value", "Current Value", "17"),
    ],
    compute: Compute::Pure(z_score),
};

fn z_score(i: &Inputs) -> Outcome {
    let data = i.series("data");
    let value = i.number("value")?;
    ensure(data.len() >= 2, "At least two data points are needed.")?;
    let sd = std_dev(&data);
    ensure(sd != 0.0, "Standard deviation is zero.")?;
    Ok(vec![kv("Z-Score", format_number((value - mean(&data)) / sd, 4))])
}

pub const FVG: Calculator = Calculator {
    id: "fvg",
    name: "Fair Value Gap (FVG)",
    description: "Identify the price range of a Fair Value Gap (imbalance) from candle data.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::number("candle1_low", "Candle 1 Low", "100"),
        InputField::number("candle1_high", "Candle 1 High", "105"),
        InputField::number("candle3_low", "Candle 3 Low", "108"),
        InputField::number("candle3_high", "Candle 3 High", "112"),
    ],
    compute: Compute::Pure(fvg),
};

fn fvg(i: &Inputs) -> Outcome {
    let c1_high = i.number("candle1_high")?;
    let c3_low = i.number("candle3_low")?;
    if c3_low > c1_high {
        return Ok(vec![kv(
            "Bullish FVG Range",
            format!("{} - {}", format_number(c1_high, 2), format_number(c3_low, 2)),
        )]);
    }

    let c1_low = i.number("candle1_low")?;
    let c3_high = i.number("candle3_high")?;
    if c1_low > c3_high {
        return Ok(vec![kv(
            "Bearish FVG Range",
            format!("{} - {}", format_number(c3_high, 2), format_number(c1_low, 2)),
        )]);
    }
    Ok(vec![kv("Result", "No Fair Value Gap detected.")])
}

pub const PREMIUM_DISCOUNT: Calculator = Calculator {
    id: "premium-discount",
    name: "Premium/Discount Market",
    description: "Determine if the current price is in a premium or discount zone of a given range.",
    category: Category::MarketAnalysis,
    inputs: &[
        InputField::number("rangeHigh", "Range High", "200"),
        InputField::number("rangeLow", "Range Low", "150"),
        InputField::number("currentPrice", "Current Price", "185"),
    ],
    compute: Compute::Pure(premium_discount),
};

fn premium_discount(i: &Inputs) -> Outcome {
    let high = i.number("rangeHigh")?;
    let low = i.number("rangeLow")?;
    let price = i.number("currentPrice")?;
    ensure(low < high, "Range Low must be less than Range High.")?;

    let equilibrium = (high + low) / 2.0;
    let state = if price == equilibrium {
        "Equilibrium"
    } else if price < equilibrium {
        "Discount (cheap)"
    } else {
        "Premium (expensive)"
    };
    Ok(vec![
        kv("Equilibrium Price (50%)", format_number(equilibrium, 2)),
        kv("Current Market State", state),
    ])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, value_of};
    use super::*;

    #[test]
    fn moving_averages_over_a_short_series() {
        let out = run(
            &MOVING_AVERAGE,
            &[("prices", "100, 102, 101, 103, 105"), ("period", "3")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "SMA (3)"), "103.0000");
        // (101 * 1 + 103 * 2 + 105 * 3) / 6
        assert_eq!(value_of(&out, "WMA (3)"), "103.6667");
        // seed 101, then 103 and 105 with k = 0.5
        assert_eq!(value_of(&out, "EMA (3)"), "103.5000");
    }

    #[test]
    fn moving_average_needs_a_full_window() {
        let err = run(&MOVING_AVERAGE, &[("prices", "1, 2"), ("period", "5")]).unwrap_err();
        assert_eq!(err.to_string(), "Not enough data for period 5.");
    }

    #[test]
    fn vwap_and_twap() {
        let out = run(&VWAP_TWAP, &[("data", "100,100\n110,300\n")]).unwrap();
        assert_eq!(value_of(&out, "VWAP (Volume-Weighted)"), "107.5000");
        assert_eq!(value_of(&out, "TWAP (Time-Weighted)"), "105.0000");

        let err = run(&VWAP_TWAP, &[("data", "100,abc")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid number in line: \"100,abc\"");
    }

    #[test]
    fn constant_prices_have_no_volatility() {
        let out = run(&REALIZED_VOLATILITY, &[("prices", "50, 50, 50")]).unwrap();
        assert_eq!(value_of(&out, "Annualized Volatility"), "0.00%");
        let err = run(&REALIZED_VOLATILITY, &[("prices", "0, 50")]).unwrap_err();
        assert_eq!(err.to_string(), "Price cannot be zero.");
    }

    #[test]
    fn beta_of_a_levered_copy_is_the_leverage() {
        let out = run(
            &ALPHA_BETA,
            &[
                ("assetReturns", "2, -1, 4"),
                ("marketReturns", "1, -0.5, 2"),
                ("riskFreeRate", "0"),
            ],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Beta"), "2.000");
    }

    #[test]
    fn correlation_interpretation_bands() {
        let out = run(
            &MARKET_CORRELATION,
            &[("assetA", "1, 2, 3, 4"), ("assetB", "10, 20, 30, 40")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Correlation Coefficient"), "1.0000");
        assert_eq!(value_of(&out, "Interpretation"), "Strong positive correlation");
        assert_eq!(describe_correlation(-0.5), "Moderate negative correlation");
        assert_eq!(describe_correlation(f64::NAN), "No correlation");
    }

    #[test]
    fn elasticity_uses_midpoints() {
        let out = run(
            &PRICE_ELASTICITY,
            &[("price1", "10"), ("quantity1", "1000"), ("price2", "12"), ("quantity2", "800")],
        )
        .unwrap();
        // (-200 / 900) / (2 / 11)
        assert_eq!(value_of(&out, "Price Elasticity of Demand"), "-1.222");
        assert_eq!(
            value_of(&out, "Interpretation"),
            "Elastic (demand is sensitive to price)"
        );
    }

    #[test]
    fn trade_duration_across_formats() {
        let out = run(
            &TRADE_DURATION,
            &[("entryTime", "2023-10-27 09:30:00"), ("exitTime", "2023-10-27T15:45:00")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Duration (Hours)"), "6.25");
        assert_eq!(value_of(&out, "Duration (Seconds)"), "22,500");

        let err = run(
            &TRADE_DURATION,
            &[("entryTime", "2023-10-28"), ("exitTime", "2023-10-27")],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Exit time cannot be before entry time.");
        let err = run(&TRADE_DURATION, &[("entryTime", "yesterday"), ("exitTime", "2023-10-27")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid date format.");
    }

    #[test]
    fn fvg_detects_both_directions() {
        let bullish = run(
            &FVG,
            &[("candle1_low", "100"), ("candle1_high", "105"), ("candle3_low", "108"), ("candle3_high", "112")],
        )
        .unwrap();
        assert_eq!(value_of(&bullish, "Bullish FVG Range"), "105.00 - 108.00");

        let bearish = run(
            &FVG,
            &[("candle1_low", "110"), ("candle1_high", "115"), ("candle3_low", "100"), ("candle3_high", "104")],
        )
        .unwrap();
        assert_eq!(value_of(&bearish, "Bearish FVG Range"), "104.00 - 110.00");
    }

    #[test]
    fn premium_discount_zones() {
        let out = run(
            &PREMIUM_DISCOUNT,
            &[("rangeHigh", "200"), ("rangeLow", "150"), ("currentPrice", "175")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Current Market State"), "Equilibrium");
    }
}
