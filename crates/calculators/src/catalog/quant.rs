use super::{ensure, kv};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::parse::{non_blank_lines, parse_number};
use crate::{Calculator, Compute, Outcome};
use analytics::{correlation, linear_regression, rolling};
use core_types::{format_number, format_percent, CalculationResult, Category, Cell, InputField};
use itertools::Itertools;

pub const CALCULATORS: &[Calculator] = &[
    ARIMA_FORECASTING,
    ROLLING_REGRESSION_BETA,
    CORRELATION_MATRIX,
    MAX_DRAWDOWN_CLUSTERS,
];

pub const ARIMA_FORECASTING: Calculator = Calculator {
    id: "arima-forecasting",
    name: "ARIMA Forecasting (AR1 Model)",
    description: "Generate a simple forecast using a first-order autoregressive (AR1) model.",
    category: Category::QuantitativeFinance,
    inputs: &[
        InputField::textarea("prices", "Price Series", "100, 101, 100.5, 102, 101.5, 103")
            .info("Comma-separated values"),
        InputField::number("periods", "Periods to Forecast", "5"),
    ],
    compute: Compute::Pure(arima_forecasting),
};

const MAX_FORECAST_PERIODS: usize = 1_000;

fn arima_forecasting(i: &Inputs) -> Outcome {
    let prices = i.series("prices");
    let periods = i.count_at_most("periods", MAX_FORECAST_PERIODS)?;
    ensure(
        prices.len() >= 10,
        "A longer historical price series is recommended.",
    )?;

    // Fit r[t+1] = c + phi * r[t] on consecutive price differences.
    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let lagged: Vec<(f64, f64)> = changes.iter().copied().tuple_windows().collect();
    let fit = linear_regression(&lagged);

    // The lag term is always measured from the second-to-last observed price.
    let anchor = prices[prices.len() - 2];
    let mut last = prices[prices.len() - 1];
    let forecasts: Vec<f64> = (0..periods)
        .map(|_| {
            last += fit.intercept + fit.slope * (last - anchor);
            last
        })
        .collect();

    let rows = forecasts
        .iter()
        .enumerate()
        .map(|(idx, f)| vec![Cell::from(idx + 1), Cell::from(format_number(*f, 4))]);
    Ok(vec![CalculationResult::table(
        "AR(1) Forecast",
        ["Period", "Forecasted Price"],
        rows,
    )])
}

pub const ROLLING_REGRESSION_BETA: Calculator = Calculator {
    id: "rolling-regression-beta",
    name: "Rolling Regression Beta",
    description: "Calculate Beta over a rolling window to see how it changes over time.",
    category: Category::QuantitativeFinance,
    inputs: &[
        InputField::textarea("assetReturns", "Asset Returns (%)", "2, -1, 3, 1.5, 2.5, ...")
            .info("Comma-separated values"),
        InputField::textarea("marketReturns", "Market Returns (%)", "1, -0.5, 2, 1, 1.5, ...")
            .info("Comma-separated values"),
        InputField::number("period", "Rolling Period", "30"),
    ],
    compute: Compute::Pure(rolling_regression_beta),
};

fn rolling_regression_beta(i: &Inputs) -> Outcome {
    let asset = i.series("assetReturns");
    let market = i.series("marketReturns");
    let period = i.count("period")?;
    ensure(asset.len() == market.len(), "Series must have the same length.")?;
    ensure(period > 0, "Period must be positive.")?;
    ensure(
        asset.len() >= period,
        &format!("Not enough data for period {period}."),
    )?;

    let points: Vec<(f64, f64)> = market.into_iter().zip(asset).collect();
    let betas = rolling(&points, period, |window| linear_regression(window).slope);

    let rows = betas
        .iter()
        .enumerate()
        .map(|(idx, beta)| vec![Cell::from(period + idx), Cell::from(format_number(*beta, 3))]);
    Ok(vec![CalculationResult::table(
        format!("Rolling Beta ({period}-Period)"),
        ["Window End", "Beta"],
        rows,
    )])
}

pub const CORRELATION_MATRIX: Calculator = Calculator {
    id: "correlation-matrix-generator",
    name: "Correlation Matrix Generator",
    description: "Generate a correlation matrix for multiple asset price series.",
    category: Category::QuantitativeFinance,
    inputs: &[InputField::textarea(
        "assets",
        "Asset Price Series",
        "AssetA,10,12,15,14\nAssetB,100,105,112,110\nAssetC,50,48,52,55",
    )
    .info("One asset per line: Ticker, comma-separated prices")],
    compute: Compute::Pure(correlation_matrix),
};

struct PriceSeries<'a> {
    name: &'a str,
    prices: Vec<f64>,
}

fn parse_price_series(line: &str) -> Result<PriceSeries<'_>, CalcError> {
    let mut parts = line.split(',').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let prices = parts
        .map(parse_number)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| CalcError::malformed(format!("Invalid number in line: \"{line}\"")))?;
    Ok(PriceSeries { name, prices })
}

fn correlation_matrix(i: &Inputs) -> Outcome {
    let text = i.text("assets");
    let assets = non_blank_lines(&text)
        .map(parse_price_series)
        .collect::<Result<Vec<_>, _>>()?;
    ensure(assets.len() >= 2, "At least two assets are needed.")?;
    ensure(
        assets.iter().map(|a| a.prices.len()).all_equal(),
        "All price series must have the same length.",
    )?;

    let headers = std::iter::once("").chain(assets.iter().map(|a| a.name));
    let rows = assets.iter().map(|row| {
        std::iter::once(Cell::from(row.name))
            .chain(
                assets
                    .iter()
                    .map(|col| Cell::from(format_number(correlation(&row.prices, &col.prices), 3))),
            )
            .collect_vec()
    });
    Ok(vec![CalculationResult::table("Correlation Matrix", headers, rows)])
}

pub const MAX_DRAWDOWN_CLUSTERS: Calculator = Calculator {
    id: "max-drawdown-clusters",
    name: "Maximum Drawdown Clusters",
    description: "Identify and analyze periods of significant drawdowns in an equity curve.",
    category: Category::QuantitativeFinance,
    inputs: &[
        InputField::textarea(
            "equityValues",
            "Equity Curve Values",
            "100,110,105,120,108,100,115,125,110,95,110",
        )
        .info("Comma-separated equity values over time"),
        InputField::number("threshold", "Drawdown Threshold (%)", "5")
            .info("Minimum drawdown to be considered a cluster."),
    ],
    compute: Compute::Pure(max_drawdown_clusters),
};

/// A run of consecutive periods spent below a prior peak.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cluster {
    start: usize,
    end: usize,
    max_dd: f64,
}

/// Splits an equity curve into drawdown clusters whose depth reaches `threshold`.
///
/// A cluster opens at the first period below the running peak and closes at the
/// period before a new peak. A cluster still open at the end of the curve closes
/// on the last period.
fn drawdown_clusters(equity: &[f64], threshold: f64) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut open: Option<Cluster> = None;
    let mut peak = equity.first().copied().unwrap_or_default();

    for (idx, &value) in equity.iter().enumerate() {
        if value > peak {
            peak = value;
            if let Some(mut cluster) = open.take() {
                cluster.end = idx - 1;
                if cluster.max_dd >= threshold {
                    clusters.push(cluster);
                }
            }
        }

        let dd = (peak - value) / peak;
        match open.as_mut() {
            Some(cluster) => cluster.max_dd = cluster.max_dd.max(dd),
            None if dd > 0.0 => {
                open = Some(Cluster {
                    start: idx,
                    end: idx,
                    max_dd: dd,
                })
            }
            None => {}
        }
    }

    if let Some(mut cluster) = open {
        if cluster.max_dd >= threshold {
            cluster.end = equity.len() - 1;
            clusters.push(cluster);
        }
    }
    clusters
}

fn max_drawdown_clusters(i: &Inputs) -> Outcome {
    let equity = i.series("equityValues");
    let threshold = i.number("threshold")? / 100.0;
    ensure(equity.len() >= 2, "At least two equity points are needed.")?;

    let clusters = drawdown_clusters(&equity, threshold);
    if clusters.is_empty() {
        return Ok(vec![kv(
            "Result",
            format!(
                "No drawdown clusters found exceeding {}.",
                format_percent(threshold)
            ),
        )]);
    }

    let rows = clusters.iter().map(|c| {
        vec![
            Cell::from(c.start),
            Cell::from(c.end),
            Cell::from(c.end - c.start + 1),
            Cell::from(format_percent(c.max_dd)),
        ]
    });
    Ok(vec![CalculationResult::table(
        "Drawdown Clusters",
        ["Start Period", "End Period", "Duration", "Max Drawdown"],
        rows,
    )])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, table_of, value_of};
    use super::*;

    #[test]
    fn ar1_reverses_an_alternating_series() {
        let out = run(
            &ARIMA_FORECASTING,
            &[("prices", "100, 101, 100, 101, 100, 101, 100, 101, 100, 101"), ("periods", "2")],
        )
        .unwrap();
        let table = table_of(&out);
        assert_eq!(table.rows.len(), 2);
        // phi = -1, c = 0: the next change reverses the last one.
        assert_eq!(table.rows[0][1].to_string(), "100.0000");
    }

    #[test]
    fn ar1_requires_history() {
        let err = run(&ARIMA_FORECASTING, &[("prices", "1, 2, 3"), ("periods", "2")]).unwrap_err();
        assert_eq!(err.to_string(), "A longer historical price series is recommended.");
    }

    #[test]
    fn ar1_caps_the_forecast_horizon() {
        let prices = ("prices", "100, 101, 100, 101, 100, 101, 100, 101, 100, 101");
        let err = run(&ARIMA_FORECASTING, &[prices, ("periods", "1e300")]).unwrap_err();
        assert_eq!(err.to_string(), "\"Periods to Forecast\" must be at most 1000.");
        assert!(run(&ARIMA_FORECASTING, &[prices, ("periods", "1000")]).is_ok());
    }

    #[test]
    fn rolling_beta_of_a_scaled_series() {
        let out = run(
            &ROLLING_REGRESSION_BETA,
            &[("assetReturns", "2, -1, 4, 3"), ("marketReturns", "1, -0.5, 2, 1.5"), ("period", "3")],
        )
        .unwrap();
        let betas: Vec<String> = table_of(&out).rows.iter().map(|r| r[1].to_string()).collect();
        assert_eq!(betas, ["2.000", "2.000"]);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let out = run(
            &CORRELATION_MATRIX,
            &[("assets", "A,1,2,3,4\nB,4,3,2,1\nC,1,3,2,4")],
        )
        .unwrap();
        let table = table_of(&out);
        assert_eq!(table.headers, ["", "A", "B", "C"]);
        assert_eq!(table.rows[0][1].to_string(), "1.000");
        assert_eq!(table.rows[0][2].to_string(), "-1.000");
        assert_eq!(table.rows[1][3].to_string(), table.rows[2][2].to_string());
    }

    #[test]
    fn correlation_matrix_rejects_ragged_series() {
        let err = run(&CORRELATION_MATRIX, &[("assets", "A,1,2,3\nB,1,2")]).unwrap_err();
        assert_eq!(err.to_string(), "All price series must have the same length.");
        let err = run(&CORRELATION_MATRIX, &[("assets", "A,1,x\nB,1,2")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid number in line: \"A,1,x\"");
    }

    #[test]
    fn clusters_on_the_sample_curve() {
        let equity = [100.0, 110.0, 105.0, 120.0, 108.0, 100.0, 115.0, 125.0, 110.0, 95.0, 110.0];
        let clusters = drawdown_clusters(&equity, 0.05);
        let spans: Vec<(usize, usize)> = clusters.iter().map(|c| (c.start, c.end)).collect();
        // 110 -> 105 is under 5% and is dropped.
        assert_eq!(spans, [(4, 6), (8, 10)]);
        assert!((clusters[1].max_dd - 0.24).abs() < 1e-12);
    }

    #[test]
    fn no_clusters_message() {
        let out = run(
            &MAX_DRAWDOWN_CLUSTERS,
            &[("equityValues", "100, 101, 102"), ("threshold", "5")],
        )
        .unwrap();
        assert_eq!(
            value_of(&out, "Result"),
            "No drawdown clusters found exceeding 5.00%."
        );
    }
}
