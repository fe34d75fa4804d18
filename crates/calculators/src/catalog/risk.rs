use super::{ensure, kv};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::parse::{parse_number, parse_rows};
use crate::{Calculator, Compute, Outcome};
use analytics::{mean, percentile};
use core_types::{
    format_currency, format_number, format_percent, CalculationResult, Category, Cell, InputField,
};

pub const CALCULATORS: &[Calculator] = &[
    POSITION_SIZE,
    RISK_REWARD_RATIO,
    STOP_LOSS_TAKE_PROFIT,
    DRAWDOWN,
    MARGIN,
    TRAILING_STOP,
    VAR_CVAR,
    KELLY_FRACTION,
    WIN_PROBABILITY,
    RISK_OF_RUIN,
    OPTIMAL_STOP_LOSS_ATR,
    MAX_DRAWDOWN_RECOVERY,
    HEDGE_POSITION,
    PORTFOLIO_RISK_PARITY,
    EQUITY_CURVE_SIMULATOR,
    EQUITY_CURVE_DRAWDOWN_DISTRIBUTION,
];

pub const DRAWDOWN: Calculator = Calculator {
    id: "drawdown",
    name: "Drawdown",
    description: "Calculate the percentage decline from a portfolio's peak to its trough.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("peakValue", "Peak Portfolio Value", "120000"),
        InputField::number("troughValue", "Trough Portfolio Value", "95000"),
    ],
    compute: Compute::Pure(drawdown),
};

fn drawdown(i: &Inputs) -> Outcome {
    let peak = i.number("peakValue")?;
    let trough = i.number("troughValue")?;
    ensure(peak > 0.0, "Peak value must be positive.")?;
    ensure(trough <= peak, "Trough value cannot be greater than peak value.")?;

    Ok(vec![
        kv("Absolute Drawdown", format_currency(peak - trough)),
        kv("Maximum Drawdown", format_percent((peak - trough) / peak)),
    ])
}

pub const EQUITY_CURVE_DRAWDOWN_DISTRIBUTION: Calculator = Calculator {
    id: "equity-curve-drawdown-distribution",
    name: "Equity Curve Drawdown Distribution",
    description: "Analyze the frequency and magnitude of drawdowns in an equity curve.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::textarea(
            "equityValues",
            "Equity Curve Values",
            "10000, 10100, 10050, 10200, 10300, 9800, 10500",
        )
        .info("Comma-separated equity values over time"),
        InputField::number("bins", "Number of Bins", "5").default_value("5"),
    ],
    compute: Compute::Pure(drawdown_distribution),
};

fn drawdown_distribution(i: &Inputs) -> Outcome {
    let curve = i.series("equityValues");
    let bin_count = i.count("bins")?;
    ensure(curve.len() >= 2, "At least two equity points are needed.")?;
    ensure(bin_count >= 1, "Number of bins must be at least 1.")?;

    let mut peak = curve[0];
    let mut drawdowns = Vec::new();
    for &value in &curve[1..] {
        peak = peak.max(value);
        let dd = (peak - value) / peak;
        if dd > 0.0 {
            drawdowns.push(dd);
        }
    }

    let max_dd = drawdowns.iter().copied().fold(0.0, f64::max);
    if max_dd == 0.0 {
        return Ok(vec![kv("Result", "No drawdowns occurred in this equity curve.")]);
    }

    let width = max_dd / bin_count as f64;
    let mut bins = vec![0usize; bin_count];
    for dd in drawdowns {
        let idx = ((dd / width).floor() as usize).min(bin_count - 1);
        bins[idx] += 1;
    }

    let rows = bins.iter().enumerate().map(|(idx, &count)| {
        let start = idx as f64 * width;
        let share = count as f64 / curve.len() as f64 * 100.0;
        vec![
            Cell::from(format!(
                "{} - {}",
                format_percent(start),
                format_percent(start + width)
            )),
            Cell::from(count),
            Cell::from(format!("{}%", format_number(share, 1))),
        ]
    });

    Ok(vec![CalculationResult::table(
        "Drawdown Distribution",
        ["Drawdown Range", "Frequency", "Percentage of Time"],
        rows,
    )])
}

pub const EQUITY_CURVE_SIMULATOR: Calculator = Calculator {
    id: "equity-curve-simulator",
    name: "Equity Curve Simulator",
    description: "Simulate and analyze an equity curve based on a series of trade P&Ls.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("initialCapital", "Initial Capital", "10000"),
        InputField::textarea("trades", "Trade P&L Series", "250, -100, 300, -150, 400")
            .info("Comma-separated P&L for each trade"),
    ],
    compute: Compute::Pure(equity_curve_simulator),
};

fn equity_curve_simulator(i: &Inputs) -> Outcome {
    let initial = i.number("initialCapital")?;
    let trades = i.series("trades");
    ensure(!trades.is_empty(), "No trades entered.")?;

    let mut curve = Vec::with_capacity(trades.len() + 1);
    curve.push(initial);
    let mut equity = initial;
    let mut peak = initial;
    let mut max_dd: f64 = 0.0;
    for pnl in trades {
        equity += pnl;
        curve.push(equity);
        peak = peak.max(equity);
        max_dd = max_dd.max((peak - equity) / peak);
    }

    let rows = curve
        .iter()
        .enumerate()
        .map(|(n, &value)| vec![Cell::from(n), Cell::from(format_currency(value))]);

    Ok(vec![
        kv("Final Equity", format_currency(equity)),
        kv("Total P&L", format_currency(equity - initial)),
        kv("Peak Equity", format_currency(peak)),
        kv("Maximum Drawdown", format_percent(max_dd)),
        CalculationResult::table("Equity Curve Progression", ["Trade #", "Equity Value"], rows),
    ])
}

pub const HEDGE_POSITION: Calculator = Calculator {
    id: "hedge-position",
    name: "Hedge Position",
    description: "Calculate the size of a hedge position needed to neutralize delta.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("primaryPositionValue", "Primary Position Value", "100000"),
        InputField::number("primaryPositionDelta", "Primary Position Delta", "1")
            .info("For stocks, delta is 1"),
        InputField::number("hedgeInstrumentPrice", "Hedge Instrument Price", "350"),
        InputField::number("hedgeInstrumentDelta", "Hedge Instrument Delta", "-0.5")
            .info("e.g., delta of a put option"),
    ],
    compute: Compute::Pure(hedge_position),
};

fn hedge_position(i: &Inputs) -> Outcome {
    let value = i.number("primaryPositionValue")?;
    let delta = i.number("primaryPositionDelta")?;
    let hedge_price = i.number("hedgeInstrumentPrice")?;
    let hedge_delta = i.number("hedgeInstrumentDelta")?;
    ensure(hedge_delta != 0.0, "Hedge instrument delta cannot be zero.")?;

    let units = -(value * delta) / (hedge_price * hedge_delta);
    Ok(vec![kv("Units of Hedge Instrument Needed", format_number(units, 4))])
}

pub const KELLY_FRACTION: Calculator = Calculator {
    id: "kelly-fraction",
    name: "Kelly Criterion (Fractional)",
    description: "Determine the optimal position size, with an option for fractional Kelly betting.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("winProb", "Win Probability (%)", "60"),
        InputField::number("winLossRatio", "Win/Loss Ratio", "1.5")
            .info("Ratio of amount won to amount lost"),
        InputField::number("fraction", "Kelly Fraction", "0.5")
            .default_value("1")
            .info("e.g., 0.5 for half-Kelly"),
    ],
    compute: Compute::Pure(kelly_fraction),
};

fn kelly_fraction(i: &Inputs) -> Outcome {
    let p = i.number("winProb")? / 100.0;
    let b = i.number("winLossRatio")?;
    let fraction = i.number("fraction")?;
    ensure(b > 0.0, "Win/Loss ratio must be positive.")?;
    ensure(fraction > 0.0 && fraction <= 1.0, "Fraction must be between 0 and 1.")?;

    let kelly = ((p * b - (1.0 - p)) / b).max(0.0);
    Ok(vec![
        kv("Full Kelly Percentage", format_percent(kelly)),
        kv(
            format!("Fractional Kelly ({}%)", fraction * 100.0),
            format_percent(kelly * fraction),
        ),
    ])
}

pub const MARGIN: Calculator = Calculator {
    id: "margin",
    name: "Margin",
    description: "Calculate the amount of margin required to open a leveraged position.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("positionValue", "Total Position Value", "10000"),
        InputField::number("marginRequirement", "Margin Requirement (%)", "5"),
    ],
    compute: Compute::Pure(margin),
};

fn margin(i: &Inputs) -> Outcome {
    let required = i.number("positionValue")? * (i.number("marginRequirement")? / 100.0);
    Ok(vec![kv("Required Margin", format_currency(required))])
}

pub const MAX_DRAWDOWN_RECOVERY: Calculator = Calculator {
    id: "max-drawdown-recovery",
    name: "Max Drawdown Recovery Time",
    description: "Estimate the time needed to recover from a maximum drawdown.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("maxDrawdown", "Maximum Drawdown (%)", "25"),
        InputField::number("annualReturn", "Expected Annual Return (%)", "15"),
    ],
    compute: Compute::Pure(max_drawdown_recovery),
};

fn max_drawdown_recovery(i: &Inputs) -> Outcome {
    let dd = i.number("maxDrawdown")? / 100.0;
    let r = i.number("annualReturn")? / 100.0;
    ensure(r > 0.0, "Annual return must be positive to recover.")?;

    let gain_needed = dd / (1.0 - dd);
    let years = (1.0 / (1.0 - dd)).ln() / (1.0 + r).ln();
    Ok(vec![
        kv("Gain Needed to Recover", format_percent(gain_needed)),
        kv("Estimated Years to Recover", format_number(years, 2)),
    ])
}

pub const OPTIMAL_STOP_LOSS_ATR: Calculator = Calculator {
    id: "optimal-stop-loss-atr",
    name: "Optimal Stop-Loss (ATR)",
    description: "Calculate a volatility-based stop-loss using the Average True Range (ATR).",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("entryPrice", "Entry Price", "100"),
        InputField::number("atr", "Current ATR Value", "2.5"),
        InputField::number("multiplier", "ATR Multiplier", "2"),
    ],
    compute: Compute::Pure(optimal_stop_loss_atr),
};

fn optimal_stop_loss_atr(i: &Inputs) -> Outcome {
    let entry = i.number("entryPrice")?;
    let distance = i.number("atr")? * i.number("multiplier")?;
    Ok(vec![
        kv("Stop-Loss for Long Trade", format_currency(entry - distance)),
        kv("Stop-Loss for Short Trade", format_currency(entry + distance)),
    ])
}

pub const PORTFOLIO_RISK_PARITY: Calculator = Calculator {
    id: "portfolio-risk-parity",
    name: "Portfolio Risk Parity",
    description: "Allocate capital based on inverse volatility to equalize risk contribution.",
    category: Category::RiskManagement,
    inputs: &[InputField::textarea("assets", "Assets (Ticker,Volatility %)", "SPY,15\nAGG,5\nGLD,18")
        .info("One asset per line: Ticker, Annualized Volatility %")],
    compute: Compute::Pure(portfolio_risk_parity),
};

fn portfolio_risk_parity(i: &Inputs) -> Outcome {
    let text = i.text("assets");
    let rows = parse_rows(&text, 2)?;
    ensure(!rows.is_empty(), "No assets entered.")?;

    let mut assets = Vec::with_capacity(rows.len());
    for row in &rows {
        let vol = parse_number(row[1])
            .ok_or_else(|| CalcError::malformed(format!("Invalid format: {}", row.join(","))))?;
        ensure(vol > 0.0, "Volatility must be positive.")?;
        assets.push((row[0], vol / 100.0));
    }
    let total_inverse: f64 = assets.iter().map(|(_, vol)| 1.0 / vol).sum();

    let table = assets.iter().map(|&(ticker, vol)| {
        vec![
            Cell::from(ticker),
            Cell::from(format_percent(vol)),
            Cell::from(format_percent((1.0 / vol) / total_inverse)),
        ]
    });
    Ok(vec![CalculationResult::table(
        "Risk Parity Allocation",
        ["Ticker", "Volatility", "Weight"],
        table,
    )])
}

pub const POSITION_SIZE: Calculator = Calculator {
    id: "position-size",
    name: "Position Size",
    description: "Determine the appropriate number of shares to buy based on your risk tolerance.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("accountValue", "Account Value", "25000"),
        InputField::number("riskPercentage", "Risk per Trade (%)", "2"),
        InputField::number("entryPrice", "Entry Price", "50.00"),
        InputField::number("stopLossPrice", "Stop-Loss Price", "48.50"),
    ],
    compute: Compute::Pure(position_size),
};

fn position_size(i: &Inputs) -> Outcome {
    // --- 1. Validation ---
    let entry = i.number("entryPrice")?;
    let risk_amount = i.number("accountValue")? * (i.number("riskPercentage")? / 100.0);
    let risk_per_share = entry - i.number("stopLossPrice")?;
    ensure(
        risk_per_share > 0.0,
        "Stop-Loss Price must be less than Entry Price for a long trade.",
    )?;

    // --- 2. Sizing ---
    let shares = risk_amount / risk_per_share;
    Ok(vec![
        kv("Max Risk Amount", format_currency(risk_amount)),
        kv("Position Size (Shares)", format_number(shares, 2)),
        kv("Position Value", format_currency(shares * entry)),
    ])
}

pub const RISK_OF_RUIN: Calculator = Calculator {
    id: "risk-of-ruin",
    name: "Risk of Ruin",
    description: "Calculate the probability of losing a specified percentage of your capital.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("winRate", "Win Rate (%)", "55"),
        InputField::number("avgWin", "Average Win ($)", "200"),
        InputField::number("avgLoss", "Average Loss ($)", "150"),
        InputField::number("riskPerTrade", "Risk per Trade (%)", "2"),
        InputField::number("ruinLevel", "Ruin Level (% of Capital)", "20"),
    ],
    compute: Compute::Pure(risk_of_ruin),
};

fn risk_of_ruin(i: &Inputs) -> Outcome {
    let p = i.number("winRate")? / 100.0;
    let avg_win = i.number("avgWin")?;
    let avg_loss = i.number("avgLoss")?;
    let risk = i.number("riskPerTrade")? / 100.0;
    let ruin_level = i.number("ruinLevel")?;

    let expectancy = p * avg_win - (1.0 - p) * avg_loss;
    if expectancy <= 0.0 {
        return Ok(vec![kv("Risk of Ruin", "100% (Negative Expectancy)")]);
    }

    let z = (ruin_level / 100.0 / risk) * (2.0 * expectancy / (avg_win + avg_loss));
    Ok(vec![kv(
        format!("Risk of Ruin ({ruin_level}%)"),
        format_percent((-z).exp()),
    )])
}

pub const RISK_REWARD_RATIO: Calculator = Calculator {
    id: "risk-reward-ratio",
    name: "Risk-Reward Ratio",
    description: "Calculate the ratio of potential profit to potential loss for a trade.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("entryPrice", "Entry Price", "150.00"),
        InputField::number("takeProfitPrice", "Take-Profit Price", "165.00"),
        InputField::number("stopLossPrice", "Stop-Loss Price", "145.00"),
    ],
    compute: Compute::Pure(risk_reward_ratio),
};

fn risk_reward_ratio(i: &Inputs) -> Outcome {
    let entry = i.number("entryPrice")?;
    let profit = i.number("takeProfitPrice")? - entry;
    let loss = entry - i.number("stopLossPrice")?;
    ensure(
        profit > 0.0 && loss > 0.0,
        "Invalid price levels. Ensure Take-Profit > Entry > Stop-Loss for a long trade.",
    )?;
    Ok(vec![kv(
        "Risk-Reward Ratio",
        format!("1 : {}", format_number(profit / loss, 2)),
    )])
}

pub const STOP_LOSS_TAKE_PROFIT: Calculator = Calculator {
    id: "stop-loss-take-profit",
    name: "Stop-Loss & Take-Profit",
    description: "Calculate SL/TP price levels based on percentage, price, or risk-reward.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("entryPrice", "Entry Price", "100"),
        InputField::number("riskRewardRatio", "Risk-Reward Ratio (for TP)", "3")
            .info("e.g., 3 means 1:3 risk-reward"),
        InputField::number("stopLossAmount", "Stop Loss Amount ($)", "5"),
    ],
    compute: Compute::Pure(stop_loss_take_profit),
};

fn stop_loss_take_profit(i: &Inputs) -> Outcome {
    let entry = i.number("entryPrice")?;
    let ratio = i.number("riskRewardRatio")?;
    let stop = i.number("stopLossAmount")?;
    Ok(vec![
        kv("Long Trade Stop-Loss", format_currency(entry - stop)),
        kv("Long Trade Take-Profit", format_currency(entry + stop * ratio)),
        kv("Short Trade Stop-Loss", format_currency(entry + stop)),
        kv("Short Trade Take-Profit", format_currency(entry - stop * ratio)),
    ])
}

pub const TRAILING_STOP: Calculator = Calculator {
    id: "trailing-stop",
    name: "Trailing Stop",
    description: "Calculate trailing stop-loss price based on a percentage or fixed amount.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::number("entryPrice", "Entry Price", "100"),
        InputField::number("currentPrice", "Current Highest Price (for Long)", "110"),
        InputField::number("trailingAmount", "Trailing Amount ($)", "5").default_value(""),
        InputField::number("trailingPercent", "Trailing Percentage (%)", "5").default_value(""),
    ],
    compute: Compute::Pure(trailing_stop),
};

fn trailing_stop(i: &Inputs) -> Outcome {
    let current = i.number("currentPrice")?;
    let amount = i.number_or("trailingAmount", 0.0)?;
    let percent = i.number_or("trailingPercent", 0.0)?;
    ensure(
        amount != 0.0 || percent != 0.0,
        "Enter either a trailing amount or percentage.",
    )?;

    let mut results = Vec::new();
    if amount > 0.0 {
        results.push(kv("Stop Price (Fixed Amount)", format_currency(current - amount)));
    }
    if percent > 0.0 {
        results.push(kv(
            "Stop Price (Percentage)",
            format_currency(current * (1.0 - percent / 100.0)),
        ));
    }
    Ok(results)
}

pub const VAR_CVAR: Calculator = Calculator {
    id: "var-cvar",
    name: "Value at Risk (VaR) & CVaR",
    description: "Estimate potential portfolio loss using Historical Value at Risk and Conditional VaR.",
    category: Category::RiskManagement,
    inputs: &[
        InputField::textarea(
            "returns",
            "Historical Returns (%)",
            "1.2, -0.5, 2.1, -1.8, 0.9, -2.5, 1.5",
        )
        .info("Comma-separated daily or weekly returns"),
        InputField::number("confidence", "Confidence Level (%)", "95"),
        InputField::number("portfolioValue", "Portfolio Value", "100000"),
    ],
    compute: Compute::Pure(var_cvar),
};

fn var_cvar(i: &Inputs) -> Outcome {
    let returns = i.series("returns");
    let confidence = i.number("confidence")?;
    let portfolio = i.number("portfolioValue")?;
    ensure(
        returns.len() >= 10,
        "A larger sample of historical returns is recommended.",
    )?;
    ensure(
        (0.0..=100.0).contains(&confidence),
        "Confidence must be between 0 and 100.",
    )?;

    let var_pct = percentile(&returns, 100.0 - confidence) / 100.0;
    let tail: Vec<f64> = returns
        .iter()
        .copied()
        .filter(|r| r / 100.0 < var_pct)
        .collect();
    let cvar_pct = if tail.is_empty() {
        var_pct
    } else {
        mean(&tail) / 100.0
    };

    let describe = |pct: f64| {
        format!(
            "{} ({})",
            format_currency((pct * portfolio).abs()),
            format_percent(pct.abs())
        )
    };
    Ok(vec![
        kv(format!("VaR ({confidence}%)"), describe(var_pct)).with_info(
            "Value at Risk: The maximum expected loss over a period at a specified confidence level.",
        ),
        kv("CVaR / Expected Shortfall", describe(cvar_pct))
            .with_info("Conditional Value at Risk: The expected loss if that VaR threshold is breached."),
    ])
}

pub const WIN_PROBABILITY: Calculator = Calculator {
    id: "win-probability",
    name: "Trade Win Probability Estimator",
    description: "Estimate the historical win probability from a series of trade outcomes.",
    category: Category::RiskManagement,
    inputs: &[InputField::textarea("trades", "Trade P&L", "150, -50, 200, 300, -75, 120")
        .info("Comma-separated P&L for each trade")],
    compute: Compute::Pure(win_probability),
};

fn win_probability(i: &Inputs) -> Outcome {
    let trades = i.series("trades");
    ensure(!trades.is_empty(), "No trades entered.")?;
    let wins = trades.iter().filter(|&&t| t > 0.0).count();
    Ok(vec![
        kv("Total Trades", trades.len().to_string()),
        kv("Winning Trades", wins.to_string()),
        kv("Losing Trades", (trades.len() - wins).to_string()),
        kv(
            "Estimated Win Probability",
            format_percent(wins as f64 / trades.len() as f64),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, table_of, value_of};
    use super::*;

    #[test]
    fn drawdown_rejects_inverted_values() {
        let err = run(&DRAWDOWN, &[("peakValue", "100"), ("troughValue", "120")]).unwrap_err();
        assert_eq!(err.to_string(), "Trough value cannot be greater than peak value.");

        let ok = run(&DRAWDOWN, &[("peakValue", "120000"), ("troughValue", "95000")]).unwrap();
        assert_eq!(value_of(&ok, "Absolute Drawdown"), "$25,000.00");
        assert_eq!(value_of(&ok, "Maximum Drawdown"), "20.83%");
    }

    #[test]
    fn kelly_fraction_labels_the_fraction() {
        let out = run(
            &KELLY_FRACTION,
            &[("winProb", "60"), ("winLossRatio", "1.5"), ("fraction", "0.5")],
        )
        .unwrap();
        // (0.6 * 1.5 - 0.4) / 1.5 = 1/3
        assert_eq!(value_of(&out, "Full Kelly Percentage"), "33.33%");
        assert_eq!(value_of(&out, "Fractional Kelly (50%)"), "16.67%");
    }

    #[test]
    fn trailing_stop_needs_one_of_two_inputs() {
        let err = run(&TRAILING_STOP, &[("currentPrice", "110")]).unwrap_err();
        assert_eq!(err.to_string(), "Enter either a trailing amount or percentage.");

        let out = run(&TRAILING_STOP, &[("currentPrice", "110"), ("trailingPercent", "10")]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(value_of(&out, "Stop Price (Percentage)"), "$99.00");
    }

    #[test]
    fn risk_parity_weights_by_inverse_volatility() {
        let out = run(&PORTFOLIO_RISK_PARITY, &[("assets", "A,10\nB,20\n")]).unwrap();
        let table = table_of(&out);
        assert_eq!(table.rows[0][2], Cell::from("66.67%"));
        assert_eq!(table.rows[1][2], Cell::from("33.33%"));

        let err = run(&PORTFOLIO_RISK_PARITY, &[("assets", "A,10,3")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid format: A,10,3");
    }

    #[test]
    fn var_requires_ten_returns() {
        let err = run(
            &VAR_CVAR,
            &[("returns", "1,2,3"), ("confidence", "95"), ("portfolioValue", "1000")],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "A larger sample of historical returns is recommended.");
    }

    #[test]
    fn drawdown_distribution_counts_every_drawdown() {
        let out = run(
            &EQUITY_CURVE_DRAWDOWN_DISTRIBUTION,
            &[("equityValues", "100, 90, 95, 80, 120"), ("bins", "2")],
        )
        .unwrap();
        let table = table_of(&out);
        let total: f64 = table
            .rows
            .iter()
            .map(|row| match row[1] {
                Cell::Number(n) => n,
                _ => 0.0,
            })
            .sum();
        assert_eq!(total, 3.0);
    }
}
