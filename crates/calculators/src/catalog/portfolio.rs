use super::{checked_irr, ensure, kv};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::parse::{non_blank_lines, parse_number, parse_rows};
use crate::{Calculator, Compute, Outcome};
use analytics::{linear_regression, mean, omega_ratio, rolling, std_dev, sum};
use core_types::{
    format_currency, format_number, format_percent, CalculationResult, Category, Cell, InputField,
};
use itertools::Itertools;

pub const CALCULATORS: &[Calculator] = &[
    CAGR,
    RATIOS,
    KELLY_CRITERION,
    COMPOUND_GROWTH,
    PORTFOLIO_REBALANCING,
    WACC,
    DRIP,
    DIVERSIFICATION_SCORE,
    EQUITY_CURVE_SMOOTHNESS,
    REINVESTMENT_RATE,
    ROLLING_SHARPE_VOLATILITY,
    KELLY_VS_OPTIMAL_F,
    TWR,
    MWR,
];

pub const CAGR: Calculator = Calculator {
    id: "cagr",
    name: "CAGR",
    description: "Calculate the Compounded Annual Growth Rate of an investment.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::number("startValue", "Beginning Value", "10000"),
        InputField::number("endValue", "Ending Value", "18000"),
        InputField::number("years", "Number of Years", "5"),
    ],
    compute: Compute::Pure(cagr),
};

fn cagr(i: &Inputs) -> Outcome {
    let start = i.number("startValue")?;
    let end = i.number("endValue")?;
    let years = i.number("years")?;
    ensure(
        start > 0.0 && years > 0.0,
        "Beginning value and years must be positive.",
    )?;
    Ok(vec![kv("CAGR", format_percent((end / start).powf(1.0 / years) - 1.0))])
}

pub const RATIOS: Calculator = Calculator {
    id: "sharpe-sortino-calmar-omega-ratio",
    name: "Sharpe/Sortino/Calmar/Omega Ratios",
    description: "Measure risk-adjusted return, focusing on total, downside, and drawdown risk.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::textarea("returns", "Portfolio Returns (%)", "12, -5, 8, 15, -2, 10")
            .info("Comma-separated values for each period"),
        InputField::number("riskFreeRate", "Annual Risk-Free Rate (%)", "3"),
    ],
    compute: Compute::Pure(ratios),
};

/// Largest peak-to-trough decline of the growth curve compounded from `returns`.
fn max_drawdown_of_returns(returns: &[f64]) -> f64 {
    let mut growth = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd: f64 = 0.0;
    for r in returns {
        growth *= 1.0 + r;
        peak = peak.max(growth);
        max_dd = max_dd.max((peak - growth) / peak);
    }
    max_dd
}

fn ratios(i: &Inputs) -> Outcome {
    let returns: Vec<f64> = i.series("returns").iter().map(|r| r / 100.0).collect();
    ensure(returns.len() >= 2, "At least two return data points are needed.")?;

    let n = returns.len() as f64;
    let rf = i.number("riskFreeRate")? / 100.0 / n;
    let mean_return = mean(&returns);
    let sd = std_dev(&returns);
    let max_dd = max_drawdown_of_returns(&returns);

    let excess_over = |deviation: f64| {
        if deviation == 0.0 {
            0.0
        } else {
            (mean_return - rf) / deviation
        }
    };
    let sharpe = excess_over(sd);
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < rf).collect();
    let sortino = excess_over(std_dev(&downside));

    let annualized = (1.0 + mean_return).powf(n) - 1.0;
    let calmar = if max_dd == 0.0 { 0.0 } else { annualized / max_dd };

    Ok(vec![
        kv("Sharpe Ratio (Annualized)", format_number(sharpe * n.sqrt(), 3))
            .with_info("Measures return per unit of total risk (standard deviation). Higher is better."),
        kv("Sortino Ratio (Annualized)", format_number(sortino * n.sqrt(), 3)).with_info(
            "Similar to Sharpe, but only considers downside volatility (harmful risk). Higher is better.",
        ),
        kv("Calmar Ratio", format_number(calmar, 3))
            .with_info("Measures return per unit of maximum drawdown risk. Higher is better."),
        kv("Omega Ratio", format_number(omega_ratio(&returns, rf), 3)).with_info(
            "Captures all moments of the returns distribution by partitioning gains vs. losses. An Omega > 1 is desirable.",
        ),
        kv("Max Drawdown", format_percent(max_dd))
            .with_info("The largest peak-to-trough decline in the portfolio's value during the period."),
    ])
}

pub const KELLY_CRITERION: Calculator = Calculator {
    id: "kelly-criterion",
    name: "Kelly Criterion",
    description: "Determine the optimal size for a bet to maximize long-term growth.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::number("winProb", "Win Probability (%)", "60"),
        InputField::number("winLossRatio", "Win/Loss Ratio", "1.5").info(
            "Ratio of amount won to amount lost (e.g., 1.5 means you win $1.50 for every $1 risked)",
        ),
    ],
    compute: Compute::Pure(kelly_criterion),
};

/// Kelly fraction `(p * b - q) / b`, floored at zero.
fn kelly_fraction(p: f64, b: f64) -> f64 {
    ((p * b - (1.0 - p)) / b).max(0.0)
}

fn kelly_criterion(i: &Inputs) -> Outcome {
    let p = i.number("winProb")? / 100.0;
    let b = i.number("winLossRatio")?;
    ensure(b > 0.0, "Win/Loss ratio must be positive.")?;
    Ok(vec![kv("Kelly Percentage", format_percent(kelly_fraction(p, b)))])
}

pub const COMPOUND_GROWTH: Calculator = Calculator {
    id: "compound-growth",
    name: "Compound Account Growth",
    description: "Project the future value of an investment with regular contributions.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::number("currentSavings", "Current Principal", "10000"),
        InputField::number("monthlyContribution", "Monthly Contribution", "500"),
        InputField::number("annualReturn", "Expected Annual Return (%)", "8"),
        InputField::number("years", "Years to Grow", "10"),
    ],
    compute: Compute::Pure(compound_growth),
};

fn compound_growth(i: &Inputs) -> Outcome {
    let principal = i.number("currentSavings")?;
    let pmt = i.number("monthlyContribution")?;
    let r = i.number("annualReturn")? / 100.0 / 12.0;
    let months = i.number("years")? * 12.0;

    let contributed = principal + pmt * months;
    if r == 0.0 {
        return Ok(vec![kv("Future Value", format_currency(contributed))]);
    }

    let growth = (1.0 + r).powf(months);
    let fv = principal * growth + pmt * ((growth - 1.0) / r);
    Ok(vec![
        kv("Future Value", format_currency(fv)),
        kv("Total Principal", format_currency(contributed)),
        kv("Total Interest Earned", format_currency(fv - contributed)),
    ])
}

pub const PORTFOLIO_REBALANCING: Calculator = Calculator {
    id: "portfolio-rebalancing",
    name: "Portfolio Rebalancing",
    description: "Calculate the trades needed to return a portfolio to its target allocation.",
    category: Category::PortfolioStrategy,
    inputs: &[InputField::textarea(
        "assets",
        "Assets (Ticker,Current Value,Target %)",
        "SPY,50000,60\nAGG,30000,40\nGLD,20000,0",
    )
    .info("One asset per line: Ticker, Current Value, Target Allocation %")],
    compute: Compute::Pure(portfolio_rebalancing),
};

struct Holding<'a> {
    ticker: &'a str,
    value: f64,
    target: f64,
}

fn portfolio_rebalancing(i: &Inputs) -> Outcome {
    let text = i.text("assets");
    let holdings = parse_rows(&text, 3)?
        .into_iter()
        .map(|row| match (parse_number(row[1]), parse_number(row[2])) {
            (Some(value), Some(target)) => Ok(Holding {
                ticker: row[0],
                value,
                target: target / 100.0,
            }),
            _ => Err(CalcError::malformed(format!("Invalid format: {}", row.join(",")))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    ensure(!holdings.is_empty(), "No assets entered.")?;

    let total_value: f64 = holdings.iter().map(|h| h.value).sum();
    let total_target: f64 = holdings.iter().map(|h| h.target).sum();
    ensure(
        (total_target - 1.0).abs() <= 0.001,
        &format!(
            "Total target allocation must be 100%. Current: {}",
            format_percent(total_target)
        ),
    )?;

    let rows = holdings.iter().map(|h| {
        let target_value = total_value * h.target;
        let difference = target_value - h.value;
        vec![
            Cell::from(h.ticker),
            Cell::from(format_currency(h.value)),
            Cell::from(format_currency(target_value)),
            Cell::from(if difference > 0.0 { "BUY" } else { "SELL" }),
            Cell::from(format_currency(difference.abs())),
        ]
    });
    Ok(vec![CalculationResult::table(
        "Rebalancing Plan",
        ["Ticker", "Current Value", "Target Value", "Action", "Amount"],
        rows,
    )])
}

pub const WACC: Calculator = Calculator {
    id: "wacc",
    name: "WACC Calculator",
    description: "Calculate the Weighted Average Cost of Capital for a company.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::number("marketCap", "Market Cap of Equity (E)", "150000000"),
        InputField::number("totalDebt", "Total Debt (D)", "50000000"),
        InputField::number("costOfEquity", "Cost of Equity (Re %)", "8"),
        InputField::number("costOfDebt", "Cost of Debt (Rd %)", "5"),
        InputField::number("taxRate", "Corporate Tax Rate (%)", "21"),
    ],
    compute: Compute::Pure(wacc),
};

fn wacc(i: &Inputs) -> Outcome {
    let equity = i.number("marketCap")?;
    let debt = i.number("totalDebt")?;
    let capital = equity + debt;
    ensure(capital != 0.0, "Total capital (Market Cap + Debt) cannot be zero.")?;

    let after_tax_debt = i.number("costOfDebt")? / 100.0 * (1.0 - i.number("taxRate")? / 100.0);
    let wacc = equity / capital * (i.number("costOfEquity")? / 100.0) + debt / capital * after_tax_debt;
    Ok(vec![kv("WACC", format_percent(wacc))])
}

pub const DRIP: Calculator = Calculator {
    id: "drip",
    name: "Dividend Reinvestment (DRIP)",
    description: "Project portfolio growth with dividends automatically reinvested.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::number("initialShares", "Initial Shares", "100"),
        InputField::number("initialPrice", "Initial Share Price", "50"),
        InputField::number("dividendYield", "Annual Dividend Yield (%)", "3"),
        InputField::number("dividendFrequency", "Dividends per Year", "4"),
        InputField::number("annualGrowth", "Annual Share Price Growth (%)", "5"),
        InputField::number("years", "Years to Grow", "10"),
    ],
    compute: Compute::Pure(drip),
};

fn drip(i: &Inputs) -> Outcome {
    let initial_shares = i.number("initialShares")?;
    let initial_price = i.number("initialPrice")?;
    let dividend_yield = i.number("dividendYield")? / 100.0;
    let frequency = i.number("dividendFrequency")?;
    let annual_growth = i.number("annualGrowth")? / 100.0;
    let years = i.number("years")?;
    ensure(frequency > 0.0, "Dividends per year must be positive.")?;
    ensure(initial_price > 0.0, "Initial share price must be positive.")?;

    let periods = (years * frequency).ceil().max(0.0) as usize;
    let growth_per_period = (1.0 + annual_growth).powf(1.0 / frequency);
    let dividend_per_period = dividend_yield / frequency;

    let mut shares = initial_shares;
    let mut price = initial_price;
    for _ in 0..periods {
        // Dividends are paid at the old price and reinvested at the new one.
        let dividends = shares * price * dividend_per_period;
        price *= growth_per_period;
        shares += dividends / price;
    }

    let final_value = shares * price;
    let without_drip = initial_shares * initial_price * (1.0 + annual_growth).powf(years);
    Ok(vec![
        kv("Final Portfolio Value", format_currency(final_value)),
        kv("Total Shares", format_number(shares, 4)),
        kv("Growth vs. No DRIP", format_percent(final_value / without_drip - 1.0)),
    ])
}

pub const DIVERSIFICATION_SCORE: Calculator = Calculator {
    id: "diversification-score",
    name: "Portfolio Diversification Score",
    description: "Calculate the Herfindahl-Hirschman Index (HHI) to measure portfolio concentration.",
    category: Category::PortfolioStrategy,
    inputs: &[InputField::textarea("weights", "Asset Weights (%)", "40, 30, 15, 10, 5")
        .info("Comma-separated portfolio weights for each asset")],
    compute: Compute::Pure(diversification_score),
};

fn diversification_score(i: &Inputs) -> Outcome {
    let weights = i.series("weights");
    ensure((sum(&weights) - 100.0).abs() <= 0.1, "Weights must sum to 100%.")?;

    let hhi: f64 = weights.iter().map(|w| w * w).sum();
    let level = if hhi > 1800.0 {
        "Highly Concentrated"
    } else if hhi > 1000.0 {
        "Moderately Concentrated"
    } else {
        "Highly Diversified"
    };
    Ok(vec![
        kv("HHI Score", format_number(hhi, 0)),
        kv("Concentration Level", level),
    ])
}

pub const EQUITY_CURVE_SMOOTHNESS: Calculator = Calculator {
    id: "equity-curve-smoothness",
    name: "Equity Curve Smoothness (K-Ratio)",
    description: "Measure the consistency and smoothness of an equity curve's growth.",
    category: Category::PortfolioStrategy,
    inputs: &[InputField::textarea(
        "equityValues",
        "Equity Curve Values",
        "10000, 10100, 10050, 10200, 10300",
    )
    .info("Comma-separated equity values over time")],
    compute: Compute::Pure(equity_curve_smoothness),
};

fn equity_curve_smoothness(i: &Inputs) -> Outcome {
    let equity = i.series("equityValues");
    ensure(equity.len() >= 2, "At least two equity points are needed.")?;
    // A slope and its error both need at least two returns.
    ensure(equity.len() >= 3, "At least three equity points are needed.")?;

    let points: Vec<(f64, f64)> = equity
        .iter()
        .tuple_windows()
        .enumerate()
        .map(|(idx, (prev, next))| ((idx + 1) as f64, (next / prev).ln()))
        .collect();
    let n = points.len() as f64;
    let slope = linear_regression(&points).slope;

    // The error term is measured against a zero-intercept line.
    let residuals: f64 = points.iter().map(|(x, y)| (y - slope * x).powi(2)).sum();
    let std_err = (residuals / (n - 1.0)).sqrt();
    let k_ratio = slope / std_err * n.sqrt();
    Ok(vec![kv("K-Ratio (Smoothness)", format_number(k_ratio, 3))])
}

pub const REINVESTMENT_RATE: Calculator = Calculator {
    id: "reinvestment-rate",
    name: "Reinvestment Rate",
    description: "Calculate the rate at which a company reinvests earnings back into its business.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::number("netIncome", "Net Income", "1000000"),
        InputField::number("dividendsPaid", "Dividends Paid", "300000"),
    ],
    compute: Compute::Pure(reinvestment_rate),
};

fn reinvestment_rate(i: &Inputs) -> Outcome {
    let income = i.number("netIncome")?;
    ensure(income > 0.0, "Net income must be positive.")?;
    let rate = (income - i.number("dividendsPaid")?) / income;
    Ok(vec![kv("Reinvestment Rate", format_percent(rate))])
}

pub const ROLLING_SHARPE_VOLATILITY: Calculator = Calculator {
    id: "rolling-sharpe-volatility",
    name: "Rolling Sharpe / Volatility",
    description: "Calculate Sharpe Ratio and Volatility over a rolling window to see how they change over time.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::textarea("returns", "Portfolio Returns (%)", "12, -5, 8, 15, -2, 10, ...")
            .info("Comma-separated values for each period"),
        InputField::number("riskFreeRate", "Annual Risk-Free Rate (%)", "3"),
        InputField::number("period", "Rolling Period", "12"),
        InputField::number("periodsPerYear", "Periods per Year", "12")
            .info("e.g., 12 for monthly, 252 for daily"),
    ],
    compute: Compute::Pure(rolling_sharpe_volatility),
};

fn rolling_sharpe_volatility(i: &Inputs) -> Outcome {
    let returns: Vec<f64> = i.series("returns").iter().map(|r| r / 100.0).collect();
    let period = i.count("period")?;
    let per_year = i.number("periodsPerYear")?;
    ensure(period > 0, "Period must be positive.")?;
    ensure(per_year > 0.0, "Periods per year must be positive.")?;
    ensure(
        returns.len() >= period,
        &format!("Not enough data for period {period}."),
    )?;

    let rf = i.number("riskFreeRate")? / 100.0 / per_year;
    let scale = per_year.sqrt();
    let windows = rolling(&returns, period, |slice| {
        let sd = std_dev(slice);
        let sharpe = if sd == 0.0 {
            0.0
        } else {
            (mean(slice) - rf) / sd * scale
        };
        (sd * scale, sharpe)
    });

    let rows = windows.iter().enumerate().map(|(idx, (vol, sharpe))| {
        vec![
            Cell::from(period + idx),
            Cell::from(format_percent(*vol)),
            Cell::from(format_number(*sharpe, 2)),
        ]
    });
    Ok(vec![CalculationResult::table(
        format!("Rolling Statistics ({period}-Period)"),
        ["Window End", "Annualized Volatility", "Annualized Sharpe"],
        rows,
    )])
}

pub const KELLY_VS_OPTIMAL_F: Calculator = Calculator {
    id: "kelly-vs-optimal-f",
    name: "Kelly vs. Optimal F (Ralph Vince)",
    description: "Compare Kelly Criterion with Optimal F for position sizing.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::textarea("trades", "Trade P&L ($)", "1500, -500, 2000, 3000, -750")
            .info("Comma-separated P&L for each trade"),
        InputField::number("largestLoss", "Largest Loss ($)", "1000")
            .info("Enter as a positive number"),
    ],
    compute: Compute::Pure(kelly_vs_optimal_f),
};

/// Terminal wealth relative of trading fraction `f` of capital per unit of `largest_loss`.
///
/// `largest_loss` is negative, so each holding-period return is `1 + f * t / |loss|`.
fn terminal_wealth(trades: &[f64], f: f64, largest_loss: f64) -> f64 {
    trades
        .iter()
        .map(|t| 1.0 + f * (-t / largest_loss))
        .product()
}

fn kelly_vs_optimal_f(i: &Inputs) -> Outcome {
    let trades = i.series("trades");
    let largest_loss = -i.number("largestLoss")?;
    ensure(
        trades.len() >= 10,
        "More trade data is recommended for a stable result.",
    )?;
    ensure(
        largest_loss < 0.0,
        "Largest loss must be a negative value (user enters positive).",
    )?;

    let wins: Vec<f64> = trades.iter().copied().filter(|t| *t > 0.0).collect();
    let losses: Vec<f64> = trades.iter().copied().filter(|t| *t < 0.0).collect();
    ensure(
        !wins.is_empty() && !losses.is_empty(),
        "Trades must include both wins and losses.",
    )?;
    let win_prob = wins.len() as f64 / trades.len() as f64;
    let kelly = kelly_fraction(win_prob, mean(&wins) / mean(&losses).abs());

    // Scan f over 1%..=100% and keep the first fraction with the highest TWR.
    let (optimal_f, max_twr) = (1..=100)
        .map(|step| {
            let f = step as f64 / 100.0;
            (f, terminal_wealth(&trades, f, largest_loss))
        })
        .fold((0.0, 0.0), |best, candidate| {
            if candidate.1 > best.1 { candidate } else { best }
        });

    Ok(vec![
        kv("Kelly Criterion %", format_percent(kelly)),
        kv("Optimal F %", format_percent(optimal_f)),
        kv("Optimal F TWR", format_number(max_twr, 2)),
    ])
}

pub const TWR: Calculator = Calculator {
    id: "twr-calculator",
    name: "Time-Weighted Return (TWR)",
    description: "Calculate TWR, which measures portfolio performance independent of cash flows.",
    category: Category::PortfolioStrategy,
    inputs: &[InputField::textarea(
        "periods",
        "Period Data (Start Value, End Value)",
        "10000,11000\n11500,12000\n11800,13000",
    )
    .info("One period per line: Start Value, End Value. New lines imply cash flows between periods.")],
    compute: Compute::Pure(twr),
};

fn twr(i: &Inputs) -> Outcome {
    let text = i.text("periods");
    let mut growth = 1.0;
    let mut periods = 0usize;

    for line in non_blank_lines(&text) {
        let Some((start, end)) = line.split(',').collect_tuple() else {
            return Err(CalcError::malformed(format!(
                "Invalid format for line: \"{line}\""
            )));
        };
        match (parse_number(start.trim()), parse_number(end.trim())) {
            (Some(start), Some(end)) if start > 0.0 => {
                growth *= end / start;
                periods += 1;
            }
            _ => {
                return Err(CalcError::malformed(format!(
                    "Invalid number in line: \"{line}\""
                )));
            }
        }
    }
    ensure(periods > 0, "No periods entered.")?;

    Ok(vec![
        kv("Total Return (Geometric)", format_percent(growth - 1.0)),
        kv("Annualized TWR", format_percent(growth.powf(1.0 / periods as f64) - 1.0)),
    ])
}

pub const MWR: Calculator = Calculator {
    id: "mwr-calculator",
    name: "Money-Weighted Return (MWR)",
    description: "Calculate MWR (IRR), which measures performance including the effect of cash flows.",
    category: Category::PortfolioStrategy,
    inputs: &[
        InputField::number("initialValue", "Initial Investment", "10000"),
        InputField::textarea("cashFlows", "Cash Flows (Contribution/Withdrawal)", "500, -200, 1000")
            .info("Comma-separated values. Positive for contributions, negative for withdrawals."),
        InputField::number("finalValue", "Final Portfolio Value", "12500"),
    ],
    compute: Compute::Pure(mwr),
};

fn mwr(i: &Inputs) -> Outcome {
    // From the investor's side, contributions are outflows and the final value an inflow.
    let flows: Vec<f64> = std::iter::once(-i.number("initialValue")?)
        .chain(i.series("cashFlows").into_iter().map(|cf| -cf))
        .chain(std::iter::once(i.number("finalValue")?))
        .collect();

    // Each flow is one period apart, so the per-period IRR is already annual.
    let irr = checked_irr(&flows)?;
    Ok(vec![kv("Annualized MWR (IRR)", format_percent(irr))])
}
