//! Calculators that reason about a strategy as a whole rather than a single trade.

use super::{ensure, kv, max_of, min_of};
use crate::input::Inputs;
use crate::{Calculator, Compute, Outcome};
use analytics::{mean, sum};
use core_types::{
    format_currency, format_number, format_percent, CalculationResult, Category, Cell, InputField,
};
use rand::{Rng, RngCore};

pub const CALCULATORS: &[Calculator] = &[
    TRADE_OUTCOME_SIMULATOR,
    MULTI_TRADE_ANALYZER,
    STATISTICAL_EDGE,
    PROFIT_DISTRIBUTION,
];

pub const TRADE_OUTCOME_SIMULATOR: Calculator = Calculator {
    id: "trade-outcome-simulator",
    name: "Trade Outcome Simulator (Monte Carlo)",
    description: "Simulate potential equity curves based on your trading strategy inputs.",
    category: Category::Meta,
    inputs: &[
        InputField::number("initialCapital", "Initial Capital", "10000"),
        InputField::number("winRate", "Win Rate (%)", "55"),
        InputField::number("avgWin", "Average Win ($)", "250"),
        InputField::number("avgLoss", "Average Loss ($)", "150"),
        InputField::number("numTrades", "Number of Trades", "100"),
        InputField::number("numSims", "Number of Simulations", "20").default_value("20"),
    ],
    compute: Compute::Stochastic(trade_outcome_simulator),
};

const MAX_SIMULATIONS: usize = 10_000;
const MAX_SIMULATED_TRADES: usize = 10_000;

fn trade_outcome_simulator(i: &Inputs, rng: &mut dyn RngCore) -> Outcome {
    let initial = i.number("initialCapital")?;
    let p_win = i.number("winRate")? / 100.0;
    let avg_win = i.number("avgWin")?;
    let avg_loss = i.number("avgLoss")?;
    let trades = i.count_at_most("numTrades", MAX_SIMULATED_TRADES)?;
    let sims = i.count_at_most("numSims", MAX_SIMULATIONS)?;
    ensure(sims > 0, "Number of simulations must be positive.")?;

    let finals: Vec<f64> = (0..sims)
        .map(|_| {
            let mut equity = initial;
            for _ in 0..trades {
                if rng.r#gen::<f64>() < p_win {
                    equity += avg_win;
                } else {
                    equity -= avg_loss;
                }
                // A blown account stops trading.
                if equity <= 0.0 {
                    return 0.0;
                }
            }
            equity
        })
        .collect();

    let share = |pred: &dyn Fn(f64) -> bool| {
        finals.iter().filter(|e| pred(**e)).count() as f64 / sims as f64
    };
    Ok(vec![
        kv("Average Final Equity", format_currency(mean(&finals))),
        kv("Best Case Equity", format_currency(max_of(&finals))),
        kv("Worst Case Equity", format_currency(min_of(&finals))),
        kv("Probability of Profit", format_percent(share(&|e| e > initial))),
        kv("Probability of Loss", format_percent(share(&|e| e < initial))),
    ])
}

pub const MULTI_TRADE_ANALYZER: Calculator = Calculator {
    id: "multi-trade-analyzer",
    name: "Multi-Trade Batch Analyzer",
    description: "Analyze a series of trades to get key performance statistics.",
    category: Category::Meta,
    inputs: &[InputField::textarea("trades", "Trade P&L", "150, -50, 200, 300, -75, 120")
        .info("Comma-separated P&L for each trade")],
    compute: Compute::Pure(multi_trade_analyzer),
};

fn multi_trade_analyzer(i: &Inputs) -> Outcome {
    let trades = i.series("trades");
    ensure(!trades.is_empty(), "No trades entered.")?;

    let (wins, losses): (Vec<f64>, Vec<f64>) = trades
        .iter()
        .filter(|t| **t != 0.0)
        .partition(|t| **t > 0.0);
    let win_rate = wins.len() as f64 / trades.len() as f64;
    let avg_win = mean(&wins);
    let avg_loss = mean(&losses).abs();
    let profit_factor = if avg_loss == 0.0 {
        f64::INFINITY
    } else {
        sum(&wins) / sum(&losses).abs()
    };
    let expectancy = win_rate * avg_win - (1.0 - win_rate) * avg_loss;

    Ok(vec![
        kv("Total Net P&L", format_currency(sum(&trades))),
        kv("Profit Factor", format_number(profit_factor, 2)),
        kv("Win Rate", format_percent(win_rate)),
        kv("Expectancy per Trade", format_currency(expectancy)),
        kv("Average Win", format_currency(avg_win)),
        kv("Average Loss", format_currency(avg_loss)),
    ])
}

pub const STATISTICAL_EDGE: Calculator = Calculator {
    id: "statistical-edge",
    name: "Statistical Edge (Expectancy)",
    description: "Calculate the expectancy of your trading strategy to determine its long-term viability.",
    category: Category::Meta,
    inputs: &[
        InputField::number("winRate", "Win Rate (%)", "60"),
        InputField::number("avgWin", "Average Win ($)", "500"),
        InputField::number("lossRate", "Loss Rate (%)", "40"),
        InputField::number("avgLoss", "Average Loss ($)", "300"),
    ],
    compute: Compute::Pure(statistical_edge),
};

fn statistical_edge(i: &Inputs) -> Outcome {
    let win_rate = i.number("winRate")?;
    let loss_rate = i.number("lossRate")?;
    ensure(
        (win_rate + loss_rate - 100.0).abs() < 1e-9,
        "Win Rate and Loss Rate must sum to 100%.",
    )?;

    let expectancy = win_rate / 100.0 * i.number("avgWin")? - loss_rate / 100.0 * i.number("avgLoss")?;
    let edge = if expectancy > 0.0 {
        "Positive Edge (Favorable)"
    } else {
        "Negative Edge (Unfavorable)"
    };
    Ok(vec![
        kv("Expectancy per Trade", format_currency(expectancy)),
        kv("Edge", edge),
    ])
}

pub const PROFIT_DISTRIBUTION: Calculator = Calculator {
    id: "profit-distribution-visualizer",
    name: "Profit Distribution Visualizer",
    description: "Analyze and visualize the distribution of profits and losses from a series of trades.",
    category: Category::Meta,
    inputs: &[
        InputField::textarea(
            "trades",
            "Trade P&L Series",
            "150, -50, 200, 300, -75, 120, 80, -90, 220, -110",
        )
        .info("Comma-separated P&L for each trade"),
        InputField::number("bins", "Number of Bins", "5").default_value("5"),
    ],
    compute: Compute::Pure(profit_distribution),
};

fn profit_distribution(i: &Inputs) -> Outcome {
    let trades = i.series("trades");
    let bin_count = i.count("bins")?;
    ensure(trades.len() >= 2, "At least two trades are needed for a distribution.")?;
    ensure(bin_count > 0, "Number of bins must be positive.")?;

    let (low, high) = (min_of(&trades), max_of(&trades));
    ensure(
        low != high,
        "All trades have the same P&L; a distribution cannot be formed.",
    )?;

    let width = (high - low) / bin_count as f64;
    let mut bins = vec![0usize; bin_count];
    for trade in &trades {
        // The maximum lands exactly on the upper edge and belongs to the last bin.
        let idx = (((trade - low) / width).floor() as usize).min(bin_count - 1);
        bins[idx] += 1;
    }

    let rows = bins.iter().enumerate().map(|(idx, &count)| {
        let start = low + idx as f64 * width;
        let share = count as f64 / trades.len() as f64 * 100.0;
        vec![
            Cell::from(format!(
                "{} to {}",
                format_currency(start),
                format_currency(start + width)
            )),
            Cell::from(count),
            Cell::from(format!("{}%", format_number(share, 1))),
        ]
    });

    Ok(vec![CalculationResult::table(
        "Profit/Loss Distribution",
        ["P&L Range", "Frequency", "Percentage"],
        rows,
    )])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, run_seeded, table_of, value_of};
    use super::*;

    const SIM_INPUTS: &[(&str, &str)] = &[
        ("initialCapital", "10000"),
        ("winRate", "55"),
        ("avgWin", "250"),
        ("avgLoss", "150"),
        ("numTrades", "100"),
    ];

    #[test]
    fn simulator_is_reproducible_for_a_seed() {
        let a = run_seeded(&TRADE_OUTCOME_SIMULATOR, SIM_INPUTS, 42).unwrap();
        let b = run_seeded(&TRADE_OUTCOME_SIMULATOR, SIM_INPUTS, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn simulator_outcomes_stay_in_reachable_range() {
        let out = run(&TRADE_OUTCOME_SIMULATOR, SIM_INPUTS).unwrap();
        let parse = |label: &str| -> f64 {
            value_of(&out, label)
                .trim_start_matches('$')
                .replace(',', "")
                .parse()
                .unwrap()
        };
        // 100 trades can move equity by at most +25,000 or -15,000.
        let best = parse("Best Case Equity");
        let worst = parse("Worst Case Equity");
        let average = parse("Average Final Equity");
        assert!(best <= 35_000.0);
        assert!(worst >= 0.0);
        assert!(worst <= average && average <= best);
        // Expectancy is +47.5 per trade, so the typical path ends well in profit.
        assert!(average > 10_000.0);
    }

    #[test]
    fn certain_outcomes_are_deterministic() {
        let mut inputs = SIM_INPUTS.to_vec();
        inputs[1] = ("winRate", "100");
        let out = run(&TRADE_OUTCOME_SIMULATOR, &inputs).unwrap();
        assert_eq!(value_of(&out, "Worst Case Equity"), "$35,000.00");
        assert_eq!(value_of(&out, "Probability of Profit"), "100.00%");

        inputs[1] = ("winRate", "0");
        let out = run(&TRADE_OUTCOME_SIMULATOR, &inputs).unwrap();
        assert_eq!(value_of(&out, "Best Case Equity"), "$0.00");
        assert_eq!(value_of(&out, "Probability of Loss"), "100.00%");
    }

    #[test]
    fn simulation_size_is_bounded() {
        let mut inputs = SIM_INPUTS.to_vec();
        inputs.push(("numSims", "1e12"));
        let err = run(&TRADE_OUTCOME_SIMULATOR, &inputs).unwrap_err();
        assert_eq!(err.to_string(), "\"Number of Simulations\" must be at most 10000.");

        inputs[4] = ("numTrades", "10001");
        inputs[5] = ("numSims", "20");
        let err = run(&TRADE_OUTCOME_SIMULATOR, &inputs).unwrap_err();
        assert_eq!(err.to_string(), "\"Number of Trades\" must be at most 10000.");
    }

    #[test]
    fn batch_statistics() {
        let out = run(&MULTI_TRADE_ANALYZER, &[("trades", "100, -50, 200, -50")]).unwrap();
        assert_eq!(value_of(&out, "Total Net P&L"), "$200.00");
        assert_eq!(value_of(&out, "Profit Factor"), "3.00");
        assert_eq!(value_of(&out, "Win Rate"), "50.00%");
        assert_eq!(value_of(&out, "Expectancy per Trade"), "$50.00");

        let out = run(&MULTI_TRADE_ANALYZER, &[("trades", "10, 20")]).unwrap();
        assert_eq!(value_of(&out, "Profit Factor"), "∞");
    }

    #[test]
    fn edge_requires_complementary_rates() {
        let out = run(
            &STATISTICAL_EDGE,
            &[("winRate", "60"), ("avgWin", "500"), ("lossRate", "40"), ("avgLoss", "300")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Expectancy per Trade"), "$180.00");
        assert_eq!(value_of(&out, "Edge"), "Positive Edge (Favorable)");

        let err = run(
            &STATISTICAL_EDGE,
            &[("winRate", "60"), ("avgWin", "500"), ("lossRate", "30"), ("avgLoss", "300")],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Win Rate and Loss Rate must sum to 100%.");
    }

    #[test]
    fn distribution_bins_cover_every_trade() {
        let out = run(&PROFIT_DISTRIBUTION, &[("trades", "-100, 0, 100, 200, 300"), ("bins", "4")]).unwrap();
        let table = table_of(&out);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0][0].to_string(), "-$100.00 to $0.00");
        let counts: Vec<String> = table.rows.iter().map(|r| r[1].to_string()).collect();
        assert_eq!(counts, ["1", "1", "1", "2"]);

        let err = run(&PROFIT_DISTRIBUTION, &[("trades", "5, 5, 5")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "All trades have the same P&L; a distribution cannot be formed."
        );
    }
}
