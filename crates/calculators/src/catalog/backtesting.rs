use super::{ensure, kv};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::{Calculator, Compute, Outcome};
use analytics::{mean, std_dev};
use core_types::{format_currency, format_number, format_percent, CalculationResult, Category, Cell, InputField};
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};

pub const CALCULATORS: &[Calculator] = &[
    ANNUALIZED_RETURN,
    POSITION_HEATMAP,
    RANDOMIZED_TRADE_GENERATOR,
    SQN,
];

pub const ANNUALIZED_RETURN: Calculator = Calculator {
    id: "annualized-return-cagr-periods",
    name: "Annualized Return (from periods)",
    description: "Calculate the annualized return (geometric mean) from a series of periodic returns.",
    category: Category::Backtesting,
    inputs: &[
        InputField::textarea("returns", "Periodic Returns (%)", "10, -5, 8, 12, -2")
            .info("Comma-separated returns (e.g., monthly or quarterly)"),
        InputField::number("periodsPerYear", "Periods per Year", "12")
            .info("e.g., 12 for monthly, 4 for quarterly, 252 for daily"),
    ],
    compute: Compute::Pure(annualized_return),
};

fn annualized_return(i: &Inputs) -> Outcome {
    let growth: Vec<f64> = i.series("returns").iter().map(|r| 1.0 + r / 100.0).collect();
    let per_year = i.number("periodsPerYear")?;
    ensure(!growth.is_empty(), "No returns entered.")?;

    let geometric_mean = growth.iter().product::<f64>().powf(1.0 / growth.len() as f64);
    Ok(vec![kv(
        "Annualized Return (CAGR)",
        format_percent(geometric_mean.powf(per_year) - 1.0),
    )])
}

pub const POSITION_HEATMAP: Calculator = Calculator {
    id: "position-heatmap",
    name: "Position Heatmap",
    description: "Visualize P&L across a range of stop-loss and take-profit outcomes.",
    category: Category::Backtesting,
    inputs: &[
        InputField::number("entryPrice", "Entry Price", "100"),
        InputField::number("quantity", "Quantity", "100"),
        InputField::number("slStart", "Stop-Loss Start ($)", "98"),
        InputField::number("slEnd", "Stop-Loss End ($)", "95"),
        InputField::number("tpStart", "Take-Profit Start ($)", "102"),
        InputField::number("tpEnd", "Take-Profit End ($)", "105"),
        InputField::number("steps", "Number of Steps", "4").default_value("4"),
    ],
    compute: Compute::Pure(position_heatmap),
};

/// `steps` evenly spaced levels from `start` to `end` inclusive.
fn levels(start: f64, end: f64, steps: usize) -> Vec<f64> {
    let step = (end - start) / (steps - 1) as f64;
    (0..steps).map(|j| start + j as f64 * step).collect()
}

const MAX_HEATMAP_STEPS: usize = 100;

fn position_heatmap(i: &Inputs) -> Outcome {
    let entry = i.number("entryPrice")?;
    let quantity = i.number("quantity")?;
    let steps = i.count_at_most("steps", MAX_HEATMAP_STEPS)?;
    ensure(steps >= 2, "Number of steps must be at least 2.")?;

    let stops = levels(i.number("slStart")?, i.number("slEnd")?, steps);
    let targets = levels(i.number("tpStart")?, i.number("tpEnd")?, steps);

    let headers = std::iter::once("Stop \\ Profit".to_string())
        .chain(targets.iter().map(|tp| format_currency(*tp)));
    let rows = stops.iter().map(|sl| {
        let risk = entry - sl;
        std::iter::once(Cell::from(format_currency(*sl)))
            .chain(targets.iter().map(|tp| {
                let reward = tp - entry;
                Cell::from(format!(
                    "{} (1:{:.1})",
                    format_currency(reward * quantity),
                    reward / risk
                ))
            }))
            .collect::<Vec<_>>()
    });
    Ok(vec![CalculationResult::table(
        "P&L / Risk-Reward Heatmap",
        headers,
        rows,
    )])
}

pub const RANDOMIZED_TRADE_GENERATOR: Calculator = Calculator {
    id: "randomized-trade-generator",
    name: "Randomized Trade Generator",
    description: "Generate a random series of trades based on statistical inputs for Monte Carlo analysis.",
    category: Category::Backtesting,
    inputs: &[
        InputField::number("winRate", "Win Rate (%)", "60"),
        InputField::number("avgWin", "Average Win ($)", "200"),
        InputField::number("stdDevWin", "Std. Dev. of Wins ($)", "50"),
        InputField::number("avgLoss", "Average Loss ($)", "150"),
        InputField::number("stdDevLoss", "Std. Dev. of Losses ($)", "40"),
        InputField::number("numTrades", "Number of Trades to Generate", "50"),
    ],
    compute: Compute::Stochastic(randomized_trade_generator),
};

/// `Normal::new` accepts a negative deviation, so the sign is checked here.
fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>, CalcError> {
    ensure(std_dev >= 0.0, "Standard deviations must be non-negative numbers.")?;
    Normal::new(mean, std_dev)
        .map_err(|_| CalcError::domain("Standard deviations must be non-negative numbers."))
}

/// Draws `count` trades: wins from `wins`, losses as the negated magnitude of a `losses` draw.
fn generate_trades(
    rng: &mut dyn RngCore,
    count: usize,
    win_prob: f64,
    wins: &Normal<f64>,
    losses: &Normal<f64>,
) -> Vec<f64> {
    (0..count)
        .map(|_| {
            if rng.r#gen::<f64>() < win_prob {
                wins.sample(&mut *rng)
            } else {
                -losses.sample(&mut *rng).abs()
            }
        })
        .collect()
}

fn randomized_trade_generator(i: &Inputs, rng: &mut dyn RngCore) -> Outcome {
    let win_prob = i.number("winRate")? / 100.0;
    let wins = normal(i.number("avgWin")?, i.number("stdDevWin")?)?;
    let losses = normal(i.number("avgLoss")?, i.number("stdDevLoss")?)?;
    let count = i.count("numTrades")?;

    let trades = generate_trades(rng, count, win_prob, &wins, &losses);
    let series = trades
        .iter()
        .map(|t| format_number(*t, 2))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(vec![kv("Generated Trade P&L Series", series)])
}

pub const SQN: Calculator = Calculator {
    id: "sqn-calculator",
    name: "System Quality Number (SQN)",
    description: "Calculate Van Tharp's SQN to measure the quality of a trading system.",
    category: Category::Backtesting,
    inputs: &[InputField::textarea("trades", "Trade P&L / R-Multiples", "1.5, -1, 2.2, 3, -1, 0.8")
        .info("Enter P&L values. For best results, use 'R-multiples' where each trade's outcome is expressed as a multiple of the initial risk (e.g., a win of $300 on a $100 risk is 3R, a loss is -1R).")],
    compute: Compute::Pure(sqn),
};

fn sqn_quality(score: f64) -> &'static str {
    match score {
        s if s >= 5.0 => "Superb",
        s if s >= 3.0 => "Excellent",
        s if s >= 2.5 => "Good",
        s if s >= 2.0 => "Average",
        s if s >= 1.6 => "Below Average",
        _ => "Poor",
    }
}

fn sqn(i: &Inputs) -> Outcome {
    let trades = i.series("trades");
    ensure(
        trades.len() >= 25,
        "A minimum of 25-30 trades is recommended for a stable SQN.",
    )?;
    let sd = std_dev(&trades);
    ensure(sd != 0.0, "Standard deviation is zero.")?;

    let score = mean(&trades) / sd * (trades.len() as f64).sqrt();
    Ok(vec![
        kv("SQN Score", format_number(score, 2)),
        kv("System Quality", sqn_quality(score)),
    ])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, run_seeded, table_of, value_of};
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const GENERATOR_INPUTS: &[(&str, &str)] = &[
        ("winRate", "60"),
        ("avgWin", "200"),
        ("stdDevWin", "50"),
        ("avgLoss", "150"),
        ("stdDevLoss", "40"),
        ("numTrades", "50"),
    ];

    #[test]
    fn annualized_from_monthly_returns() {
        let out = run(&ANNUALIZED_RETURN, &[("returns", "1, 1, 1"), ("periodsPerYear", "12")]).unwrap();
        // 1.01^12 - 1
        assert_eq!(value_of(&out, "Annualized Return (CAGR)"), "12.68%");
    }

    #[test]
    fn heatmap_grid_shape_and_corner() {
        let out = run(
            &POSITION_HEATMAP,
            &[
                ("entryPrice", "100"),
                ("quantity", "100"),
                ("slStart", "98"),
                ("slEnd", "95"),
                ("tpStart", "102"),
                ("tpEnd", "105"),
            ],
        )
        .unwrap();
        let table = table_of(&out);
        assert_eq!(table.headers.len(), 5);
        assert_eq!(table.headers[0], "Stop \\ Profit");
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0][0].to_string(), "$98.00");
        assert_eq!(table.rows[0][1].to_string(), "$200.00 (1:1.0)");
        assert_eq!(table.rows[3][4].to_string(), "$500.00 (1:1.0)");
    }

    #[test]
    fn heatmap_needs_two_steps() {
        let err = run(
            &POSITION_HEATMAP,
            &[
                ("entryPrice", "100"),
                ("quantity", "100"),
                ("slStart", "98"),
                ("slEnd", "95"),
                ("tpStart", "102"),
                ("tpEnd", "105"),
                ("steps", "1"),
            ],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Number of steps must be at least 2.");
    }

    #[test]
    fn heatmap_grid_is_bounded() {
        let err = run(
            &POSITION_HEATMAP,
            &[
                ("entryPrice", "100"),
                ("quantity", "100"),
                ("slStart", "98"),
                ("slEnd", "95"),
                ("tpStart", "102"),
                ("tpEnd", "105"),
                ("steps", "101"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CalcError::Domain(_)), "{err:?}");
    }

    #[test]
    fn trade_count_is_bounded() {
        let mut inputs = GENERATOR_INPUTS.to_vec();
        inputs[5] = ("numTrades", "1e9");
        let err = run(&RANDOMIZED_TRADE_GENERATOR, &inputs).unwrap_err();
        assert_eq!(err.to_string(), "\"Number of Trades to Generate\" must be at most 1000000.");
    }

    #[test]
    fn generator_emits_the_requested_count() {
        let out = run(&RANDOMIZED_TRADE_GENERATOR, GENERATOR_INPUTS).unwrap();
        let series = value_of(&out, "Generated Trade P&L Series");
        assert_eq!(series.split(", ").count(), 50);
        assert_eq!(out, run(&RANDOMIZED_TRADE_GENERATOR, GENERATOR_INPUTS).unwrap());
        assert_ne!(out, run_seeded(&RANDOMIZED_TRADE_GENERATOR, GENERATOR_INPUTS, 8).unwrap());
    }

    #[test]
    fn generated_trades_follow_their_distribution() {
        let wins = Normal::new(200.0, 50.0).unwrap();
        let losses = Normal::new(150.0, 40.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let trades = generate_trades(&mut rng, 5_000, 0.6, &wins, &losses);

        let winners: Vec<f64> = trades.iter().copied().filter(|t| *t > 0.0).collect();
        let losers: Vec<f64> = trades.iter().copied().filter(|t| *t <= 0.0).collect();
        let win_share = winners.len() as f64 / trades.len() as f64;
        assert!((0.57..0.63).contains(&win_share), "win share {win_share}");
        assert!((190.0..210.0).contains(&mean(&winners)));
        assert!((-160.0..-140.0).contains(&mean(&losers)));
    }

    #[test]
    fn negative_spread_is_rejected() {
        let mut inputs = GENERATOR_INPUTS.to_vec();
        inputs[2] = ("stdDevWin", "-5");
        let err = run(&RANDOMIZED_TRADE_GENERATOR, &inputs).unwrap_err();
        assert_eq!(err.to_string(), "Standard deviations must be non-negative numbers.");
    }

    #[test]
    fn sqn_bands() {
        assert_eq!(sqn_quality(1.0), "Poor");
        assert_eq!(sqn_quality(1.6), "Below Average");
        assert_eq!(sqn_quality(2.7), "Good");
        assert_eq!(sqn_quality(6.0), "Superb");

        let err = run(&SQN, &[("trades", "1, -1, 2")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "A minimum of 25-30 trades is recommended for a stable SQN."
        );
    }
}
