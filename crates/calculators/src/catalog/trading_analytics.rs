use super::{ensure, kv, max_of, min_of, tail};
use crate::input::Inputs;
use crate::parse::parse_numeric_rows;
use crate::{Calculator, Compute, Outcome};
use analytics::{mean, std_dev};
use core_types::{format_number, format_percent, CalculationResult, Category, Cell, InputField};
use itertools::Itertools;

pub const CALCULATORS: &[Calculator] = &[
    KELTNER_CHANNEL,
    DONCHIAN_CHANNELS,
    ICHIMOKU_CLOUD,
    VCP,
    MEAN_REVERSION_SCORE,
];

pub const DONCHIAN_CHANNELS: Calculator = Calculator {
    id: "donchian-channels",
    name: "Donchian Channels",
    description: "Calculate the upper and lower bands based on the highest high and lowest low over a period.",
    category: Category::TradingAnalytics,
    inputs: &[
        InputField::textarea("highs", "High Prices", "105, 106, 105.5, 107, 106.5")
            .info("Comma-separated values"),
        InputField::textarea("lows", "Low Prices", "102, 103, 102.5, 104, 103.5")
            .info("Comma-separated values"),
        InputField::number("period", "Period", "20"),
    ],
    compute: Compute::Pure(donchian_channels),
};

fn donchian_channels(i: &Inputs) -> Outcome {
    let highs = i.series("highs");
    let lows = i.series("lows");
    let period = i.count("period")?;
    ensure(period > 0, "Period must be positive.")?;
    ensure(
        highs.len() >= period && lows.len() >= period,
        &format!("Not enough data for period {period}."),
    )?;
    ensure(
        highs.len() == lows.len(),
        "Highs and Lows series must have the same length.",
    )?;

    let upper = max_of(tail(&highs, period));
    let lower = min_of(tail(&lows, period));
    Ok(vec![
        kv("Upper Channel", format_number(upper, 2)),
        kv("Middle Line", format_number((upper + lower) / 2.0, 2)),
        kv("Lower Channel", format_number(lower, 2)),
    ])
}

pub const ICHIMOKU_CLOUD: Calculator = Calculator {
    id: "ichimoku-cloud",
    name: "Ichimoku Cloud Levels",
    description: "Calculate all five components of the Ichimoku Kinko Hyo indicator.",
    category: Category::TradingAnalytics,
    inputs: &[InputField::textarea("data", "Candle Data (High,Low)", "...")
        .info("Enter at least 52 periods of High,Low data on new lines.")],
    compute: Compute::Pure(ichimoku_cloud),
};

fn ichimoku_cloud(i: &Inputs) -> Outcome {
    let candles = parse_numeric_rows(&i.text("data"), 2)?;
    ensure(candles.len() >= 52, "At least 52 periods of data are required.")?;

    // Midpoint of the range over the last `n` candles.
    let midpoint = |n: usize| {
        let window = tail(&candles, n);
        let high = window.iter().map(|c| c[0]).fold(f64::NEG_INFINITY, f64::max);
        let low = window.iter().map(|c| c[1]).fold(f64::INFINITY, f64::min);
        (high + low) / 2.0
    };

    let tenkan = midpoint(9);
    let kijun = midpoint(26);
    let span_a = (tenkan + kijun) / 2.0;
    let span_b = midpoint(52);
    // No close is given, so the lagging span uses the candle midpoint.
    let lagging = &candles[candles.len() - 26];
    let chikou = (lagging[0] + lagging[1]) / 2.0;

    Ok(vec![
        kv("Tenkan-sen (Conversion Line)", format_number(tenkan, 4)),
        kv("Kijun-sen (Base Line)", format_number(kijun, 4)),
        kv("Senkou Span A (plotted 26 periods ahead)", format_number(span_a, 4)),
        kv("Senkou Span B (plotted 26 periods ahead)", format_number(span_b, 4)),
        kv(
            "Chikou Span (current value from 26 periods ago)",
            format_number(chikou, 4),
        ),
    ])
}

pub const KELTNER_CHANNEL: Calculator = Calculator {
    id: "keltner-channel",
    name: "Keltner Channel",
    description: "Calculate the Keltner Channel bands using EMA and ATR.",
    category: Category::TradingAnalytics,
    inputs: &[
        InputField::textarea(
            "data",
            "Candle Data (High,Low,Close)",
            "102,98,101\n103,100,102\n104,101,103...",
        )
        .info("Enter at least 20 periods of H,L,C data on new lines"),
        InputField::number("emaPeriod", "EMA Period", "20"),
        InputField::number("atrPeriod", "ATR Period", "10"),
        InputField::number("multiplier", "ATR Multiplier", "2"),
    ],
    compute: Compute::Pure(keltner_channel),
};

fn keltner_channel(i: &Inputs) -> Outcome {
    let candles = parse_numeric_rows(&i.text("data"), 3)?;
    let ema_period = i.count("emaPeriod")?;
    let atr_period = i.count("atrPeriod")?;
    let multiplier = i.number("multiplier")?;
    ensure(ema_period > 0 && atr_period > 0, "Periods must be positive.")?;
    ensure(
        candles.len() >= ema_period && candles.len() >= atr_period,
        "Not enough data for the periods specified.",
    )?;

    let closes: Vec<f64> = candles.iter().map(|c| c[2]).collect();
    let k = 2.0 / (ema_period as f64 + 1.0);
    let ema = closes[ema_period..]
        .iter()
        .fold(mean(&closes[..ema_period]), |acc, price| price * k + acc * (1.0 - k));

    let true_ranges: Vec<f64> = candles
        .iter()
        .tuple_windows()
        .map(|(prev, cur)| {
            (cur[0] - cur[1])
                .max((cur[0] - prev[2]).abs())
                .max((cur[1] - prev[2]).abs())
        })
        .collect();
    let atr = mean(tail(&true_ranges, atr_period));

    Ok(vec![
        kv("Upper Band", format_number(ema + atr * multiplier, 4)),
        kv("Middle Line (EMA)", format_number(ema, 4)),
        kv("Lower Band", format_number(ema - atr * multiplier, 4)),
    ])
}

pub const MEAN_REVERSION_SCORE: Calculator = Calculator {
    id: "mean-reversion-score",
    name: "Mean Reversion Score",
    description: "Quantify how far a price has deviated from its recent mean, using Z-Score.",
    category: Category::TradingAnalytics,
    inputs: &[
        InputField::textarea(
            "prices",
            "Price Series",
            "100, 102, 101, 103, 105, 104, 106, 107, 115",
        )
        .info("Comma-separated values"),
        InputField::number("period", "Lookback Period", "20"),
    ],
    compute: Compute::Pure(mean_reversion_score),
};

fn mean_reversion_score(i: &Inputs) -> Outcome {
    let prices = i.series("prices");
    let period = i.count("period")?;
    ensure(period > 0, "Period must be positive.")?;
    ensure(
        prices.len() >= period,
        &format!("Not enough data for period {period}."),
    )?;

    let recent = tail(&prices, period);
    let sd = std_dev(recent);
    ensure(sd != 0.0, "Standard deviation is zero, cannot calculate score.")?;
    let z = (recent[recent.len() - 1] - mean(recent)) / sd;

    let interpretation = match z {
        z if z > 2.0 => "Highly extended to the upside (potential short)",
        z if z > 1.0 => "Moderately extended to the upside",
        z if z < -2.0 => "Highly extended to the downside (potential long)",
        z if z < -1.0 => "Moderately extended to the downside",
        _ => "Near the mean",
    };
    Ok(vec![
        kv("Z-Score (Std. Deviations from Mean)", format_number(z, 3)),
        kv("Interpretation", interpretation),
    ])
}

pub const VCP: Calculator = Calculator {
    id: "vcp-calculator",
    name: "Volatility Contraction Pattern (VCP)",
    description: "Detects potential VCP (Mark Minervini) characteristics in a price series.",
    category: Category::TradingAnalytics,
    inputs: &[InputField::textarea(
        "prices",
        "Closing Prices",
        "100, 110, 105, 115, 112, 120, 118, ...",
    )
    .info("Provide a series of prices representing a potential base.")],
    compute: Compute::Pure(vcp),
};

struct Contraction {
    depth: f64,
    high: f64,
    low: f64,
}

fn vcp(i: &Inputs) -> Outcome {
    const MAX_CONTRACTIONS: usize = 5;

    let prices = i.series("prices");
    ensure(
        prices.len() >= 20,
        "A longer price series is needed to detect a VCP.",
    )?;

    let mut contractions = Vec::new();
    let mut window: &[f64] = &prices;
    while contractions.len() < MAX_CONTRACTIONS {
        let high = max_of(window);
        let high_idx = match window.iter().rposition(|&p| p == high) {
            Some(idx) if idx >= 1 => idx,
            _ => break,
        };
        let low = min_of(&window[high_idx..]);
        contractions.push(Contraction {
            depth: (high - low) / high,
            high,
            low,
        });

        let low_idx = window.iter().rposition(|&p| p == low).unwrap_or(0);
        if low_idx + 1 >= window.len() {
            break;
        }
        window = &window[low_idx + 1..];
        if window.len() < 5 {
            break;
        }
    }

    if contractions.len() < 2 {
        return Ok(vec![kv(
            "VCP Status",
            "Not a clear VCP. Fewer than 2 contractions found.",
        )]);
    }

    let contracting = contractions
        .iter()
        .tuple_windows()
        .all(|(prev, next)| next.depth <= prev.depth);
    let label = if contracting {
        "Characteristics of a VCP are present (volatility is contracting)."
    } else {
        "Pattern found, but volatility is not consistently contracting."
    };

    let rows = contractions.iter().enumerate().map(|(n, c)| {
        vec![
            Cell::from(n + 1),
            Cell::from(format_percent(c.depth)),
            Cell::from(c.high),
            Cell::from(c.low),
        ]
    });
    Ok(vec![CalculationResult::table(
        label,
        ["Contraction #", "Depth", "High", "Low"],
        rows,
    )])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, table_of, value_of};
    use super::*;

    #[test]
    fn donchian_names_the_period_when_data_is_short() {
        let err = run(
            &DONCHIAN_CHANNELS,
            &[("highs", "105, 106"), ("lows", "102, 103"), ("period", "20")],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Not enough data for period 20.");
    }

    #[test]
    fn donchian_uses_the_trailing_window() {
        let out = run(
            &DONCHIAN_CHANNELS,
            &[
                ("highs", "120, 106, 105.5, 107"),
                ("lows", "90, 103, 102.5, 104"),
                ("period", "3"),
            ],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Upper Channel"), "107.00");
        assert_eq!(value_of(&out, "Lower Channel"), "102.50");
        assert_eq!(value_of(&out, "Middle Line"), "104.75");
    }

    #[test]
    fn ichimoku_requires_a_full_year_of_candles() {
        let data = "10,8\n".repeat(51);
        let err = run(&ICHIMOKU_CLOUD, &[("data", &data)]).unwrap_err();
        assert_eq!(err.to_string(), "At least 52 periods of data are required.");

        let data = "10,8\n".repeat(52);
        let out = run(&ICHIMOKU_CLOUD, &[("data", &data)]).unwrap();
        assert_eq!(value_of(&out, "Senkou Span B (plotted 26 periods ahead)"), "9.0000");
    }

    #[test]
    fn keltner_flat_market_has_zero_width_bands() {
        let data = "101,99,100\n".repeat(5);
        let out = run(
            &KELTNER_CHANNEL,
            &[("data", &data), ("emaPeriod", "3"), ("atrPeriod", "2"), ("multiplier", "2")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Middle Line (EMA)"), "100.0000");
        assert_eq!(value_of(&out, "Upper Band"), "104.0000");
        assert_eq!(value_of(&out, "Lower Band"), "96.0000");
    }

    #[test]
    fn mean_reversion_flags_extended_prices() {
        let out = run(
            &MEAN_REVERSION_SCORE,
            &[("prices", "100, 100, 100, 100, 100, 100, 100, 100, 100, 130"), ("period", "10")],
        )
        .unwrap();
        assert_eq!(
            value_of(&out, "Interpretation"),
            "Highly extended to the upside (potential short)"
        );
    }

    #[test]
    fn vcp_reports_contractions() {
        let prices = "100, 120, 90, 110, 100, 112, 105, 111, 107, 110, 108, 109, 108.5, 109, 108.7, 108.9, 108.8, 108.85, 108.82, 108.84";
        let out = run(&VCP, &[("prices", prices)]).unwrap();
        assert_eq!(
            out[0].label(),
            Some("Characteristics of a VCP are present (volatility is contracting).")
        );
        let table = table_of(&out);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], Cell::from("25.00%"));
        assert_eq!(table.rows[1][2], Cell::from(112.0));
    }
}
