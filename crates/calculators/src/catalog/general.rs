use super::{ensure, kv, tail};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::parse::{non_blank_lines, parse_number, parse_numeric_rows};
use crate::{Calculator, Compute, Outcome};
use analytics::mean;
use core_types::{format_currency, format_number, format_percent, Category, InputField};
use itertools::Itertools;

pub const CALCULATORS: &[Calculator] = &[
    PROFIT_LOSS,
    AVERAGE_PRICE,
    BREAK_EVEN_PRICE,
    COMMISSION,
    CHANGE,
    FIBONACCI,
    LEVERAGE,
    PIVOT_POINTS,
    SPREAD,
    ATR,
];

pub const PROFIT_LOSS: Calculator = Calculator {
    id: "profit-loss",
    name: "Profit & Loss",
    description: "Calculate the profit or loss from a trade, including optional fees.",
    category: Category::GeneralTrading,
    inputs: &[
        InputField::number("entryPrice", "Entry Price", "100.00"),
        InputField::number("exitPrice", "Exit Price", "110.00"),
        InputField::number("quantity", "Quantity (Shares, units, etc.)", "50"),
        InputField::number("fees", "Total Fees (Optional)", "5.00").default_value("0"),
    ],
    compute: Compute::Pure(profit_loss),
};

fn profit_loss(i: &Inputs) -> Outcome {
    let entry = i.number("entryPrice")?;
    let exit = i.number("exitPrice")?;
    let quantity = i.number("quantity")?;
    let fees = i.number_or("fees", 0.0)?;
    ensure(quantity > 0.0, "Quantity must be positive.")?;

    let gross = (exit - entry) * quantity;
    let cost = entry * quantity;
    ensure(cost != 0.0, "Initial cost cannot be zero for ROI calculation.")?;
    Ok(vec![
        kv("Gross P&L", format_currency(gross)),
        kv("Net P&L", format_currency(gross - fees)),
        kv("Return on Investment", format_percent((gross - fees) / cost)),
    ])
}

pub const AVERAGE_PRICE: Calculator = Calculator {
    id: "average-price",
    name: "Average Price",
    description: "Calculate the average entry price after multiple buys of the same asset.",
    category: Category::GeneralTrading,
    inputs: &[InputField::textarea("trades", "Trades (Quantity,Price)", "10,100\n20,95\n15,102")
        .info("Enter each trade on a new line: quantity,price")],
    compute: Compute::Pure(average_price),
};

fn average_price(i: &Inputs) -> Outcome {
    let text = i.text("trades");
    let mut total_cost = 0.0;
    let mut total_quantity = 0.0;
    let mut seen = 0;

    for line in non_blank_lines(&text) {
        seen += 1;
        let Some((qty, price)) = line.split(',').collect_tuple() else {
            return Err(CalcError::malformed(format!(
                "Invalid format for line: \"{line}\""
            )));
        };
        match (parse_number(qty.trim()), parse_number(price.trim())) {
            (Some(qty), Some(price)) if qty > 0.0 && price >= 0.0 => {
                total_cost += qty * price;
                total_quantity += qty;
            }
            _ => {
                return Err(CalcError::malformed(format!(
                    "Invalid number in line: \"{line}\""
                )));
            }
        }
    }
    ensure(seen > 0, "No trades entered.")?;
    ensure(total_quantity != 0.0, "Total quantity cannot be zero.")?;

    let average = total_cost / total_quantity;
    Ok(vec![
        kv("Total Quantity", format_number(total_quantity, 4)),
        kv("Total Cost", format_currency(total_cost)),
        kv("Average Price", format_currency(average).replacen('$', "", 1)),
    ])
}

pub const BREAK_EVEN_PRICE: Calculator = Calculator {
    id: "break-even-price",
    name: "Break-Even Price",
    description: "Calculate the price an asset must reach for a trade to break even, including commissions.",
    category: Category::GeneralTrading,
    inputs: &[
        InputField::number("entryPrice", "Entry Price per Share", "50.00"),
        InputField::number("quantity", "Number of Shares", "100"),
        InputField::number("commission", "Total Commission (Buy & Sell)", "10.00").default_value("0"),
    ],
    compute: Compute::Pure(break_even_price),
};

fn break_even_price(i: &Inputs) -> Outcome {
    let quantity = i.number("quantity")?;
    ensure(quantity > 0.0, "Quantity must be greater than zero.")?;
    let price = i.number("entryPrice")? + i.number_or("commission", 0.0)? / quantity;
    Ok(vec![kv("Break-Even Price per Share", format_currency(price))])
}

pub const COMMISSION: Calculator = Calculator {
    id: "commission-calculator",
    name: "Commission",
    description: "Calculate trading commission based on a percentage or fixed fee structure.",
    category: Category::GeneralTrading,
    inputs: &[
        InputField::number("tradeValue", "Total Trade Value", "10000"),
        InputField::number("commissionRate", "Commission Rate (%)", "0.1").default_value(""),
        InputField::number("fixedFee", "Fixed Fee ($)", "5.00").default_value(""),
    ],
    compute: Compute::Pure(commission),
};

fn commission(i: &Inputs) -> Outcome {
    let rate = i.number_or("commissionRate", 0.0)?;
    let fixed = i.number_or("fixedFee", 0.0)?;

    let mut results = Vec::new();
    if rate > 0.0 {
        let value = i.number("tradeValue")?;
        results.push(kv(
            "Commission (Percentage)",
            format_currency(value * rate / 100.0),
        ));
    }
    if fixed > 0.0 {
        results.push(kv("Commission (Fixed)", format_currency(fixed)));
    }
    ensure(!results.is_empty(), "Enter a commission rate or a fixed fee.")?;
    Ok(results)
}

pub const CHANGE: Calculator = Calculator {
    id: "change-calculator",
    name: "Change",
    description: "Calculate the absolute and percentage change between two values.",
    category: Category::GeneralTrading,
    inputs: &[
        InputField::number("initialPrice", "Initial Price", "200"),
        InputField::number("finalPrice", "Final Price", "210"),
    ],
    compute: Compute::Pure(change),
};

fn change(i: &Inputs) -> Outcome {
    let initial = i.number("initialPrice")?;
    let change = i.number("finalPrice")? - initial;
    ensure(
        initial != 0.0,
        "Initial Price cannot be zero for percentage calculation.",
    )?;
    Ok(vec![
        kv("Absolute Change", format_number(change, 2)),
        kv("Percentage Change", format_percent(change / initial)),
    ])
}

pub const FIBONACCI: Calculator = Calculator {
    id: "fibonacci",
    name: "Fibonacci",
    description: "Calculate Fibonacci retracement and extension levels.",
    category: Category::GeneralTrading,
    inputs: &[
        InputField::number("high", "High Price", "200"),
        InputField::number("low", "Low Price", "150"),
    ],
    compute: Compute::Pure(fibonacci),
};

fn fibonacci(i: &Inputs) -> Outcome {
    const RETRACEMENTS: [(&str, f64); 4] = [
        ("Retracement 23.6%", 0.236),
        ("Retracement 38.2%", 0.382),
        ("Retracement 50.0%", 0.5),
        ("Retracement 61.8%", 0.618),
    ];
    const EXTENSIONS: [(&str, f64); 2] = [("Extension 161.8%", 0.618), ("Extension 261.8%", 1.618)];

    let high = i.number("high")?;
    let low = i.number("low")?;
    ensure(low < high, "Low price must be less than high price.")?;
    let range = high - low;

    let levels = RETRACEMENTS
        .iter()
        .map(|&(label, ratio)| kv(label, format_number(high - range * ratio, 2)))
        .chain(
            EXTENSIONS
                .iter()
                .map(|&(label, ratio)| kv(label, format_number(high + range * ratio, 2))),
        )
        .collect();
    Ok(levels)
}

pub const LEVERAGE: Calculator = Calculator {
    id: "leverage-calculator",
    name: "Leverage",
    description: "Calculate the effective leverage and total exposure of a trade.",
    category: Category::GeneralTrading,
    inputs: &[
        InputField::number("positionValue", "Total Position Value", "50000"),
        InputField::number("equity", "Your Equity (Margin)", "5000"),
    ],
    compute: Compute::Pure(leverage),
};

fn leverage(i: &Inputs) -> Outcome {
    let position = i.number("positionValue")?;
    let equity = i.number("equity")?;
    ensure(equity > 0.0, "Equity must be positive.")?;
    Ok(vec![kv(
        "Leverage Ratio",
        format!("{} : 1", format_number(position / equity, 2)),
    )])
}

pub const PIVOT_POINTS: Calculator = Calculator {
    id: "pivot-points",
    name: "Pivot Points",
    description: "Calculate pivot points, support, and resistance levels.",
    category: Category::GeneralTrading,
    inputs: &[
        InputField::number("high", "Previous High", "105"),
        InputField::number("low", "Previous Low", "95"),
        InputField::number("close", "Previous Close", "101"),
    ],
    compute: Compute::Pure(pivot_points),
};

fn pivot_points(i: &Inputs) -> Outcome {
    let high = i.number("high")?;
    let low = i.number("low")?;
    let close = i.number("close")?;
    ensure(low <= high, "Low cannot be greater than High.")?;

    let pivot = (high + low + close) / 3.0;
    let range = high - low;
    Ok(vec![
        kv("Resistance 2 (R2)", format_number(pivot + range, 2)),
        kv("Resistance 1 (R1)", format_number(2.0 * pivot - low, 2)),
        kv("Pivot Point (PP)", format_number(pivot, 2)),
        kv("Support 1 (S1)", format_number(2.0 * pivot - high, 2)),
        kv("Support 2 (S2)", format_number(pivot - range, 2)),
    ])
}

pub const SPREAD: Calculator = Calculator {
    id: "spread-calculator",
    name: "Spread",
    description: "Calculate the bid-ask spread in absolute and percentage terms.",
    category: Category::GeneralTrading,
    inputs: &[
        InputField::number("askPrice", "Ask Price", "1.0855"),
        InputField::number("bidPrice", "Bid Price", "1.0853"),
    ],
    compute: Compute::Pure(spread),
};

fn spread(i: &Inputs) -> Outcome {
    let ask = i.number("askPrice")?;
    let bid = i.number("bidPrice")?;
    ensure(bid <= ask, "Bid price cannot be higher than ask price.")?;
    Ok(vec![
        kv("Spread", format_number(ask - bid, 5)),
        kv("Spread Percentage", format_percent((ask - bid) / ask)),
    ])
}

pub const ATR: Calculator = Calculator {
    id: "atr",
    name: "ATR (Average True Range)",
    description: "Calculate the Average True Range as a measure of market volatility.",
    category: Category::GeneralTrading,
    inputs: &[
        InputField::textarea(
            "data",
            "Candle Data (High,Low,Close)",
            "102,98,101\n103,100,102\n104,101,103",
        )
        .info("Enter each period on a new line: High,Low,Close"),
        InputField::number("period", "ATR Period", "14"),
    ],
    compute: Compute::Pure(atr),
};

fn atr(i: &Inputs) -> Outcome {
    let candles = parse_numeric_rows(&i.text("data"), 3)?;
    let period = i.count("period")?;
    ensure(period > 0, "Period must be positive.")?;
    ensure(
        candles.len() >= period,
        &format!("Not enough data for period {period}."),
    )?;

    let true_ranges: Vec<f64> = candles
        .iter()
        .tuple_windows()
        .map(|(prev, cur)| {
            let (high, low, prev_close) = (cur[0], cur[1], prev[2]);
            (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs())
        })
        .collect();
    ensure(
        !true_ranges.is_empty(),
        "Not enough data to calculate True Range.",
    )?;

    let atr = mean(tail(&true_ranges, period));
    Ok(vec![kv(format!("ATR ({period})"), format_number(atr, 4))])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, value_of};
    use super::*;

    #[test]
    fn profit_loss_defaults_fees_to_zero() {
        let out = run(
            &PROFIT_LOSS,
            &[("entryPrice", "100"), ("exitPrice", "110"), ("quantity", "50")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Net P&L"), "$500.00");
        assert_eq!(value_of(&out, "Return on Investment"), "10.00%");
    }

    #[test]
    fn average_price_weights_by_quantity() {
        let out = run(&AVERAGE_PRICE, &[("trades", "10,100\n\n30,96\n")]).unwrap();
        assert_eq!(value_of(&out, "Total Quantity"), "40.0000");
        assert_eq!(value_of(&out, "Average Price"), "97.00");
    }

    #[test]
    fn average_price_quotes_the_bad_line() {
        let err = run(&AVERAGE_PRICE, &[("trades", "10,100\n5")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid format for line: \"5\"");
        let err = run(&AVERAGE_PRICE, &[("trades", "-1,100")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid number in line: \"-1,100\"");
    }

    #[test]
    fn commission_requires_a_fee_structure() {
        let err = run(&COMMISSION, &[("tradeValue", "10000")]).unwrap_err();
        assert_eq!(err.to_string(), "Enter a commission rate or a fixed fee.");
        let out = run(&COMMISSION, &[("tradeValue", "10000"), ("commissionRate", "0.1")]).unwrap();
        assert_eq!(value_of(&out, "Commission (Percentage)"), "$10.00");
    }

    #[test]
    fn fibonacci_levels() {
        let out = run(&FIBONACCI, &[("high", "200"), ("low", "150")]).unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(value_of(&out, "Retracement 50.0%"), "175.00");
        assert_eq!(value_of(&out, "Extension 161.8%"), "230.90");
    }

    #[test]
    fn pivot_points_are_symmetric_around_the_pivot() {
        let out = run(&PIVOT_POINTS, &[("high", "105"), ("low", "95"), ("close", "100")]).unwrap();
        assert_eq!(value_of(&out, "Pivot Point (PP)"), "100.00");
        assert_eq!(value_of(&out, "Resistance 2 (R2)"), "110.00");
        assert_eq!(value_of(&out, "Support 2 (S2)"), "90.00");
    }

    #[test]
    fn atr_averages_the_trailing_true_ranges() {
        let out = run(
            &ATR,
            &[("data", "102,98,101\n103,100,102\n104,101,103"), ("period", "2")],
        )
        .unwrap();
        // True ranges: max(3, 2, 1) = 3 and max(3, 2, 1) = 3.
        assert_eq!(value_of(&out, "ATR (2)"), "3.0000");

        let err = run(&ATR, &[("data", "102,98,101"), ("period", "14")]).unwrap_err();
        assert_eq!(err.to_string(), "Not enough data for period 14.");
    }
}
