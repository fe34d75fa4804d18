use super::{ensure, kv};
use crate::input::Inputs;
use crate::parse::parse_numeric_rows;
use crate::{Calculator, Compute, Outcome};
use core_types::{format_currency, format_number, format_percent, CalculationResult, Category, Cell, InputField};
use itertools::Itertools;

pub const CALCULATORS: &[Calculator] = &[
    ORDER_FLOW_IMBALANCE,
    LIQUIDITY_HEATMAP,
    EFFECTIVE_SLIPPAGE,
    FEE_ADJUSTED_BREAK_EVEN,
    MICROSTRUCTURE_NOISE_FILTER,
    LATENCY_COST,
];

pub const ORDER_FLOW_IMBALANCE: Calculator = Calculator {
    id: "order-flow-imbalance",
    name: "Order Flow Imbalance (OFI)",
    description: "Calculate the imbalance between buying and selling pressure at the bid/ask.",
    category: Category::OrderFlow,
    inputs: &[
        InputField::number("bidPrice1", "Previous Bid Price", "100.00"),
        InputField::number("bidSize1", "Previous Bid Size", "500"),
        InputField::number("askPrice1", "Previous Ask Price", "100.05"),
        InputField::number("askSize1", "Previous Ask Size", "400"),
        InputField::number("bidPrice2", "Current Bid Price", "100.00"),
        InputField::number("bidSize2", "Current Bid Size", "600"),
        InputField::number("askPrice2", "Current Ask Price", "100.05"),
        InputField::number("askSize2", "Current Ask Size", "300"),
    ],
    compute: Compute::Pure(order_flow_imbalance),
};

/// One side of the book at a point in time.
#[derive(Debug, Clone, Copy)]
struct Quote {
    price: f64,
    size: f64,
}

impl Quote {
    fn read(i: &Inputs, price: &str, size: &str) -> Result<Self, crate::CalcError> {
        Ok(Self {
            price: i.number(price)?,
            size: i.number(size)?,
        })
    }
}

fn order_flow_imbalance(i: &Inputs) -> Outcome {
    let bid1 = Quote::read(i, "bidPrice1", "bidSize1")?;
    let ask1 = Quote::read(i, "askPrice1", "askSize1")?;
    let bid2 = Quote::read(i, "bidPrice2", "bidSize2")?;
    let ask2 = Quote::read(i, "askPrice2", "askSize2")?;

    // A lower ask means the previous ask was lifted; an unchanged one nets the size change.
    let buy_pressure = if ask2.price < ask1.price {
        ask1.size
    } else if ask2.price == ask1.price {
        ask2.size - ask1.size
    } else {
        0.0
    };
    let sell_pressure = if bid2.price > bid1.price {
        bid1.size
    } else if bid2.price == bid1.price {
        bid2.size - bid1.size
    } else {
        0.0
    };

    let ofi = buy_pressure - sell_pressure;
    let interpretation = if ofi > 0.0 {
        format!("Positive Imbalance (Buyer Aggression: {ofi})")
    } else if ofi < 0.0 {
        format!("Negative Imbalance (Seller Aggression: {ofi})")
    } else {
        "Neutral".to_string()
    };

    Ok(vec![
        kv("Order Flow Imbalance (OFI)", format_number(ofi, 0)).with_info(
            "Measures the net difference between aggressive buy orders (lifting the ask) and aggressive sell orders (hitting the bid) over a short interval.",
        ),
        kv("Interpretation", interpretation),
    ])
}

pub const LIQUIDITY_HEATMAP: Calculator = Calculator {
    id: "liquidity-heatmap",
    name: "Liquidity Heatmap (Order Book)",
    description: "Visualize the distribution of limit order liquidity in the order book.",
    category: Category::OrderFlow,
    inputs: &[
        InputField::textarea(
            "orders",
            "Order Book Data (Price,Size)",
            "100.00,500\n99.95,800\n100.05,400\n100.10,700",
        )
        .info("One order per line: Price, Size. Bids and asks are separated automatically."),
        InputField::number("currentPrice", "Current Market Price", "100.02"),
    ],
    compute: Compute::Pure(liquidity_heatmap),
};

fn liquidity_heatmap(i: &Inputs) -> Outcome {
    let orders = parse_numeric_rows(&i.text("orders"), 2)?;
    ensure(!orders.is_empty(), "No order data entered.")?;
    let current = i.number("currentPrice")?;
    ensure(
        orders.iter().all(|o| o[1] >= 0.0),
        "Order sizes cannot be negative.",
    )?;

    // Asks print furthest-first so the book reads top to bottom around the spread.
    let asks = orders
        .iter()
        .filter(|o| o[0] > current)
        .sorted_by(|a, b| b[0].total_cmp(&a[0]))
        .collect_vec();
    let bids = orders
        .iter()
        .filter(|o| o[0] < current)
        .sorted_by(|a, b| b[0].total_cmp(&a[0]))
        .collect_vec();

    let ask_total: f64 = asks.iter().map(|a| a[1]).sum();
    let bid_total: f64 = bids.iter().map(|b| b[1]).sum();

    let level = |order: &Vec<f64>, total: f64| {
        let share = order[1] / total * 100.0;
        let bar = "█".repeat((share / 2.0).round() as usize);
        vec![
            Cell::from(format_number(order[0], 2)),
            Cell::from(format_number(order[1], 0)),
            Cell::from(format!("{bar} ({}%)", format_number(share, 1))),
        ]
    };

    let spread = vec![
        Cell::from("--- Spread ---"),
        Cell::from("---"),
        Cell::from("---"),
    ];
    let rows = asks
        .iter()
        .map(|a| level(a, ask_total))
        .chain(std::iter::once(spread))
        .chain(bids.iter().map(|b| level(b, bid_total)))
        .collect_vec();

    Ok(vec![CalculationResult::table(
        "Order Book Liquidity",
        ["Price Level", "Size", "Liquidity Distribution"],
        rows,
    )])
}

pub const EFFECTIVE_SLIPPAGE: Calculator = Calculator {
    id: "effective-slippage-estimator",
    name: "Effective Slippage Estimator",
    description: "Calculate the slippage between the expected fill price and the actual average fill price.",
    category: Category::OrderFlow,
    inputs: &[
        InputField::number("expectedPrice", "Expected Fill Price (e.g., Mid-point)", "150.50"),
        InputField::number("averageFillPrice", "Actual Average Fill Price", "150.55"),
        InputField::number("tradeValue", "Total Trade Value", "10000"),
    ],
    compute: Compute::Pure(effective_slippage),
};

fn effective_slippage(i: &Inputs) -> Outcome {
    let expected = i.number("expectedPrice")?;
    ensure(expected > 0.0, "Expected price must be positive.")?;
    let per_share = i.number("averageFillPrice")? - expected;
    let percent = per_share / expected;
    Ok(vec![
        kv("Slippage per Share", format_currency(per_share)),
        kv("Slippage Percentage", format_percent(percent)),
        kv("Total Slippage Cost", format_currency(percent * i.number("tradeValue")?)),
    ])
}

pub const FEE_ADJUSTED_BREAK_EVEN: Calculator = Calculator {
    id: "fee-adjusted-break-even",
    name: "Fee-Adjusted Break-Even",
    description: "Calculate the true break-even price including commissions, slippage, and other fees.",
    category: Category::OrderFlow,
    inputs: &[
        InputField::number("entryPrice", "Entry Price per Share", "50.00"),
        InputField::number("quantity", "Number of Shares", "100"),
        InputField::number("commission", "Round-Trip Commission ($)", "10.00").default_value("0"),
        InputField::number("slippage", "Estimated Slippage per Share ($)", "0.02").default_value("0"),
        InputField::number("otherFees", "Other Fees ($)", "1.50").default_value("0"),
    ],
    compute: Compute::Pure(fee_adjusted_break_even),
};

fn fee_adjusted_break_even(i: &Inputs) -> Outcome {
    let entry = i.number("entryPrice")?;
    let quantity = i.number("quantity")?;
    ensure(quantity > 0.0, "Quantity must be greater than zero.")?;

    let total_fees = i.number_or("commission", 0.0)?
        + i.number_or("slippage", 0.0)? * quantity
        + i.number_or("otherFees", 0.0)?;
    let per_share = total_fees / quantity;
    Ok(vec![
        kv("Total Fees per Share", format_currency(per_share)),
        kv("Break-Even (Long Trade)", format_currency(entry + per_share)),
        kv("Break-Even (Short Trade)", format_currency(entry - per_share)),
    ])
}

pub const MICROSTRUCTURE_NOISE_FILTER: Calculator = Calculator {
    id: "microstructure-noise-filter",
    name: "Microstructure Noise Filter",
    description: "Estimate market microstructure noise using the Roll model.",
    category: Category::OrderFlow,
    inputs: &[InputField::textarea(
        "prices",
        "Consecutive Trade Prices",
        "100.01, 100.00, 100.01, 100.02, 100.01",
    )
    .info("Comma-separated high-frequency trade prices")],
    compute: Compute::Pure(microstructure_noise_filter),
};

const ROLL_INFO: &str = "An estimate of the bid-ask spread inferred from the serial correlation of price changes, capturing the cost of 'bouncing' between the bid and ask.";

fn microstructure_noise_filter(i: &Inputs) -> Outcome {
    let prices = i.series("prices");
    ensure(prices.len() >= 2, "At least two price points are required.")?;
    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    ensure(changes.len() >= 2, "At least two price changes are required.")?;

    let mu = analytics::mean(&changes);
    let autocovariance = changes
        .iter()
        .tuple_windows()
        .map(|(a, b)| (a - mu) * (b - mu))
        .sum::<f64>()
        / (changes.len() - 1) as f64;

    // Roll's estimator is only defined for negative serial covariance.
    let value = if autocovariance >= 0.0 {
        "0 (or positive covariance found)".to_string()
    } else {
        format_number(2.0 * (-autocovariance).sqrt(), 4)
    };
    Ok(vec![kv("Effective Spread (Roll Model)", value).with_info(ROLL_INFO)])
}

pub const LATENCY_COST: Calculator = Calculator {
    id: "latency-cost-estimator",
    name: "Latency Cost Estimator",
    description: "Estimate the cost of latency based on volatility and delay.",
    category: Category::OrderFlow,
    inputs: &[
        InputField::number("tradeSize", "Trade Size (Value)", "500000"),
        InputField::number("dailyVolatility", "Daily Volatility (%)", "1.5"),
        InputField::number("latency", "Latency (Milliseconds)", "50"),
    ],
    compute: Compute::Pure(latency_cost),
};

/// Seconds in a 6.5 hour US equity session.
const SESSION_SECONDS: f64 = 6.5 * 60.0 * 60.0;

fn latency_cost(i: &Inputs) -> Outcome {
    let trade_size = i.number("tradeSize")?;
    let daily_vol = i.number("dailyVolatility")? / 100.0;
    let latency_ms = i.number("latency")?;

    let per_second = daily_vol / SESSION_SECONDS.sqrt() * trade_size;
    Ok(vec![
        kv("Volatility Cost per Second", format_currency(per_second)),
        kv("Estimated Latency Cost", format_currency(per_second * latency_ms / 1000.0)),
    ])
}
