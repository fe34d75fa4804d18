use super::{ensure, kv};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::parse::{parse_number, parse_numeric_rows, parse_rows};
use crate::{Calculator, Compute, Outcome};
use ::options::{
    binomial_american_call, black_scholes, calculate_greeks, implied_volatility,
    trinomial_american_call, OptionType, MAX_TREE_STEPS,
};
use analytics::cdf;
use core_types::{
    format_currency, format_number, format_percent, CalculationResult, Category, Cell, InputField,
};
use itertools::Itertools;

pub const CALCULATORS: &[Calculator] = &[
    BLACK_SCHOLES,
    IMPLIED_VOLATILITY,
    OPTIONS_PROFIT,
    COVERED_CALL,
    OPTIONS_GREEKS,
    BINOMIAL_OPTIONS,
    TRINOMIAL_OPTIONS,
    GREEKS_SENSITIVITY,
    GEX,
    THETA_DECAY,
    SYNTHETIC_POSITION,
    ASSIGNMENT_PROBABILITY,
    RISK_NEUTRAL_PROBABILITY,
    VOLATILITY_SURFACE_INTERPOLATOR,
    PUT_CALL_PARITY,
    SKEW_SMILE,
    OPTIONS_ARBITRAGE_CHECKER,
];

const SPOT: InputField = InputField::number("s", "Stock Price", "100");
const STRIKE: InputField = InputField::number("k", "Strike Price", "105");
const EXPIRY: InputField = InputField::number("t", "Time to Expiry (Years)", "0.25");
const VOLATILITY: InputField = InputField::number("v", "Volatility (%)", "20");
const RATE: InputField = InputField::number("r", "Risk-Free Rate (%)", "5");

/// Spot, strike, expiry, and volatility and rate as decimals.
struct Contract {
    s: f64,
    k: f64,
    t: f64,
    v: f64,
    r: f64,
}

impl Contract {
    fn from_inputs(i: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            s: i.number("s")?,
            k: i.number("k")?,
            t: i.number("t")?,
            v: i.number("v")? / 100.0,
            r: i.number("r")? / 100.0,
        })
    }

    fn is_positive(&self) -> bool {
        self.s > 0.0 && self.k > 0.0 && self.t > 0.0 && self.v > 0.0
    }
}

pub const BLACK_SCHOLES: Calculator = Calculator {
    id: "black-scholes",
    name: "Black-Scholes Options Pricing",
    description: "Calculate the theoretical price of European-style options.",
    category: Category::Options,
    inputs: &[
        SPOT.info("Current market price of the underlying asset."),
        STRIKE.info("The price at which the option can be exercised."),
        EXPIRY.info(
            "Time remaining until the option expires, expressed in years (e.g., 3 months = 0.25).",
        ),
        VOLATILITY.info(
            "The annualized standard deviation of the stock's returns, known as implied volatility.",
        ),
        RATE.info(
            "The annualized risk-free interest rate (e.g., the yield on a short-term government bond).",
        ),
    ],
    compute: Compute::Pure(black_scholes_prices),
};

fn black_scholes_prices(i: &Inputs) -> Outcome {
    let c = Contract::from_inputs(i)?;
    let call = black_scholes(c.s, c.k, c.t, c.v, c.r, OptionType::Call);
    let put = black_scholes(c.s, c.k, c.t, c.v, c.r, OptionType::Put);
    Ok(vec![
        kv("Call Option Price", format_currency(call)).with_info(
            "The theoretical fair value of the call option, assuming a European-style exercise.",
        ),
        kv("Put Option Price", format_currency(put)).with_info(
            "The theoretical fair value of the put option, assuming a European-style exercise.",
        ),
    ])
}

pub const IMPLIED_VOLATILITY: Calculator = Calculator {
    id: "implied-volatility",
    name: "Implied Volatility",
    description: "Calculate the market's expectation of future volatility from an option's price.",
    category: Category::Options,
    inputs: &[
        SPOT,
        STRIKE,
        EXPIRY,
        RATE,
        InputField::number("optionPrice", "Market Option Price", "2.50"),
        InputField::text("optionType", "Option Type (call/put)", "call"),
    ],
    compute: Compute::Pure(implied_vol),
};

fn option_type(i: &Inputs, name: &str) -> Result<OptionType, CalcError> {
    i.text(name)
        .parse()
        .map_err(|_| CalcError::domain("Option type must be \"call\" or \"put\"."))
}

fn implied_vol(i: &Inputs) -> Outcome {
    let side = option_type(i, "optionType")?;
    let iv = implied_volatility(
        i.number("s")?,
        i.number("k")?,
        i.number("t")?,
        i.number("r")? / 100.0,
        i.number("optionPrice")?,
        side,
    )?;
    Ok(vec![kv("Implied Volatility (IV)", format_percent(iv)).with_info(
        "The market's forecast of the likely movement in a security's price. It is derived from the option's market price.",
    )])
}

pub const OPTIONS_PROFIT: Calculator = Calculator {
    id: "options-profit",
    name: "Options Profit",
    description: "Calculate the profit or loss for a single leg options trade.",
    category: Category::Options,
    inputs: &[
        InputField::number("strikePrice", "Strike Price", "100"),
        InputField::number("premium", "Premium Paid/Received per Share", "2.50"),
        InputField::number("exitPrice", "Stock Price at Expiry", "110"),
        InputField::number("contracts", "Number of Contracts", "10").default_value("1"),
    ],
    compute: Compute::Pure(options_profit),
};

fn options_profit(i: &Inputs) -> Outcome {
    let strike = i.number("strikePrice")?;
    let premium = i.number("premium")?;
    let exit = i.number("exitPrice")?;
    let shares = i.number("contracts")? * 100.0;

    let call_payoff = (exit - strike).max(0.0);
    let put_payoff = (strike - exit).max(0.0);
    Ok(vec![
        kv("Long Call Profit", format_currency((call_payoff - premium) * shares)),
        kv("Long Put Profit", format_currency((put_payoff - premium) * shares)),
        kv("Short Call Profit", format_currency((premium - call_payoff) * shares)),
        kv("Short Put Profit", format_currency((premium - put_payoff) * shares)),
    ])
}

pub const COVERED_CALL: Calculator = Calculator {
    id: "covered-call",
    name: "Covered Call",
    description: "Calculate the potential profit and breakeven for a covered call strategy.",
    category: Category::Options,
    inputs: &[
        InputField::number("purchasePrice", "Stock Purchase Price per Share", "45"),
        InputField::number("strikePrice", "Call Strike Price", "50"),
        InputField::number("premium", "Premium Received per Share", "2"),
        InputField::number("shares", "Number of Shares", "100"),
    ],
    compute: Compute::Pure(covered_call),
};

fn covered_call(i: &Inputs) -> Outcome {
    let purchase = i.number("purchasePrice")?;
    let strike = i.number("strikePrice")?;
    let premium = i.number("premium")?;
    let shares = i.number("shares")?;
    ensure(purchase > 0.0, "Purchase price must be positive.")?;

    let assigned_gain = strike - purchase + premium;
    Ok(vec![
        kv("Breakeven Stock Price", format_currency(purchase - premium)),
        kv("Max Profit (if assigned)", format_currency(assigned_gain * shares)),
        kv("ROI (if assigned)", format_percent(assigned_gain / purchase)),
        kv("ROI (if not assigned)", format_percent(premium / purchase)),
    ])
}

pub const OPTIONS_GREEKS: Calculator = Calculator {
    id: "options-greeks",
    name: "Options Greeks (1st & 2nd Order)",
    description: "Calculate primary (Delta, Gamma, Theta, Vega) and secondary (Vanna, Charm) greeks.",
    category: Category::Options,
    inputs: &[
        SPOT.info("Current market price of the underlying asset."),
        STRIKE.info("The price at which the option can be exercised."),
        EXPIRY.info("Time remaining until the option expires, expressed in years."),
        VOLATILITY.info("The implied volatility of the underlying asset."),
        RATE.info("The annualized risk-free interest rate."),
    ],
    compute: Compute::Pure(options_greeks),
};

fn options_greeks(i: &Inputs) -> Outcome {
    let c = Contract::from_inputs(i)?;
    ensure(c.is_positive(), "Inputs must be positive.")?;
    let g = calculate_greeks(c.s, c.k, c.t, c.v, c.r);

    Ok(vec![
        kv("Call Delta", format_number(g.delta_call, 4)).with_info(
            "Rate of change of the option's price for a $1 change in the stock. Ranges from 0 to 1 for calls.",
        ),
        kv("Put Delta", format_number(g.delta_put, 4)).with_info(
            "Rate of change of the option's price for a $1 change in the stock. Ranges from -1 to 0 for puts.",
        ),
        kv("Gamma", format_number(g.gamma, 4)).with_info(
            "Rate of change of Delta for a $1 change in the stock. Measures the convexity of the option's value.",
        ),
        kv("Call Theta (per day)", format_number(g.theta_call_per_day(), 4))
            .with_info("Rate of change of the option's price per day due to time decay."),
        kv("Vega (per 1% vol change)", format_number(g.vega_per_point(), 4)).with_info(
            "Rate of change of the option's price for a 1% change in implied volatility.",
        ),
        kv("Vanna", format_number(g.vanna, 4))
            .with_info("Measures the change in Delta with respect to a change in volatility."),
        kv("Charm (per day)", format_number(g.charm / 365.0, 4)).with_info(
            "Measures the change in Delta per day due to time decay. Also known as Delta Decay.",
        ),
    ])
}

const LATTICE_INPUTS: &[InputField] = &[
    SPOT,
    InputField::number("k", "Strike Price", "100"),
    InputField::number("t", "Time to Expiry (Years)", "1"),
    VOLATILITY,
    RATE,
    InputField::number("steps", "Number of Steps", "100"),
];

pub const BINOMIAL_OPTIONS: Calculator = Calculator {
    id: "binomial-options",
    name: "Binomial Options Pricing",
    description: "Price an American option using a binomial tree model.",
    category: Category::Options,
    inputs: LATTICE_INPUTS,
    compute: Compute::Pure(binomial_options),
};

fn binomial_options(i: &Inputs) -> Outcome {
    let c = Contract::from_inputs(i)?;
    let steps = i.count_at_most("steps", MAX_TREE_STEPS)?;
    let price = binomial_american_call(c.s, c.k, c.t, c.v, c.r, steps)?;
    Ok(vec![kv("American Call Price (Binomial)", format_currency(price))])
}

pub const TRINOMIAL_OPTIONS: Calculator = Calculator {
    id: "trinomial-options",
    name: "Trinomial Options Pricing",
    description: "Price an American or European option using a trinomial tree model.",
    category: Category::Options,
    inputs: LATTICE_INPUTS,
    compute: Compute::Pure(trinomial_options),
};

fn trinomial_options(i: &Inputs) -> Outcome {
    let c = Contract::from_inputs(i)?;
    let steps = i.count_at_most("steps", MAX_TREE_STEPS)?;
    let price = trinomial_american_call(c.s, c.k, c.t, c.v, c.r, steps)?;
    Ok(vec![kv("American Call Price (Trinomial)", format_currency(price))])
}

pub const GREEKS_SENSITIVITY: Calculator = Calculator {
    id: "greeks-sensitivity",
    name: "Greeks Sensitivity Analyzer",
    description: "Analyze how options greeks change with stock price and time.",
    category: Category::Options,
    inputs: &[
        SPOT,
        InputField::number("k", "Strike Price", "100"),
        EXPIRY,
        InputField::number("v", "Volatility (%)", "30"),
        RATE,
    ],
    compute: Compute::Pure(greeks_sensitivity),
};

fn greeks_sensitivity(i: &Inputs) -> Outcome {
    let c = Contract::from_inputs(i)?;

    // Nine spot prices from 10 below to 10 above the current price.
    let rows = (0..=8)
        .map(|step| c.s - 10.0 + 2.5 * step as f64)
        .filter(|&price| price > 0.0)
        .map(|price| {
            let g = calculate_greeks(price, c.k, c.t, c.v, c.r);
            vec![
                Cell::from(format_currency(price)),
                Cell::from(format_number(g.delta_call, 3)),
                Cell::from(format_number(g.delta_put, 3)),
                Cell::from(format_number(g.gamma, 4)),
                Cell::from(format_number(g.theta_call_per_day(), 3)),
                Cell::from(format_number(g.vega_per_point(), 3)),
            ]
        });

    Ok(vec![CalculationResult::table(
        "Greeks Sensitivity to Stock Price",
        ["Stock Price", "Call Delta", "Put Delta", "Gamma", "Call Theta", "Vega"],
        rows,
    )])
}

pub const GEX: Calculator = Calculator {
    id: "gex",
    name: "Gamma Exposure (GEX)",
    description: "Estimate the market-wide gamma exposure from options positions.",
    category: Category::Options,
    inputs: &[
        SPOT,
        InputField::number("t", "Time to Expiry (Years)", "0.1"),
        InputField::number("v", "Volatility (%)", "25"),
        RATE,
        InputField::textarea(
            "positions",
            "Positions (Strike,Call OI,Put OI)",
            "95,1000,500\n100,5000,2000\n105,800,1500",
        )
        .info("Strike, Call Open Interest, Put Open Interest per line."),
    ],
    compute: Compute::Pure(gex),
};

fn gex(i: &Inputs) -> Outcome {
    let positions = parse_numeric_rows(&i.text("positions"), 3)?;
    ensure(!positions.is_empty(), "No positions entered.")?;
    let s = i.number("s")?;
    let t = i.number("t")?;
    let v = i.number("v")? / 100.0;
    let r = i.number("r")? / 100.0;

    // Dollar gamma per 1% move, 100 shares per contract.
    let total: f64 = positions
        .iter()
        .map(|p| {
            let gamma = calculate_greeks(s, p[0], t, v, r).gamma;
            gamma * (p[1] - p[2]) * 100.0 * s * s * 0.01
        })
        .sum();

    Ok(vec![kv("Total GEX (per 1% move)", format_currency(total)).with_info(
        "Gamma Exposure. Estimates the total dollar value of gamma in the market. A large positive GEX can suppress volatility, while a large negative GEX can amplify it.",
    )])
}

pub const THETA_DECAY: Calculator = Calculator {
    id: "theta-decay",
    name: "Time Value Decay (Theta)",
    description: "Calculate the expected decay in an option's price over one day.",
    category: Category::Options,
    inputs: &[SPOT, STRIKE, EXPIRY, VOLATILITY, RATE],
    compute: Compute::Pure(theta_decay),
};

fn theta_decay(i: &Inputs) -> Outcome {
    let c = Contract::from_inputs(i)?;
    let g = calculate_greeks(c.s, c.k, c.t, c.v, c.r);
    Ok(vec![
        kv("Call Theta (per day)", format_currency(g.theta_call_per_day())),
        kv("Put Theta (per day)", format_currency(g.theta_put_per_day())),
    ])
}

pub const SYNTHETIC_POSITION: Calculator = Calculator {
    id: "synthetic-position",
    name: "Synthetic Options Position",
    description: "Show how to replicate a stock or option position using other instruments.",
    category: Category::Options,
    inputs: &[InputField::number("strike", "Strike Price", "100")],
    compute: Compute::Pure(synthetic_position),
};

fn synthetic_position(i: &Inputs) -> Outcome {
    let k = i.number("strike")?;
    Ok(vec![
        kv("Synthetic Long Stock", format!("Long Call({k}) + Short Put({k})")),
        kv("Synthetic Short Stock", format!("Short Call({k}) + Long Put({k})")),
        kv("Synthetic Long Call", format!("Long Stock + Long Put({k})")),
        kv("Synthetic Long Put", format!("Short Stock + Long Call({k})")),
    ])
}

pub const ASSIGNMENT_PROBABILITY: Calculator = Calculator {
    id: "assignment-probability",
    name: "Options Assignment Probability",
    description: "Estimate the probability of an option being assigned (expiring in-the-money).",
    category: Category::Options,
    inputs: &[SPOT, STRIKE, EXPIRY, VOLATILITY, RATE],
    compute: Compute::Pure(assignment_probability),
};

fn assignment_probability(i: &Inputs) -> Outcome {
    let c = Contract::from_inputs(i)?;
    ensure(c.is_positive(), "Inputs must be positive.")?;
    let d2 = ((c.s / c.k).ln() + (c.r - c.v * c.v / 2.0) * c.t) / (c.v * c.t.sqrt());
    Ok(vec![
        kv("Call ITM Probability", format_percent(cdf(d2))),
        kv("Put ITM Probability", format_percent(cdf(-d2))),
    ])
}

pub const RISK_NEUTRAL_PROBABILITY: Calculator = Calculator {
    id: "risk-neutral-probability",
    name: "Risk-Neutral Probability",
    description: "Calculate the risk-neutral probability of an up-move in a binomial model.",
    category: Category::Options,
    inputs: &[
        RATE,
        InputField::number("t", "Time per Step (Years)", "0.25").info("e.g., For 3 months, use 0.25"),
        InputField::number("v", "Volatility (%)", "30"),
    ],
    compute: Compute::Pure(risk_neutral_probability),
};

fn risk_neutral_probability(i: &Inputs) -> Outcome {
    let rate = i.number("r")? / 100.0;
    let dt = i.number("t")?;
    let vol = i.number("v")? / 100.0;
    ensure(dt > 0.0 && vol > 0.0, "Time and Volatility must be positive.")?;

    let u = (vol * dt.sqrt()).exp();
    let d = 1.0 / u;
    let p = ((rate * dt).exp() - d) / (u - d);
    ensure(
        (0.0..=1.0).contains(&p),
        "Arbitrage opportunity detected. Check inputs.",
    )?;
    Ok(vec![
        kv("Probability of Up Move (p)", format_percent(p)),
        kv("Probability of Down Move (1-p)", format_percent(1.0 - p)),
    ])
}

pub const VOLATILITY_SURFACE_INTERPOLATOR: Calculator = Calculator {
    id: "volatility-surface-interpolator",
    name: "Volatility Surface Interpolator",
    description: "Estimate implied volatility using bilinear interpolation from known points on the vol surface.",
    category: Category::Options,
    inputs: &[
        InputField::number("k1", "Strike 1", "90"),
        InputField::number("t1", "Expiry 1 (Years)", "0.25"),
        InputField::number("k2", "Strike 2", "110"),
        InputField::number("t2", "Expiry 2 (Years)", "0.5"),
        InputField::number("vol11", "Volatility at (K1, T1) %", "32"),
        InputField::number("vol12", "Volatility at (K1, T2) %", "28"),
        InputField::number("vol21", "Volatility at (K2, T1) %", "25"),
        InputField::number("vol22", "Volatility at (K2, T2) %", "22"),
        InputField::number("k_target", "Target Strike", "102"),
        InputField::number("t_target", "Target Expiry (Years)", "0.35"),
    ],
    compute: Compute::Pure(volatility_surface),
};

fn volatility_surface(i: &Inputs) -> Outcome {
    let (k1, k2, t1, t2) = (i.number("k1")?, i.number("k2")?, i.number("t1")?, i.number("t2")?);
    let vol = |name: &str| i.number(name).map(|v| v / 100.0);
    let (v11, v12, v21, v22) = (vol("vol11")?, vol("vol12")?, vol("vol21")?, vol("vol22")?);
    let k = i.number("k_target")?;
    let t = i.number("t_target")?;
    ensure(
        k2 - k1 != 0.0 && t2 - t1 != 0.0,
        "Strike and Expiry points must be different.",
    )?;

    // Interpolate across strikes at each expiry, then across expiries.
    let wk = (k - k1) / (k2 - k1);
    let near = (1.0 - wk) * v11 + wk * v21;
    let far = (1.0 - wk) * v12 + wk * v22;
    let wt = (t - t1) / (t2 - t1);
    let interpolated = (1.0 - wt) * near + wt * far;

    Ok(vec![kv("Interpolated Implied Volatility", format_percent(interpolated))])
}

pub const PUT_CALL_PARITY: Calculator = Calculator {
    id: "put-call-parity",
    name: "Put-Call Parity Calculator",
    description: "Check for arbitrage opportunities using the put-call parity relationship.",
    category: Category::Options,
    inputs: &[
        InputField::number("callPrice", "Call Price", "7.50"),
        InputField::number("putPrice", "Put Price", "5.00"),
        InputField::number("stockPrice", "Underlying Stock Price", "100"),
        InputField::number("strikePrice", "Strike Price", "100"),
        InputField::number("time", "Time to Expiry (Years)", "0.5"),
        InputField::number("riskFreeRate", "Risk-Free Rate (%)", "5"),
    ],
    compute: Compute::Pure(put_call_parity),
};

fn put_call_parity(i: &Inputs) -> Outcome {
    let r = i.number("riskFreeRate")? / 100.0;
    let call_side = i.number("callPrice")? + i.number("strikePrice")? * (-r * i.number("time")?).exp();
    let put_side = i.number("putPrice")? + i.number("stockPrice")?;

    let difference = call_side - put_side;
    let conclusion = if difference.abs() > 0.01 {
        format!(
            "Arbitrage opportunity may exist. Difference: {}.",
            format_currency(difference)
        )
    } else {
        "Prices are consistent with Put-Call Parity.".to_string()
    };

    Ok(vec![
        kv("Call Side (C + K*e^-rt)", format_currency(call_side)),
        kv("Put Side (P + S)", format_currency(put_side)),
        kv("Conclusion", conclusion).with_info(
            "Put-Call Parity is a no-arbitrage principle stating that a portfolio of a long call and a short put must equal a forward contract on the underlying stock.",
        ),
    ])
}

pub const SKEW_SMILE: Calculator = Calculator {
    id: "skew-smile-calculator",
    name: "Skew & Smile Calculator",
    description: "Calculate implied volatility for different strikes to visualize the volatility skew or smile.",
    category: Category::Options,
    inputs: &[
        SPOT,
        EXPIRY,
        RATE,
        InputField::textarea(
            "options",
            "Options Data (Strike,Price,Type)",
            "90,10.50,call\n100,2.50,call\n110,0.50,call\n90,0.20,put\n100,2.20,put",
        )
        .info("One option per line: Strike, Market Price, Type (call/put)"),
    ],
    compute: Compute::Pure(skew_smile),
};

fn skew_smile(i: &Inputs) -> Outcome {
    let text = i.text("options");
    let rows = parse_rows(&text, 3)?;
    ensure(
        rows.len() >= 2,
        "At least two option prices are needed to show a skew.",
    )?;
    let s = i.number("s")?;
    let t = i.number("t")?;
    let r = i.number("r")? / 100.0;

    let mut quotes = Vec::with_capacity(rows.len());
    for row in &rows {
        let malformed = || CalcError::malformed(format!("Invalid format: {}", row.join(",")));
        let strike = parse_number(row[0]).ok_or_else(malformed)?;
        let price = parse_number(row[1]).ok_or_else(malformed)?;
        let side: OptionType = row[2].parse().map_err(|_| malformed())?;
        quotes.push((strike, implied_volatility(s, strike, t, r, price, side).ok()));
    }

    let rows = quotes
        .into_iter()
        .sorted_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(strike, iv)| {
            vec![
                Cell::from(format_number(strike, 2)),
                Cell::from(format_number(strike / s, 2)),
                Cell::from(iv.map_or_else(|| "Did not converge".to_string(), format_percent)),
            ]
        });
    Ok(vec![CalculationResult::table(
        "Implied Volatility Skew/Smile",
        ["Strike Price", "Moneyness (K/S)", "Implied Volatility"],
        rows,
    )])
}

pub const OPTIONS_ARBITRAGE_CHECKER: Calculator = Calculator {
    id: "options-arbitrage-checker",
    name: "Options Arbitrage Checker",
    description: "Check for butterfly, box, and conversion/reversal arbitrage opportunities.",
    category: Category::Options,
    inputs: &[
        SPOT,
        RATE,
        EXPIRY,
        InputField::textarea(
            "strikesAndPrices",
            "Options (Strike,Call,Put)",
            "95,6.50,1.20\n100,2.80,2.50\n105,0.90,5.50",
        )
        .info("One strike per line: Strike, Call Price, Put Price"),
    ],
    compute: Compute::Pure(options_arbitrage),
};

fn options_arbitrage(i: &Inputs) -> Outcome {
    let mut chain = parse_numeric_rows(&i.text("strikesAndPrices"), 3)?;
    ensure(
        chain.len() >= 3,
        "At least 3 strikes are needed for butterfly/box spreads.",
    )?;
    let s = i.number("s")?;
    let discount = (-i.number("r")? / 100.0 * i.number("t")?).exp();

    chain.sort_by(|a, b| a[0].total_cmp(&b[0]));
    let (low, mid, high) = (&chain[0], &chain[1], &chain[2]);
    let (strike, call, put) = (0, 1, 2);

    // --- 1. Butterfly ---
    let fly_cost = low[call] - 2.0 * mid[call] + high[call];
    if fly_cost < 0.0 {
        return Ok(vec![kv(
            "Arbitrage Found: Butterfly Spread",
            format!(
                "Buy 1 C({}), Sell 2 C({}), Buy 1 C({}) for a credit of {}.",
                low[strike],
                mid[strike],
                high[strike],
                format_currency(-fly_cost)
            ),
        )]);
    }

    // --- 2. Box spread ---
    let box_value = (mid[call] - mid[put]) - (low[call] - low[put]);
    let box_expected = (mid[strike] - low[strike]) * discount;
    if box_value < box_expected {
        return Ok(vec![kv(
            "Arbitrage Found: Box Spread",
            format!("Profit of {} per spread.", format_currency(box_expected - box_value)),
        )]);
    }

    // --- 3. Conversion / reversal ---
    let synthetic = mid[call] - mid[put];
    let synthetic_expected = s - mid[strike] * discount;
    if (synthetic - synthetic_expected).abs() > 0.1 {
        return Ok(vec![kv(
            "Arbitrage Found: Conversion/Reversal",
            format!(
                "Synthetic stock priced at {} vs expected {}.",
                format_currency(synthetic),
                format_currency(synthetic_expected)
            ),
        )]);
    }

    Ok(vec![kv(
        "Result",
        "No obvious arbitrage opportunities detected among the provided options.",
    )])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, table_of, value_of};
    use super::*;

    const SCENARIO: &[(&str, &str)] = &[("s", "100"), ("k", "105"), ("t", "0.25"), ("v", "20"), ("r", "5")];

    #[test]
    fn black_scholes_prices_both_sides() {
        let out = run(&BLACK_SCHOLES, SCENARIO).unwrap();
        assert_eq!(value_of(&out, "Call Option Price"), "$2.48");
        assert_eq!(value_of(&out, "Put Option Price"), "$6.17");
    }

    #[test]
    fn implied_volatility_round_trips_a_price() {
        let price = black_scholes(100.0, 105.0, 0.25, 0.3, 0.05, OptionType::Put);
        let price = price.to_string();
        let out = run(
            &IMPLIED_VOLATILITY,
            &[
                ("s", "100"),
                ("k", "105"),
                ("t", "0.25"),
                ("r", "5"),
                ("optionPrice", &price),
                ("optionType", "PUT"),
            ],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Implied Volatility (IV)"), "30.00%");
    }

    #[test]
    fn implied_volatility_rejects_unknown_sides_and_unreachable_prices() {
        let base = [("s", "100"), ("k", "105"), ("t", "0.25"), ("r", "5")];
        let mut inputs = base.to_vec();
        inputs.extend([("optionPrice", "2.5"), ("optionType", "straddle")]);
        let err = run(&IMPLIED_VOLATILITY, &inputs).unwrap_err();
        assert_eq!(err.to_string(), "Option type must be \"call\" or \"put\".");

        let mut inputs = base.to_vec();
        inputs.extend([("optionPrice", "150"), ("optionType", "call")]);
        let err = run(&IMPLIED_VOLATILITY, &inputs).unwrap_err();
        assert_eq!(err.to_string(), "Could not converge. Check inputs or market price.");
    }

    #[test]
    fn greeks_require_positive_inputs() {
        let err = run(&OPTIONS_GREEKS, &[("s", "100"), ("k", "105"), ("t", "0"), ("v", "20"), ("r", "5")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Inputs must be positive.");
    }

    #[test]
    fn lattices_agree_with_each_other() {
        let inputs = [("s", "100"), ("k", "100"), ("t", "1"), ("v", "20"), ("r", "5"), ("steps", "200")];
        let binomial = run(&BINOMIAL_OPTIONS, &inputs).unwrap();
        let trinomial = run(&TRINOMIAL_OPTIONS, &inputs).unwrap();
        assert_eq!(value_of(&binomial, "American Call Price (Binomial)"), "$10.44");
        assert_eq!(value_of(&trinomial, "American Call Price (Trinomial)"), "$10.45");
    }

    #[test]
    fn lattice_rejects_zero_steps() {
        let inputs = [("s", "100"), ("k", "100"), ("t", "1"), ("v", "20"), ("r", "5"), ("steps", "0")];
        assert!(run(&BINOMIAL_OPTIONS, &inputs).is_err());
    }

    #[test]
    fn lattice_rejects_runaway_step_counts() {
        for steps in ["1e20", "10001"] {
            let inputs = [("s", "100"), ("k", "100"), ("t", "1"), ("v", "20"), ("r", "5"), ("steps", steps)];
            for calculator in [&BINOMIAL_OPTIONS, &TRINOMIAL_OPTIONS] {
                let err = run(calculator, &inputs).unwrap_err();
                assert!(matches!(err, CalcError::Domain(_)), "{err:?}");
            }
        }
    }

    #[test]
    fn sensitivity_table_skips_non_positive_prices() {
        let out = run(&GREEKS_SENSITIVITY, &[("s", "5"), ("k", "5"), ("t", "0.25"), ("v", "30"), ("r", "5")]).unwrap();
        // 5 - 10 + 2.5n > 0 only for n = 3..=8.
        assert_eq!(table_of(&out).rows.len(), 6);
    }

    #[test]
    fn butterfly_arbitrage_is_detected_first() {
        let out = run(
            &OPTIONS_ARBITRAGE_CHECKER,
            &[("s", "100"), ("r", "5"), ("t", "0.25"), ("strikesAndPrices", "105,1,5\n95,6,1\n100,4,2.5")],
        )
        .unwrap();
        assert_eq!(
            value_of(&out, "Arbitrage Found: Butterfly Spread"),
            "Buy 1 C(95), Sell 2 C(100), Buy 1 C(105) for a credit of $1.00."
        );
    }

    #[test]
    fn skew_table_is_sorted_by_strike() {
        let call_110 = black_scholes(100.0, 110.0, 0.25, 0.25, 0.05, OptionType::Call).to_string();
        let put_90 = black_scholes(100.0, 90.0, 0.25, 0.35, 0.05, OptionType::Put).to_string();
        let data = format!("110,{call_110},call\n90,{put_90},put");
        let out = run(&SKEW_SMILE, &[("s", "100"), ("t", "0.25"), ("r", "5"), ("options", &data)]).unwrap();
        let table = table_of(&out);
        assert_eq!(table.rows[0][0], Cell::from("90.00"));
        assert_eq!(table.rows[0][2], Cell::from("35.00%"));
        assert_eq!(table.rows[1][2], Cell::from("25.00%"));
    }

    #[test]
    fn volatility_surface_interpolates_bilinearly() {
        let out = run(
            &VOLATILITY_SURFACE_INTERPOLATOR,
            &[
                ("k1", "90"), ("t1", "0.25"), ("k2", "110"), ("t2", "0.5"),
                ("vol11", "30"), ("vol12", "30"), ("vol21", "20"), ("vol22", "20"),
                ("k_target", "100"), ("t_target", "0.4"),
            ],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Interpolated Implied Volatility"), "25.00%");
    }
}
