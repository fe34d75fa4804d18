use super::{ensure, kv};
use crate::input::Inputs;
use crate::{Calculator, Compute, Outcome};
use core_types::{format_currency, format_number, Category, InputField};

pub const CALCULATORS: &[Calculator] = &[
    CURRENCY_CONVERTER,
    PIP_VALUE,
    LOT_SIZE,
    FUTURES_PL,
    SWAP,
];

/// Units in one standard lot.
const STANDARD_LOT: f64 = 100_000.0;

/// One pip for non-JPY quoted pairs.
const PIP: f64 = 0.0001;

pub const CURRENCY_CONVERTER: Calculator = Calculator {
    id: "currency-converter",
    name: "Currency Converter",
    description: "Convert an amount from one currency to another using a specific exchange rate.",
    category: Category::ForexAndFutures,
    inputs: &[
        InputField::number("amount", "Amount", "100"),
        InputField::number("exchangeRate", "Exchange Rate", "1.085")
            .info("e.g., Rate for EUR/USD to convert EUR to USD"),
    ],
    compute: Compute::Pure(currency_converter),
};

fn currency_converter(i: &Inputs) -> Outcome {
    let converted = i.number("amount")? * i.number("exchangeRate")?;
    Ok(vec![kv("Converted Amount", format_number(converted, 2))])
}

pub const PIP_VALUE: Calculator = Calculator {
    id: "pip-value",
    name: "Pip Value",
    description: "Calculate the value of a single pip for a forex trade.",
    category: Category::ForexAndFutures,
    inputs: &[
        InputField::number("lotSize", "Lot Size (Units)", "100000")
            .info("Standard=100k, Mini=10k, Micro=1k"),
        InputField::number("quoteCurrencyRate", "Quote Currency to USD Rate", "1.00").info(
            "e.g., for EUR/JPY, use USD/JPY rate. For USD pairs (EUR/USD), use 1.",
        ),
    ],
    compute: Compute::Pure(pip_value),
};

fn pip_value(i: &Inputs) -> Outcome {
    let quote_rate = i.number("quoteCurrencyRate")?;
    ensure(quote_rate > 0.0, "Exchange rate must be positive.")?;
    let value = PIP / quote_rate * i.number("lotSize")?;
    Ok(vec![kv("Pip Value", format_currency(value))])
}

pub const LOT_SIZE: Calculator = Calculator {
    id: "lot-size",
    name: "Lot Size",
    description: "Calculate the appropriate Forex lot size based on account risk.",
    category: Category::ForexAndFutures,
    inputs: &[
        InputField::number("accountBalance", "Account Balance", "10000"),
        InputField::number("riskPercentage", "Risk per Trade (%)", "1.5"),
        InputField::number("stopLossPips", "Stop Loss (Pips)", "50"),
        InputField::number("pipValue", "Pip Value per Standard Lot", "10"),
    ],
    compute: Compute::Pure(lot_size),
};

fn lot_size(i: &Inputs) -> Outcome {
    let stop_pips = i.number("stopLossPips")?;
    let pip_value = i.number("pipValue")?;
    ensure(
        stop_pips > 0.0 && pip_value > 0.0,
        "Stop Loss and Pip Value must be positive.",
    )?;

    let risk = i.number("accountBalance")? * i.number("riskPercentage")? / 100.0;
    let lots = risk / (stop_pips * pip_value);
    Ok(vec![
        kv("Risk Amount", format_currency(risk)),
        kv("Lot Size", format_number(lots, 2)),
        kv("Units", format_number(lots * STANDARD_LOT, 0)),
    ])
}

pub const FUTURES_PL: Calculator = Calculator {
    id: "futures-pl",
    name: "Futures P&L",
    description: "Calculate the P&L for a generic futures contract.",
    category: Category::ForexAndFutures,
    inputs: &[
        InputField::number("entryPrice", "Entry Price", "2.850"),
        InputField::number("exitPrice", "Exit Price", "2.950"),
        InputField::number("multiplier", "Contract Multiplier", "10000")
            .info("e.g., Nat Gas: 10000, Crude Oil: 1000, S&P 500 E-mini: 50"),
        InputField::number("contracts", "Number of Contracts", "1"),
    ],
    compute: Compute::Pure(futures_pl),
};

fn futures_pl(i: &Inputs) -> Outcome {
    let move_ = i.number("exitPrice")? - i.number("entryPrice")?;
    let pnl = move_ * i.number("multiplier")? * i.number("contracts")?;
    Ok(vec![kv("Profit/Loss", format_currency(pnl))])
}

pub const SWAP: Calculator = Calculator {
    id: "swap-calculator",
    name: "Swap (Overnight Interest)",
    description: "Calculate the overnight interest (swap) credited or debited for a forex position.",
    category: Category::ForexAndFutures,
    inputs: &[
        InputField::number("lotSize", "Lot Size (Units)", "100000"),
        InputField::number("swapRate", "Swap Rate (in points)", "-0.85")
            .info("Use negative for debit, positive for credit"),
        InputField::number("pipValue", "Pip Value (in USD)", "10"),
    ],
    compute: Compute::Pure(swap),
};

fn swap(i: &Inputs) -> Outcome {
    // Swap points are quoted in tenths of a pip.
    let pips = i.number("swapRate")? / 10.0;
    let lots = i.number("lotSize")? / STANDARD_LOT;
    Ok(vec![kv(
        "Overnight Swap Cost/Credit",
        format_currency(pips * i.number("pipValue")? * lots),
    )])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, value_of};
    use super::*;

    #[test]
    fn conversion_and_pip_value() {
        let out = run(&CURRENCY_CONVERTER, &[("amount", "1000"), ("exchangeRate", "1.085")]).unwrap();
        assert_eq!(value_of(&out, "Converted Amount"), "1,085.00");

        let out = run(&PIP_VALUE, &[("lotSize", "100000"), ("quoteCurrencyRate", "1")]).unwrap();
        assert_eq!(value_of(&out, "Pip Value"), "$10.00");

        let err = run(&PIP_VALUE, &[("lotSize", "100000"), ("quoteCurrencyRate", "0")]).unwrap_err();
        assert_eq!(err.to_string(), "Exchange rate must be positive.");
    }

    #[test]
    fn lot_size_from_risk() {
        let out = run(
            &LOT_SIZE,
            &[("accountBalance", "10000"), ("riskPercentage", "1"), ("stopLossPips", "50"), ("pipValue", "10")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Risk Amount"), "$100.00");
        assert_eq!(value_of(&out, "Lot Size"), "0.20");
        assert_eq!(value_of(&out, "Units"), "20,000");
    }

    #[test]
    fn futures_short_loss_and_swap_debit() {
        let out = run(
            &FUTURES_PL,
            &[("entryPrice", "4000"), ("exitPrice", "3990"), ("multiplier", "50"), ("contracts", "2")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Profit/Loss"), "-$1,000.00");

        let out = run(&SWAP, &[("lotSize", "200000"), ("swapRate", "-5"), ("pipValue", "10")]).unwrap();
        assert_eq!(value_of(&out, "Overnight Swap Cost/Credit"), "-$10.00");
    }
}
