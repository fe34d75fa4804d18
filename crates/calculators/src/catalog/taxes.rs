//! Capital-gains lot matching and wash-sale screening.

use super::{ensure, kv};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::parse::{non_blank_lines, parse_number};
use crate::{Calculator, Compute, Outcome};
use chrono::NaiveDate;
use core_types::{format_currency, format_number, CalculationResult, Category, Cell, InputField};
use itertools::Itertools;
use std::str::FromStr;

pub const CALCULATORS: &[Calculator] = &[CRYPTO_TAX, WASH_SALE_DETECTOR];

/// Quantities below this are treated as fully matched.
const QTY_EPSILON: f64 = 1e-8;

/// How sold units are matched against earlier purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CostMethod {
    Fifo,
    Lifo,
    /// Highest cost first.
    Hifo,
    /// Average cost basis across every lot.
    Acb,
}

impl FromStr for CostMethod {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "" | "FIFO" => Ok(CostMethod::Fifo),
            "LIFO" => Ok(CostMethod::Lifo),
            "HIFO" => Ok(CostMethod::Hifo),
            "ACB" => Ok(CostMethod::Acb),
            _ => Err(CalcError::domain(
                "Accounting method must be FIFO, LIFO, HIFO, or ACB.",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Lot {
    qty: f64,
    price: f64,
}

fn parse_lot(line: &str) -> Result<Lot, CalcError> {
    let (qty, price) = line
        .split(',')
        .map(str::trim)
        .collect_tuple()
        .ok_or_else(|| CalcError::malformed(format!("Invalid format for buy lot: \"{line}\"")))?;
    match (parse_number(qty), parse_number(price)) {
        (Some(qty), Some(price)) if qty > 0.0 && price >= 0.0 => Ok(Lot { qty, price }),
        _ => Err(CalcError::malformed(format!(
            "Invalid numbers in buy lot: \"{line}\""
        ))),
    }
}

/// Cost basis of selling `amount` units out of `lots` (given in purchase order).
fn cost_basis(lots: &[Lot], amount: f64, method: CostMethod) -> f64 {
    let ordered: Vec<Lot> = match method {
        CostMethod::Acb => {
            let qty: f64 = lots.iter().map(|l| l.qty).sum();
            let cost: f64 = lots.iter().map(|l| l.qty * l.price).sum();
            return amount * cost / qty;
        }
        CostMethod::Fifo => lots.to_vec(),
        CostMethod::Lifo => lots.iter().rev().copied().collect(),
        CostMethod::Hifo => lots
            .iter()
            .copied()
            .sorted_by(|a, b| b.price.total_cmp(&a.price))
            .collect(),
    };

    let mut remaining = amount;
    let mut basis = 0.0;
    for lot in ordered {
        if remaining <= QTY_EPSILON {
            break;
        }
        let take = remaining.min(lot.qty);
        basis += take * lot.price;
        remaining -= take;
    }
    basis
}

pub const CRYPTO_TAX: Calculator = Calculator {
    id: "crypto-tax-advanced",
    name: "Crypto Tax (FIFO/LIFO/HIFO/ACB)",
    description: "Calculate capital gains for a crypto sale using various accounting methods.",
    category: Category::Taxes,
    inputs: &[
        InputField::text("method", "Accounting Method", "FIFO")
            .default_value("FIFO")
            .info("Enter FIFO, LIFO, HIFO, or ACB"),
        InputField::textarea(
            "buys",
            "Buy Lots (Quantity,Price)",
            "0.5,30000\n0.2,40000\n0.3,35000",
        )
        .info("Enter each buy on a new line: Quantity,Price per coin"),
        InputField::number("sellAmount", "Amount of Coin to Sell", "0.6"),
        InputField::number("sellPrice", "Sell Price per Coin", "45000"),
    ],
    compute: Compute::Pure(crypto_tax),
};

fn crypto_tax(i: &Inputs) -> Outcome {
    let method: CostMethod = i.text("method").parse()?;
    let text = i.text("buys");
    let lots = non_blank_lines(&text)
        .map(parse_lot)
        .collect::<Result<Vec<_>, _>>()?;
    ensure(!lots.is_empty(), "No buy lots entered.")?;

    let amount = i.number("sellAmount")?;
    let price = i.number("sellPrice")?;
    let bought: f64 = lots.iter().map(|l| l.qty).sum();
    ensure(
        amount <= bought,
        &format!(
            "Amount to sell ({}) exceeds total quantity bought ({}).",
            format_number(amount, 8),
            format_number(bought, 8)
        ),
    )?;

    let basis = cost_basis(&lots, amount, method);
    let proceeds = amount * price;
    Ok(vec![
        kv("Total Cost Basis", format_currency(basis)),
        kv("Total Proceeds", format_currency(proceeds)),
        kv("Capital Gain/Loss", format_currency(proceeds - basis)),
    ])
}

pub const WASH_SALE_DETECTOR: Calculator = Calculator {
    id: "wash-sale-detector",
    name: "Wash Sale Detector",
    description: "Identify potential wash sales from a series of transactions.",
    category: Category::Taxes,
    inputs: &[InputField::textarea(
        "trades",
        "Transactions (Date,Type,Qty,Price)",
        "2023-01-10,BUY,100,50\n2023-02-15,SELL,100,45\n2023-03-01,BUY,100,48",
    )
    .info("One trade per line: YYYY-MM-DD, BUY/SELL, Quantity, Price")],
    compute: Compute::Pure(wash_sale_detector),
};

const WASH_WINDOW_DAYS: i64 = 30;

const NO_WASH_SALES: &str = "No potential wash sales detected. Note: This is a simplified FIFO check and does not track cost basis adjustments across sales.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy)]
struct Transaction {
    date: NaiveDate,
    side: Side,
    qty: f64,
    price: f64,
}

/// Parses line `number` (1-based) of the transaction list.
fn parse_transaction(number: usize, line: &str) -> Result<Transaction, CalcError> {
    let (date, side, qty, price) = line
        .split(',')
        .map(str::trim)
        .collect_tuple()
        .ok_or_else(|| CalcError::malformed(format!("Invalid format on line {number}")))?;
    let side = match side.to_uppercase().as_str() {
        "BUY" => Side::Buy,
        "SELL" => Side::Sell,
        _ => {
            return Err(CalcError::malformed(format!(
                "Invalid transaction type on line {number}: must be BUY or SELL"
            )))
        }
    };
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| CalcError::malformed(format!("Invalid date on line {number}")))?;
    match (parse_number(qty), parse_number(price)) {
        (Some(qty), Some(price)) => Ok(Transaction {
            date,
            side,
            qty,
            price,
        }),
        _ => Err(CalcError::malformed(format!("Invalid number on line {number}"))),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct WashSale {
    sale: NaiveDate,
    loss: f64,
    trigger: NaiveDate,
}

/// Flags every losing sale with a purchase within 30 days on either side.
///
/// Each sale's basis is matched FIFO against the buys on or before its date, as if
/// no earlier sale had consumed them.
fn find_wash_sales(trades: &[Transaction]) -> Vec<WashSale> {
    let buys: Vec<&Transaction> = trades.iter().filter(|t| t.side == Side::Buy).collect();

    trades
        .iter()
        .filter(|t| t.side == Side::Sell)
        .filter_map(|sale| {
            let mut remaining = sale.qty;
            let mut basis = 0.0;
            for buy in buys.iter().filter(|b| b.date <= sale.date) {
                let take = remaining.min(buy.qty);
                basis += take * buy.price;
                remaining -= take;
                if remaining <= QTY_EPSILON {
                    break;
                }
            }

            let loss = basis - sale.qty * sale.price;
            if loss <= 0.0 {
                return None;
            }
            buys.iter()
                .find(|b| (b.date - sale.date).num_days().abs() <= WASH_WINDOW_DAYS)
                .map(|trigger| WashSale {
                    sale: sale.date,
                    loss,
                    trigger: trigger.date,
                })
        })
        .collect()
}

fn wash_sale_detector(i: &Inputs) -> Outcome {
    let text = i.text("trades");
    let mut trades = non_blank_lines(&text)
        .enumerate()
        .map(|(idx, line)| parse_transaction(idx + 1, line))
        .collect::<Result<Vec<_>, _>>()?;
    ensure(trades.len() >= 2, "At least two transactions are needed.")?;
    trades.sort_by_key(|t| t.date);

    let washes = find_wash_sales(&trades);
    if washes.is_empty() {
        return Ok(vec![kv("Result", NO_WASH_SALES)]);
    }

    let rows = washes.iter().map(|w| {
        vec![
            Cell::from(w.sale.format("%Y-%m-%d").to_string()),
            Cell::from(format_currency(w.loss)),
            Cell::from(w.trigger.format("%Y-%m-%d").to_string()),
        ]
    });
    Ok(vec![CalculationResult::table(
        "Potential Wash Sales Identified (FIFO)",
        ["Sale Date", "Disallowed Loss", "Triggering Buy Date"],
        rows,
    )])
}
