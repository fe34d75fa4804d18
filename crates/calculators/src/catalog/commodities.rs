use super::kv;
use crate::error::CalcError;
use crate::input::Inputs;
use crate::{Calculator, Compute, Outcome};
use core_types::{format_currency, format_number, Category, InputField};
use std::str::FromStr;

pub const CALCULATORS: &[Calculator] = &[
    COPPER_PLATINUM_PL,
    CARBON_CREDIT_PL,
    WEATHER_DERIVATIVES,
    ELECTRICITY_FUTURES_PL,
    SHIPPING_FREIGHT_INDEX,
    BRENT_WTI_SPREAD,
    GRAIN_FUTURES_PL,
    NATURAL_GAS_CONVERTER,
];

const CREDITS_PER_CONTRACT: f64 = 1000.0;
const BARRELS_PER_CONTRACT: f64 = 1000.0;
const THERMS_PER_MMBTU: f64 = 10.0;
const KWH_PER_MMBTU: f64 = 293.071;

/// `(exit - entry) * units * contracts`, the P&L of a linear futures position.
fn linear_pl(i: &Inputs, units: f64) -> Result<f64, CalcError> {
    Ok((i.number("exitPrice")? - i.number("entryPrice")?) * units * i.number("contracts")?)
}

pub const COPPER_PLATINUM_PL: Calculator = Calculator {
    id: "copper-platinum-pl",
    name: "Copper/Platinum P&L",
    description: "Calculate P&L for Copper (25,000 lbs) or Platinum (50 oz) futures.",
    category: Category::Commodities,
    inputs: &[
        InputField::number("entryPrice", "Entry Price", "4.50"),
        InputField::number("exitPrice", "Exit Price", "4.65"),
        InputField::number("contractSize", "Contract Size (Multiplier)", "25000")
            .info("Copper: 25000, Platinum: 50"),
        InputField::number("contracts", "Number of Contracts", "1"),
    ],
    compute: Compute::Pure(copper_platinum_pl),
};

fn copper_platinum_pl(i: &Inputs) -> Outcome {
    let pnl = linear_pl(i, i.number("contractSize")?)?;
    Ok(vec![kv("Profit/Loss", format_currency(pnl))])
}

pub const CARBON_CREDIT_PL: Calculator = Calculator {
    id: "carbon-credit-pl",
    name: "Carbon Credit P&L",
    description: "Calculate P&L for a standard carbon credit futures contract (1,000 credits).",
    category: Category::Commodities,
    inputs: &[
        InputField::number("entryPrice", "Entry Price per Credit", "15.75"),
        InputField::number("exitPrice", "Exit Price per Credit", "16.50"),
        InputField::number("contracts", "Number of Contracts", "5"),
    ],
    compute: Compute::Pure(carbon_credit_pl),
};

fn carbon_credit_pl(i: &Inputs) -> Outcome {
    let pnl = linear_pl(i, CREDITS_PER_CONTRACT)?;
    Ok(vec![kv("Profit/Loss", format_currency(pnl))])
}

pub const WEATHER_DERIVATIVES: Calculator = Calculator {
    id: "weather-derivatives",
    name: "Weather Derivatives (HDD/CDD)",
    description: "Calculate the payout of a heating/cooling degree day futures contract.",
    category: Category::Commodities,
    inputs: &[
        InputField::number("hdd_cdd_index", "Final HDD/CDD Index Value", "850"),
        InputField::number("strike", "Strike Level", "800"),
        InputField::number("tickValue", "Value per Index Point ($)", "20"),
        InputField::text("position", "Position (Long/Short)", "Long")
            .info("Enter \"Long\" or \"Short\""),
    ],
    compute: Compute::Pure(weather_derivatives),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Long,
    Short,
}

impl FromStr for Position {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(Position::Long),
            "short" => Ok(Position::Short),
            _ => Err(CalcError::domain("Position must be \"Long\" or \"Short\".")),
        }
    }
}

fn weather_derivatives(i: &Inputs) -> Outcome {
    let position: Position = i.text("position").parse()?;
    let points = i.number("hdd_cdd_index")? - i.number("strike")?;
    let signed = match position {
        Position::Long => points,
        Position::Short => -points,
    };
    Ok(vec![kv(
        "Contract Payout",
        format_currency(signed * i.number("tickValue")?),
    )])
}

pub const ELECTRICITY_FUTURES_PL: Calculator = Calculator {
    id: "electricity-futures-pl",
    name: "Electricity Futures P&L",
    description: "Calculate P&L for an electricity futures contract based on MWh.",
    category: Category::Commodities,
    inputs: &[
        InputField::number("entryPrice", "Entry Price per MWh", "45.50"),
        InputField::number("exitPrice", "Exit Price per MWh", "48.00"),
        InputField::number("mwhPerContract", "MWh per Contract", "736").info(
            "e.g., Peak contract for a month with 31 days is 16h*23 weekdays*2 MWh/h",
        ),
        InputField::number("contracts", "Number of Contracts", "1"),
    ],
    compute: Compute::Pure(electricity_futures_pl),
};

fn electricity_futures_pl(i: &Inputs) -> Outcome {
    let pnl = linear_pl(i, i.number("mwhPerContract")?)?;
    Ok(vec![kv("Profit/Loss", format_currency(pnl))])
}

pub const SHIPPING_FREIGHT_INDEX: Calculator = Calculator {
    id: "shipping-freight-index",
    name: "Shipping Freight Index P&L",
    description: "Calculate the P&L for a shipping freight futures contract (e.g., Baltic Dry Index).",
    category: Category::Commodities,
    inputs: &[
        InputField::number("entryPrice", "Entry Price (Index Points)", "1500"),
        InputField::number("exitPrice", "Exit Price (Index Points)", "1550"),
        InputField::number("multiplier", "Multiplier ($ per point)", "10"),
        InputField::number("contracts", "Number of Contracts", "1"),
    ],
    compute: Compute::Pure(shipping_freight_index),
};

fn shipping_freight_index(i: &Inputs) -> Outcome {
    let pnl = linear_pl(i, i.number("multiplier")?)?;
    Ok(vec![kv("Profit/Loss", format_currency(pnl))])
}

pub const BRENT_WTI_SPREAD: Calculator = Calculator {
    id: "brent-wti-spread",
    name: "Brent-WTI Spread P&L",
    description: "Calculate the spread between Brent and WTI crude oil and the P&L from trading it.",
    category: Category::Commodities,
    inputs: &[
        InputField::number("brentPrice", "Brent Crude Price", "85.50"),
        InputField::number("wtiPrice", "WTI Crude Price", "81.00"),
        InputField::number("entrySpread", "Your Entry Spread", "4.00"),
        InputField::number("contracts", "Number of Contracts", "10"),
    ],
    compute: Compute::Pure(brent_wti_spread),
};

fn brent_wti_spread(i: &Inputs) -> Outcome {
    let spread = i.number("brentPrice")? - i.number("wtiPrice")?;
    let pnl = (spread - i.number("entrySpread")?) * BARRELS_PER_CONTRACT * i.number("contracts")?;
    Ok(vec![
        kv("Current Spread", format_currency(spread)),
        kv("Total P&L", format_currency(pnl)),
    ])
}

pub const GRAIN_FUTURES_PL: Calculator = Calculator {
    id: "grain-futures-pl",
    name: "Grain Futures P&L (Corn/Wheat/Soy)",
    description: "Calculate P&L for standard grain futures contracts.",
    category: Category::Commodities,
    inputs: &[
        InputField::number("entryPrice", "Entry Price (Cents per bushel)", "450.25"),
        InputField::number("exitPrice", "Exit Price (Cents per bushel)", "460.50"),
        InputField::number("contractSize", "Contract Size (Bushels)", "5000")
            .info("Corn, Wheat, Soybeans are typically 5,000 bushels"),
        InputField::number("contracts", "Number of Contracts", "1"),
    ],
    compute: Compute::Pure(grain_futures_pl),
};

fn grain_futures_pl(i: &Inputs) -> Outcome {
    // Quoted in cents per bushel.
    let pnl = linear_pl(i, i.number("contractSize")?)? / 100.0;
    Ok(vec![kv("Profit/Loss", format_currency(pnl))])
}

pub const NATURAL_GAS_CONVERTER: Calculator = Calculator {
    id: "natural-gas-converter",
    name: "Natural Gas Converter",
    description: "Convert between common natural gas units (MMBtu, therms, kWh).",
    category: Category::Commodities,
    inputs: &[
        InputField::number("value", "Value", "1"),
        InputField::text("fromUnit", "From Unit", "MMBtu").info("Enter MMBtu, therm, or kWh"),
    ],
    compute: Compute::Pure(natural_gas_converter),
};

fn natural_gas_converter(i: &Inputs) -> Outcome {
    let value = i.number("value")?;
    let mmbtu = match i.text("fromUnit").trim().to_lowercase().as_str() {
        "mmbtu" => value,
        "therm" => value / THERMS_PER_MMBTU,
        "kwh" => value / KWH_PER_MMBTU,
        _ => {
            return Err(CalcError::domain(
                "Invalid \"From Unit\". Use MMBtu, therm, or kWh.",
            ));
        }
    };
    Ok(vec![
        kv("MMBtu (Million British Thermal Units)", format_number(mmbtu, 4)),
        kv("Therms", format_number(mmbtu * THERMS_PER_MMBTU, 4)),
        kv("kWh (Kilowatt-hours)", format_number(mmbtu * KWH_PER_MMBTU, 4)),
    ])
}
