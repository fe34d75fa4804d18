use super::{ensure, kv};
use crate::error::CalcError;
use crate::input::Inputs;
use crate::parse::{parse_number, parse_rows};
use crate::{Calculator, Compute, Outcome};
use core_types::{
    format_currency, format_number, format_percent, CalculationResult, Category, Cell, InputField,
};
use itertools::Itertools;

pub const CALCULATORS: &[Calculator] = &[
    CRYPTO_PROFIT,
    IMPERMANENT_LOSS_GAIN,
    LP_ROI,
    CRYPTO_STAKING,
    AMM_SLIPPAGE,
    GAS_FEE,
    DEFI_APY,
    MINING_PROFITABILITY,
    TOKEN_EMISSIONS,
    STABLECOIN_YIELD_AGGREGATOR,
    VALIDATOR_REWARDS,
    L2_COST_COMPARISON,
    LP_IMPERMANENT_GAIN_ZONES,
    YIELD_FARMING_ROI,
    REBASE_TOKEN,
    MINING_BREAK_EVEN_TIME,
];

const GWEI_PER_ETH: f64 = 1_000_000_000.0;

/// Ten-minute blocks.
const BLOCKS_PER_DAY: f64 = 24.0 * 60.0 / 10.0;

const DAYS_PER_MONTH: f64 = 30.4;

fn row_number(field: &str, line: &str) -> Result<f64, CalcError> {
    parse_number(field)
        .filter(|n| n.is_finite())
        .ok_or_else(|| CalcError::malformed(format!("Invalid number in line: \"{line}\"")))
}

pub const CRYPTO_PROFIT: Calculator = Calculator {
    id: "crypto-profit",
    name: "Crypto Profit",
    description: "Calculate profit or loss from a cryptocurrency trade.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("buyPrice", "Buy Price per Coin", "40000"),
        InputField::number("sellPrice", "Sell Price per Coin", "45000"),
        InputField::number("quantity", "Quantity (e.g., BTC)", "0.5"),
        InputField::number("fees", "Total Fees (USD)", "50").default_value("0"),
    ],
    compute: Compute::Pure(crypto_profit),
};

fn crypto_profit(i: &Inputs) -> Outcome {
    let gross = (i.number("sellPrice")? - i.number("buyPrice")?) * i.number("quantity")?;
    Ok(vec![kv(
        "Net Profit/Loss",
        format_currency(gross - i.number_or("fees", 0.0)?),
    )])
}

pub const IMPERMANENT_LOSS_GAIN: Calculator = Calculator {
    id: "impermanent-loss-gain",
    name: "Impermanent Loss / Gain",
    description: "Calculate the IL/IG when providing liquidity vs. HODLing.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("priceChangeA", "Price Change of Asset A (%)", "50"),
        InputField::number("priceChangeB", "Price Change of Asset B (%)", "0")
            .default_value("0")
            .info("For stablecoin pairs, leave at 0"),
    ],
    compute: Compute::Pure(impermanent_loss_gain),
};

fn impermanent_loss_gain(i: &Inputs) -> Outcome {
    let a = 1.0 + i.number("priceChangeA")? / 100.0;
    let b = 1.0 + i.number_or("priceChangeB", 0.0)? / 100.0;
    ensure(a >= 0.0 && b >= 0.0, "Price change cannot be less than -100%.")?;

    // 50/50 constant-product pool against holding the same two assets.
    let hodl = 0.5 * a + 0.5 * b;
    let lp = (a * b).sqrt();
    Ok(vec![kv("Impermanent Loss/Gain", format_percent(lp / hodl - 1.0))])
}

pub const LP_ROI: Calculator = Calculator {
    id: "lp-roi",
    name: "Liquidity Pool ROI",
    description: "Estimate the ROI from providing liquidity, including fees and impermanent loss.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("initialValue", "Initial Investment (USD)", "1000"),
        InputField::number("finalValue", "Final Value of LP Tokens (USD)", "1100"),
        InputField::number("feesEarned", "Fees Earned (USD)", "50"),
    ],
    compute: Compute::Pure(lp_roi),
};

fn lp_roi(i: &Inputs) -> Outcome {
    let initial = i.number("initialValue")?;
    ensure(initial > 0.0, "Initial investment must be positive.")?;
    let total = i.number("finalValue")? + i.number("feesEarned")?;
    Ok(vec![kv("Net ROI", format_percent(total / initial - 1.0))])
}

pub const CRYPTO_STAKING: Calculator = Calculator {
    id: "crypto-staking",
    name: "Crypto Staking",
    description: "Estimate earnings from staking cryptocurrency.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("initialAmount", "Amount Staked (Coins)", "10"),
        InputField::number("apy", "Staking APY (%)", "5"),
        InputField::number("days", "Staking Duration (Days)", "365"),
        InputField::number("coinPrice", "Current Coin Price (USD)", "3000"),
    ],
    compute: Compute::Pure(crypto_staking),
};

fn crypto_staking(i: &Inputs) -> Outcome {
    let staked = i.number("initialAmount")?;
    let daily = (1.0 + i.number("apy")? / 100.0).powf(1.0 / 365.0) - 1.0;
    let rewards = staked * ((1.0 + daily).powf(i.number("days")?) - 1.0);
    let total = staked + rewards;
    Ok(vec![
        kv("Total Rewards (Coins)", format_number(rewards, 8)),
        kv("Total Coins after Staking", format_number(total, 8)),
        kv("Total Value (USD)", format_currency(total * i.number("coinPrice")?)),
    ])
}

pub const AMM_SLIPPAGE: Calculator = Calculator {
    id: "amm-slippage",
    name: "AMM Slippage",
    description: "Estimate the price slippage in a constant product (x*y=k) automated market maker pool.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("tokenA_balance", "Token A Pool Balance", "1000"),
        InputField::number("tokenB_balance", "Token B Pool Balance", "1000000"),
        InputField::number("tradeAmountA", "Amount of Token A to Trade", "50"),
    ],
    compute: Compute::Pure(amm_slippage),
};

fn amm_slippage(i: &Inputs) -> Outcome {
    let reserve_a = i.number("tokenA_balance")?;
    let reserve_b = i.number("tokenB_balance")?;
    let amount_in = i.number("tradeAmountA")?;
    ensure(
        reserve_a > 0.0 && reserve_b > 0.0,
        "Pool balances must be positive.",
    )?;

    let k = reserve_a * reserve_b;
    let spot = reserve_b / reserve_a;
    let amount_out = reserve_b - k / (reserve_a + amount_in);
    ensure(amount_out > 0.0, "Trade size may be too large for the pool.")?;

    let effective = amount_out / amount_in;
    Ok(vec![
        kv("Tokens B Received", format_number(amount_out, 6)),
        kv("Effective Price (B per A)", format_number(effective, 4)),
        kv("Price Slippage", format_percent(1.0 - effective / spot)),
    ])
}

pub const GAS_FEE: Calculator = Calculator {
    id: "gas-fee",
    name: "Gas Fee Estimator",
    description: "Calculate the transaction fee for an on-chain transaction.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("gasUnits", "Gas Units", "21000"),
        InputField::number("gasPrice", "Gas Price (Gwei)", "20"),
        InputField::number("ethPrice", "ETH Price (USD)", "3000"),
    ],
    compute: Compute::Pure(gas_fee),
};

fn gas_fee(i: &Inputs) -> Outcome {
    let fee_eth = i.number("gasUnits")? * i.number("gasPrice")? / GWEI_PER_ETH;
    let fee_usd = fee_eth * i.number("ethPrice")?;
    Ok(vec![kv(
        "Transaction Fee",
        format!("{} ({} ETH)", format_currency(fee_usd), format_number(fee_eth, 8)),
    )])
}

pub const DEFI_APY: Calculator = Calculator {
    id: "defi-apy",
    name: "DeFi Lending/Borrowing APY",
    description: "Calculate the effective APY from an APR with periodic compounding.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("apr", "Stated APR (%)", "10"),
        InputField::number("compounds", "Compounds per Year", "365"),
    ],
    compute: Compute::Pure(defi_apy),
};

fn defi_apy(i: &Inputs) -> Outcome {
    let apr = i.number("apr")? / 100.0;
    let n = i.number("compounds")?;
    ensure(n > 0.0, "Compounds per year must be positive.")?;
    Ok(vec![kv(
        "Effective APY",
        format_percent((1.0 + apr / n).powf(n) - 1.0),
    )])
}

pub const MINING_PROFITABILITY: Calculator = Calculator {
    id: "mining-profitability",
    name: "Mining Profitability",
    description: "Estimate the profitability of a cryptocurrency mining operation.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("hashrate", "Your Hashrate (TH/s)", "100"),
        InputField::number("powerConsumption", "Power Consumption (Watts)", "3000"),
        InputField::number("electricityCost", "Electricity Cost ($/kWh)", "0.10"),
        InputField::number("networkHashrate", "Network Hashrate (EH/s)", "600"),
        InputField::number("blockReward", "Block Reward (e.g., BTC)", "3.125"),
        InputField::number("coinPrice", "Coin Price (USD)", "60000"),
    ],
    compute: Compute::Pure(mining_profitability),
};

fn mining_profitability(i: &Inputs) -> Outcome {
    let network = i.number("networkHashrate")?;
    ensure(network > 0.0, "Network hashrate must be positive.")?;

    // TH/s against EH/s.
    let share = i.number("hashrate")? / 1000.0 / network;
    let revenue = share * BLOCKS_PER_DAY * i.number("blockReward")? * i.number("coinPrice")?;
    let power = i.number("powerConsumption")? / 1000.0 * 24.0 * i.number("electricityCost")?;
    let profit = revenue - power;
    Ok(vec![
        kv("Daily Revenue", format_currency(revenue)),
        kv("Daily Power Cost", format_currency(power)),
        kv("Daily Profit", format_currency(profit)),
        kv("Monthly Profit", format_currency(profit * 30.0)),
    ])
}

pub const TOKEN_EMISSIONS: Calculator = Calculator {
    id: "token-emissions",
    name: "Token Emissions / Inflation",
    description: "Project the future supply and inflation rate of a token.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("currentSupply", "Current Token Supply", "100000000"),
        InputField::number("emissionRate", "Emission Rate (Tokens per day)", "50000"),
        InputField::number("days", "Days to Project", "365"),
    ],
    compute: Compute::Pure(token_emissions),
};

fn token_emissions(i: &Inputs) -> Outcome {
    let supply = i.number("currentSupply")?;
    let days = i.number("days")?;
    ensure(supply > 0.0, "Current supply must be positive.")?;
    ensure(days > 0.0, "Days to project must be positive.")?;

    let future = supply + i.number("emissionRate")? * days;
    let inflation = future / supply - 1.0;
    Ok(vec![
        kv("Future Supply", format_number(future, 0)),
        kv(format!("Inflation over {days} days"), format_percent(inflation)),
        kv(
            "Annualized Inflation Rate",
            format_percent((1.0 + inflation).powf(365.0 / days) - 1.0),
        ),
    ])
}

pub const STABLECOIN_YIELD_AGGREGATOR: Calculator = Calculator {
    id: "stablecoin-yield-aggregator",
    name: "Stablecoin Yield Aggregator",
    description: "Compare effective yields from multiple stablecoin lending platforms.",
    category: Category::Crypto,
    inputs: &[InputField::textarea(
        "platforms",
        "Platforms (Name,APY %,Fees %)",
        "Aave,5.2,0.1\nCompound,4.8,0.05\nYearn,6.1,2.2",
    )
    .info("One platform per line: Name, Stated APY, Total Fees %")],
    compute: Compute::Pure(stablecoin_yield_aggregator),
};

fn stablecoin_yield_aggregator(i: &Inputs) -> Outcome {
    let text = i.text("platforms");
    let rows = parse_rows(&text, 3)?;
    ensure(!rows.is_empty(), "No platforms entered.")?;

    let platforms = rows
        .iter()
        .map(|row| {
            let line = row.join(",");
            let apy = row_number(row[1], &line)? / 100.0;
            let fees = row_number(row[2], &line)? / 100.0;
            Ok((row[0], apy * (1.0 - fees)))
        })
        .collect::<Result<Vec<_>, CalcError>>()?;

    let table = platforms
        .into_iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .map(|(name, net)| vec![Cell::from(name), Cell::from(format_percent(net))]);
    Ok(vec![CalculationResult::table(
        "Net Yield Comparison",
        ["Platform", "Net APY"],
        table,
    )])
}

pub const VALIDATOR_REWARDS: Calculator = Calculator {
    id: "validator-rewards",
    name: "Validator Rewards",
    description: "Estimate the rewards for running a validator node on a Proof-of-Stake network.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("stakedAmount", "Total Amount Staked by Validator", "32"),
        InputField::number("totalNetworkStake", "Total Amount Staked on Network", "25000000"),
        InputField::number("annualIssuance", "Annual Network Issuance (New Coins)", "800000"),
        InputField::number("uptime", "Validator Uptime (%)", "99.5"),
    ],
    compute: Compute::Pure(validator_rewards),
};

fn validator_rewards(i: &Inputs) -> Outcome {
    let staked = i.number("stakedAmount")?;
    let network = i.number("totalNetworkStake")?;
    ensure(
        staked > 0.0 && network > 0.0,
        "Staked amounts must be positive.",
    )?;

    let reward = staked / network * i.number("annualIssuance")? * i.number("uptime")? / 100.0;
    Ok(vec![
        kv("Annual Rewards (Coins)", format_number(reward, 6)),
        kv("Effective APY", format_percent(reward / staked)),
    ])
}

pub const L2_COST_COMPARISON: Calculator = Calculator {
    id: "l2-cost-comparison",
    name: "Layer-2 Transaction Cost Comparison",
    description: "Compare the cost of a transaction on Ethereum L1 vs. various Layer-2 solutions.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("l1_gas", "L1 Gas Fee (USD)", "35.00"),
        InputField::textarea(
            "l2_costs",
            "L2 Costs (Name,Fee USD)",
            "Arbitrum,0.25\nOptimism,0.30\nzkSync,0.45",
        )
        .info("One L2 per line: Name, Typical Fee in USD"),
    ],
    compute: Compute::Pure(l2_cost_comparison),
};

fn l2_cost_comparison(i: &Inputs) -> Outcome {
    let l1 = i.number("l1_gas")?;
    ensure(l1 > 0.0, "L1 gas fee must be positive.")?;
    let text = i.text("l2_costs");
    let rows = parse_rows(&text, 2)?;
    ensure(!rows.is_empty(), "No L2 platforms entered.")?;

    let mut table = vec![vec![
        Cell::from("Ethereum L1"),
        Cell::from(format_currency(l1)),
        Cell::from(format_percent(0.0)),
    ]];
    for row in &rows {
        let fee = row_number(row[1], &row.join(","))?;
        table.push(vec![
            Cell::from(row[0]),
            Cell::from(format_currency(fee)),
            Cell::from(format_percent(1.0 - fee / l1)),
        ]);
    }
    Ok(vec![CalculationResult::table(
        "Transaction Cost Comparison",
        ["Platform", "Fee", "Savings vs. L1"],
        table,
    )])
}

pub const LP_IMPERMANENT_GAIN_ZONES: Calculator = Calculator {
    id: "lp-impermanent-gain-zones",
    name: "LP Impermanent Gain Zones",
    description: "Calculate price change ratios where providing liquidity outperforms HODLing.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("feeApr", "Pool Fee APR (%)", "20"),
        InputField::number("days", "Holding Period (Days)", "30"),
    ],
    compute: Compute::Pure(lp_impermanent_gain_zones),
};

/// Price ratios `k` at which fee-compounded LP value equals HODL value.
///
/// LP beats HODL while `fee * sqrt(k) > (1 + k) / 2`, that is while
/// `k^2 + (2 - 4 fee^2) k + 1 < 0`. Returns `None` when that never holds.
fn break_even_ratios(fee_growth: f64) -> Option<(f64, f64)> {
    let b = 2.0 - 4.0 * fee_growth.powi(2);
    let discriminant = b * b - 4.0;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    Some(((-b - root) / 2.0, (-b + root) / 2.0))
}

fn lp_impermanent_gain_zones(i: &Inputs) -> Outcome {
    let fee_apr = i.number("feeApr")? / 100.0;
    let days = i.number("days")?;
    let fee_growth = (1.0 + fee_apr).powf(days / 365.0);

    match break_even_ratios(fee_growth) {
        None => Ok(vec![kv(
            "Result",
            "HODL outperforms LP at all price ratios for this APR.",
        )]),
        Some((low, high)) => Ok(vec![
            kv("HODL Outperforms If Price Ratio Is Below", format_number(low, 4)),
            kv("HODL Outperforms If Price Ratio Is Above", format_number(high, 4)),
            kv(
                "Interpretation",
                "LP is more profitable than HODL as long as the ratio of asset prices stays between these two values.",
            ),
        ]),
    }
}

pub const YIELD_FARMING_ROI: Calculator = Calculator {
    id: "yield-farming-roi",
    name: "Yield Farming ROI",
    description: "Calculate total ROI from yield farming, including fees, rewards, and impermanent loss.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("initialLpValue", "Initial LP Value (USD)", "1000"),
        InputField::number("finalLpValue", "Final LP Value (USD)", "950")
            .info("This value reflects impermanent loss/gain."),
        InputField::number("feeRewards", "Trading Fee Rewards (USD)", "50"),
        InputField::number("tokenRewardsValue", "Farming Token Rewards (USD)", "150"),
    ],
    compute: Compute::Pure(yield_farming_roi),
};

fn yield_farming_roi(i: &Inputs) -> Outcome {
    let initial = i.number("initialLpValue")?;
    ensure(initial > 0.0, "Initial LP value must be positive.")?;
    let lp_change = i.number("finalLpValue")? - initial;
    let profit = lp_change + i.number("feeRewards")? + i.number("tokenRewardsValue")?;
    Ok(vec![
        kv("Impermanent Loss/Gain", format_currency(lp_change)),
        kv("Total Profit/Loss", format_currency(profit)),
        kv("Net ROI", format_percent(profit / initial)),
    ])
}

pub const REBASE_TOKEN: Calculator = Calculator {
    id: "rebase-token-calculator",
    name: "Rebase Token Calculator",
    description: "Project the value of your holdings in an elastic supply (rebase) token.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("initialTokens", "Your Initial Token Amount", "100"),
        InputField::number("initialPrice", "Initial Token Price (USD)", "1.05"),
        InputField::number("dailyRebaseRate", "Average Daily Rebase Rate (%)", "0.5"),
        InputField::number("days", "Number of Days", "30"),
    ],
    compute: Compute::Pure(rebase_token),
};

fn rebase_token(i: &Inputs) -> Outcome {
    let rate = i.number("dailyRebaseRate")? / 100.0;
    let tokens = i.number("initialTokens")? * (1.0 + rate).powf(i.number("days")?);
    // Price is assumed to hold its peg through every rebase.
    let value = tokens * i.number("initialPrice")?;
    Ok(vec![
        kv("Final Token Amount", format_number(tokens, 6)),
        kv("Final Value (assuming stable price)", format_currency(value)),
    ])
}

pub const MINING_BREAK_EVEN_TIME: Calculator = Calculator {
    id: "mining-break-even-time",
    name: "Mining Break-Even Time",
    description: "Estimate how long it will take for a mining rig to pay for itself.",
    category: Category::Crypto,
    inputs: &[
        InputField::number("hardwareCost", "Hardware Cost (USD)", "5000"),
        InputField::number("dailyProfit", "Estimated Daily Profit (USD)", "15")
            .info("Calculate this using the Mining Profitability calculator first"),
    ],
    compute: Compute::Pure(mining_break_even_time),
};

fn mining_break_even_time(i: &Inputs) -> Outcome {
    let cost = i.number("hardwareCost")?;
    let daily = i.number("dailyProfit")?;
    if daily <= 0.0 {
        return Ok(vec![kv("Break-Even Time", "Infinity (Not profitable)")]);
    }
    let days = cost / daily;
    Ok(vec![
        kv("Break-Even Time (Days)", format_number(days, 1)),
        kv("Break-Even Time (Months)", format_number(days / DAYS_PER_MONTH, 1)),
    ])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, table_of, value_of};
    use super::*;

    #[test]
    fn trade_profit_after_fees() {
        let out = run(
            &CRYPTO_PROFIT,
            &[("buyPrice", "40000"), ("sellPrice", "45000"), ("quantity", "0.5"), ("fees", "50")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Net Profit/Loss"), "$2,450.00");
    }

    #[test]
    fn impermanent_loss_of_a_fifty_percent_move() {
        let out = run(&IMPERMANENT_LOSS_GAIN, &[("priceChangeA", "50")]).unwrap();
        assert_eq!(value_of(&out, "Impermanent Loss/Gain"), "-2.02%");

        let err = run(&IMPERMANENT_LOSS_GAIN, &[("priceChangeA", "-150")]).unwrap_err();
        assert_eq!(err.to_string(), "Price change cannot be less than -100%.");
    }

    #[test]
    fn staking_for_a_year_earns_the_apy() {
        let out = run(
            &CRYPTO_STAKING,
            &[("initialAmount", "10"), ("apy", "5"), ("days", "365"), ("coinPrice", "3000")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Total Rewards (Coins)"), "0.50000000");
        assert_eq!(value_of(&out, "Total Value (USD)"), "$31,500.00");
    }

    #[test]
    fn constant_product_slippage() {
        let out = run(
            &AMM_SLIPPAGE,
            &[("tokenA_balance", "1000"), ("tokenB_balance", "1000000"), ("tradeAmountA", "50")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Tokens B Received"), "47,619.047619");
        assert_eq!(value_of(&out, "Effective Price (B per A)"), "952.3810");
        assert_eq!(value_of(&out, "Price Slippage"), "4.76%");
    }

    #[test]
    fn gas_fee_in_both_units() {
        let out = run(&GAS_FEE, &[("gasUnits", "21000"), ("gasPrice", "20"), ("ethPrice", "3000")]).unwrap();
        assert_eq!(value_of(&out, "Transaction Fee"), "$1.26 (0.00042000 ETH)");
    }

    #[test]
    fn emissions_label_carries_the_horizon() {
        let out = run(
            &TOKEN_EMISSIONS,
            &[("currentSupply", "1000000"), ("emissionRate", "100"), ("days", "365")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Future Supply"), "1,036,500");
        assert_eq!(value_of(&out, "Inflation over 365 days"), "3.65%");
        assert_eq!(value_of(&out, "Annualized Inflation Rate"), "3.65%");
    }

    #[test]
    fn stablecoin_yields_rank_by_net_apy() {
        let out = run(
            &STABLECOIN_YIELD_AGGREGATOR,
            &[("platforms", "Aave,5,0\nYearn,10,50\nCompound,6,0")],
        )
        .unwrap();
        let names: Vec<String> = table_of(&out).rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(names, ["Compound", "Aave", "Yearn"]);

        let err = run(&STABLECOIN_YIELD_AGGREGATOR, &[("platforms", "Aave,5")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid format: Aave,5");
    }

    #[test]
    fn l1_row_leads_the_comparison() {
        let out = run(&L2_COST_COMPARISON, &[("l1_gas", "10"), ("l2_costs", "Arbitrum,0.5")]).unwrap();
        let table = table_of(&out);
        assert_eq!(table.rows[0][0].to_string(), "Ethereum L1");
        assert_eq!(table.rows[1][2].to_string(), "95.00%");
    }

    #[test]
    fn gain_zone_bounds_are_reciprocal() {
        let out = run(&LP_IMPERMANENT_GAIN_ZONES, &[("feeApr", "20"), ("days", "365")]).unwrap();
        assert_eq!(value_of(&out, "HODL Outperforms If Price Ratio Is Below"), "0.2880");
        assert_eq!(value_of(&out, "HODL Outperforms If Price Ratio Is Above"), "3.4720");

        let (low, high) = break_even_ratios(1.1).unwrap();
        assert!((low * high - 1.0).abs() < 1e-12);
        assert!(break_even_ratios(0.9).is_none());
    }

    #[test]
    fn unprofitable_rig_never_breaks_even() {
        let out = run(&MINING_BREAK_EVEN_TIME, &[("hardwareCost", "5000"), ("dailyProfit", "0")]).unwrap();
        assert_eq!(value_of(&out, "Break-Even Time"), "Infinity (Not profitable)");

        let out = run(&MINING_BREAK_EVEN_TIME, &[("hardwareCost", "3040"), ("dailyProfit", "10")]).unwrap();
        assert_eq!(value_of(&out, "Break-Even Time (Days)"), "304.0");
        assert_eq!(value_of(&out, "Break-Even Time (Months)"), "10.0");
    }

    #[test]
    fn farming_roi_nets_out_impermanent_loss() {
        let out = run(
            &YIELD_FARMING_ROI,
            &[("initialLpValue", "1000"), ("finalLpValue", "950"), ("feeRewards", "50"), ("tokenRewardsValue", "150")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Impermanent Loss/Gain"), "-$50.00");
        assert_eq!(value_of(&out, "Net ROI"), "15.00%");
    }
}
