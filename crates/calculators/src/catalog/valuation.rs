use super::{checked_irr, ensure, kv};
use crate::input::Inputs;
use crate::{Calculator, Compute, Outcome};
use analytics::npv;
use core_types::{format_currency, format_percent, Category, InputField};

pub const CALCULATORS: &[Calculator] = &[DCF, NPV_IRR, CAPM, CASH_FLOW_DISCOUNTING];

/// Present value of flows received at the end of periods 1, 2, ...
fn discounted_sum(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(idx, cf)| cf / (1.0 + rate).powi(idx as i32 + 1))
        .sum()
}

pub const DCF: Calculator = Calculator {
    id: "dcf",
    name: "Intrinsic Value (DCF)",
    description: "Calculate a stock's intrinsic value using a Discounted Cash Flow model.",
    category: Category::Valuation,
    inputs: &[
        InputField::textarea("cashFlows", "Future Cash Flows (FCF)", "100, 110, 121, 133, 146")
            .info("Comma-separated Free Cash Flow projections for the next N years."),
        InputField::number("terminalGrowthRate", "Terminal Growth Rate (%)", "2.5").info(
            "The constant rate at which the company's FCF is expected to grow forever after the explicit forecast period.",
        ),
        InputField::number("wacc", "Discount Rate (WACC %)", "8").info(
            "Weighted Average Cost of Capital. The average rate of return a company must pay to its security holders.",
        ),
        InputField::number("sharesOutstanding", "Shares Outstanding", "1000")
            .info("The total number of a company's shares held by all its shareholders."),
    ],
    compute: Compute::Pure(dcf),
};

fn dcf(i: &Inputs) -> Outcome {
    let flows = i.series("cashFlows");
    ensure(!flows.is_empty(), "Please enter at least one cash flow.")?;
    let growth = i.number("terminalGrowthRate")? / 100.0;
    let wacc = i.number("wacc")? / 100.0;
    let shares = i.number("sharesOutstanding")?;
    ensure(wacc > growth, "WACC must be greater than the Terminal Growth Rate.")?;
    ensure(shares > 0.0, "Shares Outstanding must be positive.")?;

    // Gordon growth on the final projected flow, discounted from the final year.
    let last = flows[flows.len() - 1];
    let terminal = last * (1.0 + growth) / (wacc - growth);
    let terminal_pv = terminal / (1.0 + wacc).powi(flows.len() as i32);

    let enterprise = discounted_sum(&flows, wacc) + terminal_pv;
    Ok(vec![
        kv("Enterprise Value", format_currency(enterprise)),
        kv("Intrinsic Value per Share", format_currency(enterprise / shares)),
    ])
}

pub const NPV_IRR: Calculator = Calculator {
    id: "npv-irr",
    name: "NPV & IRR Calculator",
    description: "Calculate Net Present Value and Internal Rate of Return for a series of cash flows.",
    category: Category::Valuation,
    inputs: &[
        InputField::number("initialInvestment", "Initial Investment", "1000"),
        InputField::textarea("cashFlows", "Cash Flows per Period", "200, 300, 400, 500")
            .info("Comma-separated values"),
        InputField::number("discountRate", "Discount Rate (%)", "10"),
    ],
    compute: Compute::Pure(npv_irr),
};

fn npv_irr(i: &Inputs) -> Outcome {
    let initial = i.number("initialInvestment")?;
    let rate = i.number("discountRate")? / 100.0;
    let flows = i.series("cashFlows");
    ensure(!flows.is_empty(), "Enter at least one cash flow.")?;

    let all: Vec<f64> = std::iter::once(-initial).chain(flows).collect();
    let irr = checked_irr(&all)?;
    Ok(vec![
        kv("Net Present Value (NPV)", format_currency(npv(&all, rate))),
        kv("Internal Rate of Return (IRR)", format_percent(irr)),
    ])
}

pub const CAPM: Calculator = Calculator {
    id: "capm",
    name: "Capital Asset Pricing Model (CAPM)",
    description: "Calculate the expected return of an investment based on its systematic risk (beta).",
    category: Category::Valuation,
    inputs: &[
        InputField::number("riskFreeRate", "Risk-Free Rate (%)", "3"),
        InputField::number("marketReturn", "Expected Market Return (%)", "8"),
        InputField::number("beta", "Asset Beta", "1.2"),
    ],
    compute: Compute::Pure(capm),
};

fn capm(i: &Inputs) -> Outcome {
    let rf = i.number("riskFreeRate")? / 100.0;
    let rm = i.number("marketReturn")? / 100.0;
    let expected = rf + i.number("beta")? * (rm - rf);
    Ok(vec![kv("Expected Return (CAPM)", format_percent(expected))])
}

pub const CASH_FLOW_DISCOUNTING: Calculator = Calculator {
    id: "cash-flow-discounting",
    name: "Cash Flow Discounting",
    description: "Calculate the present value of a series of future cash flows.",
    category: Category::Valuation,
    inputs: &[
        InputField::textarea("cashFlows", "Future Cash Flows", "100, 110, 120, 130")
            .info("Comma-separated values"),
        InputField::number("discountRate", "Discount Rate (%)", "8"),
    ],
    compute: Compute::Pure(cash_flow_discounting),
};

fn cash_flow_discounting(i: &Inputs) -> Outcome {
    let flows = i.series("cashFlows");
    let rate = i.number("discountRate")? / 100.0;
    Ok(vec![kv(
        "Present Value of Cash Flows",
        format_currency(discounted_sum(&flows, rate)),
    )])
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, value_of};
    use super::*;

    #[test]
    fn dcf_with_flat_flows_and_no_growth_is_a_perpetuity() {
        let out = run(
            &DCF,
            &[("cashFlows", "100, 100"), ("terminalGrowthRate", "0"), ("wacc", "10"), ("sharesOutstanding", "10")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Enterprise Value"), "$1,000.00");
        assert_eq!(value_of(&out, "Intrinsic Value per Share"), "$100.00");
    }

    #[test]
    fn dcf_rejects_growth_above_discount_rate() {
        let err = run(
            &DCF,
            &[("cashFlows", "100"), ("terminalGrowthRate", "9"), ("wacc", "8"), ("sharesOutstanding", "10")],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "WACC must be greater than the Terminal Growth Rate.");
    }

    #[test]
    fn npv_and_irr_of_a_textbook_project() {
        let out = run(
            &NPV_IRR,
            &[("initialInvestment", "1000"), ("cashFlows", "1100"), ("discountRate", "5")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Net Present Value (NPV)"), "$47.62");
        assert_eq!(value_of(&out, "Internal Rate of Return (IRR)"), "10.00%");

        let out = run(
            &NPV_IRR,
            &[("initialInvestment", "1000"), ("cashFlows", "0, 1210"), ("discountRate", "5")],
        )
        .unwrap();
        assert_eq!(value_of(&out, "Internal Rate of Return (IRR)"), "10.00%");
    }

    #[test]
    fn irr_without_a_sign_change_is_reported() {
        let err = run(
            &NPV_IRR,
            &[("initialInvestment", "-100"), ("cashFlows", "50, 50"), ("discountRate", "10")],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Could not find an IRR for these cash flows.");
    }

    #[test]
    fn capm_line() {
        let out = run(&CAPM, &[("riskFreeRate", "3"), ("marketReturn", "8"), ("beta", "1.2")]).unwrap();
        assert_eq!(value_of(&out, "Expected Return (CAPM)"), "9.00%");
    }

    #[test]
    fn discounting_starts_one_period_out() {
        let out = run(&CASH_FLOW_DISCOUNTING, &[("cashFlows", "110, 121"), ("discountRate", "10")]).unwrap();
        assert_eq!(value_of(&out, "Present Value of Cash Flows"), "$200.00");
    }
}
