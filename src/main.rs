use anyhow::{Context, Result, bail};
use calculators::{Calculator, CalculatorHost};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use configuration::{OutputFormat, Settings, load_settings};
use core_types::{CalculationResult, Category};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the Quantdesk calculator suite.
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;

    // Logs go to stderr so JSON on stdout stays parseable.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let format = cli.format.unwrap_or(settings.output.format);
    match cli.command {
        Commands::List(args) => handle_list(args, format).map(|_| ExitCode::SUCCESS),
        Commands::Categories => handle_categories(format).map(|_| ExitCode::SUCCESS),
        Commands::Describe(args) => handle_describe(args, format).map(|_| ExitCode::SUCCESS),
        Commands::Run(args) => handle_run(args, &settings, format),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Trading, investment and derivatives calculators from the command line.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a settings file. Defaults to ./quantdesk.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format. Overrides `output.format` from the settings.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List calculators in catalog order.
    List(ListArgs),
    /// Show the catalog sections with their calculator counts.
    Categories,
    /// Show a calculator's description and input fields.
    Describe(DescribeArgs),
    /// Run a calculator.
    Run(RunArgs),
}

#[derive(Parser)]
struct ListArgs {
    /// Only show calculators in this category (e.g., "Options").
    #[arg(long)]
    category: Option<Category>,
}

#[derive(Parser)]
struct DescribeArgs {
    /// The calculator id (e.g., "black-scholes").
    id: String,
}

#[derive(Parser)]
struct RunArgs {
    /// The calculator id (e.g., "position-size").
    id: String,

    /// An input value as name=value. Repeat for each field; `\n` starts a new line.
    #[arg(short, long = "input", value_parser = parse_input)]
    inputs: Vec<(String, String)>,

    /// Seed for Monte Carlo calculators. Overrides `simulation.seed`.
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_input(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{arg}'"))?;
    Ok((name.trim().to_string(), value.replace("\\n", "\n")))
}

// ==============================================================================
// Catalog Commands
// ==============================================================================

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Handles the `list` command.
fn handle_list(args: ListArgs, format: OutputFormat) -> Result<()> {
    let selected: Vec<&Calculator> = match args.category {
        Some(category) => calculators::by_category(category).collect(),
        None => calculators::all().collect(),
    };

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = selected
                .iter()
                .map(|c| json!({ "id": c.id, "name": c.name, "category": c.category.label() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(vec!["ID", "Name", "Category"]);
            for c in &selected {
                table.add_row(vec![c.id, c.name, c.category.label()]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

/// Handles the `categories` command.
fn handle_categories(format: OutputFormat) -> Result<()> {
    let counts: Vec<(Category, usize)> = Category::ALL
        .into_iter()
        .map(|c| (c, calculators::by_category(c).count()))
        .collect();

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = counts
                .iter()
                .map(|(c, n)| json!({ "category": c.label(), "calculators": n }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(vec!["Category", "Calculators"]);
            for (category, count) in counts {
                table.add_row(vec![category.label().to_string(), count.to_string()]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

/// Handles the `describe` command.
fn handle_describe(args: DescribeArgs, format: OutputFormat) -> Result<()> {
    let calculator = calculators::find(&args.id)?;

    if format == OutputFormat::Json {
        let doc = json!({
            "id": calculator.id,
            "name": calculator.name,
            "description": calculator.description,
            "category": calculator.category.label(),
            "stochastic": calculator.is_stochastic(),
            "inputs": calculator.inputs,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{} ({})", calculator.name, calculator.category);
    println!("{}", calculator.description);
    if calculator.is_stochastic() {
        println!("Monte Carlo: pass --seed for reproducible output.");
    }

    let mut table = new_table();
    table.set_header(vec!["Name", "Label", "Kind", "Placeholder", "Default", "Info"]);
    for field in calculator.inputs {
        table.add_row(vec![
            field.name,
            field.label,
            field.kind.as_str(),
            field.placeholder,
            field.default.unwrap_or(""),
            field.info.unwrap_or(""),
        ]);
    }
    println!("{table}");
    Ok(())
}

// ==============================================================================
// Run Command
// ==============================================================================

/// Handles the `run` command. Exits non-zero when the calculator reports an error.
fn handle_run(args: RunArgs, settings: &Settings, format: OutputFormat) -> Result<ExitCode> {
    let calculator = calculators::find(&args.id)?;
    for (name, _) in &args.inputs {
        if calculator.field(name).is_none() {
            bail!("'{}' has no input named '{}'", calculator.id, name);
        }
    }
    let raw: HashMap<String, String> = args.inputs.into_iter().collect();

    let mut rng = match args.seed.or(settings.simulation.seed) {
        Some(seed) => {
            debug!(seed, "using seeded generator");
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    info!(calculator = calculator.id, "running calculator");
    let results = CalculatorHost::new().evaluate(calculator, &raw, &mut rng);

    // A batch with an error is shown as that error alone.
    if let Some(message) = CalculationResult::first_error(&results) {
        match format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&CalculationResult::error(message))?
            ),
            OutputFormat::Table => eprintln!("Error: {message}"),
        }
        return Ok(ExitCode::FAILURE);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Table => print_results(calculator, &results),
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints key/value results as one two-column table, then each table result under its label.
fn print_results(calculator: &Calculator, results: &[CalculationResult]) {
    println!("{}", calculator.name);

    let mut scalars = new_table();
    scalars.set_header(vec!["Result", "Value"]);
    let mut has_scalars = false;
    for result in results {
        if let CalculationResult::KeyValue { label, value, info } = result {
            let label = match info {
                Some(info) => format!("{label}\n({info})"),
                None => label.clone(),
            };
            scalars.add_row(vec![label, value.clone()]);
            has_scalars = true;
        }
    }
    if has_scalars {
        println!("{scalars}");
    }

    for result in results {
        if let CalculationResult::Table { label, table } = result {
            let mut rendered = new_table();
            rendered.set_header(table.headers.clone());
            for row in &table.rows {
                rendered.add_row(row.iter().map(ToString::to_string).collect::<Vec<_>>());
            }
            println!("\n{label}\n{rendered}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_split_on_the_first_equals_sign() {
        assert_eq!(
            parse_input("formula=a=b").unwrap(),
            ("formula".to_string(), "a=b".to_string())
        );
        assert!(parse_input("missing").is_err());
    }

    #[test]
    fn escaped_newlines_become_line_breaks() {
        let (_, value) = parse_input("orders=100,5\\n101,7").unwrap();
        assert_eq!(value, "100,5\n101,7");
    }

    #[test]
    fn cli_accepts_repeated_inputs_and_a_seed() {
        let cli = Cli::try_parse_from([
            "quantdesk",
            "run",
            "trade-outcome-simulator",
            "-i",
            "winRate=55",
            "--input",
            "numTrades=10",
            "--seed",
            "3",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.inputs.len(), 2);
                assert_eq!(args.seed, Some(3));
            }
            _ => panic!("expected the run command"),
        }
    }

    #[test]
    fn category_filter_parses_labels() {
        let cli = Cli::try_parse_from(["quantdesk", "list", "--category", "options"]).unwrap();
        match cli.command {
            Commands::List(args) => assert_eq!(args.category, Some(Category::Options)),
            _ => panic!("expected the list command"),
        }
    }
}
