//! Command line interface to the order-fulfillment solver.

use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::process;
use u_fulfill::fulfillment::{check, fulfill, FulfillmentConfig, InstanceConfig, DEFAULT_TOLERANCE};
use u_fulfill::mip::Provider;
use u_fulfill::{io, logging, Error};

const INPUT_ARG_NAME: &str = "input";
const OUTPUT_ARG_NAME: &str = "output";
const SOLUTION_ARG_NAME: &str = "solution";
const DURATION_ARG_NAME: &str = "duration";
const PROVIDER_ARG_NAME: &str = "provider";
const CARTON_BOUND_ARG_NAME: &str = "carton-upper-bound";
const ITEMS_ARG_NAME: &str = "items";
const DCS_ARG_NAME: &str = "dcs";
const CARRIERS_ARG_NAME: &str = "carriers";
const MAX_QUANTITY_ARG_NAME: &str = "max-quantity";
const SEED_ARG_NAME: &str = "seed";

fn path_arg(name: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .short(short)
        .long(name)
        .value_parser(value_parser!(PathBuf))
}

fn solve_command() -> Command {
    Command::new("solve")
        .about("Solves an order-fulfillment problem")
        .arg(path_arg(INPUT_ARG_NAME, 'i', "Problem file (default: stdin)"))
        .arg(path_arg(OUTPUT_ARG_NAME, 'o', "Solution file (default: stdout)"))
        .arg(
            Arg::new(DURATION_ARG_NAME)
                .help("Maximum solve duration in seconds, 0 for no limit")
                .short('d')
                .long(DURATION_ARG_NAME)
                .default_value("10")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new(PROVIDER_ARG_NAME)
                .help(format!("MIP backend ({})", Provider::supported()))
                .short('p')
                .long(PROVIDER_ARG_NAME)
                .default_value(Provider::default().as_str()),
        )
        .arg(
            Arg::new(CARTON_BOUND_ARG_NAME)
                .help("Upper bound of the carton variables")
                .long(CARTON_BOUND_ARG_NAME)
                .value_parser(value_parser!(f64)),
        )
}

fn check_command() -> Command {
    Command::new("check")
        .about("Checks a solution against its problem")
        .arg(path_arg(INPUT_ARG_NAME, 'i', "Problem file").required(true))
        .arg(path_arg(SOLUTION_ARG_NAME, 's', "Solution file").required(true))
}

fn generate_command() -> Command {
    let count = |name: &'static str, help: &'static str| {
        Arg::new(name)
            .help(help)
            .long(name)
            .value_parser(value_parser!(u64))
    };
    Command::new("generate")
        .about("Generates a random feasible problem")
        .arg(count(ITEMS_ARG_NAME, "Number of order lines [default: 5]"))
        .arg(count(DCS_ARG_NAME, "Number of distribution centers [default: 3]"))
        .arg(count(CARRIERS_ARG_NAME, "Carriers per distribution center [default: 2]"))
        .arg(count(MAX_QUANTITY_ARG_NAME, "Maximum units per order line [default: 4]"))
        .arg(count(SEED_ARG_NAME, "Random seed [default: 42]"))
        .arg(path_arg(OUTPUT_ARG_NAME, 'o', "Problem file (default: stdout)"))
}

fn run_solve(matches: &ArgMatches) -> Result<(), String> {
    let provider = matches
        .get_one::<String>(PROVIDER_ARG_NAME)
        .map_or(Ok(Provider::default()), |name| name.parse::<Provider>())
        .map_err(|err| err.to_string())?;
    let duration = matches.get_one::<f64>(DURATION_ARG_NAME).copied().unwrap_or(10.0);
    let mut config = FulfillmentConfig::default()
        .with_provider(provider)
        .with_max_duration_secs(duration)
        .map_err(|err| err.to_string())?;
    if let Some(&bound) = matches.get_one::<f64>(CARTON_BOUND_ARG_NAME) {
        config = config.with_carton_upper_bound(bound);
    }
    config.validate().map_err(|err| err.to_string())?;

    let input = io::read_input(matches.get_one::<PathBuf>(INPUT_ARG_NAME).map(PathBuf::as_path))
        .map_err(|err| format!("cannot read problem: {err}"))?;
    let output_path = matches.get_one::<PathBuf>(OUTPUT_ARG_NAME).map(PathBuf::as_path);

    match fulfill(&input, &config) {
        Ok(output) => io::write_output(output_path, &output).map_err(|err| err.to_string()),
        Err(Error::NoSolution(output)) => {
            io::write_output(output_path, &output).map_err(|err| err.to_string())?;
            Err("no solution found".to_string())
        }
        Err(err) => Err(err.to_string()),
    }
}

fn run_check(matches: &ArgMatches) -> Result<(), String> {
    let input_path = matches.get_one::<PathBuf>(INPUT_ARG_NAME).map(PathBuf::as_path);
    let input =
        io::read_input(input_path).map_err(|err| format!("cannot read problem: {err}"))?;
    let solution_path = matches.get_one::<PathBuf>(SOLUTION_ARG_NAME).map(PathBuf::as_path);
    let output =
        io::read_output(solution_path).map_err(|err| format!("cannot read solution: {err}"))?;

    check(&input, &output, DEFAULT_TOLERANCE).map_err(|errors| {
        format!("checker found {} errors:\n{}", errors.len(), errors.join("\n"))
    })?;
    tracing::info!(status = %output.status, "solution is consistent with the problem");
    Ok(())
}

fn run_generate(matches: &ArgMatches) -> Result<(), String> {
    let defaults = InstanceConfig::default();
    let count = |name: &str, default: u64| matches.get_one::<u64>(name).copied().unwrap_or(default);
    let to_usize = |name: &str, default: usize| {
        usize::try_from(count(name, default as u64)).map_err(|err| format!("{name}: {err}"))
    };

    let config = InstanceConfig {
        items: to_usize(ITEMS_ARG_NAME, defaults.items)?,
        dcs: to_usize(DCS_ARG_NAME, defaults.dcs)?,
        carriers_per_dc: to_usize(CARRIERS_ARG_NAME, defaults.carriers_per_dc)?,
        max_quantity: u32::try_from(count(MAX_QUANTITY_ARG_NAME, u64::from(defaults.max_quantity)))
            .map_err(|err| format!("{MAX_QUANTITY_ARG_NAME}: {err}"))?,
        seed: count(SEED_ARG_NAME, defaults.seed),
    };
    config.validate()?;

    let input = config.generate();
    io::write_json(matches.get_one::<PathBuf>(OUTPUT_ARG_NAME).map(PathBuf::as_path), &input)
        .map_err(|err| format!("cannot write problem: {err}"))
}

fn main() {
    logging::init();

    let matches = Command::new("u-fulfill")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Order-fulfillment assignment as a mixed-integer program")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(solve_command())
        .subcommand(check_command())
        .subcommand(generate_command())
        .get_matches();

    let result = match matches.subcommand() {
        Some(("solve", sub)) => run_solve(sub),
        Some(("check", sub)) => run_check(sub),
        Some(("generate", sub)) => run_generate(sub),
        _ => Err("no subcommand was used, use -h to print help information".to_string()),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
