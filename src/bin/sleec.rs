//! Command-line interface for the SLEEC compiler
//!
//! Usage:
//!   sleec convert `<input>` [-o `<output>`] [--stdout]   - Convert one file to a clingo program
//!   sleec batch `<dir>`                                 - Convert every .sleec file in a directory
//!   sleec check `<input>`                               - Convert and run the solver on the result
//!   sleec solve `<input>` [--models `<n>`]                - Convert and print the solver's answer sets
//!   sleec inspect `<input>` [--format json|yaml]        - Print the parsed model
//!
//! Global options: `--config <file>` layers a TOML file over the built-in defaults,
//! `--max-time <n>` overrides the time horizon, `-v` enables debug logging.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use sleec::sleec::config::Loader;
use sleec::sleec::solver::ClingoSolver;
use sleec::sleec::{ConvertError, Converter};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let converter = build_converter(&matches).unwrap_or_else(|e| fail(&e));

    let result = match matches.subcommand() {
        Some(("convert", sub)) => handle_convert_command(&converter, sub),
        Some(("batch", sub)) => handle_batch_command(&converter, sub),
        Some(("check", sub)) => handle_check_command(&converter, sub),
        Some(("solve", sub)) => handle_solve_command(&converter, sub),
        Some(("inspect", sub)) => handle_inspect_command(&converter, sub),
        _ => unreachable!("clap requires a subcommand"),
    };

    if let Err(e) = result {
        fail(&e);
    }
}

fn cli() -> Command {
    let input = Arg::new("input")
        .help("Path to the SLEEC file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .index(1);

    Command::new("sleec")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile SLEEC rules into clingo answer-set programs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration layered over the built-in defaults"),
        )
        .arg(
            Arg::new("max-time")
                .long("max-time")
                .global(true)
                .value_parser(value_parser!(u32))
                .help("Upper bound of the time domain"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging (RUST_LOG takes precedence)"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a SLEEC file to a clingo program")
                .arg(input.clone())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Output path (default: <stem>_converted.lp beside the input)"),
                )
                .arg(
                    Arg::new("stdout")
                        .long("stdout")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("output")
                        .help("Print the program instead of writing a file"),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about("Convert every .sleec file in a directory to <stem>_auto_generated.lp")
                .arg(
                    Arg::new("dir")
                        .help("Directory to scan (not recursive)")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Convert a SLEEC file and run the solver on the result")
                .arg(input.clone()),
        )
        .subcommand(
            Command::new("solve")
                .about("Convert a SLEEC file and print the solver's output")
                .arg(input.clone())
                .arg(
                    Arg::new("models")
                        .long("models")
                        .short('n')
                        .value_parser(value_parser!(u32))
                        .help("Number of models to request (default: solver.models)"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the parsed and validated model")
                .arg(input)
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_parser(["json", "yaml"])
                        .default_value("json")
                        .help("Output format"),
                ),
        )
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_converter(matches: &ArgMatches) -> Result<Converter, ConvertError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    if let Some(max_time) = matches.get_one::<u32>("max-time") {
        loader = loader.set_override("max_time", i64::from(*max_time))?;
    }
    let config = loader.build()?;
    Ok(Converter::new(config)?)
}

fn input_path(matches: &ArgMatches) -> &Path {
    matches
        .get_one::<PathBuf>("input")
        .map(PathBuf::as_path)
        .unwrap_or_else(|| Path::new(""))
}

/// Handle the convert command
fn handle_convert_command(converter: &Converter, matches: &ArgMatches) -> Result<(), ConvertError> {
    let input = input_path(matches);
    if matches.get_flag("stdout") {
        print!("{}", converter.convert_file(input)?);
        return Ok(());
    }
    let output = matches.get_one::<PathBuf>("output").map(PathBuf::as_path);
    let written = converter.convert_file_to(input, output)?;
    println!("Converted {} -> {}", input.display(), written.display());
    Ok(())
}

/// Handle the batch command
fn handle_batch_command(converter: &Converter, matches: &ArgMatches) -> Result<(), ConvertError> {
    let dir = matches
        .get_one::<PathBuf>("dir")
        .map(PathBuf::as_path)
        .unwrap_or_else(|| Path::new("."));
    let outcomes = converter.convert_dir(dir)?;
    if outcomes.is_empty() {
        println!("No .sleec files found in {}", dir.display());
        return Ok(());
    }

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(output) => println!("ok     {} -> {}", outcome.input.display(), output.display()),
            Err(e) => {
                failed += 1;
                eprintln!("failed {}\n{}", outcome.input.display(), e);
            }
        }
    }
    println!(
        "{} converted, {} failed",
        outcomes.len() - failed,
        failed
    );
    if failed > 0 {
        process::exit(1);
    }
    Ok(())
}

/// Handle the check command
fn handle_check_command(converter: &Converter, matches: &ArgMatches) -> Result<(), ConvertError> {
    let input = input_path(matches);
    let source = std::fs::read_to_string(input).map_err(|e| ConvertError::Io {
        path: input.to_path_buf(),
        source: e,
    })?;
    let solver = ClingoSolver::for_check(&converter.config().solver);
    let report = converter.check(&source, &solver)?;
    print!("{}", report.output);
    println!("Solver accepted {}", input.display());
    Ok(())
}

/// Handle the solve command
fn handle_solve_command(converter: &Converter, matches: &ArgMatches) -> Result<(), ConvertError> {
    let input = input_path(matches);
    let source = std::fs::read_to_string(input).map_err(|e| ConvertError::Io {
        path: input.to_path_buf(),
        source: e,
    })?;
    let mut config = converter.config().solver.clone();
    if let Some(models) = matches.get_one::<u32>("models") {
        config.models = *models;
    }
    let solver = ClingoSolver::for_solving(&config);
    let report = converter.check(&source, &solver)?;
    print!("{}", report.output);
    Ok(())
}

/// Handle the inspect command
fn handle_inspect_command(converter: &Converter, matches: &ArgMatches) -> Result<(), ConvertError> {
    let input = input_path(matches);
    let source = std::fs::read_to_string(input).map_err(|e| ConvertError::Io {
        path: input.to_path_buf(),
        source: e,
    })?;
    let program = converter.parse(&source)?;
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("json");
    let rendered = match format {
        "yaml" => serde_yaml::to_string(&program).unwrap_or_else(|e| {
            eprintln!("Error formatting model: {}", e);
            process::exit(1);
        }),
        _ => serde_json::to_string_pretty(&program).unwrap_or_else(|e| {
            eprintln!("Error formatting model: {}", e);
            process::exit(1);
        }),
    };
    println!("{}", rendered);
    Ok(())
}

fn fail(error: &ConvertError) -> ! {
    eprintln!("Error: {}", error);
    process::exit(1);
}
