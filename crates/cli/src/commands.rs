//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("sluice")
        .about("Compile and run declarative CRUD command trees")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Config file (default: sluice.toml)")
                .global(true),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Print JSON on a single line")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Report errors as JSON objects")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_invoke())
        .subcommand(build_describe())
        .subcommand(build_init())
}

fn build_invoke() -> Command {
    Command::new("invoke")
        .about("Run an operation on a JSON command tree and print the result tree")
        .arg(
            Arg::new("operation")
                .required(true)
                .help("Operation name, e.g. sqlite.read"),
        )
        .arg(
            Arg::new("input")
                .help("JSON file with the command tree; '-' or absent reads stdin"),
        )
        .arg(
            Arg::new("generate-only")
                .long("generate-only")
                .short('g')
                .help("Return the SQL instead of running it (for a transaction, of each command)")
                .action(ArgAction::SetTrue),
        )
}

fn build_describe() -> Command {
    Command::new("describe")
        .about("List the arguments an operation accepts")
        .arg(
            Arg::new("operation")
                .required(true)
                .help("Operation name, e.g. mssql.create"),
        )
}

fn build_init() -> Command {
    Command::new("init").about("Write a default config file if none exists")
}
