//! Sluice CLI - run declarative CRUD command trees from the shell.
//!
//! ```text
//! sluice init
//! echo '{"connection":"main","table":"users"}' | sluice invoke sqlite.read
//! sluice invoke sqlite.delete request.json --generate-only
//! sluice describe mssql.create
//! ```
//!
//! Logging goes to stderr and is controlled by `SLUICE_LOG`
//! (e.g. `SLUICE_LOG=sluice=debug`), defaulting to `warn`.

mod commands;
mod format;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::Context;
use sluice_executor::json::node_from_json;
use sluice_executor::{
    Error, Node, Registry, Session, Slot, SlotKind, SluiceConfig, Value, CONFIG_FILE_NAME,
};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_arguments, format_error, format_tree, OutputMode};

fn main() {
    init_logging();

    let matches = build_cli().get_matches();
    let mode = OutputMode {
        compact: matches.get_flag("compact"),
        json_errors: matches.get_flag("json"),
    };
    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    let result = match matches.subcommand() {
        Some(("init", _)) => run_init(&config_path),
        Some(("describe", sub)) => {
            let operation = sub.get_one::<String>("operation").map(String::as_str).unwrap_or_default();
            run_describe(operation, mode)
        }
        Some(("invoke", sub)) => {
            let operation = sub.get_one::<String>("operation").map(String::as_str).unwrap_or_default();
            let input = sub.get_one::<String>("input").map(String::as_str);
            run_invoke(&config_path, operation, input, sub.get_flag("generate-only"), mode)
        }
        _ => Ok(()),
    };

    if let Err(err) = result {
        match err.downcast_ref::<Error>() {
            Some(e) => eprintln!("{}", format_error(e, mode)),
            None => eprintln!("(error) {:#}", err),
        }
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SLUICE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_init(path: &Path) -> anyhow::Result<()> {
    if SluiceConfig::write_default_if_missing(path)? {
        eprintln!("Wrote {}", path.display());
    } else {
        eprintln!("{} already exists", path.display());
    }
    Ok(())
}

fn run_describe(operation: &str, mode: OutputMode) -> anyhow::Result<()> {
    // Describing needs no databases; an empty config is enough.
    let registry = Registry::new(SluiceConfig::default());
    let arguments = registry.describe_arguments(operation)?;
    println!("{}", format_arguments(&arguments, mode));
    Ok(())
}

fn read_input(input: Option<&str>) -> anyhow::Result<String> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read command tree from stdin")?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read command tree from '{}'", path)),
    }
}

fn run_invoke(
    config_path: &Path,
    operation: &str,
    input: Option<&str>,
    generate_only: bool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let text = read_input(input)?;
    let json: serde_json::Value = serde_json::from_str(&text).context("command tree is not valid JSON")?;
    let mut tree = node_from_json(operation, &json)?;
    if generate_only {
        mark_generate_only(operation, &mut tree);
    }

    let config = if config_path.exists() {
        SluiceConfig::from_file(config_path)?
    } else {
        tracing::debug!(path = %config_path.display(), "no config file; using defaults");
        SluiceConfig::default()
    };
    let session = Session::new(Arc::new(Registry::from_config(config)?));
    session.invoke(operation, &mut tree)?;

    println!("{}", format_tree(&tree, mode));
    Ok(())
}

/// Ask for build-only output. A transaction takes no such flag itself, so it
/// is passed down to every nested command.
fn mark_generate_only(operation: &str, tree: &mut Node) {
    let is_transaction = matches!(
        Slot::parse(operation),
        Ok(Slot {
            kind: SlotKind::Transaction,
            ..
        })
    );
    if !is_transaction {
        tree.children.retain(|c| c.name != "generate-only");
        tree.push(Node::with_value("generate-only", Value::Bool(true)));
        return;
    }
    for commands in tree.children.iter_mut().filter(|c| c.name == "commands") {
        for command in &mut commands.children {
            let name = command.name.clone();
            mark_generate_only(&name, command);
        }
    }
}
