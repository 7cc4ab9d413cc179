//! typeshape CLI
//!
//! Command-line interface for deriving structural schemas with pick and
//! omit.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use typeshape::{
    index_property_keys, load_schema, select, Key, KeySelector, Metadata, Schema, SelectMode,
};

#[derive(Parser)]
#[command(name = "typeshape")]
#[command(about = "Derive structural schemas with pick and omit")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep only the selected keys of a schema
    Pick {
        /// Source schema file
        schema: PathBuf,

        /// Comma-separated keys to keep
        #[arg(
            long,
            value_delimiter = ',',
            conflicts_with = "selector",
            required_unless_present = "selector"
        )]
        keys: Vec<String>,

        /// Schema file whose enumerable keys form the selection
        #[arg(long)]
        selector: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Remove the selected keys from a schema
    Omit {
        /// Source schema file
        schema: PathBuf,

        /// Comma-separated keys to remove
        #[arg(
            long,
            value_delimiter = ',',
            conflicts_with = "selector",
            required_unless_present = "selector"
        )]
        keys: Vec<String>,

        /// Schema file whose enumerable keys form the selection
        #[arg(long)]
        selector: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the enumerable property keys of a schema, one per line
    Keys {
        /// Schema file
        schema: PathBuf,
    },

    /// Print the derived required-key set of an object schema
    Required {
        /// Schema file
        schema: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pick {
            schema,
            keys,
            selector,
            output,
            pretty,
        } => run_select(SelectMode::Keep, &schema, keys, selector, output, pretty),

        Commands::Omit {
            schema,
            keys,
            selector,
            output,
            pretty,
        } => run_select(SelectMode::Drop, &schema, keys, selector, output, pretty),

        Commands::Keys { schema } => run_keys(&schema),

        Commands::Required { schema } => run_required(&schema),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_select(
    mode: SelectMode,
    schema_path: &Path,
    keys: Vec<String>,
    selector_path: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let source = load(schema_path)?;

    let selector = match selector_path {
        Some(path) => KeySelector::from(load(&path)?),
        None => KeySelector::Keys(keys.into_iter().map(parse_key).collect()),
    };

    let derived = select(mode, &source, selector, &Metadata::new());

    let json_output = if pretty {
        serde_json::to_string_pretty(&derived)
    } else {
        serde_json::to_string(&derived)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_keys(schema_path: &Path) -> Result<(), u8> {
    let schema = load(schema_path)?;
    for key in index_property_keys(&schema) {
        println!("{}", key);
    }
    Ok(())
}

fn run_required(schema_path: &Path) -> Result<(), u8> {
    let schema = load(schema_path)?;
    match schema {
        Schema::Object(object) => {
            for key in object.required_keys() {
                println!("{}", key);
            }
            Ok(())
        }
        other => {
            eprintln!("Error: expected an object schema, got {}", other.kind());
            Err(2)
        }
    }
}

fn load(path: &Path) -> Result<Schema, u8> {
    load_schema(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

/// Keys that parse as integers select integer-keyed properties.
fn parse_key(raw: String) -> Key {
    match raw.parse::<i64>() {
        Ok(n) => Key::Int(n),
        Err(_) => Key::Str(raw),
    }
}
