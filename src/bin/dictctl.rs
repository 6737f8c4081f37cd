use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand, ValueEnum};
use dictstore::{CodecError, Dictionary, json, literal, persist, storage::ConfigDocument};
use log::{error, trace};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "dictctl", about = "Inspect and convert persisted dictionaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-encode a dictionary from one text format into another
    Convert {
        #[arg(long, value_enum)]
        from: Format,
        #[arg(long, value_enum)]
        to: Format,
        /// Input file, stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print one value of a dictionary stored in a config document
    Get {
        #[arg(long)]
        config: PathBuf,
        #[arg(long, help = "Dotted path of the dictionary, e.g. players.alex")]
        path: String,
        key: String,
    },
    /// Store one value into a dictionary of a config document, creating both if needed
    Set {
        #[arg(long)]
        config: PathBuf,
        #[arg(long, help = "Dotted path of the dictionary, e.g. players.alex")]
        path: String,
        key: String,
        value: String,
    },
    /// List the paths of all dictionaries in a config document
    List {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `{"k": "v"}`, everything as text
    Persist,
    /// A plain JSON object
    Json,
    /// Python-style `{'k': 'v'}`
    Literal,
    /// `{k=v}`, output only
    Display,
}

fn main() -> ExitCode {
    env_logger::builder().init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(target: "dictctl", "{e}");
            eprintln!("dictctl: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), CodecError> {
    match command {
        Command::Convert { from, to, file } => {
            let input = match file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let dict = decode(from, input.trim())?;
            trace!(target: "dictctl", "read {} entries as {from:?}", dict.size());
            println!("{}", encode(to, &dict)?);
        }
        Command::Get { config, path, key } => {
            let doc = ConfigDocument::load(config)?;
            match doc.get_dictionary(&path)?.as_ref().and_then(|d| d.get(key.as_str())) {
                Some(value) => println!("{value}"),
                None => {
                    return Err(CodecError::Usage(format!("no key {key:?} at {path:?}")));
                }
            }
        }
        Command::Set {
            config,
            path,
            key,
            value,
        } => {
            let mut doc = ConfigDocument::load(&config)?;
            let mut dict = doc.get_dictionary(&path)?.unwrap_or_default();
            dict.put(key, value);
            doc.set_dictionary(&path, &dict)?;
            doc.save(&config)?;
        }
        Command::List { config } => {
            for path in ConfigDocument::load(config)?.paths() {
                println!("{path}");
            }
        }
    }
    Ok(())
}

fn decode(format: Format, input: &str) -> Result<Dictionary<String, Value>, CodecError> {
    match format {
        Format::Persist => Ok(persist::from_text(input)?
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()),
        Format::Json => json::from_json(input),
        Format::Literal => literal::from_literal(input),
        Format::Display => Err(CodecError::Usage("display is an output-only format".into())),
    }
}

fn encode(format: Format, dict: &Dictionary<String, Value>) -> Result<String, CodecError> {
    match format {
        Format::Persist => Ok(persist::to_text(&as_text(dict))),
        Format::Json => json::to_json_pretty(dict),
        Format::Literal => Ok(literal::to_literal(dict)),
        Format::Display => Ok(as_text(dict).to_string()),
    }
}

/// Strings lose their JSON quotes, everything else becomes its JSON text
fn as_text(dict: &Dictionary<String, Value>) -> Dictionary<String, String> {
    dict.iter()
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), text)
        })
        .collect()
}
