use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use symtab_core::{boot, EncodingSetting, Runtime, RuntimeConfig, SymbolId, Value};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "symtab")]
#[command(about = "Symtab CLI - intern symbols and keywords", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Encoding used to decode names (defaults to the configured one)
    #[arg(short, long, global = true, value_enum, env = "SYMTAB_ENCODING")]
    encoding: Option<EncodingArg>,

    /// Config file (defaults to ./symtab.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum EncodingArg {
    Locale,
    Utf8,
    Latin1,
    Ascii,
}

impl From<EncodingArg> for EncodingSetting {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Locale => EncodingSetting::Locale,
            EncodingArg::Utf8 => EncodingSetting::Utf8,
            EncodingArg::Latin1 => EncodingSetting::Latin1,
            EncodingArg::Ascii => EncodingSetting::Ascii,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Intern names and report their identities
    Intern {
        /// Names to intern
        #[arg(required = true)]
        names: Vec<String>,

        /// Only the first N bytes of each name are significant
        #[arg(short, long)]
        length: Option<usize>,

        /// Produce keywords instead of symbols
        #[arg(short, long)]
        keyword: bool,
    },

    /// Boot the runtime and verify the keyword constructor
    Check,

    /// Intern names, then report table statistics
    Stats {
        /// Names to intern
        names: Vec<String>,
    },
}

// Output structures
#[derive(Debug, Serialize)]
struct InternResult {
    name: String,
    printed: String,
    id: Option<SymbolId>,
    kind: &'static str,
    new: bool,
}

#[derive(Serialize)]
struct CheckResult {
    keyword: String,
    is_keyword: bool,
    symbol_is_keyword: bool,
    integer_is_keyword: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load_from_path(path),
        None => RuntimeConfig::load(),
    }
    .context("Failed to load configuration")?;
    if let Some(encoding) = cli.encoding {
        config.encoding = encoding.into();
    }

    init_tracing(&config, cli.verbose);
    info!(
        encoding = ?config.encoding,
        strategy = ?config.conversion_strategy,
        capacity = config.initial_capacity,
        "Runtime configuration loaded"
    );

    match execute_command(&cli, &config) {
        Ok(output) => {
            print_output(&cli.output, &output)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &RuntimeConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("symtab_core={0},symtab={0}", default_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if config.logging.format == "compact" {
        registry.with(fmt_layer.compact()).init();
    } else {
        registry.with(fmt_layer).init();
    }
}

fn execute_command(cli: &Cli, config: &RuntimeConfig) -> Result<serde_json::Value> {
    match &cli.command {
        Commands::Intern {
            names,
            length,
            keyword,
        } => {
            let rt = Runtime::new(config);
            let results = names
                .iter()
                .map(|name| intern_one(&rt, name, *length, *keyword))
                .collect::<Result<Vec<_>>>()?;
            Ok(serde_json::to_value(results)?)
        }
        Commands::Check => execute_check(config),
        Commands::Stats { names } => {
            let rt = Runtime::new(config);
            for name in names {
                rt.from_locale_symboln(name.as_bytes(), name.len())
                    .with_context(|| format!("Failed to intern '{}'", name))?;
            }
            Ok(serde_json::json!({
                "encoding": rt.policy().encoding.to_string(),
                "table_size": rt.table().len(),
                "stats": rt.table().stats(),
            }))
        }
    }
}

fn intern_one(rt: &Runtime, name: &str, length: Option<usize>, keyword: bool) -> Result<InternResult> {
    let bytes = name.as_bytes();
    // An oversized --length is reported by the table, not truncated here.
    let length = length.unwrap_or(bytes.len());
    let before = rt.table().len();

    let value = if keyword {
        Value::from(
            rt.from_locale_keywordn(bytes, length)
                .with_context(|| format!("Failed to make keyword from '{}'", name))?,
        )
    } else {
        Value::from(
            rt.from_locale_symboln(bytes, length)
                .with_context(|| format!("Failed to intern '{}'", name))?,
        )
    };

    let symbol = match &value {
        Value::Keyword(kw) => kw.symbol().clone(),
        Value::Symbol(sym) => sym.clone(),
        _ => bail!("unexpected value {}", value),
    };
    debug!(name = symbol.name(), "interned from command line");

    Ok(InternResult {
        name: symbol.name().to_string(),
        printed: value.to_string(),
        id: symbol.id(),
        kind: if value.is_keyword() { "keyword" } else { "symbol" },
        new: rt.table().len() > before,
    })
}

fn execute_check(config: &RuntimeConfig) -> Result<serde_json::Value> {
    let args: Vec<String> = std::env::args().collect();
    let result = boot(config, &args, |rt, _argv| -> Result<CheckResult> {
        let kw = rt
            .from_locale_keywordn(b"thusly", 4)
            .context("Failed to make keyword")?;
        let sym = rt.from_locale_symboln(b"thus", 4)?;
        Ok(CheckResult {
            keyword: kw.to_string(),
            is_keyword: rt.keyword_p(&Value::from(kw)).is_true(),
            symbol_is_keyword: rt.keyword_p(&Value::from(sym)).is_true(),
            integer_is_keyword: rt.keyword_p(&Value::from(42)).is_true(),
        })
    })?;

    if !result.is_keyword || result.symbol_is_keyword || result.integer_is_keyword {
        bail!("keyword predicate check failed for {}", result.keyword);
    }
    Ok(serde_json::to_value(result)?)
}

fn print_output(format: &OutputFormat, output: &serde_json::Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(output)?);
        }
        OutputFormat::Pretty => print_pretty(output),
    }
    Ok(())
}

fn print_pretty(output: &serde_json::Value) {
    match output {
        serde_json::Value::Array(items) => {
            for item in items {
                print_pretty(item);
            }
        }
        serde_json::Value::Object(map) => {
            if let (Some(printed), Some(kind)) = (map.get("printed"), map.get("kind")) {
                let marker = if map.get("new").and_then(|v| v.as_bool()).unwrap_or(false) {
                    "new".green()
                } else {
                    "existing".yellow()
                };
                println!(
                    "{} {} {} [{}]",
                    printed.as_str().unwrap_or_default().bold(),
                    kind.as_str().unwrap_or_default().cyan(),
                    map.get("id").map(|id| id.to_string()).unwrap_or_default(),
                    marker
                );
                return;
            }
            for (key, value) in map {
                match value {
                    serde_json::Value::Bool(true) => println!("{}: {}", key.bold(), "yes".green()),
                    serde_json::Value::Bool(false) => println!("{}: {}", key.bold(), "no".red()),
                    serde_json::Value::Object(_) => {
                        println!("{}:", key.bold());
                        print_pretty(value);
                    }
                    _ => println!("{}: {}", key.bold(), value),
                }
            }
        }
        other => println!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symtab_core::SymtabError;

    fn utf8_runtime() -> Runtime {
        Runtime::new(&RuntimeConfig {
            encoding: EncodingSetting::Utf8,
            ..Default::default()
        })
    }

    #[test]
    fn intern_reports_length_past_the_name() {
        let rt = utf8_runtime();
        let err = intern_one(&rt, "abc", Some(10), false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SymtabError>(),
            Some(&SymtabError::LengthOutOfBounds {
                length: 10,
                available: 3
            })
        );
        assert!(rt.table().is_empty());
    }

    #[test]
    fn intern_truncates_to_length() {
        let rt = utf8_runtime();
        let result = intern_one(&rt, "thusly", Some(4), true).unwrap();
        assert_eq!(result.name, "thus");
        assert_eq!(result.printed, "#:thus");
        assert_eq!(result.kind, "keyword");
        assert!(result.new);

        let again = intern_one(&rt, "thus", None, false).unwrap();
        assert_eq!(again.kind, "symbol");
        assert!(!again.new);
    }
}
