use clap::{Args, Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use trigger_expr::cli::{self, CheckOptions, CliError, ConvertOptions};
use trigger_expr::output;
use trigger_expr::{Config, KeyMode};

#[derive(ClapParser)]
#[command(name = "trigex")]
#[command(about = "Parse trigger expressions and convert legacy trigger syntax")]
#[command(version)]
struct Cli {
    /// TOML file with [parser] and [converter] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and print the outcome as JSON
    Check {
        /// The expression (reads from stdin if not provided)
        expression: Option<String>,

        /// Include the AND/OR tree
        #[arg(long)]
        tree: bool,

        /// Include hosts, items and functions
        #[arg(long)]
        views: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        #[command(flatten)]
        flags: ParserFlags,
    },

    /// Convert legacy {host:key.func()} syntax
    Convert {
        /// The expression (reads from stdin if not provided)
        expression: Option<String>,

        /// Recovery expression converted together with the expression
        #[arg(short, long)]
        recovery: Option<String>,

        /// Host bound to {func()} short-form calls
        #[arg(long, requires = "item")]
        host: Option<String>,

        /// Item key bound to {func()} short-form calls
        #[arg(long, requires = "host")]
        item: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        #[command(flatten)]
        flags: ParserFlags,
    },
}

/// Parser switches; each one overrides the config file when given.
#[derive(Args)]
struct ParserFlags {
    /// Accept {$MACRO} user macros
    #[arg(long)]
    usermacros: bool,

    /// Accept {#MACRO} low-level discovery macros
    #[arg(long)]
    lldmacros: bool,

    /// Accept * as query host or key
    #[arg(long)]
    calculated: bool,

    /// Accept {N} function references instead of history functions
    #[arg(long)]
    collapsed: bool,

    /// Accept {HOST.HOST} as query host
    #[arg(long)]
    host_macro: bool,

    /// Accept legacy {host:key.func()} anchors
    #[arg(long)]
    legacy: bool,

    /// Treat commas as part of item keys, as in `ssh,21`
    #[arg(long)]
    simple_checks: bool,

    /// Maximum nesting depth
    #[arg(long)]
    max_depth: Option<usize>,
}

impl ParserFlags {
    fn apply(&self, config: &mut Config) {
        let parser = &mut config.parser;
        parser.usermacros |= self.usermacros;
        parser.lldmacros |= self.lldmacros;
        parser.calculated |= self.calculated;
        parser.collapsed_expression |= self.collapsed;
        parser.host_macro |= self.host_macro;
        parser.legacy_functions |= self.legacy;
        if self.simple_checks {
            parser.key_mode = KeyMode::SimpleChecks;
            config.converter.key_mode = KeyMode::SimpleChecks;
        }
        if let Some(max_depth) = self.max_depth {
            parser.max_depth = max_depth;
            config.converter.max_depth = max_depth;
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match load_config(cli.config.as_ref()) {
        Ok(config) => match cli.command {
            Commands::Check {
                expression,
                tree,
                views,
                pretty,
                flags,
            } => run_check(config, expression, tree, views, pretty, &flags),
            Commands::Convert {
                expression,
                recovery,
                host,
                item,
                pretty,
                flags,
            } => run_convert(config, expression, recovery, host, item, pretty, &flags),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, CliError> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

fn read_expression(expression: Option<String>) -> Result<String, CliError> {
    match expression {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
        }
        None => Err(CliError::NoInput),
    }
}

fn run_check(
    mut config: Config,
    expression: Option<String>,
    tree: bool,
    views: bool,
    pretty: bool,
    flags: &ParserFlags,
) -> Result<bool, CliError> {
    flags.apply(&mut config);
    let options = CheckOptions {
        expression: read_expression(expression)?,
        parser: config.parser,
        tree,
        views,
    };

    let result = cli::execute_check(&options)?;
    println!("{}", output::to_json(&result.output, pretty)?);
    Ok(result.is_success())
}

fn run_convert(
    mut config: Config,
    expression: Option<String>,
    recovery: Option<String>,
    host: Option<String>,
    item: Option<String>,
    pretty: bool,
    flags: &ParserFlags,
) -> Result<bool, CliError> {
    flags.apply(&mut config);
    let options = ConvertOptions {
        expression: read_expression(expression)?,
        recovery_expression: recovery,
        host,
        item,
        converter: config.converter,
    };

    let converted = cli::execute_convert(&options)?;
    println!("{}", output::to_json(&converted, pretty)?);
    Ok(true)
}
