//! srcmerge CLI - Merge a project's source files into one Markdown document.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde::Serialize;
use srcmerge::config::{MergeConfig, DEFAULT_EXTENSION, DEFAULT_LANGUAGE, DEFAULT_OUTPUT_NAME};
use srcmerge::errors::{exit_code, MergeError};
use srcmerge::tokens::Encoding;
use tracing::Level;

#[derive(Parser)]
#[command(name = "srcmerge")]
#[command(about = "Merge a project's source files into one fenced Markdown document")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    merge: MergeArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct MergeArgs {
    /// Root directory to scan
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Output file, joined onto the root (absolute paths used as-is)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
    output: PathBuf,

    /// Additional path fragments to exclude
    #[arg(short = 'x', long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Do not exclude node_modules and data by default
    #[arg(long)]
    no_default_excludes: bool,

    /// File-name suffix to merge
    #[arg(short, long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Language tag for the code fences
    #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// Write to a temporary file and rename it into place
    #[arg(long)]
    atomic: bool,

    /// Fail if a file contains a closing fence line
    #[arg(long)]
    strict_fences: bool,

    /// Token encoding for the report
    #[arg(long, default_value = "cl100k")]
    encoding: EncodingArg,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, ValueEnum)]
enum EncodingArg {
    Cl100k,
    O200k,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Cl100k => Encoding::Cl100kBase,
            EncodingArg::O200k => Encoding::O200kBase,
        }
    }
}

impl From<MergeArgs> for MergeConfig {
    fn from(args: MergeArgs) -> Self {
        let mut config = MergeConfig {
            root: args.root,
            output_name: args.output,
            extension: args.extension,
            language: args.lang,
            atomic: args.atomic,
            strict_fences: args.strict_fences,
            encoding: args.encoding.into(),
            ..Default::default()
        };
        if args.no_default_excludes {
            config.excludes.clear();
        }
        config
            .excludes
            .extend(args.exclude.into_iter().filter(|f| !f.is_empty()));
        config
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(Commands::Completions { shell }) = cli.command {
        generate(shell, &mut Cli::command(), "srcmerge", &mut std::io::stdout());
        return;
    }

    let json = cli.merge.json;
    let result = run_merge(cli.merge.into(), json);

    if let Err(e) = result {
        if json {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }

            let payload = ErrorOutput {
                error: e.to_string(),
            };

            let json = serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
            eprintln!("{json}");
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn run_merge(config: MergeConfig, json: bool) -> Result<(), MergeError> {
    let report = srcmerge::run(&config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(
            out,
            "Merged {} {} file(s) into {}.",
            report.files,
            config.extension,
            report.output.display()
        )?;
    }

    Ok(())
}
