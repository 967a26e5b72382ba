use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};
use std::sync::Once;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ms_core::runtime::output::{exit_message, style_line};
use ms_core::runtime::resolve_interpreter;
use ms_core::{Diagnostic, MsAnalyzer, RuntimeConfig, Severity, TokenKind, Tokenizer};
use serde::Serialize;
use tracing::debug;


static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "ms_core=debug,ms=debug";
const DEFAULT_CONFIG_FILE: &str = "ms.toml";

#[derive(Debug, Parser)]
#[command(name = "ms", author, version, about = "Static checks and tooling for ms scripts", long_about = None)]
struct CliArgs {
    /// Settings file; `./ms.toml` is used when present
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report diagnostics for a script.
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,

        /// Interpreter executable used for the external check
        #[arg(long, value_name = "PATH")]
        runtime: Option<PathBuf>,

        /// Skip the interpreter and run only the static checks
        #[arg(long, conflicts_with = "runtime")]
        no_interpreter: bool,
    },
    /// Print the token stream of a script as JSON.
    Tokens {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run a script with the interpreter, colouring its log lines.
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, value_name = "PATH")]
        runtime: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct TokenRecord<'a> {
    kind: TokenKind,
    start: usize,
    end: usize,
    text: &'a str,
}

fn read_file_content(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path.display()))
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("1")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("on")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Logging stays off unless `MS_TRACE` is set; its value may be a filter expression.
fn maybe_init_tracing() {
    let raw = match std::env::var("MS_TRACE") {
        Ok(value) => value,
        Err(_) => return,
    };

    if !env_toggle_enabled(&raw) {
        return;
    }

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let filter_expr = filter_expr_from(&raw).or_else(|| std::env::var("RUST_LOG").ok());

        let builder = fmt().with_writer(std::io::stderr);

        let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

fn parse_config(src: &str) -> anyhow::Result<RuntimeConfig> {
    Ok(toml::from_str(src)?)
}

/// Explicit `--config` must exist; the implicit `ms.toml` is optional.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let implicit = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !implicit.is_file() {
                return Ok(RuntimeConfig::default());
            }
            implicit
        }
    };
    let src = read_file_content(&path)?;
    parse_config(&src).with_context(|| format!("Invalid configuration in '{}'", path.display()))
}

fn workspace_folders() -> Vec<PathBuf> {
    std::env::current_dir().map(|d| vec![d]).unwrap_or_default()
}

/// `--runtime` beats the settings file and auto-detection.
fn pick_interpreter(config: &RuntimeConfig, runtime: Option<PathBuf>) -> Option<PathBuf> {
    runtime.or_else(|| resolve_interpreter(config, &workspace_folders()))
}

/// `LINE:COL: severity: message`, one-based.
fn format_diagnostic(d: &Diagnostic) -> String {
    format!(
        "{}:{}: {}: {}",
        d.range.start_line + 1,
        d.range.start_col + 1,
        d.severity,
        d.message
    )
}

fn run_check(
    config: &RuntimeConfig,
    file: &Path,
    json: bool,
    runtime: Option<PathBuf>,
    no_interpreter: bool,
) -> anyhow::Result<ExitCode> {
    let src = read_file_content(file)?;
    let interpreter = if no_interpreter {
        None
    } else {
        pick_interpreter(config, runtime)
    };
    debug!(interpreter = ?interpreter, file = %file.display(), "checking");

    let result = MsAnalyzer::new().with_interpreter(interpreter).analyze(&src);
    if json {
        println!("{}", serde_json::to_string_pretty(&result.diagnostics)?);
    } else {
        for d in &result.diagnostics {
            println!("{}", format_diagnostic(d));
        }
    }

    let failed = result.diagnostics.iter().any(|d| d.severity == Severity::Error);
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn run_tokens(file: &Path) -> anyhow::Result<()> {
    let src = read_file_content(file)?;
    let records: Vec<TokenRecord<'_>> = Tokenizer::new(&src)
        .map(|t| TokenRecord {
            kind: t.kind,
            start: t.start,
            end: t.end,
            text: t.text(&src),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn pump_styled<R: Read>(reader: R) {
    let stdout = std::io::stdout();
    for line in BufReader::new(reader).lines().map_while(Result::ok) {
        if line.trim().is_empty() {
            continue;
        }
        let _ = writeln!(stdout.lock(), "{}", style_line(&line));
    }
}

fn run_script(config: &RuntimeConfig, file: &Path, runtime: Option<PathBuf>) -> anyhow::Result<()> {
    let exe = pick_interpreter(config, runtime)
        .context("No ms interpreter found; set runtimePath in ms.toml or pass --runtime")?;

    let mut child = Command::new(&exe)
        .args(&config.args)
        .arg(file)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to start interpreter '{}'", exe.display()))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    std::thread::scope(|s| {
        if let Some(pipe) = stdout {
            s.spawn(|| pump_styled(pipe));
        }
        if let Some(pipe) = stderr {
            s.spawn(|| pump_styled(pipe));
        }
    });

    let status = child.wait().context("Failed to wait for interpreter")?;
    if config.show_process_exit {
        println!("\n{}", exit_message(status.code()));
    }
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    maybe_init_tracing();
    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Check {
            file,
            json,
            runtime,
            no_interpreter,
        } => run_check(&config, &file, json, runtime, no_interpreter),
        Commands::Tokens { file } => run_tokens(&file).map(|_| ExitCode::SUCCESS),
        Commands::Run { file, runtime } => run_script(&config, &file, runtime).map(|_| ExitCode::SUCCESS),
    }
}
