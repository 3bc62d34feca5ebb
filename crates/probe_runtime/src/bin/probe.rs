//! Probe CLI entry point.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use probe_engine::{CommandRunner, RunnerConfig, config::parse_millis};
use probe_runtime::{Document, Repl, format_result, init_tracing, install_demo_host};
use tracing::Level;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    commands: Vec<String>,
    files: Vec<PathBuf>,
    settle: Option<Duration>,
    json: bool,
    show_help: bool,
    show_version: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("\x1b[31mError: {e:#}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig> {
    let mut config = CliConfig::default();
    let mut args = args.into_iter().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--json" => config.json = true,
            "-c" | "--command" => {
                let Some(command) = args.next() else {
                    bail!("{arg} requires a command");
                };
                config.commands.push(command);
            }
            "--settle-ms" => {
                let Some(value) = args.next() else {
                    bail!("--settle-ms requires a value");
                };
                let Some(delay) = parse_millis(&value) else {
                    bail!("invalid --settle-ms value: {value}");
                };
                config.settle = Some(delay);
            }
            other if other.starts_with('-') => bail!("unknown option: {other}"),
            path => config.files.push(PathBuf::from(path)),
        }
    }

    Ok(config)
}

/// Returns whether every run succeeded.
fn run(args: Vec<String>) -> Result<bool> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(true);
    }
    if config.show_version {
        println!("probe {}", env!("CARGO_PKG_VERSION"));
        return Ok(true);
    }

    let mut runner_config = RunnerConfig::from_env();
    if let Some(delay) = config.settle {
        runner_config = runner_config.with_settle_delay(delay);
    }

    let document = Document::sample();
    let mut runner = CommandRunner::new(runner_config);
    install_demo_host(&mut runner, &document);
    init_tracing(Some(runner.log_queue().clone()), Level::WARN);

    let mut sources = Vec::new();
    for file in &config.files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        sources.push(text);
    }
    sources.extend(config.commands);

    if sources.is_empty() {
        Repl::new(runner)?.with_document(document).run()?;
        return Ok(true);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;

    let mut all_ok = true;
    for source in &sources {
        let result = runtime.block_on(runner.run(source));
        all_ok &= result.ok;
        if config.json {
            println!("{}", result.to_json()?);
        } else {
            print!("{}", format_result(&result));
        }
    }
    Ok(all_ok)
}

fn print_help() {
    println!(
        "\x1b[1mProbe\x1b[0m - Sandboxed command console

\x1b[1mUSAGE:\x1b[0m
    probe [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Script files; each file is one run

\x1b[1mOPTIONS:\x1b[0m
    -c, --command <CMD>    Run CMD (may be repeated)
        --settle-ms <MS>   Wait MS milliseconds for late errors (default 10)
        --json             Print each result as JSON
    -h, --help             Print help
    -V, --version          Print version

With no files or commands, starts the interactive console.

\x1b[1mENVIRONMENT:\x1b[0m
    PROBE_SETTLE_MS    Default settle delay in milliseconds
    RUST_LOG           Diagnostic log filter"
    );
}
