//! SENTRA restricted host entry point.
//!
//! Bootstraps the audit subsystem in restricted mode: the logging hook is
//! installed before anything else runs, every audited event lands in the
//! log file, and no further hooks or global resolutions are permitted.
//!
//! ## CLI Subcommands
//!
//! - `sentra-cli decode <payload.json>` - Decode a payload in restricted mode
//! - `sentra-cli restricted-probe` - Enter restricted mode, attempt a second hook, exit
//! - `sentra-cli finalize-probe` - Register a stderr probe hook and exit through finalization
//! - `sentra-cli config show` - Print effective configuration as JSON

use std::process::ExitCode;

use rand::RngCore;
use serde_json::Value;
use sentra_core::config;
use sentra_core::error::AuditError;
use sentra_core::hooks::AuditHook;
use sentra_core::sites::{GlobalResolver, PayloadDecoder};
use sentra_core::telemetry::{init_logging, init_metrics};
use sentra_core::{add_hook, finalize_hooks, global_engine, restricted};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "decode" => {
            let Some(path) = args.get(2) else {
                eprintln!("usage: sentra-cli decode <payload.json>");
                return ExitCode::FAILURE;
            };
            run_decode(path)
        }
        "restricted-probe" => run_restricted_probe(),
        "finalize-probe" => run_finalize_probe(),
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let cfg = config::load();
                    match serde_json::to_string_pretty(&cfg.effective_config()) {
                        Ok(json) => {
                            println!("{json}");
                            ExitCode::SUCCESS
                        }
                        Err(e) => {
                            eprintln!("config error: {e}");
                            ExitCode::FAILURE
                        }
                    }
                }
                _ => {
                    eprintln!("Unknown config subcommand: {subcommand}");
                    ExitCode::FAILURE
                }
            }
        }
        "version" | "--version" | "-V" => {
            println!("sentra-cli {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!("usage: sentra-cli <command>");
    println!();
    println!("commands:");
    println!("  decode <payload.json>   decode a payload in restricted mode");
    println!("  restricted-probe        enter restricted mode and exit (for harnesses)");
    println!("  finalize-probe          register a probe hook and exit (for harnesses)");
    println!("  config show             print effective configuration");
    println!("  version                 print version");
}

/// Decode a payload file under restricted policy.
///
/// Any global reference in the payload is vetoed by the logging hook, so
/// only plain-data payloads decode successfully.
fn run_decode(path: &str) -> ExitCode {
    let cfg = config::load();
    if let Err(e) = init_logging(&cfg.log) {
        eprintln!("logging init failed: {e}");
        return ExitCode::FAILURE;
    }
    init_metrics();

    let engine = global_engine();
    if let Err(e) = restricted::install(engine, &cfg) {
        eprintln!("restricted mode failed: {e}");
        return ExitCode::FAILURE;
    }

    let payload = match std::fs::read_to_string(path) {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("failed to read {path}: {e}");
            finalize_hooks();
            return ExitCode::FAILURE;
        }
    };

    let decoder = PayloadDecoder::new(engine.clone(), GlobalResolver::with_builtins());
    let code = match decoder.decode_str(&payload) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("decode rejected: {e}");
            ExitCode::FAILURE
        }
    };
    finalize_hooks();
    code
}

/// Subprocess probe: restricted mode must silently block a second hook
/// and the log must record both the attempt and the final clearance.
/// Writes nothing to stdout or stderr on success.
fn run_restricted_probe() -> ExitCode {
    let cfg = config::load();
    let engine = global_engine();
    if let Err(e) = restricted::install(engine, &cfg) {
        eprintln!("restricted mode failed: {e}");
        return ExitCode::FAILURE;
    }

    // Doesn't matter what we add - it will be blocked.
    let noop = |_: &str, _: &[Value]| -> Result<(), AuditError> { Ok(()) };
    if add_hook(std::sync::Arc::new(noop)).is_err() {
        eprintln!("registration unexpectedly raised");
        return ExitCode::FAILURE;
    }
    if global_engine().hook_count() != 1 {
        eprintln!("second hook was not blocked");
        return ExitCode::FAILURE;
    }

    finalize_hooks();
    ExitCode::SUCCESS
}

/// Stderr probe hook used by the finalization harness.
///
/// Prints its identity at creation, at every observed event, and at drop,
/// so a parent process can assert the notify-then-release ordering.
struct FinalizeProbe {
    id: String,
}

impl FinalizeProbe {
    fn new() -> Self {
        let mut bytes = [0u8; 4];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let id = hex::encode(bytes);
        eprintln!("Created {id}");
        Self { id }
    }
}

impl AuditHook for FinalizeProbe {
    fn on_event(&self, event: &str, _args: &[Value]) -> Result<(), AuditError> {
        eprintln!("{event} {}", self.id);
        if event == sentra_core::event::names::CLEAR_AUDIT_HOOKS {
            // Must be discarded by the broadcaster.
            return Err(AuditError::fatal("should be ignored"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "finalize-probe"
    }
}

impl Drop for FinalizeProbe {
    fn drop(&mut self) {
        eprintln!("Finalized {}", self.id);
    }
}

fn run_finalize_probe() -> ExitCode {
    if add_hook(std::sync::Arc::new(FinalizeProbe::new())).is_err() {
        eprintln!("probe registration raised");
        return ExitCode::FAILURE;
    }
    finalize_hooks();
    ExitCode::SUCCESS
}
