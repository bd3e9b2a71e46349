//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! validates the roots, and drives the engine for the chosen subcommand.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use tracing::debug;

use pattern_move::cli::{Args, Command, RunArgs};
use pattern_move::config::{self, validate_roots, Config};
use pattern_move::engine;
use pattern_move::output as out;
use pattern_move::{CancelToken, MoveStatus, OrganizeRequest, RunContext, RunOptions, SilentSink};

use crate::logging::init_tracing;
use crate::progress::BarSink;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        if let Ok(cfg_env) = std::env::var(config::xml::CONFIG_ENV) {
            out::print_info(&format!(
                "Using {} (explicit):\n  {}\n",
                config::xml::CONFIG_ENV,
                cfg_env
            ));
            out::print_info("To override, unset the variable or point it at another file.");
            return Ok(());
        }
        match config::default_config_path() {
            Some(p) => {
                out::print_info(&format!("Default pattern_move config path:\n  {}\n", p.display()));
                if p.exists() {
                    out::print_info("A config file already exists at that location.");
                } else {
                    out::print_info(
                        "No config file exists there yet. Run a subcommand to create a template.",
                    );
                }
            }
            None => {
                out::print_error("Could not determine a default config path on this system.");
            }
        }
        return Ok(());
    }

    // Load config; a freshly created template means "go edit this first".
    let mut cfg = match config::load_or_init()? {
        config::LoadResult::CreatedTemplate(path) => {
            out::print_success(&format!(
                "A template pattern_move config was written to: {}",
                path.display()
            ));
            out::print_info(
                "Edit the file to set `source_root` and `target_root` (or pass --source/--target), then re-run.",
            );
            return Ok(());
        }
        config::LoadResult::Loaded(cfg) => cfg,
        config::LoadResult::Defaults(cfg) => cfg,
    };

    let Some(command) = args.command.clone() else {
        bail!("no subcommand given; try `pattern_move preview` or `pattern_move commit --help`");
    };

    // Apply CLI overrides (CLI wins)
    if let Some(level) = args.effective_log_level() {
        cfg.log_level = level;
    }
    let run_args = match &command {
        Command::Preview(run) | Command::Commit(run) => run.clone(),
    };
    run_args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)?;

    // Cancellation: Ctrl-C trips the engine token and flushes file logs.
    let cancel = CancelToken::new();
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let cancel = cancel.clone();
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            cancel.request();
            out::print_warn("Received interrupt; finishing the current entry then stopping...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })?;
    }

    debug!("Starting pattern_move: {:?}", args);

    let result = match command {
        Command::Preview(run) => run_preview(&cfg, &run, cancel),
        Command::Commit(run) => run_commit(&cfg, &run, cancel),
    };

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn request_from(cfg: &Config) -> Result<OrganizeRequest> {
    let Some(source_root) = cfg.source_root.clone() else {
        bail!("no source root configured; pass --source or set `source_root` in the config file");
    };
    let Some(target_root) = cfg.target_root.clone() else {
        bail!("no target root configured; pass --target or set `target_root` in the config file");
    };
    validate_roots(&source_root, &target_root)?;
    Ok(OrganizeRequest {
        pattern: cfg.pattern.clone(),
        source_root,
        target_root,
    })
}

fn options_from(cfg: &Config, dry_run: bool) -> RunOptions {
    RunOptions {
        dry_run,
        workers: cfg.workers,
        probe_capture_time: cfg.probe_capture_time,
        prune_empty_dirs: cfg.prune_empty_dirs,
    }
}

fn maybe_save_config(cfg: &Config, requested: bool) {
    if !requested {
        return;
    }
    match config::xml::active_config_path() {
        Some(path) => {
            if let Err(e) = config::save_config(cfg, &path) {
                out::print_warn(&format!("Could not save config: {e}"));
            }
        }
        None => out::print_warn("Could not determine a config path to save to."),
    }
}

fn run_preview(cfg: &Config, run: &RunArgs, cancel: CancelToken) -> Result<()> {
    let req = request_from(cfg)?;
    let ctx = RunContext {
        cancel,
        progress: Arc::new(SilentSink),
    };

    let result = engine::preview(&req, &options_from(cfg, true), &ctx)?;
    for (src, dest) in &result.entries {
        out::print_mapping(src, dest);
    }
    for warning in &result.warnings {
        out::print_warn(warning);
    }
    out::print_info(&format!("{} file(s) mapped; nothing was moved.", result.entries.len()));

    maybe_save_config(cfg, run.save_config);
    Ok(())
}

fn run_commit(cfg: &Config, run: &RunArgs, cancel: CancelToken) -> Result<()> {
    let req = request_from(cfg)?;
    let bar = Arc::new(BarSink::new(if run.dry_run { "Checking" } else { "Moving" }));
    let ctx = RunContext {
        cancel: cancel.clone(),
        progress: bar.clone(),
    };

    let result = engine::commit(&req, &options_from(cfg, run.dry_run), &ctx)?;
    bar.finish();

    for warning in &result.warnings {
        out::print_warn(warning);
    }

    if run.dry_run {
        for mapping in &result.entries {
            if let Some(dest) = &mapping.destination {
                out::print_mapping(&mapping.entry.absolute_path, dest);
            }
        }
        out::print_info(&format!(
            "Dry-run: {} file(s) would be moved; nothing was touched.",
            result.entries.len() - result.skipped
        ));
        maybe_save_config(cfg, run.save_config);
        return Ok(());
    }

    for mapping in &result.entries {
        if let MoveStatus::Failed(reason) = &mapping.status {
            out::print_error(&format!(
                "{}: {}",
                mapping.entry.absolute_path.display(),
                reason
            ));
        }
    }

    let summary = format!(
        "{} moved, {} failed, {} skipped.",
        result.succeeded, result.failed, result.skipped
    );
    if cancel.is_requested() {
        out::print_warn(&format!("Cancelled: {summary}"));
    } else if result.failed == 0 {
        out::print_success(&summary);
    } else {
        // Partial failure is per-entry information, not a process failure.
        out::print_warn(&summary);
    }

    maybe_save_config(cfg, run.save_config);
    Ok(())
}
