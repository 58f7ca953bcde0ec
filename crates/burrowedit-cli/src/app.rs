//! Session orchestration
//!
//! Wires the preflight gate, the edit session and the optional restart
//! offer together: resolve target, escalate if shared, verify tools,
//! capture baseline, run the loop, then (shared targets only, after a
//! committed exit) offer the delayed daemon restart.

use crate::args::Cli;
use crate::{preflight, signal};
use burrowedit_core::restart::RestartCoordinator;
use burrowedit_core::{ConfigTarget, EditResult, EditSession, SessionOutcome, Settings};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use tracing::{info, warn};

pub async fn run(cli: Cli) -> EditResult<()> {
    let settings = Settings::from_env()?;
    let path = cli
        .config
        .unwrap_or_else(Settings::default_config_path);
    let target = ConfigTarget::resolve(&path, &settings)?;

    // all-or-nothing: a shared target edited unprivileged restarts the
    // whole invocation under sudo before anything else happens
    preflight::escalate_if_needed(&target)?;
    preflight::check_dependencies(&settings)?;

    info!(
        "editing {} ({} mode)",
        target.file.display(),
        if target.is_shared { "shared" } else { "private" }
    );

    let stdin = std::io::stdin();
    let mut session = EditSession::start(&settings, &target, stdin.lock()).await?;
    let _cleanup = signal::spawn_cleanup_task(session.scratch_path().to_path_buf())?;

    let outcome = session.run().await?;
    drop(session);

    if should_offer_restart(outcome, target.is_shared) {
        offer_restart(&settings);
    }
    Ok(())
}

/// The restart offer is reserved for shared targets after a committed
/// exit: private configs never restart the daemon, and quit/undo exits
/// changed nothing worth restarting for.
fn should_offer_restart(outcome: SessionOutcome, is_shared: bool) -> bool {
    is_shared && matches!(outcome, SessionOutcome::Committed { .. })
}

/// Yes/no prompt for the delayed daemon restart. Declining, or a
/// non-interactive stdin, simply skips the restart.
fn offer_restart(settings: &Settings) {
    let prompt = format!(
        "Restart burrowd in {} second(s)? The restart is detached and its outcome is not reported",
        settings.restart_delay_secs
    );
    match Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
    {
        Ok(true) => {
            if let Err(e) = RestartCoordinator::new(settings.restart_delay_secs).schedule_detached()
            {
                warn!("could not schedule restart: {e}");
                println!("{} {}", "⚠".yellow().bold(), "restart not scheduled".yellow());
            } else {
                println!(
                    "{} restart scheduled in {} second(s)",
                    "✓".green().bold(),
                    settings.restart_delay_secs
                );
            }
        }
        Ok(false) => println!("restart skipped"),
        Err(e) => warn!("restart prompt unavailable: {e}"),
    }
}
