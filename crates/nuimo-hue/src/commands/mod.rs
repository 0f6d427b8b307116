//! Subcommand handlers and the wiring they share.

pub mod config_cmd;
pub mod run;
pub mod setup;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use nuimo_hue_config::Config;
use nuimo_hue_core::{
    BridgeCommissioner, BridgeCredential, CommissionError, CommissioningState, HueBridge,
};

use crate::error::CliError;

/// Load and validate the config at `path`.
pub fn load(path: &Path) -> Result<Config, CliError> {
    nuimo_hue_config::load_config(path).map_err(|e| CliError::config(path, e))
}

/// The HTTP bridge adapter configured from `cfg`.
pub fn hue_bridge(cfg: &Config) -> Result<Arc<HueBridge>, CliError> {
    let discovery_url = cfg
        .discovery_url()
        .map_err(|e| CliError::config(Path::new("hue.discovery_url"), e))?;
    Ok(Arc::new(HueBridge::new(discovery_url, &cfg.transport())?))
}

/// Cancel `token` on Ctrl-C.
pub fn cancel_on_ctrl_c(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            token.cancel();
        }
    });
}

/// Run the commissioner for `stored`, echoing operator prompts to stderr.
pub async fn commission(
    cfg: &Config,
    bridge: &Arc<HueBridge>,
    stored: &BridgeCredential,
    cancel: &CancellationToken,
) -> Result<BridgeCredential, CommissionError> {
    let commissioner = BridgeCommissioner::new(bridge.clone(), bridge.clone())
        .with_policy(cfg.retry_policy())
        .with_app_description(cfg.commissioning.app_description.clone())
        .with_cancellation(cancel.clone());

    let mut state = commissioner.state();
    let prompts = tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let current = state.borrow_and_update().clone();
            print_progress(&current);
        }
    });

    let result = commissioner.ensure_credential(stored).await;
    drop(commissioner);
    if prompts.await.is_err() {
        debug!("progress printer ended abnormally");
    }
    result
}

fn print_progress(state: &CommissioningState) {
    match state {
        CommissioningState::Discovering => eprintln!("Searching for a Hue bridge..."),
        CommissioningState::AwaitingLinkButton {
            attempt,
            max_attempts,
        } => {
            eprintln!("Press the link button on the bridge ({attempt}/{max_attempts})");
        }
        CommissioningState::Registered { host } => eprintln!("Registered with bridge at {host}"),
        CommissioningState::Idle | CommissioningState::Failed => {}
    }
}

/// Username shown to the operator.
pub fn display_username(username: &str, show_secret: bool) -> &str {
    if show_secret || username.is_empty() {
        username
    } else {
        "****"
    }
}
