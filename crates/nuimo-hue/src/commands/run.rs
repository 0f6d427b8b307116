//! `nuimo-hue run`: commission, then dispatch gestures until input ends.

use std::path::Path;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use nuimo_hue_config::ConfigFile;
use nuimo_hue_core::{
    CommissionError, CredentialStore, GestureDispatcher, LightingBridge, LightingController,
};

use crate::cli::RunArgs;
use crate::commands;
use crate::error::CliError;
use crate::transport::{JsonLinesFeedback, pump_gestures};

pub async fn handle(args: &RunArgs, config_path: &Path) -> Result<(), CliError> {
    let cfg = commands::load(config_path)?;
    let bridge = commands::hue_bridge(&cfg)?;

    let store = Arc::new(CredentialStore::new(
        cfg.credential(),
        ConfigFile::new(config_path),
    ));

    let cancel = CancellationToken::new();
    commands::cancel_on_ctrl_c(&cancel);

    if args.skip_setup {
        info!("bridge setup skipped");
    } else {
        match commands::commission(&cfg, &bridge, &store.current(), &cancel).await {
            Ok(credential) => {
                if let Err(e) = store.commit(credential) {
                    warn!(error = %e, "credential not saved, lighting stays disabled");
                }
            }
            Err(CommissionError::Cancelled) => return Ok(()),
            Err(e) => warn!(error = %e, "bridge setup failed, lighting stays disabled"),
        }
    }

    info!(
        broker = %cfg.mqtt.host,
        configured = store.current().is_configured(),
        "reading gesture events from stdin"
    );

    let controller = Arc::new(LightingController::new(
        bridge as Arc<dyn LightingBridge>,
        Arc::clone(&store),
    ));
    let dispatcher = GestureDispatcher::new(
        controller,
        Arc::new(JsonLinesFeedback::new(std::io::stdout())),
        Handle::current(),
    )
    .with_group(cfg.group());

    let input = BufReader::new(tokio::io::stdin());
    let dispatched = pump_gestures(input, &dispatcher, &cancel).await;

    info!(in_flight = dispatcher.in_flight(), "waiting for lighting calls");
    dispatcher.shutdown().await;

    let dispatched = dispatched?;
    info!(dispatched, "gesture input finished");
    Ok(())
}
