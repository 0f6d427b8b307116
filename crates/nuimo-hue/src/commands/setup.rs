//! `nuimo-hue setup`: commission the bridge and save the credential.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use nuimo_hue_config::ConfigFile;
use nuimo_hue_core::CredentialStore;

use crate::cli::SetupArgs;
use crate::commands;
use crate::error::CliError;

pub async fn handle(args: &SetupArgs, config_path: &Path) -> Result<(), CliError> {
    let cfg = commands::load(config_path)?;
    let bridge = commands::hue_bridge(&cfg)?;
    let store = CredentialStore::new(cfg.credential(), ConfigFile::new(config_path));

    let cancel = CancellationToken::new();
    commands::cancel_on_ctrl_c(&cancel);

    let credential = commands::commission(&cfg, &bridge, &store.current(), &cancel).await?;
    store.commit(credential.clone())?;

    println!("host = {}", credential.host);
    println!(
        "username = {}",
        commands::display_username(&credential.username, args.show_secret)
    );
    eprintln!("Saved to {}", config_path.display());
    Ok(())
}
