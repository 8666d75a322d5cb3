use anyhow::{Context, Result};
use log::info;

use janus_sip_phone::components::App;
use janus_sip_phone::PhoneConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Fail early on a bad environment; the UI loads its own copy
    let config = PhoneConfig::from_env().context("invalid JANUS_* environment")?;
    info!("Starting Janus SIP phone (gateway: {})", config.servers.join(", "));

    // Launch the Dioxus desktop application
    dioxus::launch(App);
    Ok(())
}
