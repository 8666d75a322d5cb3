use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::gateway::protocol::random_string;
use crate::sip_messages::SrtpMode;

pub const SIP_PLUGIN: &str = "janus.plugin.sip";
pub const DEFAULT_SERVER: &str = "http://localhost:8088/janus";

/// Gateway-side settings. SIP settings come from the login form.
#[derive(Debug, Clone)]
pub struct PhoneConfig {
    /// Gateway endpoints, tried in order until one creates a session.
    pub servers: Vec<String>,
    pub plugin: String,
    pub opaque_id: String,
    pub keepalive_interval: Duration,
    pub long_poll_max_events: u32,
    /// Must outlive the gateway's long-poll hold time.
    pub request_timeout: Duration,
    /// SDES preference for outgoing calls.
    pub call_srtp: Option<SrtpMode>,
    /// SDES preference when accepting; `None` follows the caller.
    pub accept_srtp: Option<SrtpMode>,
    pub call_headers: BTreeMap<String, String>,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            servers: vec![DEFAULT_SERVER.to_string()],
            plugin: SIP_PLUGIN.to_string(),
            opaque_id: format!("siptest-{}", random_string(12)),
            keepalive_interval: Duration::from_secs(25),
            long_poll_max_events: 10,
            request_timeout: Duration::from_secs(60),
            call_srtp: None,
            accept_srtp: None,
            call_headers: BTreeMap::new(),
        }
    }
}

impl PhoneConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `JANUS_*` variables served by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(servers) = lookup("JANUS_SERVER") {
            config.servers = servers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if config.servers.is_empty() {
                bail!("JANUS_SERVER is set but lists no server");
            }
        }

        if let Some(secs) = lookup("JANUS_KEEPALIVE_SECS") {
            let secs: u64 = secs.parse().context("JANUS_KEEPALIVE_SECS must be a number of seconds")?;
            if secs == 0 {
                bail!("JANUS_KEEPALIVE_SECS must be greater than zero");
            }
            config.keepalive_interval = Duration::from_secs(secs);
        }

        if let Some(secs) = lookup("JANUS_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().context("JANUS_REQUEST_TIMEOUT_SECS must be a number of seconds")?;
            if secs == 0 {
                bail!("JANUS_REQUEST_TIMEOUT_SECS must be greater than zero");
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(mode) = lookup("JANUS_SIP_SRTP") {
            config.call_srtp = Some(mode.parse().map_err(anyhow::Error::msg).context("JANUS_SIP_SRTP")?);
        }

        if let Some(mode) = lookup("JANUS_SIP_ACCEPT_SRTP") {
            config.accept_srtp = Some(mode.parse().map_err(anyhow::Error::msg).context("JANUS_SIP_ACCEPT_SRTP")?);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PhoneConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.servers, vec![DEFAULT_SERVER.to_string()]);
        assert_eq!(config.plugin, "janus.plugin.sip");
        assert!(config.opaque_id.starts_with("siptest-"));
        assert_eq!(config.opaque_id.len(), "siptest-".len() + 12);
        assert_eq!(config.call_srtp, None);
    }

    #[test]
    fn test_server_list_and_srtp() {
        let config = PhoneConfig::from_lookup(lookup(&[
            ("JANUS_SERVER", "ws://gw:8188, http://gw:8088/janus"),
            ("JANUS_SIP_SRTP", "sdes_mandatory"),
            ("JANUS_KEEPALIVE_SECS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.servers, vec!["ws://gw:8188".to_string(), "http://gw:8088/janus".to_string()]);
        assert_eq!(config.call_srtp, Some(SrtpMode::SdesMandatory));
        assert_eq!(config.keepalive_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(PhoneConfig::from_lookup(lookup(&[("JANUS_KEEPALIVE_SECS", "0")])).is_err());
        assert!(PhoneConfig::from_lookup(lookup(&[("JANUS_KEEPALIVE_SECS", "soon")])).is_err());
        assert!(PhoneConfig::from_lookup(lookup(&[("JANUS_REQUEST_TIMEOUT_SECS", "0")])).is_err());
        assert!(PhoneConfig::from_lookup(lookup(&[("JANUS_SERVER", " , ")])).is_err());
        assert!(PhoneConfig::from_lookup(lookup(&[("JANUS_SIP_SRTP", "dtls")])).is_err());
    }
}
