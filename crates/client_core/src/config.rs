use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use shared::domain::Network;

pub const DEFAULT_CONFIG_FILE: &str = "counter.toml";
pub const DEFAULT_TESTNET_PACKAGE_ID: &str =
    "0xd02169b249fefd7dc89c8cd3ad2666ef085163cb99fae199a0f08d795712af9f";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub rpc_url: String,
    /// May be empty or a placeholder; validated when a call is built.
    pub package_id: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub network: Network,
    pub networks: BTreeMap<Network, NetworkSettings>,
    pub wallet_url: Option<String>,
    pub poll_interval: Duration,
    pub confirmation_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        let networks = Network::ALL
            .into_iter()
            .map(|network| {
                let package_id = match network {
                    Network::Localnet => "counter-localnet",
                    Network::Devnet => "counter-devnet",
                    Network::Testnet => DEFAULT_TESTNET_PACKAGE_ID,
                    Network::Mainnet => "",
                };
                (
                    network,
                    NetworkSettings {
                        rpc_url: network.default_rpc_url().to_string(),
                        package_id: package_id.to_string(),
                    },
                )
            })
            .collect();

        Self {
            network: Network::Testnet,
            networks,
            wallet_url: None,
            poll_interval: Duration::from_secs(2),
            confirmation_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    network: Option<String>,
    wallet_url: Option<String>,
    poll_interval_ms: Option<u64>,
    confirmation_timeout_secs: Option<u64>,
    networks: HashMap<String, FileNetworkSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileNetworkSettings {
    rpc_url: Option<String>,
    package_id: Option<String>,
}

impl Settings {
    pub fn active(&self) -> &NetworkSettings {
        // Every network is populated by `Default` and never removed.
        &self.networks[&self.network]
    }

    pub fn network_mut(&mut self, network: Network) -> &mut NetworkSettings {
        self.networks
            .entry(network)
            .or_insert_with(|| NetworkSettings {
                rpc_url: network.default_rpc_url().to_string(),
                package_id: String::new(),
            })
    }

    pub fn apply_toml(&mut self, raw: &str) -> Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid counter config")?;

        if let Some(v) = file_cfg.network {
            self.network = v.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Some(v) = file_cfg.wallet_url {
            self.wallet_url = Some(v);
        }
        if let Some(v) = file_cfg.poll_interval_ms {
            self.poll_interval = Duration::from_millis(v);
        }
        if let Some(v) = file_cfg.confirmation_timeout_secs {
            self.confirmation_timeout = Duration::from_secs(v);
        }
        for (name, network_cfg) in file_cfg.networks {
            let network: Network = name.parse().map_err(|e: String| anyhow!(e))?;
            let entry = self.network_mut(network);
            if let Some(v) = network_cfg.rpc_url {
                entry.rpc_url = v;
            }
            if let Some(v) = network_cfg.package_id {
                entry.package_id = v;
            }
        }
        Ok(())
    }

    /// Applies `COUNTER_*` / `APP__*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("COUNTER_NETWORK").or_else(|| lookup("APP__NETWORK")) {
            self.network = v.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Some(v) = lookup("COUNTER_WALLET_URL").or_else(|| lookup("APP__WALLET_URL")) {
            self.wallet_url = Some(v);
        }
        if let Some(v) = lookup("APP__CONFIRMATION_TIMEOUT_SECS") {
            let secs = v
                .parse::<u64>()
                .with_context(|| format!("invalid APP__CONFIRMATION_TIMEOUT_SECS '{v}'"))?;
            self.confirmation_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("APP__POLL_INTERVAL_MS") {
            let millis = v
                .parse::<u64>()
                .with_context(|| format!("invalid APP__POLL_INTERVAL_MS '{v}'"))?;
            self.poll_interval = Duration::from_millis(millis);
        }

        for network in Network::ALL {
            let prefix = format!("APP__{}", network.as_str().to_ascii_uppercase());
            if let Some(v) = lookup(&format!("{prefix}_PACKAGE_ID")) {
                self.network_mut(network).package_id = v;
            }
            if let Some(v) = lookup(&format!("{prefix}_RPC_URL")) {
                self.network_mut(network).rpc_url = v;
            }
        }
        Ok(())
    }
}

/// Builds settings from defaults, then the config file, then the environment.
///
/// An explicit `path` must exist; the default `counter.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{}'", path.display()))?;
            settings.apply_toml(&raw)?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                settings.apply_toml(&raw)?;
            }
        }
    }

    settings.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_network() {
        let settings = Settings::default();
        assert_eq!(settings.network, Network::Testnet);
        assert_eq!(settings.active().package_id, DEFAULT_TESTNET_PACKAGE_ID);
        assert_eq!(settings.networks[&Network::Mainnet].package_id, "");
        assert_eq!(
            settings.networks[&Network::Localnet].rpc_url,
            "http://127.0.0.1:9000"
        );
        assert_eq!(settings.confirmation_timeout, Duration::from_secs(60));
    }

    #[test]
    fn file_overrides_selected_fields() {
        let mut settings = Settings::default();
        settings
            .apply_toml(
                r#"
                network = "devnet"
                wallet_url = "http://127.0.0.1:9555"
                confirmation_timeout_secs = 5

                [networks.devnet]
                package_id = "0xabc"
                "#,
            )
            .expect("apply");

        assert_eq!(settings.network, Network::Devnet);
        assert_eq!(settings.active().package_id, "0xabc");
        assert_eq!(
            settings.active().rpc_url,
            Network::Devnet.default_rpc_url()
        );
        assert_eq!(settings.wallet_url.as_deref(), Some("http://127.0.0.1:9555"));
        assert_eq!(settings.confirmation_timeout, Duration::from_secs(5));
    }

    #[test]
    fn unknown_network_in_file_is_rejected() {
        let mut settings = Settings::default();
        let err = settings
            .apply_toml("network = \"betanet\"")
            .expect_err("must fail");
        assert!(err.to_string().contains("betanet"));
    }

    #[test]
    fn environment_wins_over_defaults() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("COUNTER_NETWORK", "mainnet"),
            ("APP__MAINNET_PACKAGE_ID", "0xfeed"),
            ("APP__CONFIRMATION_TIMEOUT_SECS", "90"),
            ("APP__POLL_INTERVAL_MS", "500"),
        ]);
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .expect("apply");

        assert_eq!(settings.network, Network::Mainnet);
        assert_eq!(settings.active().package_id, "0xfeed");
        assert_eq!(settings.confirmation_timeout, Duration::from_secs(90));
        assert_eq!(settings.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn malformed_durations_in_environment_are_rejected() {
        for (key, value) in [
            ("APP__CONFIRMATION_TIMEOUT_SECS", "not-a-number"),
            ("APP__POLL_INTERVAL_MS", "-5"),
        ] {
            let mut settings = Settings::default();
            let err = settings
                .apply_env_overrides(|k| (k == key).then(|| value.to_string()))
                .expect_err("must fail");
            assert!(err.to_string().contains(key), "{err}");
        }
    }
}
