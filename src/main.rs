mod api;

use levelsynth::{ConfigError, SynthConfig};

const DEFAULT_CONFIG_PATH: &str = "levelsynth.json";

fn load_startup_config() -> SynthConfig {
    let path = std::env::var("LEVELSYNTH_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    match SynthConfig::load(&path) {
        Ok(cfg) => {
            log::info!("[levelsynth] Loaded config from {}", path);
            cfg
        }
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            log::info!("[levelsynth] No config at {}, using defaults", path);
            SynthConfig::default()
        }
        Err(e) => {
            log::error!("[levelsynth] {}; falling back to defaults", e);
            SynthConfig::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_startup_config();
    let limits = config.traversal();
    log::info!(
        "[levelsynth] jump envelope: vertical {:.3}, horizontal {:.3}",
        limits.max_vertical,
        limits.max_horizontal
    );

    let security = api::ApiSecurity::from_env();
    if security.required_token.is_some() {
        log::info!("[levelsynth] API token required");
    }
    let addr = api::addr_from_env();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("[levelsynth] Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(api::serve(config, security, &addr)) {
        log::error!("[levelsynth] Server error on {}: {}", addr, e);
        std::process::exit(1);
    }
}
