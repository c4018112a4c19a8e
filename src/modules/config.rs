use std::fs;
use std::path::Path;

use crate::proxy::config::{RegistryConfig, ServerConfig, SigningKeyConfig, UiConfig, DEFAULT_API_URL};

pub const ENV_KEY_ID: &str = "OBJECT_REGISTRY_KEY_ID";
pub const ENV_PRIVATE_KEY: &str = "OBJECT_REGISTRY_PRIVATE_KEY";
pub const ENV_API_URL: &str = "OBJECT_REGISTRY_API_URL";
pub const ENV_CONFIG_FILE: &str = "OBJECT_REGISTRY_UI_CONFIG";
pub const ENV_BIND: &str = "OBJECT_REGISTRY_UI_BIND";
pub const ENV_PORT: &str = "OBJECT_REGISTRY_UI_PORT";
pub const ENV_ALLOW_LAN: &str = "OBJECT_REGISTRY_UI_ALLOW_LAN";

/// Load the full configuration from the process environment.
pub fn load_ui_config() -> UiConfig {
    load_ui_config_from(|name| std::env::var(name).ok())
}

/// Load the configuration through an arbitrary variable lookup.
///
/// Tests pass a map-backed closure instead of touching the process environment.
pub fn load_ui_config_from<F>(lookup: F) -> UiConfig
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let mut server = match lookup(ENV_CONFIG_FILE) {
        Some(path) => match load_server_config(Path::new(&path)) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!("failed to load server config: {}. using defaults", err);
                ServerConfig::default()
            }
        },
        None => ServerConfig::default(),
    };

    if let Some(value) = lookup(ENV_ALLOW_LAN) {
        if is_truthy(&value) {
            server.allow_lan_access = true;
        }
    }

    if let Some(addr) = lookup(ENV_BIND) {
        if addr != "127.0.0.1" && addr != "localhost" {
            server.allow_lan_access = true;
        }
        server.bind_address = Some(addr);
    }

    if let Some(port) = lookup(ENV_PORT) {
        match port.parse::<u16>() {
            Ok(port) => server.port = port,
            Err(_) => tracing::warn!(value = %port, "ignoring invalid {}", ENV_PORT),
        }
    }

    let signing = match (lookup(ENV_KEY_ID), lookup(ENV_PRIVATE_KEY)) {
        (Some(key_id), Some(pem)) => Some(SigningKeyConfig {
            key_id,
            private_key_pem: normalize_pem(&pem),
        }),
        _ => None,
    };

    let api_url = lookup(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());

    UiConfig {
        registry: RegistryConfig::new(api_url, signing),
        server,
    }
}

/// Read the JSON server settings file
pub fn load_server_config(path: &Path) -> Result<ServerConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Env files usually carry PEM keys on one line with literal `\n` escapes.
fn normalize_pem(raw: &str) -> String {
    if raw.contains('\n') {
        raw.to_string()
    } else {
        raw.replace("\\n", "\n")
    }
}
