use std::{collections::HashMap, fs};

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub username: String,
    pub domain: String,
    pub password: String,
    /// Default callee for a bare `call` command.
    pub callee: Option<String>,
}

/// Settings layering: defaults, then the config file, then `SOFTPHONE__*`
/// environment overrides.
pub fn load_settings(path: &str) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("username") {
                settings.username = v.clone();
            }
            if let Some(v) = file_cfg.get("domain") {
                settings.domain = v.clone();
            }
            if let Some(v) = file_cfg.get("password") {
                settings.password = v.clone();
            }
            if let Some(v) = file_cfg.get("callee") {
                settings.callee = Some(v.clone());
            }
        }
    }

    if let Ok(v) = std::env::var("SOFTPHONE__USERNAME") {
        settings.username = v;
    }
    if let Ok(v) = std::env::var("SOFTPHONE__DOMAIN") {
        settings.domain = v;
    }
    if let Ok(v) = std::env::var("SOFTPHONE__PASSWORD") {
        settings.password = v;
    }
    if let Ok(v) = std::env::var("SOFTPHONE__CALLEE") {
        settings.callee = Some(v);
    }

    settings
}
