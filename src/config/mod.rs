// src/config/mod.rs
pub mod settings;

pub use settings::{config_path, load_config, Config, ConfigError, Settings};

const ENV_PREFIX: &str = "env:";

/// Resolve `env:VAR_NAME` entries against the process environment.
/// Unset (or empty) variables drop the entry with a warning.
pub fn resolve_apprise_urls(urls: &[String]) -> Vec<String> {
    resolve_apprise_urls_with(urls, |name| std::env::var(name).ok())
}

pub fn resolve_apprise_urls_with<F>(urls: &[String], lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = Vec::with_capacity(urls.len());
    for url in urls {
        let Some(var) = url.strip_prefix(ENV_PREFIX) else {
            out.push(url.clone());
            continue;
        };
        match lookup(var).filter(|v| !v.is_empty()) {
            Some(value) => out.push(value),
            None => tracing::warn!(
                var = var,
                "environment variable not set for apprise url; skipping"
            ),
        }
    }
    out
}
