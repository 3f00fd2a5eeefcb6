use crate::config::types::{Config, CrawlerConfig, PdfConfig, StorageConfig, TargetConfig};
use crate::url::host_key;
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    for target in &config.targets {
        validate_target(target)?;
    }
    validate_pdf_config(&config.pdf)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if !config.throttle_seconds.is_finite() || config.throttle_seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "throttle-seconds must be a non-negative number, got {}",
            config.throttle_seconds
        )));
    }

    if Duration::try_from_secs_f64(config.throttle_seconds).is_err() {
        return Err(ConfigError::Validation(format!(
            "throttle-seconds is too large, got {}",
            config.throttle_seconds
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    // max_depth >= 0 is always true for u32

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    for (name, dir) in [
        ("html-dir", &config.html_dir),
        ("pdf-dir", &config.pdf_dir),
        ("meta-dir", &config.meta_dir),
    ] {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }
    Ok(())
}

/// Validates one crawl target
fn validate_target(target: &TargetConfig) -> Result<(), ConfigError> {
    let base = parse_http_url(&target.base, "base")?;
    let base_host = host_key(&base);

    if target.allow_paths.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Target '{}' must have at least one allow-path",
            target.base
        )));
    }
    validate_prefixes(&target.allow_paths, &target.base)?;

    if target.start_urls.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Target '{}' must have at least one start URL",
            target.base
        )));
    }

    for start in &target.start_urls {
        let url = parse_http_url(start, "start URL")?;
        if host_key(&url) != base_host {
            return Err(ConfigError::Validation(format!(
                "Start URL '{}' is not on the host of target '{}'",
                start, target.base
            )));
        }
    }

    Ok(())
}

fn validate_pdf_config(config: &PdfConfig) -> Result<(), ConfigError> {
    for (host, prefixes) in &config.allow {
        if host.is_empty() || host.contains('/') {
            return Err(ConfigError::Validation(format!(
                "PDF allow-map key '{}' must be a bare host",
                host
            )));
        }
        validate_prefixes(prefixes, host)?;
    }

    for seed in &config.seeds {
        parse_http_url(seed, "PDF seed")?;
    }

    Ok(())
}

fn validate_prefixes(prefixes: &[String], owner: &str) -> Result<(), ConfigError> {
    for prefix in prefixes {
        if !prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Path prefix '{}' for '{}' must start with '/'",
                prefix, owner
            )));
        }
    }
    Ok(())
}

fn parse_http_url(raw: &str, what: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            what, raw
        )));
    }

    Ok(url)
}
