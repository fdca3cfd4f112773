//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for structural
//! errors such as an empty route table, malformed or duplicate prefixes,
//! non-HTTP backend URLs and zero-valued tuning knobs. Returns a list of
//! [`ValidationError`] values with per-field suggestions.

use url::Url;

use super::model::Config;
use crate::error::ValidationError;

/// Validate a route prefix. Returns `Ok(())` or a human-readable error.
pub fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("prefix cannot be empty".into());
    }
    if !prefix.starts_with('/') {
        return Err("prefix must start with '/'".into());
    }
    Ok(())
}

/// Validate a backend base URL. Returns `Ok(())` or a human-readable error.
pub fn validate_backend_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.host_str().is_none() {
                Err(format!("'{url}' has no host"))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

fn push(errors: &mut Vec<ValidationError>, field: &str, message: impl Into<String>) {
    errors.push(ValidationError {
        field: field.into(),
        message: message.into(),
        suggestion: None,
    });
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.proxy.timeout_secs == 0 {
        push(&mut errors, "proxy.timeout_secs", "timeout must be greater than zero");
    }
    if config.proxy.max_body == 0 {
        push(&mut errors, "proxy.max_body", "body limit must be greater than zero");
    }
    if config.health.retries == 0 {
        push(&mut errors, "health.retries", "at least one attempt is required");
    }
    if config.health.startup_retries == 0 {
        push(
            &mut errors,
            "health.startup_retries",
            "at least one attempt is required",
        );
    }
    if config.health.timeout_ms == 0 {
        push(&mut errors, "health.timeout_ms", "timeout must be greater than zero");
    }
    if config.failures.threshold == 0 {
        push(
            &mut errors,
            "failures.threshold",
            "threshold must be greater than zero",
        );
    }

    if config.routes.is_empty() {
        push(&mut errors, "routes", "at least one route must be defined");
        return Err(errors);
    }

    let mut seen = std::collections::HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        if let Err(msg) = validate_prefix(&route.prefix) {
            errors.push(ValidationError {
                field: format!("routes[{i}].prefix"),
                message: msg,
                suggestion: if route.prefix.is_empty() {
                    None
                } else {
                    Some(format!("did you mean '/{}'?", route.prefix))
                },
            });
        }

        if !seen.insert(route.prefix.as_str()) {
            push(
                &mut errors,
                &format!("routes[{i}].prefix"),
                format!("duplicate prefix '{}'", route.prefix),
            );
        }

        if let Err(msg) = validate_backend_url(&route.backend) {
            push(&mut errors, &format!("routes[{i}].backend"), msg);
        } else if route.backend.ends_with('/') {
            errors.push(ValidationError {
                field: format!("routes[{i}].backend"),
                message: "backend must not end with '/' (the request path is appended)".into(),
                suggestion: Some(format!("use '{}'", route.backend.trim_end_matches('/'))),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let mut lines = vec![format!(
        "  {} routes, proxy timeout {}s, failure threshold {}\n",
        config.routes.len(),
        config.proxy.timeout_secs,
        config.failures.threshold
    )];

    for route in &config.routes {
        let env = route
            .url_env
            .as_deref()
            .map_or_else(String::new, |e| format!("  (override: {e})"));
        lines.push(format!("  {}  -> {}{env}", route.prefix, route.backend));
    }

    format!("{} is valid\n{}", path, lines.join("\n"))
}
