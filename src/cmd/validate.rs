//! `platform-gateway validate`: check a gateway config file.
//!
//! The file is checked as written unless `--env` is given, in which case
//! each route's `url_env` variable is applied first, exactly as `run`
//! would. The report lists the resulting route table and marks the
//! backends that came from the environment.

use serde_json::{json, Value};

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::Config;
use crate::config::{parse_config_str, validation};
use crate::error::{GatewayError, ValidationError};

pub fn execute(args: &ValidateArgs) -> Result<(), GatewayError> {
    let path = &args.config;
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GatewayError::ConfigFileNotFound { path: path.clone() }
        } else {
            GatewayError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let display = path.display().to_string();
    let mut config = parse_config_str(ext, &content, &display)?;

    let overridden = if args.env {
        apply_overrides(&mut config, |var| std::env::var(var).ok())
    } else {
        vec![false; config.routes.len()]
    };

    match validation::validate(&config) {
        Ok(()) => {
            match args.format {
                ValidateFormat::Text => {
                    print!("\u{2713} {}", validation::format_validation_report(&display, &config));
                    println!();
                    let from_env = overridden.iter().filter(|o| **o).count();
                    if from_env > 0 {
                        println!("  {from_env} backend(s) taken from the environment");
                    }
                }
                ValidateFormat::Json => println!("{}", valid_report(&config, &overridden)),
            }
            Ok(())
        }
        Err(errors) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} {display} has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => println!("{}", invalid_report(&errors)),
            }
            Err(GatewayError::ConfigValidation { errors })
        }
    }
}

/// Apply `url_env` overrides and return, per route, whether it changed.
fn apply_overrides<F>(config: &mut Config, lookup: F) -> Vec<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let before: Vec<String> = config.routes.iter().map(|r| r.backend.clone()).collect();
    config.apply_env_overrides(lookup);
    config
        .routes
        .iter()
        .zip(before)
        .map(|(route, old)| route.backend != old)
        .collect()
}

fn valid_report(config: &Config, overridden: &[bool]) -> Value {
    let routes: Vec<Value> = config
        .routes
        .iter()
        .zip(overridden)
        .map(|(route, from_env)| {
            json!({
                "prefix": route.prefix,
                "backend": route.backend,
                "url_env": route.url_env,
                "from_env": from_env,
            })
        })
        .collect();

    json!({
        "valid": true,
        "routes": routes,
        "proxy": {
            "timeout_secs": config.proxy.timeout_secs,
            "max_body": config.proxy.max_body,
        },
        "failure_threshold": config.failures.threshold,
        "segment_boundary": config.routing.segment_boundary,
    })
}

fn invalid_report(errors: &[ValidationError]) -> Value {
    let errors: Vec<Value> = errors
        .iter()
        .map(|e| {
            json!({
                "field": e.field,
                "message": e.message,
                "suggestion": e.suggestion,
            })
        })
        .collect();
    json!({ "valid": false, "errors": errors })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_marked_per_route() {
        let mut config = Config::default();
        let overridden = apply_overrides(&mut config, |var| {
            (var == "PAYMENT_SERVICE_URL").then(|| "http://payments.prod:80".to_string())
        });
        assert_eq!(overridden.iter().filter(|o| **o).count(), 1);
        assert!(overridden[2]);

        let report = valid_report(&config, &overridden);
        assert_eq!(report["valid"], true);
        assert_eq!(report["routes"][2]["prefix"], "/api/payments");
        assert_eq!(report["routes"][2]["backend"], "http://payments.prod:80");
        assert_eq!(report["routes"][2]["from_env"], true);
        assert_eq!(report["routes"][0]["from_env"], false);
        assert_eq!(report["failure_threshold"], 3);
    }

    #[test]
    fn override_to_same_url_is_not_marked() {
        let mut config = Config::default();
        let overridden =
            apply_overrides(&mut config, |_| Some("http://localhost:8001".to_string()));
        assert!(!overridden[0]);
        assert!(overridden[1]);
    }

    #[test]
    fn invalid_report_carries_suggestions() {
        let errors = vec![ValidationError {
            field: "routes[0].prefix".into(),
            message: "prefix must start with '/'".into(),
            suggestion: Some("did you mean '/api/orders'?".into()),
        }];
        let report = invalid_report(&errors);
        assert_eq!(report["valid"], false);
        assert_eq!(report["errors"][0]["suggestion"], "did you mean '/api/orders'?");
    }

    #[test]
    fn missing_file_is_reported() {
        let args = ValidateArgs {
            config: "no-such-gateway.yaml".into(),
            format: ValidateFormat::Text,
            env: false,
        };
        assert!(matches!(
            execute(&args),
            Err(GatewayError::ConfigFileNotFound { .. })
        ));
    }
}
