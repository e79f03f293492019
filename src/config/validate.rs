//! Configuration validation.

use crate::config::{ClassifierConfig, Config};
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_auth(config)?;
    validate_detector(config)?;
    validate_response(config)?;
    validate_classifier("primary", &config.primary)?;
    validate_classifier("fallback", &config.fallback)?;
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}

fn validate_server(config: &Config) -> Result<()> {
    if !config.server.endpoint.starts_with('/') {
        return Err(invalid(format!(
            "server.endpoint must start with '/', got '{}'",
            config.server.endpoint
        )));
    }

    if config.server.body_limit == 0 {
        return Err(invalid("server.body_limit must be at least 1".to_string()));
    }

    Ok(())
}

fn validate_auth(config: &Config) -> Result<()> {
    let auth = &config.auth;
    if auth.enabled && auth.secret.as_deref().is_none_or(str::is_empty) {
        return Err(invalid(
            "auth.secret is required when auth.enabled is true (set it in the config file or WHISKER_SECRET)"
                .to_string(),
        ));
    }

    if i64::try_from(auth.tolerance_secs).is_err() {
        return Err(invalid(format!(
            "auth.tolerance_secs is too large: {}",
            auth.tolerance_secs
        )));
    }

    Ok(())
}

fn validate_detector(config: &Config) -> Result<()> {
    let detector = &config.detector;

    if detector.subject_label.trim().is_empty() {
        return Err(invalid("detector.subject_label must not be empty".to_string()));
    }

    if detector.input_side == 0 {
        return Err(invalid("detector.input_side must be at least 1".to_string()));
    }

    for (name, value) in [
        ("confidence_threshold", detector.confidence_threshold),
        ("iou_threshold", detector.iou_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(format!(
                "detector.{name} must be between 0.0 and 1.0, got {value}"
            )));
        }
    }

    if detector.max_detections == 0 {
        return Err(invalid("detector.max_detections must be at least 1".to_string()));
    }

    Ok(())
}

fn validate_response(config: &Config) -> Result<()> {
    let response = &config.response;

    if response.recognize_max_return == 0 {
        return Err(invalid(
            "response.recognize_max_return must be at least 1".to_string(),
        ));
    }

    if response.id_field.is_empty() || response.score_field.is_empty() {
        return Err(invalid(
            "response.id_field and response.score_field must not be empty".to_string(),
        ));
    }

    if response.id_field == response.score_field {
        return Err(invalid(format!(
            "response.id_field and response.score_field must differ, both are '{}'",
            response.id_field
        )));
    }

    Ok(())
}

fn validate_classifier(name: &str, classifier: &ClassifierConfig) -> Result<()> {
    if classifier.side == 0 {
        return Err(invalid(format!("{name}.side must be at least 1")));
    }

    if classifier.input_name.is_empty() || classifier.output_name.is_empty() {
        return Err(invalid(format!(
            "{name}.input_name and {name}.output_name must not be empty"
        )));
    }

    Ok(())
}

/// Check that every model and identity file referenced by the config exists.
pub fn validate_model_files(config: &Config) -> Result<()> {
    for path in [
        &config.detector.path,
        &config.primary.path,
        &config.fallback.path,
    ] {
        if !path.exists() {
            return Err(Error::ModelFileNotFound { path: path.clone() });
        }
    }

    if !config.detector.labels.exists() {
        return Err(Error::LabelsRead {
            path: config.detector.labels.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }

    for path in [&config.primary.identities, &config.fallback.identities] {
        if !path.exists() {
            return Err(Error::IdentityTableNotFound { path: path.clone() });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.auth.secret = Some("secret".to_string());
        config
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_missing_secret() {
        let config = Config::default();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_auth_disabled_without_secret() {
        let mut config = Config::default();
        config.auth.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_side() {
        let mut config = valid_config();
        config.fallback.side = 0;
        let err = validate_config(&config).err();
        assert!(
            matches!(err, Some(Error::ConfigValidation { ref message }) if message.contains("fallback.side"))
        );
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut config = valid_config();
        config.detector.iou_threshold = 1.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_same_wire_names() {
        let mut config = valid_config();
        config.response.score_field = "catID".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_endpoint_needs_slash() {
        let mut config = valid_config();
        config.server.endpoint = "recognize".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_model_files_missing() {
        let mut config = valid_config();
        config.detector.path = "/nonexistent/detector.onnx".into();
        assert!(matches!(
            validate_model_files(&config),
            Err(Error::ModelFileNotFound { .. })
        ));
    }
}
