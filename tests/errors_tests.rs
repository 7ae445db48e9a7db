use promgate::errors::{PromgateError, Result, format_startup_error};
use std::error::Error;

#[cfg(test)]
mod error_creation_tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = PromgateError::config("missing file");

        assert!(matches!(error, PromgateError::Config(_)));
        assert!(error.to_string().contains("Configuration Error"));
        assert!(error.to_string().contains("missing file"));
    }

    #[test]
    fn test_validation_error() {
        let error = PromgateError::validation("prometheus.step must be greater than zero");

        assert!(matches!(error, PromgateError::Validation(_)));
        assert!(error.to_string().contains("Validation Error"));
        assert!(error.to_string().contains("step"));
    }

    #[test]
    fn test_meter_conflict_error() {
        let error = PromgateError::meter_conflict("queue_size already registered as counter");

        assert!(matches!(error, PromgateError::MeterConflict(_)));
        assert!(error.to_string().contains("Meter Conflict"));
    }

    #[test]
    fn test_bean_already_registered_error() {
        let error = PromgateError::bean_already_registered("PrometheusRegistry");

        assert!(matches!(error, PromgateError::BeanAlreadyRegistered(_)));
        assert_eq!(error.message(), "PrometheusRegistry");
    }
}

#[cfg(test)]
mod error_format_tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            PromgateError::config(""),
            PromgateError::validation(""),
            PromgateError::registration(""),
            PromgateError::meter_conflict(""),
            PromgateError::encoding(""),
            PromgateError::bean_already_registered(""),
            PromgateError::server(""),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert_eq!(PromgateError::config("").code(), "E001");
        assert_eq!(PromgateError::server("").code(), "E007");
    }

    #[test]
    fn test_format_simple() {
        let error = PromgateError::encoding("bad utf-8");
        assert_eq!(error.format_simple(), "Exposition Encoding Error: bad utf-8");
    }

    #[test]
    fn test_format_colored_contains_parts() {
        let error = PromgateError::registration("duplicate collector");
        let output = error.format_colored();
        assert!(output.contains("E003"));
        assert!(output.contains("duplicate collector"));
    }

    #[test]
    fn test_startup_error_uses_colored_root_cause() {
        use anyhow::Context;

        let wrapped: anyhow::Result<()> = Err(PromgateError::validation("step is zero"))
            .context("Failed to wire Prometheus metrics export");
        let output = format_startup_error(&wrapped.unwrap_err());
        assert!(output.contains("E002"));
        assert!(output.contains("step is zero"));
        assert!(output.contains("Failed to wire Prometheus metrics export"));
    }

    #[test]
    fn test_startup_error_without_root_cause() {
        let err = anyhow::anyhow!("bind failed");
        let output = format_startup_error(&err);
        assert_eq!(output, "bind failed");
    }

    #[test]
    fn test_is_std_error() {
        let error = PromgateError::server("bind failed");
        assert!(error.source().is_none());
        let boxed: Box<dyn Error> = Box::new(error);
        assert!(boxed.to_string().contains("bind failed"));
    }
}

#[cfg(test)]
mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let error: PromgateError = io.into();
        assert!(matches!(error, PromgateError::Server(_)));
        assert!(error.message().contains("address in use"));
    }

    #[test]
    fn test_from_utf8_error() {
        let utf8 = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let error: PromgateError = utf8.into();
        assert!(matches!(error, PromgateError::Encoding(_)));
    }

    #[test]
    fn test_from_config_error() {
        let error: PromgateError = config::ConfigError::Message("bad value".to_string()).into();
        assert!(matches!(error, PromgateError::Config(_)));
        assert!(error.message().contains("bad value"));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_from_prometheus_errors() {
        let error: PromgateError = prometheus::Error::AlreadyReg.into();
        assert!(matches!(error, PromgateError::Registration(_)));

        let error: PromgateError =
            prometheus::Error::InconsistentCardinality { expect: 2, got: 1 }.into();
        assert!(matches!(error, PromgateError::Validation(_)));
        assert!(error.message().contains("expected 2, got 1"));
    }

    #[test]
    fn test_question_mark_propagation() {
        fn parse(input: &str) -> Result<u16> {
            input
                .parse::<u16>()
                .map_err(|e| PromgateError::validation(e.to_string()))
        }
        fn load(input: &str) -> Result<u16> {
            let port = parse(input)?;
            Ok(port)
        }
        assert_eq!(load("9464").unwrap(), 9464);
        assert!(matches!(load("x"), Err(PromgateError::Validation(_))));
    }
}
