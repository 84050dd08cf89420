//! Configuration validation.
//!
//! Rules:
//! - at least one subscribed address, each one a known pattern
//! - precision > 0
//! - separator non-empty
//! - sink names non-empty and unique
//! - sink queue_capacity > 0
//! - csv sinks have a non-empty path when one is given

use std::collections::HashSet;

use contracts::{ContractError, RecorderBlueprint, SinkType, KNOWN_ADDRESSES};

/// Validate a RecorderBlueprint.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    validate_addresses(blueprint)?;
    validate_session(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_addresses(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    if blueprint.session.addresses.is_empty() {
        return Err(ContractError::config_validation(
            "session.addresses",
            "at least one address pattern is required",
        ));
    }

    let mut seen = HashSet::new();
    for address in &blueprint.session.addresses {
        if !KNOWN_ADDRESSES.contains(&address.as_str()) {
            return Err(ContractError::config_validation(
                format!("session.addresses[{address}]"),
                format!("unknown address pattern, expected one of {KNOWN_ADDRESSES:?}"),
            ));
        }
        if !seen.insert(address.as_str()) {
            return Err(ContractError::config_validation(
                format!("session.addresses[{address}]"),
                "duplicate address pattern",
            ));
        }
    }
    Ok(())
}

fn validate_session(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    let session = &blueprint.session;
    if session.precision == 0 {
        return Err(ContractError::config_validation(
            "session.precision",
            "precision must be > 0",
        ));
    }
    if session.separator.is_empty() {
        return Err(ContractError::config_validation(
            "session.separator",
            "separator cannot be empty",
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    if blueprint.sinks.is_empty() {
        return Err(ContractError::config_validation(
            "sinks",
            "at least one sink is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                format!("duplicate sink name '{}'", sink.name),
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
        if sink.sink_type == SinkType::Csv {
            if let Some(path) = sink.params.get("path") {
                if path.is_empty() {
                    return Err(ContractError::config_validation(
                        format!("sinks[{}].params.path", sink.name),
                        "csv path cannot be empty",
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkConfig;

    #[test]
    fn test_default_blueprint_is_valid() {
        assert!(validate(&RecorderBlueprint::default()).is_ok());
    }

    #[test]
    fn test_empty_addresses_rejected() {
        let mut bp = RecorderBlueprint::default();
        bp.session.addresses.clear();
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("at least one address"));
    }

    #[test]
    fn test_unknown_address_rejected() {
        let mut bp = RecorderBlueprint::default();
        bp.session.addresses.push("/Treadmill".to_string());
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("unknown address"));
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let mut bp = RecorderBlueprint::default();
        bp.session.addresses.push("/HMD".to_string());
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("duplicate address"));
    }

    #[test]
    fn test_zero_precision_rejected() {
        let mut bp = RecorderBlueprint::default();
        bp.session.precision = 0;
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_empty_separator_rejected() {
        let mut bp = RecorderBlueprint::default();
        bp.session.separator.clear();
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_duplicate_sink_name_rejected() {
        let mut bp = RecorderBlueprint::default();
        let clone = bp.sinks[0].clone();
        bp.sinks.push(clone);
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("duplicate sink name"));
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let mut bp = RecorderBlueprint::default();
        bp.sinks[0].queue_capacity = 0;
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_empty_csv_path_rejected() {
        let mut bp = RecorderBlueprint::default();
        bp.sinks[0]
            .params
            .insert("path".to_string(), String::new());
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_csv_sink_without_path_falls_back_to_default() {
        let mut bp = RecorderBlueprint::default();
        bp.sinks = vec![SinkConfig {
            name: "csv".to_string(),
            sink_type: SinkType::Csv,
            queue_capacity: 16,
            params: Default::default(),
        }];
        // Missing path is fine; the sink factory supplies openvr_data.csv
        assert!(validate(&bp).is_ok());
    }
}
