//! Tests for run configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        mechanism = "threads"
        mechanisms_engaged = 6
        first_phase_timeout_ms = 300
        second_phase_timeout_ms = 900
        start_epoch = 3
        max_epochs = 40
        starting_best_distance = 27603.5
        solutions_already_counted = 1200
        random_seed = 42
    "#;

    let config = SolverConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.mechanism, MechanismKind::Threads);
    assert_eq!(config.mechanisms_engaged, 6);
    assert_eq!(config.first_phase_timeout(), Duration::from_millis(300));
    assert_eq!(config.second_phase_timeout(), Duration::from_millis(900));
    assert_eq!(config.start_epoch, 3);
    assert_eq!(config.max_epochs, 40);
    assert_eq!(config.starting_best_distance, Some(27603.5));
    assert_eq!(config.solutions_already_counted, 1200);
    assert_eq!(config.random_seed, Some(42));
    assert!(config.validate().is_ok());
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        mechanism: tasks
        mechanisms_engaged: 2
        first_phase_timeout_ms: 100
        second_phase_timeout_ms: 200
        random_seed: 7
    "#;

    let config = SolverConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.mechanism, MechanismKind::Tasks);
    assert_eq!(config.mechanisms_engaged, 2);
    assert_eq!(config.random_seed, Some(7));
    assert_eq!(config.max_epochs, DEFAULT_MAX_EPOCHS);
}

#[test]
fn test_missing_keys_use_defaults() {
    let config = SolverConfig::from_toml_str("").unwrap();
    assert_eq!(config, SolverConfig::default());
    assert_eq!(config.start_epoch, 1);
    assert_eq!(config.first_phase_timeout_ms, DEFAULT_FIRST_PHASE_TIMEOUT_MS);
    assert_eq!(config.starting_best_distance, None);
}

#[test]
fn test_builder() {
    let config = SolverConfig::new()
        .with_mechanism(MechanismKind::Threads)
        .with_mechanisms_engaged(3)
        .with_phase_timeouts_ms(50, 75)
        .with_epochs(2, 5)
        .with_starting_best_distance(10.0)
        .with_solutions_already_counted(9)
        .with_random_seed(123);

    assert_eq!(config.mechanism, MechanismKind::Threads);
    assert_eq!(config.mechanisms_engaged, 3);
    assert_eq!(config.first_phase_timeout_ms, 50);
    assert_eq!(config.second_phase_timeout_ms, 75);
    assert_eq!((config.start_epoch, config.max_epochs), (2, 5));
    assert_eq!(config.starting_best_distance, Some(10.0));
    assert_eq!(config.solutions_already_counted, 9);
    assert_eq!(config.random_seed, Some(123));
}

#[test]
fn test_validate_rejects_zero_workers() {
    let err = SolverConfig::new()
        .with_mechanisms_engaged(0)
        .validate()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("mechanisms_engaged"));
}

#[test]
fn test_validate_rejects_zero_timeouts() {
    assert!(SolverConfig::new()
        .with_phase_timeouts_ms(0, 10)
        .validate()
        .is_err());
    assert!(SolverConfig::new()
        .with_phase_timeouts_ms(10, 0)
        .validate()
        .is_err());
}

#[test]
fn test_validate_rejects_empty_epoch_range() {
    let err = SolverConfig::new().with_epochs(5, 4).validate().unwrap_err();
    assert!(err.to_string().contains("start_epoch"));
    assert!(SolverConfig::new().with_epochs(4, 4).validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_starting_distance() {
    assert!(SolverConfig::new()
        .with_starting_best_distance(f64::NAN)
        .validate()
        .is_err());
    assert!(SolverConfig::new()
        .with_starting_best_distance(-1.0)
        .validate()
        .is_err());
}

#[test]
fn test_unknown_mechanism_is_a_parse_error() {
    let err = SolverConfig::from_toml_str(r#"mechanism = "fibers""#).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_mechanism_from_str() {
    assert_eq!("tasks".parse::<MechanismKind>().unwrap(), MechanismKind::Tasks);
    assert_eq!(
        "Threads".parse::<MechanismKind>().unwrap(),
        MechanismKind::Threads
    );
    assert!("gpu".parse::<MechanismKind>().is_err());
    assert_eq!(MechanismKind::Threads.to_string(), "threads");
}

#[test]
fn test_parse_duration() {
    assert_eq!(parse_duration_ms("15").unwrap(), 15);
    assert_eq!(parse_duration_ms("15ms").unwrap(), 15);
    assert_eq!(parse_duration_ms(" 3s ").unwrap(), 3_000);
    assert_eq!(parse_duration_ms("1m").unwrap(), 60_000);
    assert!(parse_duration_ms("soon").is_err());
    assert!(parse_duration_ms("-5s").is_err());
}

#[test]
fn test_load_missing_file() {
    let err = SolverConfig::load("/nonexistent/tourforge.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_config_error_converts() {
    let err: TourForgeError = ConfigError::Invalid("bad".to_string()).into();
    assert!(matches!(err, TourForgeError::Config(_)));
    assert!(err.to_string().contains("bad"));
}
