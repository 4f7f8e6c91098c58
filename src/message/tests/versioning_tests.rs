//! Unit tests for the generation bridge.

use chrono::DateTime;
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::Value;

use super::fixed_clock;
use crate::message::codec::VersionCheck;
use crate::message::domain::{Field, TiipMessage};
use crate::message::error::{ErrorKind, TiipError};
use crate::message::versioning::ProtocolVersion;

const EPOCH_TOLERANCE: f64 = 1e-3;
const LATENCY_TOLERANCE: f64 = 1e-6;

fn epoch_seconds(text: &str) -> f64 {
    let parsed = DateTime::parse_from_rfc3339(text).expect("parseable timestamp");
    parsed.timestamp_micros() as f64 / 1e6
}

fn float_field(document: &Value, key: &str) -> f64 {
    document
        .get(key)
        .and_then(Value::as_str)
        .expect("decimal string field")
        .parse()
        .expect("float content")
}

#[rstest]
fn version_strings_parse() {
    assert_eq!(
        "tiip.2.0".parse::<ProtocolVersion>().expect("supported"),
        ProtocolVersion::Tiip2
    );
    assert_eq!(
        "tiip.3.0".parse::<ProtocolVersion>().expect("supported"),
        ProtocolVersion::CURRENT
    );
    let err = "tiip.1.0".parse::<ProtocolVersion>().expect_err("unsupported");
    assert!(matches!(err, TiipError::UnsupportedVersion(_)));
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[rstest]
fn legacy_input_with_client_time_recovers_latency() {
    let message = TiipMessage::from_json(
        r#"{"pv":"tiip.2.0","ts":"1556099778.77","ct":"1556099734.255"}"#,
        VersionCheck::Lenient,
        &DefaultClock,
    )
    .expect("legacy input upgrades");

    let latency: f64 = message
        .latency()
        .expect("latency recovered")
        .parse()
        .expect("float content");
    assert!((latency - 44.515).abs() < EPOCH_TOLERANCE);
    assert!((epoch_seconds(message.timestamp()) - 1_556_099_734.255).abs() < EPOCH_TOLERANCE);
    assert_eq!(message.protocol_version(), ProtocolVersion::CURRENT);
}

#[rstest]
fn legacy_input_without_client_time_converts_timestamp_only() {
    let message = TiipMessage::from_json(
        r#"{"pv":"tiip.2.0","ts":"1556099778.77"}"#,
        VersionCheck::Lenient,
        &DefaultClock,
    )
    .expect("legacy input upgrades");

    assert!(message.latency().is_none());
    assert!((epoch_seconds(message.timestamp()) - 1_556_099_778.77).abs() < EPOCH_TOLERANCE);
}

#[rstest]
fn legacy_numeric_epoch_values_are_tolerated() {
    let message = TiipMessage::from_json(
        r#"{"pv":"tiip.2.0","ts":1556099778.77,"ct":1556099734.255}"#,
        VersionCheck::Lenient,
        &DefaultClock,
    )
    .expect("legacy input upgrades");

    let latency: f64 = message
        .latency()
        .expect("latency recovered")
        .parse()
        .expect("float content");
    assert!((latency - 44.515).abs() < EPOCH_TOLERANCE);
    assert!((epoch_seconds(message.timestamp()) - 1_556_099_734.255).abs() < EPOCH_TOLERANCE);
}

#[rstest]
fn legacy_client_time_without_timestamp_is_rejected() {
    let err = TiipMessage::from_json(
        r#"{"pv":"tiip.2.0","ct":"1556099734.255"}"#,
        VersionCheck::Lenient,
        &DefaultClock,
    )
    .expect_err("latency cannot be recovered from the client time alone");
    assert_eq!(err, TiipError::MissingLegacyField(Field::Timestamp));
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[rstest]
fn legacy_input_without_timestamps_keeps_construction_time() {
    let clock = fixed_clock();
    let message = TiipMessage::from_json(
        r#"{"pv":"tiip.2.0","sig":"ping"}"#,
        VersionCheck::Lenient,
        &clock,
    )
    .expect("hydrates");
    assert_eq!(message.timestamp(), TiipMessage::new(&clock).timestamp());
    assert!(message.latency().is_none());
    assert_eq!(message.signal(), Some("ping"));
}

#[rstest]
fn wrong_category_legacy_client_time_names_its_key() {
    let err = TiipMessage::from_json(
        r#"{"pv":"tiip.2.0","ts":"1556099778.77","ct":[1]}"#,
        VersionCheck::Lenient,
        &DefaultClock,
    )
    .expect_err("array rejected");
    assert_eq!(
        err,
        TiipError::InvalidLegacyType {
            key: "ct",
            expected: "a decimal-seconds string or number",
            actual: "an array",
        }
    );
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[rstest]
fn verification_rejects_legacy_input() {
    let err = TiipMessage::from_json(
        r#"{"pv":"tiip.2.0","ts":"1556099778.77"}"#,
        VersionCheck::Verify,
        &DefaultClock,
    )
    .expect_err("verification rejects the legacy generation");
    assert!(matches!(err, TiipError::VersionMismatch { .. }));
}

#[rstest]
fn as_current_version_returns_canonical_form() {
    let message = TiipMessage::new(&DefaultClock);
    assert_eq!(
        message.as_version("tiip.3.0").expect("supported"),
        message.to_string()
    );
}

#[rstest]
fn downgrade_with_latency_emits_two_epoch_timestamps() {
    let message = TiipMessage::from_json(
        r#"{"pv":"tiip.3.0","ts":"2000-01-01T01:23:45.678901Z","lat":"1.0"}"#,
        VersionCheck::Lenient,
        &DefaultClock,
    )
    .expect("hydrates");

    let legacy = message.as_version("tiip.2.0").expect("downgrades");
    let document: Value = serde_json::from_str(&legacy).expect("valid JSON");

    assert_eq!(document.get("pv"), Some(&Value::String("tiip.2.0".to_owned())));
    assert!(document.get("lat").is_none());
    let reference_time = float_field(&document, "ts");
    let client_time = float_field(&document, "ct");
    assert!((reference_time - client_time - 1.0).abs() < LATENCY_TOLERANCE);
    assert!((client_time - 946_689_825.678_901).abs() < EPOCH_TOLERANCE);
}

#[rstest]
fn downgrade_without_latency_emits_single_epoch_timestamp() {
    let message = TiipMessage::builder()
        .with_timestamp("2000-01-01T01:23:45.678901Z")
        .build(&DefaultClock)
        .expect("valid message");

    let legacy = message.as_version("tiip.2.0").expect("downgrades");
    let document: Value = serde_json::from_str(&legacy).expect("valid JSON");

    assert!(document.get("ct").is_none());
    assert!((float_field(&document, "ts") - 946_689_825.678_901).abs() < EPOCH_TOLERANCE);
}

#[rstest]
fn downgrade_keeps_other_fields_under_their_keys() {
    let message = TiipMessage::builder()
        .with_timestamp("2000-01-01T01:23:45.678901Z")
        .with_signal("alarm")
        .with_tenant("acme")
        .build(&DefaultClock)
        .expect("valid message");

    let legacy = message.as_version("tiip.2.0").expect("downgrades");
    let document: Value = serde_json::from_str(&legacy).expect("valid JSON");
    assert_eq!(document.get("sig"), Some(&Value::String("alarm".to_owned())));
    assert_eq!(document.get("ten"), Some(&Value::String("acme".to_owned())));
}

#[rstest]
fn downgrade_to_unknown_version_fails() {
    let message = TiipMessage::new(&DefaultClock);
    let err = message.as_version("tiip.9.9").expect_err("unsupported");
    assert_eq!(err, TiipError::UnsupportedVersion("tiip.9.9".to_owned()));
}

#[rstest]
fn downgrade_then_upgrade_round_trips_latency_and_timestamp() {
    let message = TiipMessage::builder()
        .with_timestamp("2000-01-01T01:23:45.678901Z")
        .with_latency("1.5")
        .build(&DefaultClock)
        .expect("valid message");

    let legacy = message.as_version("tiip.2.0").expect("downgrades");
    let restored =
        TiipMessage::from_json(&legacy, VersionCheck::Lenient, &DefaultClock).expect("upgrades");

    let latency: f64 = restored
        .latency()
        .expect("latency restored")
        .parse()
        .expect("float content");
    assert!((latency - 1.5).abs() < LATENCY_TOLERANCE);
    let drift = epoch_seconds(restored.timestamp()) - epoch_seconds(message.timestamp());
    assert!(drift.abs() < EPOCH_TOLERANCE);
}
