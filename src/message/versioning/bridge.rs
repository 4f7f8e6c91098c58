//! Conversions between the current and the legacy protocol generation.
//!
//! The two generations disagree on how time is carried. The current one has
//! an ISO-8601 wall-clock timestamp plus an optional relative latency; the
//! legacy one paired two absolute epoch-seconds values: the originating
//! client time under `ct` and a later reference time under `ts`, with
//! latency implied as their difference. Converting is therefore a unit and
//! representation change, not a key rename.

use serde_json::{Map, Value};

use super::ProtocolVersion;
use crate::message::domain::{Field, TiipMessage, timestamp};
use crate::message::error::TiipError;

/// Legacy wire key for the originating client timestamp.
const CLIENT_TIME_KEY: &str = "ct";

/// Rewrites a legacy-generation object into current-generation fields, in
/// place.
///
/// With both `ct` and `ts` present, latency is recovered as `ts - ct` and
/// the client time becomes the message timestamp. With only `ts` present it
/// converts to ISO-8601 directly and no latency is set. With neither, the
/// construction-time timestamp stands.
pub(crate) fn upgrade_legacy(map: &mut Map<String, Value>) -> Result<(), TiipError> {
    let ts_key = Field::Timestamp.key();
    if let Some(client_value) = map.shift_remove(CLIENT_TIME_KEY) {
        let client_time = timestamp::parse_epoch_value(CLIENT_TIME_KEY, &client_value)?;
        let reference_value = map
            .get(ts_key)
            .ok_or(TiipError::MissingLegacyField(Field::Timestamp))?;
        let reference_time = timestamp::parse_epoch_value(ts_key, reference_value)?;
        map.insert(
            ts_key.to_owned(),
            Value::String(timestamp::from_epoch(client_time)?),
        );
        map.insert(
            Field::Latency.key().to_owned(),
            Value::String(timestamp::render_seconds(reference_time - client_time)),
        );
    } else if let Some(ts_value) = map.get(ts_key) {
        let epoch = timestamp::parse_epoch_value(ts_key, ts_value)?;
        map.insert(ts_key.to_owned(), Value::String(timestamp::from_epoch(epoch)?));
    }
    Ok(())
}

/// Renders a current-generation message in the legacy wire form.
///
/// When latency is set, the timestamp becomes the epoch-seconds `ct` and the
/// legacy `ts` is `ct` plus the latency; the latency field itself is
/// dropped. Without latency a single epoch-seconds `ts` is emitted.
pub(crate) fn downgrade(message: &TiipMessage) -> Result<String, TiipError> {
    let serialized = serde_json::to_value(message)
        .map_err(|err| TiipError::MalformedJson(err.to_string()))?;
    let Value::Object(mut map) = serialized else {
        return Err(TiipError::MalformedJson(
            "message did not serialize to an object".to_owned(),
        ));
    };

    let ts_key = Field::Timestamp.key();
    let client_time = timestamp::to_epoch(message.timestamp())?;
    if let Some(latency_text) = message.latency() {
        let latency = latency_text
            .trim()
            .parse::<f64>()
            .map_err(|_| TiipError::UnparseableLatency(latency_text.to_owned()))?;
        map.insert(
            ts_key.to_owned(),
            Value::String(timestamp::render_seconds(client_time + latency)),
        );
        map.shift_remove(Field::Latency.key());
        map.insert(
            CLIENT_TIME_KEY.to_owned(),
            Value::String(timestamp::render_seconds(client_time)),
        );
    } else {
        map.insert(
            ts_key.to_owned(),
            Value::String(timestamp::render_seconds(client_time)),
        );
    }
    map.insert(
        Field::ProtocolVersion.key().to_owned(),
        Value::String(ProtocolVersion::Tiip2.as_str().to_owned()),
    );
    Ok(Value::Object(map).to_string())
}
