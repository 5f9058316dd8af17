//! Raw telemetry ingestion: damage events, aura lifecycle events and aura uptime bands.
//!
//! Field names follow the telemetry export (`sourceID`, `unmitigatedAmount`, ...). Ingestion is
//! lenient: a record that does not deserialize is dropped, never fatal.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One spell damage instance from an attacker to a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(rename = "sourceID", default)]
    pub source_id: i64,
    #[serde(rename = "targetID", default)]
    pub target_id: i64,
    #[serde(rename = "abilityGameID", default)]
    pub ability_id: u64,
    #[serde(rename = "hitType", default)]
    pub hit_type: u32,
    /// Damage actually dealt.
    #[serde(default)]
    pub amount: f64,
    /// Damage before resistance, the base for the theoretical value.
    #[serde(rename = "unmitigatedAmount", default)]
    pub unmitigated_amount: f64,
    /// Periodic tick (DoT); never sampled.
    #[serde(default)]
    pub tick: bool,
}

/// Lifecycle step of a buff/debuff as reported by the telemetry `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuraEventKind {
    Apply,
    ApplyStack,
    Remove,
    /// Refreshes, stack removals and anything else; ignored by the interval builder.
    Other(String),
}

impl From<String> for AuraEventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "applydebuff" | "applybuff" => Self::Apply,
            "applydebuffstack" | "applybuffstack" => Self::ApplyStack,
            "removedebuff" | "removebuff" => Self::Remove,
            _ => Self::Other(value),
        }
    }
}

impl From<AuraEventKind> for String {
    fn from(kind: AuraEventKind) -> Self {
        match kind {
            AuraEventKind::Apply => "applydebuff".to_string(),
            AuraEventKind::ApplyStack => "applydebuffstack".to_string(),
            AuraEventKind::Remove => "removedebuff".to_string(),
            AuraEventKind::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuraEvent {
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: AuraEventKind,
    #[serde(rename = "targetID", default)]
    pub target_id: i64,
    #[serde(rename = "abilityGameID", default)]
    pub ability_id: u64,
}

impl AuraEvent {
    pub fn new(timestamp: i64, kind: AuraEventKind, target_id: i64) -> Self {
        Self {
            timestamp,
            kind,
            target_id,
            ability_id: 0,
        }
    }
}

/// Precomputed uptime window of an aura on one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuraBand {
    #[serde(rename = "startTime")]
    pub start_time: i64,
    #[serde(rename = "endTime")]
    pub end_time: i64,
}

/// Convert raw JSON records, dropping any that do not match the expected shape.
pub fn ingest_records<T: DeserializeOwned>(records: &[Value]) -> Vec<T> {
    let parsed: Vec<T> = records
        .iter()
        .filter_map(|record| serde_json::from_value(record.clone()).ok())
        .collect();
    let dropped = records.len() - parsed.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = parsed.len(), "dropped malformed telemetry records");
    }
    parsed
}

pub fn ingest_damage_events(records: &[Value]) -> Vec<DamageEvent> {
    ingest_records(records)
}

pub fn ingest_aura_events(records: &[Value]) -> Vec<AuraEvent> {
    ingest_records(records)
}

/// Parse a JSON array of damage events (lenient per record).
pub fn parse_damage_events_json(input: &str) -> Result<Vec<DamageEvent>, String> {
    let records: Vec<Value> = serde_json::from_str(input).map_err(|e| e.to_string())?;
    Ok(ingest_damage_events(&records))
}

/// Parse a JSON array of aura lifecycle events (lenient per record).
pub fn parse_aura_events_json(input: &str) -> Result<Vec<AuraEvent>, String> {
    let records: Vec<Value> = serde_json::from_str(input).map_err(|e| e.to_string())?;
    Ok(ingest_aura_events(&records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_amounts_default_to_zero() {
        let events = parse_damage_events_json(
            r#"[{"timestamp": 10, "sourceID": 1, "targetID": 2, "hitType": 1}]"#,
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].amount, 0.0);
        assert_eq!(events[0].unmitigated_amount, 0.0);
        assert!(!events[0].tick);
    }

    #[test]
    fn aura_kinds_map_buff_and_debuff_variants() {
        let events = parse_aura_events_json(
            r#"[
                {"timestamp": 1, "type": "applybuff", "targetID": 5},
                {"timestamp": 2, "type": "applydebuffstack", "targetID": 5},
                {"timestamp": 3, "type": "refreshdebuff", "targetID": 5},
                {"timestamp": 4, "type": "removedebuff", "targetID": 5}
            ]"#,
        )
        .unwrap();
        let kinds: Vec<_> = events.into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AuraEventKind::Apply,
                AuraEventKind::ApplyStack,
                AuraEventKind::Other("refreshdebuff".to_string()),
                AuraEventKind::Remove,
            ]
        );
    }

    #[test]
    fn malformed_records_are_dropped() {
        let events = parse_aura_events_json(
            r#"[{"timestamp": "soon", "type": "applydebuff"}, {"timestamp": 7, "type": "removedebuff"}]"#,
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, 7);
    }
}
