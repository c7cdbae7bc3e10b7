//! Typed decoders for bridge events.
//!
//! The sequence id assigned by a chain's bridging module arrives inside an
//! emitted event whose payload shape depends on the event kind — notably,
//! positional payloads carry the sequence at different indices. Each kind
//! gets its own decoder that fails loudly on a shape mismatch instead of
//! indexing into a generic array.

use crate::ChainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event extracted from a submission receipt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainEvent {
    pub kind: String,
    pub data: Value,
}

/// Find the first event of a kind in a receipt's event list.
pub fn find_event<'a>(events: &'a [ChainEvent], kind: &str) -> Option<&'a ChainEvent> {
    events.iter().find(|e| e.kind == kind)
}

fn expect_kind(event: &ChainEvent, kind: &str) -> Result<(), ChainError> {
    if event.kind == kind {
        Ok(())
    } else {
        Err(ChainError::InvalidResponse(format!(
            "expected {kind} event, got {}",
            event.kind
        )))
    }
}

fn positional<'a>(event: &'a ChainEvent, len: usize) -> Result<&'a [Value], ChainError> {
    let array = event.data.as_array().ok_or_else(|| {
        ChainError::InvalidResponse(format!("{} payload is not an array", event.kind))
    })?;
    if array.len() != len {
        return Err(ChainError::InvalidResponse(format!(
            "{} payload has {} fields, expected {len}",
            event.kind,
            array.len()
        )));
    }
    Ok(array)
}

fn string_at(event: &ChainEvent, values: &[Value], index: usize) -> Result<String, ChainError> {
    values[index].as_str().map(str::to_string).ok_or_else(|| {
        ChainError::InvalidResponse(format!(
            "{} payload field {index} is not a string",
            event.kind
        ))
    })
}

/// Sequence ids arrive as JSON numbers from some runtimes and as decimal
/// strings from others.
fn sequence_value(event: &ChainEvent, value: &Value) -> Result<u64, ChainError> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            ChainError::InvalidResponse(format!("{} sequence is not a u64", event.kind))
        }),
        Value::String(s) => s.parse().map_err(|_| {
            ChainError::InvalidResponse(format!("{} sequence is not numeric: {s}", event.kind))
        }),
        other => Err(ChainError::InvalidResponse(format!(
            "{} sequence has unexpected type: {other}",
            event.kind
        ))),
    }
}

/// `Locked` — appchain native-asset lock.
/// Positional payload: `[sender, receiver, amount, sequence]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockedEvent {
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub sequence: u64,
}

impl LockedEvent {
    pub const KIND: &'static str = "Locked";

    pub fn decode(event: &ChainEvent) -> Result<Self, ChainError> {
        expect_kind(event, Self::KIND)?;
        let values = positional(event, 4)?;
        Ok(Self {
            sender: string_at(event, values, 0)?,
            receiver: string_at(event, values, 1)?,
            amount: string_at(event, values, 2)?,
            sequence: sequence_value(event, &values[3])?,
        })
    }
}

/// `AssetBurned` — appchain burn of a class-identified fungible asset.
/// Positional payload: `[asset_id, sender, receiver, amount, sequence]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetBurnedEvent {
    pub asset_id: u32,
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub sequence: u64,
}

impl AssetBurnedEvent {
    pub const KIND: &'static str = "AssetBurned";

    pub fn decode(event: &ChainEvent) -> Result<Self, ChainError> {
        expect_kind(event, Self::KIND)?;
        let values = positional(event, 5)?;
        let asset_id = values[0].as_u64().and_then(|v| u32::try_from(v).ok());
        Ok(Self {
            asset_id: asset_id.ok_or_else(|| {
                ChainError::InvalidResponse(format!("{} asset id is not a u32", event.kind))
            })?,
            sender: string_at(event, values, 1)?,
            receiver: string_at(event, values, 2)?,
            amount: string_at(event, values, 3)?,
            sequence: sequence_value(event, &values[4])?,
        })
    }
}

/// `CollectibleLocked` — appchain lock of one collectible instance.
/// Positional payload: `[class, instance, sender, receiver, sequence]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectibleLockedEvent {
    pub class: u64,
    pub instance: String,
    pub sender: String,
    pub receiver: String,
    pub sequence: u64,
}

impl CollectibleLockedEvent {
    pub const KIND: &'static str = "CollectibleLocked";

    pub fn decode(event: &ChainEvent) -> Result<Self, ChainError> {
        expect_kind(event, Self::KIND)?;
        let values = positional(event, 5)?;
        Ok(Self {
            class: values[0].as_u64().ok_or_else(|| {
                ChainError::InvalidResponse(format!("{} class is not a u64", event.kind))
            })?,
            instance: string_at(event, values, 1)?,
            sender: string_at(event, values, 2)?,
            receiver: string_at(event, values, 3)?,
            sequence: sequence_value(event, &values[4])?,
        })
    }
}

/// `MessageQueued` — home-ledger anchor queued an outbound bridge message.
/// Named payload: `{"sequence": n}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageQueuedEvent {
    pub sequence: u64,
}

impl MessageQueuedEvent {
    pub const KIND: &'static str = "MessageQueued";

    pub fn decode(event: &ChainEvent) -> Result<Self, ChainError> {
        expect_kind(event, Self::KIND)?;
        let sequence = event.data.get("sequence").ok_or_else(|| {
            ChainError::InvalidResponse(format!("{} payload has no sequence field", event.kind))
        })?;
        Ok(Self {
            sequence: sequence_value(event, sequence)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(kind: &str, data: Value) -> ChainEvent {
        ChainEvent {
            kind: kind.into(),
            data,
        }
    }

    #[test]
    fn locked_sequence_is_at_index_three() {
        let decoded = LockedEvent::decode(&event(
            "Locked",
            json!(["5Grwva...", "alice.home", "1000000000000", 17]),
        ))
        .unwrap();
        assert_eq!(decoded.sequence, 17);
        assert_eq!(decoded.amount, "1000000000000");
    }

    #[test]
    fn asset_burned_sequence_is_at_index_four() {
        let decoded = AssetBurnedEvent::decode(&event(
            "AssetBurned",
            json!([7, "5Grwva...", "alice.home", "5000", "29"]),
        ))
        .unwrap();
        assert_eq!(decoded.asset_id, 7);
        assert_eq!(decoded.sequence, 29);
    }

    #[test]
    fn collectible_locked_decodes() {
        let decoded = CollectibleLockedEvent::decode(&event(
            "CollectibleLocked",
            json!([3, "77", "5Grwva...", "alice.home", 8]),
        ))
        .unwrap();
        assert_eq!(decoded.class, 3);
        assert_eq!(decoded.instance, "77");
        assert_eq!(decoded.sequence, 8);
    }

    #[test]
    fn message_queued_uses_named_field() {
        let decoded =
            MessageQueuedEvent::decode(&event("MessageQueued", json!({"sequence": "41"}))).unwrap();
        assert_eq!(decoded.sequence, 41);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let locked = event("Locked", json!(["a", "b", "1", 2]));
        assert!(AssetBurnedEvent::decode(&locked).is_err());
        assert!(MessageQueuedEvent::decode(&locked).is_err());
    }

    #[test]
    fn wrong_arity_fails_loudly() {
        // A Locked-shaped payload must not decode by reading a wrong index.
        let short = event("Locked", json!(["a", "b", "1"]));
        assert!(LockedEvent::decode(&short).is_err());
        let shifted = event("AssetBurned", json!(["a", "b", "1", 2]));
        assert!(AssetBurnedEvent::decode(&shifted).is_err());
    }

    #[test]
    fn non_numeric_sequence_rejected() {
        let bad = event("Locked", json!(["a", "b", "1", "not-a-number"]));
        assert!(LockedEvent::decode(&bad).is_err());
        let bad = event("MessageQueued", json!({"sequence": true}));
        assert!(MessageQueuedEvent::decode(&bad).is_err());
    }

    #[test]
    fn find_event_matches_kind() {
        let events = vec![
            event("Other", json!({})),
            event("MessageQueued", json!({"sequence": 1})),
        ];
        assert!(find_event(&events, "MessageQueued").is_some());
        assert!(find_event(&events, "Locked").is_none());
    }
}
