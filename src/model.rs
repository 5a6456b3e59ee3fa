// On-call API data model
// This file defines the JSON payloads returned by the scheduling service
// and the contact predicates the aggregators classify them with
//
// Numan Thabit 2025 Nov

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Contact method name -> contact value, e.g. `{"call": "+1 555 0100"}`.
pub type Contacts = HashMap<String, String>;

/// A contact mapping is phone-reachable when it has a `call` or `sms` entry.
pub fn has_phone(contacts: &Contacts) -> bool {
    contacts.contains_key("call") || contacts.contains_key("sms")
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub name: String,
    pub contacts: Contacts,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Member {
    pub user_contacts: Contacts,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RotationEvent {
    #[serde(default)]
    pub primary: Vec<Member>,
    #[serde(default)]
    pub secondary: Vec<Member>,
}

impl RotationEvent {
    /// Everyone on call in this event, primary tier first.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.primary.iter().chain(self.secondary.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamSummary {
    #[serde(default, deserialize_with = "scheduled_event")]
    pub current: Option<RotationEvent>,
    #[serde(default, deserialize_with = "scheduled_event")]
    pub next: Option<RotationEvent>,
}

impl TeamSummary {
    pub fn event(&self, slot: Slot) -> Option<&RotationEvent> {
        match slot {
            Slot::Current => self.current.as_ref(),
            Slot::Next => self.next.as_ref(),
        }
    }
}

/// The API reports "nothing scheduled" either as `null` or as `{}`.
fn scheduled_event<'de, D>(deserializer: D) -> Result<Option<RotationEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Map<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(map) if map.is_empty() => Ok(None),
        Some(map) => serde_json::from_value(serde_json::Value::Object(map))
            .map(Some)
            .map_err(<D::Error as serde::de::Error>::custom),
    }
}

/// On-call time window reported by the team summary endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Current,
    Next,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Current, Slot::Next];

    /// Value of the `rotation` label.
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Current => "current",
            Slot::Next => "next",
        }
    }
}
