use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{PetError, PetResult};

/// Lower bound shared by every gauge.
pub const GAUGE_MIN: f64 = 0.0;
/// Upper bound shared by every gauge.
pub const GAUGE_MAX: f64 = 100.0;
/// Longest name (in characters) a pet may carry.
pub const MAX_NAME_CHARS: usize = 20;
/// Amount applied by an action when the caller gives no value.
pub const DEFAULT_ACTION_VALUE: f64 = 20.0;

/// Clamp a gauge value into `[GAUGE_MIN, GAUGE_MAX]`.
pub fn clamp_gauge(value: f64) -> f64 {
    value.clamp(GAUGE_MIN, GAUGE_MAX)
}

/// Life phase of the pet. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Egg,
    Baby,
    Teen,
    Adult,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Egg => "egg",
            Stage::Baby => "baby",
            Stage::Teen => "teen",
            Stage::Adult => "adult",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single persisted pet.
///
/// Field names are the on-disk and on-wire keys; timestamps serialize as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetRecord {
    pub name: String,
    pub stage: Stage,
    pub hunger: f64,
    pub happiness: f64,
    pub energy: f64,
    pub health: f64,
    pub mess: f64,
    /// Hours since the record was created.
    pub age: f64,
    pub last_updated: DateTime<Utc>,
    pub last_interaction: DateTime<Utc>,
    pub last_event: String,
    #[serde(default)]
    pub runaway: bool,
}

impl PetRecord {
    /// A freshly laid egg created at `now`.
    pub fn new(name: &str, now: DateTime<Utc>) -> Self {
        PetRecord {
            name: name.to_string(),
            stage: Stage::Egg,
            hunger: 0.0,
            happiness: 0.0,
            energy: 100.0,
            health: 100.0,
            mess: 0.0,
            age: 0.0,
            last_updated: now,
            last_interaction: now,
            last_event: "The egg is incubating...".to_string(),
            runaway: false,
        }
    }

    /// Gauges in a fixed order: hunger, happiness, energy, health, mess.
    pub fn gauges(&self) -> [f64; 5] {
        [self.hunger, self.happiness, self.energy, self.health, self.mess]
    }
}

/// Commands a caller can issue against the pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetName,
    Shake,
    Feed,
    Play,
    Rest,
    Clean,
    Heal,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::SetName,
        Action::Shake,
        Action::Feed,
        Action::Play,
        Action::Rest,
        Action::Clean,
        Action::Heal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::SetName => "set_name",
            Action::Shake => "shake",
            Action::Feed => "feed",
            Action::Play => "play",
            Action::Rest => "rest",
            Action::Clean => "clean",
            Action::Heal => "heal",
        }
    }

    /// Actions that may be taken while the pet is still an egg.
    pub fn allowed_on_egg(self) -> bool {
        matches!(self, Action::SetName | Action::Shake)
    }

    /// Whether performing this action counts as caring for the pet.
    pub fn counts_as_interaction(self) -> bool {
        !self.allowed_on_egg()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PetError;

    fn from_str(s: &str) -> PetResult<Self> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| PetError::UnknownAction(s.to_string()))
    }
}

/// Body of an update call: `{"action": "feed", "value": 20, "name": null}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ActionRequest {
    pub fn new(action: Action) -> Self {
        ActionRequest {
            action: action.as_str().to_string(),
            value: None,
            name: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn rename(name: &str) -> Self {
        ActionRequest {
            action: Action::SetName.as_str().to_string(),
            value: None,
            name: Some(name.to_string()),
        }
    }

    /// The effect amount, falling back to [`DEFAULT_ACTION_VALUE`].
    pub fn value_or_default(&self) -> f64 {
        self.value.unwrap_or(DEFAULT_ACTION_VALUE)
    }
}
