//! Named tools for conversational agents, and the human-readable text they answer with.
//!
//! Each tool returns a [`ToolReply`]: a summary for the agent to show and, where the service
//! returned a record, that record's JSON untouched in `data`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::client::PetClient;
use crate::pet::engine::{hours_between, NEGLECT_HOURS};
use crate::pet::types::{DEFAULT_ACTION_VALUE, MAX_NAME_CHARS};
use crate::pet::{ActionRequest, PetError, PetRecord, PetResult, Stage};

/// Descriptor advertised through `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolReply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

pub fn catalog() -> Vec<ToolSpec> {
    let no_args = json!({ "type": "object", "properties": {} });
    vec![
        ToolSpec {
            name: "get_game_instructions",
            description: "Explain how to raise the chick",
            input_schema: no_args.clone(),
        },
        ToolSpec {
            name: "get_pet_status",
            description: "Show the chick's current status",
            input_schema: no_args.clone(),
        },
        ToolSpec {
            name: "set_pet_name",
            description: "Give the chick a name (1-20 characters)",
            input_schema: json!({
                "type": "object",
                "properties": { "name": { "type": "string", "maxLength": MAX_NAME_CHARS } },
                "required": ["name"]
            }),
        },
        ToolSpec {
            name: "update_pet_status",
            description: "Care for the chick: feed, play, rest, clean, heal, or shake the egg",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["feed", "play", "rest", "clean", "heal", "shake"] },
                    "value": { "type": "number", "default": DEFAULT_ACTION_VALUE }
                },
                "required": ["action"]
            }),
        },
        ToolSpec {
            name: "reset",
            description: "Start the game over with a new egg",
            input_schema: no_args.clone(),
        },
        ToolSpec {
            name: "discovery",
            description: "Describe the pet service endpoints",
            input_schema: no_args,
        },
    ]
}

/// Run tool `name` with JSON `args` against the service.
pub async fn call_tool(client: &PetClient, name: &str, args: &Value) -> PetResult<ToolReply> {
    match name {
        "get_game_instructions" => Ok(ToolReply {
            message: instructions(),
            data: None,
        }),
        "get_pet_status" => {
            let data = client.status().await?;
            let pet = parse_record(&data)?;
            Ok(ToolReply {
                message: format_status(&pet, Utc::now()),
                data: Some(data),
            })
        }
        "set_pet_name" => {
            let name = args
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| PetError::Rejected("missing argument: name".to_string()))?;
            let data = client.update(&ActionRequest::rename(name)).await?;
            let pet = parse_record(&data)?;
            Ok(ToolReply {
                message: format!("Your chick is now called {}! Cheep!", pet.name),
                data: Some(data),
            })
        }
        "update_pet_status" => {
            let action = args
                .get("action")
                .and_then(Value::as_str)
                .ok_or_else(|| PetError::Rejected("missing argument: action".to_string()))?;
            let value = args
                .get("value")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_ACTION_VALUE);
            let request = ActionRequest {
                action: action.to_string(),
                value: Some(value),
                name: None,
            };
            let data = client.update(&request).await?;
            let pet = parse_record(&data)?;
            Ok(ToolReply {
                message: format_action_result(&pet),
                data: Some(data),
            })
        }
        "reset" => {
            let data = client.reset().await?;
            Ok(ToolReply {
                message: "The game has been reset. A new egg is waiting!".to_string(),
                data: Some(data),
            })
        }
        "discovery" => {
            let data = client.discovery().await?;
            Ok(ToolReply {
                message: "Pet service discovery information".to_string(),
                data: Some(data),
            })
        }
        other => Err(PetError::Rejected(format!("unknown tool: {}", other))),
    }
}

fn parse_record(data: &Value) -> PetResult<PetRecord> {
    serde_json::from_value(data.clone())
        .map_err(|e| PetError::UpstreamUnavailable(format!("unexpected record shape: {}", e)))
}

pub fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Egg => "🥚 Egg",
        Stage::Baby => "🐤 Chick",
        Stage::Teen => "🐥 Teen",
        Stage::Adult => "🐔 Adult",
    }
}

pub fn instructions() -> String {
    [
        "【Welcome to the chick raising game!】",
        "You will raise a cute chick, starting from an egg, until it grows into a hen!",
        "",
        "🎮 How to play:",
        "1. **Start**: your chick begins as an egg with a default name.",
        "2. **Name it**: give your chick a name of its own with 'set_pet_name'.",
        "3. **Hatch the egg**: shake the egg while you wait; it hatches after about 5 minutes.",
        "4. **Care for it**:",
        "   - 'feed': lowers hunger, raises happiness.",
        "   - 'play': raises happiness but uses energy.",
        "   - 'rest': restores energy, may lower happiness.",
        "   - 'clean': tidies the nest and improves health.",
        "   - 'heal': restores health.",
        "5. **Time matters**: leave it alone for 12+ hours and it gets lonely; after 24 hours with poor health it may fly away!",
        "",
        "🏆 Goal:",
        "Help your chick grow up healthy and happy into an adult, and don't let it fly away from neglect.",
        "Can you hear the cheeping inside the egg? Let's begin!",
    ]
    .join("\n")
}

/// Status summary with one contextual hint.
pub fn format_status(pet: &PetRecord, now: DateTime<Utc>) -> String {
    let since = hours_between(pet.last_interaction, now);
    let mut msg = format!(
        "【Pet {}】\n📅 Age: {:.2} hours\n⏰ Since last interaction: {:.2} hours\n📊 Stage: {}\n{}📜 Last event: {}\n",
        pet.name,
        pet.age,
        since,
        stage_label(pet.stage),
        gauge_lines(pet),
        pet.last_event
    );
    if pet.runaway {
        msg.push_str("❌ Your chick has flown away. Game over! Please start again.\n");
    } else if pet.stage == Stage::Egg {
        msg.push_str("💡 Tip: use the 'shake' action to hurry the hatching along!\n");
    } else if since > NEGLECT_HOURS {
        msg.push_str("⚠️ You haven't looked after your chick in a long time. It's lonely, do something!\n");
    } else if pet.health < 30.0 {
        msg.push_str("🚨 Your chick is in poor health, heal it quickly!\n");
    } else if pet.mess > 80.0 {
        msg.push_str("🧹 The nest is filthy, clean it up!\n");
    }
    msg.push_str("💡 You can rename your chick with 'set_pet_name'!\n");
    msg
}

/// Summary shown after an action.
pub fn format_action_result(pet: &PetRecord) -> String {
    let mut msg = format!("【Action result】\n📜 {}\n{}", pet.last_event, gauge_lines(pet));
    if pet.runaway {
        msg.push_str("❌ Your chick has flown away. Game over!\n");
    }
    msg
}

fn gauge_lines(pet: &PetRecord) -> String {
    format!(
        "🍽️ Hunger: {:.0}%\n😊 Happiness: {:.0}%\n⚡ Energy: {:.0}%\n❤️ Health: {:.0}%\n🗑️ Mess: {:.0}%\n",
        pet.hunger, pet.happiness, pet.energy, pet.health, pet.mess
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn hatched(now: DateTime<Utc>) -> PetRecord {
        let mut pet = PetRecord::new("Nugget", now);
        pet.stage = Stage::Teen;
        pet.age = 30.0;
        pet
    }

    #[test]
    fn catalog_names_are_unique() {
        let tools = catalog();
        let mut names: Vec<_> = tools.iter().map(|t| t.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), tools.len());
        assert!(names.contains(&"update_pet_status"));
    }

    #[test]
    fn egg_status_suggests_shaking() {
        let now = Utc::now();
        let pet = PetRecord::new("Nugget", now);
        let msg = format_status(&pet, now);
        assert!(msg.contains("🥚 Egg"));
        assert!(msg.contains("'shake'"));
        assert!(msg.ends_with("'set_pet_name'!\n"));
    }

    #[test]
    fn hints_follow_priority_order() {
        let now = Utc::now();
        let mut pet = hatched(now);
        pet.last_interaction = now - Duration::hours(13);
        pet.health = 10.0;
        let msg = format_status(&pet, now);
        assert!(msg.contains("⏰ Since last interaction: 13.00 hours"));
        assert!(msg.contains("lonely"));
        assert!(!msg.contains("poor health"));

        pet.last_interaction = now;
        assert!(format_status(&pet, now).contains("poor health"));

        pet.health = 90.0;
        pet.mess = 85.0;
        assert!(format_status(&pet, now).contains("filthy"));

        pet.runaway = true;
        let msg = format_status(&pet, now);
        assert!(msg.contains("Game over"));
        assert!(!msg.contains("filthy"));
    }

    #[test]
    fn action_result_lists_gauges() {
        let now = Utc::now();
        let mut pet = hatched(now);
        pet.hunger = 12.4;
        pet.last_event = "Nugget ate happily, cheep!".to_string();
        let msg = format_action_result(&pet);
        assert!(msg.contains("📜 Nugget ate happily"));
        assert!(msg.contains("🍽️ Hunger: 12%"));
        assert!(!msg.contains("Game over"));
    }
}
