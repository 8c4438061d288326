//! Field-level mutations on host bot records.
//!
//! Host records are untyped JSON objects. Every helper here checks the shape
//! it is about to touch and reports a [`DirectorError::RecordShape`] instead of
//! overwriting a field of an unexpected type.

use super::behavior::BehaviorModifiers;
use crate::config::{BehaviorOverride, BotTypeSettings, Difficulty};
use crate::error::{DirectorError, DirectorResult};
use crate::host::BotRecord;
use serde_json::{json, Value};

pub const WEAPON_RESTRICTIONS: &str = "weaponRestrictions";
pub const ARMOR_RESTRICTIONS: &str = "armorRestrictions";
pub const ITEM_RESTRICTIONS: &str = "itemRestrictions";
pub const AMMO_RESTRICTIONS: &str = "ammoRestrictions";
pub const DIFFICULTY: &str = "difficulty";
pub const BEHAVIOR_MODIFIERS: &str = "behaviorModifiers";
pub const LEVEL_BASED_GEAR: &str = "levelBasedGear";
pub const MIN_LEVEL: &str = "minLevel";
pub const MAX_LEVEL: &str = "maxLevel";
pub const GEAR_PROGRESSION: &str = "gearProgression";

pub fn as_object_mut<'a>(id: &str, record: &'a mut Value) -> DirectorResult<&'a mut BotRecord> {
    record
        .as_object_mut()
        .ok_or_else(|| DirectorError::shape(id, "record is not an object"))
}

/// Object stored under `field`, created empty when absent.
fn child_object_mut<'a>(id: &str, record: &'a mut BotRecord, field: &str) -> DirectorResult<&'a mut BotRecord> {
    record
        .entry(field.to_string())
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| DirectorError::shape(id, format!("`{field}` is not an object")))
}

/// Appends `items` to the list under `field`, skipping values already present.
/// Returns how many entries were added.
pub fn append_unique(id: &str, record: &mut BotRecord, field: &str, items: &[String]) -> DirectorResult<usize> {
    if items.is_empty() {
        return Ok(0);
    }
    let list = record
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| DirectorError::shape(id, format!("`{field}` is not a list")))?;

    let mut added = 0;
    for item in items {
        if !list.iter().any(|existing| existing.as_str() == Some(item.as_str())) {
            list.push(Value::String(item.clone()));
            added += 1;
        }
    }
    Ok(added)
}

/// Appends the configured restriction lists and, when configured, the level
/// bounds of level-scaled gear.
pub fn apply_gear_restrictions(id: &str, record: &mut Value, settings: &BotTypeSettings) -> DirectorResult<usize> {
    let record = as_object_mut(id, record)?;
    let restrictions = &settings.gear_restrictions;
    let mut added = append_unique(id, record, WEAPON_RESTRICTIONS, &restrictions.weapons)?;
    added += append_unique(id, record, ARMOR_RESTRICTIONS, &restrictions.armor)?;
    added += append_unique(id, record, ITEM_RESTRICTIONS, &restrictions.items)?;

    if let Some(range) = settings.level_based_gear {
        record.insert(LEVEL_BASED_GEAR.to_string(), Value::Bool(true));
        record.insert(MIN_LEVEL.to_string(), json!(range.min_level));
        record.insert(MAX_LEVEL.to_string(), json!(range.max_level));
    }
    Ok(added)
}

/// Writes the difficulty and the table-derived accuracy, reaction time and
/// aggression. Other behavior fields are left as they are.
pub fn apply_difficulty(id: &str, record: &mut Value, difficulty: Difficulty) -> DirectorResult<()> {
    let record = as_object_mut(id, record)?;
    record.insert(DIFFICULTY.to_string(), json!(difficulty.as_str()));

    let modifiers = BehaviorModifiers::from_difficulty(difficulty);
    let behavior = child_object_mut(id, record, BEHAVIOR_MODIFIERS)?;
    behavior.insert("accuracy".to_string(), json!(modifiers.accuracy));
    behavior.insert("reactionTime".to_string(), json!(modifiers.reaction_time));
    behavior.insert("aggression".to_string(), json!(modifiers.aggression));
    Ok(())
}

/// Overwrites each behavior field the override carries.
pub fn apply_behavior(id: &str, record: &mut Value, behavior: &BehaviorOverride) -> DirectorResult<usize> {
    let record = as_object_mut(id, record)?;
    let target = child_object_mut(id, record, BEHAVIOR_MODIFIERS)?;
    let mut written = 0;
    for (field, value) in [
        ("accuracy", behavior.accuracy),
        ("reactionTime", behavior.reaction_time),
        ("aggression", behavior.aggression),
        ("hearing", behavior.hearing),
        ("vision", behavior.vision),
    ] {
        if let Some(value) = value {
            target.insert(field.to_string(), json!(value));
            written += 1;
        }
    }
    Ok(written)
}
