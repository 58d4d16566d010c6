use crate::catalog::write_escaped_string;
use crate::statics;
use serde::Deserialize;
use std::{fmt, hash::Hash};

/// Identity of an entry within its category.
///
/// Keys order the entries of keyed categories and are what ID edits change.
/// Anything that participates in identity (such as an AI goal's type) belongs
/// inside the key so uniqueness is checked on the whole thing.
pub trait EntryKey: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display {
    /// Parse user input for an ID edit of `self`. The error is a short reason.
    fn parse_edit(&self, input: &str) -> Result<Self, String>;

    /// Text an ID edit starts from; `parse_edit` must accept it unchanged.
    fn edit_text(&self) -> String {
        self.to_string()
    }

    /// Auxiliary classification shown next to the key.
    fn tag(&self) -> Option<String> {
        None
    }

    /// The key `by` steps away from this one, used when duplicating entries.
    fn offset(&self, by: i64) -> Result<Self, String> {
        let _ = by;
        Err(statics::EN_ERR_OFFSET_UNSUPPORTED.to_string())
    }

    /// The same key with its tag moved one step along the tag cycle.
    fn cycle_tag(&self, reverse: bool) -> Result<Self, String> {
        let _ = reverse;
        Err(statics::EN_ERR_TAG_UNSUPPORTED.to_string())
    }

    /// Write the key as a JSON5 value.
    fn write_json5(&self, out: &mut String);
}

fn parse_entry_id(input: &str) -> Result<i64, String> {
    let id = input
        .trim()
        .parse::<i64>()
        .map_err(|_| statics::EN_ERR_INVALID_ID_INTEGER.to_string())?;
    if id < 0 {
        return Err(statics::EN_ERR_NEGATIVE_ID.to_string());
    }
    Ok(id)
}

fn offset_entry_id(id: i64, by: i64) -> Result<i64, String> {
    match id.checked_add(by) {
        Some(v) if v >= 0 => Ok(v),
        _ => Err(statics::EN_ERR_NEGATIVE_ID.to_string()),
    }
}

/// Param row IDs.
impl EntryKey for i64 {
    fn parse_edit(&self, input: &str) -> Result<Self, String> {
        parse_entry_id(input)
    }

    fn offset(&self, by: i64) -> Result<Self, String> {
        offset_entry_id(*self, by)
    }

    fn write_json5(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }
}

/// Map entry names.
impl EntryKey for String {
    fn parse_edit(&self, input: &str) -> Result<Self, String> {
        let name = input.trim();
        if name.is_empty() {
            return Err(statics::EN_ERR_EMPTY_NAME.to_string());
        }
        Ok(name.to_string())
    }

    fn write_json5(&self, out: &mut String) {
        write_escaped_string(out, self);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Battle,
    Logic,
    Neither,
}

impl GoalType {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalType::Battle => statics::GOAL_TYPE_BATTLE,
            GoalType::Logic => statics::GOAL_TYPE_LOGIC,
            GoalType::Neither => statics::GOAL_TYPE_NEITHER,
        }
    }

    /// Battle, Logic, Neither, then back to Battle (or the other way round).
    pub fn cycled(self, reverse: bool) -> Self {
        match (self, reverse) {
            (GoalType::Battle, false) | (GoalType::Neither, true) => GoalType::Logic,
            (GoalType::Logic, false) | (GoalType::Battle, true) => GoalType::Neither,
            (GoalType::Neither, false) | (GoalType::Logic, true) => GoalType::Battle,
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AI goal identity: the same ID may exist once per goal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct GoalKey {
    pub id: i64,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
}

impl GoalKey {
    pub fn new(id: i64, goal_type: GoalType) -> Self {
        Self { id, goal_type }
    }
}

impl fmt::Display for GoalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.goal_type)
    }
}

impl EntryKey for GoalKey {
    /// ID edits keep the goal type.
    fn parse_edit(&self, input: &str) -> Result<Self, String> {
        Ok(Self::new(parse_entry_id(input)?, self.goal_type))
    }

    fn edit_text(&self) -> String {
        self.id.to_string()
    }

    fn tag(&self) -> Option<String> {
        Some(self.goal_type.to_string())
    }

    fn offset(&self, by: i64) -> Result<Self, String> {
        Ok(Self::new(offset_entry_id(self.id, by)?, self.goal_type))
    }

    fn cycle_tag(&self, reverse: bool) -> Result<Self, String> {
        Ok(Self::new(self.id, self.goal_type.cycled(reverse)))
    }

    fn write_json5(&self, out: &mut String) {
        out.push_str("{ ");
        out.push_str(statics::CAT_GOAL_ID);
        out.push_str(": ");
        out.push_str(&self.id.to_string());
        out.push_str(", ");
        out.push_str(statics::CAT_GOAL_TYPE);
        out.push_str(": ");
        write_escaped_string(out, self.goal_type.as_str());
        out.push_str(" }");
    }
}
