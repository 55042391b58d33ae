use serde::{Deserialize, Serialize};

/// The five free-text fields a user supplies about their background.
///
/// Fields are carried verbatim into the advice prompt. Only `skills` is
/// required to be non-empty, and that check belongs to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub goals: String,
}

impl Profile {
    pub fn has_skills(&self) -> bool {
        !self.skills.trim().is_empty()
    }
}
