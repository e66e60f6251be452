use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of match being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Regular match.
    Normal,
    /// Special match.
    Special,
}

impl MatchType {
    /// Stored representation of the match type.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Normal => "normal",
            MatchType::Special => "special",
        }
    }
}

/// Match record as exposed by the registry, annotated with its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Caller-chosen key of the record.
    pub token: String,
    pub first_player: String,
    pub second_player: String,
    pub match_type: MatchType,
    /// Identifier of the creating account. Missing on legacy or foreign records.
    pub created_by: Option<String>,
}

/// Fields supplied by an admin when registering a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDraft {
    pub token: String,
    pub first_player: String,
    pub second_player: String,
    pub match_type: MatchType,
}

impl MatchDraft {
    /// Whether every required text field carries a value.
    pub fn is_complete(&self) -> bool {
        !self.token.is_empty() && !self.first_player.is_empty() && !self.second_player.is_empty()
    }

    /// Stamp the draft with its creator, producing the stored match.
    pub fn into_match(self, created_by: impl Into<String>) -> Match {
        Match {
            token: self.token,
            first_player: self.first_player,
            second_player: self.second_player,
            match_type: self.match_type,
            created_by: Some(created_by.into()),
        }
    }
}
