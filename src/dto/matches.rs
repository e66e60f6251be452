use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::matches::{Match, MatchDraft, MatchType};

/// Placeholder shown for records written without a creator.
pub const UNKNOWN_CREATOR: &str = "N/A";

/// Payload used to register a match under a caller-chosen token.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMatchRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub first_player: String,
    #[validate(length(min = 1))]
    pub second_player: String,
    pub match_type: MatchType,
}

impl From<CreateMatchRequest> for MatchDraft {
    fn from(request: CreateMatchRequest) -> Self {
        MatchDraft {
            token: request.token,
            first_player: request.first_player,
            second_player: request.second_player,
            match_type: request.match_type,
        }
    }
}

/// Match as displayed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MatchView {
    pub token: String,
    pub first_player: String,
    pub second_player: String,
    pub match_type: MatchType,
    pub created_by: String,
}

impl From<Match> for MatchView {
    fn from(value: Match) -> Self {
        Self {
            token: value.token,
            first_player: value.first_player,
            second_player: value.second_player,
            match_type: value.match_type,
            created_by: value
                .created_by
                .unwrap_or_else(|| UNKNOWN_CREATOR.to_owned()),
        }
    }
}
