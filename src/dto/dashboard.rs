use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::matches::MatchView,
    state::account::{Account, Role},
    state::matches::Match,
};

/// Shown in place of the list when the registry is empty.
pub const EMPTY_NOTICE: &str = "No matches found.";

/// Full dashboard rendering for the logged-in account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardView {
    /// `Dashboard (Admin)` or `Dashboard (Viewer)`.
    pub heading: String,
    pub identifier: String,
    pub role: Role,
    /// Whether the add/delete forms are available.
    pub can_manage_matches: bool,
    pub matches: Vec<MatchView>,
    /// Tokens offered by the delete form. Present for admins only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletable_tokens: Option<Vec<String>>,
    /// Outcome of the action that produced this rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Informational note, e.g. when no match exists yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl DashboardView {
    pub fn render(account: &Account, matches: Vec<Match>, message: Option<String>) -> Self {
        let can_manage_matches = account.role.is_admin();
        let matches: Vec<MatchView> = matches.into_iter().map(MatchView::from).collect();
        let deletable_tokens = can_manage_matches
            .then(|| matches.iter().map(|view| view.token.clone()).collect());
        let notice = matches.is_empty().then(|| EMPTY_NOTICE.to_owned());

        Self {
            heading: format!("Dashboard ({})", account.role.title()),
            identifier: account.identifier.clone(),
            role: account.role,
            can_manage_matches,
            matches,
            deletable_tokens,
            message,
            notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::matches::MatchType;

    fn sample() -> Match {
        Match {
            token: "T1".into(),
            first_player: "Alice".into(),
            second_player: "Bob".into(),
            match_type: MatchType::Normal,
            created_by: Some("a@x.com".into()),
        }
    }

    #[test]
    fn admin_view_offers_deletable_tokens() {
        let view = DashboardView::render(&Account::new("a@x.com", Role::Admin), vec![sample()], None);
        assert_eq!(view.heading, "Dashboard (Admin)");
        assert!(view.can_manage_matches);
        assert_eq!(view.deletable_tokens, Some(vec!["T1".to_owned()]));
        assert_eq!(view.notice, None);
    }

    #[test]
    fn viewer_view_hides_management() {
        let view = DashboardView::render(&Account::new("v@x.com", Role::Viewer), vec![sample()], None);
        assert_eq!(view.heading, "Dashboard (Viewer)");
        assert!(!view.can_manage_matches);
        assert_eq!(view.deletable_tokens, None);
        assert_eq!(view.matches.len(), 1);
    }

    #[test]
    fn empty_registry_carries_notice() {
        let view = DashboardView::render(&Account::new("a@x.com", Role::Admin), vec![], None);
        assert_eq!(view.notice.as_deref(), Some(EMPTY_NOTICE));
        assert_eq!(view.deletable_tokens, Some(vec![]));
    }
}
