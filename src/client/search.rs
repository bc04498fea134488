//! Guest lookup: type a name, pick yourself from the dropdown, or ask to be
//! added when nobody matches.

use crate::error::Result;
use crate::model::Guest;

use super::api::RsvpApi;

/// Below this Jaro-Winkler score a roster name is not offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching { query: String, dropdown_open: bool },
    Selected(Guest),
    /// No roster match; the join form starts with the typed name.
    RequestToJoin { name: String, suggestion: Option<String> },
}

#[derive(Debug, Clone)]
pub struct GuestSearch {
    roster: Vec<Guest>,
    state: SearchState,
}

impl GuestSearch {
    pub fn new(roster: Vec<Guest>) -> Self {
        Self {
            roster,
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Replaces the roster, keeping the current state. A selected guest is
    /// swapped for their fresh record when still present.
    pub fn set_roster(&mut self, roster: Vec<Guest>) {
        if let SearchState::Selected(current) = &self.state {
            if let Some(fresh) = roster.iter().find(|g| g.id == current.id) {
                self.state = SearchState::Selected(fresh.clone());
            }
        }
        self.roster = roster;
    }

    pub async fn refresh(&mut self, api: &dyn RsvpApi) -> Result<()> {
        let roster = api.list_guests().await?;
        self.set_roster(roster);
        Ok(())
    }

    /// Every keystroke lands here.
    pub fn type_query(&mut self, query: &str) {
        self.state = if query.trim().is_empty() {
            SearchState::Idle
        } else {
            SearchState::Searching {
                query: query.to_string(),
                dropdown_open: true,
            }
        };
    }

    fn query(&self) -> Option<&str> {
        match &self.state {
            SearchState::Searching { query, .. } => Some(query.trim()),
            _ => None,
        }
    }

    /// Case-insensitive substring match on name.
    pub fn matches(&self) -> Vec<&Guest> {
        let Some(query) = self.query() else {
            return Vec::new();
        };
        let needle = query.to_lowercase();
        self.roster
            .iter()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Collapses the dropdown; the typed query survives.
    pub fn click_outside(&mut self) {
        if let SearchState::Searching { dropdown_open, .. } = &mut self.state {
            *dropdown_open = false;
        }
    }

    pub fn focus(&mut self) {
        if let SearchState::Searching { dropdown_open, .. } = &mut self.state {
            *dropdown_open = true;
        }
    }

    /// Picks a guest from the current matches. Returns false if `id` is not
    /// among them.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(guest) = self.matches().into_iter().find(|g| g.id == id).cloned() else {
            return false;
        };
        self.state = SearchState::Selected(guest);
        true
    }

    /// Closest roster name to the query, for a "did you mean" hint.
    pub fn suggestion(&self) -> Option<&str> {
        let needle = self.query()?.to_lowercase();
        self.roster
            .iter()
            .map(|g| (g, strsim::jaro_winkler(&needle, &g.name.to_lowercase())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(g, _)| g.name.as_str())
    }

    /// Only available once the query matches nobody.
    pub fn request_to_join(&mut self) -> bool {
        let Some(query) = self.query() else {
            return false;
        };
        if !self.matches().is_empty() {
            return false;
        }
        let name = query.to_string();
        let suggestion = self.suggestion().map(str::to_string);
        self.state = SearchState::RequestToJoin { name, suggestion };
        true
    }

    pub fn close(&mut self) {
        self.state = SearchState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_guest_for_read;
    use serde_json::json;

    fn roster() -> Vec<Guest> {
        [("1", "Maria Santos"), ("2", "Mario Cruz"), ("3", "Ana Reyes")]
            .iter()
            .map(|(id, name)| normalize_guest_for_read(&json!({ "id": id, "name": name })))
            .collect()
    }

    #[test]
    fn filters_on_every_keystroke() {
        let mut search = GuestSearch::new(roster());
        search.type_query("mar");
        assert_eq!(search.matches().len(), 2);
        search.type_query("MARIA");
        assert_eq!(search.matches().len(), 1);
        search.type_query("  ");
        assert_eq!(search.state(), &SearchState::Idle);
    }

    #[test]
    fn click_outside_keeps_query() {
        let mut search = GuestSearch::new(roster());
        search.type_query("ana");
        search.click_outside();
        assert_eq!(
            search.state(),
            &SearchState::Searching {
                query: "ana".into(),
                dropdown_open: false
            }
        );
        search.focus();
        assert!(matches!(
            search.state(),
            SearchState::Searching {
                dropdown_open: true,
                ..
            }
        ));
    }

    #[test]
    fn select_then_close_resets() {
        let mut search = GuestSearch::new(roster());
        search.type_query("reyes");
        assert!(!search.select("1"));
        assert!(search.select("3"));
        assert!(matches!(search.state(), SearchState::Selected(g) if g.name == "Ana Reyes"));
        search.close();
        assert_eq!(search.state(), &SearchState::Idle);
    }

    #[test]
    fn request_to_join_only_without_matches() {
        let mut search = GuestSearch::new(roster());
        search.type_query("Ana");
        assert!(!search.request_to_join());

        search.type_query("Marla Santos");
        assert!(search.request_to_join());
        assert_eq!(
            search.state(),
            &SearchState::RequestToJoin {
                name: "Marla Santos".into(),
                suggestion: Some("Maria Santos".into())
            }
        );
    }

    #[test]
    fn no_suggestion_for_unrelated_names() {
        let mut search = GuestSearch::new(roster());
        search.type_query("Zzyzx");
        assert_eq!(search.suggestion(), None);
    }

    #[test]
    fn roster_refresh_updates_selection() {
        let mut search = GuestSearch::new(roster());
        search.type_query("ana");
        search.select("3");
        let fresh = vec![normalize_guest_for_read(
            &json!({ "id": "3", "name": "Ana Reyes", "status": "confirmed" }),
        )];
        search.set_roster(fresh);
        assert!(matches!(
            search.state(),
            SearchState::Selected(g) if g.status.is_answered()
        ));
    }
}
