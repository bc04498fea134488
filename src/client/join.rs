//! "Not on the list?" form, opened from a search with no matches.

use serde_json::Value;

use super::api::RsvpApi;
use super::events::{RosterEvent, RosterEvents};
use super::rsvp::RsvpFlowError;
use super::search::SearchState;
use crate::error::RsvpError;
use crate::model::GuestRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPhase {
    Editing,
    Submitting,
    Sent,
    Failed,
}

#[derive(Debug, Clone)]
pub struct JoinRequestForm {
    request: GuestRequest,
    phase: JoinPhase,
    error: Option<String>,
}

impl JoinRequestForm {
    /// Starts with the name the guest typed into the search box.
    pub fn prefilled(name: &str) -> Self {
        Self {
            request: GuestRequest {
                name: name.trim().to_string(),
                ..Default::default()
            },
            phase: JoinPhase::Editing,
            error: None,
        }
    }

    /// Opens the form for a search that ended in RequestToJoin.
    pub fn from_search(state: &SearchState) -> Option<Self> {
        match state {
            SearchState::RequestToJoin { name, .. } => Some(Self::prefilled(name)),
            _ => None,
        }
    }

    pub fn phase(&self) -> JoinPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn request(&self) -> &GuestRequest {
        &self.request
    }

    /// Field access for the form inputs. A failed form becomes editable again.
    pub fn edit(&mut self) -> Result<&mut GuestRequest, RsvpFlowError> {
        match self.phase {
            JoinPhase::Editing | JoinPhase::Failed => {
                self.phase = JoinPhase::Editing;
                Ok(&mut self.request)
            }
            JoinPhase::Submitting => Err(RsvpFlowError::AlreadySubmitting),
            JoinPhase::Sent => Err(RsvpFlowError::NotEditable),
        }
    }

    pub fn begin_submit(&mut self) -> Result<GuestRequest, RsvpFlowError> {
        match self.phase {
            JoinPhase::Editing | JoinPhase::Failed => {}
            JoinPhase::Submitting => return Err(RsvpFlowError::AlreadySubmitting),
            JoinPhase::Sent => return Err(RsvpFlowError::NotEditable),
        }
        self.phase = JoinPhase::Submitting;
        self.error = None;
        Ok(self.request.clone())
    }

    /// Input is kept on failure; `error()` holds the text to show.
    pub fn finish_submit(
        &mut self,
        outcome: Result<Value, RsvpError>,
    ) -> Result<Value, RsvpFlowError> {
        if self.phase != JoinPhase::Submitting {
            return Err(RsvpFlowError::NotSubmitting);
        }
        match outcome {
            Ok(reply) => {
                self.phase = JoinPhase::Sent;
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(name = %self.request.name, error = %e, "join request failed");
                self.phase = JoinPhase::Failed;
                self.error = Some(match &e {
                    RsvpError::Upstream { message } => message.clone(),
                    _ => "Could not send your request. Please try again.".to_string(),
                });
                Err(RsvpFlowError::Api(e))
            }
        }
    }

    pub async fn submit(
        &mut self,
        api: &dyn RsvpApi,
        events: &RosterEvents,
    ) -> Result<Value, RsvpFlowError> {
        let request = self.begin_submit()?;
        let outcome = api.submit_join_request(&request).await;
        let reply = self.finish_submit(outcome)?;
        events.publish(RosterEvent::RequestSubmitted { name: request.name });
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GuestSearch;
    use crate::error::Result;
    use crate::model::Guest;
    use async_trait::async_trait;
    use serde_json::{Map, json};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        fail_with: Option<String>,
        sent: Mutex<Vec<GuestRequest>>,
    }

    #[async_trait]
    impl RsvpApi for FakeApi {
        async fn list_guests(&self) -> Result<Vec<Guest>> {
            Ok(Vec::new())
        }

        async fn update_guest(&self, _id: &str, _fields: Map<String, Value>) -> Result<Value> {
            Ok(Value::Null)
        }

        async fn submit_join_request(&self, request: &GuestRequest) -> Result<Value> {
            if let Some(message) = &self.fail_with {
                return Err(RsvpError::Upstream {
                    message: message.clone(),
                });
            }
            self.sent.lock().unwrap().push(request.clone());
            Ok(json!({ "success": true }))
        }
    }

    #[test]
    fn opens_only_from_request_to_join() {
        let mut search = GuestSearch::new(Vec::new());
        search.type_query("  Marla Santos ");
        assert!(JoinRequestForm::from_search(search.state()).is_none());

        assert!(search.request_to_join());
        let form = JoinRequestForm::from_search(search.state()).unwrap();
        assert_eq!(form.request().name, "Marla Santos");
        assert_eq!(form.phase(), JoinPhase::Editing);
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut form = JoinRequestForm::prefilled("Marla");
        form.begin_submit().unwrap();
        assert_eq!(form.phase(), JoinPhase::Submitting);
        assert!(matches!(
            form.begin_submit(),
            Err(RsvpFlowError::AlreadySubmitting)
        ));
        assert!(matches!(form.edit(), Err(RsvpFlowError::AlreadySubmitting)));
    }

    #[test]
    fn finish_without_begin_is_rejected() {
        let mut form = JoinRequestForm::prefilled("Marla");
        assert!(matches!(
            form.finish_submit(Ok(Value::Null)),
            Err(RsvpFlowError::NotSubmitting)
        ));
    }

    #[tokio::test]
    async fn failure_keeps_input_and_reopens() {
        let api = FakeApi {
            fail_with: Some("Failed to add guest request".into()),
            ..Default::default()
        };
        let events = RosterEvents::new();
        let mut rx = events.subscribe();

        let mut form = JoinRequestForm::prefilled("Marla");
        form.edit().unwrap().email = "marla@example.com".into();
        assert!(form.submit(&api, &events).await.is_err());
        assert_eq!(form.phase(), JoinPhase::Failed);
        assert_eq!(form.error(), Some("Failed to add guest request"));
        assert_eq!(form.request().email, "marla@example.com");
        assert!(rx.try_recv().is_err());

        form.edit().unwrap().phone = "0917".into();
        assert_eq!(form.phase(), JoinPhase::Editing);
        assert_eq!(form.error(), Some("Failed to add guest request"));
    }

    #[tokio::test]
    async fn success_publishes_and_locks_the_form() {
        let api = FakeApi::default();
        let events = RosterEvents::new();
        let mut rx = events.subscribe();

        let mut form = JoinRequestForm::prefilled("Marla");
        form.edit().unwrap().rsvp = "Yes".into();
        form.submit(&api, &events).await.unwrap();

        assert_eq!(form.phase(), JoinPhase::Sent);
        assert_eq!(form.error(), None);
        assert_eq!(
            rx.recv().await.unwrap(),
            RosterEvent::RequestSubmitted {
                name: "Marla".into()
            }
        );
        assert_eq!(api.sent.lock().unwrap()[0].rsvp, "Yes");
        assert!(matches!(
            form.submit(&api, &events).await,
            Err(RsvpFlowError::NotEditable)
        ));
    }
}
