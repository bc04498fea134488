//! RSVP submission for a selected guest.
//!
//! Unanswered -> Editing -> Submitting -> Confirmed | Failed. A guest who has
//! already answered starts in AlreadyResponded and cannot change it here.

use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use thiserror::Error;

use super::api::RsvpApi;
use super::events::{RosterEvent, RosterEvents};
use crate::error::RsvpError;
use crate::model::{Guest, GuestStatus};

/// How long a success or error banner stays up.
pub const BANNER_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpPhase {
    Unanswered,
    Editing,
    Submitting,
    Confirmed,
    Failed,
    AlreadyResponded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attendance {
    Attending,
    NotAttending,
}

impl Attendance {
    fn status(self) -> GuestStatus {
        match self {
            Attendance::Attending => GuestStatus::Confirmed,
            Attendance::NotAttending => GuestStatus::Declined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Error)]
pub enum RsvpFlowError {
    #[error("A response is already being sent")]
    AlreadySubmitting,

    #[error("This RSVP can no longer be changed here")]
    NotEditable,

    #[error("Please choose whether you will attend")]
    MissingAttendance,

    #[error("No submission in progress")]
    NotSubmitting,

    #[error("{0}")]
    Api(#[from] RsvpError),
}

#[derive(Debug, Clone)]
pub struct RsvpForm {
    guest: Guest,
    phase: RsvpPhase,
    attendance: Option<Attendance>,
    message: String,
    email: String,
    banner: Option<Banner>,
}

impl RsvpForm {
    pub fn new(guest: Guest) -> Self {
        let phase = if guest.status.is_answered() {
            RsvpPhase::AlreadyResponded
        } else {
            RsvpPhase::Unanswered
        };
        Self {
            message: guest.message.clone(),
            email: guest.email.clone(),
            guest,
            phase,
            attendance: None,
            banner: None,
        }
    }

    pub fn phase(&self) -> RsvpPhase {
        self.phase
    }

    pub fn guest(&self) -> &Guest {
        &self.guest
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    fn edit(&mut self) -> Result<(), RsvpFlowError> {
        match self.phase {
            RsvpPhase::Unanswered | RsvpPhase::Editing | RsvpPhase::Failed => {
                self.phase = RsvpPhase::Editing;
                Ok(())
            }
            RsvpPhase::Submitting => Err(RsvpFlowError::AlreadySubmitting),
            RsvpPhase::Confirmed | RsvpPhase::AlreadyResponded => Err(RsvpFlowError::NotEditable),
        }
    }

    pub fn choose(&mut self, attendance: Attendance) -> Result<(), RsvpFlowError> {
        self.edit()?;
        self.attendance = Some(attendance);
        Ok(())
    }

    pub fn set_message(&mut self, message: &str) -> Result<(), RsvpFlowError> {
        self.edit()?;
        self.message = message.to_string();
        Ok(())
    }

    pub fn set_email(&mut self, email: &str) -> Result<(), RsvpFlowError> {
        self.edit()?;
        self.email = email.to_string();
        Ok(())
    }

    /// Moves to Submitting and returns the fields for the PUT. A second call
    /// while the first is in flight is rejected.
    pub fn begin_submit(&mut self) -> Result<Map<String, Value>, RsvpFlowError> {
        match self.phase {
            RsvpPhase::Editing | RsvpPhase::Failed => {}
            RsvpPhase::Unanswered => return Err(RsvpFlowError::MissingAttendance),
            RsvpPhase::Submitting => return Err(RsvpFlowError::AlreadySubmitting),
            RsvpPhase::Confirmed | RsvpPhase::AlreadyResponded => {
                return Err(RsvpFlowError::NotEditable);
            }
        }
        let attendance = self.attendance.ok_or(RsvpFlowError::MissingAttendance)?;

        let mut fields = Map::new();
        fields.insert(
            "status".into(),
            Value::String(attendance.status().as_str().to_string()),
        );
        fields.insert("message".into(), Value::String(self.message.trim().to_string()));
        if !self.email.trim().is_empty() {
            fields.insert("email".into(), Value::String(self.email.trim().to_string()));
        }
        self.phase = RsvpPhase::Submitting;
        self.banner = None;
        Ok(fields)
    }

    /// Form input is kept on failure so the guest can retry.
    pub fn finish_submit(
        &mut self,
        outcome: Result<Value, RsvpError>,
        now: Instant,
    ) -> Result<(), RsvpFlowError> {
        if self.phase != RsvpPhase::Submitting {
            return Err(RsvpFlowError::NotSubmitting);
        }
        match outcome {
            Ok(_) => {
                if let Some(attendance) = self.attendance {
                    self.guest.status = attendance.status();
                }
                self.guest.message = self.message.trim().to_string();
                self.phase = RsvpPhase::Confirmed;
                self.banner = Some(Banner {
                    kind: BannerKind::Success,
                    text: "Thank you! Your RSVP has been recorded.".into(),
                    expires_at: now + BANNER_TTL,
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id = %self.guest.id, error = %e, "RSVP submission failed");
                self.phase = RsvpPhase::Failed;
                let text = match &e {
                    RsvpError::Upstream { message } => message.clone(),
                    _ => "Could not send your RSVP. Please try again.".to_string(),
                };
                self.banner = Some(Banner {
                    kind: BannerKind::Error,
                    text,
                    expires_at: now + BANNER_TTL,
                });
                Err(RsvpFlowError::Api(e))
            }
        }
    }

    /// Full round trip. On success every roster view is told to refetch.
    pub async fn submit(
        &mut self,
        api: &dyn RsvpApi,
        events: &RosterEvents,
    ) -> Result<(), RsvpFlowError> {
        let fields = self.begin_submit()?;
        let outcome = api.update_guest(&self.guest.id, fields).await;
        self.finish_submit(outcome, Instant::now())?;
        events.publish(RosterEvent::GuestUpdated {
            id: self.guest.id.clone(),
        });
        Ok(())
    }

    /// Drops an expired banner.
    pub fn tick(&mut self, now: Instant) {
        if self.banner.as_ref().is_some_and(|b| now >= b.expires_at) {
            self.banner = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_guest_for_read;
    use serde_json::json;

    fn guest(status: &str) -> Guest {
        normalize_guest_for_read(&json!({ "id": "7", "name": "Ana", "status": status }))
    }

    #[test]
    fn answered_guests_start_terminal() {
        let mut form = RsvpForm::new(guest("declined"));
        assert_eq!(form.phase(), RsvpPhase::AlreadyResponded);
        assert!(matches!(
            form.choose(Attendance::Attending),
            Err(RsvpFlowError::NotEditable)
        ));
        assert_eq!(RsvpForm::new(guest("request")).phase(), RsvpPhase::Unanswered);
    }

    #[test]
    fn submit_requires_a_choice() {
        let mut form = RsvpForm::new(guest("pending"));
        assert!(matches!(
            form.begin_submit(),
            Err(RsvpFlowError::MissingAttendance)
        ));
        form.set_message("See you").unwrap();
        assert_eq!(form.phase(), RsvpPhase::Editing);
        assert!(matches!(
            form.begin_submit(),
            Err(RsvpFlowError::MissingAttendance)
        ));
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        let mut form = RsvpForm::new(guest("pending"));
        form.choose(Attendance::Attending).unwrap();
        let fields = form.begin_submit().unwrap();
        assert_eq!(fields["status"], json!("confirmed"));
        assert!(!fields.contains_key("email"));
        assert!(matches!(
            form.begin_submit(),
            Err(RsvpFlowError::AlreadySubmitting)
        ));
        assert!(matches!(
            form.set_message("x"),
            Err(RsvpFlowError::AlreadySubmitting)
        ));
    }

    #[test]
    fn success_banner_auto_dismisses() {
        let mut form = RsvpForm::new(guest("pending"));
        form.choose(Attendance::NotAttending).unwrap();
        form.begin_submit().unwrap();
        let now = Instant::now();
        form.finish_submit(Ok(json!({ "success": true })), now).unwrap();
        assert_eq!(form.phase(), RsvpPhase::Confirmed);
        assert_eq!(form.guest().status, GuestStatus::Declined);
        assert_eq!(form.banner().map(|b| b.kind), Some(BannerKind::Success));

        form.tick(now + Duration::from_secs(1));
        assert!(form.banner().is_some());
        form.tick(now + BANNER_TTL);
        assert!(form.banner().is_none());
    }

    #[test]
    fn failure_keeps_input_editable() {
        let mut form = RsvpForm::new(guest("pending"));
        form.choose(Attendance::Attending).unwrap();
        form.set_message("Can't wait").unwrap();
        form.begin_submit().unwrap();
        let err = form
            .finish_submit(
                Err(RsvpError::Upstream {
                    message: "Failed to update guest".into(),
                }),
                Instant::now(),
            )
            .unwrap_err();
        assert!(matches!(err, RsvpFlowError::Api(_)));
        assert_eq!(form.phase(), RsvpPhase::Failed);
        assert_eq!(
            form.banner().map(|b| b.text.as_str()),
            Some("Failed to update guest")
        );

        // Same choice and message go out on retry.
        let fields = form.begin_submit().unwrap();
        assert_eq!(fields["message"], json!("Can't wait"));
    }
}
