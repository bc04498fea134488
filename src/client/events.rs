use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    GuestUpdated { id: String },
    RequestSubmitted { name: String },
}

/// Fan-out of roster changes so that every open view refetches after a
/// successful write. Lagging or absent subscribers are not an error.
#[derive(Debug, Clone)]
pub struct RosterEvents {
    tx: broadcast::Sender<RosterEvent>,
}

impl Default for RosterEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: RosterEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("roster event dropped, no subscribers");
        }
    }
}
