use serde::{Deserialize, Serialize};

/// Acknowledgement body returned for handled and ignored events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
}

impl WebhookAck {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
