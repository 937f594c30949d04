//! Per-connection session state.

use crate::agent::turn::ResponseMode;

/// State for one WebSocket connection.
///
/// Created on connect, dropped on disconnect. Holds the current reply
/// modality, which a `mode` control message switches at any time between
/// turns. Turns within one session are strictly sequential.
#[derive(Debug, Default)]
pub struct SessionState {
    mode: ResponseMode,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ResponseMode) {
        self.mode = mode;
    }
}
