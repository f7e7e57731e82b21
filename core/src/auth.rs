//! Session flag.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthState {
    pub is_logged_in: bool,
}

impl AuthState {
    pub fn set_logged_in(&mut self, is_logged_in: bool) {
        self.is_logged_in = is_logged_in;
    }
}
