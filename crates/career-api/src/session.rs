/// Who is authenticated for the current request.
///
/// Each request gets its own value from the auth middleware, so two users
/// on the same server never share session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
    username: String,
}

impl Session {
    /// A logged-out session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_in(&mut self, username: impl Into<String>) {
        self.authenticated = true;
        self.username = username.into();
    }

    pub fn log_out(&mut self) {
        self.authenticated = false;
        self.username.clear();
    }

    pub fn is_logged_in(&self) -> bool {
        self.authenticated
    }

    pub fn current_user(&self) -> &str {
        &self.username
    }
}
