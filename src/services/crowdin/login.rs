use serde::Serialize;

use crate::error::CrowdinError;
use crate::model::crowdin::UserInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    SignedOut,
    Authenticating,
    SignedIn,
    UpdatingInfo,
}

/// What the sign-in panel shows, minus the widgets.
///
/// Every sign-in and sign-out starts a new session. Results that belong to
/// an older session arrive too late to matter and are dropped; the methods
/// taking a session number return `false` when that happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginPanel {
    state: LoginState,
    user: Option<UserInfo>,

    #[serde(skip)]
    session: u64,
}

impl LoginPanel {
    pub fn new(signed_in: bool) -> Self {
        Self {
            state: if signed_in {
                LoginState::SignedIn
            } else {
                LoginState::SignedOut
            },
            user: None,
            session: 0,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn begin_sign_in(&mut self) -> u64 {
        self.session += 1;
        self.change_state(LoginState::Authenticating);
        self.session
    }

    /// Token received; the user details are fetched next.
    pub fn signed_in(&mut self, session: u64) -> bool {
        if !self.is_current(session) {
            return false;
        }
        self.change_state(LoginState::UpdatingInfo);
        true
    }

    pub fn sign_in_failed(&mut self, session: u64) -> bool {
        if !self.is_current(session) {
            return false;
        }
        self.reset();
        true
    }

    pub fn begin_update(&mut self) -> u64 {
        self.change_state(LoginState::UpdatingInfo);
        self.session
    }

    pub fn user_info_arrived(&mut self, session: u64, user: UserInfo) -> bool {
        if !self.is_current(session) {
            return false;
        }
        self.user = Some(user);
        self.change_state(LoginState::SignedIn);
        true
    }

    /// A rejected token means the session is gone; other failures keep it.
    pub fn update_failed(&mut self, session: u64, err: &CrowdinError) -> bool {
        if !self.is_current(session) {
            return false;
        }
        match err {
            CrowdinError::NotSignedIn | CrowdinError::Http { status: 401, .. } => self.reset(),
            _ => self.change_state(LoginState::SignedIn),
        }
        true
    }

    pub fn signed_out(&mut self) {
        self.session += 1;
        self.reset();
    }

    fn is_current(&self, session: u64) -> bool {
        if session != self.session {
            log::debug!("login panel: dropping result of session {session} (now {})", self.session);
            return false;
        }
        true
    }

    fn reset(&mut self) {
        self.user = None;
        self.change_state(LoginState::SignedOut);
    }

    fn change_state(&mut self, state: LoginState) {
        if self.state != state {
            log::debug!("login panel: {:?} -> {:?}", self.state, state);
        }
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> UserInfo {
        UserInfo {
            name: "Jane Doe".into(),
            login: "jdoe".into(),
        }
    }

    #[test]
    fn sign_in_round() {
        let mut panel = LoginPanel::new(false);
        assert_eq!(panel.state(), LoginState::SignedOut);

        let session = panel.begin_sign_in();
        assert_eq!(panel.state(), LoginState::Authenticating);
        assert!(panel.signed_in(session));
        assert_eq!(panel.state(), LoginState::UpdatingInfo);
        assert!(panel.user_info_arrived(session, jane()));
        assert_eq!(panel.state(), LoginState::SignedIn);
        assert_eq!(panel.user().map(|u| u.login.as_str()), Some("jdoe"));

        panel.signed_out();
        assert_eq!(panel.state(), LoginState::SignedOut);
        assert!(panel.user().is_none());
    }

    #[test]
    fn rejected_token_signs_out() {
        let mut panel = LoginPanel::new(true);
        let session = panel.begin_update();
        panel.update_failed(
            session,
            &CrowdinError::Http {
                status: 401,
                message: "Unauthorized".into(),
            },
        );
        assert_eq!(panel.state(), LoginState::SignedOut);
    }

    #[test]
    fn network_failure_stays_signed_in() {
        let mut panel = LoginPanel::new(true);
        let session = panel.begin_update();
        panel.update_failed(session, &CrowdinError::Transport("offline".into()));
        assert_eq!(panel.state(), LoginState::SignedIn);
    }

    #[test]
    fn user_arriving_after_sign_out_is_dropped() {
        let mut panel = LoginPanel::new(true);
        let session = panel.begin_update();
        panel.signed_out();

        assert!(!panel.user_info_arrived(session, jane()));
        assert_eq!(panel.state(), LoginState::SignedOut);
        assert!(panel.user().is_none());
    }

    #[test]
    fn superseded_sign_in_failure_keeps_new_attempt() {
        let mut panel = LoginPanel::new(false);
        let first = panel.begin_sign_in();
        let second = panel.begin_sign_in();

        assert!(!panel.sign_in_failed(first));
        assert_eq!(panel.state(), LoginState::Authenticating);

        assert!(panel.sign_in_failed(second));
        assert_eq!(panel.state(), LoginState::SignedOut);
    }
}
