//! Admin gate. A plain string comparison against a shared secret; it keeps
//! casual visitors out of the admin screen and nothing more. There is no
//! hashing, lockout or expiry.

use thiserror::Error;
use tracing::{info, warn};

/// Placeholder secret. Override it with `CAMILLE_ADMIN_PASSWORD`.
pub const DEFAULT_ADMIN_PASSWORD: &str = "1111";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Wrong password.")]
    WrongPassword,
}

/// Locked/unlocked flag plus the secret it is compared against.
#[derive(Debug, Clone)]
pub struct AdminGate {
    password: String,
    unlocked: bool,
}

impl AdminGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            unlocked: false,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Unlock when `attempt` matches exactly. A wrong attempt leaves the gate
    /// locked.
    pub fn try_unlock(&mut self, attempt: &str) -> Result<(), AuthError> {
        if attempt == self.password {
            self.unlocked = true;
            info!("admin unlocked");
            Ok(())
        } else {
            warn!("rejected admin password");
            Err(AuthError::WrongPassword)
        }
    }

    pub fn lock(&mut self) {
        self.unlocked = false;
    }
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_PASSWORD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_unlocks() {
        let mut gate = AdminGate::default();
        assert!(!gate.is_unlocked());
        assert_eq!(gate.try_unlock("1111"), Ok(()));
        assert!(gate.is_unlocked());
    }

    #[test]
    fn any_other_string_stays_locked() {
        let mut gate = AdminGate::default();
        for attempt in ["", "111", "11111", " 1111", "password"] {
            assert_eq!(gate.try_unlock(attempt), Err(AuthError::WrongPassword));
            assert!(!gate.is_unlocked());
        }
    }

    #[test]
    fn lock_resets_the_gate() {
        let mut gate = AdminGate::new("secret");
        gate.try_unlock("secret").unwrap();
        gate.lock();
        assert!(!gate.is_unlocked());
    }
}
