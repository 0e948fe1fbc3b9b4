use crate::error::{CleanError, Result};

pub trait PrivilegeChecker {
    fn is_elevated(&self) -> bool;
}

/// Elevated means running as root.
pub struct EffectiveUid;

impl PrivilegeChecker for EffectiveUid {
    fn is_elevated(&self) -> bool {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
}

/// Checked once before anything is deleted.
pub fn require_elevated(checker: &dyn PrivilegeChecker) -> Result<()> {
    if checker.is_elevated() {
        Ok(())
    } else {
        Err(CleanError::NotElevated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(bool);

    impl PrivilegeChecker for Fixed {
        fn is_elevated(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn refuses_without_elevation() {
        assert!(matches!(
            require_elevated(&Fixed(false)),
            Err(CleanError::NotElevated)
        ));
        assert!(require_elevated(&Fixed(true)).is_ok());
    }
}
