use tms_core::UserRecord;

/// Result of a sign-in attempt. Failures always carry a displayable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failure { message: String },
}

impl LoginOutcome {
    pub(crate) fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success => None,
            LoginOutcome::Failure { message } => Some(message),
        }
    }
}

/// Result of a sign-up attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Registered(UserRecord),
    Failure { message: String },
}

impl RegisterOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RegisterOutcome::Registered(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            RegisterOutcome::Registered(_) => None,
            RegisterOutcome::Failure { message } => Some(message),
        }
    }
}
