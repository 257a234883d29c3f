//! Lifecycle status of a single mutation controller.

use serde::Serialize;

/// Where a mutation controller is in its lifecycle.
///
/// `Success` and `Error` are transient markers: every invocation ends in
/// `Settled`, which is also the state a new invocation starts from.
///
/// ```text
/// idle | settled ──mutate──▶ pending ──▶ success | error ──▶ settled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationStatus {
    /// No invocation has happened yet
    #[default]
    Idle,

    /// The operation is running
    Pending,

    /// The operation resolved; callbacks for the success branch are next
    Success,

    /// The operation failed; callbacks for the error branch are next
    Error,

    /// The invocation finished, whatever its outcome
    Settled,
}

impl MutationStatus {
    /// Every status, in lifecycle order
    pub const ALL: [Self; 5] = [
        Self::Idle,
        Self::Pending,
        Self::Success,
        Self::Error,
        Self::Settled,
    ];

    /// Check if status is idle
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if status is pending
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Check if status is success
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Check if status is error
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Check if status is settled
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Settled)
    }

    /// Lowercase name, as used in logs and serialized output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
            Self::Settled => "settled",
        }
    }
}

impl std::fmt::Display for MutationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(MutationStatus::default(), MutationStatus::Idle);
    }

    #[test]
    fn exactly_one_predicate_holds() {
        for status in MutationStatus::ALL {
            let flags = [
                status.is_idle(),
                status.is_pending(),
                status.is_success(),
                status.is_error(),
                status.is_settled(),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{status}");
        }
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&MutationStatus::Settled).unwrap();
        assert_eq!(json, "\"settled\"");
        assert_eq!(MutationStatus::Pending.to_string(), "pending");
    }
}
