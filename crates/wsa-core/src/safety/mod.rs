//! Destructive-action detection and the confirmation protocol.
//!
//! The heuristic is intentionally coarse: any text containing the literal
//! `"rm "` or `"delete"` in any case must be confirmed before anything runs.
//! A [`GateSession`] spans one pipeline invocation and asks its
//! [`Confirmer`] at most once, however many texts are checked.

use async_trait::async_trait;
use tracing::{debug, info};

/// Literal, case-sensitive destructive marker.
const RM_MARKER: &str = "rm ";
/// Destructive marker matched case-insensitively.
const DELETE_MARKER: &str = "delete";

/// A single yes/no question answered by the user.
///
/// Implementations may answer immediately (a fixed policy, a terminal
/// prompt) or suspend until a user gesture arrives.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Return `true` only for an affirmative answer.
    async fn ask(&self, prompt: &str) -> bool;
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticConfirmer(pub bool);

#[async_trait]
impl Confirmer for StaticConfirmer {
    async fn ask(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Adapts a synchronous closure.
pub struct FnConfirmer<F>(pub F);

#[async_trait]
impl<F> Confirmer for FnConfirmer<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn ask(&self, prompt: &str) -> bool {
        (self.0)(prompt)
    }
}

/// Outcome of checking one text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Not destructive; nothing was asked
    NotRequired,
    /// Destructive and the user agreed
    Approved,
    /// Destructive and the user declined
    Declined,
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, GateDecision::Declined)
    }
}

/// Destructive-intent heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyGate;

impl SafetyGate {
    pub fn new() -> Self {
        Self
    }

    /// True iff `text` contains `"rm "` or, in any case, `"delete"`.
    pub fn requires_confirmation(&self, text: &str) -> bool {
        text.contains(RM_MARKER) || text.to_lowercase().contains(DELETE_MARKER)
    }

    /// Start a per-invocation session backed by `confirmer`.
    pub fn session<'a>(&self, confirmer: &'a dyn Confirmer) -> GateSession<'a> {
        GateSession {
            gate: *self,
            confirmer,
            answer: None,
        }
    }
}

/// Confirmation state for a single pipeline invocation.
pub struct GateSession<'a> {
    gate: SafetyGate,
    confirmer: &'a dyn Confirmer,
    answer: Option<bool>,
}

impl GateSession<'_> {
    /// Check `text`, asking the confirmer only if it has not been asked yet.
    pub async fn check(&mut self, text: &str) -> GateDecision {
        if !self.gate.requires_confirmation(text) {
            return GateDecision::NotRequired;
        }

        let approved = match self.answer {
            Some(previous) => previous,
            None => {
                let prompt = format!("This looks destructive:\n  {}\nProceed?", text.trim());
                let answer = self.confirmer.ask(&prompt).await;
                info!(approved = answer, "Destructive action confirmation");
                self.answer = Some(answer);
                answer
            }
        };

        debug!(approved, "Safety gate decision for {:?}", text);
        if approved {
            GateDecision::Approved
        } else {
            GateDecision::Declined
        }
    }

    /// Whether the confirmer has been consulted in this session.
    pub fn asked(&self) -> bool {
        self.answer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingConfirmer {
        answer: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Confirmer for CountingConfirmer {
        async fn ask(&self, _prompt: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    #[test]
    fn test_requires_confirmation() {
        let gate = SafetyGate::new();
        assert!(gate.requires_confirmation("rm -rf build"));
        assert!(gate.requires_confirmation("please DELETE the logs"));
        assert!(gate.requires_confirmation("tell me about the movie Delete"));
        assert!(gate.requires_confirmation("delete duplicate files"));
        assert!(!gate.requires_confirmation("show disk usage"));
        // Only the literal lowercase "rm " counts
        assert!(!gate.requires_confirmation("RM -rf build"));
        assert!(!gate.requires_confirmation("unlink file.txt"));
        assert!(!gate.requires_confirmation("confirm"));
    }

    #[tokio::test]
    async fn test_safe_text_never_asks() {
        let confirmer = CountingConfirmer { answer: false, calls: AtomicUsize::new(0) };
        let gate = SafetyGate::new();
        let mut session = gate.session(&confirmer);

        assert_eq!(session.check("ls -lah").await, GateDecision::NotRequired);
        assert!(!session.asked());
        assert_eq!(confirmer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_session_asks_at_most_once() {
        let confirmer = CountingConfirmer { answer: true, calls: AtomicUsize::new(0) };
        let gate = SafetyGate::new();
        let mut session = gate.session(&confirmer);

        assert_eq!(session.check("delete duplicate files").await, GateDecision::Approved);
        assert_eq!(session.check("rm ~/Downloads/a").await, GateDecision::Approved);
        assert_eq!(confirmer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_decline_is_sticky() {
        let gate = SafetyGate::new();
        let confirmer = StaticConfirmer(false);
        let mut session = gate.session(&confirmer);

        let decision = session.check("rm -rf /tmp/x").await;
        assert_eq!(decision, GateDecision::Declined);
        assert!(!decision.is_allowed());
        assert_eq!(session.check("delete it").await, GateDecision::Declined);
        assert_eq!(session.check("echo hi").await, GateDecision::NotRequired);
    }

    #[tokio::test]
    async fn test_fn_confirmer_sees_prompt() {
        let gate = SafetyGate::new();
        let confirmer = FnConfirmer(|prompt: &str| prompt.contains("rm old.txt"));
        let mut session = gate.session(&confirmer);
        assert_eq!(session.check("rm old.txt").await, GateDecision::Approved);
    }
}
