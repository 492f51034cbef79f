//! Session context collaborator
//!
//! The session knows which iterations are open and, for each, which
//! domain of expertise the participant selected. Reads and writes ask it
//! for the current domain; an iteration that is not open has none.

use dashmap::DashMap;
use mcode_model::Iid;

/// Domain and participant selected for an open iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenIteration {
    /// Selected domain of expertise, if any
    pub domain: Option<Iid>,
    /// Participant the session acts as
    pub participant: Option<Iid>,
}

/// Open-iteration lookup
pub trait SessionContext: Send + Sync {
    /// Selection for `iteration`, `None` when it is not open
    fn open_iteration(&self, iteration: Iid) -> Option<OpenIteration>;

    /// Current domain for `iteration`
    fn current_domain(&self, iteration: Iid) -> Option<Iid> {
        self.open_iteration(iteration).and_then(|open| open.domain)
    }
}

/// In-memory session, filled by the embedder
#[derive(Debug, Default)]
pub struct StaticSession {
    open: DashMap<Iid, OpenIteration>,
}

impl StaticSession {
    /// No open iterations
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: open `iteration` as `domain`
    #[must_use]
    pub fn with_iteration(self, iteration: Iid, domain: Iid) -> Self {
        self.open(iteration, Some(domain), None);
        self
    }

    /// Open (or reselect) `iteration`
    pub fn open(&self, iteration: Iid, domain: Option<Iid>, participant: Option<Iid>) {
        tracing::debug!("Iteration {} open with domain {:?}", iteration, domain);
        self.open
            .insert(iteration, OpenIteration { domain, participant });
    }

    /// Switch the domain of an open iteration
    ///
    /// Returns false when the iteration is not open.
    pub fn select_domain(&self, iteration: Iid, domain: Option<Iid>) -> bool {
        match self.open.get_mut(&iteration) {
            Some(mut open) => {
                open.domain = domain;
                true
            }
            None => false,
        }
    }

    /// Close `iteration`
    pub fn close(&self, iteration: Iid) -> bool {
        self.open.remove(&iteration).is_some()
    }
}

impl SessionContext for StaticSession {
    fn open_iteration(&self, iteration: Iid) -> Option<OpenIteration> {
        self.open.get(&iteration).map(|entry| *entry.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_domain_of_open_iteration() {
        let iteration = Iid::from_u128(1);
        let domain = Iid::from_u128(2);
        let session = StaticSession::new().with_iteration(iteration, domain);

        assert_eq!(session.current_domain(iteration), Some(domain));
        assert_eq!(session.current_domain(Iid::from_u128(3)), None);
    }

    #[test]
    fn select_and_close() {
        let iteration = Iid::from_u128(1);
        let session = StaticSession::new();
        assert!(!session.select_domain(iteration, Some(Iid::from_u128(2))));

        session.open(iteration, None, Some(Iid::from_u128(9)));
        assert_eq!(session.current_domain(iteration), None);
        assert!(session.select_domain(iteration, Some(Iid::from_u128(2))));
        assert_eq!(session.current_domain(iteration), Some(Iid::from_u128(2)));
        assert_eq!(
            session.open_iteration(iteration).unwrap().participant,
            Some(Iid::from_u128(9))
        );

        assert!(session.close(iteration));
        assert_eq!(session.open_iteration(iteration), None);
    }
}
