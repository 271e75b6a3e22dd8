//! Candidate queue store.
//!
//! Holds the unseen candidates in the order the server returned them.

use crate::domain::Candidate;

/// Ordered queue of unseen candidates.
///
/// No id appears twice. Once an id is removed it only comes back through a
/// full refetch into an empty queue.
///
/// # Examples
///
/// ```
/// use matchdeck::application::CandidateQueue;
/// use matchdeck::domain::Candidate;
///
/// let candidate = |id: &str| Candidate {
///     id: id.to_string(),
///     first_name: id.to_string(),
///     last_name: String::new(),
///     photo_url: None,
///     age: None,
///     gender: None,
///     about: None,
/// };
///
/// let mut queue = CandidateQueue::default();
/// assert!(queue.load(vec![candidate("a"), candidate("b")]));
/// assert!(!queue.load(vec![candidate("c")]));
///
/// queue.remove_by_id("a");
/// queue.remove_by_id("a");
/// assert_eq!(queue.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CandidateQueue {
    candidates: Vec<Candidate>,
}

impl CandidateQueue {
    /// Replaces the queue only if it is currently empty.
    ///
    /// A remount must not clobber a session already in progress. Duplicate
    /// ids in `candidates` keep their first occurrence.
    ///
    /// Returns whether the queue was populated.
    pub fn load(&mut self, candidates: Vec<Candidate>) -> bool {
        if !self.candidates.is_empty() {
            return false;
        }
        let mut seen = std::collections::HashSet::new();
        self.candidates = candidates
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();
        true
    }

    /// Removes the candidate with `id`. Absent ids are a no-op, so a gesture
    /// and a button racing on the same card shrink the queue only once.
    ///
    /// Returns the removed candidate, if any.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Candidate> {
        let index = self.candidates.iter().position(|c| c.id == id)?;
        Some(self.candidates.remove(index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.candidates.iter().any(|c| c.id == id)
    }

    pub fn head(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::candidate;

    fn ids(queue: &CandidateQueue) -> Vec<&str> {
        queue.as_slice().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_load_into_empty_queue() {
        let mut queue = CandidateQueue::default();
        assert!(queue.load(vec![candidate("A"), candidate("B"), candidate("C")]));
        assert_eq!(ids(&queue), vec!["A", "B", "C"]);
        assert_eq!(queue.head().map(|c| c.id.as_str()), Some("A"));
    }

    #[test]
    fn test_load_on_non_empty_queue_is_noop() {
        let mut queue = CandidateQueue::default();
        queue.load(vec![candidate("A"), candidate("B")]);
        queue.remove_by_id("A");

        assert!(!queue.load(vec![candidate("X"), candidate("Y")]));
        assert_eq!(ids(&queue), vec!["B"]);
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let mut queue = CandidateQueue::default();
        queue.load(vec![candidate("A"), candidate("B"), candidate("A")]);
        assert_eq!(ids(&queue), vec!["A", "B"]);
    }

    #[test]
    fn test_remove_by_id_is_idempotent() {
        let mut queue = CandidateQueue::default();
        queue.load(vec![candidate("A"), candidate("B"), candidate("C")]);

        assert_eq!(queue.remove_by_id("B").map(|c| c.id), Some("B".to_string()));
        assert_eq!(ids(&queue), vec!["A", "C"]);

        assert!(queue.remove_by_id("B").is_none());
        assert_eq!(ids(&queue), vec!["A", "C"]);
        assert!(!queue.contains("B"));
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut queue = CandidateQueue::default();
        assert!(queue.remove_by_id("nobody").is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_reload_after_draining() {
        let mut queue = CandidateQueue::default();
        queue.load(vec![candidate("A")]);
        queue.remove_by_id("A");
        assert!(queue.is_empty());
        assert!(queue.load(vec![candidate("D")]));
        assert_eq!(ids(&queue), vec!["D"]);
    }
}
