//! Participant pool

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use pd_core::{DrawError, DrawResult, Participant, validate_participants};

/// Uniformly random entry of a candidate list
///
/// Every selection path (pool draws and animator runs) goes through here.
pub fn pick_uniform<'a, R: Rng + ?Sized>(
    candidates: &'a [Participant],
    rng: &mut R,
) -> DrawResult<&'a Participant> {
    candidates.choose(rng).ok_or(DrawError::EmptyPool)
}

/// Mutable set of undrawn participants
///
/// Insertion order is kept for display only. Ids are unique: a second `add`
/// with the same id is refused.
#[derive(Debug, Clone, Default)]
pub struct ParticipantPool {
    members: Vec<Participant>,
    ids: HashSet<String>,
}

impl ParticipantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting invalid entries and duplicate ids
    pub fn from_participants(participants: Vec<Participant>) -> DrawResult<Self> {
        validate_participants(&participants)?;
        let ids = participants.iter().map(|p| p.id.clone()).collect();
        Ok(Self {
            members: participants,
            ids,
        })
    }

    /// Uniformly random member
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> DrawResult<&Participant> {
        pick_uniform(&self.members, rng)
    }

    /// Add a participant. Returns `false` (and changes nothing) if the id is
    /// already present.
    pub fn add(&mut self, participant: Participant) -> bool {
        if self.ids.contains(&participant.id) {
            return false;
        }
        self.ids.insert(participant.id.clone());
        self.members.push(participant);
        true
    }

    /// Remove by id, returning the removed member
    pub fn remove(&mut self, id: &str) -> Option<Participant> {
        if !self.ids.remove(id) {
            return None;
        }
        let pos = self.members.iter().position(|p| p.id == id)?;
        Some(self.members.remove(pos))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        if !self.contains(id) {
            return None;
        }
        self.members.iter().find(|p| p.id == id)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.members.iter()
    }

    /// Members in insertion order
    pub fn members(&self) -> &[Participant] {
        &self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn p(id: &str, name: &str) -> Participant {
        Participant::new(id, name).unwrap()
    }

    fn pool() -> ParticipantPool {
        ParticipantPool::from_participants(vec![p("A", "X"), p("B", "Y"), p("C", "Z")]).unwrap()
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut pool = pool();
        assert!(!pool.add(p("A", "Someone Else")));
        assert_eq!(pool.size(), 3);
        assert_eq!(pool.get("A").unwrap().name, "X");

        assert!(pool.add(p("D", "W")));
        assert_eq!(pool.size(), 4);
    }

    #[test]
    fn test_remove_and_readd() {
        let mut pool = pool();
        let removed = pool.remove("B").unwrap();
        assert_eq!(removed.name, "Y");
        assert!(!pool.contains("B"));
        assert!(pool.remove("B").is_none());

        assert!(pool.add(removed));
        let order: Vec<&str> = pool.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_from_participants_rejects_duplicates() {
        let result = ParticipantPool::from_participants(vec![p("A", "X"), p("A", "Y")]);
        assert!(matches!(result, Err(DrawError::Validation(_))));
    }

    #[test]
    fn test_pick_empty_pool() {
        let pool = ParticipantPool::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pool.pick(&mut rng).unwrap_err(), DrawError::EmptyPool);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pick_uniform_matches_pool_pick() {
        let members: Vec<Participant> = ["A", "B", "C", "D"]
            .iter()
            .map(|id| Participant::new(*id, "Guest").unwrap())
            .collect();
        let pool = ParticipantPool::from_participants(members.clone()).unwrap();

        let mut from_pool = StdRng::seed_from_u64(77);
        let mut from_list = StdRng::seed_from_u64(77);
        for _ in 0..50 {
            assert_eq!(
                pool.pick(&mut from_pool).unwrap(),
                pick_uniform(&members, &mut from_list).unwrap()
            );
        }

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_uniform(&[], &mut rng).unwrap_err(), DrawError::EmptyPool);
    }

    #[test]
    fn test_pick_is_roughly_uniform() {
        let pool = pool();
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<String, usize> = HashMap::new();

        for _ in 0..3000 {
            let winner = pool.pick(&mut rng).unwrap();
            *counts.entry(winner.id.clone()).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        for count in counts.values() {
            assert!(*count > 800 && *count < 1200, "skewed pick: {counts:?}");
        }
    }
}
