//! Single-cycle gift assignment
//!
//! Shuffle the participants uniformly, then have everyone gift the person
//! after them in the shuffled order, wrapping around. For `n >= 2` that is
//! one cycle of length `n`: nobody draws themselves, everybody is drawn
//! exactly once, and no group closes on itself before the whole room does.

use rand::seq::SliceRandom;
use rand::Rng;

/// Smallest room that can be drawn
pub const MIN_PARTICIPANTS: usize = 2;

/// Anything that can take part in a draw
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for String {
    fn name(&self) -> &str {
        self
    }
}

impl Named for &str {
    fn name(&self) -> &str {
        self
    }
}

/// The participant set cannot be drawn
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
    #[error("a minimum of {MIN_PARTICIPANTS} participants is required, got {0}")]
    MinimumParticipants(usize),
}

/// One giver and the display name of the person they are gifting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<T> {
    pub giver: T,
    pub giftee_name: String,
}

/// Draw a single gift-giving cycle over `participants`
///
/// Returns one assignment per participant, in shuffled cycle order:
/// the giftee of entry `i` is the giver of entry `(i + 1) % n`.
///
/// Participant names are expected to be unique, which rooms enforce.
///
/// # Errors
///
/// [`AssignError::MinimumParticipants`] when fewer than two participants
/// are supplied.
pub fn assign<T, R>(mut participants: Vec<T>, rng: &mut R) -> Result<Vec<Assignment<T>>, AssignError>
where
    T: Named,
    R: Rng + ?Sized,
{
    let n = participants.len();
    if n < MIN_PARTICIPANTS {
        return Err(AssignError::MinimumParticipants(n));
    }

    participants.shuffle(rng);

    let giftees: Vec<String> = (0..n)
        .map(|i| participants[(i + 1) % n].name().to_string())
        .collect();

    Ok(participants
        .into_iter()
        .zip(giftees)
        .map(|(giver, giftee_name)| Assignment { giver, giftee_name })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const NAMES: [&str; 5] = ["Alice", "Bob", "Carol", "Dean", "Earl"];

    /// Follow giver -> giftee from the first giver and count the steps back
    fn cycle_length(assignments: &[Assignment<&str>]) -> usize {
        let next: HashMap<&str, &str> = assignments
            .iter()
            .map(|a| (a.giver, a.giftee_name.as_str()))
            .collect();

        let start = assignments[0].giver;
        let mut current = start;
        let mut steps = 0;
        loop {
            current = next[current];
            steps += 1;
            if current == start || steps > assignments.len() {
                return steps;
            }
        }
    }

    #[test]
    fn test_fewer_than_two_participants() {
        let mut rng = StdRng::seed_from_u64(1);

        let err = assign(vec!["Alice"], &mut rng).unwrap_err();
        assert_eq!(err, AssignError::MinimumParticipants(1));
        assert_eq!(
            err.to_string(),
            "a minimum of 2 participants is required, got 1"
        );

        let empty: Vec<&str> = Vec::new();
        assert_eq!(
            assign(empty, &mut rng),
            Err(AssignError::MinimumParticipants(0))
        );
    }

    #[test]
    fn test_five_participants_single_cycle() {
        let mut rng = StdRng::seed_from_u64(42);
        let assignments = assign(NAMES.to_vec(), &mut rng).unwrap();

        assert_eq!(assignments.len(), NAMES.len());

        let mut gifted: HashMap<&str, usize> = HashMap::new();
        for a in &assignments {
            assert_ne!(a.giver, a.giftee_name, "{} gifts themselves", a.giver);
            *gifted.entry(a.giftee_name.as_str()).or_default() += 1;
        }
        for name in NAMES {
            assert_eq!(gifted.get(name), Some(&1), "{} is not gifted exactly once", name);
        }

        assert_eq!(cycle_length(&assignments), NAMES.len());
    }

    #[test]
    fn test_two_participants_exchange() {
        let mut rng = StdRng::seed_from_u64(7);
        let assignments = assign(vec!["Alice", "Bob"], &mut rng).unwrap();

        let pairs: HashMap<&str, &str> = assignments
            .iter()
            .map(|a| (a.giver, a.giftee_name.as_str()))
            .collect();
        assert_eq!(pairs["Alice"], "Bob");
        assert_eq!(pairs["Bob"], "Alice");
    }

    #[test]
    fn test_single_cycle_for_many_sizes_and_seeds() {
        let names: Vec<String> = (0..16).map(|i| format!("participant-{}", i)).collect();

        for n in MIN_PARTICIPANTS..=names.len() {
            for seed in 0..25 {
                let mut rng = StdRng::seed_from_u64(seed);
                let subset: Vec<&str> = names[..n].iter().map(String::as_str).collect();
                let assignments = assign(subset, &mut rng).unwrap();

                assert_eq!(assignments.len(), n);
                assert!(assignments.iter().all(|a| a.giver != a.giftee_name));
                assert_eq!(cycle_length(&assignments), n, "n={} seed={}", n, seed);
            }
        }
    }

    #[test]
    fn test_cycle_order_links_neighbours() {
        let mut rng = StdRng::seed_from_u64(3);
        let assignments = assign(NAMES.to_vec(), &mut rng).unwrap();
        let n = assignments.len();

        for i in 0..n {
            assert_eq!(assignments[i].giftee_name, assignments[(i + 1) % n].giver);
        }
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let first = assign(NAMES.to_vec(), &mut StdRng::seed_from_u64(99)).unwrap();
        let second = assign(NAMES.to_vec(), &mut StdRng::seed_from_u64(99)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffle_reaches_different_orders() {
        let orders: std::collections::HashSet<Vec<&str>> = (0..50)
            .map(|seed| {
                assign(NAMES.to_vec(), &mut StdRng::seed_from_u64(seed))
                    .unwrap()
                    .into_iter()
                    .map(|a| a.giver)
                    .collect()
            })
            .collect();

        assert!(orders.len() > 1);
    }
}
