//! Draws a derangement: every buyer gets exactly one recipient and nobody
//! draws themselves.
//!
//! The draw is rejection sampling over uniform shuffles. The fraction of
//! permutations without a fixed point tends to `1/e`, so the expected number
//! of attempts stays below three for any participant count. The attempt cap
//! only guards against inputs that have no derangement at all (for example
//! two entries sharing the same identity).

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatchingError {
    #[error("a draw needs at least 2 participants, got {found}")]
    TooFewParticipants { found: usize },
    #[error("no valid draw found after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },
}

/// One buyer paired with the participant they have to buy for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<'a, T> {
    pub buyer: &'a T,
    pub recipient: &'a T,
}

/// Returns, for every position `i`, the position of the recipient of buyer `i`.
///
/// `identity` decides whether two entries are the same person. The result is a
/// permutation of `0..items.len()` in which no buyer maps to an entry with the
/// same identity.
pub fn derangement<T, K, F, R>(
    items: &[T],
    identity: F,
    rng: &mut R,
    max_attempts: u32,
) -> Result<Vec<usize>, MatchingError>
where
    K: PartialEq,
    F: Fn(&T) -> K,
    R: Rng + ?Sized,
{
    if items.len() < 2 {
        return Err(MatchingError::TooFewParticipants { found: items.len() });
    }

    let keys: Vec<K> = items.iter().map(identity).collect();
    let mut recipients: Vec<usize> = (0..items.len()).collect();

    for attempt in 1..=max_attempts {
        recipients.shuffle(rng);
        let valid = recipients
            .iter()
            .enumerate()
            .all(|(buyer, &recipient)| keys[buyer] != keys[recipient]);
        if valid {
            debug!(attempt, participants = items.len(), "found derangement");
            return Ok(recipients);
        }
    }

    Err(MatchingError::AttemptsExhausted {
        attempts: max_attempts,
    })
}

/// Pairs every item with its drawn recipient, in the order the items were given.
pub fn assign<'a, T, K, F, R>(
    items: &'a [T],
    identity: F,
    rng: &mut R,
    max_attempts: u32,
) -> Result<Vec<Assignment<'a, T>>, MatchingError>
where
    K: PartialEq,
    F: Fn(&T) -> K,
    R: Rng + ?Sized,
{
    let recipients = derangement(items, identity, rng, max_attempts)?;
    Ok(items
        .iter()
        .zip(recipients)
        .map(|(buyer, recipient)| Assignment {
            buyer,
            recipient: &items[recipient],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Person {
        id: i32,
        name: &'static str,
    }

    fn people(count: i32) -> Vec<Person> {
        (1..=count).map(|id| Person { id, name: "x" }).collect()
    }

    #[test]
    fn draws_are_derangements() {
        let mut rng = StdRng::seed_from_u64(0x5a17a);
        for count in [2, 3, 5, 10, 50] {
            let items = people(count);
            for _ in 0..300 {
                let recipients = derangement(&items, |p| p.id, &mut rng, 10_000).unwrap();

                assert_eq!(recipients.len(), items.len());
                let distinct: BTreeSet<usize> = recipients.iter().copied().collect();
                assert_eq!(distinct.len(), items.len(), "recipients must be a permutation");
                for (buyer, recipient) in recipients.iter().enumerate() {
                    assert_ne!(items[buyer].id, items[*recipient].id);
                }
            }
        }
    }

    #[test]
    fn two_participants_swap() {
        let items = people(2);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let pairs = assign(&items, |p| p.id, &mut rng, 10_000).unwrap();
            assert_eq!(pairs[0].buyer.id, 1);
            assert_eq!(pairs[0].recipient.id, 2);
            assert_eq!(pairs[1].buyer.id, 2);
            assert_eq!(pairs[1].recipient.id, 1);
        }
    }

    #[test]
    fn keeps_buyer_order() {
        let items = vec![
            Person { id: 30, name: "c" },
            Person { id: 10, name: "a" },
            Person { id: 20, name: "b" },
        ];
        let mut rng = StdRng::seed_from_u64(42);
        let pairs = assign(&items, |p| p.id, &mut rng, 10_000).unwrap();
        let buyers: Vec<&str> = pairs.iter().map(|pair| pair.buyer.name).collect();
        assert_eq!(buyers, ["c", "a", "b"]);
    }

    #[test]
    fn rejects_fewer_than_two() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            derangement(&people(0), |p| p.id, &mut rng, 10),
            Err(MatchingError::TooFewParticipants { found: 0 })
        );
        assert_eq!(
            derangement(&people(1), |p| p.id, &mut rng, 10),
            Err(MatchingError::TooFewParticipants { found: 1 })
        );
    }

    #[test]
    fn gives_up_when_no_derangement_exists() {
        // same identity twice, every permutation has a fixed point
        let items = vec![Person { id: 1, name: "a" }, Person { id: 1, name: "b" }];
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            derangement(&items, |p| p.id, &mut rng, 25),
            Err(MatchingError::AttemptsExhausted { attempts: 25 })
        );
    }
}
