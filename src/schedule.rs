//! Execution ordering for a validated rename plan.
//!
//! Chains are emitted innermost-destination first, so a linear chain
//! never needs a destination that a later queue entry would have
//! vacated. Rotations cannot be linearized at all; their pairs are
//! emitted in input order and the executor breaks them by staging
//! through a temporary name.
//!
//! Sources are pairwise distinct (the original listing is deduplicated)
//! and so are destinations (collision pass 1), so every path has at most
//! one incoming and one outgoing edge: the plan decomposes into disjoint
//! simple chains and cycles.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::plan::RenamePair;

/// Order `pairs` into an execution queue. The queue length always equals
/// the input length.
pub fn build_queue(pairs: Vec<RenamePair>) -> VecDeque<RenamePair> {
    let by_source: HashMap<_, usize> = pairs
        .iter()
        .enumerate()
        .map(|(index, pair)| (pair.source.clone(), index))
        .collect();

    let mut scheduled = vec![false; pairs.len()];
    let mut queue = VecDeque::with_capacity(pairs.len());

    for start in 0..pairs.len() {
        if scheduled[start] {
            continue;
        }
        scheduled[start] = true;
        let mut chain = vec![start];
        let mut cycle = false;

        let mut cursor = start;
        while let Some(&next) = by_source.get(&pairs[cursor].destination) {
            if next == start {
                cycle = true;
                break;
            }
            if scheduled[next] {
                // The rest of this chain was already emitted (it appeared
                // earlier in the input), so it already runs first.
                break;
            }
            scheduled[next] = true;
            chain.push(next);
            cursor = next;
        }

        if cycle {
            // Rotation: order cannot help; the executor defers through a
            // temporary name. Keep input order.
            for &index in &chain {
                queue.push_back(pairs[index].clone());
            }
        } else {
            // Linear chain: innermost destination first.
            for &index in chain.iter().rev() {
                queue.push_back(pairs[index].clone());
            }
        }
    }

    debug!(pairs = pairs.len(), queued = queue.len(), "scheduled rename plan");
    debug_assert_eq!(queue.len(), pairs.len());
    queue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(source: &str, destination: &str) -> RenamePair {
        RenamePair::new(source, destination)
    }

    fn order(queue: &VecDeque<RenamePair>) -> Vec<(String, String)> {
        queue
            .iter()
            .map(|p| {
                (
                    p.source.display().to_string(),
                    p.destination.display().to_string(),
                )
            })
            .collect()
    }

    fn expect(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(s, d)| (s.to_string(), d.to_string()))
            .collect()
    }

    #[test]
    fn linear_chain_runs_innermost_first() {
        let queue = build_queue(vec![pair("a", "b"), pair("b", "c"), pair("c", "d")]);
        assert_eq!(
            order(&queue),
            expect(&[("c", "d"), ("b", "c"), ("a", "b")])
        );
    }

    #[test]
    fn chain_split_across_input_still_ordered() {
        let queue = build_queue(vec![pair("b", "c"), pair("a", "b")]);
        assert_eq!(order(&queue), expect(&[("b", "c"), ("a", "b")]));

        let queue = build_queue(vec![pair("b", "c"), pair("c", "d"), pair("a", "b")]);
        assert_eq!(
            order(&queue),
            expect(&[("c", "d"), ("b", "c"), ("a", "b")])
        );
    }

    #[test]
    fn rotation_kept_in_input_order() {
        let queue = build_queue(vec![pair("a", "b"), pair("b", "a")]);
        assert_eq!(order(&queue), expect(&[("a", "b"), ("b", "a")]));
    }

    #[test]
    fn three_way_rotation_kept_in_input_order() {
        let queue = build_queue(vec![pair("a", "b"), pair("b", "c"), pair("c", "a")]);
        assert_eq!(
            order(&queue),
            expect(&[("a", "b"), ("b", "c"), ("c", "a")])
        );
    }

    #[test]
    fn independent_pairs_keep_relative_order() {
        let queue = build_queue(vec![pair("x", "y"), pair("p", "q"), pair("m", "n")]);
        assert_eq!(
            order(&queue),
            expect(&[("x", "y"), ("p", "q"), ("m", "n")])
        );
    }

    #[test]
    fn count_preserved_for_mixed_plans() {
        let plans = vec![
            vec![pair("a", "b"), pair("b", "a"), pair("x", "y")],
            vec![pair("a", "b"), pair("b", "c"), pair("c", "d"), pair("p", "q")],
            vec![
                pair("a", "b"),
                pair("b", "c"),
                pair("c", "a"),
                pair("m", "n"),
                pair("n", "o"),
            ],
        ];
        for plan in plans {
            let len = plan.len();
            assert_eq!(build_queue(plan).len(), len);
        }
    }
}
