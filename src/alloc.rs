use std::collections::HashMap;

/// One child region as the allocator sees it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Child<'a> {
    pub id: &'a str,
    pub weight: f64,
}

/// Per-child integer shares keyed by child id
pub type Allocation = HashMap<String, u64>;

/// How to split a total when no child carries any weight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Every child weighs the same and the largest-remainder pass runs as
    /// usual, so the total is preserved. Leftover units go to the earliest
    /// children.
    #[default]
    LargestRemainder,
    /// Each child gets `round(total / count)`. The sum drifts from the total
    /// whenever it doesn't divide evenly.
    RoundedEqualSplit,
}

/// Largest-remainder apportionment of `total` over `children` by weight.
///
/// Uses [`FallbackPolicy::LargestRemainder`] when every weight is zero.
pub fn allocate(total: u64, children: &[Child]) -> Allocation {
    allocate_with(total, children, FallbackPolicy::default())
}

/// [`allocate`] with an explicit zero-weight fallback.
///
/// Negative or non-finite weights count as zero.
pub fn allocate_with(total: u64, children: &[Child], fallback: FallbackPolicy) -> Allocation {
    if children.is_empty() {
        return Allocation::new();
    }

    let weights: Vec<f64> = children.iter().map(|c| usable_weight(c.weight)).collect();
    let total_weight: f64 = weights.iter().sum();

    if total_weight > 0.0 && total_weight.is_finite() {
        return apportion(total, children, &weights, total_weight);
    }

    match fallback {
        FallbackPolicy::LargestRemainder => {
            let equal = vec![1.0; children.len()];
            apportion(total, children, &equal, children.len() as f64)
        }
        FallbackPolicy::RoundedEqualSplit => {
            let each = (total as f64 / children.len() as f64).round() as u64;
            children.iter().map(|c| (c.id.to_string(), each)).collect()
        }
    }
}

#[inline(always)]
fn usable_weight(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}

struct Share {
    idx: usize,
    floor: u64,
    frac: f64,
}

fn apportion(total: u64, children: &[Child], weights: &[f64], total_weight: f64) -> Allocation {
    let mut shares: Vec<Share> = weights
        .iter()
        .enumerate()
        .map(|(idx, &w)| {
            let raw = (w / total_weight) * total as f64;
            let floor = raw.floor();
            Share {
                idx,
                floor: floor as u64,
                frac: raw - floor,
            }
        })
        .collect();

    let distributed: u64 = shares.iter().map(|s| s.floor).sum();
    let remaining = total.saturating_sub(distributed) as usize;
    debug_assert!(remaining <= shares.len());

    // Stable: equal remainders keep input order
    shares.sort_by(|a, b| b.frac.total_cmp(&a.frac));

    shares
        .iter()
        .enumerate()
        .map(|(rank, s)| {
            let bump = u64::from(rank < remaining);
            (children[s.idx].id.to_string(), s.floor + bump)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn children<'a>(ids: &'a [String], weights: &[f64]) -> Vec<Child<'a>> {
        ids.iter()
            .zip(weights)
            .map(|(id, &weight)| Child { id: id.as_str(), weight })
            .collect()
    }

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn test_no_children() {
        assert!(allocate(10, &[]).is_empty());
    }

    #[test]
    fn test_equal_weights_remainder_goes_first() {
        let ids = ids(3);
        let out = allocate(10, &children(&ids, &[1.0, 1.0, 1.0]));
        assert_eq!(out["c0"], 4);
        assert_eq!(out["c1"], 3);
        assert_eq!(out["c2"], 3);
    }

    #[test]
    fn test_zero_total() {
        let ids = ids(4);
        let out = allocate(0, &children(&ids, &[3.0, 0.5, 9.0, 0.0]));
        assert!(out.values().all(|&v| v == 0));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_rounded_split_fallback_keeps_legacy_drift() {
        let ids = ids(3);
        let out = allocate_with(100, &children(&ids, &[0.0, 0.0, 0.0]), FallbackPolicy::RoundedEqualSplit);
        assert_eq!(out.values().copied().collect::<Vec<_>>(), vec![33, 33, 33]);
        assert_eq!(out.values().sum::<u64>(), 99);
    }

    #[test]
    fn test_default_fallback_preserves_total() {
        let ids = ids(3);
        let out = allocate(100, &children(&ids, &[0.0, 0.0, 0.0]));
        assert_eq!(out["c0"], 34);
        assert_eq!(out["c1"], 33);
        assert_eq!(out["c2"], 33);
    }

    #[test]
    fn test_single_child_takes_all() {
        let ids = ids(1);
        let out = allocate(7, &children(&ids, &[5.0]));
        assert_eq!(out["c0"], 7);
    }

    #[test]
    fn test_largest_fraction_wins() {
        // Raw shares 0.7, 1.4, 4.9 -> floors 0, 1, 4 and two units left over
        let ids = ids(3);
        let out = allocate(7, &children(&ids, &[1.0, 2.0, 7.0]));
        assert_eq!(out["c0"], 1);
        assert_eq!(out["c1"], 1);
        assert_eq!(out["c2"], 5);
    }

    #[test]
    fn test_bad_weights_count_as_zero() {
        let ids = ids(3);
        let out = allocate(9, &children(&ids, &[-4.0, f64::NAN, 2.0]));
        assert_eq!(out["c0"], 0);
        assert_eq!(out["c1"], 0);
        assert_eq!(out["c2"], 9);
    }

    proptest! {
        #[test]
        fn prop_sum_preserved_and_close_to_ideal(
            total in 0u64..1_000_000,
            weights in prop::collection::vec(0.0f64..1.0e6, 1..60),
        ) {
            let ids = ids(weights.len());
            let kids = children(&ids, &weights);
            let out = allocate(total, &kids);

            prop_assert_eq!(out.len(), kids.len());
            prop_assert_eq!(out.values().sum::<u64>(), total);

            let total_weight: f64 = weights.iter().sum();
            for (kid, w) in kids.iter().zip(&weights) {
                let ideal = if total_weight > 0.0 {
                    w / total_weight * total as f64
                } else {
                    total as f64 / kids.len() as f64
                };
                prop_assert!((out[kid.id] as f64 - ideal).abs() < 1.0 + 1e-6);
            }
        }

        #[test]
        fn prop_deterministic(
            total in 0u64..10_000,
            weights in prop::collection::vec(prop_oneof![Just(1.0f64), 0.0f64..10.0], 1..30),
        ) {
            let ids = ids(weights.len());
            let kids = children(&ids, &weights);
            prop_assert_eq!(allocate(total, &kids), allocate(total, &kids));
        }
    }
}
