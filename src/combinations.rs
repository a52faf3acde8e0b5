//! Hidden-position combinations.
//!
//! Every question hides one k-subset of a level's eligible positions. We
//! enumerate all C(n, k) subsets in lexicographic order (fix a start index,
//! recurse on the remaining suffix), then shuffle the list so a session walks
//! the subsets in random order without repeating one before all were used.

use rand::seq::SliceRandom;
use rand::Rng;

/// All `k`-subsets of `positions` in canonical lexicographic order, each one
/// ascending. Input is normalized (sorted, deduplicated) first.
///
/// `k == 0` yields a single empty subset; `k > n` yields nothing.
pub fn combinations(positions: &[usize], k: usize) -> Vec<Vec<usize>> {
  let mut pool = positions.to_vec();
  pool.sort_unstable();
  pool.dedup();

  let mut out = Vec::new();
  if k > pool.len() {
    return out;
  }
  let mut current = Vec::with_capacity(k);
  combine(&pool, k, 0, &mut current, &mut out);
  out
}

fn combine(pool: &[usize], k: usize, start: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
  if current.len() == k {
    out.push(current.clone());
    return;
  }
  // Stop early once too few elements remain to fill the subset.
  let needed = k - current.len();
  for i in start..pool.len() {
    if pool.len() - i < needed {
      break;
    }
    current.push(pool[i]);
    combine(pool, k, i + 1, current, out);
    current.pop();
  }
}

/// `combinations` followed by an unbiased Fisher–Yates shuffle.
pub fn shuffled_combinations<R: Rng + ?Sized>(positions: &[usize], k: usize, rng: &mut R) -> Vec<Vec<usize>> {
  let mut combos = combinations(positions, k);
  combos.shuffle(rng);
  combos
}

/// Binomial coefficient, used for sanity checks and inventory logging.
pub fn choose(n: usize, k: usize) -> usize {
  if k > n {
    return 0;
  }
  let k = k.min(n - k);
  (0..k).fold(1usize, |acc, i| acc * (n - i) / (i + 1))
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use std::collections::HashSet;

  #[test]
  fn enumerates_exactly_n_choose_k_distinct_subsets() {
    let positions = [1, 2, 3, 4, 5, 6];
    for k in 0..=positions.len() {
      let combos = combinations(&positions, k);
      assert_eq!(combos.len(), choose(positions.len(), k), "k={k}");
      let distinct: HashSet<Vec<usize>> = combos.iter().cloned().collect();
      assert_eq!(distinct.len(), combos.len(), "duplicates for k={k}");
      for c in &combos {
        assert_eq!(c.len(), k);
        assert!(c.windows(2).all(|w| w[0] < w[1]), "not ascending: {c:?}");
        assert!(c.iter().all(|p| positions.contains(p)));
      }
    }
  }

  #[test]
  fn canonical_order_is_lexicographic() {
    let combos = combinations(&[1, 2, 5, 6], 2);
    assert_eq!(
      combos,
      vec![vec![1, 2], vec![1, 5], vec![1, 6], vec![2, 5], vec![2, 6], vec![5, 6]]
    );
  }

  #[test]
  fn degenerate_sizes() {
    assert_eq!(combinations(&[1, 2], 0), vec![Vec::<usize>::new()]);
    assert!(combinations(&[1, 2], 3).is_empty());
    assert!(combinations(&[], 1).is_empty());
  }

  #[test]
  fn unsorted_input_is_normalized() {
    assert_eq!(combinations(&[6, 1, 6, 2], 2), vec![vec![1, 2], vec![1, 6], vec![2, 6]]);
  }

  #[test]
  fn shuffle_is_a_permutation_and_reproducible_with_a_seed() {
    let canonical = combinations(&[1, 2, 3, 4, 5, 6], 3);
    let a = shuffled_combinations(&[1, 2, 3, 4, 5, 6], 3, &mut StdRng::seed_from_u64(7));
    let b = shuffled_combinations(&[1, 2, 3, 4, 5, 6], 3, &mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);

    let mut sorted = a.clone();
    sorted.sort();
    assert_eq!(sorted, canonical);
  }

  #[test]
  fn choose_values() {
    assert_eq!(choose(6, 2), 15);
    assert_eq!(choose(4, 1), 4);
    assert_eq!(choose(6, 4), 15);
    assert_eq!(choose(3, 5), 0);
  }
}
