//! Tour construction: stop-ordering policies over a cost matrix.
//!
//! Two policies, both deterministic:
//! - start index 0: identity order. Delivery routes arrive already
//!   sequenced; reordering would violate the assigned package sequence.
//! - any other start: nearest-neighbor construction seeded at the start,
//!   refined with 2-opt local search. Heuristic, not exact TSP.

use tracing::debug;

use crate::traits::CostMatrix;

/// Improvement threshold guarding against floating-point oscillation.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Maximum full 2-opt passes before giving up on further improvement.
const MAX_TWO_OPT_PASSES: usize = 200;

/// Orders the stops of `matrix` beginning at `start_index`.
///
/// The returned permutation always has `start_index` first and contains
/// every index exactly once.
pub fn plan_order(matrix: &CostMatrix, start_index: usize) -> Vec<usize> {
    let n = matrix.len();
    if n <= 1 {
        return (0..n).collect();
    }
    if start_index == 0 {
        let order: Vec<usize> = (0..n).collect();
        debug!(?order, "using sequential delivery order");
        return order;
    }
    let order = nearest_neighbor(matrix, start_index);
    let order = two_opt(matrix, order);
    debug!(?order, "using optimized order");
    order
}

/// Total cost of traversing `order` in sequence. Absent matrix entries
/// contribute infinite cost.
pub fn route_cost(matrix: &CostMatrix, order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|pair| matrix.cost(pair[0], pair[1]).unwrap_or(f64::INFINITY))
        .sum()
}

/// Greedy construction: repeatedly extend by the nearest unvisited stop.
///
/// When every remaining stop is unreachable (absent cost), the first
/// unvisited index is taken so the order stays a full permutation.
fn nearest_neighbor(matrix: &CostMatrix, start_index: usize) -> Vec<usize> {
    let n = matrix.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    order.push(start_index);
    visited[start_index] = true;
    let mut current = start_index;

    for _ in 0..n - 1 {
        let mut next: Option<usize> = None;
        let mut next_cost = f64::INFINITY;
        for j in 0..n {
            if visited[j] {
                continue;
            }
            if let Some(cost) = matrix.cost(current, j) {
                if cost < next_cost {
                    next_cost = cost;
                    next = Some(j);
                }
            }
        }
        let next = next.unwrap_or_else(|| {
            // All remaining stops unreachable; pick the first unvisited.
            (0..n).find(|&j| !visited[j]).unwrap_or(current)
        });
        order.push(next);
        visited[next] = true;
        current = next;
    }

    order
}

/// 2-opt local search: reverse internal sub-sequences while doing so
/// strictly reduces total cost. The first and last stops stay fixed.
fn two_opt(matrix: &CostMatrix, order: Vec<usize>) -> Vec<usize> {
    let n = order.len();
    if n <= 3 {
        return order;
    }

    let mut best = order;
    let mut best_cost = route_cost(matrix, &best);
    let mut passes = 0;
    let mut improved = true;

    while improved && passes < MAX_TWO_OPT_PASSES {
        improved = false;
        passes += 1;
        for i in 1..n - 2 {
            for k in i + 1..n - 1 {
                let mut candidate = best.clone();
                candidate[i..=k].reverse();
                let candidate_cost = route_cost(matrix, &candidate);
                if candidate_cost + IMPROVEMENT_EPSILON < best_cost {
                    best = candidate;
                    best_cost = candidate_cost;
                    improved = true;
                }
            }
        }
    }

    best
}
