//! Ring simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! National borders from OpenStreetMap can carry tens of thousands of
//! points per ring. Rendering them interactively needs far fewer, so
//! every ring is thinned by removing points that lie within a given
//! tolerance of the chord between their retained neighbours.
//!
//! The recursion is driven by an explicit work stack so very long rings
//! cannot exhaust the call stack.

use crate::types::{LatLng, Ring};

/// Simplify a single ring using the Ramer-Douglas-Peucker algorithm.
///
/// Points within `tolerance` degrees of the chord between their
/// retained neighbours are removed. A tolerance of 0.0 preserves all
/// points that are not exactly on the chord.
///
/// The first and last points are always kept. Rings with fewer than 3
/// points are returned unchanged (nothing to simplify). The result is
/// deterministic for a given input and tolerance.
#[must_use = "returns the simplified ring"]
pub fn simplify(ring: &Ring, tolerance: f64) -> Ring {
    let points = ring.points();
    if points.len() < 3 {
        return ring.clone();
    }

    let last = points.len() - 1;
    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[last] = true;

    let mut pending = vec![(0, last)];
    while let Some((start, end)) = pending.pop() {
        if let Some(split) = farthest_beyond(points, start, end, tolerance) {
            kept[split] = true;
            pending.push((split, end));
            pending.push((start, split));
        }
    }

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Simplify multiple rings, applying RDP to each independently.
#[must_use = "returns the simplified rings"]
pub fn simplify_rings(rings: &[Ring], tolerance: f64) -> Vec<Ring> {
    rings.iter().map(|r| simplify(r, tolerance)).collect()
}

/// Index of the point strictly between `start` and `end` that lies
/// farthest from the chord joining them, if that distance exceeds
/// `tolerance`.
fn farthest_beyond(points: &[LatLng], start: usize, end: usize, tolerance: f64) -> Option<usize> {
    if end <= start + 1 {
        return None;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    (max_dist > tolerance).then_some(max_idx)
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
///
/// Longitude is treated as x and latitude as y. When `a` and `b`
/// coincide (a closed ring's first and last point), returns the
/// distance from `p` to `a`.
fn perpendicular_distance(p: LatLng, a: LatLng, b: LatLng) -> f64 {
    let dx = b.lng - a.lng;
    let dy = b.lat - a.lat;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.lat - p.lat, -(dy * (a.lng - p.lng)));
    cross.abs() / length_sq.sqrt()
}
