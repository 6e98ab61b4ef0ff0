//! Deterministic force-directed placement for exported graphs.
//!
//! Fruchterman-Reingold with a fixed-seed RNG for the initial positions, so
//! repeated exports of unchanged input produce identical coordinates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used by the static exporter.
pub const LAYOUT_SEED: u64 = 42;

/// Iteration count used by the static exporter.
pub const LAYOUT_ITERATIONS: usize = 100;

/// Compute 2-D positions for `node_count` nodes connected by `edges`
/// (index pairs). Positions are rescaled to fit [-1, 1] on both axes.
pub fn spring_layout(
    node_count: usize,
    edges: &[(usize, usize)],
    seed: u64,
    iterations: usize,
) -> Vec<(f64, f64)> {
    match node_count {
        0 => return Vec::new(),
        1 => return vec![(0.0, 0.0)],
        _ => {}
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions: Vec<(f64, f64)> = (0..node_count)
        .map(|_| (rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5)))
        .collect();

    // Optimal pairwise distance for a unit-area frame.
    let k = (1.0 / node_count as f64).sqrt();

    for step in 0..iterations {
        let temperature = 0.1 * (1.0 - step as f64 / iterations as f64);
        let mut displacement = vec![(0.0f64, 0.0f64); node_count];

        // Repulsion between every pair.
        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let dx = positions[i].0 - positions[j].0;
                let dy = positions[i].1 - positions[j].1;
                let distance = (dx * dx + dy * dy).sqrt().max(1e-9);
                let force = k * k / distance;
                let (fx, fy) = (dx / distance * force, dy / distance * force);
                displacement[i].0 += fx;
                displacement[i].1 += fy;
                displacement[j].0 -= fx;
                displacement[j].1 -= fy;
            }
        }

        // Attraction along edges.
        for &(a, b) in edges {
            if a == b || a >= node_count || b >= node_count {
                continue;
            }
            let dx = positions[a].0 - positions[b].0;
            let dy = positions[a].1 - positions[b].1;
            let distance = (dx * dx + dy * dy).sqrt().max(1e-9);
            let force = distance * distance / k;
            let (fx, fy) = (dx / distance * force, dy / distance * force);
            displacement[a].0 -= fx;
            displacement[a].1 -= fy;
            displacement[b].0 += fx;
            displacement[b].1 += fy;
        }

        // Move, capped by the cooling temperature.
        for i in 0..node_count {
            let (dx, dy) = displacement[i];
            let length = (dx * dx + dy * dy).sqrt().max(1e-9);
            let capped = length.min(temperature);
            positions[i].0 += dx / length * capped;
            positions[i].1 += dy / length * capped;
        }
    }

    rescale(&mut positions);
    positions
}

/// Center positions on the origin and scale the largest coordinate to 1.
fn rescale(positions: &mut [(f64, f64)]) {
    let n = positions.len() as f64;
    let mean_x = positions.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = positions.iter().map(|p| p.1).sum::<f64>() / n;
    let mut max_abs = 0.0f64;
    for position in positions.iter_mut() {
        position.0 -= mean_x;
        position.1 -= mean_y;
        max_abs = max_abs.max(position.0.abs()).max(position.1.abs());
    }
    if max_abs > 0.0 {
        for position in positions.iter_mut() {
            position.0 /= max_abs;
            position.1 /= max_abs;
        }
    }
}
