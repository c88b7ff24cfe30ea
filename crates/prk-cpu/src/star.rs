//! Tiled stencil loops for the parallel backend.
//!
//! Star kernels of radius 1..=5 are specialized through a const generic so the
//! inner tap loop is fully unrolled. Every other kernel goes through the
//! generic tap loop. Both accumulate into the output and touch only the
//! active region `[r, n - r)` in each dimension.

use rayon::prelude::*;

use prk_core::{Element, GridShape, Pattern, StencilKernel};

/// Kernel coefficients converted to the element type.
pub(crate) struct Weights<T> {
    /// Dense `(2r+1)^2` matrix, row-major, centered at `(r, r)`.
    dense: Vec<T>,
    /// Sparse form for the generic path.
    taps: Vec<(isize, isize, T)>,
}

impl<T: Element> Weights<T> {
    pub(crate) fn new(kernel: &StencilKernel) -> Self {
        Self {
            dense: kernel.weight_matrix().into_iter().map(T::from_f64).collect(),
            taps: kernel
                .taps()
                .iter()
                .map(|t| (t.di, t.dj, T::from_f64(t.weight)))
                .collect(),
        }
    }
}

/// Apply `kernel` over the active region, one rayon task per block of `tile_size` rows.
pub(crate) fn apply<T: Element>(
    kernel: &StencilKernel,
    weights: &Weights<T>,
    shape: GridShape,
    input: &[T],
    output: &mut [T],
) {
    match (kernel.pattern(), kernel.radius()) {
        (Pattern::Star, 1) => star::<1, T>(&weights.dense, shape, input, output),
        (Pattern::Star, 2) => star::<2, T>(&weights.dense, shape, input, output),
        (Pattern::Star, 3) => star::<3, T>(&weights.dense, shape, input, output),
        (Pattern::Star, 4) => star::<4, T>(&weights.dense, shape, input, output),
        (Pattern::Star, 5) => star::<5, T>(&weights.dense, shape, input, output),
        (_, radius) => generic(radius, &weights.taps, shape, input, output),
    }
}

fn star<const R: usize, T: Element>(w: &[T], shape: GridShape, input: &[T], output: &mut [T]) {
    let n = shape.n;
    let tile = shape.tile_size;
    let width = 2 * R + 1;
    let (lo, hi) = (R, n - R);
    let center = R * width + R;

    output[lo * n..hi * n]
        .par_chunks_mut(tile * n)
        .enumerate()
        .for_each(|(block, rows)| {
            let row0 = lo + block * tile;
            for jt in (lo..hi).step_by(tile) {
                let jend = (jt + tile).min(hi);
                for (local, row) in rows.chunks_mut(n).enumerate() {
                    let i = row0 + local;
                    for j in jt..jend {
                        let mut acc = row[j] + w[center] * input[i * n + j];
                        for k in 1..=R {
                            acc += w[center + k] * input[i * n + j + k];
                            acc += w[center - k] * input[i * n + j - k];
                            acc += w[center + k * width] * input[(i + k) * n + j];
                            acc += w[center - k * width] * input[(i - k) * n + j];
                        }
                        row[j] = acc;
                    }
                }
            }
        });
}

fn generic<T: Element>(
    radius: usize,
    taps: &[(isize, isize, T)],
    shape: GridShape,
    input: &[T],
    output: &mut [T],
) {
    let n = shape.n;
    let tile = shape.tile_size;
    let (lo, hi) = (radius, n - radius);

    output[lo * n..hi * n]
        .par_chunks_mut(tile * n)
        .enumerate()
        .for_each(|(block, rows)| {
            let row0 = lo + block * tile;
            for jt in (lo..hi).step_by(tile) {
                let jend = (jt + tile).min(hi);
                for (local, row) in rows.chunks_mut(n).enumerate() {
                    let i = row0 + local;
                    for j in jt..jend {
                        let mut acc = row[j];
                        for &(di, dj, w) in taps {
                            let ii = (i as isize + di) as usize;
                            let jj = (j as isize + dj) as usize;
                            acc += w * input[ii * n + jj];
                        }
                        row[j] = acc;
                    }
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use prk_core::Tap;

    fn axis_kernel(radius: usize) -> StencilKernel {
        let mut taps = vec![Tap::new(0, 0, 0.0)];
        for k in 1..=radius as isize {
            let w = 1.0 / (2.0 * k as f64 * radius as f64);
            taps.push(Tap::new(0, k, w));
            taps.push(Tap::new(0, -k, -w));
            taps.push(Tap::new(k, 0, w));
            taps.push(Tap::new(-k, 0, -w));
        }
        StencilKernel::new(Pattern::Star, radius, taps).unwrap()
    }

    #[test]
    fn test_specialized_matches_generic() {
        let n = 23;
        let input: Vec<f64> = (0..n * n).map(|k| ((k * 37 + 11) % 101) as f64 / 7.0).collect();

        for radius in 1..=5 {
            for tile in [1, 4, 7, n] {
                let kernel = axis_kernel(radius);
                let weights = Weights::<f64>::new(&kernel);
                let shape = GridShape::new(n, tile);

                let mut fast = vec![0.0; n * n];
                let mut slow = vec![0.0; n * n];
                apply(&kernel, &weights, shape, &input, &mut fast);
                generic(radius, &weights.taps, shape, &input, &mut slow);

                for (idx, (a, b)) in fast.iter().zip(&slow).enumerate() {
                    assert!(
                        (a - b).abs() < 1e-12,
                        "radius={} tile={} idx={}: {} vs {}",
                        radius,
                        tile,
                        idx,
                        a,
                        b
                    );
                }
            }
        }
    }
}
