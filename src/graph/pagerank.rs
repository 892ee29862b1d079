//! PageRank over the crawled link graph
//!
//! The transition matrix is dense and row-major. Cell `(i, j)` is set when
//! page `j`'s URL appears in page `i`'s outgoing OR incoming list, so a resolved
//! link counts in both directions. Rows are normalized to sum to one (an empty
//! row becomes uniform), then blended with uniform teleportation:
//! `P = (1 - α) · P + α / N`.
//!
//! Ranks are the stationary distribution found by power iteration from a
//! vector with all mass on page 0.

use crate::config::RankingConfig;
use crate::storage::{Page, PageStore};
use crate::LinkRankError;
use std::collections::HashMap;

/// Parameters of the power iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSettings {
    /// Teleportation probability α
    pub damping: f64,

    /// Stop once successive iterates are closer than this (Euclidean)
    pub tolerance: f64,

    /// Give up after this many iterations
    pub max_iterations: usize,
}

impl Default for RankSettings {
    fn default() -> Self {
        Self {
            damping: 0.1,
            tolerance: 1e-4,
            max_iterations: 10_000,
        }
    }
}

impl From<&RankingConfig> for RankSettings {
    fn from(config: &RankingConfig) -> Self {
        Self {
            damping: config.damping,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
        }
    }
}

/// Square matrix stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    size: usize,
    cells: Vec<f64>,
}

impl Matrix {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * self.size + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.cells[row * self.size..(row + 1) * self.size]
    }

    /// Row vector times matrix: `x · M`
    pub fn left_multiply(&self, x: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.size];
        for (i, &weight) in x.iter().enumerate().take(self.size) {
            if weight == 0.0 {
                continue;
            }
            for (acc, &cell) in out.iter_mut().zip(self.row(i)) {
                *acc += weight * cell;
            }
        }
        out
    }
}

/// Outcome of a power iteration
#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    /// Rank of each page, indexed like the input pages
    pub ranks: Vec<f64>,

    /// Iterations performed
    pub iterations: usize,

    /// Distance between the last two iterates
    pub residual: f64,

    pub converged: bool,
}

/// Builds the 0/1 link indicator matrix
///
/// `pages` must be ordered by page id; row and column `i` both stand for
/// `pages[i]`.
pub fn link_indicator(pages: &[Page]) -> Matrix {
    let index: HashMap<&str, usize> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| (page.url.as_str(), i))
        .collect();

    let mut matrix = Matrix::zeros(pages.len());
    for (i, page) in pages.iter().enumerate() {
        for url in page.outgoing.iter().chain(&page.incoming) {
            if let Some(&j) = index.get(url.as_str()) {
                matrix.set(i, j, 1.0);
            }
        }
    }
    matrix
}

/// Divides each row by its sum; an all-zero row becomes `1/N` everywhere
#[allow(clippy::cast_precision_loss)]
pub fn normalize_rows(matrix: &mut Matrix) {
    let n = matrix.size();
    for i in 0..n {
        let row = matrix.row_mut(i);
        let sum: f64 = row.iter().sum();
        if sum == 0.0 {
            row.fill(1.0 / n as f64);
        } else {
            row.iter_mut().for_each(|cell| *cell /= sum);
        }
    }
}

/// Blends every cell with uniform teleportation
#[allow(clippy::cast_precision_loss)]
pub fn apply_damping(matrix: &mut Matrix, damping: f64) {
    let teleport = damping / matrix.size() as f64;
    matrix
        .cells
        .iter_mut()
        .for_each(|cell| *cell = *cell * (1.0 - damping) + teleport);
}

/// Builds the damped, row-stochastic transition matrix for `pages`
pub fn transition_matrix(pages: &[Page], damping: f64) -> Matrix {
    let mut matrix = link_indicator(pages);
    normalize_rows(&mut matrix);
    apply_damping(&mut matrix, damping);
    matrix
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Repeats `x ← x · P` from `x0 = (1, 0, …, 0)` until two iterates are
/// within tolerance
///
/// The returned ranks are the last iterate computed. An empty matrix yields an
/// empty, converged outcome.
pub fn power_iterate(transition: &Matrix, settings: &RankSettings) -> RankOutcome {
    let n = transition.size();
    if n == 0 {
        return RankOutcome {
            ranks: Vec::new(),
            iterations: 0,
            residual: 0.0,
            converged: true,
        };
    }

    let mut x = vec![0.0; n];
    x[0] = 1.0;
    let mut residual = f64::INFINITY;

    for iteration in 1..=settings.max_iterations {
        let next = transition.left_multiply(&x);
        residual = euclidean_distance(&x, &next);
        x = next;

        if residual < settings.tolerance {
            return RankOutcome {
                ranks: x,
                iterations: iteration,
                residual,
                converged: true,
            };
        }
    }

    RankOutcome {
        ranks: x,
        iterations: settings.max_iterations,
        residual,
        converged: false,
    }
}

/// Computes ranks for pages ordered by id, without touching storage
pub fn compute_ranks(pages: &[Page], settings: &RankSettings) -> RankOutcome {
    let transition = transition_matrix(pages, settings.damping);
    power_iterate(&transition, settings)
}

/// Ranks the whole corpus and persists each page's score
///
/// Nothing is written when the iteration does not converge.
pub fn rank_corpus(
    store: &mut dyn PageStore,
    settings: &RankSettings,
) -> Result<RankOutcome, LinkRankError> {
    let mut pages = store.find_all()?;
    tracing::info!(
        "Ranking {} pages (damping {}, tolerance {:e})",
        pages.len(),
        settings.damping,
        settings.tolerance
    );

    let outcome = compute_ranks(&pages, settings);
    if !outcome.converged {
        return Err(LinkRankError::NotConverged {
            iterations: outcome.iterations,
            residual: outcome.residual,
        });
    }

    for (page, rank) in pages.iter_mut().zip(&outcome.ranks) {
        page.pagerank = Some(*rank);
    }
    store.save_all(&pages)?;

    tracing::info!(
        "PageRank converged after {} iterations (residual {:e})",
        outcome.iterations,
        outcome.residual
    );

    Ok(outcome)
}
