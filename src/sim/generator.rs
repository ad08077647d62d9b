//! Grid generation under the active criteria
//!
//! Regeneration draws every cell, then runs density passes until at least
//! `min_grid_threshold` of the cells are targets. All loops are capped; when a
//! cap is hit the generator logs a warning and keeps the best effort.

use rand::Rng;

use super::criteria::{Criteria, ExpressionMode, Rule, render_expression};
use super::grid::{Cell, Grid};
use crate::tuning::Tuning;

/// Everything generation needs from the owning session
pub struct GenContext<'a, R: Rng + ?Sized> {
    pub tuning: &'a Tuning,
    /// Upper bound (exclusive) for expression offsets
    pub deviation: i32,
    pub rng: &'a mut R,
}

/// Summary of one regeneration, mostly for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegenReport {
    pub targets: usize,
    pub total: usize,
    /// Density sweeps needed after the initial fill
    pub passes: u32,
    /// Cells rerolled into targets by the density sweeps
    pub rerolled: usize,
}

/// `floor(u * (max - min)) + min`, so `max` itself is never produced
///
/// A degenerate range (`max <= min`) yields `min`.
pub fn sample_number<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    let span = max as i64 - min as i64;
    let u: f64 = rng.random();
    let offset = ((u * span as f64).floor() as i64).min(span - 1);
    (min as i64 + offset) as i32
}

/// Redraw until the number satisfies the criteria
///
/// Falls back to `Rule::guaranteed_target` after `max_resample_attempts`.
pub fn draw_target<R: Rng + ?Sized>(
    criteria: &Criteria,
    min: i32,
    max: i32,
    ctx: &mut GenContext<'_, R>,
) -> i32 {
    for _ in 0..ctx.tuning.max_resample_attempts {
        let n = sample_number(ctx.rng, min, max);
        if criteria.satisfies(n) {
            return n;
        }
    }
    let fallback = criteria.rule.guaranteed_target();
    log::warn!(
        "No target for {:?} in [{}, {}) after {} draws, using {}",
        criteria.rule,
        min,
        max,
        ctx.tuning.max_resample_attempts,
        fallback
    );
    fallback
}

/// Initial draw for one cell
fn seed_number<R: Rng + ?Sized>(
    criteria: &Criteria,
    min: i32,
    max: i32,
    force_target: bool,
    ctx: &mut GenContext<'_, R>,
) -> i32 {
    let threshold = ctx.tuning.min_grid_threshold;
    match criteria.rule {
        Rule::Equality(v) => {
            if ctx.rng.random_bool(threshold) {
                v
            } else {
                sample_number(ctx.rng, min, max)
            }
        }
        // Mostly non-targets, the density pass turns enough of them around
        Rule::Inequality(v) => {
            if ctx.rng.random_bool(1.0 - threshold) {
                v
            } else {
                sample_number(ctx.rng, min, max)
            }
        }
        _ if force_target && ctx.rng.random_bool(threshold) => {
            draw_target(criteria, min, max, ctx)
        }
        _ => sample_number(ctx.rng, min, max),
    }
}

/// Text shown for `number` under the expression mode
pub fn render_display<R: Rng + ?Sized>(
    number: i32,
    mode: ExpressionMode,
    ctx: &mut GenContext<'_, R>,
) -> String {
    let as_expression = match mode {
        ExpressionMode::Off => false,
        ExpressionMode::On => true,
        ExpressionMode::Mixed => ctx.rng.random_bool(0.5),
    };
    if as_expression {
        render_expression(number, ctx.deviation, ctx.rng)
    } else {
        number.to_string()
    }
}

fn fill_cell<R: Rng + ?Sized>(
    cell: &mut Cell,
    number: i32,
    criteria: &Criteria,
    ctx: &mut GenContext<'_, R>,
) {
    cell.number = number;
    cell.is_target = criteria.satisfies(number);
    cell.absorbed = false;
    cell.display = render_display(number, criteria.expression_mode, ctx);
}

/// Refill every cell of the grid, then enforce the density threshold
pub fn regenerate<R: Rng + ?Sized>(
    grid: &mut Grid,
    criteria: &Criteria,
    min: i32,
    max: i32,
    force_target: bool,
    ctx: &mut GenContext<'_, R>,
) -> RegenReport {
    for cell in grid.cells_mut() {
        let number = seed_number(criteria, min, max, force_target, ctx);
        fill_cell(cell, number, criteria, ctx);
    }
    let (passes, rerolled) = enforce_density(grid, criteria, min, max, ctx);
    let report = RegenReport {
        targets: grid.target_count(),
        total: grid.len(),
        passes,
        rerolled,
    };
    log::debug!(
        "Regenerated grid for '{}': {}/{} targets, {} passes, {} rerolled",
        criteria.describe(),
        report.targets,
        report.total,
        report.passes,
        report.rerolled
    );
    report
}

/// Reroll non-targets until the target fraction reaches the threshold
///
/// Each sweep visits every non-target cell and rerolls it as a target with
/// probability `reroll_percent`. Returns `(sweeps, rerolled cells)`.
pub fn enforce_density<R: Rng + ?Sized>(
    grid: &mut Grid,
    criteria: &Criteria,
    min: i32,
    max: i32,
    ctx: &mut GenContext<'_, R>,
) -> (u32, usize) {
    let total = grid.len();
    if total == 0 {
        return (0, 0);
    }
    let threshold = ctx.tuning.min_grid_threshold;
    let reroll = ctx.tuning.reroll_percent;
    let mut targets = grid.target_count();
    let mut passes = 0;
    let mut rerolled = 0;

    while (targets as f64) / (total as f64) < threshold {
        if passes >= ctx.tuning.max_threshold_passes {
            log::warn!(
                "Density still {}/{} after {} passes, keeping grid",
                targets,
                total,
                passes
            );
            break;
        }
        passes += 1;
        for cell in grid.cells_mut() {
            if cell.is_target || !ctx.rng.random_bool(reroll) {
                continue;
            }
            let number = draw_target(criteria, min, max, ctx);
            fill_cell(cell, number, criteria, ctx);
            if cell.is_target {
                targets += 1;
                rerolled += 1;
            }
        }
    }
    (passes, rerolled)
}
