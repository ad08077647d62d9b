//! Level progression
//!
//! Levels 1-9 follow a hand-tuned table. From level 10 on, five level types
//! repeat with ranges scaled by the current maximum number, and every cell
//! rerolled for density is forced onto a target.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::criteria::{Criteria, ExpressionMode, Rule, RuleKind};
use crate::tuning::Tuning;

/// Breather multiples for level type E
pub const BREATHER_MULTIPLES: [i32; 4] = [2, 3, 5, 10];

/// First level of the repeating cycle
pub const CYCLE_START_LEVEL: u32 = 10;

/// Rule and grid range for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Rule with its freshly drawn value
    pub rule: Rule,
    /// Grid numbers are drawn from `[range_min, range_max)`
    pub range_min: i32,
    pub range_max: i32,
    /// Seed and reroll cells with forced targets
    pub force_target: bool,
    pub expression_mode: ExpressionMode,
}

impl LevelConfig {
    pub fn rule_kind(&self) -> RuleKind {
        self.rule.kind()
    }

    pub fn criteria(&self) -> Criteria {
        Criteria::new(self.rule, self.expression_mode)
    }
}

/// Level type for the repeating cycle, `(level - 9) mod 5`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleType {
    /// Multiples, value up to a third of the max number
    A,
    /// Factors of a value in the top half
    B,
    /// Primes in the upper two thirds
    C,
    /// Equality or inequality over the full range
    D,
    /// Breather multiple
    E,
}

impl CycleType {
    pub fn for_level(level: u32) -> Option<Self> {
        if level < CYCLE_START_LEVEL {
            return None;
        }
        Some(match (level - 9) % 5 {
            0 => CycleType::A,
            1 => CycleType::B,
            2 => CycleType::C,
            3 => CycleType::D,
            _ => CycleType::E,
        })
    }
}

/// Inclusive pick that tolerates `hi < lo`
fn pick<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        lo
    } else {
        rng.random_range(lo..=hi)
    }
}

fn expression_mode_for(kind: RuleKind, force_target: bool) -> ExpressionMode {
    match kind {
        RuleKind::Equality | RuleKind::Inequality if force_target => ExpressionMode::Mixed,
        RuleKind::Equality | RuleKind::Inequality => ExpressionMode::On,
        _ => ExpressionMode::Off,
    }
}

fn config(rule: Rule, range_min: i32, range_max: i32, force_target: bool) -> LevelConfig {
    LevelConfig {
        rule,
        range_min,
        range_max: range_max.max(range_min),
        force_target,
        expression_mode: expression_mode_for(rule.kind(), force_target),
    }
}

/// Rule, grid range and force-target flag for `level`
///
/// Levels offering two variants flip a fair coin from `rng`.
pub fn next_level_config<R: Rng + ?Sized>(level: u32, max_number: i32, rng: &mut R) -> LevelConfig {
    let max = max_number.max(6);
    let full = max + 1;

    let Some(cycle) = CycleType::for_level(level) else {
        return match level {
            0 | 1 => config(Rule::Multiple(pick(rng, 2, 4)), 1, full, false),
            2 => config(Rule::Multiple(pick(rng, 2, 5)), 1, full, false),
            3 => {
                if rng.random_bool(0.5) {
                    config(Rule::Multiple(pick(rng, 4, 7)), 1, full, false)
                } else {
                    let v = pick(rng, 12, 36);
                    config(Rule::Factor(v), 1, v + 1, false)
                }
            }
            4 => {
                let v = pick(rng, 24, 48);
                config(Rule::Factor(v), 1, v + 1, false)
            }
            5 => config(Rule::Prime, 1, 30, false),
            6 => {
                if rng.random_bool(0.5) {
                    config(Rule::Prime, 10, 50, false)
                } else {
                    config(Rule::Multiple(pick(rng, 6, 9)), 1, full, false)
                }
            }
            7 => config(Rule::Equality(pick(rng, 10, 20)), 1, 30, false),
            8 => config(Rule::Inequality(pick(rng, 10, 20)), 1, 30, false),
            _ => {
                let v = pick(rng, 15, 30);
                let rule = if rng.random_bool(0.5) {
                    Rule::Equality(v)
                } else {
                    Rule::Inequality(v)
                };
                config(rule, 5, 40, false)
            }
        };
    };

    match cycle {
        CycleType::A => config(Rule::Multiple(pick(rng, 3, max / 3)), 1, full, true),
        CycleType::B => {
            let v = pick(rng, max / 2, max);
            config(Rule::Factor(v), 1, v + 1, true)
        }
        CycleType::C => config(Rule::Prime, max / 3, full, true),
        CycleType::D => {
            let v = pick(rng, max / 3, max / 2);
            let rule = if rng.random_bool(0.5) {
                Rule::Equality(v)
            } else {
                Rule::Inequality(v)
            };
            config(rule, 1, full, true)
        }
        CycleType::E => {
            let v = BREATHER_MULTIPLES[rng.random_range(0..BREATHER_MULTIPLES.len())];
            config(Rule::Multiple(v), 1, full, true)
        }
    }
}

/// Number range and expression offset, raised on every level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    pub max_number: i32,
    pub expression_deviation: i32,
}

impl Difficulty {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            max_number: tuning.starting_max_number,
            expression_deviation: tuning.starting_deviation,
        }
    }

    /// Step both values toward their caps (never lowers a value already past its cap)
    pub fn escalate(&mut self, tuning: &Tuning) {
        if self.max_number < tuning.max_number_cap {
            self.max_number = (self.max_number + tuning.max_number_step).min(tuning.max_number_cap);
        }
        if self.expression_deviation < tuning.deviation_cap {
            self.expression_deviation =
                (self.expression_deviation + tuning.deviation_step).min(tuning.deviation_cap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_level_one_is_small_multiples() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            let cfg = next_level_config(1, 50, &mut rng);
            let Rule::Multiple(v) = cfg.rule else {
                panic!("expected multiples, got {:?}", cfg.rule);
            };
            assert!((2..=4).contains(&v));
            assert_eq!((cfg.range_min, cfg.range_max), (1, 51));
            assert!(!cfg.force_target);
            assert_eq!(cfg.expression_mode, ExpressionMode::Off);
        }
    }

    #[test]
    fn test_factor_level_range_covers_value() {
        let mut rng = Pcg32::seed_from_u64(2);
        let cfg = next_level_config(4, 50, &mut rng);
        let Rule::Factor(v) = cfg.rule else {
            panic!("expected factors, got {:?}", cfg.rule);
        };
        assert_eq!(cfg.range_max, v + 1);
    }

    #[test]
    fn test_equality_levels_use_expressions() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(next_level_config(7, 50, &mut rng).expression_mode, ExpressionMode::On);
        assert_eq!(next_level_config(8, 50, &mut rng).expression_mode, ExpressionMode::On);
        assert_eq!(next_level_config(8, 50, &mut rng).rule_kind(), RuleKind::Inequality);
    }

    #[test]
    fn test_two_variant_levels_show_both() {
        let mut rng = Pcg32::seed_from_u64(4);
        let kinds: Vec<_> = (0..100)
            .map(|_| next_level_config(3, 50, &mut rng).rule_kind())
            .collect();
        assert!(kinds.contains(&RuleKind::Multiple));
        assert!(kinds.contains(&RuleKind::Factor));
    }

    #[test]
    fn test_cycle_types() {
        assert_eq!(CycleType::for_level(9), None);
        assert_eq!(CycleType::for_level(10), Some(CycleType::B));
        assert_eq!(CycleType::for_level(13), Some(CycleType::E));
        assert_eq!(CycleType::for_level(14), Some(CycleType::A));
    }

    #[test]
    fn test_cycle_levels_force_targets() {
        let mut rng = Pcg32::seed_from_u64(5);
        for level in 10..30 {
            let cfg = next_level_config(level, 120, &mut rng);
            assert!(cfg.force_target, "level {level}");
            if let Some(CycleType::D) = CycleType::for_level(level) {
                assert_eq!(cfg.expression_mode, ExpressionMode::Mixed);
            }
        }
    }

    #[test]
    fn test_breather_uses_presets() {
        let mut rng = Pcg32::seed_from_u64(6);
        for _ in 0..40 {
            let cfg = next_level_config(13, 150, &mut rng);
            let Rule::Multiple(v) = cfg.rule else {
                panic!("expected breather multiple");
            };
            assert!(BREATHER_MULTIPLES.contains(&v));
        }
    }

    #[test]
    fn test_difficulty_escalates_to_caps() {
        let tuning = Tuning::default();
        let mut difficulty = Difficulty::new(&tuning);
        difficulty.escalate(&tuning);
        assert_eq!(difficulty.max_number, tuning.starting_max_number + tuning.max_number_step);
        assert_eq!(
            difficulty.expression_deviation,
            tuning.starting_deviation + tuning.deviation_step
        );
        for _ in 0..100 {
            difficulty.escalate(&tuning);
        }
        assert_eq!(difficulty.max_number, tuning.max_number_cap);
        assert_eq!(difficulty.expression_deviation, tuning.deviation_cap);
    }

    proptest! {
        #[test]
        fn prop_ranges_are_ordered(level in 1u32..200, max_number in 0i32..400, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let cfg = next_level_config(level, max_number, &mut rng);
            prop_assert!(cfg.range_min <= cfg.range_max);
            prop_assert!(RuleKind::ALL.contains(&cfg.rule_kind()));
            if let Some(v) = cfg.rule.value() {
                prop_assert!(v >= 1);
            }
        }
    }
}
