//! Numeric rules and the checks that decide which cells are targets

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Payload-free rule tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Multiple,
    Factor,
    Prime,
    Equality,
    Inequality,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::Multiple,
        RuleKind::Factor,
        RuleKind::Prime,
        RuleKind::Equality,
        RuleKind::Inequality,
    ];
}

/// The active numeric rule with its parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    /// Targets are multiples of the value
    Multiple(i32),
    /// Targets divide the value evenly
    Factor(i32),
    /// Targets are prime (1 included, see `is_prime`)
    Prime,
    /// Targets equal the value
    Equality(i32),
    /// Targets are anything but the value
    Inequality(i32),
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Multiple(_) => RuleKind::Multiple,
            Rule::Factor(_) => RuleKind::Factor,
            Rule::Prime => RuleKind::Prime,
            Rule::Equality(_) => RuleKind::Equality,
            Rule::Inequality(_) => RuleKind::Inequality,
        }
    }

    /// Parameter of the rule (`None` for primes)
    pub fn value(&self) -> Option<i32> {
        match *self {
            Rule::Multiple(v) | Rule::Factor(v) | Rule::Equality(v) | Rule::Inequality(v) => {
                Some(v)
            }
            Rule::Prime => None,
        }
    }

    /// Whether `n` is a target under this rule
    pub fn satisfies(&self, n: i32) -> bool {
        match *self {
            Rule::Multiple(v) => n.checked_rem(v) == Some(0),
            Rule::Factor(v) => v.checked_rem(n) == Some(0),
            Rule::Prime => is_prime(n),
            Rule::Equality(v) => n == v,
            Rule::Inequality(v) => n != v,
        }
    }

    /// A number that always satisfies the rule
    ///
    /// Used when capped resampling cannot find a target inside the drawn range.
    pub fn guaranteed_target(&self) -> i32 {
        match *self {
            Rule::Multiple(v) => v,
            Rule::Factor(_) => 1,
            Rule::Prime => 2,
            Rule::Equality(v) => v,
            Rule::Inequality(v) => v.wrapping_add(1),
        }
    }
}

/// How cell numbers are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExpressionMode {
    /// Plain numbers
    #[default]
    Off,
    /// Every cell shows an arithmetic expression
    On,
    /// Each cell flips a coin between expression and plain number
    Mixed,
}

/// The active rule plus how the grid should display its numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    pub rule: Rule,
    pub expression_mode: ExpressionMode,
}

impl Criteria {
    pub fn new(rule: Rule, expression_mode: ExpressionMode) -> Self {
        Self {
            rule,
            expression_mode,
        }
    }

    pub fn satisfies(&self, n: i32) -> bool {
        self.rule.satisfies(n)
    }

    /// HUD text for the criteria
    pub fn describe(&self) -> String {
        match self.rule {
            Rule::Multiple(v) => format!("Multiples of {v}"),
            Rule::Factor(v) => format!("Factors of {v}"),
            Rule::Prime => "Prime numbers".to_string(),
            Rule::Equality(v) => format!("Equal to {v}"),
            Rule::Inequality(v) => format!("Not equal to {v}"),
        }
    }
}

/// Whether `n` is a target under `criteria`
pub fn satisfies(n: i32, criteria: &Criteria) -> bool {
    criteria.satisfies(n)
}

/// Trial division that only rules out divisors in `[2, n-1]`
///
/// `1` has no such divisor and therefore counts as prime. Zero and negatives
/// are never prime.
pub fn is_prime(n: i32) -> bool {
    if n < 1 {
        return false;
    }
    let mut d = 2;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Arithmetic expression evaluating to `n`, e.g. `(3) + (9)` for 12
///
/// `r` is drawn from `[0, deviation)`; a non-positive deviation pins it to 0.
pub fn render_expression<R: Rng + ?Sized>(n: i32, deviation: i32, rng: &mut R) -> String {
    let r = if deviation > 0 {
        rng.random_range(0..deviation)
    } else {
        0
    };
    match rng.random_range(0..3) {
        0 => format!("({}) + ({})", r, n - r),
        1 => format!("({}) + ({})", n - r, r),
        _ => format!("({}) - ({})", n + r, r),
    }
}

/// Evaluate an expression produced by `render_expression`
///
/// Returns `None` for anything that is not `(a) op (b)` or a plain integer.
pub fn evaluate_display(text: &str) -> Option<i32> {
    if let Ok(n) = text.trim().parse() {
        return Some(n);
    }
    let (lhs, rest) = text.trim().strip_prefix('(')?.split_once(')')?;
    let rest = rest.trim_start();
    let op = rest.chars().next()?;
    let rhs = rest[op.len_utf8()..].trim().strip_prefix('(')?.strip_suffix(')')?;
    let a: i32 = lhs.trim().parse().ok()?;
    let b: i32 = rhs.trim().parse().ok()?;
    match op {
        '+' => a.checked_add(b),
        '-' => a.checked_sub(b),
        _ => None,
    }
}
