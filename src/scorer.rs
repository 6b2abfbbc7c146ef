//! Hand-coded bout win-probability heuristic.
//!
//! This is not a trained model. Both fighters start from an even 50/50 and the
//! raw scores are nudged by two bounded rules before being normalized:
//!
//! - **Reach**: the reach difference, clamped to ±10, moves fighter A's raw
//!   score by 0.01 per unit. Fighter B's raw score is left alone; the
//!   normalization step turns this into a relative shift for both sides.
//! - **Age**: the strictly younger fighter gets a flat +0.02.
//!
//! The normalized pair always sums to 1. Output values are then rounded to
//! three decimal places independently, so the rounded pair may not.

use crate::models::{BoutFeatures, PredictionResult};

/// Identifier reported in every [`PredictionResult`].
pub const MODEL_ID: &str = "dummy-v0";

/// Starting raw score for each fighter.
const BASE_PROB: f64 = 0.5;
/// Raw score added to fighter A per unit of reach advantage.
const REACH_WEIGHT: f64 = 0.01;
/// Reach differences beyond ±this are treated as exactly ±this.
const REACH_DIFF_CAP: i64 = 10;
/// Raw score added to the younger fighter.
const AGE_BONUS: f64 = 0.02;
/// Decimal places kept in the response.
const OUTPUT_DECIMALS: usize = 3;

/// Normalized, unrounded probabilities for one bout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub prob_a: f64,
    pub prob_b: f64,
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Score a bout. `prob_a + prob_b` equals 1 up to floating-point error.
pub fn score(features: &BoutFeatures) -> Prediction {
    let mut pa = BASE_PROB;
    let mut pb = BASE_PROB;

    if let Some(nudge) = reach_nudge(features.reach_a, features.reach_b) {
        pa += nudge;
    }

    match younger(features.age_a, features.age_b) {
        Some(Fighter::A) => pa += AGE_BONUS,
        Some(Fighter::B) => pb += AGE_BONUS,
        None => {}
    }

    let s = pa + pb;
    Prediction {
        prob_a: pa / s,
        prob_b: pb / s,
    }
}

/// Score a bout and shape the response, rounding both probabilities.
pub fn predict(features: BoutFeatures) -> PredictionResult {
    let p = score(&features);
    PredictionResult {
        fighter_a: features.fighter_a,
        fighter_b: features.fighter_b,
        prob_a: round_to(p.prob_a, OUTPUT_DECIMALS),
        prob_b: round_to(p.prob_b, OUTPUT_DECIMALS),
        model: MODEL_ID.to_string(),
    }
}

// ── Rules ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fighter {
    A,
    B,
}

/// Raw-score nudge for fighter A, or `None` unless both reaches are known.
fn reach_nudge(reach_a: Option<i64>, reach_b: Option<i64>) -> Option<f64> {
    let (a, b) = (reach_a?, reach_b?);
    // Saturate so extreme inputs still land on the cap.
    let diff = a.saturating_sub(b).clamp(-REACH_DIFF_CAP, REACH_DIFF_CAP);
    Some(REACH_WEIGHT * diff as f64)
}

/// The strictly younger fighter, or `None` when either age is unknown or they match.
fn younger(age_a: Option<i64>, age_b: Option<i64>) -> Option<Fighter> {
    let (a, b) = (age_a?, age_b?);
    match a.cmp(&b) {
        std::cmp::Ordering::Less => Some(Fighter::A),
        std::cmp::Ordering::Greater => Some(Fighter::B),
        std::cmp::Ordering::Equal => None,
    }
}

// ── Math utilities ───────────────────────────────────────────────────────────

/// Round to `decimals` places based on the exact decimal value of `x`
/// (fixed-precision formatting, then parse back).
fn round_to(x: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, x).parse().unwrap_or(x)
}

// ── Tests ────────────────────────────────────────────────────────────────────
