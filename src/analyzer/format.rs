use crate::service::schema::{AnalysisResult, ConceptScore};

pub const HIGH_CONFIDENCE: f64 = 0.75;
pub const MID_CONFIDENCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Mid,
    Low,
}

impl ConfidenceTier {
    /// Thresholds are strict: exactly 0.75 is Mid, exactly 0.5 is Low.
    pub fn from_probability(probability: f64) -> Self {
        if probability > HIGH_CONFIDENCE {
            ConfidenceTier::High
        } else if probability > MID_CONFIDENCE {
            ConfidenceTier::Mid
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Concept identifiers use underscores as word separators; every one of them
/// becomes a space, case untouched.
pub fn display_name(concept: &str) -> String {
    concept.replace('_', " ")
}

/// Probability as tenths of a percent, rounded half away from zero.
///
/// The product is snapped to 1e-6 first so values such as 0.7555, whose binary
/// form sits a hair below the half, still round up.
pub fn percent_tenths(probability: f64) -> i64 {
    if !probability.is_finite() {
        return 0;
    }
    let scaled = ((probability * 1000.0) * 1e6).round() / 1e6;
    scaled.round() as i64
}

/// `0.7555` -> `"75.6%"`.
pub fn format_percent(probability: f64) -> String {
    let tenths = percent_tenths(probability);
    let sign = if tenths < 0 { "-" } else { "" };
    let tenths = tenths.unsigned_abs();
    format!("{sign}{}.{}%", tenths / 10, tenths % 10)
}

/// Whole-percent label for a value-axis tick given as a fraction.
pub fn tick_label(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).round() as i64)
}

/// Value-axis ticks from 0% to 100% in `steps` equal intervals.
pub fn percent_ticks(steps: usize) -> Vec<(f64, String)> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let fraction = i as f64 / steps as f64;
            (fraction, tick_label(fraction))
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartPoint {
    pub label: String,
    /// Bar height in tenths of a percent (0..=1000).
    pub value: u64,
    pub value_text: String,
    pub tier: ConfidenceTier,
}

impl ChartPoint {
    pub fn from_score(score: &ConceptScore) -> Self {
        Self {
            label: display_name(&score.concept),
            value: percent_tenths(score.probability).clamp(0, 1000) as u64,
            value_text: format_percent(score.probability),
            tier: ConfidenceTier::from_probability(score.probability),
        }
    }
}

/// One point per concept, in the order the service returned them.
pub fn chart_points(analysis: &AnalysisResult) -> Vec<ChartPoint> {
    analysis
        .related_concepts
        .iter()
        .map(ChartPoint::from_score)
        .collect()
}
