use super::super::domain::NormalizedSample;
use super::config::RuleThresholds;
use super::SeverityRule;

/// Evaluation order. Heart-rate rules precede the fall rule.
pub(crate) const RULE_ORDER: [SeverityRule; 3] = [
    SeverityRule::Bradycardia,
    SeverityRule::Tachycardia,
    SeverityRule::Fall,
];

/// Returns the human-readable reason when `rule` matches the sample.
pub(crate) fn check(
    rule: SeverityRule,
    sample: &NormalizedSample,
    thresholds: &RuleThresholds,
) -> Option<String> {
    match rule {
        SeverityRule::Bradycardia => sample
            .heart_rate
            .filter(|rate| *rate <= thresholds.bradycardia_max_bpm)
            .map(|rate| format!("Low heart rate detected: {}", display_number(rate))),
        SeverityRule::Tachycardia => sample
            .heart_rate
            .filter(|rate| *rate >= thresholds.tachycardia_min_bpm)
            .map(|rate| format!("Very high heart rate detected: {}", display_number(rate))),
        SeverityRule::Fall => {
            let (x, y, z) = sample.acceleration()?;
            let magnitude = (x * x + y * y + z * z).sqrt();
            (magnitude > thresholds.fall_magnitude).then(|| {
                format!(
                    "Possible fall detected. Accel magnitude: {}",
                    two_decimals(magnitude)
                )
            })
        }
        SeverityRule::None => None,
    }
}

/// Two decimals with ties rounded away from zero (`18.125` renders as `18.13`).
pub(crate) fn two_decimals(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded:.2}")
}

/// Shortest decimal form, switching to exponent notation outside `[1e-6, 1e21)`.
pub(crate) fn display_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let rendered = format!("{value:e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => rendered,
    }
}
