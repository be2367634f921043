use cardio_guard::error::AppError;
use cardio_guard::monitoring::{
    normalize, EmergencyOutcome, NormalizedSample, RawSample, RuleEngine,
};
use clap::Args;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Heart rate in beats per minute; non-numeric input is treated as missing
    #[arg(long)]
    pub(crate) heart_rate: Option<String>,
    /// Acceleration as `x,y,z` in m/s²; leave an axis empty to mark it missing
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) accel: Option<String>,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    sample: NormalizedSample,
    outcome: EmergencyOutcome,
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let report = evaluate(&args);

    if args.json {
        let rendered = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|err| json!({ "error": err.to_string() }).to_string());
        println!("{rendered}");
        return Ok(());
    }

    println!("Normalized sample");
    println!("- heart rate: {}", render(report.sample.heart_rate));
    println!(
        "- acceleration: x={} y={} z={}",
        render(report.sample.accel_x),
        render(report.sample.accel_y),
        render(report.sample.accel_z)
    );

    match &report.outcome.reason {
        Some(reason) => println!("\nEMERGENCY [{}] {}", report.outcome.rule.label(), reason),
        None => println!("\nNo emergency detected"),
    }

    Ok(())
}

fn evaluate(args: &CheckArgs) -> CheckReport {
    let raw = RawSample {
        heart_rate: args.heart_rate.clone().map(Value::String),
        acceleration: args.accel.as_deref().map(parse_accel),
    };
    let sample = normalize(&raw);
    let outcome = RuleEngine::default().evaluate(&sample);
    CheckReport { sample, outcome }
}

fn parse_accel(raw: &str) -> Value {
    let mut axes = raw.split(',').map(|part| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    });
    json!({
        "x": axes.next().flatten(),
        "y": axes.next().flatten(),
        "z": axes.next().flatten(),
    })
}

fn render(value: Option<f64>) -> String {
    value.map_or_else(|| "missing".to_string(), |number| number.to_string())
}
