use std::env;
use std::path::PathBuf;

use huntseed_core::{FixtureLayout, ScaleConfig};
use huntseed_eval::{VerifyEngine, VerifyOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let mut dir: Option<PathBuf> = None;
    let mut users: u64 = 100;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dir" => dir = args.next().map(PathBuf::from),
            "--users" => {
                users = args.next().ok_or("missing --users value")?.parse()?;
            }
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let dir = dir.ok_or("missing --dir directory")?;
    let layout = FixtureLayout::resolve(&ScaleConfig {
        total_users: users,
        total_groups: users,
        messages_per_group: 24,
        ..ScaleConfig::default()
    })?;

    let options = VerifyOptions {
        strict: false,
        write_violations: true,
        ..VerifyOptions::default()
    };
    let result = VerifyEngine::new(options).run(&layout, &dir)?;

    println!("violations={}", result.metrics.violations_total);
    println!("metrics_path={}", result.metrics_path.display());
    println!("report_path={}", result.report_path.display());
    if let Some(path) = result.violations_path {
        println!("violations_path={}", path.display());
    }
    Ok(())
}
