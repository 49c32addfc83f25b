use std::env;
use std::path::PathBuf;

use huntseed_core::{ScaleConfig, SeedConfig, Secret};
use huntseed_generate::{GenerateOptions, GenerationEngine, RunClock};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut out_dir: Option<PathBuf> = None;
    let mut users: u64 = 100;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => out_dir = args.next().map(PathBuf::from),
            "--users" => {
                users = args.next().ok_or("missing --users value")?.parse()?;
            }
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let mut config = SeedConfig::default();
    config.scale = ScaleConfig {
        total_users: users,
        total_groups: users,
        messages_per_group: 24,
        ..ScaleConfig::default()
    };
    config.auth.jwt_secret = Some(Secret::new("example-secret"));
    if let Some(out_dir) = out_dir {
        config.output.dir = out_dir;
    }

    let engine = GenerationEngine::new(config, GenerateOptions::default());
    let result = engine.run(RunClock::start())?;

    println!("out_dir={}", result.out_dir.display());
    println!("rows={}", result.report.rows_total);
    Ok(())
}
