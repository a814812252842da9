use anyhow::anyhow;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "HCMD_LOG";

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("cannot initialize logging: {}", e))
}

fn real_main() -> anyhow::Result<i32> {
    init_tracing()?;
    Ok(hcmd::run()?)
}

fn main() -> ExitCode {
    match real_main() {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            hcmd::core::output::print_error(&e.to_string());
            ExitCode::from(1)
        }
    }
}
