use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use promgate::cli::{Cli, Commands};
use promgate::config::{StaticConfig, get_config, init_config_from};
use promgate::context::BeanContext;
use promgate::errors::format_startup_error;
use promgate::system::logging::init_logging;

#[actix_web::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}", format_startup_error(&e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Commands::GenerateConfig { output }) = &cli.command {
        return generate_config(output.as_deref());
    }

    init_config_from(&cli.config);
    let config = get_config();

    let _guard = init_logging(&config.logging)?;

    let context = Arc::new(BeanContext::new());

    #[cfg(feature = "server")]
    return promgate::runtime::modes::run_server(config, context).await;

    #[cfg(not(feature = "server"))]
    {
        let _ = (config, context);
        anyhow::bail!("Built without the `server` feature, nothing to run")
    }
}

fn generate_config(output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default()
                .save_to_file(path)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("Failed to write sample config to {}", path))?;
            println!("Sample configuration written to {}", path);
        }
        None => println!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}
