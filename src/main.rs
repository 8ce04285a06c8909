//! Salary Predictor - Main Entry Point

use clap::Parser;
use salary_predictor::cli::{
    cmd_estimate, cmd_interactive, cmd_predict, cmd_sample, cmd_serve, cmd_train, Cli, Commands,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salary=info,salary_predictor=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Train {
            data,
            output,
            seed,
            test_size,
            impute,
            models,
        }) => {
            cmd_train(&data, &output, seed, test_size, &impute, models)?;
        }
        Some(Commands::Predict {
            data,
            output,
            impute,
        }) => {
            cmd_predict(&cli.artifacts, &data, &output, &impute)?;
        }
        Some(Commands::Estimate(args)) => {
            cmd_estimate(&cli.artifacts, args)?;
        }
        Some(Commands::Sample { output }) => {
            cmd_sample(&output)?;
        }
        Some(Commands::Serve { port, host, impute }) => {
            cmd_serve(&cli.artifacts, &host, port, &impute).await?;
        }
        None => {
            cmd_interactive(&cli.artifacts)?;
        }
    }

    Ok(())
}
