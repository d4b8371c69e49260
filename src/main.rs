use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vodprep::sources::remote::RemoteFetcher;
use vodprep::utils;
use vodprep::{Cli, Commands, ConversionPipeline, ConvertOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "vodprep=debug"
    } else {
        "vodprep=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Check for required external tools (non-fatal; they may still appear
    // on PATH by the time a subprocess runs)
    let missing_deps = utils::check_dependencies().await;
    if !missing_deps.is_empty() {
        eprintln!("Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   - {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    match cli.command {
        Commands::Convert { input, output_dir } => {
            let options = ConvertOptions::default()
                .with_output_dir(output_dir)
                .with_quiet(!cli.verbose);

            let pipeline = ConversionPipeline::new(options).with_progress(!cli.quiet);

            tracing::info!("Starting conversion for: {}", input);
            let result = pipeline.convert(&input).await?;

            println!("{} {}", style("Title:").bold(), result.title);
            println!(
                "{} {}",
                style("Audio:").bold(),
                result.audio_path.display()
            );
            if result.actual_duration > 0.0 {
                println!(
                    "{} {}",
                    style("Duration:").bold(),
                    format_duration(result.actual_duration)
                );
            }
            if result.repaired {
                println!("{}", style("(duration mismatch repaired)").yellow());
            }
        }
        Commands::Info { url, json } => {
            utils::validate_remote_reference(&url)?;

            let fetcher = RemoteFetcher::new(&url);
            let info = fetcher.video_info().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{} {}", style("Title:").bold(), info.title);
                println!(
                    "{} {}",
                    style("Duration:").bold(),
                    format_duration(info.duration)
                );
                println!("{} {}", style("Uploader:").bold(), info.uploader);
                println!("{} {}", style("Upload date:").bold(), info.upload_date);
                println!("{} {}", style("Views:").bold(), info.view_count);
                if !info.description.is_empty() {
                    println!("{}\n{}", style("Description:").bold(), info.description);
                }
            }
        }
    }

    Ok(())
}

/// Format duration in human-readable form
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }
}
