mod cli;
mod console;

use trackforge::{
    config,
    confirm::Interaction,
    pipeline::{Pipeline, SubmissionStatus},
    request::{Attachment, IncomingRequest, Requester},
    site,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use console::ConsoleSurface;
use std::sync::Arc;

/// Capacity of the interaction stream shared by runs.
const INTERACTION_BUFFER: usize = 64;

struct RunArgs {
    title: String,
    description: Option<String>,
    tags: Option<String>,
    audio: String,
    image: String,
    requester: Option<String>,
}

async fn run_request(args: RunArgs, config_path: Option<&std::path::Path>) -> Result<()> {
    let config = Arc::new(config::load_config_or_default(config_path)?);

    let name = args
        .requester
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "console".to_string());
    let requester = Requester::new(name.clone(), name);

    let surface = Arc::new(ConsoleSurface::new());
    let (events_tx, _) = tokio::sync::broadcast::channel::<Interaction>(INTERACTION_BUFFER);

    // Detached: an unanswered stdin read must not keep the process alive
    surface.spawn_answer_reader(requester.id.clone(), events_tx.clone())?;

    let pipeline = Pipeline::from_config(config, surface, events_tx);
    let report = pipeline
        .handle(IncomingRequest {
            requester,
            title: Some(args.title),
            description: args.description,
            tags: args.tags,
            audio: Some(Attachment::new(&args.audio, file_name(&args.audio))),
            image: Some(Attachment::new(&args.image, file_name(&args.image))),
        })
        .await;

    tracing::debug!("Run {} cleanup: {:?}", report.run_id, report.cleanup);

    match report.result {
        Ok(outcome) => {
            if let SubmissionStatus::Failed(reason) = outcome.submission {
                tracing::warn!("Completed without site submission: {}", reason);
            }
            Ok(())
        }
        Err(e) if e.is_cancellation() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Last path segment of a URL, without query or fragment.
fn file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path).to_string()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "trackforge=trace,trackforge_av=trace,reqwest=debug".to_string()
        } else {
            "trackforge=info,trackforge_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Run {
            title,
            description,
            tags,
            audio,
            image,
            requester,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_request(
                RunArgs {
                    title,
                    description,
                    tags,
                    audio,
                    image,
                    requester,
                },
                cli.config.as_deref(),
            ))
        }
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("trackforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::GenerateSecret => generate_secret(),
    }
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = trackforge_av::check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. ffmpeg is required when the video target is enabled.");
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Scratch dir: {}", config.scratch.dir.display());
    println!("  Confirmation timeout: {}s", config.confirmation.timeout_secs);
    println!(
        "  Video target '{}': {}",
        config.video.name,
        enabled(config.video.enabled)
    );
    println!(
        "  Audio target '{}': {}",
        config.audio.name,
        enabled(config.audio.enabled)
    );
    println!(
        "  Feed notifications: {}",
        enabled(config.feed.webhook_url.is_some())
    );
    println!("  Site submission: {}", enabled(config.site.is_some()));

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

fn generate_secret() -> Result<()> {
    let secret = site::generate_secret();
    println!("{}", secret);
    Ok(())
}
