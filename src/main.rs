use clap::{Parser, Subcommand};
use shubhkaman::config::{self, AppConfig, DEFAULT_CONFIG_FILE};
use shubhkaman::controller::Controller;
use shubhkaman::export::PostExporter;
use shubhkaman::generators::{ChatTextGenerator, HttpImageGenerator};
use shubhkaman::output;
use shubhkaman::types::{ImageSourceMode, TextSourceMode, Theme};
use shubhkaman::upload::UploadPolicy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shubhkaman")]
#[command(about = "ShubhkamanAI greeting-card generator")]
#[command(long_about = "\
ShubhkamanAI greeting-card generator

Pick a theme, a background and a quote; export the post as <theme>-post.png.

Themes: morning, night, congratulations

Backgrounds (pick one):
  --template N        bundled template N (1-5) of the theme's list
  --upload FILE       your own JPEG, PNG, GIF, WEBP or SVG (max 5 MiB)
  --image-prompt P    generated by AI from a prompt

Quote (pick one):
  --quote TEXT        written by you
  --quote-prompt P    generated by AI about a topic

AI generation reads API keys from the environment variables named in the
config (SHUBHKAMAN_TEXT_API_KEY and SHUBHKAMAN_IMAGE_API_KEY by default).

Run 'shubhkaman gen-config' to generate a documented shubhkaman.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log filter, e.g. `debug` or `shubhkaman=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the template backgrounds offered for each theme
    Catalog {
        /// Only this theme
        #[arg(long)]
        theme: Option<Theme>,
    },
    /// Check whether a file would be accepted as an upload
    CheckUpload {
        file: PathBuf,
    },
    /// Compose a post and export it
    Compose(ComposeArgs),
    /// Print a stock shubhkaman.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ComposeArgs {
    #[arg(long, default_value_t = Theme::Morning)]
    theme: Theme,

    #[command(flatten)]
    background: BackgroundArgs,

    #[command(flatten)]
    quote: QuoteArgs,

    /// Output directory (overrides export.output_dir)
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Where the background comes from. None means the placeholder.
#[derive(clap::Args)]
#[group(required = false, multiple = false)]
struct BackgroundArgs {
    /// Template position in the theme's list, 1-based
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    template: Option<u16>,

    /// Image file to upload
    #[arg(long, value_name = "FILE")]
    upload: Option<PathBuf>,

    /// Prompt for AI image generation
    #[arg(long, value_name = "PROMPT")]
    image_prompt: Option<String>,
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct QuoteArgs {
    /// Quote text written by you
    #[arg(long, value_name = "TEXT")]
    quote: Option<String>,

    /// Topic for AI quote generation
    #[arg(long, value_name = "TOPIC")]
    quote_prompt: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Command::Catalog { theme } => {
            let themes = match theme {
                Some(theme) => vec![theme],
                None => Theme::ALL.to_vec(),
            };
            output::print_catalog(&themes);
        }
        Command::CheckUpload { file } => {
            let config = config::load_config(&cli.config)?;
            let policy = UploadPolicy::from(&config.upload);
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let result = policy.read(&file).and_then(|upload| policy.accept(upload));
            output::print_upload_report(&name, &result);
            if result.is_err() {
                std::process::exit(1);
            }
        }
        Command::Compose(args) => {
            let config = config::load_config(&cli.config)?;
            let saved = compose(&config, args).await?;
            if saved.is_none() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--log-level` wins over `RUST_LOG`; the default shows warnings only.
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Drive one session: select, generate, finalize, download.
async fn compose(
    config: &AppConfig,
    args: ComposeArgs,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let mut exporter = PostExporter::from_config(config)?;
    if let Some(out) = args.out {
        exporter = exporter.with_output_dir(out);
    }
    let text = ChatTextGenerator::from_config(&config.text)?;
    let images = HttpImageGenerator::from_config(&config.image)?;
    let mut controller = Controller::new(Arc::new(text), Arc::new(images), exporter)
        .with_upload_policy(UploadPolicy::from(&config.upload))
        .with_image_count(config.image.count);

    controller.select_theme(args.theme);

    let mut image_job = None;
    let background = args.background;
    if let Some(n) = background.template {
        controller.set_image_source(ImageSourceMode::Template);
        controller.pick_template(usize::from(n) - 1);
    } else if let Some(path) = background.upload {
        controller.set_image_source(ImageSourceMode::Upload);
        upload_file(&mut controller, &UploadPolicy::from(&config.upload), &path);
    } else if let Some(prompt) = background.image_prompt {
        controller.set_image_source(ImageSourceMode::AiGenerate);
        controller.set_image_prompt(prompt);
        image_job = controller.begin_image_generation();
    }

    let mut quote_job = None;
    if let Some(quote) = args.quote.quote {
        controller.set_text_source(TextSourceMode::Own);
        controller.set_quote(quote);
    } else if let Some(topic) = args.quote.quote_prompt {
        controller.set_text_source(TextSourceMode::AiGenerate);
        controller.set_text_prompt(topic);
        quote_job = controller.begin_quote_generation();
    }

    let (images, quote) = tokio::join!(
        async {
            match image_job {
                Some(job) => Some(job.run().await),
                None => None,
            }
        },
        async {
            match quote_job {
                Some(job) => Some(job.run().await),
                None => None,
            }
        },
    );
    if let Some(result) = images {
        controller.finish_image_generation(result);
    }
    if let Some(result) = quote {
        controller.finish_quote_generation(result);
    }

    output::print_state(controller.state());
    println!();
    let post = controller.generate_post().clone();
    output::print_post(&post);

    let saved = controller.download();
    output::print_download(saved.as_deref(), controller.state().notice());
    Ok(saved)
}

fn upload_file(controller: &mut Controller, policy: &UploadPolicy, path: &Path) {
    let result = policy.read(path).and_then(|file| controller.upload(file));
    if let Err(e) = result {
        println!("Upload rejected: {e}");
    }
}
