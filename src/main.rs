use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use ogshot::platform::HeadlessPlatform;
use ogshot::{
    viewer, CaptureWorker, Composer, ComposerConfig, GenerateOutcome, LocalFile, ObjectUrlRegistry, RasterEngine,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ogshot", version, about = "Snapshot a composed post into an Open Graph image")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose a post, capture it and save the image
    Generate {
        #[arg(long, default_value = "")]
        title: String,
        /// Post body as HTML
        #[arg(long, default_value = "")]
        content: String,
        /// Image file to include in the post
        #[arg(long)]
        image: Option<PathBuf>,
        /// Directory the image is downloaded into
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        scale: Option<f32>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    /// Print the viewer page for a `/og/<encoded url>` path
    View { path: String },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

#[allow(clippy::too_many_arguments)]
async fn generate(
    title: String,
    content: String,
    image: Option<PathBuf>,
    out: PathBuf,
    config: Option<PathBuf>,
    scale: Option<f32>,
    width: Option<u32>,
    height: Option<u32>,
) -> anyhow::Result<()> {
    let mut cfg = match config {
        Some(path) => ComposerConfig::from_json_file(&path)?,
        None => ComposerConfig::default(),
    };
    if let Some(s) = scale {
        cfg.capture.scale = s;
    }
    if let Some(w) = width {
        cfg.capture.window_width = w;
    }
    if let Some(h) = height {
        cfg.capture.window_height = h;
    }
    cfg.validate()?;

    let registry = ObjectUrlRegistry::new();
    let worker = CaptureWorker::spawn(RasterEngine::new(Arc::new(registry.clone())))?;
    let platform = Arc::new(HeadlessPlatform::new(out));
    let composer = Composer::new(cfg, Arc::new(worker.clone()), platform.clone(), registry);

    composer.set_title(title);
    composer.set_content(content);
    if let Some(path) = image {
        let file = LocalFile::from_path(&path).with_context(|| format!("reading {}", path.display()))?;
        composer.set_image(file)?;
    }

    let outcome = composer.generate().await;
    worker.close().await?;
    match outcome {
        GenerateOutcome::Generated(_) => {
            composer.download()?;
            println!("{}", platform.head().render());
            Ok(())
        }
        GenerateOutcome::Invalid => bail!("nothing to capture: give a title, content or image"),
        GenerateOutcome::Failed(reason) => bail!("capture failed: {}", reason),
        GenerateOutcome::Rejected => bail!("a capture is already running"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Generate { title, content, image, out, config, scale, width, height } => {
            generate(title, content, image, out, config, scale, width, height).await
        }
        Command::View { path } => match viewer::image_url_from_path("/og/", &path) {
            Some(url) => {
                print!("{}", viewer::render_page(&url));
                Ok(())
            }
            None => Err(anyhow::anyhow!("not a viewer route: {}", path)),
        },
    };

    if let Err(e) = result {
        eprintln!("ogshot: {:#}", e);
        std::process::exit(1);
    }
}
