use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[cfg(feature = "pdf")]
use std::fs::File;
#[cfg(feature = "pdf")]
use std::io::BufWriter;
#[cfg(feature = "pdf")]
use std::path::Path;

#[cfg(feature = "pdf")]
use anyhow::Context;
#[cfg(feature = "pdf")]
use log::{info, warn};
#[cfg(feature = "pdf")]
use simplelog::{Config, LevelFilter, WriteLogger};

#[cfg(feature = "pdf")]
use pdfpager::recent::RecentStore;
#[cfg(feature = "pdf")]
use pdfpager::renderer::{DocumentSource, RasterImage};
#[cfg(feature = "pdf")]
use pdfpager::service::RenderService;
#[cfg(feature = "pdf")]
use pdfpager::session::DocumentSession;
#[cfg(feature = "pdf")]
use pdfpager::settings::Settings;
#[cfg(feature = "pdf")]
use pdfpager::viewer::{VisibleRange, page_counter};

#[derive(Parser, Debug)]
#[command(
    name = "pdfpager",
    version,
    about = "Scroll through a PDF's pages with a warm render cache"
)]
struct Args {
    /// PDF file to open; omitted, the last opened document is reopened
    file: Option<PathBuf>,

    /// Directory to dump rendered pages into as PNG files
    #[arg(long)]
    out: Option<PathBuf>,

    /// Override the configured render scale
    #[arg(long)]
    scale: Option<f32>,

    /// First page to show, 1-based
    #[arg(long, default_value_t = 1)]
    from: usize,

    /// Log file location
    #[arg(long, default_value = "pdfpager.log")]
    log_file: PathBuf,
}

#[cfg(not(feature = "pdf"))]
fn main() -> Result<()> {
    let _args = Args::parse();
    anyhow::bail!("pdfpager was built without the `pdf` feature; no renderer backend is available")
}

#[cfg(feature = "pdf")]
fn main() -> Result<()> {
    let args = Args::parse();

    WriteLogger::init(
        LevelFilter::Info,
        Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("creating log file {}", args.log_file.display()))?,
    )?;

    let settings = Settings::load();
    let recent_path = RecentStore::default_path();
    let mut recent =
        RecentStore::load_or_ephemeral(recent_path.as_deref().and_then(Path::to_str));

    let path = match args.file {
        Some(path) => path,
        None => {
            let last = recent
                .last_opened()
                .context("no file given and no previously opened document to fall back to")?;
            info!("Reopening last document: {}", last.identifier);
            PathBuf::from(&last.identifier)
        }
    };

    let scale = args.scale.unwrap_or(settings.render_scale);
    let source = DocumentSource::Path(path.clone());
    let mut service = RenderService::open(move || DocumentSession::open(&source, scale))
        .with_context(|| format!("opening {}", path.display()))?;

    let page_count = service.page_count();
    if let Some(title) = service.title() {
        info!("Opened \"{}\" with {} pages", title, page_count);
    } else {
        info!("Opened {} with {} pages", path.display(), page_count);
    }

    recent.record(&path.display().to_string(), page_count);

    if page_count == 0 {
        println!("{} has no pages", path.display());
        return Ok(());
    }

    let first = args.from.clamp(1, page_count) - 1;
    if first + 1 != args.from {
        warn!("--from {} clamped to {}", args.from, first + 1);
    }

    for index in first..page_count {
        let image = if settings.prefetch {
            service.bind(index)?
        } else {
            service.get(index)?
        };

        if let Some(counter) = page_counter(VisibleRange::single(index), page_count) {
            println!("{counter}");
        }

        if let Some(dir) = &args.out {
            let target = dir.join(format!("page-{:04}.png", index + 1));
            write_png(&target, &image).with_context(|| format!("writing {}", target.display()))?;
        }
    }

    Ok(())
}

#[cfg(feature = "pdf")]
fn write_png(path: &Path, image: &RasterImage) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width, image.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.pixels)?;
    Ok(())
}
