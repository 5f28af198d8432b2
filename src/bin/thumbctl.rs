use clap::{Parser, Subcommand};
use futures::{stream, StreamExt};
use std::path::{Path, PathBuf};
use thumbgen::{
    logger::{self, LogLevel, LoggerConfig},
    BrandConfig, Template, ThumbnailConfig, ThumbnailPipeline,
};

/// Offline thumbnail tooling: rule-based analysis and the brand gradient, no cloud calls.
#[derive(Parser)]
#[command(name = "thumbctl")]
#[command(about = "Render branded 1280x720 thumbnails from titles without calling any AI service")]
#[command(version)]
struct Cli {
    /// Extra font directory (falls back to THUMBGEN_FONT_DIR)
    #[arg(long, global = true, env = "THUMBGEN_FONT_DIR")]
    font_dir: Option<PathBuf>,

    /// Log at debug level, including stage timings
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the same image GET /preview would return
    Preview {
        title: String,
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
    },
    /// Render an explicit template and copy
    Render {
        /// speed, conversion, comparison, feature or trust
        #[arg(short, long)]
        template: String,
        #[arg(long)]
        headline: String,
        #[arg(long, default_value = "")]
        subtext: String,
        #[arg(long, default_value = "")]
        metric: String,
        #[arg(long, default_value = "")]
        metric_label: String,
        #[arg(short, long, default_value = "thumbnail.png")]
        output: PathBuf,
    },
    /// Render one title in all five templates
    Gallery {
        title: String,
        #[arg(long, default_value = "gallery")]
        out_dir: PathBuf,
    },
    /// Preview every non-empty line of a file
    Batch {
        file: PathBuf,
        #[arg(long, default_value = "thumbnails")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
}

/// File-name friendly form of a title: lowercase ASCII words joined by dashes.
fn slug(title: &str) -> String {
    let mut out = String::new();
    for word in title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let separator = usize::from(!out.is_empty());
        if out.len() + separator + word.len() > 48 {
            break;
        }
        if !out.is_empty() {
            out.push('-');
        }
        out.push_str(&word.to_ascii_lowercase());
    }
    if out.is_empty() {
        "untitled".to_string()
    } else {
        out
    }
}

fn write_png(path: &Path, png: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, png)?;
    println!("{} ({} KB)", path.display(), png.len() / 1024);
    Ok(())
}

async fn batch(
    pipeline: &ThumbnailPipeline,
    file: &Path,
    out_dir: &Path,
    concurrency: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let titles: Vec<String> = std::fs::read_to_string(file)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    std::fs::create_dir_all(out_dir)?;

    let results: Vec<_> = stream::iter(titles.into_iter().enumerate())
        .map(|(index, title)| async move {
            let png = pipeline.preview(&title).await;
            (index, title, png)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut failures = 0;
    for (index, title, png) in results {
        match png {
            Ok(png) => {
                let path = out_dir.join(format!("{:03}-{}.png", index + 1, slug(&title)));
                write_png(&path, &png)?;
            }
            Err(e) => {
                failures += 1;
                log::error!("'{}' failed: {}", title, e);
            }
        }
    }
    Ok(failures)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    let mut log_config = LoggerConfig::from_env();
    if cli.verbose {
        log_config = log_config.with_level(LogLevel::Debug);
    }
    logger::init_with_config(log_config)?;

    let brand = BrandConfig::from_env();
    let pipeline = ThumbnailPipeline::local(brand, cli.font_dir.as_deref());

    match cli.command {
        Command::Preview { title, output } => {
            let png = pipeline.preview(&title).await?;
            write_png(&output, &png)?;
        }
        Command::Render {
            template,
            headline,
            subtext,
            metric,
            metric_label,
            output,
        } => {
            let template: Template = template.parse()?;
            let config = ThumbnailConfig::new(template, headline.replace("\\n", "\n"))
                .with_subtext(subtext)
                .with_metric(metric, metric_label);
            let png = pipeline.render_config(&config)?;
            write_png(&output, &png)?;
        }
        Command::Gallery { title, out_dir } => {
            let analysis = pipeline.heuristic_analysis(&title)?;
            log::info!("Heuristic picked '{}' for '{}'", analysis.template, title);
            for template in Template::ALL {
                let mut config = analysis.to_config();
                config.template = template;
                let png = pipeline.render_config(&config)?;
                write_png(&out_dir.join(format!("{}-{}.png", slug(&title), template)), &png)?;
            }
        }
        Command::Batch {
            file,
            out_dir,
            concurrency,
        } => {
            let failures = batch(&pipeline, &file, &out_dir, concurrency).await?;
            if failures > 0 {
                return Err(format!("{} title(s) failed", failures).into());
            }
        }
    }

    Ok(())
}
