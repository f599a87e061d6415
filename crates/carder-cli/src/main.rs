use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "carder", about = "Render card templates to printable PDF sheets", version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to a PDF
    Run {
        /// Template file (TOML)
        template: PathBuf,

        /// Output PDF file
        output: PathBuf,

        /// Text column to use from CSV tables (defaults to the first one)
        #[arg(long, default_value = "")]
        locale: String,

        /// Print the whole card set this many times
        #[arg(long, default_value = "1")]
        repeat: usize,

        /// Output paper size
        #[arg(long, default_value = "a4", value_enum)]
        paper: PaperArg,

        /// Output orientation
        #[arg(long, default_value = "portrait", value_enum)]
        orientation: OrientationArg,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<PaperArg> for carder::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<OrientationArg> for carder::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            template,
            output,
            locale,
            repeat,
            paper,
            orientation,
            stats_only,
        } => {
            let options = carder::RenderOptions {
                locale,
                repeat,
                paper_size: paper.into(),
                orientation: orientation.into(),
            };
            log::debug!("Render options: {:?}", options);

            if stats_only {
                let stats = carder::template_statistics(&template, &options)
                    .await
                    .with_context(|| format!("Failed to resolve {}", template.display()))?;
                print_statistics(&stats);
                return Ok(());
            }

            let stats = carder::render_template(&template, &output, &options)
                .await
                .with_context(|| format!("Failed to render {}", template.display()))?;
            print_statistics(&stats);
            println!("Rendered {} cards → {}", stats.cards, output.display());
        }
    }

    Ok(())
}

fn print_statistics(stats: &carder::RenderStatistics) {
    println!("Card Statistics:");
    println!("  Cards: {}", stats.cards);
    println!("  Repeat: {}", stats.repeat);
    println!(
        "  Slots per page: {} ({} x {})",
        stats.slots_per_page, stats.columns, stats.rows
    );
    println!("  Pages: {}", stats.pages);
}
