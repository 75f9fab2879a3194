use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::{debug, LevelFilter};
use project_report::logo::LogoSource;
use project_report::model::{ProjectMember, ProjectStatistics};
use project_report::samples;
use project_report::{RenderedReport, ReportGenerator};

/// Renders project analytics reports as PDF files.
///
/// Roboto fonts are embedded when found under `assets/fonts` next to the
/// binary or in the directory named by `PROJECT_REPORT_FONTS_DIR`; otherwise
/// the built-in Helvetica pair is used.
#[derive(Parser)]
#[command(author, version, about = "Project analytics PDF reports")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a report from statistics and roster JSON files.
    Render(RenderArgs),

    /// Render a report for built-in sample data.
    Sample(OutputArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Project statistics JSON.
    #[arg(long)]
    stats: PathBuf,

    /// Project members JSON array.
    #[arg(long)]
    members: Option<PathBuf>,

    /// Member id used when no member holds an owner role.
    #[arg(long)]
    owner_id: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Directory receiving the PDF.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Render the header without a logo.
    #[arg(long, conflicts_with = "logo")]
    no_logo: bool,

    /// SVG file used as the header logo.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Add a PDF outline entry per section.
    #[arg(long)]
    bookmarks: bool,
}

#[derive(Debug)]
struct InputError {
    path: PathBuf,
    source: Box<dyn Error>,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to read {}", self.path.display())
    }
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Sample(output) => run_sample(output),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn run_render(args: RenderArgs) -> Result<(), Box<dyn Error>> {
    let statistics: ProjectStatistics = read_json(&args.stats)?;
    let members: Vec<ProjectMember> = match &args.members {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    debug!(
        "Loaded statistics for '{}' and {} member(s)",
        statistics.project_name,
        members.len()
    );
    write_report(&args.output, &statistics, &members, args.owner_id.as_deref())
}

fn run_sample(output: OutputArgs) -> Result<(), Box<dyn Error>> {
    let statistics = samples::sample_statistics();
    let members = samples::sample_members();
    write_report(&output, &statistics, &members, Some(samples::SAMPLE_OWNER_ID))
}

fn write_report(
    output: &OutputArgs,
    statistics: &ProjectStatistics,
    members: &[ProjectMember],
    owner_id: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let logo = if output.no_logo {
        None
    } else if let Some(path) = &output.logo {
        Some(LogoSource::Svg(read_text(path)?))
    } else {
        Some(LogoSource::Bundled)
    };
    let generator = ReportGenerator::new().with_logo(logo);

    let report = if output.bookmarks {
        render_with_bookmarks(&generator, statistics, members, owner_id)?
    } else {
        generator.render(statistics, members, owner_id)?
    };

    let path = report.save(&output.out_dir)?;
    println!(
        "Generated {} ({} page(s), {} bytes)",
        path.display(),
        report.page_count,
        report.bytes.len()
    );
    Ok(())
}

#[cfg(feature = "bookmarks")]
fn render_with_bookmarks(
    generator: &ReportGenerator,
    statistics: &ProjectStatistics,
    members: &[ProjectMember],
    owner_id: Option<&str>,
) -> Result<RenderedReport, Box<dyn Error>> {
    Ok(generator.render_with_bookmarks(statistics, members, owner_id)?)
}

#[cfg(not(feature = "bookmarks"))]
fn render_with_bookmarks(
    _generator: &ReportGenerator,
    _statistics: &ProjectStatistics,
    _members: &[ProjectMember],
    _owner_id: Option<&str>,
) -> Result<RenderedReport, Box<dyn Error>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Enable the `bookmarks` feature to render bookmarked output",
    )
    .into())
}

fn read_text(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|err| InputError {
        path: path.to_path_buf(),
        source: Box::new(err),
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|err| InputError {
        path: path.to_path_buf(),
        source: Box::new(err),
    })
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
