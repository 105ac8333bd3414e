use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "framefit", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the detected opening of a frame as JSON.
    Detect(DetectArgs),
    /// Composite product photos into a frame and write one PNG per photo.
    Compose(ComposeArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Prebuilt frame (`r1`, `r2`) or path to a custom frame image.
    #[arg(long, default_value = "r1")]
    frame: String,

    /// Directory holding the prebuilt `r1.png` / `r2.png`.
    #[arg(long, default_value = ".")]
    frames_dir: PathBuf,

    /// JSON file with detection/compose/export settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DetectArgs {
    #[command(flatten)]
    frame: FrameArgs,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    frame: FrameArgs,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Export mode.
    #[arg(long, value_enum, default_value_t = ModeChoice::Sequential)]
    mode: ModeChoice,

    /// Do not pause between written files.
    #[arg(long)]
    no_throttle: bool,

    /// Product photos, processed in the order given.
    #[arg(required = true)]
    products: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Sequential,
    Individual,
}

impl From<ModeChoice> for framefit::ExportMode {
    fn from(m: ModeChoice) -> Self {
        match m {
            ModeChoice::Sequential => framefit::ExportMode::Sequential,
            ModeChoice::Individual => framefit::ExportMode::Individual,
        }
    }
}

/// Logs upload and processing progress.
struct LogProgress;

impl framefit::SessionObserver for LogProgress {
    fn on_upload_progress(&mut self, p: framefit::Progress) {
        tracing::info!("{} of {} files uploaded", p.current, p.total);
    }

    fn on_processing_progress(&mut self, p: framefit::Progress) {
        tracing::info!("processing image {} of {} ({:.0}%)", p.current, p.total, p.percent());
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Detect(args) => cmd_detect(args),
        Command::Compose(args) => cmd_compose(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<framefit::PipelineConfig> {
    match path {
        Some(p) => Ok(framefit::PipelineConfig::from_path(p)?),
        None => Ok(framefit::PipelineConfig::default()),
    }
}

fn open_session(args: &FrameArgs) -> anyhow::Result<framefit::Session> {
    let mut sess = framefit::Session::new();
    match args.frame.parse::<framefit::FrameId>() {
        Ok(id) if id.is_prebuilt() => {
            let library = framefit::FrameLibrary::load_dir(&args.frames_dir)
                .with_context(|| format!("load frames from '{}'", args.frames_dir.display()))?;
            sess.select_frame(id, &library)?;
        }
        _ => {
            let file = framefit::SourceFile::read(Path::new(&args.frame))?;
            sess.upload_custom_frame(&file)
                .with_context(|| format!("load custom frame '{}'", args.frame))?;
        }
    }
    Ok(sess)
}

fn cmd_detect(args: DetectArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.frame.config.as_deref())?;
    let mut sess = open_session(&args.frame)?;
    let opening = sess
        .opening(&cfg)
        .context("no frame selected")?;
    println!("{}", serde_json::to_string_pretty(&opening)?);
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.frame.config.as_deref())?;
    if args.no_throttle {
        cfg.export = framefit::ExportConfig::unthrottled();
    }
    let mut sess = open_session(&args.frame)?;

    let mut files = Vec::with_capacity(args.products.len());
    for path in &args.products {
        files.push(framefit::SourceFile::read(path)?);
    }
    let upload = sess.upload_products(&files, &mut LogProgress)?;
    for f in &upload.rejected {
        eprintln!("skipped {}: {}", f.name, f.error);
    }

    let mut backend = framefit::create_backend(framefit::BackendKind::Cpu, &cfg.compose);
    let outcome = sess.generate(&cfg, backend.as_mut(), &mut LogProgress);
    for f in &outcome.failures {
        eprintln!("failed {} (#{}): {}", f.source_name, f.index + 1, f.error);
    }
    if outcome.results.is_empty() {
        anyhow::bail!("no composites were produced");
    }

    let mut sink = framefit::DirSink::new(&args.out);
    let report = framefit::export(args.mode.into(), sess.results(), &mut sink, &cfg.export)?;

    eprintln!(
        "wrote {} file(s) to {}",
        report.written.len(),
        sink.dir().display()
    );
    Ok(())
}
