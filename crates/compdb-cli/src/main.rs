mod settings;

use clap::{ArgAction, Parser};
use compdb_build::{merge, CompileCommands, Config};
use compdb_driver::BuildLogParser;
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use settings::{Flags, Output, Settings};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Crates whose logs `-v` turns up.
const CRATES: &[&str] = &[
    "compdb",
    "compdb_driver",
    "compdb_extract",
    "compdb_build",
    "compdb_shell",
];

#[derive(Parser)]
#[command(name = "compdb")]
#[command(
    author,
    version,
    about = "Generate a compilation database (compile_commands.json) from a build log"
)]
struct Cli {
    /// Build log to parse compilation commands from [default: stdin]
    #[arg(short, long = "parse", value_name = "LOG")]
    parse: Option<PathBuf>,

    /// Output file, `-` for stdout [default: compile_commands.json]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Directory the build started in [default: current directory]
    #[arg(short = 'd', long, value_name = "DIR")]
    build_dir: Option<PathBuf>,

    /// Regular expressions for source files to exclude
    #[arg(short, long, value_name = "REGEX", num_args = 1..)]
    exclude: Vec<String>,

    /// Extra compiler wrapper program names
    #[arg(short, long, value_name = "NAME", num_args = 1..)]
    wrapper: Vec<String>,

    /// Write a `command` string instead of an `arguments` list
    #[arg(short, long)]
    command_style: bool,

    /// Append the compiler's predefined macros to each entry
    #[arg(long)]
    macros: bool,

    /// Replace compiler names with their full path
    #[arg(long)]
    full_path: bool,

    /// Overwrite the output instead of merging into it
    #[arg(short = 'f', long)]
    overwrite: bool,

    /// Keep entries whose source file does not exist
    #[arg(short = 'S', long)]
    no_strict: bool,

    /// Seconds a `$(...)` substitution or macro dump may run before it is killed
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Configuration file [default: compdb.toml in the build directory]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print more (-v shows skipped lines, -vv traces substitutions)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn flags(&self) -> Flags {
        Flags {
            output: self.output.clone(),
            exclude: self.exclude.clone(),
            wrappers: self.wrapper.clone(),
            command_style: self.command_style,
            macros: self.macros,
            full_path: self.full_path,
            overwrite: self.overwrite,
            no_strict: self.no_strict,
            timeout_secs: self.timeout,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let allowlist: Vec<String> = CRATES.iter().map(|c| format!("{c}={level}")).collect();
        EnvFilter::new(format!("warn,{}", allowlist.join(",")))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>, build_dir: &Path) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match Config::discover(build_dir) {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };
    debug!(path = %path.display(), "loading config");
    Config::from_file(&path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to load config {}", path.display()))
}

fn read_log(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read build log {}", path.display())),
        None => {
            let mut log = String::new();
            std::io::stdin()
                .read_to_string(&mut log)
                .into_diagnostic()
                .wrap_err("Failed to read build log from stdin")?;
            Ok(log)
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().into_diagnostic()?;
    let build_dir = match &cli.build_dir {
        Some(dir) => cwd.join(dir),
        None => cwd,
    };
    if !build_dir.is_dir() {
        return Err(miette!("Build directory '{}' does not exist", build_dir.display()));
    }

    let config = load_config(cli.config.as_deref(), &build_dir)?;
    let settings = Settings::resolve(cli.flags(), &config, &build_dir);

    let parser = BuildLogParser::new(settings.parse.clone())?;

    eprintln!(
        "## Processing build commands from {}",
        cli.parse
            .as_ref()
            .map_or_else(|| "std input".to_string(), |p| p.display().to_string())
    );
    let log = read_log(cli.parse.as_deref())?;
    let result = parser.parse(log.lines(), &build_dir);
    info!(count = result.count, skipped = result.skipped, "parsed build log");

    let previous = match (&settings.output, settings.overwrite) {
        (Output::File(path), false) => CompileCommands::load_or_default(path),
        _ => CompileCommands::default(),
    };
    let database = merge(previous, result.into_database(), settings.strict);

    eprintln!(
        "## Writing compilation database with {} entries to {}",
        database.len(),
        settings.output.describe()
    );
    let written = match &settings.output {
        Output::Stdout => database.to_writer(std::io::stdout().lock()),
        Output::File(path) => database.save(path),
    };
    written
        .into_diagnostic()
        .wrap_err("Failed to write compilation database")?;
    eprintln!("## Done.");

    Ok(())
}
