use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use genlink::bootstrap::LinkError;
use genlink::callsite::CallError;
use genlink::config::NamingConfig;
use genlink::diag::Diagnostic;
use genlink::manifest::LinkManifest;
use genlink::naming::NameAllocator;
use genlink::unit::{self, LoadedUnit, UnitError};

#[derive(Parser, Debug)]
#[command(
    name = "genlink",
    version,
    about = "Names generated code units and links their indirect call sites"
)]
struct Cli {
    /// Naming config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log allocation and linkage at debug level
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Allocate generated unit names
    Name {
        /// Base name of the unit
        base: String,

        /// Disambiguating suffix (default: current UTC second)
        #[arg(long)]
        suffix: Option<String>,

        /// Number of names to allocate
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },
    /// Load a link manifest and execute every call site in order
    Link {
        /// Link manifest (JSON)
        manifest: PathBuf,
    },
    /// Print the textual dump of a manifest's unit
    Dump {
        /// Link manifest (JSON)
        manifest: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "genlink=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report(err: &dyn std::error::Error) {
    eprintln!("genlink: {}", Diagnostic::from_error(err));
}

fn load_names(config: Option<&Path>) -> Result<NameAllocator, ExitCode> {
    let names = match config {
        Some(path) => NamingConfig::load(path).and_then(NameAllocator::with_config),
        None => Ok(NameAllocator::new()),
    };
    names.map_err(|e| {
        report(&e);
        ExitCode::from(2)
    })
}

fn load_manifest(path: &Path) -> Result<LinkManifest, ExitCode> {
    LinkManifest::load(path).map_err(|e| {
        report(&e);
        ExitCode::from(2)
    })
}

fn link_hint(err: &UnitError) -> Option<&'static str> {
    match err {
        UnitError::Call {
            error: CallError::Link(LinkError::Configuration { .. }),
            ..
        } => Some("load the unit through a loader that carries its binding registry"),
        UnitError::Call {
            error: CallError::Link(LinkError::BindingNotFound { .. }),
            ..
        } => Some("the generator emitted a binding id the registry does not contain"),
        _ => None,
    }
}

fn run(cli: Cli) -> Result<(), ExitCode> {
    let names = load_names(cli.config.as_deref())?;

    match cli.command {
        Command::Name {
            base,
            suffix,
            count,
        } => {
            for _ in 0..count {
                println!("{}", names.allocate(&base, suffix.as_deref()));
            }
            Ok(())
        }
        Command::Dump { manifest } => {
            let plan = load_manifest(&manifest)?.build(&names).map_err(|e| {
                report(&e);
                ExitCode::from(2)
            })?;
            print!("{}", unit::dump(&plan.unit));
            Ok(())
        }
        Command::Link { manifest } => {
            let plan = load_manifest(&manifest)?.build(&names).map_err(|e| {
                report(&e);
                ExitCode::from(2)
            })?;

            println!("unit {}", plan.unit.name);
            println!(
                "registry {} binding(s), fingerprint {}",
                plan.registry.len(),
                plan.registry.fingerprint_hex()
            );

            let loaded = LoadedUnit::load(plan.unit, plan.registry);
            let mut failed = false;
            for (index, args) in plan.args.iter().enumerate() {
                let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
                let site_name = loaded
                    .call_site(index)
                    .map(|s| s.name().to_string())
                    .unwrap_or_default();
                match loaded.call(index, args) {
                    Ok(value) => {
                        println!("#{} {}({}) = {}", index, site_name, rendered.join(", "), value)
                    }
                    Err(e) => {
                        failed = true;
                        let mut diag = Diagnostic::from_error(&e);
                        if let Some(hint) = link_hint(&e) {
                            diag = diag.with_hint(hint);
                        }
                        eprintln!("genlink: {}", diag);
                    }
                }
            }
            tracing::debug!(states = ?loaded.call_site_states(), "link finished");

            if failed {
                Err(ExitCode::from(1))
            } else {
                Ok(())
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}
