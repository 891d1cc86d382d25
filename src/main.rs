use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use cargen::config::{DEFAULT_CONFIG_FILE, ToolConfig};
use cargen::dataset::JsonSaveCodec;
use cargen::error::{ExitStatus, ToolError};
use cargen::import_cmd::{ExportRequest, ImportRequest, export, import};
use cargen::merge::MergeOptions;
use cargen::merge_cmd::{MergeRequest, MergeTool};
use cargen::model::{FormatRevision, Game};
use cargen::telemetry;

/// Car generator tools for GTA III and Vice City savedata
///
/// Merge parked-car spawn points from several saves into one, or move them
/// between a save and a JSON document.
///
/// Settings are read from cargen.toml in the current directory (or the file
/// given with --config); command-line flags take precedence.
#[derive(Parser)]
#[command(name = "cargen")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'cargen <command> --help' for more information on a specific command.")]
struct Cli {
    /// Log every slot that is compared or written
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Game the savedata belongs to [default: gta3]
    #[arg(short, long, global = true)]
    game: Option<Game>,

    /// Car generator field layout [default: colors]
    #[arg(long, global = true)]
    revision: Option<FormatRevision>,

    /// Configuration file [default: cargen.toml]
    #[arg(long, global = true, value_name = "PATH", env = "CARGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for the random replacement order (reproducible runs)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge car generators from one or more source saves into a target save
    ///
    /// Every source slot that differs from the target's slot at the same
    /// index becomes a candidate. Candidates fill target slots in the order
    /// given by the priority list (or a random order). A candidate that lands
    /// within the collision radius of an occupied slot aborts the merge and
    /// nothing is written.
    Merge {
        /// Save to merge into
        target: PathBuf,

        /// Saves to take car generators from
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Write the result here instead of over the target
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// CSV of "priority,index" lines choosing which target slots to replace
        #[arg(short, long, value_name = "FILE")]
        priority_list: Option<PathBuf>,

        /// Collision radius in world units (0 disables the check)
        #[arg(short, long)]
        radius: Option<f32>,

        /// New in-game title for the merged save
        #[arg(short, long)]
        title: Option<String>,

        /// Discard every replacement if the merge hits a collision
        #[arg(long)]
        atomic: bool,
    },

    /// Import car generators from a JSON document into a save
    Import {
        savedata: PathBuf,
        json: PathBuf,

        /// Write the result here instead of over the save
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// New in-game title for the save
        #[arg(short, long)]
        title: Option<String>,

        /// Replace the whole block instead of overwriting non-empty slots
        #[arg(long)]
        replace: bool,
    },

    /// Export the car generators of a save to a JSON document
    Export {
        savedata: PathBuf,
        json: PathBuf,

        /// Write the document here instead of to JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Order records by distance from the world origin, empty slots last
        #[arg(long)]
        sort_by_distance: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitStatus::Success.into(),
        Err(e) => {
            // Collisions are logged by the engine.
            if !matches!(e, ToolError::Collision(_)) {
                tracing::error!("{e}");
            }
            let status = e.exit_status();
            tracing::debug!(code = status.code(), "exiting");
            status.into()
        }
    }
}

fn run(cli: Cli) -> Result<(), ToolError> {
    // Only the implicit cargen.toml may be absent.
    let config = match &cli.config {
        Some(path) => ToolConfig::load_required(path)?,
        None => ToolConfig::load(Path::new(DEFAULT_CONFIG_FILE))?,
    };

    let game = cli.game.unwrap_or(config.game);
    let revision = cli.revision.unwrap_or(config.revision);
    let codec = JsonSaveCodec::new(game, revision);

    match cli.command {
        Commands::Merge {
            target,
            sources,
            output,
            priority_list,
            radius,
            title,
            atomic,
        } => {
            let request = MergeRequest {
                target,
                sources,
                output,
                priority_list: priority_list.or(config.merge.priority_list),
                options: MergeOptions {
                    radius: radius.unwrap_or(config.merge.radius),
                    atomic: atomic || config.merge.atomic,
                    title: title.or(config.merge.title),
                    timestamp: None,
                },
            };
            let tool = MergeTool::initialize(request, codec)?;
            let mut rng = cli
                .seed
                .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
            tool.run(&mut rng)?;
        }
        Commands::Import {
            savedata,
            json,
            output,
            title,
            replace,
        } => {
            let request = ImportRequest {
                savedata,
                json,
                output,
                title,
                replace,
                timestamp: None,
            };
            import(&request, &codec)?;
        }
        Commands::Export {
            savedata,
            json,
            output,
            sort_by_distance,
        } => {
            let request = ExportRequest {
                savedata,
                output,
                json,
                sort_by_distance,
            };
            export(&request, &codec)?;
        }
    }

    Ok(())
}
