use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use rosterlab::report::{render_cell_details, render_matrix, render_roster_list, render_target_lists};
use rosterlab::{App, AppConfig, init_logging};
use rosterlab_core::model::UnitId;
use rosterlab_core::format_cpk_with_grade;

#[derive(Parser, Debug)]
#[command(name = "rosterlab")]
#[command(about = "Grade a roster's cost-per-kill efficiency against target profiles")]
struct Args {
    /// Path to the data directory (default: ~/.rosterlab/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Combat resolution service base URL (overrides config.yaml)
    #[arg(long)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved rosters
    Rosters,
    /// List saved target lists
    Targets,
    /// Compute the unit × target efficiency matrix
    Matrix {
        /// Roster filename (default: last opened)
        #[arg(long)]
        roster: Option<String>,
        /// Target list filename (default: last opened, then `default`)
        #[arg(long)]
        targets: Option<String>,
        /// Targets get +1 to their armor save
        #[arg(long)]
        cover: bool,
        /// Apply melta and rapid fire bonuses
        #[arg(long)]
        half_range: bool,
        /// Also print every weapon result behind this unit's cells
        #[arg(long)]
        unit: Option<String>,
    },
    /// Grade a cost-per-kill value
    Grade { cpk: f64 },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args
        .data_dir
        .unwrap_or_else(rosterlab::platform::NativeStorage::default_path);

    init_logging(&data_dir, &args.log_level)?;

    let mut config = AppConfig::load(&data_dir).wrap_err("Failed to load config.yaml")?;
    if let Some(url) = args.service_url {
        config.service_url = url;
    }
    let timeout = Duration::from_secs(config.request_timeout_secs);

    match args.command {
        Command::Grade { cpk } => {
            println!("{}", format_cpk_with_grade(cpk, true));
        }
        Command::Rosters => {
            let app = App::with_data_dir(data_dir, config);
            print!("{}", render_roster_list(&app.list_rosters()?));
        }
        Command::Targets => {
            let app = App::with_data_dir(data_dir, config);
            print!("{}", render_target_lists(&app.list_target_lists()?));
        }
        Command::Matrix {
            roster,
            targets,
            cover,
            half_range,
            unit,
        } => {
            let mut app = App::with_data_dir(data_dir, config);
            app.restore_session();

            if let Some(filename) = roster {
                app.open_roster(&filename)
                    .wrap_err_with(|| format!("Failed to open roster '{filename}'"))?;
            }
            if let Some(filename) = targets {
                app.open_target_list(&filename)
                    .wrap_err_with(|| format!("Failed to open target list '{filename}'"))?;
            }
            if cover || half_range {
                let assumptions = app.config().assumptions_with(cover, half_range);
                app.set_assumptions(assumptions);
            }

            if app.state().roster().is_empty() {
                return Err(eyre!("No roster loaded; pass --roster <file>"));
            }

            let matrix = app.compute_matrix(timeout)?;
            print!("{}", render_matrix(matrix));

            if let Some(unit) = unit {
                let unit_id = UnitId::new(unit);
                for target in matrix.targets() {
                    print!("{}", render_cell_details(matrix, &unit_id, target));
                }
            }

            app.persist_session()?;
        }
    }

    tracing::info!("Application shutting down");
    Ok(())
}
