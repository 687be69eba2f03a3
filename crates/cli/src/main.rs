use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use clap::{Args, Parser, Subcommand};
use needle_core::config::{bed_count_from_env_value, data_dir_from_env_value};
use needle_core::scan::{wait_for_dismissal, LineScanner, ScanSession};
use needle_core::views::{HistoryView, HomeView, SavedView};
use needle_core::{
    history, BedDataStore, BedId, BodyRegion, Clock, CoreConfig, IntakeForm, NeedleError,
    NeedleResult, PatientId, Route,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "needle")]
#[command(about = "Acupuncture needle count system CLI")]
struct Cli {
    /// Directory holding persisted bed and history data (overrides NEEDLE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a patient code from standard input and record needles
    Scan {
        #[command(flatten)]
        intake: IntakeArgs,
    },
    /// Record needles for a patient without scanning
    Record {
        /// Patient identifier
        patient_id: String,
        #[command(flatten)]
        intake: IntakeArgs,
    },
    /// Show one bed
    Bed {
        /// Bed number
        bed: String,
    },
    /// Remove needles and free a bed
    Clear {
        /// Bed number
        bed: String,
    },
    /// Show today's treatment records
    History {
        /// Show the whole log instead of today only
        #[arg(long)]
        all: bool,
    },
    /// Show the home menu and bed overview
    Home,
    /// Render a view by route, e.g. `/bed/5` or `/history`
    Open {
        /// Route to open
        route: String,
    },
}

#[derive(Args)]
struct IntakeArgs {
    /// Bed to file the record under
    #[arg(long, default_value = "1")]
    bed: String,
    #[arg(long, default_value_t = 0)]
    head: u32,
    #[arg(long, default_value_t = 0)]
    torso: u32,
    #[arg(long, default_value_t = 0)]
    back: u32,
    #[arg(long, default_value_t = 0)]
    left_upper_limb: u32,
    #[arg(long, default_value_t = 0)]
    left_lower_limb: u32,
    #[arg(long, default_value_t = 0)]
    right_upper_limb: u32,
    #[arg(long, default_value_t = 0)]
    right_lower_limb: u32,
    /// Moxibustion cones
    #[arg(long, default_value_t = 0)]
    moxibustion: u32,
    /// Cupping performed
    #[arg(long)]
    cupping: bool,
    /// Electroacupuncture pairs
    #[arg(long, default_value_t = 0)]
    electroacupuncture: u32,
    /// Free-text remarks
    #[arg(long, default_value = "")]
    remarks: String,
    /// Pause after saving before returning, in milliseconds
    #[arg(long, default_value_t = 0)]
    settle_ms: u64,
}

impl IntakeArgs {
    fn region_counts(&self) -> [(BodyRegion, u32); 7] {
        [
            (BodyRegion::Head, self.head),
            (BodyRegion::Torso, self.torso),
            (BodyRegion::Back, self.back),
            (BodyRegion::LeftUpperLimb, self.left_upper_limb),
            (BodyRegion::LeftLowerLimb, self.left_lower_limb),
            (BodyRegion::RightUpperLimb, self.right_upper_limb),
            (BodyRegion::RightLowerLimb, self.right_lower_limb),
        ]
    }

    fn fill(&self, form: &mut IntakeForm, config: &CoreConfig) -> anyhow::Result<()> {
        for (region, count) in self.region_counts() {
            form.set_count(region, count)?;
        }
        form.set_bed(config.parse_bed(&self.bed)?)?;
        form.set_moxibustion_count(self.moxibustion)?;
        form.set_cupping(self.cupping);
        form.set_electroacupuncture_pairs(self.electroacupuncture)?;
        form.set_remarks(self.remarks.clone());
        Ok(())
    }
}

/// Entry point for the needle count CLI
///
/// # Environment Variables
/// - `NEEDLE_DATA_DIR`: Directory for persisted state (default: "needle_data")
/// - `NEEDLE_BED_COUNT`: Number of beds (default: 20)
/// - `RUST_LOG`: Log filter; logs go to stderr
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("needle=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let data_dir = data_dir_from_env_value(cli.data_dir, std::env::var("NEEDLE_DATA_DIR").ok());
    let bed_count = bed_count_from_env_value(std::env::var("NEEDLE_BED_COUNT").ok())?;
    let config = CoreConfig::new(data_dir, bed_count)?;
    let mut store = BedDataStore::open(&config);

    match cli.command {
        Some(Commands::Scan { intake }) => {
            eprintln!("Scan patient QR code (Ctrl-D to cancel)");
            let stdin = std::io::stdin();
            let mut console = stdin.lock();
            let (decoded, device_lost) = {
                let mut scanner = LineScanner::new(&mut console);
                let mut session = ScanSession::begin(&mut scanner);
                let decoded = session.next_decoded();
                (decoded, session.is_scanning())
            };
            match decoded {
                Some(patient_id) => {
                    println!("Patient: {}", patient_id);
                    record_intake(&mut store, &config, patient_id, &intake)?;
                }
                None => {
                    if device_lost {
                        wait_for_dismissal(&mut console);
                    }
                    println!("Scan cancelled");
                }
            }
        }
        Some(Commands::Record { patient_id, intake }) => {
            let patient_id = PatientId::new(&patient_id).context("invalid patient id")?;
            record_intake(&mut store, &config, patient_id, &intake)?;
        }
        Some(Commands::Bed { bed }) => {
            println!("{}", bed_page(&store, &config, &bed, &Local::now()));
        }
        Some(Commands::Clear { bed }) => {
            let bed = clearable_bed(&store, &config, &bed)?;
            match store.clear_bed_data(bed) {
                Some(record) => {
                    let removed_at = record
                        .removal_timestamp
                        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
                        .unwrap_or_default();
                    println!(
                        "Bed {} cleared; patient {} needles removed at {}",
                        bed, record.patient_id, removed_at
                    );
                }
                None => println!("Bed {} is already empty", bed),
            }
        }
        Some(Commands::History { all }) => {
            if all {
                println!("{}", HistoryView::full_log(store.history(), Local));
            } else {
                let today = history::todays_records(store.history());
                println!("{}", HistoryView::new(today, Local));
            }
        }
        Some(Commands::Home) => {
            println!("{}", HomeView::new(&config, store.beds()));
        }
        Some(Commands::Open { route }) => {
            let route: Route = route.parse()?;
            println!("{}", route.render(&store, &config, &Local::now()));
        }
        None => {
            println!("{}", HomeView::new(&config, store.beds()));
            println!();
            println!("Use 'needle --help' for commands");
        }
    }

    Ok(())
}

/// Renders a bed the same way `open /bed/<n>` does.
fn bed_page<C: Clock>(
    store: &BedDataStore<C>,
    config: &CoreConfig,
    bed: &str,
    now: &DateTime<Local>,
) -> String {
    Route::Bed(bed.parse().ok()).render(store, config, now)
}

/// Parses a bed to clear. Beds beyond the configured count are accepted while they still hold
/// a record.
fn clearable_bed<C: Clock>(
    store: &BedDataStore<C>,
    config: &CoreConfig,
    bed: &str,
) -> NeedleResult<BedId> {
    let bed: BedId = bed.parse()?;
    if !store.is_addressable(config, bed) {
        return Err(NeedleError::UnknownBed {
            bed,
            bed_count: config.bed_count(),
        });
    }
    Ok(bed)
}

fn record_intake(
    store: &mut BedDataStore,
    config: &CoreConfig,
    patient_id: PatientId,
    args: &IntakeArgs,
) -> anyhow::Result<()> {
    let mut form = IntakeForm::new(patient_id, config);
    args.fill(&mut form, config)?;

    let (bed, draft) = form.submit(Utc::now());
    let record = store.update_bed_data(bed, draft);
    println!("{}", SavedView::new(record.bed_id));
    println!("Total needles: {}", record.total);

    if args.settle_ms > 0 {
        std::thread::sleep(Duration::from_millis(args.settle_ms));
    }
    Ok(())
}
