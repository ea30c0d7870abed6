use anyhow::Context;
use clap::{Parser, Subcommand};
use romkit::launch::{EmulatorConfig, Launcher};
use romkit::library::{self, RomFile};
use romkit::scraper::{
    self, Credentials, GameDatabase, ImageSource, ScrapeProgress, Scraper, ScraperOptions,
    ScraperSource,
};
use romkit::store::ConfigStore;
use romkit::systems;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "romkit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root directory holding one sub-directory per system
    #[arg(long, global = true)]
    roms: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// List the supported systems
    Systems,
    /// List the ROMs found for one or all systems
    Scan { system: Option<String> },
    /// Launch a ROM with its emulator
    Launch { system: String, rom: PathBuf },
    /// Fetch metadata and artwork for the library
    Scrape {
        #[arg(long)]
        system: Option<String>,
        #[arg(long, default_value = "ScreenScraper")]
        source: ScraperSource,
        #[arg(long, default_value = "Box 2D")]
        image: ImageSource,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        /// Re-scrape games that already have metadata
        #[arg(long)]
        force: bool,
    },
    /// List the installed libretro cores
    Cores,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let roms_root = cli.roms.unwrap_or_else(romkit::dirs::default_roms_dir);

    match cli.command {
        Commands::Systems => {
            for system in systems::all() {
                println!("{:<14} {:<32} {}", system.id, system.label, system.extensions.join(", "));
            }
            Ok(())
        }
        Commands::Scan { system } => scan(&roms_root, system.as_deref()),
        Commands::Launch { system, rom } => {
            let def = systems::find(&system).with_context(|| format!("Unknown system '{system}'"))?;
            let plan = launcher()?.launch_game(def, &rom)?;
            println!("{} {}", plan.program.display(), plan.args.join(" "));
            Ok(())
        }
        Commands::Scrape {
            system,
            source,
            image,
            username,
            password,
            api_key,
            force,
        } => {
            let options = ScraperOptions {
                source,
                image_source: image,
                credentials: Credentials {
                    username,
                    password,
                    api_key,
                    ..Credentials::default()
                },
                ..ScraperOptions::default()
            };
            scrape(&roms_root, system.as_deref(), options, force)
        }
        Commands::Cores => {
            let launcher = launcher()?;
            let cores = launcher.available_cores()?;
            println!("{} cores in {}", cores.len(), launcher.config().cores_dir.display());
            for core in cores {
                println!("  {core}");
            }
            Ok(())
        }
    }
}

/// The launcher configured by the frontend, if it saved one.
fn launcher() -> anyhow::Result<Launcher> {
    let store = ConfigStore::open_default();
    let config = if store.exists("emulator") {
        store.read_config::<EmulatorConfig>("emulator")?
    } else {
        EmulatorConfig::default()
    };
    Ok(Launcher::new(config))
}

fn collect_roms(roms_root: &Path, system: Option<&str>) -> anyhow::Result<Vec<RomFile>> {
    let libraries = match system {
        Some(id) => {
            let def = systems::find(id).with_context(|| format!("Unknown system '{id}'"))?;
            vec![library::scan_system(def, roms_root)]
        }
        None => library::scan_all(roms_root),
    };
    Ok(libraries.into_iter().flat_map(|l| l.roms).collect())
}

fn scan(roms_root: &Path, system: Option<&str>) -> anyhow::Result<()> {
    let roms = collect_roms(roms_root, system)?;
    for rom in &roms {
        println!("{:<8} {}", rom.system, rom.display_name());
    }
    println!("{} games", roms.len());
    Ok(())
}

fn scrape(
    roms_root: &Path,
    system: Option<&str>,
    options: ScraperOptions,
    force: bool,
) -> anyhow::Result<()> {
    let roms = collect_roms(roms_root, system)?;
    let client = scraper::build_client(&options)?;
    let mut db = GameDatabase::open(romkit::dirs::default_gamedb_path())?;

    let batch = Scraper::new(client, options.delay, romkit::dirs::default_media_dir()).force(force);
    let report = |p: &ScrapeProgress| {
        if let Some(game) = &p.current_game {
            eprintln!("[{}/{}] {} {}", p.current, p.total, p.phase, game);
        }
    };
    let progress = batch.run(&roms, &mut db, report);

    for error in &progress.errors {
        eprintln!("{error}");
    }
    println!(
        "{} scraped, {} failed, {} skipped",
        progress.scraped, progress.failed, progress.skipped
    );
    Ok(())
}
