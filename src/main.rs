use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use guidenav::ThemeArg;
use guidenav::core::Site;
use guidenav::core::config::{load_config, resolve};
use guidenav::core::guides::url_for;
use guidenav::core::storage::{FileStorage, MemoryStorage, Storage};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "guidenav", about = "Terminal browser for the Claude God guide site")]
struct Args {
    /// Route to open first, e.g. /plugins
    #[arg(short, long)]
    route: Option<String>,

    /// Force a theme (also replaces the stored one)
    #[arg(short, long, value_enum)]
    theme: Option<ThemeArg>,

    /// Config file to use instead of ~/.guidenav/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// State file to use instead of ~/.guidenav/state.json
    #[arg(long)]
    state: Option<PathBuf>,

    /// Keep preferences in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Load the start page, print the interaction state as JSON and exit
    #[arg(long)]
    dump_state: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to guidenav.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("guidenav.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("guidenav: {e}");
            return ExitCode::FAILURE;
        }
    };
    let config = resolve(&file_config, args.route.as_deref(), args.theme.map(Into::into));

    let storage: Box<dyn Storage> = match args.state.or_else(FileStorage::default_path) {
        Some(path) if !args.ephemeral => Box::new(FileStorage::open(path)),
        _ => Box::new(MemoryStorage::new()),
    };

    log::info!(
        "Guidenav starting up at {} (base {})",
        config.start_route,
        config.base_path
    );

    if args.dump_state {
        let mut site = Site::new(&config, storage);
        site.visit(&url_for(&config.start_route, &config.base_path));
        return match serde_json::to_string_pretty(&site.snapshot()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("guidenav: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match guidenav::tui::run(config, storage) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("guidenav: {e}");
            ExitCode::FAILURE
        }
    }
}
