use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use libinit_iocs::config::{self, Configuration};
use libinit_iocs::manager;
use libinit_iocs::template::GitTemplateSource;

fn make_template_configure(path: &Path) {
    let configuration = Configuration::default();
    configuration
        .write_configure(path)
        .expect("Could not write template CONFIGURE file!");
}

fn main() {
    // Create a cli
    let matches = Command::new("init_iocs_cli")
        .subcommand(Command::new("new").about("Make a template CONFIGURE file"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .default_value("CONFIGURE")
                .help("Path to the CONFIGURE file"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    // Parse the cli
    let config_path = PathBuf::from(
        matches
            .get_one::<String>("config")
            .expect("config has a default"),
    );

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template CONFIGURE at {}...",
            config_path.to_string_lossy()
        );
        make_template_configure(&config_path);
        log::info!("Done.");
        return;
    }

    // Load the configuration and requests
    log::info!("Loading CONFIGURE from {}...", config_path.to_string_lossy());
    let parsed = match config::read_configure(&config_path) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    log::info!("CONFIGURE successfully loaded.");
    log::info!("IOC Dir: {}", parsed.configuration.ioc_dir.to_string_lossy());
    log::info!(
        "Binary Dir: {}",
        parsed.configuration.top_binary_dir.to_string_lossy()
    );
    log::info!("Binaries Flat: {}", parsed.configuration.binaries_flat);
    log::info!("Prefix: {}", parsed.configuration.prefix);
    log::info!("Engineer: {}", parsed.configuration.engineer);
    log::info!("Hostname: {}", parsed.configuration.hostname);
    log::info!("CA Address: {}", parsed.configuration.ca_address);
    log::info!("Requested IOCs: {}", parsed.requests.len());

    // Setup the progress bar
    let pb = pb_manager.add(ProgressBar::new(parsed.requests.len() as u64));
    let (tx, rx) = mpsc::channel();
    let configuration = parsed.configuration;
    let requests = parsed.requests;
    // Spawn the task!
    let handle = std::thread::spawn(move || {
        let source = GitTemplateSource::new();
        manager::run_batch(requests, &configuration, &source, &tx)
    });

    loop {
        std::thread::sleep(std::time::Duration::from_millis(200));
        while let Ok(status) = rx.try_recv() {
            pb.set_position(status.completed as u64);
        }

        if handle.is_finished() {
            match handle.join() {
                Ok(result) => match result {
                    Ok(outcomes) => {
                        let failed = outcomes.iter().filter(|o| !o.success()).count();
                        for outcome in &outcomes {
                            match &outcome.error {
                                Some(error) => {
                                    log::error!("{} ({}): {}", outcome.name, outcome.driver_type, error)
                                }
                                None => log::info!("{} ({}): OK", outcome.name, outcome.driver_type),
                            }
                        }
                        if failed == 0 {
                            log::info!("Successfully generated all {} IOC(s)!", outcomes.len());
                        } else {
                            log::error!(
                                "{} of {} IOC(s) failed; see messages above.",
                                failed,
                                outcomes.len()
                            );
                        }
                    }
                    Err(e) => log::error!("IOC generation failed with error: {e}"),
                },
                Err(_) => log::error!("Failed to join generation task!"),
            }
            break;
        }
    }

    pb.finish();

    log::info!("Done.");
}
