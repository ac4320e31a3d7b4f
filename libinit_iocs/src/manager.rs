use std::sync::mpsc::Sender;

use super::config::Configuration;
use super::constants::SUPPORTED_DRIVERS;
use super::error::{ActionError, BatchError, ConfigError};
use super::instantiator::Instantiator;
use super::layout::BundleLayout;
use super::lib_path;
use super::request::IocRequest;
use super::resolver::{self, ResolvedIoc};
use super::status::{BatchStatus, IocOutcome, IocState};
use super::template::TemplateSource;

/// Ensure the IOC output directory exists before the batch starts.
///
/// An empty IOC_DIR is a configuration error; nothing on disk has been
/// touched at that point.
pub fn initialize_ioc_directory(configuration: &Configuration) -> Result<(), ConfigError> {
    if configuration.ioc_dir.as_os_str().is_empty() {
        return Err(ConfigError::EmptyIocDir);
    }
    if configuration.ioc_dir.is_dir() {
        spdlog::info!("IOC directory already exists.");
    } else {
        std::fs::create_dir_all(&configuration.ioc_dir)?;
    }
    Ok(())
}

/// Bind configuration- and bundle-derived values into the request
/// environment, then harvest the epicsEnvSet defaults the driver ships in
/// its iocBoot directory. Harvested values never replace ones already set.
fn bind_environment(
    request: &mut IocRequest,
    configuration: &Configuration,
    layout: &BundleLayout,
    resolved: &ResolvedIoc,
) -> Result<(), std::io::Error> {
    request.environment.set("ENGINEER", &configuration.engineer);
    request.environment.set("HOSTNAME", &configuration.hostname);
    request
        .environment
        .set("EPICS_CA_ADDR_LIST", &configuration.ca_address);
    request
        .environment
        .set("SUPPORT_DIR", &layout.support_path().to_string_lossy());
    request
        .environment
        .set("IOC", &format!("ioc{}", request.driver_type));

    let mut boot_files: Vec<std::path::PathBuf> = resolved
        .ioc_boot
        .read_dir()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    boot_files.sort();
    for file in boot_files {
        if !file.is_file() {
            continue;
        }
        let contents = match std::fs::read_to_string(&file) {
            Ok(contents) => contents,
            Err(_) => continue,
        };
        for line in contents.lines() {
            request.environment.absorb_line(line);
        }
    }
    Ok(())
}

fn fail(request: &IocRequest, error: ActionError) -> IocOutcome {
    IocOutcome {
        name: request.name.clone(),
        driver_type: request.driver_type.clone(),
        state: IocState::Failed,
        error: Some(error),
    }
}

/// Run the full pipeline for one request: supported-driver check, binary
/// resolution, environment binding, instantiation, path script, cleanup.
///
/// Unknown driver types are rejected before resolution is even attempted.
fn execute_request(
    request: &mut IocRequest,
    configuration: &Configuration,
    layout: &BundleLayout,
    source: &dyn TemplateSource,
) -> IocOutcome {
    if !SUPPORTED_DRIVERS.contains(&request.driver_type.as_str()) {
        spdlog::error!("{} is not currently a supported driver!", request.driver_type);
        spdlog::info!("Supported drivers: {}", SUPPORTED_DRIVERS.join(", "));
        return fail(
            request,
            ActionError::UnsupportedDriver(request.driver_type.clone()),
        );
    }

    let resolved = match resolver::resolve(&request.driver_type, layout) {
        Ok(resolved) => resolved,
        Err(error) => {
            spdlog::warn!(
                "Could not identify a compiled IOC binary for {}, skipping",
                request.driver_type
            );
            spdlog::warn!(
                "Make sure the binary is compiled in the expected location and BINARIES_FLAT is correct."
            );
            return fail(request, error.into());
        }
    };
    if let Err(error) = bind_environment(request, configuration, layout, &resolved) {
        return fail(request, error.into());
    }

    // Bound; from here on failures leave already-written files in place
    let instantiator = Instantiator::new(request, &resolved, layout, configuration);
    if let Err(error) = instantiator.instantiate(source) {
        return fail(request, error.into());
    }
    if let Err(error) = lib_path::write_path_script(layout, &instantiator.ioc_path()) {
        return fail(request, error.into());
    }
    if let Err(error) = instantiator.cleanup() {
        return fail(request, error.into());
    }

    IocOutcome {
        name: request.name.clone(),
        driver_type: request.driver_type.clone(),
        state: IocState::Cleaned,
        error: None,
    }
}

/// Run a batch of IOC requests sequentially, in input order.
///
/// Each request runs to completion or failure before the next starts; one
/// request's failure never prevents the rest from being attempted. Progress
/// is reported over the channel after every request for whatever frontend
/// is driving the batch. Returns the per-request outcomes.
pub fn run_batch(
    mut requests: Vec<IocRequest>,
    configuration: &Configuration,
    source: &dyn TemplateSource,
    tx: &Sender<BatchStatus>,
) -> Result<Vec<IocOutcome>, BatchError> {
    initialize_ioc_directory(configuration)?;
    let layout = configuration.layout();
    let total = requests.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, request) in requests.iter_mut().enumerate() {
        spdlog::info!("-------------------------------------------");
        spdlog::info!("Setup process for IOC {}", request.name);
        let outcome = execute_request(request, configuration, &layout, source);
        match &outcome.error {
            Some(error) => spdlog::error!("Setup of IOC {} failed: {}", request.name, error),
            None => spdlog::info!("Finished setting up IOC {}.", request.name),
        }
        tx.send(BatchStatus::new(
            (index + 1) as f32 / total as f32,
            &request.name,
            index + 1,
            total,
        ))?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
