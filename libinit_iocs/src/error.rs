use std::path::PathBuf;
use thiserror::Error;

use super::status::BatchStatus;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Configuration failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("CONFIGURE is missing the required option {0}")]
    MissingOption(String),
    #[error("CONFIGURE line {0} is not a valid IOC request row: {1}")]
    MalformedRow(usize, String),
    #[error("CONFIGURE option IOC_DIR must not be empty")]
    EmptyIocDir,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Driver install directory {0:?} does not exist")]
    DriverDirMissing(PathBuf),
    #[error("No ioc/iocs directory found under {0:?}")]
    IocsDirMissing(PathBuf),
    #[error("No IOC directory found under {0:?}")]
    IocDirMissing(PathBuf),
    #[error("No architecture directory found under {0:?}")]
    ArchDirMissing(PathBuf),
    #[error("No App executable found in {0:?}")]
    ExecutableMissing(PathBuf),
    #[error("Expected dbd file {0:?} does not exist")]
    DbdMissing(PathBuf),
    #[error("No iocBoot directory for {0} found under {1:?}")]
    BootDirMissing(String, PathBuf),
    #[error("Resolver failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to fetch the IOC template: {0}")]
    FetchFailed(String),
    #[error("Template fetch failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum InstantiateError {
    #[error("An IOC named {0} already exists in the output directory")]
    IocExists(String),
    #[error("Instantiation failed due to template error: {0}")]
    TemplateError(#[from] TemplateError),
    #[error("No startup script matching driver {0} found in the template")]
    StartupScriptMissing(String),
    #[error("Instantiation failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0} is not a supported driver type")]
    UnsupportedDriver(String),
    #[error("Action failed due to resolver error: {0}")]
    ResolveError(#[from] ResolveError),
    #[error("Action failed due to instantiation error: {0}")]
    InstantiateError(#[from] InstantiateError),
    #[error("Action failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Batch failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Batch failed due to send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<BatchStatus>),
    #[error("Batch failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}
