use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::layout::BundleLayout;
use super::request::IocRequest;

/// Structure representing the application configuration read from a
/// CONFIGURE file. Holds the fixed option set plus the flat/stacked flag
/// for the binary bundle; immutable for the duration of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub ioc_dir: PathBuf,
    pub top_binary_dir: PathBuf,
    pub prefix: String,
    pub engineer: String,
    pub hostname: String,
    pub ca_address: String,
    pub binaries_flat: bool,
}

impl Default for Configuration {
    /// Generate a new Configuration object. All fields will be empty/invalid
    fn default() -> Self {
        Self {
            ioc_dir: PathBuf::new(),
            top_binary_dir: PathBuf::new(),
            prefix: String::new(),
            engineer: String::new(),
            hostname: String::new(),
            ca_address: String::new(),
            binaries_flat: true,
        }
    }
}

impl Configuration {
    /// Bundle layout described by this configuration.
    pub fn layout(&self) -> BundleLayout {
        BundleLayout::new(&self.top_binary_dir, self.binaries_flat)
    }

    /// Write the configuration back out in CONFIGURE form.
    ///
    /// Comment lines are not preserved; re-parsing the written file yields
    /// an identical configuration.
    pub fn write_configure(&self, path: &Path) -> Result<(), ConfigError> {
        let mut file = File::create(path)?;
        writeln!(file, "# CONFIGURE file generated by init_iocs")?;
        writeln!(file, "IOC_DIR={}", self.ioc_dir.to_string_lossy())?;
        writeln!(file, "TOP_BINARY_DIR={}", self.top_binary_dir.to_string_lossy())?;
        writeln!(
            file,
            "BINARIES_FLAT={}",
            if self.binaries_flat { "YES" } else { "NO" }
        )?;
        writeln!(file, "PREFIX={}", self.prefix)?;
        writeln!(file, "ENGINEER={}", self.engineer)?;
        writeln!(file, "HOSTNAME={}", self.hostname)?;
        writeln!(file, "CA_ADDRESS={}", self.ca_address)?;
        writeln!(file, "#")?;
        writeln!(
            file,
            "# IOC Type       IOC Name       asyn Port      telnet Port    connection"
        )?;
        Ok(())
    }
}

/// Parsed contents of a CONFIGURE file: the option mapping plus the ordered
/// IOC request rows.
#[derive(Debug)]
pub struct ConfigureFile {
    pub configuration: Configuration,
    pub requests: Vec<IocRequest>,
}

/// Read and parse a CONFIGURE file.
///
/// Returns a ConfigureFile if successful. Missing required options and
/// malformed request rows are reported here, before anything touches the
/// filesystem.
pub fn read_configure(path: &Path) -> Result<ConfigureFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::BadFilePath(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    parse_configure(&contents)
}

/// Parse CONFIGURE text into the option mapping and the IOC request rows.
///
/// Comment lines begin with '#'. KEY=VALUE lines populate the option
/// mapping. A BINARIES_FLAT line clears the flat flag only when its value
/// contains NO; absence or any other value leaves the bundle flat (a
/// compatibility quirk, kept on purpose). Every other non-empty line is a
/// whitespace-delimited request row with the sequence counter assigned in
/// input order, starting at 1.
pub fn parse_configure(contents: &str) -> Result<ConfigureFile, ConfigError> {
    let mut options: Vec<(String, String)> = Vec::new();
    let mut requests: Vec<IocRequest> = Vec::new();
    let mut binaries_flat = true;
    let mut sequence: u32 = 1;

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.contains("BINARIES_FLAT") {
            if line.contains("NO") {
                binaries_flat = false;
            }
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            options.push((key.trim().to_string(), value.trim().to_string()));
            continue;
        }
        // Tabs and repeated spaces collapse before the row is split
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(ConfigError::MalformedRow(index + 1, raw.to_string()));
        }
        let prefix = lookup(&options, "PREFIX").unwrap_or("");
        requests.push(IocRequest::new(
            fields[0], fields[1], prefix, fields[2], fields[3], fields[4], sequence,
        ));
        sequence += 1;
    }

    let configuration = Configuration {
        ioc_dir: PathBuf::from(require(&options, "IOC_DIR")?),
        top_binary_dir: PathBuf::from(require(&options, "TOP_BINARY_DIR")?),
        prefix: require(&options, "PREFIX")?.to_string(),
        engineer: require(&options, "ENGINEER")?.to_string(),
        hostname: require(&options, "HOSTNAME")?.to_string(),
        ca_address: require(&options, "CA_ADDRESS")?.to_string(),
        binaries_flat,
    };

    Ok(ConfigureFile {
        configuration,
        requests,
    })
}

fn lookup<'a>(options: &'a [(String, String)], key: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn require<'a>(options: &'a [(String, String)], key: &str) -> Result<&'a str, ConfigError> {
    lookup(options, key).ok_or_else(|| ConfigError::MissingOption(key.to_string()))
}
