use super::constants::DRIVER_PREFIX_LEN;

/// Insertion-ordered mapping of EPICS environment tokens to resolved values.
///
/// Acts as an accumulator while a request moves through the pipeline: `set`
/// overwrites (a later, more specific resolution step wins), `set_if_absent`
/// never replaces an existing value, and nothing ever removes a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpicsEnvironment {
    entries: Vec<(String, String)>,
}

impl EpicsEnvironment {
    pub fn set(&mut self, key: &str, value: &str) {
        for entry in self.entries.iter_mut() {
            if entry.0 == key {
                entry.1 = value.to_string();
                return;
            }
        }
        self.entries.push((key.to_string(), value.to_string()));
    }

    pub fn set_if_absent(&mut self, key: &str, value: &str) {
        if !self.contains(key) {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Absorb an `epicsEnvSet("KEY", "VALUE")` line into the mapping.
    ///
    /// Values already present are kept, so template defaults never clobber
    /// request- or configuration-derived settings. Returns false for lines
    /// that are not an epicsEnvSet call.
    pub fn absorb_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if !trimmed.starts_with("epicsEnvSet(") {
            return false;
        }
        let mut fields = trimmed.split('"');
        let key = match fields.nth(1) {
            Some(k) => k,
            None => return false,
        };
        let value = match fields.nth(1) {
            Some(v) => v,
            None => return false,
        };
        self.set_if_absent(key, value);
        true
    }
}

/// One IOC generation request, parsed from a CONFIGURE table row.
///
/// Owned by the batch orchestrator for its lifetime; the environment is
/// populated incrementally as resolution proceeds and the request is
/// consumed exactly once by the pipeline.
#[derive(Debug, Clone)]
pub struct IocRequest {
    pub driver_type: String,
    pub name: String,
    pub prefix: String,
    pub asyn_port: String,
    pub telnet_port: String,
    pub connection: String,
    pub sequence_number: u32,
    pub environment: EpicsEnvironment,
}

impl IocRequest {
    pub fn new(
        driver_type: &str,
        name: &str,
        prefix: &str,
        asyn_port: &str,
        telnet_port: &str,
        connection: &str,
        sequence_number: u32,
    ) -> Self {
        let mut request = IocRequest {
            driver_type: driver_type.to_string(),
            name: name.to_string(),
            prefix: prefix.to_string(),
            asyn_port: asyn_port.to_string(),
            telnet_port: telnet_port.to_string(),
            connection: connection.to_string(),
            sequence_number,
            environment: EpicsEnvironment::default(),
        };
        let camera_prefix = request.camera_prefix();
        request.environment.set("PREFIX", &camera_prefix);
        request
    }

    /// Driver name without the two-character module prefix, e.g. "SimDetector".
    pub fn driver_suffix(&self) -> &str {
        self.driver_type
            .get(DRIVER_PREFIX_LEN..)
            .unwrap_or(&self.driver_type)
    }

    /// Lower-cased suffix used to match template and bundle file names.
    pub fn startup_type(&self) -> String {
        self.driver_suffix().to_lowercase()
    }

    /// Camera-scoped Channel Access prefix for this request.
    ///
    /// Combines the configured prefix with the driver suffix and sequence
    /// number, e.g. `TEST1:{SimDetector-Cam:3}`.
    pub fn camera_prefix(&self) -> String {
        format!(
            "{}{{{}-Cam:{}}}",
            self.prefix,
            self.driver_suffix(),
            self.sequence_number
        )
    }
}
