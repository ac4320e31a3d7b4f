use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::config::Configuration;
use super::constants::{KERNEL_PATH_LIMIT, TARGET_ARCH};
use super::error::InstantiateError;
use super::layout::BundleLayout;
use super::request::IocRequest;
use super::resolver::ResolvedIoc;
use super::template::TemplateSource;

/// How a rewrite rule recognizes a line.
enum Matcher {
    Contains(&'static str),
    Prefix(&'static str),
}

/// One line-rewrite rule for a control file.
///
/// The first rule whose matcher hits a line (and whose exclusion token, if
/// any, does not) produces the full replacement line. Lines no rule matches
/// pass through verbatim, so each control file stays an opaque line-oriented
/// template from the IOC runtime's point of view.
struct RewriteRule {
    matcher: Matcher,
    excludes: Option<&'static str>,
    replacement: String,
}

impl RewriteRule {
    fn contains(token: &'static str, replacement: String) -> Self {
        RewriteRule {
            matcher: Matcher::Contains(token),
            excludes: None,
            replacement,
        }
    }

    fn contains_excluding(
        token: &'static str,
        excludes: &'static str,
        replacement: String,
    ) -> Self {
        RewriteRule {
            matcher: Matcher::Contains(token),
            excludes: Some(excludes),
            replacement,
        }
    }

    fn prefix(token: &'static str, replacement: String) -> Self {
        RewriteRule {
            matcher: Matcher::Prefix(token),
            excludes: None,
            replacement,
        }
    }

    fn matches(&self, line: &str) -> bool {
        let hit = match self.matcher {
            Matcher::Contains(token) => line.contains(token),
            Matcher::Prefix(token) => line.starts_with(token),
        };
        hit && self.excludes.map_or(true, |token| !line.contains(token))
    }
}

/// Find the replacement for a line, if any rule recognizes it.
fn apply_rules<'a>(line: &str, rules: &'a [RewriteRule]) -> Option<&'a str> {
    rules
        .iter()
        .find(|rule| rule.matches(line))
        .map(|rule| rule.replacement.as_str())
}

/// Rewrite a control file line-by-line against a rule table.
///
/// The original is preserved under the sibling old_name before the rewrite
/// so a crash mid-write can be recovered by hand. When skip_comments is set,
/// lines starting with '#' always pass through unmatched.
fn rewrite_file(
    dir: &Path,
    name: &str,
    old_name: &str,
    rules: &[RewriteRule],
    skip_comments: bool,
) -> Result<(), InstantiateError> {
    let path = dir.join(name);
    let old_path = dir.join(old_name);
    fs::rename(&path, &old_path)?;

    let reader = BufReader::new(File::open(&old_path)?);
    let mut out = File::create(&path)?;
    for line in reader.lines() {
        let line = line?;
        if skip_comments && line.starts_with('#') {
            writeln!(out, "{line}")?;
            continue;
        }
        match apply_rules(&line, rules) {
            Some(replacement) => writeln!(out, "{replacement}")?,
            None => writeln!(out, "{line}")?,
        }
    }
    Ok(())
}

/// Materializes one IOC directory from the template and the resolved bundle
/// paths.
///
/// Each step is independently idempotent and skipped with a log message when
/// its target file is absent from the template, so template revisions that
/// drop a file do not break generation.
pub struct Instantiator<'a> {
    request: &'a IocRequest,
    resolved: &'a ResolvedIoc,
    layout: &'a BundleLayout,
    configuration: &'a Configuration,
}

impl<'a> Instantiator<'a> {
    pub fn new(
        request: &'a IocRequest,
        resolved: &'a ResolvedIoc,
        layout: &'a BundleLayout,
        configuration: &'a Configuration,
    ) -> Self {
        Instantiator {
            request,
            resolved,
            layout,
            configuration,
        }
    }

    /// Root of the generated IOC directory.
    pub fn ioc_path(&self) -> PathBuf {
        self.configuration.ioc_dir.join(&self.request.name)
    }

    /// Fetch the template and rewrite its control files for this request.
    ///
    /// Fails without writing anything if an IOC of the same name already
    /// exists. A failure partway through leaves the files written so far in
    /// place for inspection; there is no rollback.
    pub fn instantiate(&self, source: &dyn TemplateSource) -> Result<(), InstantiateError> {
        let ioc_path = self.ioc_path();
        if ioc_path.exists() {
            return Err(InstantiateError::IocExists(self.request.name.clone()));
        }
        source.fetch(&ioc_path)?;
        spdlog::info!("IOC template fetched, converting st.cmd");
        self.generate_st_cmd(&ioc_path)?;
        self.update_unique(&ioc_path)?;
        self.update_config(&ioc_path)?;
        self.fix_env_paths(&ioc_path)?;
        self.stage_autosave(&ioc_path)?;
        self.stage_dependency_files(&ioc_path)?;
        Ok(())
    }

    /// Build st.cmd from the template startup script matching this driver.
    ///
    /// The shebang marker line becomes the resolved executable path and the
    /// environment include marker collapses to the canonical `< envPaths`
    /// line. Executable paths longer than the kernel shebang limit force the
    /// two-file split where st.cmd is a trampoline invoking the executable
    /// with st_base.cmd as its argument; windows targets always split since
    /// shebangs do not apply there.
    fn generate_st_cmd(&self, ioc_path: &Path) -> Result<(), InstantiateError> {
        let template_st = ioc_path.join("st.cmd");
        if template_st.exists() {
            fs::remove_file(&template_st)?;
        }

        let startup_dir = ioc_path.join("startupScripts");
        let startup_type = self.request.startup_type();
        let script = sorted_entries(&startup_dir)
            .unwrap_or_default()
            .into_iter()
            .filter(|path| path.is_file())
            .find(|path| name_lower(path).contains(&startup_type))
            .ok_or_else(|| {
                InstantiateError::StartupScriptMissing(self.request.driver_type.clone())
            })?;

        let executable = self.resolved.executable.to_string_lossy().into_owned();
        let split_needed = executable.len() > KERNEL_PATH_LIMIT;
        let trampoline = cfg!(target_family = "windows") || split_needed;

        let st_path = ioc_path.join("st.cmd");
        let mut st = if trampoline {
            if split_needed {
                spdlog::warn!(
                    "Path to executable exceeds the shebang limit, generating st.cmd and st_base.cmd"
                );
            }
            let mut launcher = File::create(&st_path)?;
            writeln!(launcher, "{executable} st_base.cmd")?;
            File::create(ioc_path.join("st_base.cmd"))?
        } else {
            File::create(&st_path)?
        };

        let reader = BufReader::new(File::open(&script)?);
        for line in reader.lines() {
            let line = line?;
            if line.contains("#!") {
                if !trampoline {
                    writeln!(st, "#!{executable}")?;
                }
            } else if line.contains("envPaths") {
                writeln!(st, "< envPaths")?;
            } else {
                writeln!(st, "{line}")?;
            }
        }
        Ok(())
    }

    /// Rule table for unique.cmd.
    ///
    /// Order matters: the bare PREFIX and IOC tokens are substrings of
    /// CTPREFIX and IOCNAME, so those rules carry exclusions and the more
    /// specific tokens are matched first.
    fn unique_rules(&self) -> Vec<RewriteRule> {
        let camera_prefix = self
            .request
            .environment
            .get("PREFIX")
            .map(str::to_string)
            .unwrap_or_else(|| self.request.camera_prefix());
        vec![
            RewriteRule::contains(
                "SUPPORT_DIR",
                format!(
                    "epicsEnvSet(\"SUPPORT_DIR\", \"{}\")",
                    self.layout.support_path().to_string_lossy()
                ),
            ),
            RewriteRule::contains(
                "ENGINEER",
                format!("epicsEnvSet(\"ENGINEER\", \"{}\")", self.configuration.engineer),
            ),
            RewriteRule::contains(
                "CAM-CONNECT",
                format!("epicsEnvSet(\"CAM-CONNECT\", \"{}\")", self.request.connection),
            ),
            RewriteRule::contains(
                "HOSTNAME",
                format!("epicsEnvSet(\"HOSTNAME\", \"{}\")", self.configuration.hostname),
            ),
            RewriteRule::contains_excluding(
                "PREFIX",
                "CTPREFIX",
                format!("epicsEnvSet(\"PREFIX\", \"{camera_prefix}\")"),
            ),
            RewriteRule::contains(
                "CTPREFIX",
                format!("epicsEnvSet(\"CTPREFIX\", \"{camera_prefix}\")"),
            ),
            RewriteRule::contains(
                "IOCNAME",
                format!("epicsEnvSet(\"IOCNAME\", \"{}\")", self.request.name),
            ),
            RewriteRule::contains(
                "EPICS_CA_ADDR_LIST",
                format!(
                    "epicsEnvSet(\"EPICS_CA_ADDR_LIST\", \"{}\")",
                    self.configuration.ca_address
                ),
            ),
            RewriteRule::contains_excluding(
                "IOC",
                "IOCNAME",
                format!("epicsEnvSet(\"IOC\", \"ioc{}\")", self.request.driver_type),
            ),
            RewriteRule::contains(
                "PORT",
                format!("epicsEnvSet(\"PORT\", \"{}\")", self.request.asyn_port),
            ),
        ]
    }

    /// Rule table for the procServer config file.
    fn config_rules(&self) -> Vec<RewriteRule> {
        vec![
            RewriteRule::contains("NAME", format!("NAME={}", self.request.name)),
            RewriteRule::contains("PORT", format!("PORT={}", self.request.telnet_port)),
            RewriteRule::contains("HOST", format!("HOST={}", self.configuration.hostname)),
        ]
    }

    /// Rule table for envPaths.
    ///
    /// The architecture declaration always follows the target platform; the
    /// EPICS_BASE line only needs fixing for stacked bundles, where base
    /// lives one level above the support directory.
    fn env_paths_rules(&self) -> Vec<RewriteRule> {
        let mut rules = vec![RewriteRule::prefix(
            "epicsEnvSet(\"ARCH\",",
            format!("epicsEnvSet(\"ARCH\",       \"{TARGET_ARCH}\")"),
        )];
        if !self.layout.is_flat() {
            rules.push(RewriteRule::contains(
                "EPICS_BASE",
                String::from("epicsEnvSet(\"EPICS_BASE\", \"$(SUPPORT)/../base\")"),
            ));
        }
        rules
    }

    fn update_unique(&self, ioc_path: &Path) -> Result<(), InstantiateError> {
        if !ioc_path.join("unique.cmd").exists() {
            spdlog::info!("No unique file found, proceeding to next step");
            return Ok(());
        }
        spdlog::info!("Updating unique file based on configuration");
        rewrite_file(ioc_path, "unique.cmd", "unique_OLD.cmd", &self.unique_rules(), true)
    }

    fn update_config(&self, ioc_path: &Path) -> Result<(), InstantiateError> {
        if !ioc_path.join("config").exists() {
            spdlog::info!("No config file found, moving to next step");
            return Ok(());
        }
        spdlog::info!("Updating config file for procServer connection");
        rewrite_file(ioc_path, "config", "config_OLD", &self.config_rules(), false)
    }

    fn fix_env_paths(&self, ioc_path: &Path) -> Result<(), InstantiateError> {
        if !ioc_path.join("envPaths").exists() {
            return Ok(());
        }
        rewrite_file(ioc_path, "envPaths", "envPaths_OLD", &self.env_paths_rules(), false)
    }

    /// Promote the driver's auto_settings.req from the template's staging
    /// folder, when one is shipped for this driver.
    fn stage_autosave(&self, ioc_path: &Path) -> Result<(), InstantiateError> {
        let staged = ioc_path
            .join("autosaveFiles")
            .join(format!("{}_auto_settings.req", self.request.startup_type()));
        if staged.exists() {
            spdlog::info!("Generating auto_settings.req file for IOC {}", self.request.name);
            fs::rename(staged, ioc_path.join("auto_settings.req"))?;
        } else {
            spdlog::warn!(
                "Could not find a supported auto_settings.req file for IOC {}",
                self.request.name
            );
        }
        Ok(())
    }

    /// Promote dependency/substitution files staged for this driver into the
    /// IOC root, stripping the module-name prefix and filling in macros.
    fn stage_dependency_files(&self, ioc_path: &Path) -> Result<(), InstantiateError> {
        // The template's staging folder keeps its historical spelling
        let dep_dir = ioc_path.join("dependancyFiles");
        if !dep_dir.is_dir() {
            return Ok(());
        }
        let startup_type = self.request.startup_type();
        for staged in sorted_entries(&dep_dir)? {
            let name = name_of(&staged);
            if !name.to_lowercase().starts_with(&startup_type) {
                continue;
            }
            spdlog::info!(
                "Copying dependency file {} for {}",
                name,
                self.request.driver_type
            );
            let stripped = name
                .split_once('_')
                .map(|(_, rest)| rest)
                .unwrap_or(name.as_str());
            let dest = ioc_path.join(stripped);
            fs::rename(&staged, &dest)?;
            self.fix_macros(&dest)?;
        }
        Ok(())
    }

    /// Replace $(PREFIX) and $(PORT) placeholders with this request's values.
    fn fix_macros(&self, path: &Path) -> Result<(), InstantiateError> {
        let contents = fs::read_to_string(path)?
            .replace("$(PREFIX)", &self.request.prefix)
            .replace("$(PORT)", &self.request.asyn_port);
        fs::write(path, contents)?;
        Ok(())
    }

    /// Run the template's cleanup script and mark st.cmd executable.
    ///
    /// A missing script or a non-zero exit is reported, never fatal.
    pub fn cleanup(&self) -> Result<(), InstantiateError> {
        let ioc_path = self.ioc_path();
        match run_cleanup_script(&ioc_path)? {
            Some(status) if !status.success() => {
                spdlog::warn!(
                    "Cleanup script for {} exited with {}",
                    self.request.name,
                    status
                );
            }
            Some(_) => {}
            None => {
                spdlog::warn!("No cleanup script found, using outdated version of IOC template");
            }
        }
        let st_path = ioc_path.join("st.cmd");
        if st_path.exists() {
            mark_executable(&st_path)?;
        }
        Ok(())
    }
}

/// Run the cleanup script shipped with the template, if present.
#[cfg(target_family = "unix")]
fn run_cleanup_script(ioc_path: &Path) -> Result<Option<std::process::ExitStatus>, std::io::Error> {
    let script = ioc_path.join("cleanup.sh");
    if !script.exists() {
        return Ok(None);
    }
    spdlog::info!("Performing cleanup for {}", ioc_path.to_string_lossy());
    let status = Command::new("bash")
        .arg(&script)
        .current_dir(ioc_path)
        .status()?;
    Ok(Some(status))
}

/// Run the cleanup script shipped with the template, if present.
#[cfg(target_family = "windows")]
fn run_cleanup_script(ioc_path: &Path) -> Result<Option<std::process::ExitStatus>, std::io::Error> {
    let script = ioc_path.join("cleanup.bat");
    if !script.exists() {
        return Ok(None);
    }
    spdlog::info!("Performing cleanup for {}", ioc_path.to_string_lossy());
    let status = Command::new(&script).current_dir(ioc_path).status()?;
    Ok(Some(status))
}

#[cfg(target_family = "unix")]
fn mark_executable(path: &Path) -> Result<(), std::io::Error> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

/// chmod has no meaning on windows filesystems.
#[cfg(target_family = "windows")]
fn mark_executable(_path: &Path) -> Result<(), std::io::Error> {
    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut entries: Vec<PathBuf> = dir
        .read_dir()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn name_lower(path: &Path) -> String {
    name_of(path).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver;
    use crate::testing;

    struct Fixture {
        _bundle: tempfile::TempDir,
        _output: tempfile::TempDir,
        request: IocRequest,
        resolved: ResolvedIoc,
        layout: BundleLayout,
        configuration: Configuration,
    }

    fn setup() -> Fixture {
        let bundle = tempfile::tempdir().unwrap();
        testing::make_standard_bundle(bundle.path());
        let output = tempfile::tempdir().unwrap();

        let layout = BundleLayout::new(bundle.path(), false);
        let resolved = resolver::resolve("ADSimDetector", &layout).unwrap();
        let request = IocRequest::new("ADSimDetector", "test-sim1", "TEST1:", "TS1", "4040", "NA", 3);
        let configuration = Configuration {
            ioc_dir: output.path().to_path_buf(),
            top_binary_dir: bundle.path().to_path_buf(),
            prefix: String::from("TEST1:"),
            engineer: String::from("J. Wlodek"),
            hostname: String::from("localhost"),
            ca_address: String::from("127.0.0.255"),
            binaries_flat: false,
        };
        Fixture {
            _bundle: bundle,
            _output: output,
            request,
            resolved,
            layout,
            configuration,
        }
    }

    fn instantiate(fixture: &Fixture) -> PathBuf {
        let instantiator = Instantiator::new(
            &fixture.request,
            &fixture.resolved,
            &fixture.layout,
            &fixture.configuration,
        );
        instantiator
            .instantiate(&testing::LocalTemplate::default())
            .unwrap();
        instantiator.ioc_path()
    }

    #[test]
    fn test_existing_ioc_is_a_conflict() {
        let fixture = setup();
        let ioc_path = fixture.configuration.ioc_dir.join("test-sim1");
        fs::create_dir(&ioc_path).unwrap();

        let instantiator = Instantiator::new(
            &fixture.request,
            &fixture.resolved,
            &fixture.layout,
            &fixture.configuration,
        );
        let result = instantiator.instantiate(&testing::LocalTemplate::default());
        assert!(matches!(result, Err(InstantiateError::IocExists(_))));
        // detection only; nothing was written into the pre-existing directory
        assert_eq!(ioc_path.read_dir().unwrap().count(), 0);
    }

    #[test]
    fn test_st_cmd_rewrite() {
        let fixture = setup();
        let ioc_path = instantiate(&fixture);

        let st = fs::read_to_string(ioc_path.join("st.cmd")).unwrap();
        let exe = fixture.resolved.executable.to_string_lossy().into_owned();
        let mut lines = st.lines();
        assert_eq!(lines.next(), Some(format!("#!{exe}").as_str()));
        assert!(st.contains("< envPaths"));
        // lines without a marker come through verbatim
        assert!(st.contains("dbLoadDatabase(\"$(TOP)/dbd/simDetectorApp.dbd\")"));
        assert!(!ioc_path.join("st_base.cmd").exists());
    }

    #[test]
    fn test_st_cmd_split_for_long_paths() {
        let mut fixture = setup();
        let long_segment = "x".repeat(130);
        fixture.resolved.executable = PathBuf::from(format!("/bundle/{long_segment}/simDetectorApp"));

        let ioc_path = instantiate(&fixture);
        let st = fs::read_to_string(ioc_path.join("st.cmd")).unwrap();
        let exe = fixture.resolved.executable.to_string_lossy().into_owned();
        assert_eq!(st, format!("{exe} st_base.cmd\n"));

        let base = fs::read_to_string(ioc_path.join("st_base.cmd")).unwrap();
        assert!(!base.contains("#!"));
        assert!(base.contains("< envPaths"));
    }

    #[test]
    fn test_unique_rules_are_exclusive() {
        let fixture = setup();
        let instantiator = Instantiator::new(
            &fixture.request,
            &fixture.resolved,
            &fixture.layout,
            &fixture.configuration,
        );
        let rules = instantiator.unique_rules();

        assert_eq!(
            apply_rules("epicsEnvSet(\"CTPREFIX\", \"OLD\")", &rules),
            Some("epicsEnvSet(\"CTPREFIX\", \"TEST1:{SimDetector-Cam:3}\")")
        );
        assert_eq!(
            apply_rules("epicsEnvSet(\"PREFIX\", \"OLD\")", &rules),
            Some("epicsEnvSet(\"PREFIX\", \"TEST1:{SimDetector-Cam:3}\")")
        );
        assert_eq!(
            apply_rules("epicsEnvSet(\"IOCNAME\", \"OLD\")", &rules),
            Some("epicsEnvSet(\"IOCNAME\", \"test-sim1\")")
        );
        assert_eq!(
            apply_rules("epicsEnvSet(\"IOC\", \"OLD\")", &rules),
            Some("epicsEnvSet(\"IOC\", \"iocADSimDetector\")")
        );
        assert_eq!(apply_rules("dbLoadRecords(\"db/test.db\")", &rules), None);
    }

    #[test]
    fn test_update_unique() {
        let fixture = setup();
        let ioc_path = instantiate(&fixture);

        let unique = fs::read_to_string(ioc_path.join("unique.cmd")).unwrap();
        assert!(unique.contains("epicsEnvSet(\"PREFIX\", \"TEST1:{SimDetector-Cam:3}\")"));
        assert!(unique.contains("epicsEnvSet(\"CTPREFIX\", \"TEST1:{SimDetector-Cam:3}\")"));
        assert!(unique.contains("epicsEnvSet(\"ENGINEER\", \"J. Wlodek\")"));
        assert!(unique.contains("epicsEnvSet(\"CAM-CONNECT\", \"NA\")"));
        assert!(unique.contains("epicsEnvSet(\"HOSTNAME\", \"localhost\")"));
        assert!(unique.contains("epicsEnvSet(\"IOCNAME\", \"test-sim1\")"));
        assert!(unique.contains("epicsEnvSet(\"EPICS_CA_ADDR_LIST\", \"127.0.0.255\")"));
        assert!(unique.contains("epicsEnvSet(\"IOC\", \"iocADSimDetector\")"));
        assert!(unique.contains("epicsEnvSet(\"PORT\", \"TS1\")"));
        let support = fixture.layout.support_path();
        assert!(unique.contains(&format!(
            "epicsEnvSet(\"SUPPORT_DIR\", \"{}\")",
            support.to_string_lossy()
        )));
        // comment lines always pass through untouched
        assert!(unique.contains("# unique.cmd shipped with the template"));
        assert!(ioc_path.join("unique_OLD.cmd").exists());
    }

    #[test]
    fn test_update_config() {
        let fixture = setup();
        let ioc_path = instantiate(&fixture);

        let config = fs::read_to_string(ioc_path.join("config")).unwrap();
        assert!(config.contains("NAME=test-sim1"));
        assert!(config.contains("PORT=4040"));
        assert!(config.contains("HOST=localhost"));
        assert!(ioc_path.join("config_OLD").exists());
    }

    #[test]
    fn test_fix_env_paths_stacked() {
        let fixture = setup();
        let ioc_path = instantiate(&fixture);

        let env_paths = fs::read_to_string(ioc_path.join("envPaths")).unwrap();
        assert!(env_paths.contains("epicsEnvSet(\"ARCH\",       \"linux-x86_64\")"));
        assert!(env_paths.contains("epicsEnvSet(\"EPICS_BASE\", \"$(SUPPORT)/../base\")"));
        // untouched lines survive verbatim
        assert!(env_paths.contains("epicsEnvSet(\"TOP\", \".\")"));
    }

    #[test]
    fn test_fix_env_paths_flat_keeps_base_line() {
        let mut fixture = setup();
        // re-point the fixture at a flat bundle
        let flat_bundle = tempfile::tempdir().unwrap();
        testing::make_flat_bundle(flat_bundle.path());
        fixture.layout = BundleLayout::new(flat_bundle.path(), true);
        fixture.resolved = resolver::resolve("ADSimDetector", &fixture.layout).unwrap();

        let ioc_path = instantiate(&fixture);
        let env_paths = fs::read_to_string(ioc_path.join("envPaths")).unwrap();
        assert!(env_paths.contains("epicsEnvSet(\"EPICS_BASE\", \"$(SUPPORT)/base\")"));
    }

    #[test]
    fn test_autosave_and_dependency_files() {
        let fixture = setup();
        let ioc_path = instantiate(&fixture);

        assert!(ioc_path.join("auto_settings.req").exists());
        assert!(!ioc_path
            .join("autosaveFiles")
            .join("simdetector_auto_settings.req")
            .exists());

        let plugins = fs::read_to_string(ioc_path.join("plugins.cmd")).unwrap();
        assert!(plugins.contains("TEST1:"));
        assert!(plugins.contains("TS1"));
        assert!(!plugins.contains("$(PREFIX)"));
        assert!(!plugins.contains("$(PORT)"));
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn test_cleanup_runs_script_and_marks_executable() {
        use std::os::unix::fs::PermissionsExt;

        let fixture = setup();
        let ioc_path = instantiate(&fixture);
        assert!(ioc_path.join("startupScripts").exists());

        let instantiator = Instantiator::new(
            &fixture.request,
            &fixture.resolved,
            &fixture.layout,
            &fixture.configuration,
        );
        instantiator.cleanup().unwrap();

        // the fixture cleanup.sh removes the staging folders
        assert!(!ioc_path.join("startupScripts").exists());
        let mode = fs::metadata(ioc_path.join("st.cmd")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
