use std::path::{Path, PathBuf};

use super::constants::DRIVER_PREFIX_LEN;
use super::error::ResolveError;
use super::layout::BundleLayout;

/// Paths located for one driver within a binary bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIoc {
    /// Full path to the compiled IOC executable.
    pub executable: PathBuf,
    /// Path to the executable's .dbd file, relative to the driver install
    /// directory.
    pub dbd: PathBuf,
    /// Full path to the IOC boot directory shipped with the driver.
    pub ioc_boot: PathBuf,
}

/// Locate the executable, dbd file and iocBoot directory for a driver.
///
/// The bundle's internal naming varies between drivers and build scripts, so
/// every step scans a directory listing for the first entry matching that
/// step's convention. Listings are sorted before matching so the choice is
/// deterministic on filesystems with no fixed listing order. Any missing
/// piece yields the ResolveError variant naming the step that failed; the
/// caller is expected to skip that IOC and keep going.
pub fn resolve(driver_type: &str, layout: &BundleLayout) -> Result<ResolvedIoc, ResolveError> {
    let driver_dir = layout.area_detector_path().join(driver_type);
    if !driver_dir.is_dir() {
        return Err(ResolveError::DriverDirMissing(driver_dir));
    }

    // The folder holding packaged IOCs is named ioc or iocs, case varies
    let iocs_dir = sorted_entries(&driver_dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .find(|path| {
            let name = name_lower(path);
            name == "ioc" || name == "iocs"
        })
        .ok_or_else(|| ResolveError::IocsDirMissing(driver_dir.clone()))?;

    // NOIOC entries are stub packaging folders, not bootable IOCs
    let ioc_dir = sorted_entries(&iocs_dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .find(|path| {
            let name = name_lower(path);
            name.contains("ioc") && !name.contains("noioc")
        })
        .ok_or_else(|| ResolveError::IocDirMissing(iocs_dir.clone()))?;

    let bin_dir = ioc_dir.join("bin");
    if !bin_dir.is_dir() {
        return Err(ResolveError::ArchDirMissing(bin_dir));
    }
    let arch_dirs: Vec<PathBuf> = sorted_entries(&bin_dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect();
    let arch_dir = match arch_dirs.first() {
        Some(dir) => dir,
        None => return Err(ResolveError::ArchDirMissing(bin_dir)),
    };
    if arch_dirs.len() > 1 {
        spdlog::warn!(
            "Multiple architectures found under {}, using {}",
            bin_dir.to_string_lossy(),
            arch_dir.to_string_lossy()
        );
    }

    let executable = sorted_entries(arch_dir)?
        .into_iter()
        .filter(|path| path.is_file())
        .find(|path| name_of(path).contains("App"))
        .ok_or_else(|| ResolveError::ExecutableMissing(arch_dir.clone()))?;

    // The dbd sits next to bin/, named after the executable
    let dbd_name = format!("{}.dbd", name_of(&executable));
    let dbd_file = ioc_dir.join("dbd").join(&dbd_name);
    if !dbd_file.is_file() {
        return Err(ResolveError::DbdMissing(dbd_file));
    }
    let dbd = PathBuf::from(name_of(&iocs_dir))
        .join(name_of(&ioc_dir))
        .join("dbd")
        .join(&dbd_name);

    let boot_parent = ioc_dir.join("iocBoot");
    let suffix = driver_type.get(DRIVER_PREFIX_LEN..).unwrap_or(driver_type);
    let wanted = format!("ioc{}", suffix.to_lowercase());
    if !boot_parent.is_dir() {
        return Err(ResolveError::BootDirMissing(
            driver_type.to_string(),
            boot_parent,
        ));
    }
    let ioc_boot = sorted_entries(&boot_parent)?
        .into_iter()
        .filter(|path| path.is_dir())
        .find(|path| name_lower(path) == wanted)
        .ok_or_else(|| ResolveError::BootDirMissing(driver_type.to_string(), boot_parent))?;

    Ok(ResolvedIoc {
        executable,
        dbd,
        ioc_boot,
    })
}

/// List a directory's entries sorted by path name.
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
