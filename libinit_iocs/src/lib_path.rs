use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::constants::TARGET_ARCH;
use super::layout::BundleLayout;

/// Bin/lib directory pair contributed by one module install.
fn module_pair(module_dir: &Path, arch: &str) -> (PathBuf, PathBuf) {
    (
        module_dir.join("bin").join(arch),
        module_dir.join("lib").join(arch),
    )
}

/// Collect the ordered (bin, lib) pairs covering every module in the bundle.
///
/// Base always comes first, then every immediate subdirectory of the support
/// root except base and areaDetector, then every areaDetector module whose
/// name carries the AD prefix. Support and areaDetector sections keep raw
/// directory-listing order: each module contributes exactly one pair, so
/// ordering only varies between unrelated modules. Missing directories are
/// skipped silently since optional modules may simply be absent. Pure
/// function of the layout; repeated calls produce identical output.
pub fn build(layout: &BundleLayout, arch: &str) -> Vec<(PathBuf, PathBuf)> {
    let mut pairs = vec![module_pair(&layout.base_path(), arch)];

    let support_dir = layout.support_path();
    if support_dir.is_dir() {
        if let Ok(entries) = support_dir.read_dir() {
            for entry in entries.flatten() {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().into_owned();
                if path.is_dir() && name != "base" && name != "areaDetector" {
                    pairs.push(module_pair(&path, arch));
                }
            }
        }
    }

    let ad_dir = layout.area_detector_path();
    if ad_dir.is_dir() {
        if let Ok(entries) = ad_dir.read_dir() {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() && entry.file_name().to_string_lossy().starts_with("AD") {
                    pairs.push(module_pair(&path, arch));
                }
            }
        }
    }

    pairs
}

/// Flatten pairs into a single delimiter-joined search path string ending
/// with a reference to the pre-existing path variable, so existing search
/// paths are extended rather than replaced.
pub fn path_string(pairs: &[(PathBuf, PathBuf)], delimiter: &str, closer: &str) -> String {
    let mut out = String::new();
    for (bin_dir, lib_dir) in pairs {
        out.push_str(&bin_dir.to_string_lossy());
        out.push_str(delimiter);
        out.push_str(&lib_dir.to_string_lossy());
        out.push_str(delimiter);
    }
    out.push_str(closer);
    out
}

/// Write the library path script for unix targets.
#[cfg(target_family = "unix")]
pub fn write_path_script(layout: &BundleLayout, ioc_path: &Path) -> Result<(), std::io::Error> {
    let pairs = build(layout, TARGET_ARCH);
    let mut file = File::create(ioc_path.join("ldpath.sh"))?;
    write!(
        file,
        "export LD_LIBRARY_PATH={}",
        path_string(&pairs, ":", "$LD_LIBRARY_PATH")
    )?;
    Ok(())
}

/// Write the library path script for windows targets.
#[cfg(target_family = "windows")]
pub fn write_path_script(layout: &BundleLayout, ioc_path: &Path) -> Result<(), std::io::Error> {
    let pairs = build(layout, TARGET_ARCH);
    let mut file = File::create(ioc_path.join("dllPath.bat"))?;
    writeln!(file, "@ECHO OFF")?;
    write!(
        file,
        "SET \"PATH={}",
        path_string(&pairs, ";", "%PATH%\"")
    )?;
    Ok(())
}
