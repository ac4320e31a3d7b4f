use std::path::{Path, PathBuf};

/// Describes where compiled modules live within a binary distribution.
///
/// Two conventions exist: a flat bundle keeps base, the support modules and
/// areaDetector directly under the binary root, while a stacked (standard)
/// bundle keeps everything but base under a support/ subdirectory, with the
/// areaDetector drivers nested one level further. Exactly one convention
/// applies per layout; the derived paths are pure functions of the root and
/// the flag, so changing either means constructing a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    binary_root: PathBuf,
    flat: bool,
}

impl BundleLayout {
    pub fn new(binary_root: &Path, flat: bool) -> Self {
        BundleLayout {
            binary_root: binary_root.to_path_buf(),
            flat,
        }
    }

    pub fn binary_root(&self) -> &Path {
        &self.binary_root
    }

    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// Path to EPICS base within the bundle.
    pub fn base_path(&self) -> PathBuf {
        self.binary_root.join("base")
    }

    /// Directory holding the compiled support modules.
    pub fn support_path(&self) -> PathBuf {
        if self.flat {
            self.binary_root.clone()
        } else {
            self.binary_root.join("support")
        }
    }

    /// Directory holding the compiled areaDetector modules.
    pub fn area_detector_path(&self) -> PathBuf {
        self.support_path().join("areaDetector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_paths() {
        let layout = BundleLayout::new(Path::new("./test_bundle_standard"), false);
        assert_eq!(layout.base_path(), PathBuf::from("./test_bundle_standard/base"));
        assert_eq!(
            layout.support_path(),
            PathBuf::from("./test_bundle_standard/support")
        );
        assert_eq!(
            layout.area_detector_path(),
            PathBuf::from("./test_bundle_standard/support/areaDetector")
        );
    }

    #[test]
    fn test_flat_paths() {
        let layout = BundleLayout::new(Path::new("./test_bundle_flat"), true);
        assert_eq!(layout.base_path(), PathBuf::from("./test_bundle_flat/base"));
        assert_eq!(layout.support_path(), PathBuf::from("./test_bundle_flat"));
        assert_eq!(
            layout.area_detector_path(),
            PathBuf::from("./test_bundle_flat/areaDetector")
        );
    }
}
