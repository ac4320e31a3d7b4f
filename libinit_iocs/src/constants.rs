//! Constants shared across the IOC generation pipeline.

/// areaDetector drivers that init_iocs knows how to generate IOCs for.
pub const SUPPORTED_DRIVERS: [&str; 11] = [
    "ADProsilica",
    "ADUVC",
    "ADPointGrey",
    "ADLambda",
    "ADSimDetector",
    "ADMerlin",
    "ADPerkinElmer",
    "ADPilatus",
    "ADSpinnaker",
    "ADAndor3",
    "ADURL",
];

/// Length of the shared module prefix on areaDetector driver names ("AD").
pub const DRIVER_PREFIX_LEN: usize = 2;

/// Kernel limit on shebang (#!) interpreter paths. Executable paths longer
/// than this force the st.cmd/st_base.cmd split.
pub const KERNEL_PATH_LIMIT: usize = 127;

/// Upstream repository containing the generic IOC template.
pub const TEMPLATE_URL: &str = "https://github.com/epicsNSLS2-deploy/ioc-template";

/// EPICS architecture name for the target platform.
#[cfg(target_family = "unix")]
pub const TARGET_ARCH: &str = "linux-x86_64";

/// EPICS architecture name for the target platform.
#[cfg(target_family = "windows")]
pub const TARGET_ARCH: &str = "windows-x64-static";
