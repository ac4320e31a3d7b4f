//! # init_iocs
//!
//! init_iocs generates and customizes EPICS IOC startup directories for
//! areaDetector camera drivers. Given a compiled binary bundle and a
//! CONFIGURE file describing the desired IOC instances, it locates the
//! correct IOC executable, dbd file and boot directory for each driver,
//! clones the generic ioc-template repository, and rewrites the template's
//! control files (st.cmd, unique.cmd, config, envPaths) with the
//! device-specific ports, prefixes and paths.
//!
//! ## Binary bundles
//!
//! Two bundle conventions are understood:
//!
//! - **flat**: base, the support modules and areaDetector all sit directly
//!   under the binary top directory.
//! - **stacked** (standard): everything but base lives under `support/`,
//!   with areaDetector drivers nested under `support/areaDetector/`.
//!
//! The CONFIGURE option `BINARIES_FLAT=NO` selects the stacked convention.
//! Any other value, or leaving the option out entirely, keeps the flat
//! default; this mirrors the behavior of earlier deployments so existing
//! CONFIGURE files keep working.
//!
//! ## The CONFIGURE file
//!
//! Line-oriented text. `#` starts a comment, `KEY=VALUE` lines fill the
//! option mapping (IOC_DIR, TOP_BINARY_DIR, PREFIX, ENGINEER, HOSTNAME,
//! CA_ADDRESS), and any other non-empty line is a whitespace-delimited IOC
//! request row:
//!
//! ```text
//! IOC_DIR=/epics/iocs
//! TOP_BINARY_DIR=/epics/bundle
//! BINARIES_FLAT=NO
//! PREFIX=XF:10IDC-BI
//! ENGINEER=J. Wlodek
//! HOSTNAME=localhost
//! CA_ADDRESS=127.0.0.255
//! #
//! # IOC Type       IOC Name       asyn Port      telnet Port    connection
//! ADSimDetector    cam-sim1       SIM1           4045           NA
//! ADUVC            cam-uvc1       UVC1           4046           19B305B1
//! ```
//!
//! ## Generated output
//!
//! Each request produces a directory named after the IOC under IOC_DIR
//! containing st.cmd (or an st.cmd/st_base.cmd pair when the executable
//! path exceeds the kernel shebang limit), unique.cmd, config, envPaths, an
//! auto_settings.req when the driver ships one, any staged
//! dependency/substitution files with their macros filled in, and an
//! ldpath.sh/dllPath.bat script extending the dynamic library search path
//! with every module in the bundle.
//!
//! Requests are processed strictly in input order and one failed IOC never
//! stops the rest of the batch; each request's outcome is reported back to
//! the caller with the step that failed.
pub mod config;
pub mod constants;
pub mod error;
pub mod instantiator;
pub mod layout;
pub mod lib_path;
pub mod manager;
pub mod request;
pub mod resolver;
pub mod status;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;
