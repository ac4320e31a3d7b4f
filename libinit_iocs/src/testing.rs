//! Filesystem fixtures shared by the module tests.
//!
//! Builds throwaway binary bundles shaped like real areaDetector binary
//! distributions, plus a local stand-in for the ioc-template repository so
//! instantiation tests never touch the network.

use std::fs;
use std::path::Path;

use crate::error::TemplateError;
use crate::template::TemplateSource;

const ARCH: &str = "linux-x86_64";

/// Lay out a stacked (standard) bundle: everything but base under support/.
pub(crate) fn make_standard_bundle(root: &Path) {
    make_base_and_support(root, &root.join("support"));
}

/// Lay out a flat bundle: modules sit directly under the binary root.
pub(crate) fn make_flat_bundle(root: &Path) {
    make_base_and_support(root, root);
}

fn make_base_and_support(root: &Path, support: &Path) {
    for sub in ["bin", "lib"] {
        fs::create_dir_all(root.join("base").join(sub).join(ARCH)).unwrap();
        fs::create_dir_all(support.join("testModule").join(sub).join(ARCH)).unwrap();
    }
    make_area_detector(&support.join("areaDetector"));
}

fn make_area_detector(ad_root: &Path) {
    for module in ["ADSupport", "ADCore", "ADSimDetector"] {
        for sub in ["bin", "lib"] {
            fs::create_dir_all(ad_root.join(module).join(sub).join(ARCH)).unwrap();
        }
    }

    let ioc_dir = ad_root.join("ADSimDetector/iocs/simDetectorIOC");
    let arch_dir = ioc_dir.join("bin").join(ARCH);
    fs::create_dir_all(&arch_dir).unwrap();
    fs::write(arch_dir.join("simDetectorApp"), "binary\n").unwrap();

    fs::create_dir_all(ioc_dir.join("dbd")).unwrap();
    fs::write(ioc_dir.join("dbd/simDetectorApp.dbd"), "registrar\n").unwrap();

    let boot_dir = ioc_dir.join("iocBoot/iocSimDetector");
    fs::create_dir_all(&boot_dir).unwrap();
    fs::write(
        boot_dir.join("st_base.cmd"),
        "epicsEnvSet(\"MAX_THREADS\", \"8\")\n\
         epicsEnvSet(\"EPICS_DB_INCLUDE_PATH\", \"$(ADCORE)/db\")\n\
         iocInit()\n",
    )
    .unwrap();
}

/// Template source that writes an ioc-template shaped tree directly to the
/// destination, standing in for the git clone.
#[derive(Default)]
pub(crate) struct LocalTemplate;

impl TemplateSource for LocalTemplate {
    fn fetch(&self, dest: &Path) -> Result<(), TemplateError> {
        fs::create_dir_all(dest)?;
        fs::write(dest.join("st.cmd"), "# generic template st.cmd\n")?;

        let startup_dir = dest.join("startupScripts");
        fs::create_dir(&startup_dir)?;
        fs::write(
            startup_dir.join("st_simDetector.cmd"),
            "#!../../bin/linux-x86_64/simDetectorApp\n\
             < envPaths\n\
             dbLoadDatabase(\"$(TOP)/dbd/simDetectorApp.dbd\")\n\
             iocInit()\n",
        )?;
        fs::write(
            startup_dir.join("st_uvc.cmd"),
            "#!../../bin/linux-x86_64/uvcApp\niocInit()\n",
        )?;

        fs::write(
            dest.join("unique.cmd"),
            "# unique.cmd shipped with the template\n\
             epicsEnvSet(\"SUPPORT_DIR\", \"/epics/support\")\n\
             epicsEnvSet(\"ENGINEER\", \"template-engineer\")\n\
             epicsEnvSet(\"CAM-CONNECT\", \"127.0.0.1\")\n\
             epicsEnvSet(\"HOSTNAME\", \"template-host\")\n\
             epicsEnvSet(\"PREFIX\", \"TEMPLATE:\")\n\
             epicsEnvSet(\"CTPREFIX\", \"TEMPLATE:\")\n\
             epicsEnvSet(\"IOCNAME\", \"template-ioc\")\n\
             epicsEnvSet(\"EPICS_CA_ADDR_LIST\", \"0.0.0.0\")\n\
             epicsEnvSet(\"IOC\", \"iocTemplate\")\n\
             epicsEnvSet(\"PORT\", \"TEMPLATE\")\n\
             dbLoadRecords(\"db/other.db\")\n",
        )?;

        fs::write(
            dest.join("config"),
            "NAME=template\nPORT=1000\nHOST=template-host\n",
        )?;

        fs::write(
            dest.join("envPaths"),
            "epicsEnvSet(\"TOP\", \".\")\n\
             epicsEnvSet(\"ARCH\",       \"linux-aarch64\")\n\
             epicsEnvSet(\"SUPPORT\", \"/epics/support\")\n\
             epicsEnvSet(\"EPICS_BASE\", \"$(SUPPORT)/base\")\n",
        )?;

        let autosave_dir = dest.join("autosaveFiles");
        fs::create_dir(&autosave_dir)?;
        fs::write(
            autosave_dir.join("simdetector_auto_settings.req"),
            "save/restore settings\n",
        )?;

        let dep_dir = dest.join("dependancyFiles");
        fs::create_dir(&dep_dir)?;
        fs::write(
            dep_dir.join("simDetector_plugins.cmd"),
            "dbLoadRecords(\"NDStdArrays.template\", \"P=$(PREFIX),R=image1:,PORT=$(PORT)\")\n",
        )?;
        fs::write(dep_dir.join("uvc_other.cmd"), "# uvc only\n")?;

        fs::write(
            dest.join("cleanup.sh"),
            "#!/bin/bash\nrm -rf startupScripts autosaveFiles dependancyFiles\n",
        )?;
        Ok(())
    }
}
