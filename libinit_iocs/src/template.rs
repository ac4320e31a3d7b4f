use std::path::Path;
use std::process::Command;

use super::constants::TEMPLATE_URL;
use super::error::TemplateError;

/// Source of the generic IOC template directory tree.
///
/// Implementations must materialize the full template at the destination
/// path, or fail cleanly without leaving a partial tree behind that a later
/// run would mistake for an existing IOC.
pub trait TemplateSource {
    fn fetch(&self, dest: &Path) -> Result<(), TemplateError>;
}

/// Fetches the ioc-template repository with a git subprocess.
pub struct GitTemplateSource {
    url: String,
}

impl GitTemplateSource {
    pub fn new() -> Self {
        GitTemplateSource {
            url: TEMPLATE_URL.to_string(),
        }
    }

    /// Use a template repository other than the upstream default.
    pub fn with_url(url: &str) -> Self {
        GitTemplateSource {
            url: url.to_string(),
        }
    }
}

impl Default for GitTemplateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateSource for GitTemplateSource {
    fn fetch(&self, dest: &Path) -> Result<(), TemplateError> {
        spdlog::info!("Cloning IOC template into {}", dest.to_string_lossy());
        let status = Command::new("git")
            .args(["clone", "--quiet", &self.url])
            .arg(dest)
            .status()?;
        if !status.success() {
            // git removes the target directory itself on a failed clone
            return Err(TemplateError::FetchFailed(format!(
                "git clone exited with {status}"
            )));
        }
        Ok(())
    }
}
