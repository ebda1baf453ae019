//! Build information
//!
//! `HEALTH_EXPORT_GIT_COMMIT` and `HEALTH_EXPORT_BUILD_TIME` may be set at
//! compile time to stamp the binary.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("HEALTH_EXPORT_GIT_COMMIT").unwrap_or("none"),
            build_time: option_env!("HEALTH_EXPORT_BUILD_TIME").unwrap_or("unknown"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    /// `v0.1.0 (1a2b3c4)`
    pub fn short_string(&self) -> String {
        let commit: String = self.commit.chars().take(7).collect();
        format!("v{} ({})", self.version, commit)
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Version:    {}", self.version)?;
        writeln!(f, "Commit:     {}", self.commit)?;
        writeln!(f, "Built:      {}", self.build_time)?;
        write!(f, "OS/Arch:    {}/{}", self.os, self.arch)
    }
}
