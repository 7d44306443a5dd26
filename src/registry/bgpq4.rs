use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use super::{as_set_object, parse_prefix_list, PrefixExpander, RegistryError};
use crate::filter::Family;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs `bgpq4` to build aggregated BIRD prefix sets from an IRR
#[derive(Clone, Debug)]
pub struct Bgpq4 {
    program: PathBuf,
    timeout: Duration,
}

impl Bgpq4 {
    pub fn new() -> Self {
        Self::with_program("bgpq4")
    }

    pub fn with_program<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Default for Bgpq4 {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrefixExpander for Bgpq4 {
    async fn expand(
        &self,
        as_set: &str,
        family: Family,
        irr_host: &str,
    ) -> Result<Vec<String>, RegistryError> {
        let object = as_set_object(as_set);
        let family_flag = format!("-Ab{}", family.number());
        info!(
            "Running {} -h {} {} {}",
            self.program_name(),
            irr_host,
            family_flag,
            object
        );

        let child = Command::new(&self.program)
            .arg("-h")
            .arg(irr_host)
            .arg(&family_flag)
            .arg(object)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| RegistryError::Timeout {
                program: self.program_name(),
                timeout: self.timeout,
            })?
            .map_err(|source| RegistryError::Spawn {
                program: self.program_name(),
                source,
            })?;

        if !output.status.success() {
            return Err(RegistryError::Exit {
                program: self.program_name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let prefixes = parse_prefix_list(&stdout).map_err(|source| RegistryError::Parse {
            program: self.program_name(),
            as_set: as_set.to_string(),
            source,
        })?;
        debug!("{} expanded to {} {} entries", as_set, prefixes.len(), family);
        Ok(prefixes)
    }
}
