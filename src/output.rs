use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::config::GlobalSettings;
use crate::generate::{Generated, PeerOutput};
use crate::utils::normalize;

pub const GLOBAL_FILE: &str = "global.json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serializing {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("peers '{first}' and '{second}' would both be written to {file}")]
    Collision {
        file: String,
        first: String,
        second: String,
    },
}

/// Writes generated documents into an output directory
#[derive(Clone, Debug)]
pub struct Writer {
    dir: PathBuf,
}

impl Writer {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// E.g. "AS65001_HURRICANE_ELECTRIC.json"
    pub fn peer_file_name(peer: &PeerOutput) -> String {
        format!("AS{}_{}.json", peer.policy.asn, normalize(&peer.policy.name))
    }

    pub fn write_global(&self, global: &GlobalSettings) -> Result<PathBuf, OutputError> {
        let path = self.dir.join(GLOBAL_FILE);
        write_document(&path, global)?;
        info!("Wrote global config to {}", path.display());
        Ok(path)
    }

    pub fn write_peer(&self, peer: &PeerOutput) -> Result<PathBuf, OutputError> {
        let path = self.dir.join(Self::peer_file_name(peer));
        write_document(&path, peer)?;
        info!("Wrote peer specific config for AS{}", peer.policy.asn);
        Ok(path)
    }

    /// Global document first, then one document per peer
    ///
    /// Nothing is written when two peers map to the same file name.
    pub fn write_all(&self, generated: &Generated) -> Result<Vec<PathBuf>, OutputError> {
        check_file_names(&generated.peers)?;
        let mut written = vec![self.write_global(&generated.global)?];
        for peer in &generated.peers {
            written.push(self.write_peer(peer)?);
        }
        Ok(written)
    }
}

fn check_file_names(peers: &[PeerOutput]) -> Result<(), OutputError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for peer in peers {
        let file = Writer::peer_file_name(peer);
        if let Some(first) = seen.get(&file) {
            return Err(OutputError::Collision {
                file,
                first: first.to_string(),
                second: peer.policy.name.clone(),
            });
        }
        seen.insert(file, &peer.policy.name);
    }
    Ok(())
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), OutputError> {
    let io_error = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    serde_json::to_writer_pretty(&mut writer, document).map_err(|source| {
        OutputError::Serialize {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.write_all(b"\n").map_err(io_error)?;
    writer.flush().map_err(io_error)
}
