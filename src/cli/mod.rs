//! # bgpcfg CLI
//!
//! Reads a declarative peering config, resolves every peer against PeeringDB
//! and the IRR where asked to, writes the resulting policy documents and
//! tells BIRD to reload.
//!
//! ## Features
//! - [x] YAML, TOML and JSON config files
//! - [x] Max-prefix limits from PeeringDB (`automaxpfx`)
//! - [x] Prefix filters from the IRR via bgpq4 (`autopfxfilter`)
//! - [x] BIRD reload over the control socket
//! - [ ] Rendering BIRD config text from templates
//!
//! ```sh
//! $ bgpcfg --config /etc/bgpcfg/config.yml --output /etc/bird/
//! [INFO  bgpcfg::config] Using IRRDB server rr.ntt.net
//! [INFO  bgpcfg::config] Using RTR server 127.0.0.1
//! [INFO  bgpcfg::resolver] Policy for AS65001: import cone, export any
//! [INFO  bgpcfg::output] Wrote peer specific config for AS65001
//! [INFO  bgpcfg::reload] Daemon replied: [0003] Reconfigured
//! ```
//!
//! `--dry-run` stops after validation and enrichment, `--no-reload` writes
//! the documents but leaves the daemon alone.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};

use crate::config;
use crate::error::Result;
use crate::generate::generate;
use crate::output::Writer;
use crate::registry::{Bgpq4, PeeringDb};
use crate::reload::ControlSocket;
use crate::resolver::Resolver;

#[derive(Parser, Debug)]
#[clap(name = "bgpcfg", version, rename_all = "kebab-case")]
/// BGP peer policy generator for BIRD
pub struct Args {
    /// Configuration file in YAML, TOML, or JSON format
    #[clap(short, long, default_value = "/etc/bgpcfg/config.yml")]
    pub config: PathBuf,
    /// Directory to write output files to
    #[clap(short, long, default_value = "/etc/bird/")]
    pub output: PathBuf,
    /// BIRD control socket
    #[clap(short, long, default_value = "/run/bird/bird.ctl")]
    pub socket: PathBuf,
    /// Command sent over the control socket once output is written
    #[clap(long, default_value = "configure")]
    pub command: String,
    /// Validate and enrich only, write nothing and skip the reload
    #[clap(long)]
    pub dry_run: bool,
    /// Write output but skip the reload
    #[clap(long)]
    pub no_reload: bool,
    /// PeeringDB base URL
    #[clap(long, default_value = "https://peeringdb.com")]
    pub peeringdb: String,
    /// bgpq4 executable
    #[clap(long, default_value = "bgpq4")]
    pub bgpq4: PathBuf,
    /// Show debug logs (additive for trace logs)
    #[clap(short, parse(from_occurrences))]
    pub verbose: u8,
}

pub async fn run(args: &Args) -> Result<()> {
    let config = config::from_file(&args.config)?;
    debug!(
        "Found {} peers in {}",
        config.peers.len(),
        args.config.display()
    );

    let resolver = Resolver::new(
        PeeringDb::with_base_url(&args.peeringdb)?,
        Bgpq4::with_program(&args.bgpq4),
    );
    let generated = generate(&config, &resolver).await?;
    for peer in &generated.peers {
        debug!("{:?}", peer.policy);
    }

    if args.dry_run {
        info!("Dry run, leaving {} untouched", args.output.display());
        return Ok(());
    }
    Writer::new(&args.output).write_all(&generated)?;

    if args.no_reload {
        info!("Skipping reload of {}", args.socket.display());
        return Ok(());
    }
    ControlSocket::new(&args.socket).apply(&args.command).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(&["bgpcfg"]);
        assert_eq!(args.config, PathBuf::from("/etc/bgpcfg/config.yml"));
        assert_eq!(args.socket, PathBuf::from("/run/bird/bird.ctl"));
        assert_eq!(args.command, "configure");
        assert!(!args.dry_run);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from(&[
            "bgpcfg",
            "-c",
            "peers.toml",
            "--output",
            "/tmp/bird",
            "--dry-run",
            "-vv",
        ]);
        assert_eq!(args.config, PathBuf::from("peers.toml"));
        assert_eq!(args.output, PathBuf::from("/tmp/bird"));
        assert!(args.dry_run);
        assert!(!args.no_reload);
        assert_eq!(args.verbose, 2);
    }
}
