//! Generates per-peer BGP policy for a BIRD router from a declarative config
//!
//! Peers are resolved one at a time ([`resolver`]), optionally enriched from
//! PeeringDB and the IRR ([`registry`]), compiled into per-session import and
//! export behavior ([`filter`]), written out ([`output`]) and applied through
//! the daemon's control socket ([`reload`]).

pub mod cli;
pub mod config;
mod error;
pub mod filter;
mod generate;
pub mod output;
pub mod registry;
pub mod reload;
pub mod resolver;
mod utils;

pub use error::{Error, Result};
pub use generate::{generate, Generated, PeerOutput};
pub use utils::normalize;
