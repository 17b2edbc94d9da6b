//! CLI module for sse2ws.
//!
//! ```ignore
//! use clap::Parser;
//! use sse2ws::cli::Args;
//!
//! let args = Args::parse();
//! let config = args.into_config()?;
//! ```

pub mod args;

pub use args::Args;
