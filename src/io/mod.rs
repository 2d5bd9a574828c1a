//! Connectivity input.
//!
//! This module provides the [`cxn`] reader for the arbitrary-lattice
//! connectivity format and [`ConnectivitySource`], the handle a reader
//! opens. A source can be opened any number of times: every process opens
//! it once to read its initial slice and again if repartitioning hands it a
//! different range.

pub mod cxn;
pub(crate) mod tokens;

pub use cxn::ConnectivityReader;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

/// Where connectivity text comes from.
#[derive(Clone, Debug)]
pub enum ConnectivitySource {
    /// A file every process can open.
    File(PathBuf),
    /// Text already held in memory, with a name used in error messages.
    Memory { name: String, contents: Arc<str> },
}

impl ConnectivitySource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn in_memory(name: impl Into<String>, contents: impl Into<Arc<str>>) -> Self {
        Self::Memory {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Name reported in errors.
    pub fn name(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Memory { name, .. } => name.clone(),
        }
    }

    /// Open a fresh buffered reader positioned at the start.
    pub fn open(&self) -> std::io::Result<Box<dyn BufRead + '_>> {
        match self {
            Self::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            Self::Memory { contents, .. } => Ok(Box::new(contents.as_bytes())),
        }
    }
}
