//! Filesystem sink provider.
//!
//! Creates `<output_dir>/<prefix><filename>` for each download. The file
//! is truncated if it exists, written sequentially through a `BufWriter`,
//! and closed when the driver drops it.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::SinkProvider;
use crate::config::LinkConfig;

/// Writes downloads into a directory.
pub struct DirectorySinks {
    dir: PathBuf,
    prefix: String,
    last_path: Option<PathBuf>,
}

impl DirectorySinks {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            last_path: None,
        }
    }

    pub fn from_config(config: &LinkConfig) -> Self {
        Self::new(config.output_dir.clone(), config.output_prefix.clone())
    }

    /// Full path for a peripheral-side filename.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, filename))
    }

    /// Path of the most recently created file.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl SinkProvider for DirectorySinks {
    type Sink = BufWriter<File>;

    fn create(&mut self, filename: &str) -> io::Result<Self::Sink> {
        let path = self.path_for(filename);
        let file = File::create(&path)?;
        info!("writing to {}", path.display());
        self.last_path = Some(path);
        Ok(BufWriter::new(file))
    }
}
