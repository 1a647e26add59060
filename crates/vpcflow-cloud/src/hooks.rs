//! Callbacks the orchestrators invoke while they work
//!
//! A [`Checkpoint`] runs synchronously after every successful mutation of the
//! graph; the orchestrator does not touch the next resource until it returns.
//! An [`Announcer`] narrates teardown progress.

use crate::error::{CloudError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vpcflow_core::{RegionConfig, save_region};

/// Persistence hook called with the graph after each mutation
pub trait Checkpoint {
    fn on_graph_updated(&mut self, region: &RegionConfig) -> Result<()>;
}

impl<F> Checkpoint for F
where
    F: FnMut(&RegionConfig) -> Result<()>,
{
    fn on_graph_updated(&mut self, region: &RegionConfig) -> Result<()> {
        self(region)
    }
}

/// Checkpoint that persists nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {
    fn on_graph_updated(&mut self, _region: &RegionConfig) -> Result<()> {
        Ok(())
    }
}

/// Writes the whole graph to a document file on every checkpoint
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
    writes: usize,
}

impl FileCheckpoint {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of checkpoints written so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Checkpoint for FileCheckpoint {
    fn on_graph_updated(&mut self, region: &RegionConfig) -> Result<()> {
        save_region(&self.path, region).map_err(|e| CloudError::Checkpoint(Box::new(e)))?;
        self.writes += 1;
        debug!(path = %self.path.display(), writes = self.writes, "Checkpoint written");
        Ok(())
    }
}

/// Progress narration hook. The message is built lazily so silent
/// announcers cost nothing.
pub trait Announcer {
    fn announce(&mut self, message: &dyn Fn() -> String);
}

impl<F> Announcer for F
where
    F: FnMut(String),
{
    fn announce(&mut self, message: &dyn Fn() -> String) {
        self(message())
    }
}

/// Announcer that drops every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAnnounce;

impl Announcer for NoAnnounce {
    fn announce(&mut self, _message: &dyn Fn() -> String) {}
}

/// Announcer that emits each message as an `info` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnnouncer;

impl Announcer for TracingAnnouncer {
    fn announce(&mut self, message: &dyn Fn() -> String) {
        info!("{}", message());
    }
}
