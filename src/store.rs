use crate::error::{ClusterError, Result, StorageOp};
use crate::index::INDEX_FILE_NAME;
use crate::sampler::Reservoir;
use ahash::AHashMap;
use rand::RngCore;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub type ClusterId = String;

/// Prefix of identifiers handed out during ingestion.
pub const TEMP_PREFIX: &str = "tmp";

pub fn temp_name(seq: usize, width: usize) -> ClusterId {
    format!("{TEMP_PREFIX}{seq:0width$}")
}

pub fn final_name(rank: usize, width: usize) -> ClusterId {
    format!("{rank:0width$}")
}

pub fn is_temporary(id: &str) -> bool {
    id.strip_prefix(TEMP_PREFIX)
        .map(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

fn is_digits(s: &str, width: usize) -> bool {
    s.len() == width && s.bytes().all(|b| b.is_ascii_digit())
}

/// Cluster file names a run with identifier width `width` produces.
fn is_run_artifact(name: &str, width: usize) -> bool {
    let digits = name.strip_prefix(TEMP_PREFIX).unwrap_or(name);
    is_digits(digits, width) || name == INDEX_FILE_NAME
}

/// Number of newline-terminated records; a trailing unterminated line counts too.
pub fn count_lines(path: &Path) -> io::Result<usize> {
    let r = BufReader::new(File::open(path)?);
    r.split(b'\n').try_fold(0usize, |n, seg| seg.map(|_| n + 1))
}

/// Append-only storage of cluster members.
pub trait ClusterStore {
    /// Registers a new, empty cluster under a fresh temporary id.
    fn create(&mut self) -> Result<ClusterId>;
    fn append(&mut self, id: &str, line: &str) -> Result<()>;
    /// Lines appended so far; 0 for unknown ids.
    fn size(&self, id: &str) -> usize;
    /// Up to `k` stored lines chosen uniformly at random.
    fn sample(&self, id: &str, k: usize, rng: &mut dyn RngCore) -> Result<Vec<String>>;
    /// Fails if `new_id` is already taken.
    fn rename(&mut self, id: &str, new_id: &str) -> Result<()>;
    /// Drops a cluster together with its content.
    fn discard(&mut self, id: &str) -> Result<()>;
    /// All clusters in creation order, under their current ids.
    fn clusters(&self) -> Vec<ClusterId>;
}

/// One line-delimited UTF-8 file per cluster, named by its current id.
///
/// File handles are opened per operation and dropped before returning.
#[derive(Debug)]
pub struct DirStore {
    dir: PathBuf,
    name_len: usize,
    next_seq: usize,
    order: Vec<ClusterId>,
    counts: AHashMap<ClusterId, usize>,
}

impl DirStore {
    /// Creates `dir` if needed and removes cluster files of the same width and the
    /// index left by a previous run.
    pub fn open(dir: impl Into<PathBuf>, name_len: usize) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ClusterError::storage(StorageOp::Create, &dir, e))?;
        let removed = clean_dir(&dir, name_len)?;
        if removed > 0 {
            debug!(dir = %dir.display(), removed, "removed stale cluster files");
        }
        Ok(Self { dir, name_len, next_seq: 0, order: Vec::new(), counts: AHashMap::new() })
    }

    pub fn path_of(&self, id: &str) -> PathBuf {
        self.dir.join(id)
    }

    fn known(&self, id: &str) -> Result<()> {
        if self.counts.contains_key(id) {
            Ok(())
        } else {
            Err(ClusterError::UnknownCluster(id.to_string()))
        }
    }
}

fn clean_dir(dir: &Path, width: usize) -> Result<usize> {
    let entries = fs::read_dir(dir).map_err(|e| ClusterError::storage(StorageOp::Clean, dir, e))?;
    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| ClusterError::storage(StorageOp::Clean, dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !is_run_artifact(name, width) || !entry.path().is_file() {
            continue;
        }
        let path = entry.path();
        fs::remove_file(&path).map_err(|e| ClusterError::storage(StorageOp::Clean, &path, e))?;
        removed += 1;
    }
    Ok(removed)
}

impl ClusterStore for DirStore {
    fn create(&mut self) -> Result<ClusterId> {
        let id = temp_name(self.next_seq, self.name_len);
        let path = self.path_of(&id);
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| ClusterError::storage(StorageOp::Create, &path, e))?;
        self.next_seq += 1;
        self.order.push(id.clone());
        self.counts.insert(id.clone(), 0);
        Ok(id)
    }

    fn append(&mut self, id: &str, line: &str) -> Result<()> {
        self.known(id)?;
        let path = self.path_of(id);
        let mut f = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| ClusterError::storage(StorageOp::Append, &path, e))?;
        writeln!(f, "{line}").map_err(|e| ClusterError::storage(StorageOp::Append, &path, e))?;
        if let Some(n) = self.counts.get_mut(id) {
            *n += 1;
        }
        Ok(())
    }

    fn size(&self, id: &str) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    fn sample(&self, id: &str, k: usize, rng: &mut dyn RngCore) -> Result<Vec<String>> {
        self.known(id)?;
        let path = self.path_of(id);
        let f = File::open(&path).map_err(|e| ClusterError::storage(StorageOp::Sample, &path, e))?;
        let mut reservoir = Reservoir::new(k);
        for line in BufReader::new(f).lines() {
            let line = line.map_err(|e| ClusterError::storage(StorageOp::Sample, &path, e))?;
            reservoir.offer(line, rng);
        }
        Ok(reservoir.into_vec())
    }

    fn rename(&mut self, id: &str, new_id: &str) -> Result<()> {
        self.known(id)?;
        let from = self.path_of(id);
        let to = self.path_of(new_id);
        if self.counts.contains_key(new_id) || to.exists() {
            let err = io::Error::new(io::ErrorKind::AlreadyExists, format!("{new_id} already exists"));
            return Err(ClusterError::storage(StorageOp::Rename, &to, err));
        }
        fs::rename(&from, &to).map_err(|e| ClusterError::storage(StorageOp::Rename, &from, e))?;
        if let Some(n) = self.counts.remove(id) {
            self.counts.insert(new_id.to_string(), n);
        }
        if let Some(slot) = self.order.iter_mut().find(|o| o.as_str() == id) {
            *slot = new_id.to_string();
        }
        Ok(())
    }

    fn discard(&mut self, id: &str) -> Result<()> {
        self.known(id)?;
        let path = self.path_of(id);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                return Err(ClusterError::storage(StorageOp::Clean, &path, e));
            }
            _ => {}
        }
        self.counts.remove(id);
        self.order.retain(|o| o.as_str() != id);
        Ok(())
    }

    fn clusters(&self) -> Vec<ClusterId> {
        self.order.clone()
    }
}

/// In-memory backend with the same naming and ordering rules as [`DirStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    name_len: usize,
    next_seq: usize,
    order: Vec<ClusterId>,
    lines: AHashMap<ClusterId, Vec<String>>,
}

impl MemoryStore {
    pub fn new(name_len: usize) -> Self {
        Self { name_len, ..Default::default() }
    }

    pub fn lines(&self, id: &str) -> Option<&[String]> {
        self.lines.get(id).map(Vec::as_slice)
    }
}

impl ClusterStore for MemoryStore {
    fn create(&mut self) -> Result<ClusterId> {
        let id = temp_name(self.next_seq, self.name_len);
        self.next_seq += 1;
        self.order.push(id.clone());
        self.lines.insert(id.clone(), Vec::new());
        Ok(id)
    }

    fn append(&mut self, id: &str, line: &str) -> Result<()> {
        let lines = self
            .lines
            .get_mut(id)
            .ok_or_else(|| ClusterError::UnknownCluster(id.to_string()))?;
        lines.push(line.to_string());
        Ok(())
    }

    fn size(&self, id: &str) -> usize {
        self.lines.get(id).map(Vec::len).unwrap_or(0)
    }

    fn sample(&self, id: &str, k: usize, rng: &mut dyn RngCore) -> Result<Vec<String>> {
        let lines = self.lines.get(id).ok_or_else(|| ClusterError::UnknownCluster(id.to_string()))?;
        Ok(crate::sampler::sample(lines.iter().cloned(), k, rng))
    }

    fn rename(&mut self, id: &str, new_id: &str) -> Result<()> {
        if self.lines.contains_key(new_id) {
            let err = io::Error::new(io::ErrorKind::AlreadyExists, format!("{new_id} already exists"));
            return Err(ClusterError::storage(StorageOp::Rename, new_id, err));
        }
        let lines = self.lines.remove(id).ok_or_else(|| ClusterError::UnknownCluster(id.to_string()))?;
        self.lines.insert(new_id.to_string(), lines);
        if let Some(slot) = self.order.iter_mut().find(|o| o.as_str() == id) {
            *slot = new_id.to_string();
        }
        Ok(())
    }

    fn discard(&mut self, id: &str) -> Result<()> {
        self.lines.remove(id).ok_or_else(|| ClusterError::UnknownCluster(id.to_string()))?;
        self.order.retain(|o| o.as_str() != id);
        Ok(())
    }

    fn clusters(&self) -> Vec<ClusterId> {
        self.order.clone()
    }
}
