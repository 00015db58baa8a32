use crate::error::{ClusterError, Result, StorageOp};
use crate::store::ClusterId;
use ahash::AHashMap;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// File name of the persisted index inside the output directory.
pub const INDEX_FILE_NAME: &str = "index.json";

/// Token -> clusters whose lines contained that token.
///
/// Each list keeps first-association order and holds a cluster at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    postings: AHashMap<String, Vec<ClusterId>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, token: &str) -> &[ClusterId] {
        self.postings.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn record(&mut self, token: &str, cluster: &str) {
        match self.postings.get_mut(token) {
            Some(ids) => {
                if !ids.iter().any(|id| id == cluster) {
                    ids.push(cluster.to_string());
                }
            }
            None => {
                self.postings.insert(token.to_string(), vec![cluster.to_string()]);
            }
        }
    }

    pub fn record_all<S: AsRef<str>>(&mut self, tokens: &[S], cluster: &str) {
        for t in tokens {
            self.record(t.as_ref(), cluster);
        }
    }

    /// Rewrites every posting through `id_map`; ids missing from the map are kept.
    pub fn rename(&mut self, id_map: &AHashMap<ClusterId, ClusterId>) {
        for ids in self.postings.values_mut() {
            for id in ids.iter_mut() {
                if let Some(new_id) = id_map.get(id.as_str()) {
                    *id = new_id.clone();
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Every cluster id referenced by any posting.
    pub fn referenced_clusters(&self) -> ahash::AHashSet<&str> {
        self.postings.values().flatten().map(String::as_str).collect()
    }

    /// JSON object with keys in token order, so equal indexes serialize to equal bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn write_to<W: Write>(&self, w: W) -> Result<()> {
        let sorted: BTreeMap<&str, &Vec<ClusterId>> =
            self.postings.iter().map(|(k, v)| (k.as_str(), v)).collect();
        serde_json::to_writer(w, &sorted)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: R) -> Result<Self> {
        let postings: HashMap<String, Vec<ClusterId>> = serde_json::from_reader(r)?;
        Ok(Self { postings: postings.into_iter().collect() })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let f = File::create(path).map_err(|e| ClusterError::storage(StorageOp::Persist, path, e))?;
        let mut w = BufWriter::new(f);
        self.write_to(&mut w)?;
        w.flush().map_err(|e| ClusterError::storage(StorageOp::Persist, path, e))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path).map_err(|e| ClusterError::configuration(path, e.to_string()))?;
        Self::read_from(BufReader::new(f))
    }
}
