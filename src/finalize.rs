use crate::error::Result;
use crate::index::{InvertedIndex, INDEX_FILE_NAME};
use crate::store::{final_name, is_temporary, ClusterId, ClusterStore};
use ahash::AHashMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSummary {
    pub id: ClusterId,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct Finalized {
    /// Final clusters, largest first.
    pub clusters: Vec<ClusterSummary>,
    pub id_map: AHashMap<ClusterId, ClusterId>,
    pub index: InvertedIndex,
}

/// Ranks clusters by size and gives them dense, zero-padded identifiers.
pub struct Finalizer {
    name_len: usize,
}

impl Finalizer {
    pub fn new(name_len: usize) -> Self {
        Self { name_len }
    }

    /// Renames every temporary cluster and rewrites `index` to the final ids.
    /// Equal sizes keep creation order.
    pub fn rank<S: ClusterStore>(&self, store: &mut S, mut index: InvertedIndex) -> Result<Finalized> {
        let mut sized: Vec<(ClusterId, usize)> = store
            .clusters()
            .into_iter()
            .filter(|id| is_temporary(id))
            .map(|id| {
                let n = store.size(&id);
                (id, n)
            })
            .collect();
        sized.sort_by(|a, b| b.1.cmp(&a.1));

        if sized.len() > 10usize.saturating_pow(self.name_len as u32) {
            warn!(clusters = sized.len(), name_len = self.name_len, "cluster count exceeds identifier width");
        }

        let mut id_map = AHashMap::with_capacity(sized.len());
        let mut clusters = Vec::with_capacity(sized.len());
        for (rank, (old, size)) in sized.into_iter().enumerate() {
            let new = final_name(rank, self.name_len);
            store.rename(&old, &new)?;
            debug!(from = %old, to = %new, size, "renamed cluster");
            clusters.push(ClusterSummary { id: new.clone(), size });
            id_map.insert(old, new);
        }
        index.rename(&id_map);
        Ok(Finalized { clusters, id_map, index })
    }

    /// [`rank`](Self::rank) followed by writing the index to `<out_dir>/index.json`.
    pub fn finalize<S: ClusterStore>(
        &self,
        store: &mut S,
        index: InvertedIndex,
        out_dir: &Path,
    ) -> Result<(Finalized, PathBuf)> {
        let done = self.rank(store, index)?;
        let path = out_dir.join(INDEX_FILE_NAME);
        done.index.save(&path)?;
        info!(clusters = done.clusters.len(), tokens = done.index.len(), path = %path.display(), "index persisted");
        Ok((done, path))
    }
}
