//! Dataset-mark grouping
//!
//! Runs whose dataset graphs are structurally equal share one group tag so
//! callers can cluster runs by data pipeline. Tags are string-encoded
//! integers compared numerically; tag `"1"` is reserved for runs without a
//! dataset graph.

use serde_json::Value;

use crate::record::RunRecord;

/// Recompute group tags for the whole record sequence.
///
/// The group table is rebuilt from scratch: it starts with tag `"1"` for
/// "no graph", and each record in sequence order either joins the first
/// group whose representative graph equals its own (deep equality) or
/// mints the numeric successor of the largest existing tag. Rebuilding on
/// every ingestion keeps tags consistent as the population grows; the
/// quadratic cost is fine at the tens-to-hundreds of runs this serves.
pub(crate) fn assign_dataset_marks(records: &mut [RunRecord]) {
    let mut groups: Vec<(u64, Option<Value>)> = vec![(1, None)];

    for record in records {
        let graph = record.dataset_graph();
        let tag = match groups
            .iter()
            .find(|(_, representative)| representative.as_ref() == graph)
        {
            Some((tag, _)) => *tag,
            None => {
                let next = groups.iter().map(|(tag, _)| *tag).max().unwrap_or(0) + 1;
                groups.push((next, graph.cloned()));
                next
            }
        };
        record.set_dataset_mark(tag.to_string());
    }
}
