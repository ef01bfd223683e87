use rustc_hash::FxHashMap;

/// Row to group assignment for a grouped formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPartition {
    ids: Vec<u32>,
}

impl GroupPartition {
    pub fn new(ids: Vec<u32>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn group_of(&self, row: usize) -> Option<u32> {
        self.ids.get(row).copied()
    }

    /// `(group id, rows)` pairs in order of each group's first row; rows
    /// within a group keep their column order.
    pub fn groups(&self) -> Vec<(u32, Vec<usize>)> {
        let mut slot: FxHashMap<u32, usize> = FxHashMap::default();
        let mut out: Vec<(u32, Vec<usize>)> = Vec::new();
        for (row, &id) in self.ids.iter().enumerate() {
            let i = *slot.entry(id).or_insert_with(|| {
                out.push((id, Vec::new()));
                out.len() - 1
            });
            out[i].1.push(row);
        }
        out
    }
}

impl From<Vec<u32>> for GroupPartition {
    fn from(ids: Vec<u32>) -> Self {
        Self::new(ids)
    }
}
