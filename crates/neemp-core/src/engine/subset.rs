use super::kappa_data::KappaData;
use super::ranking::RankingRule;
use crate::core::models::training_set::TrainingSet;
use crate::core::utils::bitset::BitSet;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct SubsetId;
}

/// Which record of a subset is its best.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestRecord {
    /// An entry of the scan grid.
    Grid(usize),
    /// The Brent refinement record.
    Polish,
}

/// A molecule selection together with the kappa trials evaluated on it.
#[derive(Debug)]
pub struct Subset {
    molecules: BitSet,
    data: Vec<KappaData>,
    polish: Option<KappaData>,
    best: Option<BestRecord>,
    parent: Option<SubsetId>,
}

impl Subset {
    /// The root subset: every molecule selected.
    pub fn full(training_set: &TrainingSet) -> Self {
        let mut molecules = BitSet::new(training_set.molecules_count());
        molecules.set_all();
        Self::with_mask(molecules, None)
    }

    /// A child of `parent` sharing its mask, without any trial records.
    pub fn derived(parent_id: SubsetId, parent: &Subset) -> Self {
        let mut molecules = BitSet::new(parent.molecules.len());
        molecules.set_as(&parent.molecules);
        Self::with_mask(molecules, Some(parent_id))
    }

    pub fn with_mask(molecules: BitSet, parent: Option<SubsetId>) -> Self {
        Self {
            molecules,
            data: Vec::new(),
            polish: None,
            best: None,
            parent,
        }
    }

    pub fn molecules(&self) -> &BitSet {
        &self.molecules
    }

    pub fn molecules_mut(&mut self) -> &mut BitSet {
        &mut self.molecules
    }

    pub fn parent(&self) -> Option<SubsetId> {
        self.parent
    }

    pub fn data(&self) -> &[KappaData] {
        &self.data
    }

    pub fn polish(&self) -> Option<&KappaData> {
        self.polish.as_ref()
    }

    pub fn best_record(&self) -> Option<BestRecord> {
        self.best
    }

    pub fn best(&self) -> Option<&KappaData> {
        match self.best? {
            BestRecord::Grid(idx) => self.data.get(idx),
            BestRecord::Polish => self.polish.as_ref(),
        }
    }

    /// Replaces all trial records with `grid_len` fresh ones and clears `best`.
    pub fn reset_data(&mut self, training_set: &TrainingSet, grid_len: usize, with_polish: bool) {
        self.data = (0..grid_len).map(|_| KappaData::new(training_set)).collect();
        self.polish = with_polish.then(|| KappaData::new(training_set));
        self.best = None;
    }

    /// Split borrow for evaluating records against the (read-only) mask.
    pub(crate) fn records_mut(&mut self) -> (&BitSet, &mut Vec<KappaData>, &mut Option<KappaData>) {
        (&self.molecules, &mut self.data, &mut self.polish)
    }

    /// Points `best` at `record`.
    ///
    /// # Panics
    ///
    /// Panics if the record does not exist.
    pub fn set_best(&mut self, record: BestRecord) {
        match record {
            BestRecord::Grid(idx) => assert!(
                idx < self.data.len(),
                "best record {idx} out of range for {} grid entries",
                self.data.len()
            ),
            BestRecord::Polish => assert!(self.polish.is_some(), "subset has no polish record"),
        }
        self.best = Some(record);
    }

    /// Points `best` at the grid record ranking first under `rule`.
    pub fn select_best_grid(&mut self, rule: &RankingRule) -> Option<usize> {
        let idx = rule.best_index(&self.data)?;
        self.best = Some(BestRecord::Grid(idx));
        Some(idx)
    }

    /// Drops every record except the best one.
    pub fn retain_best_only(&mut self) {
        let kept = match self.best {
            Some(BestRecord::Grid(idx)) if idx < self.data.len() => Some(self.data.swap_remove(idx)),
            Some(BestRecord::Polish) => self.polish.take(),
            _ => None,
        };
        self.data.clear();
        self.data.shrink_to_fit();
        self.polish = None;
        match kept {
            Some(record) => {
                self.data.push(record);
                self.best = Some(BestRecord::Grid(0));
            }
            None => self.best = None,
        }
    }
}

/// Owner of every subset of a run; subsets refer to their parent by id.
#[derive(Debug, Default)]
pub struct SubsetArena {
    subsets: SlotMap<SubsetId, Subset>,
}

impl SubsetArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subset: Subset) -> SubsetId {
        self.subsets.insert(subset)
    }

    pub fn get(&self, id: SubsetId) -> Option<&Subset> {
        self.subsets.get(id)
    }

    pub fn get_mut(&mut self, id: SubsetId) -> Option<&mut Subset> {
        self.subsets.get_mut(id)
    }

    pub fn remove(&mut self, id: SubsetId) -> Option<Subset> {
        self.subsets.remove(id)
    }

    pub fn contains(&self, id: SubsetId) -> bool {
        self.subsets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }

    /// `id` followed by its ancestors up to the root.
    pub fn lineage(&self, id: SubsetId) -> Vec<SubsetId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            match self.subsets.get(cid) {
                Some(subset) => {
                    chain.push(cid);
                    current = subset.parent;
                }
                None => break,
            }
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::atom_type::AtomTypeClassification;
    use crate::core::models::molecule::Molecule;
    use crate::engine::ranking::RankingStatistic;
    use nalgebra::Point3;

    fn training_set(n: usize) -> TrainingSet {
        let molecules = (0..n)
            .map(|i| Molecule::new(format!("m{i}"), vec![Atom::new("H", 1, 1, Point3::origin())], 0.0))
            .collect();
        TrainingSet::new(molecules, AtomTypeClassification::Element).unwrap()
    }

    #[test]
    fn derived_subset_copies_mask_and_links_parent() {
        let set = training_set(4);
        let mut arena = SubsetArena::new();
        let root = arena.insert(Subset::full(&set));

        let mut child = Subset::derived(root, arena.get(root).unwrap());
        assert_eq!(child.molecules_mut().flip(2), true);
        let child_id = arena.insert(child);

        assert_eq!(arena.get(root).unwrap().molecules().count_set(), 4);
        assert_eq!(arena.get(child_id).unwrap().molecules().count_set(), 3);
        assert_eq!(arena.lineage(child_id), vec![child_id, root]);
    }

    #[test]
    fn best_selection_and_compaction() {
        let set = training_set(2);
        let mut subset = Subset::full(&set);
        subset.reset_data(&set, 3, false);
        assert!(subset.best().is_none());

        for (i, r) in [0.2, 0.9, 0.5].into_iter().enumerate() {
            subset.data[i].kappa = i as f64;
            subset.data[i].full_stats.r = r;
        }
        let rule = RankingRule::new(RankingStatistic::R);
        assert_eq!(subset.select_best_grid(&rule), Some(1));
        assert_eq!(subset.best().unwrap().kappa, 1.0);

        subset.retain_best_only();
        assert_eq!(subset.data().len(), 1);
        assert_eq!(subset.best_record(), Some(BestRecord::Grid(0)));
        assert_eq!(subset.best().unwrap().kappa, 1.0);
    }

    #[test]
    fn polish_record_can_be_best() {
        let set = training_set(1);
        let mut subset = Subset::full(&set);
        subset.reset_data(&set, 3, true);
        subset.set_best(BestRecord::Polish);
        assert!(subset.best().is_some());

        subset.retain_best_only();
        assert!(subset.polish().is_none());
        assert_eq!(subset.data().len(), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn set_best_rejects_missing_record() {
        let set = training_set(1);
        let mut subset = Subset::full(&set);
        subset.reset_data(&set, 2, false);
        subset.set_best(BestRecord::Grid(5));
    }

    #[test]
    fn removed_subsets_leave_the_arena() {
        let set = training_set(1);
        let mut arena = SubsetArena::new();
        let id = arena.insert(Subset::full(&set));
        assert!(arena.remove(id).is_some());
        assert!(!arena.contains(id));
        assert!(arena.is_empty());
    }
}
