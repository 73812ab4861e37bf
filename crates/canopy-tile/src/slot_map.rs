use crate::identity::TreeId;

/// Capacity-bounded open-addressing table of tree identities, one run of
/// `trees_per_cell` slots per cell.
///
/// Probing is strictly linear (+1, wrapping within the cell) from
/// `id % trees_per_cell`. The first tree to reach an empty slot claims it;
/// a tree that finds its own identity reuses that slot.
pub struct SlotMap {
    trees_per_cell: u32,
    slots: Vec<Option<TreeId>>,
    claimed: usize,
}

impl SlotMap {
    pub fn new(cell_count: u32, trees_per_cell: u32) -> Self {
        Self {
            trees_per_cell,
            slots: vec![None; cell_count as usize * trees_per_cell as usize],
            claimed: 0,
        }
    }

    pub fn trees_per_cell(&self) -> u32 {
        self.trees_per_cell
    }

    /// Total slots claimed across all cells.
    pub fn claimed(&self) -> usize {
        self.claimed
    }

    fn cell_slots(&self, cell: u32) -> Option<std::ops::Range<usize>> {
        let n = self.trees_per_cell as usize;
        let start = cell as usize * n;
        (start + n <= self.slots.len() && n > 0).then(|| start..start + n)
    }

    /// Stable slot of `id` within `cell`, claiming one if needed.
    /// Returns None when every slot in the cell belongs to another tree,
    /// or when `cell` is outside the map.
    pub fn resolve(&mut self, cell: u32, id: TreeId) -> Option<u32> {
        let range = self.cell_slots(cell)?;
        let n = self.trees_per_cell;
        let slots = &mut self.slots[range];

        let start = id % n;
        for step in 0..n {
            let slot = (start + step) % n;
            match slots[slot as usize] {
                Some(existing) if existing == id => return Some(slot),
                Some(_) => continue,
                None => {
                    slots[slot as usize] = Some(id);
                    self.claimed += 1;
                    return Some(slot);
                }
            }
        }
        None
    }

    /// Identity occupying a slot, if any.
    pub fn occupant(&self, cell: u32, slot: u32) -> Option<TreeId> {
        let range = self.cell_slots(cell)?;
        if slot >= self.trees_per_cell {
            return None;
        }
        self.slots[range][slot as usize]
    }

    /// Number of claimed slots in one cell.
    pub fn occupied_in_cell(&self, cell: u32) -> usize {
        self.cell_slots(cell)
            .map_or(0, |range| self.slots[range].iter().flatten().count())
    }
}
