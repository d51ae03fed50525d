//! Grid store - authoritative map of which cell holds what.

use crate::components::{Cell, CellRecord};
use crate::error::Rejection;
use retoia_logic::catalog::EntityKind;
use retoia_logic::economy::Occupancy;

/// Fixed-size square grid of optional occupants.
#[derive(Debug, Clone)]
pub struct GridStore {
    size: u32,
    cells: Vec<Option<CellRecord>>,
}

impl GridStore {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cells: vec![None; (size as usize) * (size as usize)],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x < self.size && cell.z < self.size
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.z as usize * self.size as usize + cell.x as usize)
    }

    fn cell_at(&self, index: usize) -> Cell {
        let size = self.size as usize;
        Cell::new((index % size) as u32, (index / size) as u32)
    }

    pub fn occupant_at(&self, cell: Cell) -> Option<CellRecord> {
        self.index(cell).and_then(|i| self.cells[i])
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupant_at(cell).is_some()
    }

    /// Check whether `place` would succeed without touching anything.
    pub fn check_placeable(&self, cell: Cell) -> Result<Option<CellRecord>, Rejection> {
        let index = self.index(cell).ok_or(Rejection::OutOfBounds(cell))?;
        match self.cells[index] {
            None => Ok(None),
            Some(existing)
                if existing.kind.is_replaceable()
                    && !existing.permanent
                    && existing.is_anchor_of(cell) =>
            {
                Ok(Some(existing))
            }
            Some(_) => Err(Rejection::OccupiedCell(cell)),
        }
    }

    /// Put `kind` on an empty cell, or over a replaceable walkway.
    /// Returns the replaced record, if any.
    pub fn place(
        &mut self,
        cell: Cell,
        kind: EntityKind,
        permanent: bool,
    ) -> Result<Option<CellRecord>, Rejection> {
        let replaced = self.check_placeable(cell)?;
        if let Some(index) = self.index(cell) {
            self.cells[index] = Some(CellRecord::new(kind, permanent, cell));
        }
        Ok(replaced)
    }

    /// Clear a cell. Shadow cells resolve to their anchor, and the whole
    /// footprint is cleared. Permanent occupants refuse.
    pub fn remove(&mut self, cell: Cell) -> Result<CellRecord, Rejection> {
        let index = self.index(cell).ok_or(Rejection::OutOfBounds(cell))?;
        let record = self.cells[index].ok_or(Rejection::Empty(cell))?;
        let anchor = record.anchor;
        let anchor_record = self.occupant_at(anchor).unwrap_or(record);

        if anchor_record.permanent {
            log::warn!(
                "Refusing to remove permanent {} at {}",
                anchor_record.kind.name(),
                anchor
            );
            return Err(Rejection::Permanent(cell));
        }

        for slot in self.cells.iter_mut() {
            if slot.is_some_and(|r| r.anchor == anchor) {
                *slot = None;
            }
        }
        Ok(anchor_record)
    }

    /// Place a multi-cell decoration. The anchor gets the full record; the
    /// surrounding square of `radius` cells gets shadow records only where
    /// currently empty. Returns the number of shadow cells written.
    pub fn footprint_place(
        &mut self,
        anchor: Cell,
        radius: u32,
        kind: EntityKind,
        permanent: bool,
    ) -> Result<usize, Rejection> {
        let anchor_index = self.index(anchor).ok_or(Rejection::OutOfBounds(anchor))?;
        if self.cells[anchor_index].is_some() {
            return Err(Rejection::OccupiedCell(anchor));
        }
        self.cells[anchor_index] = Some(CellRecord::new(kind, permanent, anchor));

        let last = self.size - 1;
        let xs = anchor.x.saturating_sub(radius)..=anchor.x.saturating_add(radius).min(last);
        let zs = anchor.z.saturating_sub(radius)..=anchor.z.saturating_add(radius).min(last);
        let mut shadows = 0;
        for x in xs {
            for z in zs.clone() {
                let cell = Cell::new(x, z);
                if cell == anchor {
                    continue;
                }
                let Some(index) = self.index(cell) else {
                    continue;
                };
                if self.cells[index].is_none() {
                    self.cells[index] = Some(CellRecord::new(kind, permanent, anchor));
                    shadows += 1;
                }
            }
        }
        Ok(shadows)
    }

    /// Anchor cells only; shadows are skipped so footprints count once.
    pub fn anchors(&self) -> impl Iterator<Item = (Cell, CellRecord)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, slot)| {
            let cell = self.cell_at(i);
            slot.filter(|r| r.is_anchor_of(cell)).map(|r| (cell, r))
        })
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| self.cell_at(i))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    /// Drop everything the player built, keeping permanent content.
    pub fn clear_non_permanent(&mut self) {
        for slot in self.cells.iter_mut() {
            if slot.is_some_and(|r| !r.permanent) {
                *slot = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|slot| *slot = None);
    }
}

impl Occupancy for GridStore {
    fn size(&self) -> u32 {
        self.size
    }

    fn kind_at(&self, x: u32, z: u32) -> Option<EntityKind> {
        self.occupant_at(Cell::new(x, z)).map(|r| r.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_on_empty_and_occupied() {
        let mut grid = GridStore::new(5);
        let cell = Cell::new(1, 1);
        assert_eq!(grid.place(cell, EntityKind::House, false), Ok(None));
        assert_eq!(
            grid.place(cell, EntityKind::Tower, false),
            Err(Rejection::OccupiedCell(cell))
        );
        assert_eq!(grid.occupant_at(cell).map(|r| r.kind), Some(EntityKind::House));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = GridStore::new(3);
        let cell = Cell::new(3, 0);
        assert_eq!(
            grid.place(cell, EntityKind::House, false),
            Err(Rejection::OutOfBounds(cell))
        );
        assert_eq!(grid.occupant_at(cell), None);
    }

    #[test]
    fn test_roads_are_replaceable() {
        let mut grid = GridStore::new(5);
        let cell = Cell::new(2, 2);
        grid.place(cell, EntityKind::Road, false).unwrap();
        let replaced = grid.place(cell, EntityKind::House, false).unwrap();
        assert_eq!(replaced.map(|r| r.kind), Some(EntityKind::Road));
        assert_eq!(grid.occupant_at(cell).map(|r| r.kind), Some(EntityKind::House));
    }

    #[test]
    fn test_permanent_road_is_not_replaceable() {
        let mut grid = GridStore::new(5);
        let cell = Cell::new(2, 2);
        grid.place(cell, EntityKind::Road, true).unwrap();
        assert_eq!(
            grid.place(cell, EntityKind::House, false),
            Err(Rejection::OccupiedCell(cell))
        );
    }

    #[test]
    fn test_remove_states() {
        let mut grid = GridStore::new(5);
        let cell = Cell::new(0, 0);
        assert_eq!(grid.remove(cell), Err(Rejection::Empty(cell)));

        grid.place(cell, EntityKind::House, false).unwrap();
        assert_eq!(grid.remove(cell).map(|r| r.kind), Ok(EntityKind::House));
        assert!(!grid.is_occupied(cell));

        grid.place(cell, EntityKind::Rock, true).unwrap();
        assert_eq!(grid.remove(cell), Err(Rejection::Permanent(cell)));
        assert!(grid.is_occupied(cell));
    }

    #[test]
    fn test_footprint_first_writer_wins() {
        let mut grid = GridStore::new(6);
        grid.place(Cell::new(2, 1), EntityKind::House, false).unwrap();

        let shadows = grid
            .footprint_place(Cell::new(2, 2), 1, EntityKind::Tree, true)
            .unwrap();
        // 8 surrounding cells, one already taken by the house.
        assert_eq!(shadows, 7);
        assert_eq!(
            grid.occupant_at(Cell::new(2, 1)).map(|r| r.kind),
            Some(EntityKind::House)
        );
        let shadow = grid.occupant_at(Cell::new(3, 3)).unwrap();
        assert_eq!(shadow.anchor, Cell::new(2, 2));
        assert!(shadow.permanent);
    }

    #[test]
    fn test_footprint_clips_to_grid() {
        let mut grid = GridStore::new(4);
        let shadows = grid
            .footprint_place(Cell::new(0, 0), 1, EntityKind::Tree, true)
            .unwrap();
        assert_eq!(shadows, 3);

        let mut grid = GridStore::new(3);
        let shadows = grid
            .footprint_place(Cell::new(1, 1), u32::MAX, EntityKind::Rock, true)
            .unwrap();
        assert_eq!(shadows, 8);
    }

    #[test]
    fn test_footprint_rejects_occupied_anchor() {
        let mut grid = GridStore::new(4);
        grid.place(Cell::new(1, 1), EntityKind::House, false).unwrap();
        assert_eq!(
            grid.footprint_place(Cell::new(1, 1), 1, EntityKind::Tree, true),
            Err(Rejection::OccupiedCell(Cell::new(1, 1)))
        );
    }

    #[test]
    fn test_shadow_removal_acts_on_anchor() {
        let mut grid = GridStore::new(6);
        grid.footprint_place(Cell::new(2, 2), 1, EntityKind::Rock, false)
            .unwrap();
        let removed = grid.remove(Cell::new(3, 3)).unwrap();
        assert_eq!(removed.anchor, Cell::new(2, 2));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_permanent_shadow_refuses_removal() {
        let mut grid = GridStore::new(6);
        grid.footprint_place(Cell::new(2, 2), 1, EntityKind::Tree, true)
            .unwrap();
        assert_eq!(
            grid.remove(Cell::new(1, 1)),
            Err(Rejection::Permanent(Cell::new(1, 1)))
        );
        assert_eq!(grid.occupied_count(), 9);
    }

    #[test]
    fn test_anchors_skip_shadows() {
        let mut grid = GridStore::new(6);
        grid.footprint_place(Cell::new(2, 2), 1, EntityKind::Tree, true)
            .unwrap();
        grid.place(Cell::new(5, 5), EntityKind::House, false).unwrap();
        let anchors: Vec<_> = grid.anchors().map(|(c, _)| c).collect();
        assert_eq!(anchors, vec![Cell::new(2, 2), Cell::new(5, 5)]);
    }

    #[test]
    fn test_clear_non_permanent_keeps_scenery() {
        let mut grid = GridStore::new(4);
        grid.place(Cell::new(0, 0), EntityKind::Rock, true).unwrap();
        grid.place(Cell::new(1, 1), EntityKind::House, false).unwrap();
        grid.clear_non_permanent();
        assert!(grid.is_occupied(Cell::new(0, 0)));
        assert!(!grid.is_occupied(Cell::new(1, 1)));
        assert_eq!(grid.empty_cells().count(), 15);
    }
}
