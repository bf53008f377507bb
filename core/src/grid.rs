use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::ops::Index;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// A cell that became revealed during one reveal action, in reveal order.
pub type RevealedCell = (Coord2, CellKind);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealReport {
    pub revealed: Vec<RevealedCell>,
}

impl RevealReport {
    pub fn has_update(&self) -> bool {
        !self.revealed.is_empty()
    }

    pub fn mines_hit(&self) -> usize {
        self.revealed
            .iter()
            .filter(|(_, kind)| kind.is_mine())
            .count()
    }

    pub fn safe_cells(&self) -> usize {
        self.revealed.len() - self.mines_hit()
    }

    /// Newly revealed question/surprise cells.
    pub fn interactions(&self) -> impl Iterator<Item = (Coord2, InteractionKind)> + '_ {
        self.revealed
            .iter()
            .filter_map(|&(coords, kind)| kind.interaction().map(|k| (coords, k)))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Placed { on_mine: bool },
    Removed { on_mine: bool },
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// A `rows x cols` board of typed cells. Generated once per match and mutated in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    cells: Array2<Cell>,
    mine_count: CellCount,
}

impl CellGrid {
    pub(crate) fn from_cells(cells: Array2<Cell>) -> Self {
        let mine_count = cells
            .iter()
            .filter(|cell| cell.is_mine())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        Self { cells, mine_count }
    }

    /// Builds a grid with special cells at explicit coordinates; every other cell becomes a
    /// number or empty cell depending on its adjacent mines.
    pub fn from_layout(
        size: Coord2,
        mines: &[Coord2],
        questions: &[Coord2],
        surprises: &[Coord2],
    ) -> Result<Self> {
        let mut kinds: Array2<Option<CellKind>> = Array2::default(size.ix());

        let placements = mines
            .iter()
            .map(|&c| (c, CellKind::Mine))
            .chain(questions.iter().map(|&c| (c, CellKind::Question)))
            .chain(
                surprises
                    .iter()
                    .map(|&c| (c, CellKind::Surprise { operated: false })),
            );
        for (coords, kind) in placements {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            let slot = &mut kinds[coords.ix()];
            if slot.is_some() {
                return Err(GameError::InvalidCoords);
            }
            *slot = Some(kind);
        }

        let cells = Array2::from_shape_fn(size.ix(), |(row, col)| {
            let coords = (row as Coord, col as Coord);
            let kind = kinds[coords.ix()].unwrap_or_else(|| {
                let adjacent = kinds
                    .adjacent_cells(coords)
                    .filter(|&pos| matches!(kinds[pos.ix()], Some(CellKind::Mine)))
                    .count();
                CellKind::from_adjacent(adjacent as u8)
            });
            Cell::new(kind)
        });

        Ok(Self::from_cells(cells))
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.ix()]
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_revealed()).count()
    }

    pub fn flagged_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_flagged()).count()
    }

    pub fn mines_handled(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_handled_mine()).count()
    }

    /// Every mine is either revealed or flagged.
    pub fn all_mines_handled(&self) -> bool {
        self.cells
            .iter()
            .filter(|cell| cell.is_mine())
            .all(|cell| cell.is_handled_mine())
    }

    /// Every non-mine cell is revealed. Informational only; it does not end a match.
    pub fn is_solved(&self) -> bool {
        self.cells
            .iter()
            .filter(|cell| !cell.is_mine())
            .all(|cell| cell.is_revealed())
    }

    pub fn hidden_mines(&self) -> Vec<Coord2> {
        self.coords()
            .filter(|&coords| {
                let cell = self.cell_at(coords);
                cell.is_mine() && !cell.is_revealed()
            })
            .collect()
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = self.size();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    /// Reveals `coords`, flooding through empty and special cells.
    ///
    /// Returns every newly revealed cell; an already revealed start cell yields an empty report.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealReport> {
        let coords = self.validate_coords(coords)?;
        let start = self.cells[coords.ix()];
        if start.is_revealed() {
            return Ok(RevealReport::default());
        }

        if start.kind().is_flood_passable() {
            Ok(self.flood_reveal(coords))
        } else {
            Ok(RevealReport {
                revealed: vec![self.reveal_single_cell(coords)],
            })
        }
    }

    fn flood_reveal(&mut self, start: Coord2) -> RevealReport {
        let mut report = RevealReport::default();
        let mut visited = BTreeSet::from([start]);
        let mut to_visit = VecDeque::from([start]);

        while let Some(visit_coords) = to_visit.pop_front() {
            let revealed = self.reveal_single_cell(visit_coords);
            report.revealed.push(revealed);

            if !revealed.1.is_flood_passable() {
                continue;
            }

            for pos in self.cells.adjacent_cells(visit_coords) {
                let neighbor = self.cells[pos.ix()];
                if neighbor.is_mine() || neighbor.is_revealed() {
                    continue;
                }
                if visited.insert(pos) {
                    to_visit.push_back(pos);
                }
            }
        }

        report
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealedCell {
        let cell = &mut self.cells[coords.ix()];
        cell.reveal();
        (coords, cell.kind())
    }

    /// Reveals a single hidden cell without flooding. Returns whether anything changed.
    pub fn reveal_quiet(&mut self, coords: Coord2) -> Result<bool> {
        let coords = self.validate_coords(coords)?;
        if self.cells[coords.ix()].is_revealed() {
            return Ok(false);
        }
        self.reveal_single_cell(coords);
        Ok(true)
    }

    /// Reveals the 3x3 block centered at `center` (clipped to the grid) without flooding.
    pub fn reveal_area(&mut self, center: Coord2) -> Result<RevealReport> {
        let center = self.validate_coords(center)?;
        let mut report = RevealReport::default();
        let area = std::iter::once(center).chain(self.cells.adjacent_cells(center));
        for pos in area {
            if !self.cells[pos.ix()].is_revealed() {
                report.revealed.push(self.reveal_single_cell(pos));
            }
        }
        Ok(report)
    }

    /// Reveals the whole grid without flooding.
    pub fn reveal_all(&mut self) -> RevealReport {
        let mut report = RevealReport::default();
        for coords in self.coords() {
            if !self.cells[coords.ix()].is_revealed() {
                report.revealed.push(self.reveal_single_cell(coords));
            }
        }
        report
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.ix()];
        if cell.is_revealed() {
            return Ok(FlagOutcome::NoChange);
        }

        let on_mine = cell.is_mine();
        Ok(if cell.is_flagged() {
            cell.set_flag(false);
            FlagOutcome::Removed { on_mine }
        } else {
            cell.set_flag(true);
            FlagOutcome::Placed { on_mine }
        })
    }

    /// Latches a revealed, not yet operated surprise cell. Returns whether it was latched.
    pub fn operate_surprise(&mut self, coords: Coord2) -> Result<bool> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.ix()];
        match cell.kind() {
            CellKind::Surprise { operated: false } if cell.is_revealed() => {
                cell.mark_operated();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn symbols(&self) -> Array2<char> {
        self.cells.map(|cell| cell.symbol())
    }
}

impl Index<Coord2> for CellGrid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.ix()]
    }
}

impl fmt::Display for CellGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            let line: String = row.iter().map(|cell| cell.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: Coord2, mines: &[Coord2]) -> CellGrid {
        CellGrid::from_layout(size, mines, &[], &[]).unwrap()
    }

    #[test]
    fn layout_computes_numbers() {
        let grid = grid((3, 3), &[(0, 0)]);

        assert_eq!(grid.cell_at((0, 0)).kind(), CellKind::Mine);
        assert_eq!(grid.cell_at((1, 1)).kind(), CellKind::Number(1));
        assert_eq!(grid.cell_at((2, 2)).kind(), CellKind::Empty);
        assert_eq!(grid.mine_count(), 1);
    }

    #[test]
    fn layout_rejects_overlap_and_out_of_bounds() {
        assert_eq!(
            CellGrid::from_layout((3, 3), &[(1, 1)], &[(1, 1)], &[]),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(
            CellGrid::from_layout((3, 3), &[(3, 0)], &[], &[]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn flood_stops_at_numbers_and_skips_mines() {
        // column 3 is all mines, column 2 numbers, columns 0..2 empty
        let mines = [(0, 3), (1, 3), (2, 3), (3, 3)];
        let mut grid = grid((4, 4), &mines);

        let report = grid.reveal((0, 0)).unwrap();

        assert_eq!(report.revealed.len(), 12);
        assert_eq!(report.mines_hit(), 0);
        for row in 0..4 {
            assert!(grid.cell_at((row, 2)).is_revealed());
            assert!(!grid.cell_at((row, 3)).is_revealed());
        }
    }

    #[test]
    fn flood_visits_each_cell_once() {
        let mut grid = grid((5, 5), &[]);

        let report = grid.reveal((2, 2)).unwrap();

        let unique: BTreeSet<_> = report.revealed.iter().map(|(c, _)| *c).collect();
        assert_eq!(report.revealed.len(), 25);
        assert_eq!(unique.len(), 25);
        assert!(grid.is_solved());
    }

    #[test]
    fn flood_passes_through_special_cells() {
        let mut grid = CellGrid::from_layout((1, 5), &[(0, 4)], &[(0, 1)], &[(0, 2)]).unwrap();

        let report = grid.reveal((0, 0)).unwrap();

        let interactions: Vec<_> = report.interactions().collect();
        assert_eq!(
            interactions,
            vec![
                ((0, 1), InteractionKind::Question),
                ((0, 2), InteractionKind::Surprise)
            ]
        );
        assert_eq!(grid.cell_at((0, 3)).kind(), CellKind::Number(1));
        assert!(grid.cell_at((0, 3)).is_revealed());
        assert!(!grid.cell_at((0, 4)).is_revealed());
    }

    #[test]
    fn number_reveals_single_cell() {
        let mut grid = grid((3, 3), &[(0, 0)]);

        let report = grid.reveal((0, 1)).unwrap();

        assert_eq!(report.revealed, vec![((0, 1), CellKind::Number(1))]);
        assert_eq!(grid.revealed_count(), 1);
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut grid = grid((2, 2), &[(0, 0)]);

        assert_eq!(grid.reveal((0, 0)).unwrap().mines_hit(), 1);
        assert!(!grid.reveal((0, 0)).unwrap().has_update());
    }

    #[test]
    fn flood_clears_flags_on_revealed_cells() {
        let mut grid = grid((3, 3), &[]);
        grid.toggle_flag((2, 2)).unwrap();

        grid.reveal((0, 0)).unwrap();

        assert!(grid.cell_at((2, 2)).is_revealed());
        assert!(!grid.cell_at((2, 2)).is_flagged());
    }

    #[test]
    fn flag_toggle_reports_mine_state() {
        let mut grid = grid((2, 2), &[(0, 0)]);

        assert_eq!(
            grid.toggle_flag((0, 0)).unwrap(),
            FlagOutcome::Placed { on_mine: true }
        );
        assert_eq!(
            grid.toggle_flag((0, 0)).unwrap(),
            FlagOutcome::Removed { on_mine: true }
        );
        assert_eq!(
            grid.toggle_flag((1, 1)).unwrap(),
            FlagOutcome::Placed { on_mine: false }
        );
    }

    #[test]
    fn revealed_cell_refuses_flag() {
        let mut grid = grid((2, 2), &[(0, 0)]);
        grid.reveal((1, 1)).unwrap();

        assert_eq!(grid.toggle_flag((1, 1)).unwrap(), FlagOutcome::NoChange);
        assert!(!grid.cell_at((1, 1)).is_flagged());
    }

    #[test]
    fn all_mines_handled_with_flags() {
        let mut grid = grid((3, 3), &[(0, 0), (2, 2)]);
        assert!(!grid.all_mines_handled());

        grid.toggle_flag((0, 0)).unwrap();
        grid.reveal((2, 2)).unwrap();

        assert!(grid.all_mines_handled());
        assert_eq!(grid.mines_handled(), 2);
        assert!(!grid.is_solved());
    }

    #[test]
    fn reveal_area_clips_at_edges() {
        let mut grid = grid((4, 4), &[(3, 3)]);

        let report = grid.reveal_area((0, 0)).unwrap();

        assert_eq!(report.revealed.len(), 4);
        assert!(grid.cell_at((1, 1)).is_revealed());
        assert!(!grid.cell_at((2, 2)).is_revealed());
    }

    #[test]
    fn surprise_operates_once() {
        let mut grid = CellGrid::from_layout((2, 2), &[], &[], &[(0, 0)]).unwrap();
        assert!(!grid.operate_surprise((0, 0)).unwrap());

        grid.reveal_quiet((0, 0)).unwrap();

        assert!(grid.operate_surprise((0, 0)).unwrap());
        assert!(!grid.operate_surprise((0, 0)).unwrap());
    }

    #[test]
    fn display_renders_symbols() {
        let mut grid = grid((2, 2), &[(0, 0)]);
        grid.toggle_flag((0, 0)).unwrap();
        grid.reveal((1, 1)).unwrap();

        assert_eq!(grid.to_string(), "F#\n#1\n");
    }
}
