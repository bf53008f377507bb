use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Placement strategy that drops mines, then numbers, then question and surprise cells on
/// uniformly random free coordinates, retrying on collisions.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomGridGenerator {
    seed: u64,
}

impl RandomGridGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl GridGenerator for RandomGridGenerator {
    fn generate(self, config: BoardConfig) -> CellGrid {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut kinds: Array2<Option<CellKind>> = Array2::default(config.size.ix());
        let mut free_cells = config.total_cells();

        free_cells -= place_randomly(&mut kinds, &mut rng, config.mines, free_cells, || {
            CellKind::Mine
        });

        let (rows, cols) = config.size;
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                if kinds[coords.ix()].is_some() {
                    continue;
                }
                let adjacent = kinds
                    .adjacent_cells(coords)
                    .filter(|&pos| matches!(kinds[pos.ix()], Some(CellKind::Mine)))
                    .count();
                if adjacent > 0 {
                    kinds[coords.ix()] = Some(CellKind::from_adjacent(adjacent as u8));
                    free_cells -= 1;
                }
            }
        }

        free_cells -= place_randomly(
            &mut kinds,
            &mut rng,
            config.question_cells,
            free_cells,
            || CellKind::Question,
        );
        place_randomly(
            &mut kinds,
            &mut rng,
            config.surprise_cells,
            free_cells,
            || CellKind::Surprise { operated: false },
        );

        let cells = kinds.map(|kind| Cell::new(kind.unwrap_or(CellKind::Empty)));
        CellGrid::from_cells(cells)
    }
}

/// Places up to `requested` cells on unset coordinates, returning how many were placed.
fn place_randomly(
    kinds: &mut Array2<Option<CellKind>>,
    rng: &mut SmallRng,
    requested: CellCount,
    free_cells: CellCount,
    make: impl Fn() -> CellKind,
) -> CellCount {
    let target = if requested > free_cells {
        log::warn!(
            "Board too crowded, requested {} cells but only {} are free",
            requested,
            free_cells
        );
        free_cells
    } else {
        requested
    };

    let (rows, cols) = kinds.dim();
    let mut placed = 0;
    let mut collisions = 0usize;
    while placed < target {
        let pos = [rng.random_range(0..rows), rng.random_range(0..cols)];
        if kinds[pos].is_some() {
            collisions += 1;
            continue;
        }
        kinds[pos] = Some(make());
        placed += 1;
    }
    if collisions > 0 {
        log::debug!("Placed {placed} cells after {collisions} collisions");
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(grid: &CellGrid, pred: impl Fn(CellKind) -> bool) -> usize {
        grid.coords().filter(|&c| pred(grid.cell_at(c).kind())).count()
    }

    #[test]
    fn generates_exact_special_counts() {
        for level in DifficultyLevel::ALL {
            let config = level.board_config();
            let grid = RandomGridGenerator::new(7).generate(config);

            assert_eq!(grid.size(), config.size);
            assert_eq!(count(&grid, CellKind::is_mine), config.mines as usize);
            assert_eq!(
                count(&grid, |k| k == CellKind::Question),
                config.question_cells as usize
            );
            assert_eq!(
                count(&grid, |k| matches!(k, CellKind::Surprise { .. })),
                config.surprise_cells as usize
            );
        }
    }

    #[test]
    fn numbers_match_adjacent_mines() {
        let grid = RandomGridGenerator::new(99).generate(DifficultyLevel::Medium.board_config());

        for coords in grid.coords() {
            let adjacent = Neighbors::new(coords, grid.size())
                .filter(|&pos| grid.cell_at(pos).is_mine())
                .count() as u8;
            match grid.cell_at(coords).kind() {
                CellKind::Number(n) => assert_eq!(n, adjacent),
                // specials only land on cells with no adjacent mines
                CellKind::Empty | CellKind::Question | CellKind::Surprise { .. } => {
                    assert_eq!(adjacent, 0)
                }
                CellKind::Mine => {}
            }
        }
    }

    #[test]
    fn same_seed_same_board() {
        let config = DifficultyLevel::Hard.board_config();
        let a = RandomGridGenerator::new(1234).generate(config);
        let b = RandomGridGenerator::new(1234).generate(config);

        assert_eq!(a, b);
    }

    #[test]
    fn generated_grid_starts_hidden() {
        let grid = RandomGridGenerator::new(3).generate(DifficultyLevel::Easy.board_config());

        assert_eq!(grid.revealed_count(), 0);
        assert_eq!(grid.flagged_count(), 0);
    }

    #[test]
    fn crowded_config_fills_what_fits() {
        let config = BoardConfig::new_unchecked((2, 2), 4, 3, 0);
        let grid = RandomGridGenerator::new(5).generate(config);

        assert_eq!(grid.mine_count(), 4);
        assert_eq!(count(&grid, |k| k == CellKind::Question), 0);
    }
}
