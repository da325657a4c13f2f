#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic maze generation system.
//!
//! Mazes are carved by a depth-first backtracker that moves two cells at a
//! time, leaving a wall cell between every pair of carved lattice cells. The
//! walk runs on an explicit stack so the largest mazes cannot exhaust the
//! thread stack; each frame owns its shuffled direction order, which keeps the
//! visiting order identical to the textbook recursive formulation.

use maze_crawl_core::{Cell, CellCoord, Direction, GenerationError, Grid, MazeSize};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded generator that owns the randomness used across levels.
#[derive(Clone, Debug)]
pub struct MazeGenerator {
    rng: ChaCha8Rng,
}

impl MazeGenerator {
    /// Creates a generator whose sequence of mazes is fixed by `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generates the next maze of the provided size.
    pub fn generate(&mut self, size: MazeSize) -> Grid {
        carve(size, &mut self.rng)
    }
}

/// Generates a solvable maze with side length `size`.
///
/// Fails with [`GenerationError::InvalidSize`] when `size` is below two.
pub fn generate<R>(size: u32, rng: &mut R) -> Result<Grid, GenerationError>
where
    R: Rng + ?Sized,
{
    let size = MazeSize::new(size)?;
    Ok(carve(size, rng))
}

/// Carves a maze of an already validated size.
///
/// The start (0,0) and exit (size-1,size-1) are always open. Even sizes put
/// the exit off the carving lattice, so the cell left of it is opened as well
/// to join it to the lattice cell diagonally above.
pub fn carve<R>(size: MazeSize, rng: &mut R) -> Grid
where
    R: Rng + ?Sized,
{
    let mut grid = Grid::walled(size);
    let side = size.get();
    let mut stack = vec![Frame::enter(grid.start(), &mut grid, rng)];

    while let Some(frame) = stack.last_mut() {
        let cell = frame.cell;
        let Some(direction) = frame.directions.next() else {
            let _ = stack.pop();
            continue;
        };

        let Some((between, candidate)) = lattice_step(cell, direction, side) else {
            continue;
        };

        if grid.cell(candidate) != Some(Cell::Wall) {
            continue;
        }

        grid.open(between);
        stack.push(Frame::enter(candidate, &mut grid, rng));
    }

    let start = grid.start();
    let exit = grid.exit();
    grid.open(start);
    grid.open(exit);
    if side % 2 == 0 {
        grid.open(CellCoord::new(side - 2, side - 1));
    }

    grid
}

#[derive(Debug)]
struct Frame {
    cell: CellCoord,
    directions: std::array::IntoIter<Direction, 4>,
}

impl Frame {
    fn enter<R>(cell: CellCoord, grid: &mut Grid, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        grid.open(cell);
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        Self {
            cell,
            directions: directions.into_iter(),
        }
    }
}

/// Returns the wall cell crossed and the lattice cell reached by a double step.
fn lattice_step(
    cell: CellCoord,
    direction: Direction,
    size: u32,
) -> Option<(CellCoord, CellCoord)> {
    let (dx, dy) = direction.offset();
    let column = i64::from(cell.column());
    let row = i64::from(cell.row());
    let target_column = column + 2 * i64::from(dx);
    let target_row = row + 2 * i64::from(dy);
    let bound = i64::from(size);

    if target_column < 0 || target_row < 0 || target_column >= bound || target_row >= bound {
        return None;
    }

    let between = CellCoord::new(
        u32::try_from(column + i64::from(dx)).ok()?,
        u32::try_from(row + i64::from(dy)).ok()?,
    );
    let target = CellCoord::new(
        u32::try_from(target_column).ok()?,
        u32::try_from(target_row).ok()?,
    );
    Some((between, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_step_stays_in_bounds() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(lattice_step(origin, Direction::Up, 5), None);
        assert_eq!(lattice_step(origin, Direction::Left, 5), None);
        assert_eq!(
            lattice_step(origin, Direction::Right, 5),
            Some((CellCoord::new(1, 0), CellCoord::new(2, 0)))
        );
        assert_eq!(
            lattice_step(CellCoord::new(2, 2), Direction::Down, 4),
            None,
            "double step would land on row 4 of a 4x4 grid",
        );
    }

    #[test]
    fn smallest_maze_bridges_start_to_exit() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let grid = generate(2, &mut rng).expect("size two is valid");

        assert!(grid.is_open(CellCoord::new(0, 0)));
        assert!(grid.is_open(CellCoord::new(0, 1)));
        assert!(grid.is_open(CellCoord::new(1, 1)));
        assert!(!grid.is_open(CellCoord::new(1, 0)));
    }

    #[test]
    fn undersized_requests_fail() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(
            generate(1, &mut rng),
            Err(GenerationError::InvalidSize { size: 1 })
        );
        assert_eq!(
            generate(0, &mut rng),
            Err(GenerationError::InvalidSize { size: 0 })
        );
    }
}
