use std::collections::VecDeque;

use maze_crawl_core::{CellCoord, Direction, Grid, MazeSize};
use maze_crawl_system_maze_generation::{generate, MazeGenerator};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn every_small_size_connects_start_and_exit() {
    for size in 2..=41 {
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let grid = generate(size, &mut rng).expect("valid size");

            assert!(grid.is_open(grid.start()), "start closed for size {size}");
            assert!(grid.is_open(grid.exit()), "exit closed for size {size}");
            assert!(
                reachable(&grid, grid.start(), grid.exit()),
                "exit unreachable for size {size} seed {seed}",
            );
        }
    }
}

#[test]
fn odd_sizes_carve_a_spanning_tree_over_the_lattice() {
    for size in [3_u32, 5, 9, 21] {
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(size));
        let grid = generate(size, &mut rng).expect("valid size");
        let lattice = ((size as usize) + 1) / 2;
        let lattice_cells = lattice * lattice;

        assert_eq!(
            grid.open_count(),
            2 * lattice_cells - 1,
            "a perfect maze opens every lattice cell plus one passage per tree edge",
        );
    }
}

#[test]
fn even_sizes_add_only_the_exit_and_its_bridge() {
    for size in [2_u32, 4, 10, 12] {
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(size));
        let grid = generate(size, &mut rng).expect("valid size");
        let lattice = (size as usize) / 2;
        let lattice_cells = lattice * lattice;

        assert_eq!(grid.open_count(), 2 * lattice_cells - 1 + 2);
        assert!(grid.is_open(CellCoord::new(size - 2, size - 1)));
    }
}

#[test]
fn same_seed_produces_same_sequence_of_mazes() {
    let mut first = MazeGenerator::from_seed(0x5eed);
    let mut second = MazeGenerator::from_seed(0x5eed);
    let ten = MazeSize::new(10).expect("valid size");
    let twelve = ten.grown_by(2);

    assert_eq!(first.generate(ten), second.generate(ten));
    assert_eq!(first.generate(twelve), second.generate(twelve));
}

#[test]
fn generator_handles_large_mazes_without_recursion() {
    let mut generator = MazeGenerator::from_seed(11);
    let grid = generator.generate(MazeSize::new(501).expect("valid size"));

    assert!(reachable(&grid, grid.start(), grid.exit()));
}

proptest! {
    #[test]
    fn generated_mazes_are_always_solvable(size in 2_u32..64, seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = generate(size, &mut rng).expect("valid size");

        prop_assert_eq!(grid.size(), size);
        prop_assert!(grid.is_open(grid.start()));
        prop_assert!(grid.is_open(grid.exit()));
        prop_assert!(reachable(&grid, grid.start(), grid.exit()));
    }

    #[test]
    fn undersized_requests_are_rejected(size in 0_u32..2, seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        prop_assert!(generate(size, &mut rng).is_err());
    }
}

fn reachable(grid: &Grid, from: CellCoord, to: CellCoord) -> bool {
    let size = grid.size();
    let mut visited = vec![false; (size as usize) * (size as usize)];
    let index = |cell: CellCoord| (cell.row() as usize) * (size as usize) + cell.column() as usize;
    let mut frontier = VecDeque::from([from]);
    visited[index(from)] = true;

    while let Some(cell) = frontier.pop_front() {
        if cell == to {
            return true;
        }
        for direction in Direction::ALL {
            let next = cell.step_clamped(direction, size);
            if next != cell && grid.is_open(next) && !visited[index(next)] {
                visited[index(next)] = true;
                frontier.push_back(next);
            }
        }
    }

    false
}
