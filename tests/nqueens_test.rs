#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::rc::Rc;

use kabocha_solver::branching::InDomainMin;
use kabocha_solver::branching::InputOrder;
use kabocha_solver::branching::InstantiateVariables;
use kabocha_solver::constraints::NotEqualWithOffset;
use kabocha_solver::monitors::SolutionCollector;
use kabocha_solver::variables::IntVar;
use kabocha_solver::Solver;
use kabocha_solver::SolverOptions;
use kabocha_solver::SolverState;
use kabocha_solver::TrailCompression;

/// One queen per column; `queens[i]` is the row of the queen in column `i`.
fn post_queens(solver: &mut Solver, n: i64) -> Vec<IntVar> {
    let queens: Vec<IntVar> = (0..n)
        .map(|column| solver.new_named_int_var(0, n - 1, format!("queen{column}")))
        .collect();
    for i in 0..n as usize {
        for j in (i + 1)..n as usize {
            let distance = (j - i) as i64;
            let _ = solver.add_constraint(Rc::new(NotEqualWithOffset::new(queens[i], queens[j], 0)));
            let _ = solver.add_constraint(Rc::new(NotEqualWithOffset::new(
                queens[i], queens[j], distance,
            )));
            let _ = solver.add_constraint(Rc::new(NotEqualWithOffset::new(
                queens[i],
                queens[j],
                -distance,
            )));
        }
    }
    queens
}

fn is_queens_solution(assignment: &kabocha_solver::Assignment, queens: &[IntVar]) -> bool {
    let rows: Vec<i64> = queens
        .iter()
        .map(|&queen| assignment.value(queen).expect("every queen is placed"))
        .collect();
    for i in 0..rows.len() {
        for j in (i + 1)..rows.len() {
            let distance = (j - i) as i64;
            if rows[i] == rows[j] || (rows[i] - rows[j]).abs() == distance {
                return false;
            }
        }
    }
    true
}

#[test]
fn four_queens_has_exactly_two_solutions() {
    let mut solver = Solver::new("4-queens");
    let queens = post_queens(&mut solver, 4);

    let collector = Rc::new(SolutionCollector::new(queens.clone()));
    let builder = Rc::new(InstantiateVariables::new(
        queens.clone(),
        InputOrder,
        InDomainMin,
    ));
    solver.new_search(builder, vec![Rc::clone(&collector) as _]);

    let mut solutions = 0;
    while solver.next_solution() {
        solutions += 1;
    }
    solver.end_search();

    assert_eq!(solutions, 2);
    assert_eq!(solver.solutions(), 2);
    assert!(solver.decisions() >= 4);
    assert_eq!(solver.state(), SolverState::OutsideSearch);

    assert_eq!(collector.solution_count(), 2);
    for solution in collector.solutions() {
        assert!(is_queens_solution(&solution, &queens));
    }
}

#[test]
fn six_queens_statistics_are_identical_across_trail_compression_modes() {
    let run = |compression: TrailCompression| {
        let mut solver = Solver::with_options(
            "6-queens",
            SolverOptions {
                trail_compression: compression,
                // A tiny block size so the search actually packs blocks.
                trail_block_size: 16,
                ..Default::default()
            },
        );
        let queens = post_queens(&mut solver, 6);
        let builder = Rc::new(InstantiateVariables::new(queens, InputOrder, InDomainMin));

        let mut solutions = 0;
        solver.new_search(builder, vec![]);
        while solver.next_solution() {
            solutions += 1;
        }
        solver.end_search();
        (
            solutions,
            solver.branches(),
            solver.fails(),
            solver.decisions(),
        )
    };

    let raw = run(TrailCompression::None);
    let zlib = run(TrailCompression::Zlib);

    assert_eq!(raw.0, 4, "6-queens has four solutions");
    assert_eq!(raw, zlib);
}
