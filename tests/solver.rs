//! End-to-end solver scenarios driven through the public API.

use ozkin::branching::distribute;
use ozkin::search::solve_for_variables;
use ozkin::search::BranchAndBound;
use ozkin::search::DepthFirst;
use ozkin::search::SearchStatus;
use ozkin::CmpOp;
use ozkin::Domain;
use ozkin::Space;

#[test]
fn simple_plus_solves_at_the_root() {
    let mut space = Space::new();
    let _ = space.num("x", 3);
    let _ = space.num("z", 10);
    let _ = space.decl("y", None);
    let _ = space.plus("x", "y", "z");

    let mut search = DepthFirst::new(space);
    let solution = search.next_solution().expect("3 + y = 10 is satisfiable");
    assert!(solution.is_total());
    assert_eq!(solution.int("x"), Some(3));
    assert_eq!(solution.int("y"), Some(7));
    assert_eq!(solution.int("z"), Some(10));
    assert!(!search.more());
}

#[test]
fn infeasible_plus_ends_without_solutions() {
    let mut space = Space::new();
    let _ = space.num("x", 13);
    let _ = space.num("z", 10);
    let _ = space.decl("y", None);
    let _ = space.plus("x", "y", "z");

    let mut search = DepthFirst::new(space);
    assert_eq!(search.next_solution(), None);
    assert_eq!(search.status(), SearchStatus::End);
    assert!(!search.more());
}

#[test]
fn distinct_sum_holds_in_every_solution() {
    let mut space = Space::new();
    let _ = space.decl_all(["a", "b"], Domain::interval(0, 10));
    let _ = space.distinct(["a", "b"]);
    let _ = space.plus("a", "b", "c");
    distribute::fail_first(&mut space, ["a", "b", "c"]);

    let solutions: Vec<_> = DepthFirst::new(space).collect();
    // 11 * 11 pairs minus the 11 with a == b.
    assert_eq!(solutions.len(), 110);
    for solution in &solutions {
        let a = solution.int("a").expect("a is determined");
        let b = solution.int("b").expect("b is determined");
        let c = solution.int("c").expect("c is determined");
        assert_ne!(a, b);
        assert_eq!(a + b, c);
    }
}

#[test]
fn send_more_money_has_the_unique_solution() {
    let mut space = Space::new();
    let letters = ["s", "e", "n", "d", "m", "o", "r", "y"];
    let _ = space.decl_all(letters, Domain::interval(0, 9));
    // Leading digits are non-zero.
    let _ = space.decl("s", Domain::interval(1, 9));
    let _ = space.decl("m", Domain::interval(1, 9));
    let _ = space.distinct(letters);

    let send_more = space.wsum(
        &[1000, 100, 10, 1, 1000, 100, 10, 1],
        ["s", "e", "n", "d", "m", "o", "r", "e"],
        (),
    );
    let money = space.wsum(
        &[10000, 1000, 100, 10, 1],
        ["m", "o", "n", "e", "y"],
        (),
    );
    let _ = space.eq(send_more, money);
    distribute::fail_first(&mut space, letters);

    let mut search = DepthFirst::new(space);
    let solution = search.next_solution().expect("SEND+MORE=MONEY is solvable");
    assert_eq!(solution.int("s"), Some(9));
    assert_eq!(solution.int("e"), Some(5));
    assert_eq!(solution.int("n"), Some(6));
    assert_eq!(solution.int("d"), Some(7));
    assert_eq!(solution.int("m"), Some(1));
    assert_eq!(solution.int("o"), Some(0));
    assert_eq!(solution.int("r"), Some(8));
    assert_eq!(solution.int("y"), Some(2));
    // The puzzle has exactly one solution.
    assert_eq!(search.next_solution(), None);
}

#[test]
fn reified_lt_fixed_false_forces_gte() {
    let mut space = Space::new();
    let _ = space.decl("x", Domain::interval(1, 10));
    let _ = space.decl("y", Domain::interval(5, 6));
    let _ = space.num("z", 0);
    let _ = space.reified(CmpOp::Lt, "x", "y", "z");
    distribute::fail_first(&mut space, ["x", "y"]);

    let solutions: Vec<_> = DepthFirst::new(space).collect();
    // y = 5 leaves x in [5, 10]; y = 6 leaves x in [6, 10].
    assert_eq!(solutions.len(), 11);
    for solution in &solutions {
        let x = solution.int("x").expect("x is determined");
        let y = solution.int("y").expect("y is determined");
        assert!(x >= y);
        assert_eq!(solution.int("z"), Some(0));
    }
}

#[test]
fn eight_queens_has_ninety_two_solutions() {
    let mut space = Space::new();
    let rows: Vec<String> = (1..=8).map(|i| format!("r{i}")).collect();
    let _ = space.decl_all(rows.iter().map(String::as_str), Domain::interval(1, 8));
    let _ = space.distinct(rows.iter().map(String::as_str));
    for i in 0..8 {
        for j in 0..i {
            let offset = space.konst((i - j) as u32);
            // No two queens share a diagonal in either direction.
            let up = space.plus(rows[i].as_str(), &offset, ());
            let _ = space.neq(up, rows[j].as_str());
            let down = space.plus(rows[j].as_str(), &offset, ());
            let _ = space.neq(down, rows[i].as_str());
        }
    }
    distribute::fail_first(&mut space, rows.iter().map(String::as_str));

    let mut search = DepthFirst::new(space);
    let first = search.next_solution().expect("8-queens is solvable");
    let placement: Vec<u32> = (1..=8)
        .map(|i| first.int(&format!("r{i}")).expect("rows are determined"))
        .collect();
    for i in 0..8 {
        for j in 0..i {
            assert_ne!(placement[i], placement[j]);
            let gap = (i - j) as u32;
            assert_ne!(placement[i] + gap, placement[j]);
            assert_ne!(placement[j] + gap, placement[i]);
        }
    }

    let remaining = search.count();
    assert_eq!(1 + remaining, 92);
}

#[test]
fn branch_and_bound_maximises_the_sum() {
    let mut space = Space::new();
    let _ = space.decl_all(["x", "y", "a"], Domain::interval(1, 5));
    let _ = space.plus("x", "y", "z");
    let _ = space.neq("x", "a");
    distribute::fail_first(&mut space, ["x", "y", "a"]);

    let search = BranchAndBound::new(space, |child, best| {
        let bound = best.int("z").expect("z is determined in every solution");
        let bound = child.konst(bound);
        let _ = child.gt("z", bound);
    });
    let best = search.run().expect("the problem is satisfiable");
    assert_eq!(best.int("z"), Some(10));
}

#[test]
fn solved_test_over_named_variables_leaves_others_open() {
    let mut space = Space::new();
    let _ = space.decl("pick", Domain::interval(0, 1));
    let _ = space.decl("free", Domain::interval(0, 100));
    distribute::naive(&mut space, ["pick"]);

    let solutions: Vec<_> =
        DepthFirst::with_solved_test(space, solve_for_variables(["pick"])).collect();
    assert_eq!(solutions.len(), 2);
    for solution in &solutions {
        assert!(!solution.is_total());
        assert!(solution.int("pick").is_some());
        assert_eq!(solution.int("free"), None);
    }
}

#[test]
fn injected_scripts_build_the_same_problem() {
    let mut space = Space::new();
    space.inject(|space| {
        let _ = space.decl_all(["a", "b"], Domain::interval(0, 4));
        let _ = space.lt("a", "b");
    });
    distribute::naive(&mut space, ["a", "b"]);
    let solutions: Vec<_> = DepthFirst::new(space).collect();
    // Pairs with a < b over [0, 4].
    assert_eq!(solutions.len(), 10);
}
