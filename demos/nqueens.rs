//! Places N queens on an N x N board so that no two attack each other.
//!
//! One variable per column holds the queen's row; columns are pairwise
//! distinct and the diagonal attacks are excluded with shifted
//! disequalities.

use anyhow::bail;
use clap::Parser;
use clap::ValueEnum;
use ozkin::branching::distribute;
use ozkin::branching::Filter;
use ozkin::branching::ValueSelection;
use ozkin::branching::VariableOrdering;
use ozkin::search::DepthFirst;
use ozkin::statistics::log_statistic;
use ozkin::statistics::log_statistic_postfix;
use ozkin::Domain;
use ozkin::Space;
use ozkin::VarName;

#[derive(Clone, Copy, Default, ValueEnum)]
enum SearchStrategy {
    #[default]
    FailFirst,
    Naive,
    Split,
    Random,
}

#[derive(Parser)]
#[command(about = "Solve the N-queens placement problem")]
struct Args {
    /// Board size.
    #[arg(long, default_value_t = 8)]
    size: usize,

    /// Count all solutions instead of printing the first.
    #[arg(long)]
    all: bool,

    /// Variable and value selection used for branching.
    #[arg(long, value_enum, default_value = "fail-first")]
    strategy: SearchStrategy,

    /// Seed for the random strategy.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.size == 0 {
        bail!("the board must have at least one column");
    }
    let n = args.size;

    let mut space = Space::new();
    let columns: Vec<VarName> = (1..=n)
        .map(|i| space.decl(format!("q{i}"), Domain::interval(1, n as u32)))
        .collect();
    let _ = space.distinct(columns.iter());
    for i in 0..n {
        for j in 0..i {
            let offset = space.konst((i - j) as u32);
            let up = space.plus(&columns[i], &offset, ());
            let _ = space.neq(up, &columns[j]);
            let down = space.plus(&columns[j], &offset, ());
            let _ = space.neq(down, &columns[i]);
        }
    }

    match args.strategy {
        SearchStrategy::FailFirst => distribute::fail_first(&mut space, columns.iter()),
        SearchStrategy::Naive => distribute::naive(&mut space, columns.iter()),
        SearchStrategy::Split => distribute::split(&mut space, columns.iter()),
        SearchStrategy::Random => distribute::generic(
            &mut space,
            columns.iter(),
            Filter::Undetermined,
            VariableOrdering::Size,
            ValueSelection::random(args.seed),
        ),
    }

    let mut search = DepthFirst::new(space);
    if args.all {
        let count = search.by_ref().count();
        println!("{count} solutions for {n}-queens");
        log_statistic("solutionsFound", count);
    } else {
        match search.next_solution() {
            Some(solution) => {
                for i in 1..=n {
                    let row = solution
                        .int(&format!("q{i}"))
                        .expect("all queens are placed in a solution");
                    let mut line = String::with_capacity(2 * n);
                    for column in 1..=(n as u32) {
                        line.push(if column == row { 'Q' } else { '.' });
                        line.push(' ');
                    }
                    println!("{line}");
                }
                log_statistic("solutionsFound", 1);
            }
            None => {
                println!("no solution for {n}-queens");
                log_statistic("solutionsFound", 0);
            }
        }
    }
    log_statistic_postfix();
    Ok(())
}
