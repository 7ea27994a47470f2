//! Solves the classic SEND + MORE = MONEY cryptarithm.
//!
//! Eight distinct digits, with S and M non-zero, such that
//! `SEND + MORE = MONEY`.

use anyhow::Context;
use clap::Parser;
use ozkin::branching::distribute;
use ozkin::search::DepthFirst;
use ozkin::statistics::log_statistic;
use ozkin::statistics::log_statistic_postfix;
use ozkin::Domain;
use ozkin::Space;

#[derive(Parser)]
#[command(about = "Solve SEND + MORE = MONEY")]
struct Args {
    /// Enumerate every solution instead of stopping at the first.
    #[arg(long)]
    all: bool,
}

const LETTERS: [&str; 8] = ["s", "e", "n", "d", "m", "o", "r", "y"];

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut space = Space::new();
    let _ = space.decl_all(LETTERS, Domain::interval(0, 9));
    let _ = space.decl("s", Domain::interval(1, 9));
    let _ = space.decl("m", Domain::interval(1, 9));
    let _ = space.distinct(LETTERS);

    let send_more = space.wsum(
        &[1000, 100, 10, 1, 1000, 100, 10, 1],
        ["s", "e", "n", "d", "m", "o", "r", "e"],
        (),
    );
    let money = space.wsum(&[10000, 1000, 100, 10, 1], ["m", "o", "n", "e", "y"], ());
    let _ = space.eq(send_more, money);
    distribute::fail_first(&mut space, LETTERS);

    let mut search = DepthFirst::new(space);
    let mut found = 0u64;
    while let Some(solution) = search.next_solution() {
        found += 1;
        let digit = |letter: &str| {
            solution
                .int(letter)
                .with_context(|| format!("letter {letter} is undetermined"))
        };
        let send = 1000 * digit("s")? + 100 * digit("e")? + 10 * digit("n")? + digit("d")?;
        let more = 1000 * digit("m")? + 100 * digit("o")? + 10 * digit("r")? + digit("e")?;
        let money = send + more;
        println!("{send} + {more} = {money}");
        for letter in LETTERS {
            print!("  {letter}={}", digit(letter)?);
        }
        println!();
        if !args.all {
            break;
        }
    }

    log_statistic("solutionsPrinted", found);
    log_statistic_postfix();
    anyhow::ensure!(found > 0, "no solution found");
    Ok(())
}
