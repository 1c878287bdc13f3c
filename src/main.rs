use std::{env, io, process};

use loxide::{Lox, RunOutcome};

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        n if n > 2 => {
            println!("Usage: lox [script]");
            process::exit(64);
        }
        2 => {
            let mut stdout = io::stdout();
            let mut lox = Lox::new(&mut stdout);
            match lox.run_file(&args[1]) {
                RunOutcome::Ok => {}
                RunOutcome::StaticError => process::exit(65),
                RunOutcome::RuntimeError => process::exit(70),
            }
        }
        _ => Lox::run_prompt(),
    }
}
