use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use loxide::Lox;

/// Runs `source` as a standalone program against a fresh interpreter and
/// returns everything written to stdout.
#[allow(dead_code)]
pub fn run(source: &str) -> String {
    let mut output = Vec::new();
    let mut lox = Lox::new(&mut output);
    lox.run(source);
    String::from_utf8(output).expect("interpreter output is valid utf8")
}

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Writes `source` to a uniquely named file under the system temp
/// directory, for tests that need to invoke the `lox` binary as a
/// subprocess (to observe exit codes, which the library API does not
/// expose directly).
#[allow(dead_code)]
pub fn script(source: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("loxide-test-{}-{id}.lox", std::process::id()));
    fs::write(&path, source).expect("failed to write temp script");
    path
}
