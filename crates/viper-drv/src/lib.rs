//! viper-drv - The `viper` binary's driver.
//!
//! Orchestrates the pipeline (`source text -> lexer -> parser ->
//! interpreter`) for the two front-end modes:
//!
//! - **File mode**: read a script, run it, print any diagnostic.
//! - **REPL mode**: prompt `viper > ` per line, execute the accumulated
//!   block on an empty line, terminate on `exit`. Each block runs in a
//!   fresh global scope; nothing carries over between blocks.
//!
//! Diagnostics go to stdout as part of the language's user-visible
//! behaviour; host-level failures (unreadable script file) surface as
//! `anyhow` errors on stderr.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;

use viper_interp::Interpreter;
use viper_lex::tokenize;
use viper_par::parse;
use viper_util::{DiagResult, SourceBuffer};

/// Run one source text through the whole pipeline. Tabs are expanded to
/// four spaces first so diagnostic columns line up. The first diagnostic
/// is printed to stdout.
pub fn execute(text: &str) {
    let src = SourceBuffer::with_expanded_tabs(text);
    if let Err(diag) = run_pipeline(&src) {
        println!("{diag}");
    }
}

fn run_pipeline(src: &SourceBuffer) -> DiagResult<()> {
    let tokens = tokenize(src)?;
    tracing::debug!(tokens = tokens.len(), "lexed");

    let nodes = parse(tokens, src)?;
    tracing::debug!(nodes = nodes.len(), "parsed");

    let mut interpreter = Interpreter::new(src);
    interpreter.run(&nodes)?;
    Ok(())
}

/// File mode: load the script as UTF-8 and execute it.
pub fn run_file(path: &Path) -> anyhow::Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    execute(&text);
    Ok(())
}

/// REPL mode. Lines accumulate until an empty line executes the block;
/// the line `exit` (or end of input) terminates.
pub fn repl() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let mut block = String::new();
        loop {
            print!("viper > ");
            io::stdout().flush().context("failed to flush prompt")?;

            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line.context("failed to read input line")?;
            if line == "exit" {
                return Ok(());
            }
            if line.is_empty() {
                break;
            }
            block.push_str(&line);
            block.push('\n');
        }

        tracing::debug!(bytes = block.len(), "executing repl block");
        execute(&block);
    }
}
