// quill - An embeddable typed scripting language written in Rust
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use quill_embed::{Engine, Val};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Handle --version flag
    if args.len() == 2 && (args[1] == "--version" || args[1] == "-v") {
        println!("Quill v0.1.0");
        return;
    }

    let engine = Engine::new();

    // If files provided, run them; otherwise start REPL
    if args.len() > 1 {
        run_files(&args[1..], &engine);
    } else {
        run_repl(&engine);
    }
}

/// Run a sequence of script files against one shared global scope
fn run_files(files: &[String], engine: &Engine) {
    for file_path in files {
        if let Err(e) = run_file(file_path, engine) {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

/// Run a single script file
fn run_file(file_path: &str, engine: &Engine) -> Result<(), String> {
    let path = Path::new(file_path);

    // Validate file extension
    match path.extension().and_then(|e| e.to_str()) {
        Some("quill") | Some("qs") => {}
        Some(ext) => {
            return Err(format!(
                "Error: unsupported file extension '.{}' for '{}'",
                ext, file_path
            ));
        }
        None => {
            return Err(format!(
                "Error: file '{}' has no extension (expected .quill or .qs)",
                file_path
            ));
        }
    }

    let source =
        fs::read_to_string(path).map_err(|e| format!("Error reading '{}': {}", file_path, e))?;

    match engine.eval(&source) {
        Ok(Val::Null) => Ok(()),
        Ok(result) => {
            println!("{}", result);
            Ok(())
        }
        Err(e) => Err(format!("Error in '{}': {}", file_path, e)),
    }
}

/// Run the interactive REPL
fn run_repl(engine: &Engine) {
    println!("Quill v0.1.0");

    loop {
        print!("quill> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }

                // Bare expressions are convenient at the prompt; try
                // the line as a return statement first so `1 + 2`
                // prints 3, then fall back to running it verbatim.
                let result = if !input.starts_with("return")
                    && let Ok(val) =
                        engine.eval(&format!("return {};", input.trim_end_matches(';')))
                {
                    Ok(val)
                } else {
                    engine.eval(input)
                };

                match result {
                    Ok(Val::Null) => {}
                    Ok(val) => println!("{}", val),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }
    }
}
