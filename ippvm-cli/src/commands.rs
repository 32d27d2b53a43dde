//! CLI command implementations.
//!
//! Commands return `Ok` with the executed program's own status, or
//! `Err` with a toolchain status (parameter, file, load, or runtime).

use std::fs::{self, File};
use std::io::{self, BufReader};

use ippvm_common::Program;
use ippvm_vm::io::{Input, LineInput};

/// Execute a program, feeding READ from `--input FILE` or stdin.
pub fn run(args: &[String]) -> Result<i32, i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: ippvm run <program.src> [--input FILE]");
        return Err(10);
    }

    let source_path = &args[0];
    let mut input_path: Option<&String> = None;
    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--input" => match rest.next() {
                Some(path) => input_path = Some(path),
                None => {
                    eprintln!("error: --input requires a file");
                    return Err(10);
                }
            },
            other => {
                eprintln!("error: unexpected argument '{other}'");
                return Err(10);
            }
        }
    }

    let program = load(source_path)?;

    let mut input: Box<dyn Input> = match input_path {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                eprintln!("error: cannot read '{path}': {e}");
                11
            })?;
            Box::new(LineInput::new(BufReader::new(file)))
        }
        None => Box::new(LineInput::new(io::stdin().lock())),
    };

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    match ippvm_vm::run(&program, input.as_mut(), &mut stdout, &mut stderr) {
        Ok(status) => Ok(status),
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(e.exit_code())
        }
    }
}

/// Load and validate a program without executing it.
pub fn check(args: &[String]) -> Result<i32, i32> {
    if args.is_empty() {
        eprintln!("error: check requires an input file");
        eprintln!("Usage: ippvm check <program.src>");
        return Err(10);
    }

    let source_path = &args[0];
    let program = load(source_path)?;

    match ippvm_vm::check(&program) {
        Ok(()) => {
            println!("OK: {source_path} ({} instructions)", program.len());
            Ok(0)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err(e.exit_code())
        }
    }
}

/// Print the canonical listing of a loaded program.
pub fn dump(args: &[String]) -> Result<i32, i32> {
    if args.is_empty() {
        eprintln!("error: dump requires an input file");
        eprintln!("Usage: ippvm dump <program.src>");
        return Err(10);
    }

    let program = load(&args[0])?;
    println!(".IPPcode24");
    for instr in &program.instructions {
        println!("{instr}");
    }
    Ok(0)
}

/// Read and parse a source file, reporting failures with their codes.
fn load(path: &String) -> Result<Program, i32> {
    let source = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        11
    })?;
    ippvm_parser::parse(&source).map_err(|e| {
        eprintln!("error: {e}");
        e.exit_code()
    })
}
