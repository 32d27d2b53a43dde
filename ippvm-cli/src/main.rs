//! IPPcode CLI — load, check, execute, and dump programs.
//!
//! Exit codes:
//! - 0-9: The executed program's own status
//! - 10: Missing or invalid command-line parameter
//! - 11: Cannot read an input file
//! - 21-23: Source load error (header, opcode, structure)
//! - 32, 52-59, 88, 99: Runtime error, one code per kind

mod commands;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(10);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "check" => commands::check(&args[2..]),
        "dump" => commands::dump(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(10);
        }
    };

    match result {
        Ok(status) => process::exit(status),
        Err(status) => process::exit(status),
    }
}

fn print_usage() {
    eprintln!("Usage: ippvm <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <program.src> [--input FILE]   Execute a program (READ from FILE or stdin)");
    eprintln!("  check <program.src>                Load and validate without executing");
    eprintln!("  dump <program.src>                 Print the canonical instruction listing");
}
