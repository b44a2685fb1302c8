//! vimx: run Vim script against an in-memory buffer.

use std::io::{self, BufRead, Write};

use vim_eval::InterpreterBuilder;
use vim_ex::{Dispatcher, DispatcherBuilder, MemoryHost};

#[derive(Default)]
struct Options {
    ignorecase: bool,
    verbose: bool,
    no_history: bool,
    script: Option<String>,
    buffer: Option<String>,
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--ignorecase" => options.ignorecase = true,
            "--verbose" | "-v" => options.verbose = true,
            "--no-history" => options.no_history = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other if other.starts_with('-') => {
                eprintln!("error: unknown option '{other}'");
                print_usage();
                std::process::exit(1);
            }
            path if options.script.is_none() => options.script = Some(path.to_string()),
            path if options.buffer.is_none() => options.buffer = Some(path.to_string()),
            extra => {
                eprintln!("error: unexpected argument '{extra}'");
                std::process::exit(1);
            }
        }
    }

    let mut dispatcher = DispatcherBuilder::new()
        .interpreter(InterpreterBuilder::new().ignorecase(options.ignorecase).build())
        .history(!options.no_history)
        .build();

    let mut host = match &options.buffer {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => MemoryHost::from_text(&text),
            Err(e) => {
                eprintln!("error: cannot read '{path}': {e}");
                std::process::exit(1);
            }
        },
        None => MemoryHost::new(),
    };

    let failed = match &options.script {
        Some(path) => run_script(&mut dispatcher, &mut host, path),
        None => repl(&mut dispatcher, &mut host),
    };

    if options.verbose {
        println!("--- buffer ---");
        print!("{}", host.text());
    }
    if failed {
        std::process::exit(1);
    }
}

/// Returns whether any statement failed.
fn run_script(dispatcher: &mut Dispatcher, host: &mut MemoryHost, path: &str) -> bool {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{path}': {e}");
            std::process::exit(1);
        }
    };
    let report = dispatcher.execute_script(host, &source);
    flush_output(host);
    for failure in &report.failures {
        if let Some(message) = &failure.message {
            eprintln!("{path}:{}: {message}", failure.line);
        } else {
            eprintln!("{path}:{}: command failed", failure.line);
        }
    }
    tracing::debug!(
        statements = report.statements,
        errors = report.error_count(),
        "script finished"
    );
    report.has_errors()
}

fn repl(dispatcher: &mut Dispatcher, host: &mut MemoryHost) -> bool {
    let stdin = io::stdin();
    let mut failed = false;
    loop {
        print!(":");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("error: {e}");
                return true;
            }
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if matches!(line.trim(), "q" | "quit") {
            break;
        }
        match dispatcher.execute(host, line, false) {
            Ok(result) => failed |= !result.is_success(),
            Err(_) => failed = true,
        }
        flush_output(host);
    }
    failed
}

fn flush_output(host: &mut MemoryHost) {
    let (messages, errors) = host.take_output();
    for message in messages {
        println!("{message}");
    }
    for error in errors {
        eprintln!("{error}");
    }
}

/// Logging goes to stderr, only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn print_usage() {
    println!("vimx: run Vim script against an in-memory buffer");
    println!();
    println!("Usage: vimx [options] [script.vim] [buffer.txt]");
    println!();
    println!("Without a script, commands are read from stdin one line at a time.");
    println!();
    println!("Options:");
    println!("  --ignorecase     Patterns ignore case");
    println!("  --no-history     Do not record command history");
    println!("  -v, --verbose    Print the buffer when done");
    println!("  -h, --help       Show this help");
}
