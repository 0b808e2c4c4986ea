use std::env;
use std::process;

use varlena_reader::{render, DecodeConfig, NoSymbols, ProcessReader, VarlenaDecoder};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} <pid> <address_or_expression> [--depth <N>] [--raw-cap <BYTES>]",
            args[0]
        );
        process::exit(1);
    }

    let pid: u32 = match args[1].parse() {
        Ok(pid) => pid,
        Err(_) => {
            eprintln!("ERROR: invalid pid: {}", args[1]);
            process::exit(1);
        }
    };
    let target = &args[2];

    let mut config = DecodeConfig::default();
    if let Some(depth) = flag_value(&args, "--depth") {
        config.max_depth = depth;
    }
    if let Some(cap) = flag_value(&args, "--raw-cap") {
        config.raw_preview_cap = cap;
    }

    // A null target is a valid value, not an error.
    if matches!(target.as_str(), "0" | "0x0") {
        println!("NULL varlena");
        return;
    }

    let reader = match ProcessReader::attach(pid) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("ERROR: cannot attach to pid {pid}: {e}");
            eprintln!("  (the target must exist and be ptrace-accessible)");
            process::exit(1);
        }
    };

    let mut decoder = VarlenaDecoder::with_config(reader, config);
    match decoder.decode_target(target, &mut NoSymbols) {
        Ok(decoded) => print!("{}", render::report(&decoded)),
        Err(e) => {
            eprintln!("ERROR: {e}");
            process::exit(1);
        }
    }
}

/// Parse the numeric value following `flag`, if present.
fn flag_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    let idx = args.iter().position(|arg| arg == flag)?;
    match args.get(idx + 1).and_then(|v| v.parse().ok()) {
        Some(value) => Some(value),
        None => {
            eprintln!("ERROR: {flag} requires a numeric argument");
            process::exit(1);
        }
    }
}
