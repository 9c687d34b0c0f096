//! Command line runner for script files
//!
//! Usage: jsrun [options] <script.js>
//!
//! Options:
//!   --max-depth <n>    Call depth at which script recursion overflows
//!   --print-result     Print the script's final value after it runs

use std::env;
use std::fs;
use std::process::ExitCode;

use jsrun::{Runtime, RuntimeOptions};

struct Config {
    script_path: String,
    max_depth: Option<usize>,
    print_result: bool,
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map_or("jsrun", |s| s.as_str());

    let mut max_depth: Option<usize> = None;
    let mut print_result = false;
    let mut script_arg: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args.get(i) else {
            break;
        };
        if arg == "--max-depth" {
            i += 1;
            max_depth = Some(
                args.get(i)
                    .ok_or_else(|| "--max-depth requires a value".to_string())?
                    .parse::<usize>()
                    .map_err(|_| "--max-depth must be a positive integer".to_string())?,
            );
        } else if arg == "--print-result" {
            print_result = true;
        } else if arg.starts_with('-') {
            return Err(format!("Unknown option: {}", arg));
        } else {
            script_arg = Some(arg);
        }
        i += 1;
    }

    let script_path = script_arg
        .ok_or_else(|| {
            format!(
                "Usage: {} [--max-depth <n>] [--print-result] <script.js>",
                program_name
            )
        })?
        .to_string();

    Ok(Config {
        script_path,
        max_depth,
        print_result,
    })
}

fn main() -> ExitCode {
    let config = match parse_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    let source = match fs::read_to_string(&config.script_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Cannot read {}: {}", config.script_path, e);
            return ExitCode::FAILURE;
        }
    };

    let mut options = RuntimeOptions::default();
    if let Some(max_depth) = config.max_depth {
        options.max_depth = max_depth;
    }

    let mut runtime = Runtime::with_options(options);
    match runtime.eval_simple(&source) {
        Ok(rendered) => {
            if config.print_result {
                println!("{}", rendered);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
