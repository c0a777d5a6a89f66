use std::env;
use std::fs;
use std::io;
use std::process;
use tilescore::CompileOptions;
use tracing_subscriber::filter::LevelFilter;

const USAGE: &str = "Usage: tilescore [-v] [--options <file.yaml>] <level.json> [output.json]";

fn usage() -> ! {
    eprintln!("{}", USAGE);
    process::exit(1);
}

fn read(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path, e);
            process::exit(1);
        }
    }
}

fn main() {
    let mut verbose = false;
    let mut options_path: Option<String> = None;
    let mut positional = Vec::new();

    // Parse flags
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "--options" => match args.next() {
                Some(path) => options_path = Some(path),
                None => usage(),
            },
            "-h" | "--help" => {
                println!("{}", USAGE);
                return;
            }
            _ => positional.push(arg),
        }
    }

    let (input_path, output_path) = match positional.as_slice() {
        [input] => (input.clone(), None),
        [input, output] => (input.clone(), Some(output.clone())),
        _ => usage(),
    };

    // `log` records from the library are bridged into the subscriber
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    if let Err(e) = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("Logging unavailable: {}", e);
    }

    let options = match options_path {
        Some(path) => match CompileOptions::from_yaml(&read(&path)) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Error in '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => CompileOptions::default(),
    };

    // Compile
    let compiled = match tilescore::compile_level(&read(&input_path), &options) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            process::exit(1);
        }
    };

    let json = match serde_json::to_string_pretty(&compiled) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!(
                "Wrote {} rows and {} notes to {}",
                compiled.rows.len(),
                compiled.timeline.note_count(),
                path
            );
        }
        None => {
            println!("{}", json);
        }
    }
}
