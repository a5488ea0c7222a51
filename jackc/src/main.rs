// ===============================================
// Metadata — jackc CLI v0.1.0
// ===============================================
// _component_:     command-line front-end
// _description_:   Translates one `.jack` file, or every top-level `.jack`
//                  file in a directory, to stack-machine VM code.
//
// _usage_:
//   jackc <path> [--debug-log <path>]
//
// _notes_:
// - Directory mode is non-recursive and keeps going after a file fails so
//   one bad class doesn't block the rest of a project.
// - `--debug-log` only has an effect when the `debug_mode` feature was
//   compiled in; otherwise the dump calls it feeds are no-ops.
// ===============================================

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use jackc::compiler::{self, DebugLog};
use jackc::{tokenizer, CompileError};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (input, debug_log_path) = match parse_args(&args) {
        Some(parsed) => parsed,
        None => {
            eprintln!("usage: jackc <path> [--debug-log <path>]");
            return ExitCode::from(2);
        }
    };

    // Step 1: figure out which .jack files we're translating.
    let files = match collect_jack_files(&input) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("jackc: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Step 2: translate each file, reporting failures without stopping.
    let mut had_error = false;
    for file in files {
        if let Err(err) = translate_file(&file, debug_log_path.as_deref()) {
            had_error = true;
            eprintln!("jackc: {}: {err}", file.display());
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn parse_args(args: &[String]) -> Option<(PathBuf, Option<PathBuf>)> {
    let mut input = None;
    let mut debug_log = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug-log" => {
                debug_log = Some(PathBuf::from(iter.next()?));
            }
            other if input.is_none() => {
                input = Some(PathBuf::from(other));
            }
            _ => return None,
        }
    }

    Some((input?, debug_log))
}

/// `<path>` ending in `.jack` is translated directly; any other path is
/// treated as a directory and its top-level `*.jack` entries are collected
/// (not recursed into subdirectories).
fn collect_jack_files(input: &Path) -> std::io::Result<Vec<PathBuf>> {
    if input.extension().map(|e| e == "jack") == Some(true) {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().map(|e| e == "jack") == Some(true) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn translate_file(path: &Path, debug_log_override: Option<&Path>) -> Result<(), CompileError> {
    let source = fs::read_to_string(path)?;
    let tokens = tokenizer::tokenize(&source)?;

    let debug_log_path = debug_log_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_debug_log_path(path));
    let debug_log = DebugLog::new(debug_log_path);

    let output_path = path.with_extension("vm");
    let output_file = fs::File::create(&output_path)?;
    let mut output = std::io::BufWriter::new(output_file);

    compiler::compile_class(tokens, &mut output, Some(&debug_log))?;
    Ok(())
}

fn default_debug_log_path(input: &Path) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    path.push(".debug.log");
    PathBuf::from(path)
}
