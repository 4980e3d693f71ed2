//! `locale check`: lint locale files from disk.

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use locale_core::{Config, LocaleError};
use locale_lsp::diagnostics::validate;
use locale_lsp::document::path_to_uri;
use locale_lsp::{index_document, TextDocument};
use lsp_types::Diagnostic;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::{report_error, OutputFormat};

#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    diagnostics: Vec<Diagnostic>,
}

pub(crate) fn cmd_check(paths: &[PathBuf], config: &Config, output: OutputFormat, quiet: bool) {
    let files = match collect_files(paths, config) {
        Ok(files) => files,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        match check_file(file, config) {
            Ok(diagnostics) => reports.push(FileReport {
                path: file.display().to_string(),
                diagnostics,
            }),
            Err(e) => {
                report_error(&e.to_string(), output, quiet);
                process::exit(1);
            }
        }
    }

    let problems: usize = reports.iter().map(|r| r.diagnostics.len()).sum();

    if !quiet {
        match output {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&reports)
                    .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
                println!("{}", json);
            }
            OutputFormat::Text => {
                for report in &reports {
                    for diag in &report.diagnostics {
                        println!("{}", format_diagnostic(&report.path, diag));
                    }
                }
                println!(
                    "{} problem(s) in {} file(s) checked",
                    problems,
                    reports.len()
                );
            }
        }
    }

    if problems > 0 {
        process::exit(1);
    }
}

/// `path:line:col: error: message`, with 1-based line and column.
fn format_diagnostic(path: &str, diag: &Diagnostic) -> String {
    format!(
        "{}:{}:{}: error: {}",
        path,
        diag.range.start.line + 1,
        diag.range.start.character + 1,
        diag.message
    )
}

/// Expand `paths` into the files to check.
///
/// Files named explicitly are always checked. Directories are walked
/// recursively, in file-name order, for files the configuration accepts.
fn collect_files(paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>, LocaleError> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = std::fs::metadata(path).map_err(|e| LocaleError::io(path, e))?;
        if !metadata.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| LocaleError::io(path, e.into()))?;
            if entry.file_type().is_file() && config.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

fn check_file(path: &Path, config: &Config) -> Result<Vec<Diagnostic>, LocaleError> {
    let text = std::fs::read_to_string(path).map_err(|e| LocaleError::io(path, e))?;
    let uri = path_to_uri(path).ok_or_else(|| {
        LocaleError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path is not a valid file URI"),
        )
    })?;
    let document = TextDocument::new(uri, config.language_id.clone(), 0, text);
    let diagnostics = validate(
        &document,
        &index_document(&document),
        config.related_information,
    );
    debug!(path = %path.display(), count = diagnostics.len(), "checked");
    Ok(diagnostics)
}
