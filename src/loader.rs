//! This module provides the `ProgramLoader` struct, responsible for loading Turing Machine
//! programs from various sources, including files and strings.

use crate::parser::parse;
use crate::types::{Program, TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// `ProgramLoader` is a utility struct for loading Turing Machine programs.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all `.tur` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single Turing Machine program from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.tur` file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and parsed into a `Program`.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or exceeds
    ///   [`MAX_PROGRAM_SIZE`].
    /// * `Err(TuringMachineError::ParseError)` if the file content is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let size = fs::metadata(path)
            .map_err(|e| {
                TuringMachineError::FileError(format!(
                    "Failed to read file {}: {}",
                    path.display(),
                    e
                ))
            })?
            .len();

        if size > MAX_PROGRAM_SIZE as u64 {
            return Err(TuringMachineError::FileError(format!(
                "File {} is {} bytes, the limit is {} bytes",
                path.display(),
                size,
                MAX_PROGRAM_SIZE
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        log::debug!("Loading program from {}", path.display());

        parse(&content)
    }

    /// Loads a single Turing Machine program from the provided string content.
    ///
    /// This is useful for parsing programs that are not stored in files, e.g., from user input.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        parse(content)
    }

    /// Loads all Turing Machine program files (`.tur` extension) from a given directory.
    ///
    /// Directories and non-`.tur` files are skipped. Each element of the result is either
    /// the path and the loaded program, or the error that prevented loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {e}"
                        ))))
                    }
                };

                if path.is_dir() || path.extension().is_none_or(|ext| ext != "tur") {
                    return None;
                }

                Some(
                    Self::load_program(&path)
                        .map(|program| (path.clone(), program))
                        .map_err(|e| {
                            log::warn!("Skipping {}: {}", path.display(), e);
                            TuringMachineError::FileError(format!(
                                "Failed to load program from {}: {}",
                                path.display(),
                                e
                            ))
                        }),
                )
            })
            .collect();

        // Directory order is platform dependent
        results.sort_by_key(|r| r.as_ref().ok().map(|(path, _)| path.clone()));
        results
    }
}
