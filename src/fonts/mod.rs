//! Font discovery for the tabular report view.
//!
//! The positioned-line PDF writer uses the PDF builtin fonts and needs nothing from here. The
//! table view is laid out by `genpdf`, which measures glyphs and therefore needs TrueType files.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Environment variable naming an additional font directory.
pub const FONTS_DIR_ENV: &str = "SLEEP_REPORT_FONTS_DIR";

/// Name of the preferred font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

const FALLBACK_FONT_FAMILY_NAME: &str = "LiberationSans";

const SYSTEM_FALLBACK_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/truetype/liberation2",
];

const STYLE_SUFFIXES: &[&str] = &["Regular", "Bold", "Italic", "BoldItalic"];

fn family_files(family: &str) -> impl Iterator<Item = String> + '_ {
    STYLE_SUFFIXES
        .iter()
        .map(move |suffix| format!("{family}-{suffix}.ttf"))
}

/// Directory bundled with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn font_directory_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let mut push = |candidate: PathBuf| {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = configured {
        push(path.to_path_buf());
    }

    if let Some(path) = env::var_os(FONTS_DIR_ENV).filter(|value| !value.is_empty()) {
        push(PathBuf::from(path));
    }

    if let Some(bin_dir) = env::current_exe().ok().as_deref().and_then(Path::parent) {
        push(bin_dir.join("assets/fonts"));
    }

    push(bundled_fonts_source_dir());
    candidates
}

fn missing_font_files(path: &Path, family: &str) -> Vec<String> {
    family_files(family)
        .filter(|name| !path.join(name).is_file())
        .collect()
}

fn resolve_font_directory(configured: Option<&Path>) -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates(configured) {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_font_files(&candidate, DEFAULT_FONT_FAMILY_NAME);
        if missing.is_empty() {
            return Ok(candidate);
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} font family. Checked: {}. Set {} to a directory with the TTF files.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "report fonts directory not found"),
    ))
}

fn load_family(directory: &Path, family: &str) -> Result<FontFamily<FontData>, Error> {
    fonts::from_files(directory, family, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                family,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn system_fallback_family() -> Result<FontFamily<FontData>, Error> {
    let directory = SYSTEM_FALLBACK_DIRS
        .iter()
        .map(PathBuf::from)
        .find(|dir| missing_font_files(dir, FALLBACK_FONT_FAMILY_NAME).is_empty())
        .ok_or_else(|| {
            Error::new(
                format!("No system {} fonts found", FALLBACK_FONT_FAMILY_NAME),
                io::Error::new(io::ErrorKind::NotFound, "system fallback fonts not found"),
            )
        })?;
    debug!("using system fonts from {}", directory.display());
    load_family(&directory, FALLBACK_FONT_FAMILY_NAME)
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Loads the Roboto family from the first directory that has all four styles, falling back to
/// the system Liberation Sans family when none does.
pub fn report_font_family(configured: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let primary = resolve_font_directory(configured)
        .and_then(|directory| load_family(&directory, DEFAULT_FONT_FAMILY_NAME));

    match primary {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match system_fallback_family() {
            Ok(family) => {
                warn!(
                    "{} fonts unavailable ({}); falling back to '{}'.",
                    DEFAULT_FONT_FAMILY_NAME, err, FALLBACK_FONT_FAMILY_NAME
                );
                Ok(family)
            }
            Err(fallback_err) => {
                warn!(
                    "{} fonts unavailable ({}); system fallback failed: {}",
                    DEFAULT_FONT_FAMILY_NAME, err, fallback_err
                );
                Err(err)
            }
        },
        Err(err) => Err(err),
    }
}

/// Whether [`report_font_family`] can find a usable family without loading it.
pub fn report_fonts_available(configured: Option<&Path>) -> bool {
    resolve_font_directory(configured).is_ok()
        || SYSTEM_FALLBACK_DIRS
            .iter()
            .any(|dir| missing_font_files(Path::new(dir), FALLBACK_FONT_FAMILY_NAME).is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directory_is_searched_first() {
        let configured = PathBuf::from("/opt/report-fonts");
        let candidates = font_directory_candidates(Some(&configured));
        assert_eq!(candidates.first(), Some(&configured));
        assert!(candidates.contains(&bundled_fonts_source_dir()));
    }

    #[test]
    fn family_files_cover_all_styles() {
        let files: Vec<_> = family_files("Roboto").collect();
        assert_eq!(
            files,
            [
                "Roboto-Regular.ttf",
                "Roboto-Bold.ttf",
                "Roboto-Italic.ttf",
                "Roboto-BoldItalic.ttf"
            ]
        );
    }

    #[test]
    fn empty_directory_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = missing_font_files(dir.path(), DEFAULT_FONT_FAMILY_NAME);
        assert_eq!(missing.len(), 4);
    }
}
