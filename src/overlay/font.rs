use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FontConfig;
use crate::error::{OverlayError, Result};

/// The named font choices offered to callers.
///
/// Families resolve to real font files found in the configured search
/// directories; each family carries fallback candidates so overlays still
/// render on systems without the exact face installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Arial,
    Courier,
    LiberationSans,
    Impact,
}

impl FontFamily {
    /// Candidate file names in preference order
    fn candidate_files(&self) -> &'static [&'static str] {
        match self {
            FontFamily::Arial => &[
                "arial.ttf",
                "Arial.ttf",
                "LiberationSans-Regular.ttf",
                "DejaVuSans.ttf",
            ],
            FontFamily::Courier => &[
                "cour.ttf",
                "Courier New.ttf",
                "LiberationMono-Regular.ttf",
                "DejaVuSansMono.ttf",
            ],
            FontFamily::LiberationSans => &["LiberationSans-Regular.ttf", "DejaVuSans.ttf"],
            FontFamily::Impact => &[
                "impact.ttf",
                "Impact.ttf",
                "LiberationSans-Bold.ttf",
                "DejaVuSans-Bold.ttf",
            ],
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FontFamily::Arial => "arial",
            FontFamily::Courier => "courier",
            FontFamily::LiberationSans => "liberation-sans",
            FontFamily::Impact => "impact",
        };
        f.write_str(name)
    }
}

impl FromStr for FontFamily {
    type Err = OverlayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arial" => Ok(FontFamily::Arial),
            "courier" => Ok(FontFamily::Courier),
            "liberation-sans" | "liberation_sans" | "liberation" => Ok(FontFamily::LiberationSans),
            "impact" => Ok(FontFamily::Impact),
            other => Err(OverlayError::UnknownFamily {
                name: other.to_string(),
            }),
        }
    }
}

/// Find a font file for `family` under the configured search directories.
pub fn resolve(family: FontFamily, config: &FontConfig) -> Result<PathBuf> {
    for candidate in family.candidate_files() {
        let wanted = candidate.to_lowercase();
        for dir in &config.search_dirs {
            if let Some(path) = find_file(dir, &wanted, 4) {
                debug!("Resolved font {} -> {}", family, path.display());
                return Ok(path);
            }
        }
    }

    Err(OverlayError::FontUnavailable {
        family: family.to_string(),
    }
    .into())
}

/// Resolve and parse a font for `family`.
pub fn load(family: FontFamily, config: &FontConfig) -> Result<fontdue::Font> {
    let path = resolve(family, config)?;
    let bytes = std::fs::read(&path).map_err(|_| OverlayError::FontUnavailable {
        family: family.to_string(),
    })?;

    fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(|e| {
        debug!("Failed to parse font {}: {}", path.display(), e);
        OverlayError::FontUnavailable {
            family: family.to_string(),
        }
        .into()
    })
}

/// Case-insensitive file-name search, recursing at most `depth` levels.
fn find_file(dir: &Path, wanted_lower: &str, depth: u32) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.to_lowercase() == wanted_lower {
                return Some(path);
            }
        }
    }

    if depth > 0 {
        for sub in subdirs {
            if let Some(found) = find_file(&sub, wanted_lower, depth - 1) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_family_names() {
        assert_eq!("Arial".parse::<FontFamily>().unwrap(), FontFamily::Arial);
        assert_eq!(
            "liberation-sans".parse::<FontFamily>().unwrap(),
            FontFamily::LiberationSans
        );
        assert!(matches!(
            "wingdings".parse::<FontFamily>(),
            Err(OverlayError::UnknownFamily { .. })
        ));
    }

    #[test]
    fn test_resolve_fails_with_empty_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = FontConfig {
            search_dirs: vec![dir.path().to_path_buf()],
        };
        assert!(resolve(FontFamily::Arial, &config).is_err());
    }

    #[test]
    fn test_resolve_finds_nested_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("truetype").join("dejavu");
        std::fs::create_dir_all(&nested).unwrap();
        // Content does not matter for resolution, only for parsing
        std::fs::write(nested.join("DejaVuSans.ttf"), b"stub").unwrap();

        let config = FontConfig {
            search_dirs: vec![dir.path().to_path_buf()],
        };
        let path = resolve(FontFamily::Arial, &config).unwrap();
        assert!(path.ends_with("DejaVuSans.ttf"));
    }

    #[test]
    fn test_load_rejects_invalid_font_data() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("arial.ttf"), b"not a font").unwrap();

        let config = FontConfig {
            search_dirs: vec![dir.path().to_path_buf()],
        };
        assert!(load(FontFamily::Arial, &config).is_err());
    }
}
