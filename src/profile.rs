//! Ingestion of profiler JSON output.
//!
//! An external memory profiler writes one `scalene_profile_n<N>.json` per
//! experiment size. Each document has the shape
//!
//! ```json
//! {"files": {"<script>": {"functions": [{"line": "fft_convolution_1d", "n_peak_mb": 1.5}]}}}
//! ```
//!
//! Only the first entry under `"files"` is read. Unknown fields are ignored.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use crate::convolution::ExperimentDims;
use crate::memory_model::{
    theoretical_peak_memory_1d, theoretical_peak_memory_2d, theoretical_peak_memory_3d,
};

const FILE_PREFIX: &str = "scalene_profile_n";
const FILE_SUFFIX: &str = ".json";

#[derive(Debug)]
pub enum ProfileError {
    Io(io::Error),
    Json(serde_json::Error),
    /// A file matched the profile naming pattern but its size is not a number.
    InvalidFileName(PathBuf),
    /// No profile files were found in the directory.
    MissingFiles(PathBuf),
    /// The document carries no file entry or no function table.
    MissingFunctions(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::Io(e) => write!(f, "i/o error: {}", e),
            ProfileError::Json(e) => write!(f, "malformed profile: {}", e),
            ProfileError::InvalidFileName(p) => {
                write!(f, "cannot read problem size from {}", p.display())
            }
            ProfileError::MissingFiles(dir) => {
                write!(f, "no {}<N>{} files in {}", FILE_PREFIX, FILE_SUFFIX, dir.display())
            }
            ProfileError::MissingFunctions(what) => write!(f, "profile has no functions: {}", what),
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProfileError::Io(e) => Some(e),
            ProfileError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProfileError {
    fn from(e: io::Error) -> Self {
        ProfileError::Io(e)
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(e: serde_json::Error) -> Self {
        ProfileError::Json(e)
    }
}

#[derive(Deserialize)]
struct ProfileDocument {
    files: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct FileEntry {
    functions: Vec<FunctionPeak>,
}

/// Peak memory the profiler attributed to one function.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionPeak {
    #[serde(rename = "line")]
    pub name: String,
    #[serde(rename = "n_peak_mb")]
    pub peak_mb: f64,
}

/// Function table of the first profiled file.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub source: String,
    pub functions: Vec<FunctionPeak>,
}

impl Profile {
    /// Peak MB recorded for `name`; the first match wins.
    pub fn peak_mb(&self, name: &str) -> Option<f64> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.peak_mb)
    }
}

/// Problem size encoded in a profile file name, `None` for unrelated files.
fn size_from_file_name(path: &Path) -> Option<Result<usize, ProfileError>> {
    let name = path.file_name()?.to_str()?;
    let digits = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    Some(
        digits
            .parse()
            .map_err(|_| ProfileError::InvalidFileName(path.to_path_buf())),
    )
}

/// Profile files in `dir` as `(n, path)`, sorted by `n`.
pub fn discover_profiles(dir: &Path) -> Result<Vec<(usize, PathBuf)>, ProfileError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(n) = size_from_file_name(&path) {
            found.push((n?, path));
        }
    }
    if found.is_empty() {
        return Err(ProfileError::MissingFiles(dir.to_path_buf()));
    }
    found.sort();
    info!("found {} profiles in {}", found.len(), dir.display());
    Ok(found)
}

pub fn parse_profile<R: Read>(reader: R) -> Result<Profile, ProfileError> {
    let doc: ProfileDocument = serde_json::from_reader(reader)?;
    let Some((source, value)) = doc.files.into_iter().next() else {
        return Err(ProfileError::MissingFunctions("empty \"files\" table".into()));
    };
    let entry: FileEntry = serde_json::from_value(value)?;
    Ok(Profile {
        source,
        functions: entry.functions,
    })
}

pub fn load_profile(path: &Path) -> Result<Profile, ProfileError> {
    let file = File::open(path)?;
    parse_profile(BufReader::new(file))
}

/// Dimensionality of a convolution driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    One,
    Two,
    Three,
}

impl Dimensionality {
    pub const ALL: [Dimensionality; 3] = [Self::One, Self::Two, Self::Three];

    /// Name of the driver as it appears in profiler output.
    pub fn function_name(self) -> &'static str {
        match self {
            Self::One => "fft_convolution_1d",
            Self::Two => "fft_convolution_2d",
            Self::Three => "fft_convolution_3d",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::One => "1D",
            Self::Two => "2D",
            Self::Three => "3D",
        }
    }

    /// Number of samples the driver convolves for experiment `dims`.
    pub fn problem_size(self, dims: &ExperimentDims) -> usize {
        match self {
            Self::One | Self::Three => dims.len_1d(),
            Self::Two => dims.n.saturating_mul(dims.n),
        }
    }

    pub fn theoretical_mb(self, dims: &ExperimentDims) -> f64 {
        match self {
            Self::One => theoretical_peak_memory_1d(dims.len_1d()),
            Self::Two => theoretical_peak_memory_2d(dims.n, dims.n),
            Self::Three => theoretical_peak_memory_3d(dims.side, dims.side, dims.side),
        }
    }
}

/// Measured and theoretical peak memory of one driver across experiment sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySeries {
    pub dim: Dimensionality,
    /// `(problem size, MB)` sorted by problem size.
    pub measured: Vec<(f64, f64)>,
    pub theoretical: Vec<(f64, f64)>,
}

/// Build one series per dimensionality from `(n, profile)` pairs.
///
/// Profiles lacking a driver are skipped for that driver only.
pub fn build_series(profiles: &[(usize, Profile)]) -> Vec<MemorySeries> {
    Dimensionality::ALL
        .iter()
        .map(|&dim| {
            let mut measured = Vec::new();
            let mut theoretical = Vec::new();
            for (n, profile) in profiles {
                let dims = ExperimentDims::from_n(*n);
                let Some(mb) = profile.peak_mb(dim.function_name()) else {
                    warn!(
                        "profile for n={} has no entry for {}",
                        n,
                        dim.function_name()
                    );
                    continue;
                };
                let size = dim.problem_size(&dims) as f64;
                measured.push((size, mb));
                theoretical.push((size, dim.theoretical_mb(&dims)));
            }
            measured.sort_by(|a, b| a.0.total_cmp(&b.0));
            theoretical.sort_by(|a, b| a.0.total_cmp(&b.0));
            MemorySeries {
                dim,
                measured,
                theoretical,
            }
        })
        .collect()
}

/// Discover, parse and summarise every profile in `dir`.
pub fn collect_series(dir: &Path) -> Result<Vec<MemorySeries>, ProfileError> {
    let mut profiles = Vec::new();
    for (n, path) in discover_profiles(dir)? {
        info!("reading {}", path.display());
        profiles.push((n, load_profile(&path)?));
    }
    Ok(build_series(&profiles))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "elapsed_time_sec": 1.2,
        "files": {
            "fft_convolution.py": {
                "functions": [
                    {"line": "fft_convolution_1d", "lineno": 7, "n_peak_mb": 12.5},
                    {"line": "fft_convolution_2d", "lineno": 15, "n_peak_mb": 20.0},
                    {"line": "fft_convolution_3d", "lineno": 23, "n_peak_mb": 31.25}
                ],
                "lines": []
            },
            "other.py": {"functions": []}
        }
    }"#;

    #[test]
    fn parses_first_file_entry() {
        let profile = parse_profile(SAMPLE.as_bytes()).unwrap();
        assert_eq!(profile.source, "fft_convolution.py");
        assert_eq!(profile.functions.len(), 3);
        assert_eq!(profile.peak_mb("fft_convolution_2d"), Some(20.0));
        assert_eq!(profile.peak_mb("main"), None);
    }

    #[test]
    fn first_entry_follows_document_order() {
        let json = r#"{"files": {
            "zzz.py": {"functions": [{"line": "fft_convolution_1d", "n_peak_mb": 1.0}]},
            "aaa.py": {"functions": [{"line": "fft_convolution_1d", "n_peak_mb": 2.0}]}
        }}"#;
        let profile = parse_profile(json.as_bytes()).unwrap();
        assert_eq!(profile.source, "zzz.py");
        assert_eq!(profile.peak_mb("fft_convolution_1d"), Some(1.0));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_profile("{\"files\": [".as_bytes()).unwrap_err();
        assert!(matches!(err, ProfileError::Json(_)));
        let err = parse_profile("{\"files\": {}}".as_bytes()).unwrap_err();
        assert!(matches!(err, ProfileError::MissingFunctions(_)));
    }

    #[test]
    fn file_name_pattern() {
        let ok = size_from_file_name(Path::new("scalene/scalene_profile_n300.json"));
        assert_eq!(ok.map(|r| r.unwrap()), Some(300));
        assert!(size_from_file_name(Path::new("notes.json")).is_none());
        assert!(size_from_file_name(Path::new("scalene_profile_n300.txt")).is_none());
        assert!(matches!(
            size_from_file_name(Path::new("scalene_profile_nabc.json")),
            Some(Err(ProfileError::InvalidFileName(_)))
        ));
    }

    #[test]
    fn series_are_sorted_by_their_own_size() {
        let profile = parse_profile(SAMPLE.as_bytes()).unwrap();
        let profiles = vec![(20, profile.clone()), (10, profile)];
        let series = build_series(&profiles);
        assert_eq!(series.len(), 3);
        for s in &series {
            assert_eq!(s.measured.len(), 2);
            assert!(s.measured[0].0 < s.measured[1].0, "{:?}", s.dim);
            assert_eq!(s.theoretical.len(), 2);
        }
        let two_d = &series[1];
        assert_eq!(two_d.measured[0].0, 100.0);
        assert_eq!(two_d.theoretical[0].1, theoretical_peak_memory_2d(10, 10));
    }

    #[test]
    fn missing_driver_is_skipped() {
        let json = r#"{"files": {"a.py": {"functions": [{"line": "fft_convolution_2d", "n_peak_mb": 3.0}]}}}"#;
        let profile = parse_profile(json.as_bytes()).unwrap();
        let series = build_series(&[(8, profile)]);
        assert!(series[0].measured.is_empty());
        assert_eq!(series[1].measured, vec![(64.0, 3.0)]);
        assert!(series[2].measured.is_empty());
    }
}
