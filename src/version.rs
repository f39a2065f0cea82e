use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;
use regex::Regex;
use crate::error::VersionParseError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:go|v)?(\d+(?:\.\d+)*)(?:-?([A-Za-z]+)(\d*))?$").expect("version regex is valid")
});

/// A Go pre-release tag such as `rc2` or `beta1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreRelease {
    pub label: String,
    pub number: u64,
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.label, self.number)
    }
}

/// A dot-separated, numeric SDK version.
///
/// Missing trailing segments count as zero, so `1.16`, `1.16.0` and `1.16.0.0`
/// are all the same version. Pre-releases (`1.21rc2`) order before the release
/// they precede.
#[derive(Debug, Clone)]
pub struct VersionNumber {
    segments: Vec<u64>,
    pre: Option<PreRelease>,
}

impl VersionNumber {
    /// Creates a release version from its numeric segments.
    ///
    /// An empty slice is treated as `0`.
    pub fn new(segments: &[u64]) -> Self {
        let segments = if segments.is_empty() {
            vec![0]
        } else {
            segments.to_vec()
        };
        Self { segments, pre: None }
    }

    pub fn with_pre_release(mut self, label: &str, number: u64) -> Self {
        self.pre = Some(PreRelease {
            label: label.to_ascii_lowercase(),
            number,
        });
        self
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn pre_release(&self) -> Option<&PreRelease> {
        self.pre.as_ref()
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre.is_some()
    }

    /// Segments with trailing zeros removed, padded back to at least two.
    fn canonical_segments(&self) -> Vec<u64> {
        let mut segments = self.significant_segments().to_vec();
        while segments.len() < 2 {
            segments.push(0);
        }
        segments
    }

    fn significant_segments(&self) -> &[u64] {
        let len = self
            .segments
            .iter()
            .rposition(|segment| *segment != 0)
            .map_or(0, |index| index + 1);
        &self.segments[..len]
    }

    /// The directory and display form: trailing zero segments are dropped, but
    /// at least two segments are kept (`1.16.0.0` becomes `1.16`).
    pub fn canonical_name(&self) -> String {
        let mut name = self
            .canonical_segments()
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        if let Some(pre) = &self.pre {
            name.push_str(&pre.to_string());
        }
        name
    }
}

impl FromStr for VersionNumber {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }
        let captures = VERSION_RE
            .captures(trimmed)
            .ok_or_else(|| VersionParseError::InvalidFormat {
                input: input.to_string(),
            })?;

        let mut segments = Vec::new();
        for segment in captures[1].split('.') {
            let value = segment
                .parse::<u64>()
                .map_err(|_| VersionParseError::SegmentOutOfRange {
                    input: input.to_string(),
                    segment: segment.to_string(),
                })?;
            segments.push(value);
        }

        let mut version = VersionNumber::new(&segments);
        if let Some(label) = captures.get(2) {
            let number = match captures.get(3).map(|m| m.as_str()) {
                Some("") | None => 0,
                Some(digits) => digits
                    .parse::<u64>()
                    .map_err(|_| VersionParseError::SegmentOutOfRange {
                        input: input.to_string(),
                        segment: digits.to_string(),
                    })?,
            };
            version = version.with_pre_release(label.as_str(), number);
        }
        Ok(version)
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for index in 0..len {
            let left = self.segments.get(index).copied().unwrap_or(0);
            let right = other.segments.get(index).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(left), Some(right)) => left.cmp(right),
        }
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionNumber {}

impl Hash for VersionNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_segments().hash(state);
        self.pre.hash(state);
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// Inserts `version` into an ascending, duplicate-free list.
/// Returns `false` if an equal version was already present.
pub fn insert_sorted(versions: &mut Vec<VersionNumber>, version: VersionNumber) -> bool {
    match versions.binary_search(&version) {
        Ok(_) => false,
        Err(index) => {
            versions.insert(index, version);
            true
        }
    }
}
