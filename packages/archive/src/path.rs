//! Normalized archive paths.

use std::fmt;

use thiserror::Error;

/// Errors related to path parsing and normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A `..` segment would climb above the archive root.
    #[error("path '{path}' escapes the archive root")]
    EscapesRoot { path: String },

    /// A segment contains a character that can never appear in an entry name.
    #[error("invalid path segment '{segment}' at position {position}: {message}")]
    InvalidSegment {
        segment: String,
        position: usize,
        message: String,
    },
}

/// A normalized, absolute path inside an archive.
///
/// Paths have no `.` or `..` segments, no empty segments and display with a
/// single leading `/`. The root path has no segments and displays as `/`.
/// Two paths are equal iff their normalized forms are equal.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArchivePath {
    segments: Vec<String>,
}

impl ArchivePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse and normalize a `/`-separated path string.
    ///
    /// - Empty segments are ignored (normalizes `//`, leading and trailing `/`)
    /// - `.` segments are dropped
    /// - `..` removes the preceding segment; climbing above the root fails
    ///
    /// ```rust
    /// use shrinkfs_archive::ArchivePath;
    ///
    /// let path = ArchivePath::parse("a/./b/../c/").unwrap();
    /// assert_eq!(path.to_string(), "/a/c");
    /// assert_eq!(ArchivePath::parse("").unwrap(), ArchivePath::root());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let mut segments: Vec<String> = Vec::new();
        for raw in s.split('/') {
            match raw {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(PathError::EscapesRoot {
                            path: s.to_string(),
                        });
                    }
                }
                segment => {
                    Self::validate_segment(segment, segments.len())?;
                    segments.push(segment.to_string());
                }
            }
        }
        Ok(ArchivePath { segments })
    }

    /// Build a path from already-split segments, validating each one.
    ///
    /// Unlike [`ArchivePath::parse`], segments are taken literally: empty,
    /// `.`, `..` and `/`-containing segments are rejected instead of being
    /// normalized away.
    pub fn try_from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for (i, segment) in segments.into_iter().enumerate() {
            let segment = segment.into();
            Self::validate_literal_segment(&segment, i)?;
            out.push(segment);
        }
        Ok(ArchivePath { segments: out })
    }

    fn validate_segment(segment: &str, position: usize) -> Result<(), PathError> {
        if segment.contains('\0') {
            return Err(PathError::InvalidSegment {
                segment: segment.escape_debug().to_string(),
                position,
                message: "contains a NUL character".to_string(),
            });
        }
        Ok(())
    }

    fn validate_literal_segment(segment: &str, position: usize) -> Result<(), PathError> {
        let message = match segment {
            "" => "empty segment",
            "." | ".." => "relative segment",
            s if s.contains('/') => "contains a path separator",
            _ => return Self::validate_segment(segment, position),
        };
        Err(PathError::InvalidSegment {
            segment: segment.to_string(),
            position,
            message: message.to_string(),
        })
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Same as [`ArchivePath::is_root`].
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Iterate over segments.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// The last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<ArchivePath> {
        let (_, init) = self.segments.split_last()?;
        Some(ArchivePath {
            segments: init.to_vec(),
        })
    }

    /// Append a single segment.
    pub fn child(&self, segment: &str) -> Result<ArchivePath, PathError> {
        Self::validate_literal_segment(segment, self.segments.len())?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(ArchivePath { segments })
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &ArchivePath) -> ArchivePath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        ArchivePath { segments }
    }

    /// Check if this path has the given prefix.
    pub fn has_prefix(&self, prefix: &ArchivePath) -> bool {
        prefix.segments.len() <= self.segments.len()
            && prefix.segments == self.segments[..prefix.segments.len()]
    }

    /// Strip a prefix from this path.
    ///
    /// Returns `None` if the prefix doesn't match.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &ArchivePath) -> Option<ArchivePath> {
        if self.has_prefix(prefix) {
            Some(ArchivePath {
                segments: self.segments[prefix.segments.len()..].to_vec(),
            })
        } else {
            None
        }
    }

    /// Every proper ancestor, root first (the root itself included).
    pub fn ancestors(&self) -> impl Iterator<Item = ArchivePath> + '_ {
        (0..self.segments.len()).map(|end| ArchivePath {
            segments: self.segments[..end].to_vec(),
        })
    }

    /// The path without its leading `/`, as used for container entry names.
    pub fn to_relative_string(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl std::str::FromStr for ArchivePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::ops::Index<usize> for ArchivePath {
    type Output = str;

    fn index(&self, i: usize) -> &Self::Output {
        &self.segments[i]
    }
}

/// Macro for creating archive paths from literals.
///
/// # Example
///
/// ```rust
/// use shrinkfs_archive::archive_path;
///
/// let p = archive_path!("META-INF/MANIFEST.MF");
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! archive_path {
    ($s:expr) => {
        $crate::ArchivePath::parse($s).expect("invalid archive path literal")
    };
}
