//! Virtual path type with validated absolute components.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors related to virtual path parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path is not absolute (missing leading `/`).
    NotAbsolute { path: String },
    /// A path component is malformed.
    InvalidComponent {
        component: String,
        position: usize,
        message: String,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::NotAbsolute { path } => {
                write!(f, "path '{}' is not absolute", path)
            }
            PathError::InvalidComponent {
                component,
                position,
                message,
            } => {
                write!(
                    f,
                    "invalid path component '{}' at position {}: {}",
                    component, position, message
                )
            }
        }
    }
}

impl std::error::Error for PathError {}

/// A validated absolute virtual path.
///
/// Every path that crosses a Hearth seam - permission checks, mount
/// registration, file adapter calls - is a `VPath`. Construction enforces
/// a leading `/`, collapses repeated separators, strips trailing slashes
/// and rejects `.`/`..` components, so consumers never re-validate.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VPath {
    components: Vec<String>,
}

impl VPath {
    /// The root path `/`.
    pub fn root() -> Self {
        VPath {
            components: Vec::new(),
        }
    }

    /// Parse an absolute path string.
    ///
    /// # Path Syntax
    ///
    /// - Must start with `/`
    /// - Components are separated by `/`; empty components are ignored
    ///   (normalizes `//` and trailing `/`)
    /// - `.` and `..` components are rejected
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hearth_core::VPath;
    ///
    /// let path = VPath::parse("/data/sensors/1").unwrap();
    /// assert_eq!(path.len(), 3);
    ///
    /// // Trailing slashes are normalized
    /// assert_eq!(VPath::parse("/data/").unwrap(), VPath::parse("/data").unwrap());
    ///
    /// // Relative paths are rejected
    /// assert!(VPath::parse("data").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if !s.starts_with('/') {
            return Err(PathError::NotAbsolute {
                path: s.to_string(),
            });
        }

        let components: Vec<String> = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();

        for (i, component) in components.iter().enumerate() {
            Self::validate_component(component, i)?;
        }

        Ok(VPath { components })
    }

    fn validate_component(component: &str, position: usize) -> Result<(), PathError> {
        if component == "." || component == ".." {
            return Err(PathError::InvalidComponent {
                component: component.to_string(),
                position,
                message: "relative traversal is not allowed".to_string(),
            });
        }
        if component.contains('\0') {
            return Err(PathError::InvalidComponent {
                component: component.to_string(),
                position,
                message: "embedded NUL".to_string(),
            });
        }
        Ok(())
    }

    /// Check if this is the root path.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Get the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if this path has no components (same as [`VPath::is_root`]).
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// The parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<VPath> {
        if self.components.is_empty() {
            None
        } else {
            Some(VPath {
                components: self.components[..self.components.len() - 1].to_vec(),
            })
        }
    }

    /// Iterate over ancestors, from the nearest parent up to `/`.
    ///
    /// The path itself is not included.
    ///
    /// ```rust
    /// use hearth_core::VPath;
    ///
    /// let path = VPath::parse("/a/b/c").unwrap();
    /// let ancestors: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
    /// assert_eq!(ancestors, vec!["/a/b", "/a", "/"]);
    /// ```
    pub fn ancestors(&self) -> impl Iterator<Item = VPath> + '_ {
        let mut current = self.clone();
        std::iter::from_fn(move || {
            let parent = current.parent()?;
            current = parent.clone();
            Some(parent)
        })
    }

    /// Check if this path is `prefix` or lies beneath it.
    pub fn starts_with(&self, prefix: &VPath) -> bool {
        prefix.components.len() <= self.components.len()
            && prefix.components == self.components[..prefix.components.len()]
    }

    /// Strip a prefix, returning the remainder relative to it.
    ///
    /// Returns `None` if the prefix doesn't match.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &VPath) -> Option<VPath> {
        if self.starts_with(prefix) {
            Some(VPath {
                components: self.components[prefix.components.len()..].to_vec(),
            })
        } else {
            None
        }
    }

    /// Join another path beneath this one.
    #[must_use]
    pub fn join(&self, other: &VPath) -> VPath {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        VPath { components }
    }

    /// Render as an absolute path string.
    pub fn as_string(&self) -> String {
        if self.components.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.components.join("/"))
        }
    }
}

impl fmt::Display for VPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl TryFrom<String> for VPath {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        VPath::parse(&s)
    }
}

impl From<VPath> for String {
    fn from(path: VPath) -> String {
        path.as_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_absolute() {
        let path = VPath::parse("/data/sensors").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.to_string(), "/data/sensors");
    }

    #[test]
    fn parse_rejects_relative() {
        assert!(matches!(
            VPath::parse("data/sensors"),
            Err(PathError::NotAbsolute { .. })
        ));
        assert!(VPath::parse("").is_err());
    }

    #[test]
    fn parse_rejects_traversal() {
        assert!(matches!(
            VPath::parse("/data/../secret"),
            Err(PathError::InvalidComponent { .. })
        ));
        assert!(VPath::parse("/data/./x").is_err());
    }

    #[test]
    fn parse_normalizes_slashes() {
        assert_eq!(
            VPath::parse("/data//sensors/").unwrap(),
            VPath::parse("/data/sensors").unwrap()
        );
    }

    #[test]
    fn root_path() {
        let root = VPath::parse("/").unwrap();
        assert!(root.is_root());
        assert_eq!(root, VPath::root());
        assert_eq!(root.to_string(), "/");
        assert!(root.parent().is_none());
    }

    #[test]
    fn parent_chain() {
        let path = VPath::parse("/a/b/c").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "/a/b");

        let ancestors: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
        assert_eq!(ancestors, vec!["/a/b", "/a", "/"]);
    }

    #[test]
    fn starts_with_prefix() {
        let path = VPath::parse("/data/sub/file").unwrap();
        assert!(path.starts_with(&VPath::parse("/data").unwrap()));
        assert!(path.starts_with(&VPath::parse("/").unwrap()));
        assert!(path.starts_with(&path.clone()));
        assert!(!path.starts_with(&VPath::parse("/dat").unwrap()));
        assert!(!VPath::parse("/data").unwrap().starts_with(&path));
    }

    #[test]
    fn strip_prefix_and_join() {
        let path = VPath::parse("/mnt/usb/logs").unwrap();
        let rest = path.strip_prefix(&VPath::parse("/mnt/usb").unwrap()).unwrap();
        assert_eq!(rest.to_string(), "/logs");

        let joined = VPath::parse("/media/disk1").unwrap().join(&rest);
        assert_eq!(joined.to_string(), "/media/disk1/logs");

        assert!(path.strip_prefix(&VPath::parse("/other").unwrap()).is_none());
    }

    #[test]
    fn serde_round_trip() {
        let path = VPath::parse("/data/sensors").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"/data/sensors\"");
        let back: VPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);

        // Relative strings fail to deserialize
        assert!(serde_json::from_str::<VPath>("\"data\"").is_err());
    }
}
