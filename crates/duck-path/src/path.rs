use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PathError, PathResult};
use crate::names::validate_member_name;

/// An ordered, validated sequence of member names, such as `office.name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path(Vec<String>);

impl Path {
    /// Build a path from its segments. At least one segment is required and
    /// every segment must be a valid member name.
    pub fn new<I, S>(segments: I) -> PathResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::InvalidName {
                name: String::new(),
                reason: "a path needs at least one member name".into(),
            });
        }
        for segment in &segments {
            validate_member_name(segment)?;
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The final member name and the names leading to it.
    pub fn split_last(&self) -> Option<(&String, &[String])> {
        self.0.split_last()
    }

    /// A new path with `name` appended.
    pub fn join(&self, name: &str) -> PathResult<Self> {
        validate_member_name(name)?;
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Ok(Self(segments))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> PathResult<Self> {
        Path::new(s.split('.'))
    }
}

impl TryFrom<String> for Path {
    type Error = PathError;

    fn try_from(s: String) -> PathResult<Self> {
        s.parse()
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}
