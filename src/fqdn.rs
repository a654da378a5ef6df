//! Domain paths and fully-qualified name composition.
//!
//! Locations in the record tree are described by a [`DomainPath`]: an
//! ordered sequence of segments running from the least specific segment to
//! the most specific one. That order matches how the tree nests its nodes
//! and is what every placement and deletion primitive consumes.
//!
//! A path is rendered as a DNS name by [`compose_fqdn`]: the segment order
//! is reversed so that the most specific segment becomes the leftmost
//! label, and the result is terminated with a dot. The reversal happens
//! exactly once, here. Paths handed to the tree are never reversed.

use core::fmt;

use serde::{Deserialize, Serialize};

//------------ DomainPath ----------------------------------------------------

/// A location in the hierarchical namespace.
///
/// Segments are ordered least specific first, the same order in which the
/// tree nests its nodes. `Display` joins the segments with slashes which is
/// only intended for log output.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DomainPath {
    segments: Vec<String>,
}

impl DomainPath {
    /// Creates an empty path, i.e., the root of the tree.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a path from a sequence of segments.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        DomainPath {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends a segment to the end, making the path one level deeper.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into())
    }

    /// Removes and returns the last, most specific segment.
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Returns the segments in path order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns whether the path is the tree root.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Renders the path as a fully-qualified DNS name.
    pub fn fqdn(&self) -> Fqdn {
        compose_fqdn(&self.segments)
    }
}

impl fmt::Display for DomainPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

//------------ Fqdn ----------------------------------------------------------

/// A fully-qualified, dot-terminated DNS name.
#[derive(
    Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct Fqdn(String);

impl Fqdn {
    /// Returns the name as a string slice, trailing dot included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the labels of the name in rendered order.
    ///
    /// The first label is the most specific one. Feeding the labels back
    /// into [`compose_fqdn`] therefore produces the reversed name; doing so
    /// twice returns to this name.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|label| !label.is_empty())
    }
}

impl AsRef<str> for Fqdn {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<Fqdn> for String {
    fn from(fqdn: Fqdn) -> Self {
        fqdn.0
    }
}

impl fmt::Display for Fqdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//------------ compose_fqdn --------------------------------------------------

/// Renders a sequence of domain-path segments as a fully-qualified name.
///
/// The segment order is reversed so that the last, most specific path
/// segment becomes the leftmost DNS label. The labels are joined with dots
/// and a final dot is appended. Callers must not supply empty segments; an
/// empty segment would render as a double dot.
pub fn compose_fqdn<S: AsRef<str>>(segments: &[S]) -> Fqdn {
    let mut name = String::new();
    for segment in segments.iter().rev() {
        name.push_str(segment.as_ref());
        name.push('.');
    }
    if name.is_empty() {
        name.push('.');
    }
    Fqdn(name)
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_reverses_segments() {
        let fqdn =
            compose_fqdn(&["local", "cluster", "svc", "prod", "web"]);
        assert_eq!(fqdn.as_str(), "web.prod.svc.cluster.local.");
    }

    #[test]
    fn compose_always_terminates_with_dot() {
        assert_eq!(compose_fqdn(&["local"]).as_str(), "local.");
        assert_eq!(compose_fqdn::<&str>(&[]).as_str(), ".");
    }

    #[test]
    fn labels_drop_the_trailing_dot() {
        let fqdn = compose_fqdn(&["local", "cluster", "svc"]);
        let labels: Vec<_> = fqdn.labels().collect();
        assert_eq!(labels, ["svc", "cluster", "local"]);
    }

    #[test]
    fn recomposition_is_an_involution() {
        let segments = ["local", "cluster", "svc", "prod", "db"];
        let fqdn = compose_fqdn(&segments);

        // Composing the rendered labels reverses the name once more;
        // a second round returns to the original.
        let once: Vec<_> = fqdn.labels().collect();
        let reversed = compose_fqdn(&once);
        let twice: Vec<_> = reversed.labels().collect();
        assert_eq!(compose_fqdn(&twice), fqdn);
    }

    #[test]
    fn path_push_and_pop() {
        let mut path = DomainPath::from_segments(["local", "cluster"]);
        path.push("svc");
        assert_eq!(path.len(), 3);
        assert_eq!(path.pop().as_deref(), Some("svc"));
        assert_eq!(path.segments(), ["local", "cluster"]);
    }

    #[test]
    fn path_fqdn_matches_compose() {
        let path = DomainPath::from_segments(["local", "cluster", "svc"]);
        assert_eq!(path.fqdn().as_str(), "svc.cluster.local.");
    }

    #[test]
    fn path_display_is_slash_separated() {
        let path = DomainPath::from_segments(["local", "cluster", "svc"]);
        assert_eq!(path.to_string(), "local/cluster/svc");
    }
}
