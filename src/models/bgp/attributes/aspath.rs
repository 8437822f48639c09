use crate::models::*;
use itertools::Itertools;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Enum of AS path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AsPathSegment {
    AsSequence(Vec<Asn>),
    AsSet(Vec<Asn>),
    ConfedSequence(Vec<Asn>),
    ConfedSet(Vec<Asn>),
}

impl AsPathSegment {
    /// Shorthand for creating an `AsSequence` segment.
    pub fn sequence<S: AsRef<[u32]>>(seq: S) -> Self {
        AsPathSegment::AsSequence(seq.as_ref().iter().copied().map_into().collect())
    }

    /// Shorthand for creating an `AsSet` segment.
    pub fn set<S: AsRef<[u32]>>(seq: S) -> Self {
        AsPathSegment::AsSet(seq.as_ref().iter().copied().map_into().collect())
    }

    /// Get the number of ASNs this segment adds to the route.
    pub fn route_len(&self) -> usize {
        match self {
            AsPathSegment::AsSequence(v) => v.len(),
            AsPathSegment::AsSet(_) => 1,
            AsPathSegment::ConfedSequence(_) | AsPathSegment::ConfedSet(_) => 0,
        }
    }

    pub fn asns(&self) -> &[Asn] {
        match self {
            AsPathSegment::AsSequence(v)
            | AsPathSegment::AsSet(v)
            | AsPathSegment::ConfedSequence(v)
            | AsPathSegment::ConfedSet(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.asns().len()
    }

    pub fn is_empty(&self) -> bool {
        self.asns().is_empty()
    }
}

/// AS path as a list of segments, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AsPath {
    pub segments: Vec<AsPathSegment>,
}

impl AsPath {
    pub fn new() -> AsPath {
        AsPath::default()
    }

    /// Shorthand for an AS path made of a single `AsSequence` segment.
    pub fn from_sequence<S: AsRef<[u32]>>(seq: S) -> Self {
        AsPath {
            segments: vec![AsPathSegment::sequence(seq)],
        }
    }

    pub fn append_segment(&mut self, segment: AsPathSegment) {
        self.segments.push(segment);
    }

    /// Number of ASNs a route with this path traversed.
    pub fn route_len(&self) -> usize {
        self.segments.iter().map(AsPathSegment::route_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The origin ASN, if the path ends with a sequence.
    pub fn origin(&self) -> Option<Asn> {
        match self.segments.last() {
            Some(AsPathSegment::AsSequence(v)) => v.last().copied(),
            _ => None,
        }
    }
}

impl Display for AsPathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AsPathSegment::AsSequence(v) => write!(f, "{}", v.iter().join(" ")),
            AsPathSegment::AsSet(v) => write!(f, "{{{}}}", v.iter().join(",")),
            AsPathSegment::ConfedSequence(v) => write!(f, "({})", v.iter().join(" ")),
            AsPathSegment::ConfedSet(v) => write!(f, "[{}]", v.iter().join(",")),
        }
    }
}

impl Display for AsPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let mut path = AsPath::from_sequence([1, 2, 3]);
        path.append_segment(AsPathSegment::set([4, 5]));
        assert_eq!(path.to_string(), "1 2 3 {4,5}");
        assert_eq!(path.route_len(), 4);
        assert_eq!(path.origin(), None);
    }

    #[test]
    fn test_origin() {
        let path = AsPath::from_sequence([6447, 15169]);
        assert_eq!(path.origin(), Some(Asn::from(15169)));
        assert_eq!(AsPath::new().origin(), None);
    }
}
