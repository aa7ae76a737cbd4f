use std::cmp::Ordering;

/// A dotted-numeric version with an optional pre-release suffix, compared
/// per `spec.md` §4.5: "ordered-dotted-numeric semantics with pre-release
/// suffixes compared lexicographically after the numeric tuple."
///
/// `1.2.0 < 1.2.0rc1`'s numeric tuples are equal, so the comparison falls
/// through to the suffix: the absence of a suffix sorts *after* any
/// suffix (a release is newer than any of its pre-releases), matching how
/// `remove_in <= current_version` should treat `2.0.0rc1 < 2.0.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    numeric: Vec<u64>,
    suffix: Option<String>,
}

impl Version {
    pub fn parse(text: &str) -> Self {
        let split_at = text.find(|c: char| !c.is_ascii_digit() && c != '.').unwrap_or(text.len());
        let (numeric_part, suffix_part) = text.split_at(split_at);
        let numeric = numeric_part
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.parse().unwrap_or(0))
            .collect();
        let suffix = if suffix_part.is_empty() {
            None
        } else {
            Some(suffix_part.to_string())
        };
        Self { numeric, suffix }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.numeric.len().max(other.numeric.len());
        for i in 0..len {
            let a = self.numeric.get(i).copied().unwrap_or(0);
            let b = other.numeric.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        // No suffix sorts after any suffix: a release postdates its own
        // release candidates.
        match (&self.suffix, &other.suffix) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_numeric_tuples() {
        assert!(Version::parse("1.9.0") < Version::parse("2.0.0"));
        assert!(Version::parse("2.0.0") <= Version::parse("2.0.0"));
        assert!(Version::parse("2.0") < Version::parse("2.0.1"));
    }

    #[test]
    fn release_postdates_its_pre_release() {
        assert!(Version::parse("2.0.0rc1") < Version::parse("2.0.0"));
        assert!(Version::parse("2.0.0a1") < Version::parse("2.0.0b1"));
    }
}
