//! Version pattern matching over git tags.
//!
//! Versions are parsed tolerantly: any alphabetic prefix (`v`, `version`) is
//! skipped, `.` separates numeric parts, `-` starts the pre-release parts,
//! `+` the build parts, and `*` is a wildcard. Trailing zeros are dropped so
//! `1.2.3.0` equals `1.2.3`.
//!
//! Ordering deliberately diverges from semver: build parts take part in the
//! comparison, and between otherwise equal versions the longer spelling wins
//! (prefer `v1.0.0` over `1.0.0`, and `1.0.0` over `1.0`).

use std::cmp::Ordering;

/// A wildcard version part.
const WILDCARD: i64 = i64::MAX;

#[derive(Debug, Default, PartialEq, Eq)]
struct Version {
    normal: Vec<i64>,
    rc: Vec<i64>,
    build: Vec<i64>,
    has_rc: bool,
}

/// True iff the string contains only digits, dots and wildcards.
pub fn is_valid(version: &str) -> bool {
    version
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '*')
}

/// Match a version pattern against a tag. Only the normal parts take part
/// in matching; `ignore_rc` rejects pre-release tags outright.
pub fn matches(pattern: &str, tag: &str, ignore_rc: bool) -> bool {
    let tag_version = parse(tag);
    let pattern_parts = parse(pattern).normal;
    let tag_parts = &tag_version.normal;

    if ignore_rc && tag_version.has_rc {
        return false;
    }

    if pattern_parts == *tag_parts {
        return true;
    }

    for (i, &part) in pattern_parts.iter().enumerate() {
        if part == WILDCARD {
            if i == pattern_parts.len() - 1 {
                // trailing wildcard matches the rest
                return true;
            }
        } else if i >= tag_parts.len() {
            if part != 0 {
                // zero overflow is fine, anything else is a mismatch
                return false;
            }
        } else if part != tag_parts[i] {
            return false;
        }
    }

    // the pattern must cover all of the tag unless it ended with a wildcard
    pattern_parts.len() >= tag_parts.len()
}

/// Strict-weak version ordering, see the module docs for the tiebreaks.
pub fn less(lhs: &str, rhs: &str) -> bool {
    let lhs_parts = parse(lhs);
    let rhs_parts = parse(rhs);

    if lhs_parts.normal != rhs_parts.normal {
        return lhs_parts.normal < rhs_parts.normal;
    }

    if lhs_parts.has_rc != rhs_parts.has_rc {
        // a version without pre-release parts is the greater one
        return lhs_parts.has_rc;
    }

    if lhs_parts.rc != rhs_parts.rc {
        return lhs_parts.rc < rhs_parts.rc;
    }

    if lhs_parts.build != rhs_parts.build {
        return lhs_parts.build < rhs_parts.build;
    }

    lhs.len() < rhs.len()
}

/// Pick the highest tag matching the pattern. The result does not depend on
/// the input order of `tags`.
pub fn find_tag(pattern: &str, tags: &[String], ignore_rc: bool) -> Option<String> {
    let mut sorted_tags = tags.to_vec();
    sorted_tags.sort_by(|a, b| {
        if less(a, b) {
            Ordering::Greater
        } else if less(b, a) {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    });

    sorted_tags
        .into_iter()
        .find(|tag| matches(pattern, tag, ignore_rc))
}

enum State {
    Normal,
    Rc,
    Build,
}

fn parse(version: &str) -> Version {
    let mut result = Version::default();
    let mut state = State::Normal;

    let bytes = version.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let part: i64 = version[start..i].parse().unwrap_or(WILDCARD);
            parts_of(&mut result, &state).push(part);
            continue;
        }

        if c == b'*' {
            parts_of(&mut result, &state).push(WILDCARD);
        } else if c == b'-' && matches!(state, State::Normal) {
            state = State::Rc;
            result.has_rc = true;
        } else if c == b'+' && !matches!(state, State::Build) {
            state = State::Build;
        }

        i += 1;
    }

    remove_trailing_zeros(&mut result.normal);
    remove_trailing_zeros(&mut result.rc);
    remove_trailing_zeros(&mut result.build);

    result
}

fn parts_of<'a>(version: &'a mut Version, state: &State) -> &'a mut Vec<i64> {
    match state {
        State::Normal => &mut version.normal,
        State::Rc => &mut version.rc,
        State::Build => &mut version.build,
    }
}

fn remove_trailing_zeros(parts: &mut Vec<i64>) {
    while parts.last() == Some(&0) {
        parts.pop();
    }
}
