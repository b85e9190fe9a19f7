//! Release-suffix scheme layered on top of `MAJOR.MINOR.PATCH`.
//!
//! Versions look like `1.2.0-qa-r3` or `1.2.0-r2`: the base triple followed
//! by `-`-separated segments, each an optional prefix token and an `r<N>`
//! counter token. Every prefix keeps its own counter.

use crate::error::{BumpError, Result};

/// One `[<prefix>-]r<N>` segment, stored as token positions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    prefix: Option<usize>,
    counter: Option<usize>,
}

/// A token is a counter when it is `r` followed by at least one digit and
/// nothing else. Overflowing digit runs still count and fail at parse time.
fn is_counter(token: &str) -> bool {
    token
        .strip_prefix('r')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

fn segments(tokens: &[&str]) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut pending: Option<usize> = None;

    for (index, token) in tokens.iter().enumerate() {
        if is_counter(token) {
            out.push(Segment {
                prefix: pending.take(),
                counter: Some(index),
            });
        } else {
            if let Some(prefix) = pending.take() {
                out.push(Segment {
                    prefix: Some(prefix),
                    counter: None,
                });
            }
            pending = Some(index);
        }
    }

    if let Some(prefix) = pending {
        out.push(Segment {
            prefix: Some(prefix),
            counter: None,
        });
    }

    out
}

/// Compute the next release-suffixed version.
///
/// Increments the counter of the segment owned by `prefix` (or the bare
/// `r<N>` segment when `prefix` is `None`), or appends a new segment
/// starting at `r1`. Other segments are left untouched.
///
/// # Errors
/// * `InvalidVersion` - the base is not a `MAJOR.MINOR.PATCH` triple
/// * `InvalidReleaseFormat` - the matching segment has no parsable counter,
///   or more than one segment matches
pub fn next_release(current: &str, prefix: Option<&str>) -> Result<String> {
    if let Some(p) = prefix {
        if p.is_empty() || p.contains('-') || is_counter(p) {
            return Err(BumpError::release_format(
                current,
                format!("'{}' cannot be used as a release prefix", p),
            ));
        }
    }

    let mut tokens: Vec<&str> = current.split('-').collect();
    let base = tokens.remove(0);
    validate_base(base)?;

    let matches: Vec<Segment> = segments(&tokens)
        .into_iter()
        .filter(|segment| match (prefix, segment.prefix) {
            (Some(p), Some(i)) => tokens[i] == p,
            (None, None) => true,
            _ => false,
        })
        .collect();

    let label = prefix.map_or_else(|| "r<N>".to_string(), |p| format!("{}-r<N>", p));

    let mut rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    match matches.as_slice() {
        [] => {
            if let Some(p) = prefix {
                rendered.push(p.to_string());
            }
            rendered.push("r1".to_string());
        }
        [segment] => {
            let index = segment.counter.ok_or_else(|| {
                BumpError::release_format(current, format!("segment {} has no counter", label))
            })?;
            let number = tokens[index][1..].parse::<u64>().map_err(|e| {
                BumpError::release_format(
                    current,
                    format!("cannot parse counter '{}': {}", tokens[index], e),
                )
            })?;
            let next = number.checked_add(1).ok_or_else(|| {
                BumpError::release_format(current, format!("counter '{}' overflows", tokens[index]))
            })?;
            rendered[index] = format!("r{}", next);
        }
        _ => {
            return Err(BumpError::release_format(
                current,
                format!("{} segments match {}", matches.len(), label),
            ));
        }
    }

    let mut version = base.to_string();
    for token in rendered {
        version.push('-');
        version.push_str(&token);
    }
    Ok(version)
}

fn validate_base(base: &str) -> Result<()> {
    let parts: Vec<&str> = base.split('.').collect();
    let well_formed = parts.len() == 3
        && parts.iter().all(|p| {
            !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()) && p.parse::<u64>().is_ok()
        });

    if well_formed {
        Ok(())
    } else {
        Err(BumpError::invalid_version(format!(
            "'{}' is not a MAJOR.MINOR.PATCH version",
            base
        )))
    }
}
