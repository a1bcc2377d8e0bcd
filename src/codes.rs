use log::warn;
use std::collections::BTreeSet;

/// The missing numbers of a `<prefix><zero-padded n>` code sequence,
/// re-encoded as full codes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Holes {
    /// Missing below the lowest existing number, i.e. `1..min`.
    pub initial: Vec<String>,
    /// Missing strictly between existing numbers.
    pub intermediate: Vec<String>,
}

/// Finds the numbers missing from a sequence of unit codes.
///
/// Holes only exist below an existing maximum: a deleted unit leaves a gap,
/// while an empty namespace simply continues at 1 and reports nothing. Each
/// unit type (pavilion, plot, niche) is its own namespace; callers partition
/// and run the detector per prefix.
///
/// A code that does not parse as `<prefix><digits>` counts neither as
/// existing nor as a hole. Legacy stock imported from spreadsheets carries
/// such codes, so they are tolerated, but each one is logged so an operator
/// can tell a real hole from a slot occupied by a malformed code.
pub fn detect_holes<I, S>(existing: I, prefix: &str, pad_width: usize) -> Holes
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut present = BTreeSet::new();
    for code in existing {
        let code = code.as_ref();
        match parse_suffix(code, prefix) {
            Some(n) => {
                present.insert(n);
            }
            None => warn!(
                "code {:?} does not match {}<number>, skipping it in gap detection",
                code, prefix
            ),
        }
    }

    let (min, max) = match (present.iter().next(), present.iter().next_back()) {
        (Some(&min), Some(&max)) => (min, max),
        _ => return Holes::default(),
    };

    let mut holes = Holes::default();
    for n in 1..max {
        if present.contains(&n) {
            continue;
        }
        let code = encode(prefix, n, pad_width);
        if n < min {
            holes.initial.push(code);
        } else {
            holes.intermediate.push(code);
        }
    }

    holes
}

fn parse_suffix(code: &str, prefix: &str) -> Option<u32> {
    let suffix = code.strip_prefix(prefix)?;
    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

fn encode(prefix: &str, n: u32, pad_width: usize) -> String {
    format!("{}{:0width$}", prefix, n, width = pad_width)
}
