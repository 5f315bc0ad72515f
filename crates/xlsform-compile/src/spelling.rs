//! Sheet name misspelling heuristic.

use xlsform_standards::constants::SUPPORTED_SHEET_NAMES;

/// Levenshtein edit distance, iterative two-row variant.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let deletion = prev[j + 1] + 1;
            let insertion = current[j] + 1;
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

/// Look for sheet names plausibly meant to be `target` (case-insensitive
/// edit distance of at most 2), skipping recognized sheet names and the
/// `_` opt-out prefix. Returns a message listing the candidates, or
/// `None` when there are none.
pub fn find_sheet_misspellings<'a, I>(target: &str, names: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidates: Vec<&str> = names
        .into_iter()
        .filter(|name| {
            levenshtein_distance(&name.to_lowercase(), target) <= 2
                && !SUPPORTED_SHEET_NAMES.contains(&name.to_lowercase().as_str())
                && !name.starts_with('_')
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let listed: Vec<String> = candidates
        .iter()
        .map(|name| format!("'{name}'"))
        .collect();
    Some(format!(
        "When looking for a sheet named '{target}', the following sheets with \
         similar names were found: {}.",
        listed.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::{find_sheet_misspellings, levenshtein_distance};

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein_distance("survey", "survey"), 0);
        assert_eq!(levenshtein_distance("stetings", "settings"), 2);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn suggests_close_names_only() {
        let msg = find_sheet_misspellings("settings", ["survey", "stetings"]).unwrap();
        assert!(msg.contains("'stetings'"), "{msg}");
        assert!(find_sheet_misspellings("settings", ["survey"]).is_none());
    }

    #[test]
    fn skips_recognized_and_opted_out_names() {
        assert!(find_sheet_misspellings("settings", ["choices", "_setings"]).is_none());
    }
}
