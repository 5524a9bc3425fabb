//! Persona name resolution.
//!
//! Decides whether a mentioned character name refers to an existing persona
//! or a new one, using a match cascade evaluated in order with first hit
//! winning: exact, substring, fuzzy, alias. The cascade is greedy and order
//! dependent: resolving "A then B" can produce a different roster than
//! "B then A" when both are ambiguous against the same third name. That is a
//! documented property of processing mentions one at a time from a generated
//! list, not an accident, so the function takes an explicit ordered candidate
//! list and never consults the database itself.

use tracing::debug;

/// Canonical fuzzy-match cutoff, strictly exceeded to count as a match.
///
/// Normalized Levenshtein ratio between lowercased names. Catches close
/// misspellings ("Aragorn" vs "Arragorn" scores 0.875) without conflating
/// genuinely different names.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.83;

/// A persona as seen by the resolver: identity, display name, known aliases.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub aliases: Vec<String>,
}

/// Outcome of resolving one mentioned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The mention refers to this existing persona.
    Existing(i64),
    /// No known persona matched; the caller should create a new record.
    CreateNew,
}

/// Resolve a mentioned name against an ordered candidate list.
///
/// Rules are tried in order across the whole list; within a rule the first
/// candidate in list order wins, with no scoring among multiple hits.
pub fn resolve(candidate_name: &str, known: &[Candidate]) -> Resolution {
    let needle = candidate_name.trim().to_lowercase();
    if needle.is_empty() {
        return Resolution::CreateNew;
    }

    // 1. Exact, case-insensitive
    for persona in known {
        if persona.name.to_lowercase() == needle {
            return Resolution::Existing(persona.id);
        }
    }

    // 2. Substring either direction ("Gwen" vs "Gwendolyn")
    for persona in known {
        let name = persona.name.to_lowercase();
        if name.contains(&needle) || needle.contains(&name) {
            debug!(candidate = candidate_name, matched = %persona.name, "substring match");
            return Resolution::Existing(persona.id);
        }
    }

    // 3. Fuzzy: first candidate crossing the threshold, not the best-scoring one
    for persona in known {
        let ratio = strsim::normalized_levenshtein(&needle, &persona.name.to_lowercase());
        if ratio > FUZZY_MATCH_THRESHOLD {
            debug!(
                candidate = candidate_name,
                matched = %persona.name,
                ratio,
                "fuzzy match"
            );
            return Resolution::Existing(persona.id);
        }
    }

    // 4. Alias list, case-insensitive
    for persona in known {
        if persona
            .aliases
            .iter()
            .any(|alias| alias.to_lowercase() == needle)
        {
            debug!(candidate = candidate_name, matched = %persona.name, "alias match");
            return Resolution::Existing(persona.id);
        }
    }

    Resolution::CreateNew
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, name: &str) -> Candidate {
        Candidate { id, name: name.into(), aliases: Vec::new() }
    }

    fn candidate_with_aliases(id: i64, name: &str, aliases: &[&str]) -> Candidate {
        Candidate {
            id,
            name: name.into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let known = vec![candidate(1, "Gwendolyn")];
        assert_eq!(resolve("gwendolyn", &known), Resolution::Existing(1));
        assert_eq!(resolve("GWENDOLYN", &known), Resolution::Existing(1));
    }

    #[test]
    fn substring_match_both_directions() {
        let known = vec![candidate(1, "Gwendolyn")];
        assert_eq!(resolve("Gwen", &known), Resolution::Existing(1));

        let known = vec![candidate(2, "Gwen")];
        assert_eq!(resolve("Gwendolyn", &known), Resolution::Existing(2));
    }

    #[test]
    fn fuzzy_match_above_threshold() {
        let known = vec![candidate(1, "Aragorn")];
        // One edit over eight characters: ratio 0.875 > 0.83
        assert_eq!(resolve("Arragorn", &known), Resolution::Existing(1));
    }

    #[test]
    fn unrelated_name_creates_new() {
        let known = vec![candidate(1, "Aragorn")];
        assert_eq!(resolve("Bob", &known), Resolution::CreateNew);
    }

    #[test]
    fn alias_match_wins_when_fuzzy_is_low() {
        // "Theron" vs "The King" is far below the fuzzy threshold but is a
        // listed alias, so the cascade still resolves to the existing persona.
        let known = vec![candidate_with_aliases(1, "The King", &["Theron"])];
        assert!(strsim::normalized_levenshtein("theron", "the king") < FUZZY_MATCH_THRESHOLD);
        assert_eq!(resolve("Theron", &known), Resolution::Existing(1));
    }

    #[test]
    fn exact_beats_substring() {
        // "Gwen" is a substring of candidate 1 but an exact match of candidate 2.
        let known = vec![candidate(1, "Gwendolyn"), candidate(2, "Gwen")];
        assert_eq!(resolve("Gwen", &known), Resolution::Existing(2));
    }

    #[test]
    fn first_candidate_wins_within_a_rule() {
        // Both known names contain the mention; list order decides.
        let known = vec![candidate(1, "Gwendolyn the Bold"), candidate(2, "Gwendolyn the Meek")];
        assert_eq!(resolve("Gwendolyn", &known), Resolution::Existing(1));

        let reordered = vec![candidate(2, "Gwendolyn the Meek"), candidate(1, "Gwendolyn the Bold")];
        assert_eq!(resolve("Gwendolyn", &reordered), Resolution::Existing(2));
    }

    #[test]
    fn below_threshold_creates_new() {
        // "Faramir" vs "Boromir": distance 3 over 7, ratio ~0.57
        let known = vec![candidate(1, "Faramir")];
        assert_eq!(resolve("Boromir", &known), Resolution::CreateNew);
    }

    #[test]
    fn empty_name_creates_new() {
        let known = vec![candidate(1, "Gwendolyn")];
        assert_eq!(resolve("  ", &known), Resolution::CreateNew);
    }

    #[test]
    fn empty_roster_creates_new() {
        assert_eq!(resolve("Grog", &[]), Resolution::CreateNew);
    }
}
