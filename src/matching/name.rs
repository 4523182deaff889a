// src/matching/name.rs - Identity key normalization

/// Normalize one identity field (name, city or state) for grouping.
///
/// Lower-cases, reads `&` and `+` as words, drops all other punctuation and
/// collapses whitespace. Letters and digits are never altered, so two values
/// normalize equal only when they differ in case, punctuation or spacing.
pub fn normalize_identity_field(value: &str) -> String {
    let mut normalized = value.to_lowercase();
    let char_substitutions = [("&", " and "), ("+", " plus ")];
    for (pattern, replacement) in &char_substitutions {
        normalized = normalized.replace(pattern, replacement);
    }
    // Apostrophes join ("Lee's" == "Lees"); everything else splits words.
    normalized = normalized
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized (name, city, state) tuple used to group candidate duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub name: String,
    pub city: String,
    pub state: String,
}

impl IdentityKey {
    pub fn new(name: &str, city: &str, state: &str) -> Self {
        Self {
            name: normalize_identity_field(name),
            city: normalize_identity_field(city),
            state: normalize_identity_field(state),
        }
    }

    /// A key without a name cannot identify an institution.
    pub fn is_usable(&self) -> bool {
        !self.name.is_empty()
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} / {}", self.name, self.city, self.state)
    }
}
