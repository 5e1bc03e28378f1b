use once_cell::sync::Lazy;
use regex::Regex;

static LANG_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"@en$").unwrap());
static EDGE_QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"+|"+$"#).unwrap());
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
static ALIAS_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(a\.k\.a\.[^)]*\)").unwrap());
static YEAR_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\d{4}\)").unwrap());
static EMBEDDED_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{4})\)").unwrap());
static DASH_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-.*").unwrap());
static QUOTED_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.*)""#).unwrap());
static THROUGH_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r".*\)").unwrap());
static LEADING_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^,+").unwrap());

/// Canonical deduplication key for a raw title variant: drops a trailing
/// language marker, surrounding quotes and every parenthesized segment
/// (aliases and embedded years alike), then trims. Idempotent, so two raw
/// strings naming the same film collapse to one key.
pub fn normalize_title(raw: &str) -> String {
    let s = LANG_MARKER.replace(raw, "");
    let s = EDGE_QUOTES.replace_all(&s, "");
    let s = PARENTHETICAL.replace_all(&s, "");
    s.trim().to_string()
}

/// Title form sent to the knowledge graph for property lookups: alias
/// clauses and parentheticals removed, anything after a hyphen dropped,
/// quotes stripped.
pub fn clean_for_lookup(raw: &str) -> String {
    let s = ALIAS_CLAUSE.replace_all(raw, "");
    let s = PARENTHETICAL.replace_all(&s, "");
    let s = DASH_SUFFIX.replace(&s, "");
    s.replace('"', "").trim().to_string()
}

/// Title form used when iterating liked movies: keeps non-year
/// parentheticals but drops the release year and any dash suffix.
pub fn clean_liked_title(raw: &str) -> String {
    let s = raw.replace('"', "");
    let s = YEAR_PAREN.replace_all(&s, "");
    let s = DASH_SUFFIX.replace(&s, "");
    s.trim().to_string()
}

/// Tag cleanup: keep the inner content of a quoted span if one exists,
/// trim, drop a trailing "- suffix" segment.
pub fn clean_tag(raw: &str) -> String {
    let s = match QUOTED_SPAN.captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => raw.to_string(),
    };
    let s = s.trim();
    DASH_SUFFIX.replace(s, "").trim().to_string()
}

pub fn clean_entity_label(raw: &str) -> String {
    LANG_MARKER.replace(raw, "").trim().to_string()
}

/// Display cleanup for frequency-table keys.
pub fn clean_frequency_key(raw: &str) -> String {
    let s = THROUGH_PAREN.replace(raw, "");
    let s = s.replace('"', "").replace("@en", "");
    let s = DASH_SUFFIX.replace(&s, "");
    let s = LEADING_COMMAS.replace(&s, "");
    s.trim().to_string()
}

/// Release year embedded in a title as "(YYYY)". The last such group wins
/// when a title carries more than one.
pub fn embedded_year(title: &str) -> Option<i32> {
    EMBEDDED_YEAR
        .captures_iter(title)
        .last()
        .and_then(|caps| caps[1].parse().ok())
}

/// Strips parenthesized segments only, for matching stored titles against a
/// normalized recommendation.
pub fn strip_parenthetical(title: &str) -> String {
    PARENTHETICAL.replace_all(title, "").trim().to_string()
}

/// Top-k keys by count, frequency descending with ascending key tie-break
/// so equal counts rank deterministically.
pub fn top_k_by_count<K, I>(counts: I, k: usize) -> Vec<(K, usize)>
where
    K: Ord,
    I: IntoIterator<Item = (K, usize)>,
{
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}
