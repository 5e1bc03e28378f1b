//! SPARQL text generation for the two query shapes the gateway issues:
//! a per-title property lookup and the multi-criteria unified search.

const PREFIXES: &str = "PREFIX dbo: <http://dbpedia.org/ontology/>\nPREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n";

/// Filter values for one unified search. An empty field places no
/// constraint at all; values within a field combine with OR, and every
/// field that carries values must match.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub years: Vec<i32>,
}

impl SearchFilter {
    pub fn for_genre(value: &str) -> Self {
        Self {
            genres: vec![value.to_string()],
            ..Self::default()
        }
    }

    pub fn for_tag(value: &str) -> Self {
        Self {
            tags: vec![value.to_string()],
            ..Self::default()
        }
    }

    pub fn for_actor(value: &str) -> Self {
        Self {
            actors: vec![value.to_string()],
            ..Self::default()
        }
    }

    pub fn for_director(value: &str) -> Self {
        Self {
            directors: vec![value.to_string()],
            ..Self::default()
        }
    }

    pub fn for_years(years: Vec<i32>) -> Self {
        Self {
            years,
            ..Self::default()
        }
    }

    /// Short description of the filter for diagnostics.
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = self
            .genres
            .iter()
            .chain(&self.tags)
            .chain(&self.actors)
            .chain(&self.directors)
            .cloned()
            .collect();
        parts.extend(self.years.iter().map(|y| y.to_string()));
        parts.join(", ")
    }
}

/// Lookup query for one film: English-labelled films whose label contains
/// the cleaned title, with optional starring and director labels.
pub fn properties_query(clean_title: &str, limit: usize) -> String {
    format!(
        r#"{PREFIXES}SELECT ?actorLabel ?directorLabel WHERE {{
  ?film a ?type ;
        rdfs:label ?label .
  FILTER (?type IN (dbo:Film, dbo:Movie))
  FILTER (lang(?label) = 'en')
  FILTER CONTAINS(LCASE(?label), LCASE("{title}"))
  OPTIONAL {{
    ?film dbo:starring ?actor .
    ?actor rdfs:label ?actorLabel .
    FILTER (lang(?actorLabel) = 'en')
  }}
  OPTIONAL {{
    ?film dbo:director ?director .
    ?director rdfs:label ?directorLabel .
    FILTER (lang(?directorLabel) = 'en')
  }}
}}
LIMIT {limit}
"#,
        title = escape_literal(clean_title),
    )
}

/// Unified candidate search. Fields without values are omitted entirely;
/// each present field contributes a required pattern whose values are ORed.
pub fn unified_query(filter: &SearchFilter, year_window: i32, limit: usize) -> String {
    let mut body = String::new();
    body.push_str("  ?film a ?type ;\n");
    body.push_str("        rdfs:label ?filmTitle .\n");
    body.push_str("  FILTER (?type IN (dbo:Film, dbo:Movie))\n");
    body.push_str("  FILTER (lang(?filmTitle) = 'en')\n");

    if !filter.actors.is_empty() {
        body.push_str("  ?film dbo:starring ?actor .\n");
        body.push_str("  ?actor rdfs:label ?actorLabel .\n");
        body.push_str("  FILTER (lang(?actorLabel) = 'en')\n");
        body.push_str(&contains_filter("?actorLabel", &filter.actors));
    }

    if !filter.directors.is_empty() {
        body.push_str("  ?film dbo:director ?director .\n");
        body.push_str("  ?director rdfs:label ?directorLabel .\n");
        body.push_str("  FILTER (lang(?directorLabel) = 'en')\n");
        body.push_str(&contains_filter("?directorLabel", &filter.directors));
    }

    if !filter.genres.is_empty() {
        body.push_str("  ?film dbo:genre ?genre .\n");
        body.push_str("  ?genre rdfs:label ?genreLabel .\n");
        body.push_str("  FILTER (lang(?genreLabel) = 'en')\n");
        body.push_str(&contains_filter("?genreLabel", &filter.genres));
    }

    if !filter.years.is_empty() {
        body.push_str("  ?film dbo:releaseDate ?releaseDate .\n");
        let windows: Vec<String> = filter
            .years
            .iter()
            .map(|y| {
                format!(
                    "(YEAR(?releaseDate) >= {} && YEAR(?releaseDate) <= {})",
                    y - year_window,
                    y + year_window
                )
            })
            .collect();
        body.push_str(&format!("  FILTER ({})\n", windows.join(" || ")));
    }

    // Tag text is matched against the film label itself.
    if !filter.tags.is_empty() {
        body.push_str(&contains_filter("?filmTitle", &filter.tags));
    }

    format!("{PREFIXES}SELECT DISTINCT ?filmTitle WHERE {{\n{body}}}\nLIMIT {limit}\n")
}

fn contains_filter(var: &str, values: &[String]) -> String {
    let clauses: Vec<String> = values
        .iter()
        .map(|v| format!("CONTAINS(LCASE(STR({var})), LCASE(\"{}\"))", escape_literal(v)))
        .collect();
    format!("  FILTER ({})\n", clauses.join(" || "))
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
