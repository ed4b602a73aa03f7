//! Record normalization: flatten nested records, detect their domain,
//! and keep only the attributes an instruction cares about.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::profiles::{EntityTypeProfile, ProfileStore};
use crate::types::record::{scalar_to_string, AttributeMap, NormalizedItem, Record, UNKNOWN_LABEL};

/// Verbs that ask for a grouping without naming an attribute.
const GENERIC_GROUPING_VERBS: &[&str] = &["group", "cluster", "organize", "arrange"];

/// Attributes always extracted so items can be identified.
const IDENTIFICATION_ATTRIBUTES: &[&str] = &["name", "title"];

/// Alternative record keys tried for a target attribute.
const ATTRIBUTE_SYNONYMS: &[(&str, &[&str])] = &[
    ("director", &["director", "directed_by", "directors"]),
    ("genre", &["genre", "genres", "category", "categories"]),
    ("year", &["year", "release_year", "date", "release_date"]),
    ("title", &["title", "name", "movie_title"]),
    ("name", &["name", "title", "company_name"]),
    ("industry", &["industry", "sector", "business_type"]),
    ("location", &["location", "country", "headquarters", "address"]),
];

/// Records sampled for entity-type detection.
const DETECTION_SAMPLE_SIZE: usize = 10;

/// Pick the attributes an instruction refers to.
///
/// Keyword hits come first (in profile order), then the profile defaults
/// for bare "group these" instructions, then the leading core attributes
/// when nothing matched. Name and title are always included last.
pub fn infer_relevant_attributes(instruction: &str, profile: &EntityTypeProfile) -> IndexSet<String> {
    let instruction = instruction.to_lowercase();
    let mut relevant = IndexSet::new();

    for (attribute, keywords) in profile.keywords {
        if keywords.iter().any(|k| instruction.contains(k)) {
            relevant.insert(attribute.to_string());
        }
    }

    let generic = GENERIC_GROUPING_VERBS
        .iter()
        .any(|verb| instruction.contains(verb));
    if generic && relevant.is_empty() {
        relevant.extend(profile.default_attributes.iter().map(|a| a.to_string()));
    }

    if relevant.is_empty() {
        relevant.extend(
            profile
                .leading_core_attributes(3)
                .iter()
                .map(|a| a.to_string()),
        );
    }

    relevant.extend(IDENTIFICATION_ATTRIBUTES.iter().map(|a| a.to_string()));
    relevant
}

/// Guess the domain of a record list from its attribute names.
///
/// Samples the first ten records and returns the first profile (in store
/// order) with any indicator attribute present, else the default profile.
pub fn detect_entity_type(records: &[Record], store: &ProfileStore) -> &'static EntityTypeProfile {
    let mut frequencies: IndexMap<String, usize> = IndexMap::new();
    for record in records.iter().take(DETECTION_SAMPLE_SIZE) {
        for name in attribute_names(record) {
            *frequencies.entry(name).or_default() += 1;
        }
    }

    store
        .iter()
        .find(|profile| {
            profile
                .indicators
                .iter()
                .any(|indicator| frequencies.contains_key(*indicator))
        })
        .unwrap_or_else(|| store.default_profile())
}

/// Choose a profile from an optional hint, detecting when needed.
pub fn resolve_profile(
    hint: Option<&str>,
    records: &[Record],
    store: &ProfileStore,
) -> &'static EntityTypeProfile {
    match hint.filter(|h| !h.trim().is_empty()) {
        Some(hint) => match store.get(hint) {
            Some(profile) => profile,
            None => {
                warn!(hint, "Unknown entity type hint, detecting instead");
                detect_entity_type(records, store)
            }
        },
        None => {
            let profile = detect_entity_type(records, store);
            info!(entity_type = profile.name, "Auto-detected entity type");
            profile
        }
    }
}

/// All attribute names of a record, bare and dotted, lower-cased.
pub fn attribute_names(record: &Record) -> Vec<String> {
    let mut names = Vec::new();
    collect_names(record, "", &mut names);
    names
}

fn collect_names(value: &Value, prefix: &str, out: &mut Vec<String>) {
    let Value::Object(map) = value else {
        return;
    };
    for (key, child) in map {
        let full_key = join_path(prefix, key);
        out.push(key.to_lowercase());
        out.push(full_key.to_lowercase());
        if child.is_object() {
            collect_names(child, &full_key, out);
        }
    }
}

/// Flatten a record into a map of scalar attributes.
///
/// Each scalar lands under both its bare key and its dotted path.
/// Lists of only strings or only numbers are joined with ", "; other
/// lists are skipped, as are empty values. On key collisions the last value written wins.
pub fn flatten(record: &Record) -> AttributeMap {
    let mut out = AttributeMap::new();
    flatten_into(record, "", &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &str, out: &mut AttributeMap) {
    let Value::Object(map) = value else {
        return;
    };
    for (key, child) in map {
        let full_key = join_path(prefix, key);
        let flat = match child {
            Value::Object(_) => {
                flatten_into(child, &full_key, out);
                continue;
            }
            Value::Array(list) => join_scalars(list).map(Value::String),
            scalar if is_empty_scalar(scalar) => None,
            scalar => Some(scalar.clone()),
        };
        if let Some(flat) = flat {
            out.insert(key.to_lowercase(), flat.clone());
            out.insert(full_key.to_lowercase(), flat);
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn join_scalars(list: &[Value]) -> Option<String> {
    // Only uniform lists: all strings or all numbers
    let uniform = match list.first()? {
        Value::String(_) => list.iter().all(Value::is_string),
        Value::Number(_) => list.iter().all(Value::is_number),
        _ => false,
    };
    uniform.then(|| {
        list.iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", ")
    })
}

fn is_empty_scalar(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Find a target attribute in a flattened record.
///
/// Tries the exact key, then each synonym for the target: exact first, then
/// any key containing or contained in the synonym. Several substring hits
/// resolve to the lexicographically smallest key.
pub fn resolve_attribute<'m>(flat: &'m AttributeMap, target: &str) -> Option<&'m Value> {
    let target = target.to_lowercase();
    if let Some(value) = flat.get(&target) {
        return Some(value);
    }

    let variations: Vec<&str> = ATTRIBUTE_SYNONYMS
        .iter()
        .find(|(attribute, _)| *attribute == target)
        .map(|(_, synonyms)| synonyms.to_vec())
        .unwrap_or_else(|| vec![target.as_str()]);

    for variation in variations {
        if let Some(value) = flat.get(variation) {
            return Some(value);
        }
        let partial = flat
            .keys()
            .filter(|key| !key.is_empty())
            .filter(|key| key.contains(variation) || variation.contains(key.as_str()))
            .min();
        if let Some(key) = partial {
            return flat.get(key);
        }
    }

    None
}

/// Normalize every record for an instruction.
///
/// Produces exactly one item per record, in record order. Items without a
/// name or title are labelled [`UNKNOWN_LABEL`].
pub fn extract<'a>(
    records: &'a [Record],
    profile: &EntityTypeProfile,
    instruction: &str,
) -> Vec<NormalizedItem<'a>> {
    let relevant = infer_relevant_attributes(instruction, profile);

    let items: Vec<_> = records
        .iter()
        .enumerate()
        .map(|(position, record)| normalize_record(record, position, &relevant))
        .collect();

    info!(
        items = items.len(),
        entity_type = profile.name,
        attributes = ?relevant,
        "Extracted relevant attributes"
    );
    items
}

fn normalize_record<'a>(
    record: &'a Record,
    position: usize,
    relevant: &IndexSet<String>,
) -> NormalizedItem<'a> {
    let flat = flatten(record);
    let mut item = NormalizedItem::new(record, position);

    for attribute in relevant {
        if let Some(value) = resolve_attribute(&flat, attribute) {
            item.attributes.insert(attribute.clone(), value.clone());
        }
    }

    if !item.has_identification() {
        debug!(id = %item.id, "Record has no name or title");
        item.attributes
            .insert("name".to_string(), Value::from(UNKNOWN_LABEL));
    }

    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{BOOK, COMPANY, MOVIE};
    use serde_json::json;

    fn movie(id: &str, name: &str, director: &str, genre: &str, year: i64) -> Record {
        json!({
            "id": id,
            "name": name,
            "properties": {
                "movie": {"director": director, "genre": genre, "year": year}
            }
        })
    }

    #[test]
    fn test_infer_director_query() {
        let attrs = infer_relevant_attributes("Group by Director", &MOVIE);
        let attrs: Vec<_> = attrs.iter().map(String::as_str).collect();
        assert_eq!(attrs, vec!["director", "name", "title"]);
    }

    #[test]
    fn test_infer_generic_verb_uses_defaults() {
        let attrs = infer_relevant_attributes("organize these", &COMPANY);
        let attrs: Vec<_> = attrs.iter().map(String::as_str).collect();
        assert_eq!(attrs, vec!["industry", "location", "size", "name", "title"]);
    }

    #[test]
    fn test_infer_falls_back_to_core_attributes() {
        let attrs = infer_relevant_attributes("something unrelated", &BOOK);
        let attrs: Vec<_> = attrs.iter().map(String::as_str).collect();
        assert_eq!(attrs, vec!["title", "author", "genre", "name"]);
    }

    #[test]
    fn test_infer_generic_verb_without_defaults_uses_core() {
        let attrs = infer_relevant_attributes("group them", &BOOK);
        assert!(attrs.contains("author"));
        assert!(attrs.contains("genre"));
    }

    #[test]
    fn test_detect_movie() {
        let records = vec![movie("1", "Heat", "Michael Mann", "Crime", 1995)];
        let store = ProfileStore::default();
        assert_eq!(detect_entity_type(&records, &store).name, "movie");
    }

    #[test]
    fn test_detect_company_and_book() {
        let store = ProfileStore::default();
        let companies = vec![json!({"name": "Acme", "details": {"industry": "Tools"}})];
        assert_eq!(detect_entity_type(&companies, &store).name, "company");

        let books = vec![json!({"title": "Dune", "isbn": "978-0441013593"})];
        assert_eq!(detect_entity_type(&books, &store).name, "book");
    }

    #[test]
    fn test_detect_defaults_to_first_profile() {
        let store = ProfileStore::default();
        let records = vec![json!({"color": "red"})];
        assert_eq!(detect_entity_type(&records, &store).name, "movie");
    }

    #[test]
    fn test_detect_only_samples_first_ten() {
        let store = ProfileStore::default();
        let mut records: Vec<Record> = (0..10).map(|i| json!({"id": i})).collect();
        records.push(json!({"author": "Herbert"}));
        assert_eq!(detect_entity_type(&records, &store).name, "movie");
    }

    #[test]
    fn test_resolve_profile_unknown_hint_detects() {
        let store = ProfileStore::default();
        let books = vec![json!({"title": "Dune", "author": "Herbert"})];
        assert_eq!(resolve_profile(Some("podcast"), &books, &store).name, "book");
        assert_eq!(resolve_profile(Some("company"), &books, &store).name, "company");
        assert_eq!(resolve_profile(None, &books, &store).name, "book");
    }

    #[test]
    fn test_attribute_names_include_paths() {
        let names = attribute_names(&json!({"A": {"B": 1}}));
        assert_eq!(names, vec!["a", "a", "b", "a.b"]);
    }

    #[test]
    fn test_flatten_nested_and_lists() {
        let record = json!({
            "Name": "Heat",
            "props": {
                "Director": "Michael Mann",
                "cast": ["Pacino", "De Niro"],
                "awards": [{"name": "x"}],
                "mixed": ["a", {"b": 1}],
                "empty": "",
                "runtime": 0,
                "missing": null
            }
        });

        let flat = flatten(&record);

        assert_eq!(flat["name"], "Heat");
        assert_eq!(flat["director"], "Michael Mann");
        assert_eq!(flat["props.director"], "Michael Mann");
        assert_eq!(flat["cast"], "Pacino, De Niro");
        assert!(!flat.contains_key("awards"));
        assert!(!flat.contains_key("mixed"));
        assert!(!flat.contains_key("empty"));
        assert!(!flat.contains_key("runtime"));
        assert!(!flat.contains_key("missing"));
    }

    #[test]
    fn test_flatten_drops_mixed_scalar_lists() {
        let record = json!({
            "cast": ["Pacino", 3, true],
            "flags": [true, false],
            "years": [1995, 2001]
        });

        let flat = flatten(&record);

        assert!(!flat.contains_key("cast"));
        assert!(!flat.contains_key("flags"));
        assert_eq!(flat["years"], "1995, 2001");
    }

    #[test]
    fn test_flatten_collision_last_write_wins() {
        let record = json!({
            "a": {"genre": "Drama"},
            "b": {"genre": "Comedy"}
        });
        let flat = flatten(&record);
        assert_eq!(flat["genre"], "Comedy");
        assert_eq!(flat["a.genre"], "Drama");
    }

    #[test]
    fn test_flatten_joins_numeric_lists() {
        let flat = flatten(&json!({"years": [1999, 2003]}));
        assert_eq!(flat["years"], "1999, 2003");
    }

    #[test]
    fn test_resolve_direct_and_synonym() {
        let flat = flatten(&json!({"directed_by": "Nolan", "release_year": 2010}));
        assert_eq!(*resolve_attribute(&flat, "director").unwrap(), "Nolan");
        assert_eq!(*resolve_attribute(&flat, "YEAR").unwrap(), 2010);
    }

    #[test]
    fn test_resolve_substring_ties_pick_smallest_key() {
        let mut flat = AttributeMap::new();
        flat.insert("studio_z".to_string(), json!("Zeta"));
        flat.insert("studio_a".to_string(), json!("Alpha"));
        assert_eq!(*resolve_attribute(&flat, "studio").unwrap(), "Alpha");

        let mut reversed = AttributeMap::new();
        reversed.insert("studio_a".to_string(), json!("Alpha"));
        reversed.insert("studio_z".to_string(), json!("Zeta"));
        assert_eq!(*resolve_attribute(&reversed, "studio").unwrap(), "Alpha");
    }

    #[test]
    fn test_resolve_missing() {
        let flat = flatten(&json!({"color": "red"}));
        assert!(resolve_attribute(&flat, "director").is_none());
    }

    #[test]
    fn test_extract_one_item_per_record() {
        let records = vec![
            movie("1", "The Dark Knight", "Christopher Nolan", "Action", 2008),
            movie("2", "Inception", "Christopher Nolan", "Sci-Fi", 2010),
            json!({"id": "3", "color": "blue"}),
        ];

        let items = extract(&records, &MOVIE, "group by director");

        assert_eq!(items.len(), 3);
        assert_eq!(*items[0].attribute("director").unwrap(), "Christopher Nolan");
        assert_eq!(items[1].label(), "Inception");
        assert_eq!(items[2].label(), UNKNOWN_LABEL);
        assert_eq!(items[2].position, 2);
        assert!(std::ptr::eq(items[1].record, &records[1]));
    }
}
