use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use serde_yaml::{Mapping, Value as YamlValue};
use tracing::{info, warn};

use crate::entry::{flatten, parse, RawRecord};
use crate::error::{EntryError, Result, VocabularyError};
use crate::word::Entry;

/// File mode of the generated database.
pub const OUTPUT_MODE: u32 = 0o664;

/// What to do when one record of the collection fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidEntryPolicy {
    /// Stop at the first invalid record; nothing gets written.
    #[default]
    Abort,
    /// Leave invalid records out of the output and report them.
    Skip,
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub pretty: bool,
    pub policy: InvalidEntryPolicy,
}

#[derive(Debug, Default)]
pub struct Normalized {
    pub entries: BTreeMap<String, Entry>,
    pub skipped: Vec<(String, EntryError)>,
}

#[derive(Debug, Default)]
pub struct Report {
    pub converted: usize,
    pub skipped: Vec<(String, EntryError)>,
}

fn describe(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a sequence",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}

fn to_record(word: &str, mapping: Mapping) -> Result<RawRecord> {
    let mut record = RawRecord::new();
    for (key, value) in mapping {
        let YamlValue::String(field) = key else {
            return Err(VocabularyError::Structure(format!(
                "entry {word:?} has a field name that is not a string"
            )));
        };
        record.insert(field, to_json_value(word, value)?);
    }
    Ok(record)
}

/// Converts one YAML value into its JSON counterpart. Non-finite floats have
/// no JSON form and are rejected rather than turned into `null`.
fn to_json_value(word: &str, value: YamlValue) -> Result<JsonValue> {
    let converted = match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(flag) => JsonValue::Bool(flag),
        YamlValue::Number(number) => {
            if let Some(integer) = number.as_i64() {
                JsonValue::from(integer)
            } else if let Some(integer) = number.as_u64() {
                JsonValue::from(integer)
            } else {
                number
                    .as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .ok_or_else(|| {
                        VocabularyError::Structure(format!(
                            "entry {word:?} contains the non-finite number {number}"
                        ))
                    })?
            }
        }
        YamlValue::String(text) => JsonValue::String(text),
        YamlValue::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(|item| to_json_value(word, item))
                .collect::<Result<_>>()?,
        ),
        YamlValue::Mapping(mapping) => JsonValue::Object(to_record(word, mapping)?),
        YamlValue::Tagged(tagged) => to_json_value(word, tagged.value)?,
    };
    Ok(converted)
}

/// Parses the YAML document into named raw records.
///
/// An empty document is an empty collection, and a word with no body is an
/// empty record.
pub fn parse_collection(text: &str) -> Result<BTreeMap<String, RawRecord>> {
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let document: YamlValue = serde_yaml::from_str(text)?;
    let mapping = match document {
        YamlValue::Null => return Ok(BTreeMap::new()),
        YamlValue::Mapping(mapping) => mapping,
        other => {
            return Err(VocabularyError::Structure(format!(
                "expected a mapping of words, found {}",
                describe(&other)
            )))
        }
    };

    let mut collection = BTreeMap::new();
    for (key, value) in mapping {
        let word = match key {
            YamlValue::String(word) => word,
            other => {
                return Err(VocabularyError::Structure(format!(
                    "word identifiers must be strings, found {}",
                    describe(&other)
                )))
            }
        };
        let record = match value {
            YamlValue::Null => RawRecord::new(),
            YamlValue::Mapping(mapping) => to_record(&word, mapping)?,
            other => {
                return Err(VocabularyError::Structure(format!(
                    "entry {word:?} must be a mapping, found {}",
                    describe(&other)
                )))
            }
        };
        collection.insert(word, record);
    }
    Ok(collection)
}

pub fn read_collection(path: &Path) -> Result<BTreeMap<String, RawRecord>> {
    let text = fs::read_to_string(path).map_err(|source| VocabularyError::Read {
        path: path.to_owned(),
        source,
    })?;
    parse_collection(&text)
}

pub fn normalize(
    raw: &BTreeMap<String, RawRecord>,
    policy: InvalidEntryPolicy,
) -> Result<Normalized> {
    let mut normalized = Normalized::default();
    for (word, record) in raw {
        match parse(record) {
            Ok(entry) => {
                info!(word = %word, entry = ?entry, "normalized entry");
                normalized.entries.insert(word.clone(), entry);
            }
            Err(source) if policy == InvalidEntryPolicy::Skip => {
                warn!(word = %word, error = %source, "skipping invalid entry");
                normalized.skipped.push((word.clone(), source));
            }
            Err(source) => {
                return Err(VocabularyError::Entry {
                    word: word.clone(),
                    source,
                })
            }
        }
    }
    Ok(normalized)
}

pub fn flatten_all(entries: &BTreeMap<String, Entry>) -> BTreeMap<String, RawRecord> {
    entries
        .iter()
        .map(|(word, entry)| (word.clone(), flatten(entry)))
        .collect()
}

pub fn to_json(collection: &BTreeMap<String, RawRecord>, pretty: bool) -> Result<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(collection)?
    } else {
        serde_json::to_vec(collection)?
    };
    Ok(bytes)
}

/// Writes the whole output in one go, creating the file with [`OUTPUT_MODE`].
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(OUTPUT_MODE);
    }
    let to_write_error = |source| VocabularyError::Write {
        path: path.to_owned(),
        source,
    };
    let mut file = options.open(path).map_err(to_write_error)?;
    file.write_all(bytes).map_err(to_write_error)?;
    file.flush().map_err(to_write_error)
}

/// Runs the whole conversion. The output file is only touched once every
/// entry has been validated and serialized.
pub fn convert(options: &ConvertOptions) -> Result<Report> {
    info!(input = %options.input.display(), "reading vocabulary");
    let raw = read_collection(&options.input)?;
    let normalized = normalize(&raw, options.policy)?;
    let flattened = flatten_all(&normalized.entries);
    let bytes = to_json(&flattened, options.pretty)?;
    write_output(&options.output, &bytes)?;
    info!(
        output = %options.output.display(),
        converted = flattened.len(),
        skipped = normalized.skipped.len(),
        "wrote database"
    );
    Ok(Report {
        converted: flattened.len(),
        skipped: normalized.skipped,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_document_is_an_empty_collection() {
        assert!(parse_collection("").unwrap().is_empty());
        assert!(parse_collection("{}\n").unwrap().is_empty());
        assert!(parse_collection("~\n").unwrap().is_empty());
    }

    #[test]
    fn word_without_body_is_an_empty_record() {
        let collection = parse_collection("happy:\n").unwrap();
        assert_eq!(collection["happy"], RawRecord::new());
    }

    #[test]
    fn records_keep_their_fields() {
        let collection = parse_collection(
            "happy:\n  kind: adjective\n  meaning: feeling joy\n  similar: [glad, joyful]\n",
        )
        .unwrap();
        assert_eq!(
            serde_json::Value::Object(collection["happy"].clone()),
            json!({
                "kind": "adjective",
                "meaning": "feeling joy",
                "similar": ["glad", "joyful"],
            })
        );
    }

    #[test]
    fn malformed_collections_are_rejected() {
        assert!(matches!(
            parse_collection("- happy\n- sad\n"),
            Err(VocabularyError::Structure(_))
        ));
        assert!(matches!(
            parse_collection("happy: glad\n"),
            Err(VocabularyError::Structure(_))
        ));
        assert!(matches!(
            parse_collection("42:\n  kind: noun\n"),
            Err(VocabularyError::Structure(_))
        ));
        assert!(matches!(
            parse_collection("happy: [unclosed\n"),
            Err(VocabularyError::Yaml(_))
        ));
    }

    #[test]
    fn empty_field_values_abort_the_batch() {
        let raw = parse_collection("happy:\n  similar:\n  meaning: ~\n").unwrap();
        match normalize(&raw, InvalidEntryPolicy::Abort) {
            Err(VocabularyError::Entry { word, source }) => {
                assert_eq!(word, "happy");
                assert!(matches!(source, EntryError::WrongType { found: "null", .. }));
            }
            other => panic!("expected an entry error, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for text in [
            "happy:\n  kind: .nan\n",
            "happy:\n  similar: [glad, .inf]\n",
            "happy:\n  meaning: -.inf\n",
        ] {
            assert!(
                matches!(parse_collection(text), Err(VocabularyError::Structure(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn finite_numbers_reach_the_normalizer() {
        let raw = parse_collection("happy:\n  kind: 1.5\n  similar: [glad, 7]\n").unwrap();
        assert_eq!(raw["happy"]["kind"], json!(1.5));
        assert_eq!(raw["happy"]["similar"], json!(["glad", 7]));
        assert!(normalize(&raw, InvalidEntryPolicy::Abort).is_err());
    }

    #[test]
    fn abort_policy_stops_at_first_invalid_entry() {
        let raw = parse_collection("good:\n  kind: noun\nx:\n  kind: invalid-kind\n").unwrap();
        match normalize(&raw, InvalidEntryPolicy::Abort) {
            Err(VocabularyError::Entry { word, source }) => {
                assert_eq!(word, "x");
                assert!(matches!(source, EntryError::UnknownKind(_)));
            }
            other => panic!("expected an entry error, got {other:?}"),
        }
    }

    #[test]
    fn skip_policy_reports_invalid_entries() {
        let raw = parse_collection("good:\n  kind: noun\nx:\n  kind: invalid-kind\n").unwrap();
        let normalized = normalize(&raw, InvalidEntryPolicy::Skip).unwrap();
        assert_eq!(normalized.entries.keys().collect::<Vec<_>>(), ["good"]);
        assert_eq!(normalized.skipped.len(), 1);
        assert_eq!(normalized.skipped[0].0, "x");
    }

    #[test]
    fn pretty_output_is_the_same_document() {
        let raw = parse_collection("happy:\n  similar: [glad]\n").unwrap();
        let normalized = normalize(&raw, InvalidEntryPolicy::Abort).unwrap();
        let flattened = flatten_all(&normalized.entries);
        let compact: serde_json::Value =
            serde_json::from_slice(&to_json(&flattened, false).unwrap()).unwrap();
        let pretty: serde_json::Value =
            serde_json::from_slice(&to_json(&flattened, true).unwrap()).unwrap();
        assert_eq!(compact, pretty);
        assert_eq!(compact["happy"]["similar"], json!(["glad"]));
    }
}
