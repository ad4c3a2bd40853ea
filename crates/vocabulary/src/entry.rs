use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::EntryError;
use crate::word::{Entry, PartOfSpeech, Spelling};

/// An untyped record as it comes out of (or goes into) a serialization format.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Field {
    Meaning,
    Example,
    Kind,
    Similar,
    Opposite,
    RootOf,
    DerivedFrom,
}

impl Field {
    const ALL: [Field; 7] = [
        Field::Meaning,
        Field::Example,
        Field::Kind,
        Field::Similar,
        Field::Opposite,
        Field::RootOf,
        Field::DerivedFrom,
    ];

    fn lookup(key: &str) -> Option<(Field, Spelling)> {
        Field::ALL.into_iter().find_map(|field| {
            if key == field.name() {
                Some((field, Spelling::Full))
            } else if key == field.token() {
                Some((field, Spelling::Short))
            } else {
                None
            }
        })
    }

    fn name(self) -> &'static str {
        match self {
            Field::Meaning => "meaning",
            Field::Example => "example",
            Field::Kind => "kind",
            Field::Similar => "similar",
            Field::Opposite => "opposite",
            Field::RootOf => "rootOf",
            Field::DerivedFrom => "derivedFrom",
        }
    }

    /// The short token used by the hand-edited dataset.
    fn token(self) -> &'static str {
        match self {
            Field::Meaning => "Mng",
            Field::Example => "Exmp",
            Field::Kind => "Knd",
            Field::Similar => "Smlr",
            Field::Opposite => "Opst",
            Field::RootOf => "Prnt",
            Field::DerivedFrom => "Cdrn",
        }
    }

    fn spelled(self, spelling: Spelling) -> &'static str {
        match spelling {
            Spelling::Full => self.name(),
            Spelling::Short => self.token(),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

fn text(field: Field, value: &Value) -> Result<String, EntryError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(EntryError::WrongType {
            field: field.name(),
            expected: "a string",
            found: type_name(other),
        }),
    }
}

fn identifiers(field: Field, value: &Value) -> Result<BTreeSet<String>, EntryError> {
    let Value::Array(items) = value else {
        return Err(EntryError::WrongType {
            field: field.name(),
            expected: "a sequence of strings",
            found: type_name(value),
        });
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(word) => Ok(word.clone()),
            other => Err(EntryError::NonStringElement {
                field: field.name(),
                index,
                found: type_name(other),
            }),
        })
        .collect()
}

/// Validates a raw record and builds the typed entry from it.
///
/// Missing fields keep their zero value. A field that is present must have the
/// right shape, so `null` is rejected. Unrecognized field names are ignored.
pub fn parse(raw: &RawRecord) -> Result<Entry, EntryError> {
    let mut entry = Entry::default();
    let mut seen = BTreeSet::new();
    let mut spelling = None;
    for (key, value) in raw {
        let Some((field, used)) = Field::lookup(key) else {
            warn!(field = %key, "ignoring unrecognized field");
            continue;
        };
        if !seen.insert(field) {
            return Err(EntryError::DuplicateField { field: field.name() });
        }
        match spelling {
            None => spelling = Some(used),
            Some(first) if first != used => return Err(EntryError::MixedFieldSpelling),
            Some(_) => {}
        }
        match field {
            Field::Meaning => entry.meaning = text(field, value)?,
            Field::Example => entry.example = text(field, value)?,
            Field::Kind => {
                let (kind, kind_spelling) = PartOfSpeech::parse_spelled(&text(field, value)?)?;
                entry.kind = Some(kind);
                entry.kind_spelling = kind_spelling;
            }
            Field::Similar => entry.similar = identifiers(field, value)?,
            Field::Opposite => entry.opposite = identifiers(field, value)?,
            Field::RootOf => entry.root_of = identifiers(field, value)?,
            Field::DerivedFrom => entry.derived_from = identifiers(field, value)?,
        }
    }
    entry.field_spelling = spelling.unwrap_or_default();
    Ok(entry)
}

fn sequence(words: &BTreeSet<String>) -> Value {
    Value::Array(words.iter().cloned().map(Value::String).collect())
}

/// Turns an entry back into an untyped record, spelled the way it was read.
/// Every field is always present.
pub fn flatten(entry: &Entry) -> RawRecord {
    let key = |field: Field| field.spelled(entry.field_spelling).to_owned();
    let kind = entry
        .kind
        .map(|kind| kind.spelled(entry.kind_spelling))
        .unwrap_or_default();
    let mut record = RawRecord::new();
    record.insert(key(Field::Meaning), entry.meaning.clone().into());
    record.insert(key(Field::Example), entry.example.clone().into());
    record.insert(key(Field::Kind), kind.into());
    record.insert(key(Field::Similar), sequence(&entry.similar));
    record.insert(key(Field::Opposite), sequence(&entry.opposite));
    record.insert(key(Field::RootOf), sequence(&entry.root_of));
    record.insert(key(Field::DerivedFrom), sequence(&entry.derived_from));
    record
}
