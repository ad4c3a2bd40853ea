use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::IntoDeserializer;
use serde::Deserialize;

/// A word as stored in the vocabulary dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub meaning: String,
    pub example: String,
    pub kind: Option<PartOfSpeech>,
    pub similar: BTreeSet<String>,
    pub opposite: BTreeSet<String>,
    pub root_of: BTreeSet<String>,
    pub derived_from: BTreeSet<String>,
    /// How the record spelled its field names.
    pub field_spelling: Spelling,
    /// How the record spelled its kind.
    pub kind_spelling: Spelling,
}

/// Long names (`meaning`, `adjective`) or the dataset's short tokens
/// (`Mng`, `adj`). Entries are written back the way they were read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Spelling {
    #[default]
    Full,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    #[serde(alias = "adj")]
    Adjective,
    #[serde(alias = "adv")]
    Adverb,
    #[serde(alias = "aux")]
    Auxiliary,
    #[serde(alias = "conj")]
    Conjunction,
    #[serde(alias = "pro")]
    Pronoun,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 7] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
        PartOfSpeech::Auxiliary,
        PartOfSpeech::Conjunction,
        PartOfSpeech::Pronoun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
            PartOfSpeech::Adverb => "adverb",
            PartOfSpeech::Auxiliary => "auxiliary",
            PartOfSpeech::Conjunction => "conjunction",
            PartOfSpeech::Pronoun => "pronoun",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adj",
            PartOfSpeech::Adverb => "adv",
            PartOfSpeech::Auxiliary => "aux",
            PartOfSpeech::Conjunction => "conj",
            PartOfSpeech::Pronoun => "pro",
        }
    }

    pub fn spelled(self, spelling: Spelling) -> &'static str {
        match spelling {
            Spelling::Full => self.as_str(),
            Spelling::Short => self.abbreviation(),
        }
    }

    /// Parses a kind and reports which spelling it was given in.
    pub fn parse_spelled(s: &str) -> Result<(Self, Spelling), UnknownPartOfSpeech> {
        let kind: PartOfSpeech = s.parse()?;
        let spelling = if s == kind.as_str() {
            Spelling::Full
        } else {
            Spelling::Short
        };
        Ok((kind, spelling))
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPartOfSpeech(pub String);

impl fmt::Display for UnknownPartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not a kind", self.0)
    }
}

impl std::error::Error for UnknownPartOfSpeech {}

impl FromStr for PartOfSpeech {
    type Err = UnknownPartOfSpeech;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let deserializer: StrDeserializer<'_, ValueError> = s.into_deserializer();
        PartOfSpeech::deserialize(deserializer).map_err(|_| UnknownPartOfSpeech(s.to_owned()))
    }
}
