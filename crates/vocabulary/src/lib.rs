mod collection;
mod entry;
mod error;
mod word;

pub use collection::{
    convert, flatten_all, normalize, parse_collection, read_collection, to_json, write_output,
    ConvertOptions, InvalidEntryPolicy, Normalized, Report, OUTPUT_MODE,
};
pub use entry::{flatten, parse, RawRecord};
pub use error::{EntryError, Result, VocabularyError};
pub use word::{Entry, PartOfSpeech, Spelling, UnknownPartOfSpeech};
