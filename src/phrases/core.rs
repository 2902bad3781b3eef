use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

use crate::sentence::Sentence;

static SETS_DIR: Dir = include_dir!("src/phrases/sets");

/// A named collection of practice sentences, embedded in the binary.
#[derive(Deserialize, Clone, Debug)]
pub struct PhraseSet {
    pub name: String,
    pub size: u32,
    pub sentences: Vec<String>,
}

impl PhraseSet {
    pub fn new(file_name: String) -> Self {
        read_set_from_file(format!("{file_name}.json")).unwrap()
    }

    /// The set's sentences, normalized. Entries that normalize to nothing
    /// are dropped.
    pub fn normalized(&self) -> Vec<Sentence> {
        self.sentences
            .iter()
            .filter_map(|raw| Sentence::parse(raw))
            .collect()
    }
}

fn read_set_from_file(file_name: String) -> Result<PhraseSet, Box<dyn Error>> {
    let file = SETS_DIR
        .get_file(file_name)
        .expect("Phrase set file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let set = from_str(file_as_str).expect("Unable to deserialize phrase set json");

    Ok(set)
}
