
// imports
use crate::intmap::{IntMap, DEFAULT_FILL};

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

// grow-only interning dictionary between token strings and dense ids.
// Id 0 is reserved for "no term" (document padding, not-found), real
// ids are handed out from 1 upward in first-seen order and never move.
// Occurrence counts live in an IntMap keyed by id.
pub struct Dictionary {
    words: Vec<String>, // index = id, slot 0 holds the reserved empty term
    ids: HashMap<String, u32>,
    counts: IntMap,
    total: u64,
}

impl Dictionary {

    pub fn new() -> Dictionary {
        Self {
            words: vec![String::new()],
            ids: HashMap::new(),
            counts: IntMap::new(1024, DEFAULT_FILL),
            total: 0,
        }
    }

    // returns the existing id for a seen term or allocates the next
    // sequential one, and counts one occurrence either way
    pub fn intern(&mut self, term: &str) -> u32 {
        self.intern_with_count(term, 1)
    }

    // same as `intern` but counts `n` occurrences, used when loading
    // precomputed frequency lists
    pub fn intern_with_count(&mut self, term: &str, n: u32) -> u32 {

        let id = match self.ids.get(term) {
            Some(id) => *id,
            None => {
                let id = self.words.len() as u32;
                self.words.push(term.to_owned());
                self.ids.insert(term.to_owned(), id);
                id
            }
        };
        self.counts.add(id, n);
        self.total += n as u64;
        id
    }

    pub fn id_of(&self, term: &str) -> Option<u32> {
        self.ids.get(term).copied()
    }

    pub fn word_of(&self, id: u32) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.words.get(id as usize).map(|w| w.as_str())
    }

    pub fn count_of(&self, id: u32) -> u64 {
        self.counts.get(id) as u64
    }

    pub fn count_of_word(&self, term: &str) -> u64 {
        match self.id_of(term) {
            Some(id) => self.count_of(id),
            None => 0,
        }
    }

    // number of distinct terms, reserved id not included
    pub fn size(&self) -> usize {
        self.words.len() - 1
    }

    pub fn total_occurrences(&self) -> u64 {
        self.total
    }

    // ids ordered by descending count, ties broken by ascending id so
    // the order is total and stable across runs
    pub fn by_count(&self) -> Vec<(u32, u64)> {

        let mut pairs: Vec<(u32, u64)> = (1..self.words.len() as u32)
            .map(|id| (id, self.count_of(id)))
            .collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        pairs
    }

    pub fn words_by_count(&self) -> Vec<(&str, u64)> {
        self.by_count()
            .iter()
            .map(|(id, count)| (self.words[*id as usize].as_str(), *count))
            .collect()
    }

    // tab separated dump, WORD\tCOUNT\tKEY header then one line per
    // term. Lines go out in id (first-seen) order, so loading the file
    // into a fresh dictionary hands out the same ids again and a vector
    // snapshot saved next to it stays valid.
    pub fn save_tsv(&self, path: &Path) -> Result<(), Box<dyn Error>> {

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(b"WORD\tCOUNT\tKEY\n")?;
        for id in 1..self.words.len() as u32 {
            writeln!(writer, "{}\t{}\t{}", self.words[id as usize], self.count_of(id), id)?;
        }
        writer.flush()?;
        Ok(())
    }

    // additive load, the header line is skipped and every following line
    // is `word\tcount` (extra fields ignored) or a bare word counted
    // once. A count that does not parse falls back to 1 as well. Ids are
    // reassigned by this dictionary's own sequence, the KEY column of
    // the file is not preserved.
    pub fn load_tsv(&mut self, path: &Path) -> Result<usize, Box<dyn Error>> {

        let lines = io::BufReader::new(File::open(path)?).lines();
        let mut loaded = 0;
        for line in lines.skip(1) {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let word = fields.next().unwrap_or("");
            if word.is_empty() {
                continue;
            }
            let count = fields.next().and_then(|c| c.parse::<u32>().ok()).unwrap_or(1);
            self.intern_with_count(word, count);
            loaded += 1;
        }
        Ok(loaded)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::new()
    }
}


#[cfg(test)]
mod tests {

    use super::Dictionary;
    use std::env;

    #[test]
    fn ids_are_dense_and_stable() {

        let mut dict = Dictionary::new();

        let a = dict.intern("alpha");
        let b = dict.intern("beta");
        assert_eq!(a, 1);
        assert_eq!(b, 2);

        // interning again returns the same id and bumps the count
        assert_eq!(dict.intern("alpha"), a);
        assert_eq!(dict.count_of(a), 2);
        assert_eq!(dict.count_of(b), 1);

        assert_eq!(dict.id_of("alpha"), Some(1));
        assert_eq!(dict.word_of(2), Some("beta"));
        assert_eq!(dict.word_of(0), None);
        assert_eq!(dict.word_of(99), None);
        assert_eq!(dict.count_of(99), 0);

        assert_eq!(dict.size(), 2);
        assert_eq!(dict.total_occurrences(), 3);
    }

    #[test]
    fn by_count_orders_by_frequency_then_first_seen() {

        let mut dict = Dictionary::new();
        for token in ["x", "y", "x", "z"] {
            dict.intern(token);
        }

        assert_eq!(dict.count_of_word("x"), 2);
        assert_eq!(dict.count_of_word("y"), 1);
        assert_eq!(dict.count_of_word("z"), 1);

        // x first by count, then y before z by insertion order
        let ordered = dict.words_by_count();
        assert_eq!(ordered, vec![("x", 2), ("y", 1), ("z", 1)]);
    }

    #[test]
    fn tsv_round_trip_reassigns_ids() {

        let mut dict = Dictionary::new();
        for token in ["dog", "cat", "dog", "bird", "dog", "cat"] {
            dict.intern(token);
        }

        let path = env::temp_dir().join("wordspace_dict_roundtrip.tsv");
        dict.save_tsv(&path).unwrap();

        // load into a dictionary that already holds a term, the load is
        // additive and ids follow the loading dictionary's sequence
        let mut loaded = Dictionary::new();
        loaded.intern("fish");
        let n = loaded.load_tsv(&path).unwrap();
        assert_eq!(n, 3);

        assert_eq!(loaded.id_of("fish"), Some(1));
        assert_eq!(loaded.id_of("dog"), Some(2)); // first-seen order in the file
        assert_eq!(loaded.id_of("cat"), Some(3));
        assert_eq!(loaded.count_of_word("dog"), 3);
        assert_eq!(loaded.count_of_word("cat"), 2);
        assert_eq!(loaded.count_of_word("bird"), 1);
        assert_eq!(loaded.total_occurrences(), 7);
    }

    #[test]
    fn malformed_count_lines_fall_back_to_one() {

        use std::fs;

        let path = env::temp_dir().join("wordspace_dict_malformed.tsv");
        fs::write(&path, "WORD\tCOUNT\tKEY\nplain\nbroken\tnotanumber\nfine\t4\t9\n").unwrap();

        let mut dict = Dictionary::new();
        dict.load_tsv(&path).unwrap();

        assert_eq!(dict.count_of_word("plain"), 1);
        assert_eq!(dict.count_of_word("broken"), 1);
        assert_eq!(dict.count_of_word("fine"), 4);
    }
}
