
use crate::dictionary::Dictionary;
use crate::intmap::IntMap;
use crate::vectors::VectorStore;

use rayon::prelude::*;
use std::collections::HashSet;

// default pruning thresholds for the precise ranking mode, candidates
// below either are not worth a cosine pass
pub const MIN_COUNT: u64 = 3;
pub const MIN_VECTOR_SIZE: usize = 30;

fn magnitude(v: &IntMap) -> f64 {
    v.iter()
        .map(|(_, value)| (value as f64) * (value as f64))
        .sum::<f64>()
        .sqrt()
}

// cosine of two sparse count vectors. The dot product iterates the
// smaller vector and probes the larger one. A zero magnitude on either
// side means "no similarity" and compares as 0.0, an IEEE NaN must
// never reach the ranking sort.
pub fn cosine(a: &IntMap, b: &IntMap) -> f64 {

    let (small, large) = if a.size() <= b.size() { (a, b) } else { (b, a) };

    let mut dot = 0.0f64;
    for (key, value) in small.iter() {
        let other = large.get(key);
        if other != 0 {
            dot += value as f64 * other as f64;
        }
    }
    if dot == 0.0 {
        return 0.0;
    }

    let norms = magnitude(a) * magnitude(b);
    if norms == 0.0 {
        return 0.0;
    }
    dot / norms
}

// read-only ranking over a finished vector space. Holds borrows only,
// ingestion must be done before one of these is built, after that any
// number of them can query the same space from different threads.
pub struct Similarity<'a> {
    dictionary: &'a Dictionary,
    store: &'a VectorStore,
    stoplist: &'a HashSet<String>,
    min_count: u64,
    min_vector_size: usize,
}

impl<'a> Similarity<'a> {

    pub fn new(
        dictionary: &'a Dictionary,
        store: &'a VectorStore,
        stoplist: &'a HashSet<String>,
    ) -> Similarity<'a> {
        Self {
            dictionary,
            store,
            stoplist,
            min_count: MIN_COUNT,
            min_vector_size: MIN_VECTOR_SIZE,
        }
    }

    pub fn with_thresholds(mut self, min_count: u64, min_vector_size: usize) -> Similarity<'a> {
        self.min_count = min_count;
        self.min_vector_size = min_vector_size;
        self
    }

    // the k distributionally closest terms to `term` by cosine over an
    // exact linear scan. Candidates come in descending frequency order,
    // so in precise mode the scan stops at the first one below the
    // count threshold and skips those with too small a vector. An
    // unknown term or one without a vector gives an empty ranking.
    pub fn neighbors(&self, term: &str, limit: usize, precise: bool) -> Vec<(String, f64)> {

        let query = match self.dictionary.id_of(term).and_then(|id| self.store.get(id)) {
            Some(vector) => vector,
            None => return Vec::new(),
        };

        let mut scored: Vec<(u32, u64, f64)> = Vec::new();
        for (candidate, count) in self.dictionary.by_count() {
            if precise && count < self.min_count {
                break;
            }
            let vector = match self.store.get(candidate) {
                Some(vector) => vector,
                None => continue,
            };
            if precise && vector.size() < self.min_vector_size {
                continue;
            }
            scored.push((candidate, count, cosine(query, vector)));
        }

        // score descending, ties by descending frequency then ascending id
        scored.sort_by(|a, b| {
            b.2.total_cmp(&a.2)
                .then(b.1.cmp(&a.1))
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(limit);

        scored
            .iter()
            .map(|(id, _, score)| (self.dictionary.word_of(*id).unwrap_or("").to_owned(), *score))
            .collect()
    }

    // ranks several query terms at once, the space is immutable here so
    // the scans run in parallel
    pub fn neighbors_many(&self, terms: &[&str], limit: usize, precise: bool) -> Vec<Vec<(String, f64)>> {
        terms
            .par_iter()
            .map(|term| self.neighbors(term, limit, precise))
            .collect()
    }

    // the raw co-occurrence listing of a term, strongest context first.
    // Entries for the reserved boundary id resolve to no word and are
    // dropped, stopword context can be dropped on request.
    pub fn context_of(&self, term: &str, limit: usize, exclude_stopwords: bool) -> Vec<(String, u64)> {

        let vector = match self.dictionary.id_of(term).and_then(|id| self.store.get(id)) {
            Some(vector) => vector,
            None => return Vec::new(),
        };

        let mut pairs: Vec<(String, u64)> = vector
            .to_sorted_array()
            .iter()
            .filter_map(|(context, count)| {
                self.dictionary.word_of(*context).map(|word| (word.to_owned(), *count as u64))
            })
            .filter(|(word, _)| !exclude_stopwords || !self.stoplist.contains(word))
            .collect();

        // stable sort on top of the ascending-key order, ties stay in
        // ascending id order
        pairs.sort_by(|a, b| b.1.cmp(&a.1));
        pairs.truncate(limit);
        pairs
    }
}

// comma joined `word:count` pairs, the context query output form
pub fn format_context(pairs: &[(String, u64)]) -> String {
    pairs
        .iter()
        .map(|(word, count)| format!("{}:{}", word, count))
        .collect::<Vec<String>>()
        .join(",")
}

// comma joined terms, with `word:score` when scores are requested
pub fn format_neighbors(ranked: &[(String, f64)], with_scores: bool) -> String {
    ranked
        .iter()
        .map(|(word, score)| {
            if with_scores {
                format!("{}:{:.4}", word, score)
            } else {
                word.to_owned()
            }
        })
        .collect::<Vec<String>>()
        .join(",")
}


#[cfg(test)]
mod tests {

    use super::{cosine, format_context, format_neighbors, Similarity};
    use crate::intmap::{IntMap, DEFAULT_FILL};
    use crate::vectors::Ingest;
    use std::collections::HashSet;

    fn map_of(pairs: &[(u32, u32)]) -> IntMap {
        let mut map = IntMap::new(8, DEFAULT_FILL);
        for (key, value) in pairs {
            map.put(*key, *value);
        }
        map
    }

    #[test]
    fn cosine_golden_example() {

        // dot = 4, both norms sqrt(5), cosine = 4/5
        let a = map_of(&[(1, 2), (2, 1)]);
        let b = map_of(&[(1, 1), (2, 2)]);

        let score = cosine(&a, &b);
        assert!((score - 0.8).abs() < 1e-12);
        assert_eq!(cosine(&a, &b), cosine(&b, &a));
    }

    #[test]
    fn cosine_of_a_vector_with_itself_is_one() {

        let a = map_of(&[(3, 7), (9, 1), (40, 2)]);
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_magnitude_is_no_similarity() {

        let empty = map_of(&[]);
        let a = map_of(&[(1, 5)]);

        // defined as 0.0, not NaN, so it sorts below any real score
        assert_eq!(cosine(&empty, &a), 0.0);
        assert_eq!(cosine(&a, &empty), 0.0);
        assert_eq!(cosine(&empty, &empty), 0.0);
    }

    #[test]
    fn disjoint_vectors_score_zero() {

        let a = map_of(&[(1, 2), (2, 3)]);
        let b = map_of(&[(7, 4), (8, 1)]);
        assert_eq!(cosine(&a, &b), 0.0);
    }

    fn small_space() -> (crate::dictionary::Dictionary, crate::vectors::VectorStore) {
        // two documents where "cat" and "dog" share their contexts and
        // "stone" shares none of them
        let mut ingest = Ingest::new(-1, 1, HashSet::new(), true);
        ingest.document(["the", "cat", "sat", "here"]);
        ingest.document(["the", "dog", "sat", "here"]);
        ingest.document(["a", "stone", "fell"]);
        ingest.finish()
    }

    #[test]
    fn neighbors_rank_shared_context_first() {

        let (dict, store) = small_space();
        let stoplist = HashSet::new();
        let sim = Similarity::new(&dict, &store, &stoplist);

        let ranked = sim.neighbors("cat", 3, false);
        assert_eq!(ranked.len(), 3);
        // the query term itself is a perfect match, then the term with
        // the identical context
        assert_eq!(ranked[0].0, "cat");
        assert!((ranked[0].1 - 1.0).abs() < 1e-12);
        assert_eq!(ranked[1].0, "dog");
        assert!((ranked[1].1 - 1.0).abs() < 1e-12);
        assert!(ranked[2].1 < 1.0);
    }

    #[test]
    fn unknown_terms_rank_empty() {

        let (dict, store) = small_space();
        let stoplist = HashSet::new();
        let sim = Similarity::new(&dict, &store, &stoplist);

        assert!(sim.neighbors("missing", 5, false).is_empty());
        assert!(sim.context_of("missing", 5, false).is_empty());
    }

    #[test]
    fn precise_mode_prunes_rare_candidates() {

        let (dict, store) = small_space();
        let stoplist = HashSet::new();
        // every term in the toy corpus occurs once or twice and has a
        // tiny vector, so precise mode with the default thresholds
        // prunes the whole candidate list
        let sim = Similarity::new(&dict, &store, &stoplist);
        assert!(sim.neighbors("cat", 5, true).is_empty());

        // lowering the thresholds brings the candidates back
        let relaxed = Similarity::new(&dict, &store, &stoplist).with_thresholds(1, 1);
        assert!(!relaxed.neighbors("cat", 5, true).is_empty());
    }

    #[test]
    fn context_listing_orders_by_count() {

        let mut ingest = Ingest::new(-1, 1, HashSet::new(), true);
        ingest.document(["x", "y", "x", "y", "x", "z"]);
        let (dict, store) = ingest.finish();
        let stoplist = HashSet::new();
        let sim = Similarity::new(&dict, &store, &stoplist);

        let context = sim.context_of("x", 10, false);
        // y flanks x four times, z once, the boundary entries resolve
        // to no word and are dropped from the listing
        assert_eq!(context[0], ("y".to_string(), 4));
        assert!(context.iter().any(|(w, c)| w == "z" && *c == 1));
        assert!(context.iter().all(|(w, _)| !w.is_empty()));
    }

    #[test]
    fn context_listing_can_exclude_stopwords() {

        let stoplist: HashSet<String> = ["the".to_string()].into_iter().collect();
        let mut ingest = Ingest::new(-1, 1, stoplist.clone(), true);
        ingest.document(["the", "cat", "the", "cat", "the"]);
        let (dict, store) = ingest.finish();
        let sim = Similarity::new(&dict, &store, &stoplist);

        let with = sim.context_of("cat", 10, false);
        assert!(with.iter().any(|(w, _)| w == "the"));

        let without = sim.context_of("cat", 10, true);
        assert!(without.iter().all(|(w, _)| w != "the"));
    }

    #[test]
    fn batch_ranking_matches_single_queries() {

        let (dict, store) = small_space();
        let stoplist = HashSet::new();
        let sim = Similarity::new(&dict, &store, &stoplist);

        let batch = sim.neighbors_many(&["cat", "dog"], 3, false);
        assert_eq!(batch[0], sim.neighbors("cat", 3, false));
        assert_eq!(batch[1], sim.neighbors("dog", 3, false));
    }

    #[test]
    fn output_formatting() {

        let context = vec![("sat".to_string(), 4), ("the".to_string(), 2)];
        assert_eq!(format_context(&context), "sat:4,the:2");

        let ranked = vec![("dog".to_string(), 1.0), ("stone".to_string(), 0.25)];
        assert_eq!(format_neighbors(&ranked, false), "dog,stone");
        assert_eq!(format_neighbors(&ranked, true), "dog:1.0000,stone:0.2500");
    }
}
