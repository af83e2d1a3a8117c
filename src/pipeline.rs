

// imports
use crate::config::{self, files_handling, Config, Params};
use crate::dictionary::Dictionary;
use crate::similarity::{format_context, format_neighbors, Similarity};
use crate::vectors::{Ingest, VectorStore};

use std::collections::HashSet;
use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufRead};
use std::path::Path;
use std::time::Instant;

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 3 steps -
    // -> configuration of arguments
    // -> corpus ingestion into the vector space
    // -> saving the space and answering the configured queries

    pub fn run() {

        println!("entering program...");
        let args: Vec<String> = env::args().collect();

        println!("building parameters...");
        let params = match Config::new(&args) {
            Ok(config) => config.get_params(),
            Err(e) => panic!("{}", e),
        };
        println!("{}", params);

        let timer = Instant::now();
        println!("starting corpus ingestion...");
        let (dictionary, store, stoplist) = match Pipeline::build(&params) {
            Ok(built) => built,
            Err(e) => panic!("{}", e),
        };
        println!(
            "ingested {} distinct terms, {} occurrences, {} vectors, took {} seconds ...",
            dictionary.size(),
            dictionary.total_occurrences(),
            store.size(),
            timer.elapsed().as_secs()
        );

        // save the dictionary and the vector snapshot side by side
        if let Err(e) = fs::create_dir_all(&params.output_dir) {
            panic!("{}", e)
        }
        let words_path = Path::new(&params.output_dir).join("words.tsv");
        if let Err(e) = dictionary.save_tsv(&words_path) {
            panic!("{}", e)
        }
        if let Err(e) = files_handling::save_output(&params.output_dir, "vectors", &store) {
            panic!("{}", e)
        }
        println!("saved dictionary and vectors to {}", params.output_dir);

        Pipeline::answer_queries(&params, &dictionary, &store, &stoplist);
    }

    // ingests every corpus file line by line, each line is one document.
    // An unreadable file is logged and skipped, the run carries on with
    // the rest of the corpus.
    pub fn build(params: &Params) -> Result<(Dictionary, VectorStore, HashSet<String>), Box<dyn Error>> {

        let stoplist = match &params.stoplist_file {
            Some(path) => config::load_stoplist(path)?,
            None => HashSet::new(),
        };

        let mut ingest = Ingest::new(
            params.window_left,
            params.window_right,
            stoplist.clone(),
            params.count_boundary,
        );

        for file_path in &params.corpus_files {

            let file = match File::open(file_path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("skipping corpus file {}: {}", file_path, e);
                    continue;
                }
            };

            let mut documents = 0usize;
            for line in io::BufReader::new(file).lines() {
                // a mid-file read error (bad bytes, truncation) drops the
                // rest of this file only, the run moves on to the next one
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        eprintln!("skipping rest of corpus file {}: {}", file_path, e);
                        break;
                    }
                };
                let tokens = Pipeline::tokenize(&line);
                if tokens.is_empty() {
                    continue;
                }
                ingest.document(tokens.iter().map(|t| t.as_str()));
                documents += 1;
            }
            println!("ingested {} documents from {}", documents, file_path);
        }

        let (dictionary, store) = ingest.finish();
        Ok((dictionary, store, stoplist))
    }

    pub fn answer_queries(
        params: &Params,
        dictionary: &Dictionary,
        store: &VectorStore,
        stoplist: &HashSet<String>,
    ) {

        if params.queries.is_empty() {
            return;
        }

        let similarity = Similarity::new(dictionary, store, stoplist)
            .with_thresholds(params.min_count, params.min_vector_size);

        for query in &params.queries {
            let context = similarity.context_of(query, params.limit, params.exclude_stopwords);
            let ranked = similarity.neighbors(query, params.limit, params.precise);
            println!("{} | context: {}", query, format_context(&context));
            println!("{} | similar: {}", query, format_neighbors(&ranked, params.show_scores));
        }
    }
}

// defines the behavior needed for tokenizing a corpus
trait Tokenizer {
    fn tokenize(sequence: &str) -> Vec<String>;
}

impl Tokenizer for Pipeline {
    // simple tokenizer, lowercases and splits on whitespace. A real
    // analyzer (lemmatizer, tagger) sits outside this crate and feeds
    // `Ingest` directly.
    fn tokenize(sequence: &str) -> Vec<String> {
        sequence
            .trim()
            .to_lowercase()
            .split_whitespace()
            .map(|t| t.to_string())
            .collect()
    }
}
