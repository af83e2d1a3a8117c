
use std::collections::HashSet;
use std::env;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use wordspace::{files_handling, format_context, format_neighbors, load_stoplist};
use wordspace::{Dictionary, Similarity, VectorStore};

// standalone query runner over a saved vector space, so a built space
// can be asked questions without re-ingesting the corpus. The
// dictionary dump is in first-seen order, so loading it into a fresh
// dictionary reproduces the ids the snapshot was saved under.

fn main() {

    // arguments to this executable should be:
    // a letter selector: "c" for co-occurrence context, "n" for nearest neighbors
    // path to an input file with one query term per line
    // path to the saved dictionary (words.tsv)
    // path to the saved vectors without extension (e.g. Output/vectors)
    // optionally a stoplist file
    // example: ... c Input/terms.txt Output/words.tsv Output/vectors stoplist.txt
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 && args.len() != 6 {
        panic!("expected: selector (c|n), terms file, dictionary tsv, vectors path, [stoplist]");
    }
    let selector = &args[1];
    if !["c", "n"].contains(&selector.as_str()) {
        panic!("unrecognized selector {}, expected c or n", selector);
    }

    // read the query terms
    let open_in_file = File::open(&args[2]).expect("could not open terms file");
    let terms = io::BufReader::new(open_in_file)
        .lines()
        .map(|line| line.expect("could not read line").trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect::<Vec<String>>();

    // load the saved space
    let mut dictionary = Dictionary::new();
    dictionary
        .load_tsv(Path::new(&args[3]))
        .expect("could not load dictionary tsv");
    let store = files_handling::read_input::<VectorStore>(&args[4]).expect("could not load vectors");
    let stoplist = match args.get(5) {
        Some(path) => load_stoplist(path).expect("could not load stoplist"),
        None => HashSet::new(),
    };

    let similarity = Similarity::new(&dictionary, &store, &stoplist);
    let limit = 20;

    match selector.as_str() {
        "c" => {
            for term in &terms {
                let context = similarity.context_of(term, limit, !stoplist.is_empty());
                println!("{} | {}", term, format_context(&context));
            }
        }
        "n" => {
            // absent terms print an empty ranking rather than failing
            for (term, ranked) in terms.iter().zip(
                similarity.neighbors_many(
                    &terms.iter().map(|t| t.as_str()).collect::<Vec<&str>>(),
                    limit,
                    false,
                ),
            ) {
                println!("{} | {}", term, format_neighbors(&ranked, true));
            }
        }
        _ => unreachable!(),
    }
}
