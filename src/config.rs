

use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, BufRead};

#[derive(Clone, Debug)]
pub struct Params {
    pub corpus_files: Vec<String>,
    pub output_dir: String,
    pub stoplist_file: Option<String>,
    pub window_left: i32,
    pub window_right: i32,
    pub count_boundary: bool,
    pub min_count: u64,
    pub min_vector_size: usize,
    pub precise: bool,
    pub queries: Vec<String>,
    pub limit: usize,
    pub exclude_stopwords: bool,
    pub show_scores: bool,
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using parameters:
        corpus_files: {:?}
        output_dir: {}
        stoplist_file: {:?}
        window_left: {}
        window_right: {}
        count_boundary: {}
        min_count: {}
        min_vector_size: {}
        precise: {}
        queries: {:?}
        limit: {}
        exclude_stopwords: {}
        show_scores: {}",
        self.corpus_files, self.output_dir, self.stoplist_file, self.window_left,
        self.window_right, self.count_boundary, self.min_count, self.min_vector_size,
        self.precise, self.queries, self.limit, self.exclude_stopwords, self.show_scores)
    }
}

pub struct Config {
    params: Params,
}

impl Config {

    pub fn get_params(&self) -> Params {
        return self.params.clone()
    }

    pub fn new(args: &[String]) -> Result<Config, Box<dyn Error>> {

        if args.len() != 2 {
            return Err(format!("input should be a path to a json file only").into());
        }

        let f = fs::File::open(&args[1])?;
        let json: Value = serde_json::from_reader(f)?;
        let params = Config::parse_json(&json)?;
        Ok(Self { params })
    }

    // parse the json field by field, required fields first, the rest
    // falls back to defaults
    pub fn parse_json(json: &Value) -> Result<Params, Box<dyn Error>> {

        let corpus_files = json
            .get("corpus_files")
            .and_then(|v| v.as_array())
            .ok_or("corpus_files was not supplied through json, expected an array of paths")?
            .iter()
            .map(|v| v.as_str().map(|s| s.to_owned()))
            .collect::<Option<Vec<String>>>()
            .ok_or("corpus_files entries must be strings")?;
        let output_dir = json
            .get("output_dir")
            .and_then(|v| v.as_str())
            .ok_or("output_dir was not supplied through json")?
            .to_owned();

        let stoplist_file = match json.get("stoplist_file") {
            Some(v) => Some(v.as_str().ok_or("stoplist_file must be a string")?.to_owned()),
            None => None,
        };
        let window_left = match json.get("window_left") {
            Some(v) => v.as_i64().ok_or("window_left must be numeric")?,
            None => -2,
        };
        let window_right = match json.get("window_right") {
            Some(v) => v.as_i64().ok_or("window_right must be numeric")?,
            None => 2,
        };
        let count_boundary = match json.get("count_boundary") {
            Some(v) => v.as_bool().ok_or("count_boundary must be boolean")?,
            None => true,
        };
        let min_count = match json.get("min_count") {
            Some(v) => v.as_u64().ok_or("min_count must be numeric")?,
            None => crate::similarity::MIN_COUNT,
        };
        let min_vector_size = match json.get("min_vector_size") {
            Some(v) => v.as_u64().ok_or("min_vector_size must be numeric")? as usize,
            None => crate::similarity::MIN_VECTOR_SIZE,
        };
        let precise = match json.get("precise") {
            Some(v) => v.as_bool().ok_or("precise must be boolean")?,
            None => false,
        };
        let queries = match json.get("queries") {
            Some(v) => v
                .as_array()
                .ok_or("queries must be an array of terms")?
                .iter()
                .map(|q| q.as_str().map(|s| s.to_owned()))
                .collect::<Option<Vec<String>>>()
                .ok_or("queries entries must be strings")?,
            None => Vec::new(),
        };
        let limit = match json.get("limit") {
            Some(v) => v.as_u64().ok_or("limit must be numeric")? as usize,
            None => 20,
        };
        let exclude_stopwords = match json.get("exclude_stopwords") {
            Some(v) => v.as_bool().ok_or("exclude_stopwords must be boolean")?,
            None => true,
        };
        let show_scores = match json.get("show_scores") {
            Some(v) => v.as_bool().ok_or("show_scores must be boolean")?,
            None => false,
        };

        if window_left > 0 || window_right < 0 {
            return Err(format!(
                "window bounds must satisfy left <= 0 <= right, got {} and {}",
                window_left, window_right
            )
            .into());
        }

        Ok(Params {
            corpus_files,
            output_dir,
            stoplist_file,
            window_left: window_left as i32,
            window_right: window_right as i32,
            count_boundary,
            min_count,
            min_vector_size,
            precise,
            queries,
            limit,
            exclude_stopwords,
            show_scores,
        })
    }
}

// one token per line, trimmed and lowercased, empty lines skipped
pub fn load_stoplist(file_path: &str) -> Result<HashSet<String>, Box<dyn Error>> {

    let lines = io::BufReader::new(File::open(file_path)?).lines();
    let mut stoplist = HashSet::new();
    for line in lines {
        let token = line?.trim().to_lowercase();
        if !token.is_empty() {
            stoplist.insert(token);
        }
    }
    Ok(stoplist)
}

pub mod files_handling {

    use crate::vectors::VectorStore;
    use flate2::read::GzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::error::Error;
    use std::fs::{self, File};
    use std::io::prelude::*;
    use std::io::{BufReader, BufWriter};

    pub fn read_input<R: ReadFile>(file_path: &str) -> Result<<R as ReadFile>::Item, <R as ReadFile>::Error> {
        let input = <R as ReadFile>::read_file(file_path)?;
        Ok(input)
    }

    pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: &S) -> Result<(), <S as SaveFile>::Error> {

        // create output folder
        if let Err(e) = fs::create_dir_all(output_dir) {
            panic!("{}", e)
        }
        item.save_file(output_dir, file_name)?;
        return Ok(())
    }

    pub trait ReadFile {
        type Error;
        type Item;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error>;
    }

    pub trait SaveFile {
        type Error;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error>;
    }

    impl SaveFile for VectorStore {
        type Error = Box<dyn Error>;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {

            let out = output_dir.to_string() + "/" + file_name + ".bin.gz";
            let f = BufWriter::new(File::create(out)?);
            let mut writer = GzEncoder::new(f, Compression::default());
            let encoded: Vec<u8> = bincode::serialize(self)?;
            writer.write_all(&encoded)?;
            writer.finish()?;
            Ok(())
        }
    }

    impl ReadFile for VectorStore {
        type Error = Box<dyn Error>;
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {

            let in_file = file_path.to_string() + ".bin.gz";
            let f = BufReader::new(File::open(in_file)?);
            let mut reader = GzDecoder::new(f);
            let mut buf: Vec<u8> = Vec::new();
            reader.read_to_end(&mut buf)?;
            let item: VectorStore = bincode::deserialize(&buf)?;
            Ok(item)
        }
    }
}


#[cfg(test)]
mod tests {

    use super::{files_handling, load_stoplist, Config};
    use crate::vectors::{Ingest, VectorStore};
    use std::collections::HashSet;
    use std::env;
    use std::fs;

    #[test]
    fn json_defaults_are_filled_in() {

        let json: serde_json::Value = serde_json::from_str(
            r#"{"corpus_files": ["corpus.txt"], "output_dir": "Output"}"#,
        )
        .unwrap();
        let params = Config::parse_json(&json).unwrap();

        assert_eq!(params.corpus_files, vec!["corpus.txt"]);
        assert_eq!(params.window_left, -2);
        assert_eq!(params.window_right, 2);
        assert!(params.count_boundary);
        assert_eq!(params.min_count, 3);
        assert_eq!(params.min_vector_size, 30);
        assert!(!params.precise);
        assert_eq!(params.limit, 20);
    }

    #[test]
    fn missing_corpus_files_is_an_error() {

        let json: serde_json::Value = serde_json::from_str(r#"{"output_dir": "Output"}"#).unwrap();
        assert!(Config::parse_json(&json).is_err());
    }

    #[test]
    fn inverted_window_bounds_are_an_error() {

        let json: serde_json::Value = serde_json::from_str(
            r#"{"corpus_files": ["c.txt"], "output_dir": "o", "window_left": 1}"#,
        )
        .unwrap();
        assert!(Config::parse_json(&json).is_err());
    }

    #[test]
    fn stoplist_reads_one_token_per_line() {

        let path = env::temp_dir().join("wordspace_stoplist.txt");
        fs::write(&path, "the\n  of \n\nAnd\n").unwrap();

        let stoplist = load_stoplist(path.to_str().unwrap()).unwrap();
        assert_eq!(stoplist.len(), 3);
        assert!(stoplist.contains("the"));
        assert!(stoplist.contains("of"));
        assert!(stoplist.contains("and"));
    }

    #[test]
    fn snapshot_save_and_read_back() {

        let mut ingest = Ingest::new(-1, 1, HashSet::new(), true);
        ingest.document(["one", "two", "three", "two"]);
        let (_, store) = ingest.finish();

        let dir = env::temp_dir().join("wordspace_snapshot_test");
        let dir = dir.to_str().unwrap();
        files_handling::save_output(dir, "vectors", &store).unwrap();

        let restored =
            files_handling::read_input::<VectorStore>(&(dir.to_string() + "/vectors")).unwrap();
        assert_eq!(restored.size(), store.size());
        for (id, vector) in store.iter() {
            assert_eq!(restored.get(id).unwrap().to_sorted_array(), vector.to_sorted_array());
        }
    }
}
