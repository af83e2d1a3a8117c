
// imports
use crate::dictionary::Dictionary;
use crate::intmap::{IntMap, DEFAULT_FILL};
use crate::window::{Window, ATTR_NONE, ATTR_STOPWORD};

use serde::de::Visitor;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

// one sparse context vector per term that has ever been a non-stopword
// window center, laid out as a dense arena indexed by term id. Term ids
// are already dense so this avoids hashing the outer key, a `None` slot
// means the term was never a valid center.
pub struct VectorStore {
    vectors: Vec<Option<IntMap>>,
}

impl VectorStore {

    pub fn new() -> VectorStore {
        Self { vectors: Vec::new() }
    }

    pub fn get(&self, id: u32) -> Option<&IntMap> {
        self.vectors.get(id as usize).and_then(|v| v.as_ref())
    }

    pub fn get_or_create(&mut self, id: u32) -> &mut IntMap {

        let slot = id as usize;
        if slot >= self.vectors.len() {
            self.vectors.resize_with(slot + 1, || None);
        }
        self.vectors[slot].get_or_insert_with(|| IntMap::new(8, DEFAULT_FILL))
    }

    // number of terms with a recorded vector
    pub fn size(&self) -> usize {
        self.vectors.iter().filter(|v| v.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &IntMap)> {
        self.vectors
            .iter()
            .enumerate()
            .filter_map(|(id, v)| v.as_ref().map(|map| (id as u32, map)))
    }
}

impl Default for VectorStore {
    fn default() -> Self {
        VectorStore::new()
    }
}

// snapshot form, a sequence of (term id, sorted context pairs) rows
impl Serialize for VectorStore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.size()))?;
        for (id, vector) in self.iter() {
            let row = (id, vector.to_sorted_array());
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

struct VectorStoreVisitor;

impl<'de> Visitor<'de> for VectorStoreVisitor {

    type Value = VectorStore;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("seq of (term id, context pairs) rows")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut store = VectorStore::new();
        while let Some((id, pairs)) = seq.next_element::<(u32, Vec<(u32, u32)>)>()? {
            let vector = store.get_or_create(id);
            for (key, value) in pairs {
                vector.put(key, value);
            }
        }
        Ok(store)
    }
}

impl<'de> Deserialize<'de> for VectorStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(VectorStoreVisitor)
    }
}


// the streaming ingestion pipeline: dictionary interning, sliding
// window and context accumulation, fed one token at a time in corpus
// order. The empty token is the document boundary, it maps to the
// reserved id 0 and is never interned.
pub struct Ingest {
    dictionary: Dictionary,
    window: Window,
    store: VectorStore,
    stoplist: HashSet<String>,
    count_boundary: bool,
}

impl Ingest {

    // `count_boundary` decides whether the reserved id 0 is counted as
    // context when the window reaches past a document edge, true keeps
    // boundary proximity in the vectors and is the default policy
    pub fn new(left: i32, right: i32, stoplist: HashSet<String>, count_boundary: bool) -> Ingest {
        Self {
            dictionary: Dictionary::new(),
            window: Window::new(left, right),
            store: VectorStore::new(),
            stoplist,
            count_boundary,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn push_token(&mut self, token: &str) {

        let id = if token.is_empty() { 0 } else { self.dictionary.intern(token) };
        let attribute = if id != 0 && self.stoplist.contains(token) {
            ATTR_STOPWORD
        } else {
            ATTR_NONE
        };
        self.window.push(id, attribute);

        // nothing to record on a boundary center, and a stopword is
        // never a center (it still counts as context for its neighbors)
        let center = self.window.get(0);
        if center == 0 || self.window.get_attribute(0) == ATTR_STOPWORD {
            return;
        }

        let vector = self.store.get_or_create(center);
        for offset in self.window.left()..=self.window.right() {
            if offset == 0 {
                continue;
            }
            let context = self.window.get(offset);
            if context == 0 && !self.count_boundary {
                continue;
            }
            vector.add(context, 1);
        }
    }

    // one whole document, padded with |left| empty tokens in front and
    // `right` behind so no center ever sees context from another document
    pub fn document<'a, I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for _ in 0..(-self.window.left()) {
            self.push_token("");
        }
        for token in tokens {
            self.push_token(token);
        }
        for _ in 0..self.window.right() {
            self.push_token("");
        }
    }

    pub fn finish(self) -> (Dictionary, VectorStore) {
        (self.dictionary, self.store)
    }
}
