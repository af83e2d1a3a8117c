
// an open addressing map from u32 keys to u32 counts, used both as the
// dictionary count storage and as the per-term context vectors. A live
// entry is one u64 cell with the key in the low 32 bits and the value in
// the high 32 bits, so a cell of 0 marks an empty slot. Key 0 cannot be
// packed that way (it would collide with "empty") and is kept out of the
// table in a dedicated presence flag + value pair, checked first by
// every operation.

const FIB_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

pub const DEFAULT_FILL: f64 = 0.7;

#[inline]
fn pack(key: u32, value: u32) -> u64 {
    ((value as u64) << 32) | (key as u64)
}

#[inline]
fn key_of(cell: u64) -> u32 {
    cell as u32
}

#[inline]
fn value_of(cell: u64) -> u32 {
    (cell >> 32) as u32
}

pub struct IntMap {
    cells: Vec<u64>,
    mask: usize,
    used: usize,      // live cells in the table, zero key not included
    threshold: usize, // grow when `used` reaches this
    fill: f64,
    has_zero: bool,
    zero_value: u32,
}

impl IntMap {

    // `expected` is the number of keys the map should take before the
    // first rehash. Bad parameters are a configuration error and are
    // rejected here rather than surfacing later as a stuck probe loop.
    pub fn new(expected: usize, fill: f64) -> IntMap {

        assert!(expected > 0, "expected size must be positive, got {}", expected);
        assert!(fill > 0.0 && fill < 1.0, "fill factor must be in (0,1), got {}", fill);

        let capacity = ((expected as f64 / fill).ceil() as usize).max(4).next_power_of_two();
        Self {
            cells: vec![0; capacity],
            mask: capacity - 1,
            used: 0,
            threshold: (capacity as f64 * fill) as usize,
            fill,
            has_zero: false,
            zero_value: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.used + if self.has_zero { 1 } else { 0 }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    // fibonacci mixing folded down to the table mask
    #[inline]
    fn home(&self, key: u32) -> usize {
        ((key as u64).wrapping_mul(FIB_MIX) >> 32) as usize & self.mask
    }

    // returns 0 for an absent key, which is indistinguishable from a
    // stored value of 0. Callers that care use `contains`.
    pub fn get(&self, key: u32) -> u32 {

        if key == 0 {
            return if self.has_zero { self.zero_value } else { 0 };
        }

        let mut i = self.home(key);
        loop {
            let cell = self.cells[i];
            if cell == 0 {
                return 0;
            }
            if key_of(cell) == key {
                return value_of(cell);
            }
            i = (i + 1) & self.mask;
        }
    }

    pub fn contains(&self, key: u32) -> bool {

        if key == 0 {
            return self.has_zero;
        }

        let mut i = self.home(key);
        loop {
            let cell = self.cells[i];
            if cell == 0 {
                return false;
            }
            if key_of(cell) == key {
                return true;
            }
            i = (i + 1) & self.mask;
        }
    }

    // replace semantics, returns the previous value (0 if the key was absent)
    pub fn put(&mut self, key: u32, value: u32) -> u32 {

        if key == 0 {
            let old = if self.has_zero { self.zero_value } else { 0 };
            self.has_zero = true;
            self.zero_value = value;
            return old;
        }

        if self.used >= self.threshold {
            self.grow();
        }

        let mut i = self.home(key);
        loop {
            let cell = self.cells[i];
            if cell == 0 {
                self.cells[i] = pack(key, value);
                self.used += 1;
                return 0;
            }
            if key_of(cell) == key {
                self.cells[i] = pack(key, value);
                return value_of(cell);
            }
            i = (i + 1) & self.mask;
        }
    }

    // creates the key with `delta` if absent, otherwise adds to the
    // stored value. Returns the previous value like `put`.
    pub fn add(&mut self, key: u32, delta: u32) -> u32 {

        if key == 0 {
            let old = if self.has_zero { self.zero_value } else { 0 };
            self.has_zero = true;
            self.zero_value = old + delta;
            return old;
        }

        if self.used >= self.threshold {
            self.grow();
        }

        let mut i = self.home(key);
        loop {
            let cell = self.cells[i];
            if cell == 0 {
                self.cells[i] = pack(key, delta);
                self.used += 1;
                return 0;
            }
            if key_of(cell) == key {
                let old = value_of(cell);
                self.cells[i] = pack(key, old + delta);
                return old;
            }
            i = (i + 1) & self.mask;
        }
    }

    pub fn increment(&mut self, key: u32) -> u32 {
        self.add(key, 1)
    }

    pub fn remove(&mut self, key: u32) -> u32 {

        if key == 0 {
            if !self.has_zero {
                return 0;
            }
            self.has_zero = false;
            let old = self.zero_value;
            self.zero_value = 0;
            return old;
        }

        let mut i = self.home(key);
        loop {
            let cell = self.cells[i];
            if cell == 0 {
                return 0;
            }
            if key_of(cell) == key {
                let old = value_of(cell);
                self.used -= 1;
                self.backward_shift(i);
                return old;
            }
            i = (i + 1) & self.mask;
        }
    }

    // closes the gap left by a removal without tombstones: walk forward
    // from the gap and pull back every entry whose home slot lies at or
    // before the gap in probe order, until an empty slot ends the chain.
    fn backward_shift(&mut self, mut gap: usize) {

        let mut i = gap;
        loop {
            i = (i + 1) & self.mask;
            let cell = self.cells[i];
            if cell == 0 {
                self.cells[gap] = 0;
                return;
            }
            let home = self.home(key_of(cell));
            let dist_home = i.wrapping_sub(home) & self.mask;
            let dist_gap = i.wrapping_sub(gap) & self.mask;
            if dist_home >= dist_gap {
                self.cells[gap] = cell;
                gap = i;
            }
        }
    }

    // doubles the table and reinserts every live cell. The zero-key
    // slot lives outside the table and is not touched.
    fn grow(&mut self) {

        let new_capacity = self.cells.len() * 2;
        let old_cells = std::mem::replace(&mut self.cells, vec![0; new_capacity]);
        self.mask = new_capacity - 1;
        self.threshold = (new_capacity as f64 * self.fill) as usize;

        for cell in old_cells {
            if cell == 0 {
                continue;
            }
            let mut i = self.home(key_of(cell));
            while self.cells[i] != 0 {
                i = (i + 1) & self.mask;
            }
            self.cells[i] = cell;
        }
    }

    // entries in storage order (zero key first, then table order)
    pub fn iter(&self) -> IntMapIter {
        IntMapIter {
            map: self,
            pos: 0,
            zero_done: !self.has_zero,
        }
    }

    // (key, value) pairs ascending by key, used by snapshots and the
    // co-occurrence listing
    pub fn to_sorted_array(&self) -> Vec<(u32, u32)> {
        let mut pairs: Vec<(u32, u32)> = self.iter().collect();
        pairs.sort_by_key(|p| p.0);
        pairs
    }
}

pub struct IntMapIter<'a> {
    map: &'a IntMap,
    pos: usize,
    zero_done: bool,
}

impl<'a> Iterator for IntMapIter<'a> {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {

        if !self.zero_done {
            self.zero_done = true;
            return Some((0, self.map.zero_value));
        }

        while self.pos < self.map.cells.len() {
            let cell = self.map.cells[self.pos];
            self.pos += 1;
            if cell != 0 {
                return Some((key_of(cell), value_of(cell)));
            }
        }
        None
    }
}
