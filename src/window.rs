
// a fixed span ring buffer over the token stream. Slots hold term ids
// plus one attribute byte each (stopword marking), and are addressed by
// offsets relative to a moving center, `left..=right` with left <= 0 and
// right >= 0. All slots start at the reserved id 0, which is the same
// state as having pushed padding first.

pub const ATTR_NONE: u8 = 0;
pub const ATTR_STOPWORD: u8 = 1;

pub struct Window {
    ids: Vec<u32>,
    attributes: Vec<u8>,
    left: i32,
    right: i32,
    width: usize,
    center: usize,
}

impl Window {

    pub fn new(left: i32, right: i32) -> Window {

        assert!(left <= 0, "left bound must be non-positive, got {}", left);
        assert!(right >= 0, "right bound must be non-negative, got {}", right);

        let width = (right - left + 1) as usize;
        Self {
            ids: vec![0; width],
            attributes: vec![ATTR_NONE; width],
            left,
            right,
            width,
            center: 0,
        }
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    #[inline]
    fn slot(&self, offset: i32) -> usize {
        // offsets in [left, right] always land in range after the
        // euclidean wrap, no bounds case exists
        (self.center as i32 + offset).rem_euclid(self.width as i32) as usize
    }

    // advances the window one position, the new id enters at the leading
    // (right) edge and the oldest id falls off the trailing (left) edge.
    // The evicted id is returned.
    pub fn push(&mut self, id: u32, attribute: u8) -> u32 {

        self.center = (self.center + 1) % self.width;
        let leading = self.slot(self.right);
        let evicted = self.ids[leading];
        self.ids[leading] = id;
        self.attributes[leading] = attribute;
        evicted
    }

    pub fn get(&self, offset: i32) -> u32 {
        debug_assert!(offset >= self.left && offset <= self.right);
        self.ids[self.slot(offset)]
    }

    pub fn get_attribute(&self, offset: i32) -> u8 {
        debug_assert!(offset >= self.left && offset <= self.right);
        self.attributes[self.slot(offset)]
    }
}
