//! Compile-time description of the sign: which pixels make up each letter, row, column,
//! and diagonal.
//!
//! The sign is a single strip of [`PIXEL_COUNT`] pixels threaded through three letters,
//! so neighbouring strip indices are rarely neighbours on the sign. Every rendering mode
//! that sweeps across the sign works through one of the [`Grouping`] tables instead of
//! strip order.
//!
//! ```text
//! column:  0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15 16
//! row 4:      7  8  9       15 16 17 18 19       27 28 29
//! row 3:   6          10          14          26          30
//! row 2:   5                      13          25
//! row 1:   4           0          12          24          20
//! row 0:      3  2  1             11             23 22 21
//! ```
//!
//! Some columns and diagonals cross gaps between the letters and are empty. Empty
//! groups are part of the geometry: they keep the sweep timing even across the gaps.
//!
//! # Example
//!
//! ```rust
//! use sign_glow::geometry::{self, Grouping};
//!
//! assert_eq!(geometry::group(Grouping::Row, 2), &[5, 13, 25]);
//! assert!(geometry::group(Grouping::Column, 5).is_empty());
//! assert_eq!(geometry::group_count(Grouping::ForwardDiagonal), 21);
//! ```

/// Number of pixels on the sign.
pub const PIXEL_COUNT: usize = 31;

/// Number of letters on the sign.
pub const LETTER_COUNT: usize = 3;

/// Number of horizontal rows.
pub const ROW_COUNT: usize = 5;

/// Number of vertical columns, including the two gap columns between letters.
pub const COLUMN_COUNT: usize = 17;

/// Number of diagonals in each direction.
pub const DIAGONAL_COUNT: usize = 21;

/// A fixed-capacity, ordered run of pixel indices. May be empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelGroup<const CAP: usize> {
    pixels: [u8; CAP],
    len: u8,
}

impl<const CAP: usize> PixelGroup<CAP> {
    /// Build a group from its pixel indices, checked at compile time when used in a const.
    #[must_use]
    pub const fn new<const LEN: usize>(pixels: [u8; LEN]) -> Self {
        assert!(LEN <= CAP, "group exceeds its capacity");
        assert!(CAP <= u8::MAX as usize, "group capacity must fit in u8");
        let mut stored = [0u8; CAP];
        let mut index = 0;
        while index < LEN {
            assert!(
                (pixels[index] as usize) < PIXEL_COUNT,
                "pixel index out of bounds"
            );
            stored[index] = pixels[index];
            index += 1;
        }
        #[expect(clippy::cast_possible_truncation, reason = "checked against u8::MAX above")]
        let len = LEN as u8;
        Self {
            pixels: stored,
            len,
        }
    }

    /// The pixel indices in this group, in rendering order.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.pixels.get(..usize::from(self.len)).unwrap_or(&[])
    }

    /// Number of pixels in the group.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// `true` for the gap columns and diagonals that hold no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    const fn get(&self, index: usize) -> u8 {
        self.pixels[index]
    }
}

/// Pixels of each letter, first letter first.
pub const LETTERS: [PixelGroup<11>; LETTER_COUNT] = [
    PixelGroup::new([7, 8, 9, 6, 10, 5, 4, 0, 3, 2, 1]),
    PixelGroup::new([15, 16, 17, 18, 19, 14, 13, 12, 11]),
    PixelGroup::new([27, 28, 29, 26, 30, 25, 24, 20, 23, 22, 21]),
];

/// Pixels of each row, bottom row first.
pub const ROWS: [PixelGroup<11>; ROW_COUNT] = [
    PixelGroup::new([3, 2, 1, 11, 23, 22, 21]),
    PixelGroup::new([4, 0, 12, 24, 20]),
    PixelGroup::new([5, 13, 25]),
    PixelGroup::new([6, 10, 14, 26, 30]),
    PixelGroup::new([7, 8, 9, 15, 16, 17, 18, 19, 27, 28, 29]),
];

/// Pixels of each column, left to right. Columns 5 and 11 are the gaps between letters.
pub const COLUMNS: [PixelGroup<5>; COLUMN_COUNT] = [
    PixelGroup::new([6, 5, 4]),
    PixelGroup::new([7, 3]),
    PixelGroup::new([8, 2]),
    PixelGroup::new([9, 1]),
    PixelGroup::new([10, 0]),
    PixelGroup::new([]),
    PixelGroup::new([15]),
    PixelGroup::new([16]),
    PixelGroup::new([17, 14, 13, 12, 11]),
    PixelGroup::new([18]),
    PixelGroup::new([19]),
    PixelGroup::new([]),
    PixelGroup::new([26, 25, 24]),
    PixelGroup::new([27, 23]),
    PixelGroup::new([28, 22]),
    PixelGroup::new([29, 21]),
    PixelGroup::new([30, 20]),
];

/// Pixels along each forward (`/`-leaning) diagonal, left to right.
pub const FORWARD_DIAGONALS: [PixelGroup<3>; DIAGONAL_COUNT] = [
    PixelGroup::new([]),
    PixelGroup::new([7, 6]),
    PixelGroup::new([8, 5]),
    PixelGroup::new([9, 4]),
    PixelGroup::new([]),
    PixelGroup::new([10, 3]),
    PixelGroup::new([15, 2]),
    PixelGroup::new([16, 0, 1]),
    PixelGroup::new([17]),
    PixelGroup::new([18, 14]),
    PixelGroup::new([19, 13]),
    PixelGroup::new([12]),
    PixelGroup::new([11]),
    PixelGroup::new([27, 26]),
    PixelGroup::new([28, 25]),
    PixelGroup::new([29, 24]),
    PixelGroup::new([]),
    PixelGroup::new([30, 23]),
    PixelGroup::new([22]),
    PixelGroup::new([20, 21]),
    PixelGroup::new([]),
];

/// Pixels along each backward (`\`-leaning) diagonal, left to right.
pub const BACKWARD_DIAGONALS: [PixelGroup<3>; DIAGONAL_COUNT] = [
    PixelGroup::new([]),
    PixelGroup::new([4, 3]),
    PixelGroup::new([5, 2]),
    PixelGroup::new([6, 1]),
    PixelGroup::new([]),
    PixelGroup::new([7, 0]),
    PixelGroup::new([8]),
    PixelGroup::new([9, 10]),
    PixelGroup::new([11]),
    PixelGroup::new([12]),
    PixelGroup::new([15, 13]),
    PixelGroup::new([16, 14]),
    PixelGroup::new([17]),
    PixelGroup::new([18, 24, 23]),
    PixelGroup::new([19, 25, 22]),
    PixelGroup::new([26, 21]),
    PixelGroup::new([]),
    PixelGroup::new([27, 20]),
    PixelGroup::new([28]),
    PixelGroup::new([29, 30]),
    PixelGroup::new([]),
];

/// The five ways the sign's pixels are partitioned.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Grouping {
    /// The three letters.
    Letter,
    /// Horizontal rows, bottom first.
    Row,
    /// Vertical columns, left first.
    Column,
    /// `/` diagonals, left first.
    ForwardDiagonal,
    /// `\` diagonals, left first.
    BackwardDiagonal,
}

/// Number of groups in a grouping.
#[must_use]
pub const fn group_count(grouping: Grouping) -> usize {
    match grouping {
        Grouping::Letter => LETTER_COUNT,
        Grouping::Row => ROW_COUNT,
        Grouping::Column => COLUMN_COUNT,
        Grouping::ForwardDiagonal | Grouping::BackwardDiagonal => DIAGONAL_COUNT,
    }
}

/// Ordered pixel indices of group `index` within `grouping`.
///
/// Returns an empty slice for empty groups and for indices past [`group_count`].
#[must_use]
pub fn group(grouping: Grouping, index: usize) -> &'static [u8] {
    match grouping {
        Grouping::Letter => lookup(&LETTERS, index),
        Grouping::Row => lookup(&ROWS, index),
        Grouping::Column => lookup(&COLUMNS, index),
        Grouping::ForwardDiagonal => lookup(&FORWARD_DIAGONALS, index),
        Grouping::BackwardDiagonal => lookup(&BACKWARD_DIAGONALS, index),
    }
}

fn lookup<const CAP: usize>(table: &'static [PixelGroup<CAP>], index: usize) -> &'static [u8] {
    table.get(index).map_or(&[], PixelGroup::as_slice)
}

/// Iterate over every group of a grouping as `(group_index, pixels)`, empty groups
/// included.
pub fn groups(grouping: Grouping) -> impl Iterator<Item = (usize, &'static [u8])> {
    (0..group_count(grouping)).map(move |index| (index, group(grouping, index)))
}

/// `(column, row)` of a pixel on the sign, or `None` past [`PIXEL_COUNT`].
#[must_use]
pub fn pixel_position(pixel: usize) -> Option<(u8, u8)> {
    PIXEL_POSITIONS.get(pixel).copied()
}

/// `(column, row)` for every pixel, derived from the column and row tables.
pub const PIXEL_POSITIONS: [(u8, u8); PIXEL_COUNT] = {
    let columns = locate(&COLUMNS);
    let rows = locate(&ROWS);
    let mut positions = [(0u8, 0u8); PIXEL_COUNT];
    let mut pixel = 0;
    while pixel < PIXEL_COUNT {
        positions[pixel] = (columns[pixel], rows[pixel]);
        pixel += 1;
    }
    positions
};

/// For each pixel, the index of the (first) group containing it. Every pixel must be
/// covered.
const fn locate<const CAP: usize, const GROUPS: usize>(
    table: &[PixelGroup<CAP>; GROUPS],
) -> [u8; PIXEL_COUNT] {
    assert!(GROUPS <= u8::MAX as usize, "group count must fit in u8");
    let mut found = [None; PIXEL_COUNT];
    let mut group_index = GROUPS;
    // Walk backwards so the first group containing a pixel wins.
    while group_index > 0 {
        group_index -= 1;
        let pixel_group = &table[group_index];
        let mut member = 0;
        while member < pixel_group.len() {
            #[expect(clippy::cast_possible_truncation, reason = "checked against u8::MAX above")]
            let group_byte = group_index as u8;
            found[pixel_group.get(member) as usize] = Some(group_byte);
            member += 1;
        }
    }
    let mut located = [0u8; PIXEL_COUNT];
    let mut pixel = 0;
    while pixel < PIXEL_COUNT {
        located[pixel] = match found[pixel] {
            Some(group_index) => group_index,
            None => panic!("every pixel must belong to a group"),
        };
        pixel += 1;
    }
    located
}

// Every grouping must reach every pixel; a missing pixel would stay dark in that mode.
const _: [u8; PIXEL_COUNT] = locate(&LETTERS);
const _: [u8; PIXEL_COUNT] = locate(&FORWARD_DIAGONALS);
const _: [u8; PIXEL_COUNT] = locate(&BACKWARD_DIAGONALS);
