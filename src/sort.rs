//! In-place quicksort over ranges of text lines
//!
//! Positions are 1-based and ranges are inclusive, the same way editor line
//! numbers work. The sorter knows nothing about what the lines mean: callers
//! hand it the storage and a three-way comparator.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::convert::Infallible;

/// Mutable line storage addressed by 1-based position
pub trait LineSeq {
    /// Number of addressable lines
    fn line_count(&self) -> usize;

    /// The line at `pos`, where `1 <= pos <= line_count()`
    fn line_at(&self, pos: usize) -> Cow<'_, str>;

    /// Exchange the lines at two positions
    fn swap_lines(&mut self, a: usize, b: usize);
}

impl<T: AsRef<str>> LineSeq for [T] {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_at(&self, pos: usize) -> Cow<'_, str> {
        Cow::Borrowed(self[pos - 1].as_ref())
    }

    fn swap_lines(&mut self, a: usize, b: usize) {
        self.swap(a - 1, b - 1);
    }
}

impl<T: AsRef<str>> LineSeq for Vec<T> {
    fn line_count(&self) -> usize {
        self.as_slice().line_count()
    }

    fn line_at(&self, pos: usize) -> Cow<'_, str> {
        self.as_slice().line_at(pos)
    }

    fn swap_lines(&mut self, a: usize, b: usize) {
        self.as_mut_slice().swap_lines(a, b);
    }
}

/// Lexicographic three-way comparison, used to alphabetize bookmark records
pub fn compare_lines(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Sort every line of `seq`
pub fn sort_all<S, F>(seq: &mut S, cmp: F)
where
    S: LineSeq + ?Sized,
    F: FnMut(&str, &str) -> Ordering,
{
    let end = seq.line_count();
    sort_range(seq, 1, end, cmp);
}

/// Sort lines `start..=end` of `seq` into non-descending `cmp` order.
///
/// Empty, single-line and out-of-bounds ranges (`start == 0` or
/// `end > line_count()`) are left alone. Lines outside the range are never
/// touched. The sort is not stable.
pub fn sort_range<S, F>(seq: &mut S, start: usize, end: usize, mut cmp: F)
where
    S: LineSeq + ?Sized,
    F: FnMut(&str, &str) -> Ordering,
{
    match try_sort_range(seq, start, end, |a, b| Ok::<_, Infallible>(cmp(a, b))) {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

/// Like [`sort_range`], but with a comparator that can fail.
///
/// The first error stops the sort and is returned as is. The range then holds
/// some permutation of its original lines.
pub fn try_sort_range<S, F, E>(seq: &mut S, start: usize, end: usize, mut cmp: F) -> Result<(), E>
where
    S: LineSeq + ?Sized,
    F: FnMut(&str, &str) -> Result<Ordering, E>,
{
    if start == 0 || end > seq.line_count() {
        return Ok(());
    }

    // Smaller half is pushed last so it is handled first, which keeps the
    // work stack logarithmic even when partitions are lopsided.
    let mut pending = vec![(start, end)];
    while let Some((lo, hi)) = pending.pop() {
        if lo >= hi {
            continue;
        }

        let boundary = partition(seq, lo, hi, &mut cmp)?;
        let left = (lo, boundary.saturating_sub(1));
        let right = (boundary + 1, hi);

        if boundary - lo < hi - boundary {
            pending.push(right);
            pending.push(left);
        } else {
            pending.push(left);
            pending.push(right);
        }
    }

    Ok(())
}

/// One partition pass over `lo..=hi` around the middle line's value.
///
/// Returns the boundary position, which holds its final value afterwards and
/// is excluded from further work.
fn partition<S, F, E>(seq: &mut S, lo: usize, hi: usize, cmp: &mut F) -> Result<usize, E>
where
    S: LineSeq + ?Sized,
    F: FnMut(&str, &str) -> Result<Ordering, E>,
{
    // Owned copy: the pivot's position moves while we swap
    let pivot = seq.line_at(lo + (hi - lo) / 2).into_owned();

    // Last position known to hold a line <= pivot; `lo - 1` means none yet
    let mut boundary = lo - 1;
    let mut middle = None;

    for pos in lo..=hi {
        let ord = cmp(&seq.line_at(pos), &pivot)?;
        if ord == Ordering::Greater {
            continue;
        }

        boundary += 1;
        if ord == Ordering::Equal {
            middle = Some(boundary);
        }
        if pos != boundary {
            seq.swap_lines(pos, boundary);
        }
    }

    match middle {
        Some(middle) => {
            if middle != boundary {
                seq.swap_lines(middle, boundary);
            }
            Ok(boundary)
        }
        // The pivot never compared <= itself, so the comparator is not an
        // ordering. Still drop one slot so the loop terminates.
        None if boundary < lo => Ok(lo),
        None => Ok(boundary),
    }
}
