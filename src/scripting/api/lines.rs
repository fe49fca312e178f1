//! marks::lines - sorting and preview helpers for plugin scripts
//!
//! Usage in Rhai:
//! ```rhai
//! let sorted = marks::lines::sort(lines);
//! let by_len = marks::lines::sort(lines, |a, b| a.len() - b.len());
//! let label = marks::lines::compress(line, 40);
//! ```
//!
//! Comparators return a negative, zero or positive integer. An error thrown
//! inside a comparator aborts the sort and reaches the calling script.

use std::cmp::Ordering;

use rhai::{Array, Dynamic, EvalAltResult, FnPtr, INT, NativeCallContext};

use crate::bookmark::compress_preview;
use crate::sort::{compare_lines, sort_all, try_sort_range};

pub fn create_module() -> rhai::Module {
    let mut module = rhai::Module::new();

    // compare(a: &str, b: &str) -> -1 | 0 | 1
    module.set_native_fn(
        "compare",
        |a: &str, b: &str| -> Result<INT, Box<EvalAltResult>> {
            Ok(ordering_to_int(compare_lines(a, b)))
        },
    );

    // sort(lines: Array) -> Array
    module.set_native_fn(
        "sort",
        |lines: Array| -> Result<Array, Box<EvalAltResult>> {
            let mut lines = to_strings(lines);
            sort_all(&mut lines, compare_lines);
            Ok(to_array(lines))
        },
    );

    // sort(lines: Array, comparator: FnPtr) -> Array
    module.set_native_fn(
        "sort",
        |ctx: NativeCallContext,
         lines: Array,
         comparator: FnPtr|
         -> Result<Array, Box<EvalAltResult>> {
            let mut lines = to_strings(lines);
            let end = lines.len();
            try_sort_range(&mut lines, 1, end, |a, b| {
                let result: INT =
                    comparator.call_within_context(&ctx, (a.to_string(), b.to_string()))?;
                Ok::<_, Box<EvalAltResult>>(result.cmp(&0))
            })?;
            Ok(to_array(lines))
        },
    );

    // compress(text: &str, width: i64) -> String
    module.set_native_fn(
        "compress",
        |text: &str, width: INT| -> Result<String, Box<EvalAltResult>> {
            Ok(compress_preview(text, width.max(0) as usize))
        },
    );

    module
}

fn ordering_to_int(ord: Ordering) -> INT {
    match ord {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn to_strings(array: Array) -> Vec<String> {
    array
        .into_iter()
        .map(|item| {
            if item.is_string() {
                item.into_string().unwrap_or_default()
            } else {
                item.to_string()
            }
        })
        .collect()
}

fn to_array(lines: Vec<String>) -> Array {
    lines.into_iter().map(Dynamic::from).collect()
}
