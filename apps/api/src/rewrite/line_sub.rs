//! Line-substitution rewrite strategy.
//!
//! Operates on the line-segmented unit sequence: deletes
//! `floor(0.1 * n)` lines and modifies a further, disjoint
//! `floor(0.1 * n)` lines, each through exactly one modifier drawn
//! uniformly from a fixed table of named pure functions. Surviving lines
//! are rejoined with `\n` in their original relative order.
//!
//! Modifiers are independently testable; all randomness comes from the
//! injected RNG.

use std::collections::HashSet;

use rand::seq::index::sample;
use rand::Rng;

use crate::detection::segmenter::segment_lines;
use crate::rewrite::word_sub::sentence_case;

/// Fraction of lines deleted, and again modified, per pass.
const TOUCH_FRACTION_DENOMINATOR: usize = 10;

pub fn rewrite_lines(text: &str, rng: &mut impl Rng) -> String {
    let units = segment_lines(text);
    let lines: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();
    transform_lines(&lines, rng).join("\n")
}

fn transform_lines(lines: &[&str], rng: &mut impl Rng) -> Vec<String> {
    let (deleted, modified) = select_indices(lines.len(), rng);
    lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !deleted.contains(i))
        .map(|(i, line)| {
            if modified.contains(&i) {
                let modifier = &MODIFIERS[rng.gen_range(0..MODIFIERS.len())];
                (modifier.apply)(line)
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// Picks `floor(n/10)` indices to delete and a further `floor(n/10)` to
/// modify. One sample of `2k` without replacement guarantees the sets are
/// disjoint.
fn select_indices(n: usize, rng: &mut impl Rng) -> (HashSet<usize>, HashSet<usize>) {
    let k = n / TOUCH_FRACTION_DENOMINATOR;
    let picked = sample(rng, n, 2 * k).into_vec();
    let deleted = picked[..k].iter().copied().collect();
    let modified = picked[k..].iter().copied().collect();
    (deleted, modified)
}

/// A named line modifier from the fixed table.
pub struct LineModifier {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

pub const MODIFIERS: &[LineModifier] = &[
    LineModifier {
        name: "synonym_swap",
        apply: synonym_swap,
    },
    LineModifier {
        name: "toggle_trailing_period",
        apply: toggle_trailing_period,
    },
    LineModifier {
        name: "sentence_case",
        apply: apply_sentence_case,
    },
    LineModifier {
        name: "prefix_additionally",
        apply: prefix_additionally,
    },
    LineModifier {
        name: "swap_clauses",
        apply: swap_clauses,
    },
];

/// good → excellent, bad → poor; case-insensitive match on the input side.
fn synonym_swap(line: &str) -> String {
    let swapped = replace_ignore_ascii_case(line, "good", "excellent");
    replace_ignore_ascii_case(&swapped, "bad", "poor")
}

fn toggle_trailing_period(line: &str) -> String {
    match line.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => format!("{line}."),
    }
}

fn apply_sentence_case(line: &str) -> String {
    sentence_case(line)
}

fn prefix_additionally(line: &str) -> String {
    format!("Additionally, {line}")
}

/// Swaps the two clauses around `" and "` — only when exactly one
/// occurrence exists; otherwise the line is left untouched.
fn swap_clauses(line: &str) -> String {
    let mut matches = line.match_indices(" and ");
    match (matches.next(), matches.next()) {
        (Some((idx, sep)), None) => {
            let left = &line[..idx];
            let right = &line[idx + sep.len()..];
            format!("{right} and {left}")
        }
        _ => line.to_string(),
    }
}

/// ASCII case-insensitive substring replacement. The needle is ASCII, so a
/// match can never start inside a multi-byte character and the output stays
/// valid UTF-8.
fn replace_ignore_ascii_case(text: &str, needle: &str, replacement: &str) -> String {
    let bytes = text.as_bytes();
    let pat = needle.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if i + pat.len() <= bytes.len() && bytes[i..i + pat.len()].eq_ignore_ascii_case(pat) {
            out.extend_from_slice(replacement.as_bytes());
            i += pat.len();
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
