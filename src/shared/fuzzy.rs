use rayon::prelude::*;
use std::{cmp, mem::swap};

/// Best candidate picked by [`match_one`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub index: usize,
    pub score: f64,
}

pub fn distance(s1_in: &str, s2_in: &str) -> usize {
    if s1_in == s2_in {
        return 0;
    }

    let (s1, s2) = if s2_in.chars().count() > s1_in.chars().count() {
        (s2_in, s1_in)
    } else {
        (s1_in, s2_in)
    };
    let s2_chars: Vec<char> = s2.chars().collect();

    // Two rolling rows instead of the full matrix
    let mut previous: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut current = vec![0usize; s2_chars.len() + 1];
    for (i, ic) in s1.chars().enumerate() {
        current[0] = i + 1;
        for (j, jc) in s2_chars.iter().enumerate() {
            let sub_cost = if ic == *jc { 0 } else { 1 };
            current[j + 1] = cmp::min(
                cmp::min(previous[j + 1] + 1, current[j] + 1),
                previous[j] + sub_cost,
            );
        }
        swap(&mut previous, &mut current);
    }
    previous[s2_chars.len()]
}

/// Similarity in `0.0..=1.0` between a spoken needle and a candidate.
///
/// Every needle token is scored against its closest candidate token, so
/// "harvard" still lands on "inbound harvard" even though the destination
/// is not the first word. The token average is blended with the similarity
/// of the whole strings to favour candidates of a similar length.
pub fn score(needle: &str, hay: &str) -> f64 {
    let needle_tokens: Vec<_> = needle.split_whitespace().collect();
    let hay_tokens: Vec<_> = hay.split_whitespace().collect();
    if needle_tokens.is_empty() || hay_tokens.is_empty() {
        return 0.0;
    }

    let tokens: f64 = needle_tokens
        .iter()
        .map(|needle| {
            hay_tokens
                .iter()
                .map(|hay| score_inner(needle, hay))
                .fold(0.0, f64::max)
        })
        .sum::<f64>()
        / needle_tokens.len() as f64;

    (tokens + score_inner(needle, hay)) / 2.0
}

fn score_inner(s1: &str, s2: &str) -> f64 {
    let dist = distance(s1, s2);
    if dist == 0 {
        1.0
    } else {
        1.0 - (dist as f64 / cmp::max(s1.chars().count(), s2.chars().count()) as f64)
    }
}

/// Picks the candidate closest to `needle`.
///
/// No threshold is applied: any non-empty candidate list yields a match, ties
/// go to the earlier candidate. Comparison is case-insensitive.
pub fn match_one<S>(needle: &str, candidates: &[S]) -> Option<Match>
where
    S: AsRef<str> + Sync,
{
    let normalized_needle = needle.to_lowercase();
    candidates
        .par_iter()
        .enumerate()
        .map(|(index, hay)| Match {
            index,
            score: score(&normalized_needle, &hay.as_ref().to_lowercase()),
        })
        .reduce_with(|a, b| {
            if b.score > a.score || (b.score == a.score && b.index < a.index) {
                b
            } else {
                a
            }
        })
}

#[test]
fn fuzzy_empty_vs_nonempty() {
    assert_eq!(distance("", "abc"), 3);
    assert_eq!(distance("abc", ""), 3);
}

#[test]
fn fuzzy_substitution() {
    assert_eq!(distance("cat", "cut"), 1);
}

#[test]
fn fuzzy_insertion_and_deletion() {
    assert_eq!(distance("cat", "cart"), 1);
    assert_eq!(distance("cart", "cat"), 1);
}

#[test]
fn fuzzy_unicode_distinct() {
    assert_eq!(distance("café", "cafe"), 1);
}

#[test]
fn fuzzy_longer_sequence() {
    assert_eq!(distance("intention", "execution"), 5);
}

#[test]
fn score_exact_is_one() {
    assert_eq!(score("forest hills", "forest hills"), 1.0);
}

#[test]
fn score_empty_needle_is_zero() {
    assert_eq!(score("", "forest hills"), 0.0);
}

#[test]
fn match_one_prefers_closest() {
    let candidates = ["Outbound Dudley", "Inbound Harvard"];
    assert_eq!(match_one("outbound", &candidates).unwrap().index, 0);
    assert_eq!(match_one("harvard", &candidates).unwrap().index, 1);
}

#[test]
fn match_one_empty_candidates() {
    let candidates: [&str; 0] = [];
    assert!(match_one("anything", &candidates).is_none());
}

#[test]
fn match_one_always_matches_nonsense() {
    let candidates = ["Outbound Dudley", "Inbound Harvard"];
    assert!(match_one("zzzz", &candidates).is_some());
}
