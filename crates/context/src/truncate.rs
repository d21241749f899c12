//! Field-level shrinking helpers used by the degradation pipeline.
//!
//! All limits are in approximate tokens (see [`approximate_tokens`]) and all
//! cuts land on `char` boundaries.

use crate::token::{approximate_tokens, chars_for_tokens};
use dailybrief_core::Comment;

/// Appended to a body that had to be hard-cut mid-sentence.
pub const TRUNCATION_MARKER: &str = " … [truncated]";

const SENTENCE_ENDS: [&str; 3] = [". ", "! ", "? "];

/// Approximate cost of one comment as rendered (author plus body).
pub fn comment_cost(comment: &Comment) -> usize {
    approximate_tokens(&comment.author) + approximate_tokens(&comment.body)
}

/// Drop the oldest comments until the rest fit in `budget` tokens.
///
/// Survivors keep their original order. Returns how many were dropped.
pub fn trim_comments_to_budget(comments: &mut Vec<Comment>, budget: usize) -> usize {
    let mut total: usize = comments.iter().map(comment_cost).sum();
    if total <= budget {
        return 0;
    }

    let mut oldest_first: Vec<usize> = (0..comments.len()).collect();
    oldest_first.sort_by_key(|&i| comments[i].created_at);

    let mut drop = vec![false; comments.len()];
    let mut dropped = 0;
    for i in oldest_first {
        if total <= budget {
            break;
        }
        total -= comment_cost(&comments[i]);
        drop[i] = true;
        dropped += 1;
    }

    let mut idx = 0;
    comments.retain(|_| {
        let keep = !drop[idx];
        idx += 1;
        keep
    });
    dropped
}

/// Byte offset of the `n`th char, or the end of `text`.
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// End of the last complete sentence within `text[..end]`.
///
/// Punctuation that closes the window counts when `text` continues with
/// whitespace.
fn sentence_cut(text: &str, end: usize) -> Option<usize> {
    let window = &text[..end];
    let punct = SENTENCE_ENDS
        .iter()
        .filter_map(|mark| window.rfind(mark).map(|i| i + 1))
        .max();
    let newline = window.rfind('\n');
    let at_edge = (window.ends_with(['.', '!', '?'])
        && text[end..].chars().next().is_some_and(char::is_whitespace))
    .then_some(end);
    let cut = punct.max(newline).max(at_edge)?;
    (cut > 0).then_some(cut)
}

/// Shrink `text` to at most `max_tokens`, preferring a sentence boundary.
///
/// Returns the (possibly unchanged) text and whether it was cut. A hard cut
/// ends with [`TRUNCATION_MARKER`], which counts against the limit; when the
/// limit is too small to hold the marker the bare prefix is returned.
pub fn truncate_at_sentence(text: &str, max_tokens: usize) -> (String, bool) {
    if approximate_tokens(text) <= max_tokens {
        return (text.to_string(), false);
    }

    let limit = chars_for_tokens(max_tokens);
    let end = byte_offset(text, limit);
    let window = &text[..end];

    if let Some(cut) = sentence_cut(text, end) {
        return (window[..cut].trim_end().to_string(), true);
    }

    let marker_chars = TRUNCATION_MARKER.chars().count();
    if limit <= marker_chars {
        return (window.trim_end().to_string(), true);
    }

    let keep = &text[..byte_offset(text, limit - marker_chars)];
    (format!("{}{TRUNCATION_MARKER}", keep.trim_end()), true)
}
