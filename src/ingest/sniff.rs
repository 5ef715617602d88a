//! Delimiter detection for uploaded CSV text.

use tracing::{debug, trace};

/// Delimiters we know how to read, in order of preference when scores tie.
pub const CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// How much of the input is inspected.
pub const SAMPLE_BYTES: usize = 4096;

/// How many lines of the sample are scored.
const SAMPLE_LINES: usize = 10;

/// Chooses the field delimiter for `text`. Never fails: without a clear signal it falls back to a
/// first-line heuristic and ultimately to a comma.
pub fn sniff_delimiter(text: &str) -> u8 {
    let lines = sample_lines(text);
    match score_candidates(&lines) {
        Some(delimiter) => {
            debug!("Detected delimiter {:?}", delimiter as char);
            delimiter
        }
        None => {
            let delimiter = first_line_heuristic(lines.first().copied().unwrap_or_default());
            debug!(
                "Delimiter detection inconclusive, using {:?}",
                delimiter as char
            );
            delimiter
        }
    }
}

/// The first non-blank lines of a bounded prefix of `text`. When the prefix cuts through a line,
/// that partial line is dropped.
fn sample_lines(text: &str) -> Vec<&str> {
    let truncated = text.len() > SAMPLE_BYTES;
    let mut end = SAMPLE_BYTES.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut sample = &text[..end];
    if truncated {
        if let Some(last_newline) = sample.rfind('\n') {
            sample = &sample[..last_newline];
        }
    }
    sample
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .take(SAMPLE_LINES)
        .collect()
}

/// Scores each candidate by how frequently and how consistently it occurs per line. Returns the
/// single best candidate, or `None` when no candidate occurs or the best score is shared.
fn score_candidates(lines: &[&str]) -> Option<u8> {
    if lines.is_empty() {
        return None;
    }

    let mut scores: Vec<(u8, f64)> = CANDIDATES
        .iter()
        .map(|&delimiter| {
            let counts: Vec<f64> = lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count() as f64)
                .collect();
            let n = counts.len() as f64;
            let mean = counts.iter().sum::<f64>() / n;
            let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
            let score = mean / (1.0 + variance.sqrt());
            trace!(
                "Delimiter {:?}: mean {mean:.2}, score {score:.3}",
                delimiter as char
            );
            (delimiter, score)
        })
        .collect();

    scores.sort_by(|a, b| b.1.total_cmp(&a.1));
    let (best, best_score) = scores[0];
    let runner_up = scores[1].1;
    if best_score <= 0.0 || (best_score - runner_up).abs() < f64::EPSILON {
        return None;
    }
    Some(best)
}

/// Semicolon if the header uses it and has no comma, else tab if present, else comma.
fn first_line_heuristic(first_line: &str) -> u8 {
    if first_line.contains(';') && !first_line.contains(',') {
        b';'
    } else if first_line.contains('\t') {
        b'\t'
    } else {
        b','
    }
}
