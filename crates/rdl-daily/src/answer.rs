//! Answer comparison.

/// Normalize an answer for comparison: surrounding whitespace is dropped and
/// the text is lowercased. Interior whitespace and punctuation are kept as-is,
/// so `"echo"` and `" ECHO "` match but `"an echo"` does not.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Check a submitted answer against the riddle's canonical answer.
///
/// There is exactly one accepted answer per riddle and no partial credit.
pub fn is_correct_answer(submitted: &str, canonical: &str) -> bool {
    normalize_answer(submitted) == normalize_answer(canonical)
}
