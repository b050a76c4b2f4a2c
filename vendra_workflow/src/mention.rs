//! Correlates a rendered reply with the turn's retrieved candidates.
//!
//! The generator is prompted to name products by title, so a title appearing
//! in the reply is the signal that the item was actually offered to the
//! customer. When the generator summarised instead of naming anything, every
//! candidate is surfaced: over-showing beats hiding results the reply is
//! talking about.

use vendra_core::Candidate;

/// Select the candidates whose titles the reply mentions
/// (case-insensitive). Falls back to the full candidate list when no title
/// matches; an empty candidate list stays empty.
#[must_use]
pub fn correlate(reply: &str, candidates: &[Candidate]) -> Vec<Candidate> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let reply_lower = reply.to_lowercase();
    let mentioned: Vec<Candidate> = candidates
        .iter()
        .filter(|c| {
            c.title()
                .is_some_and(|t| !t.is_empty() && reply_lower.contains(&t.to_lowercase()))
        })
        .cloned()
        .collect();

    if mentioned.is_empty() {
        candidates.to_vec()
    } else {
        mentioned
    }
}
