use crate::challenge::{ChallengeItem, VerificationResult};

/// Compares each answer with the canonical form of its item.
///
/// Comparison is exact and case sensitive. Positions without an answer are
/// checked against the empty string.
pub fn verify(items: &[ChallengeItem], answers: &[String]) -> Vec<VerificationResult> {
    items
        .iter()
        .enumerate()
        .map(|(index, expected)| {
            let answer = answers.get(index).cloned().unwrap_or_default();
            let is_correct = answer == expected.to_string();
            VerificationResult {
                index,
                expected: expected.clone(),
                answer,
                is_correct,
            }
        })
        .collect()
}
