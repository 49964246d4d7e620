use std::collections::HashMap;

use crate::field::field_model::FieldCandidate;

/// Counts from folding one phase's output into the set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub added: usize,
    pub replaced: usize,
}

/// Deduplicated candidates in discovery order.
///
/// Merging is a fold: novel identities are appended; for a known identity the
/// higher confidence wins, but the stored slot keeps its first detection
/// method and discovery position, and `required` is OR-ed across sightings.
/// A locked semantic type survives either way; the latest lock wins.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    candidates: Vec<FieldCandidate>,
    index: HashMap<String, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, incoming: Vec<FieldCandidate>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        for candidate in incoming {
            let key = candidate.key();
            let Some(&slot) = self.index.get(&key) else {
                self.index.insert(key, self.candidates.len());
                self.candidates.push(candidate);
                outcome.added += 1;
                continue;
            };

            let stored = &mut self.candidates[slot];
            let required = stored.required || candidate.required;
            let locked_type = if candidate.type_locked {
                Some(candidate.semantic_type)
            } else if stored.type_locked {
                Some(stored.semantic_type)
            } else {
                None
            };

            if candidate.confidence > stored.confidence {
                let first_method = stored.detection_method;
                let note = format!(
                    "replaced {:.2} from {} with {:.2} from {}",
                    stored.confidence,
                    first_method,
                    candidate.confidence,
                    candidate.detection_method
                );
                *stored = candidate;
                stored.detection_method = first_method;
                stored.evidence.push(note);
                outcome.replaced += 1;
            } else {
                stored.evidence.push(format!(
                    "also seen by {} at {:.2}",
                    candidate.detection_method, candidate.confidence
                ));
            }
            stored.required = required;
            if let Some(semantic_type) = locked_type {
                stored.semantic_type = semantic_type;
                stored.type_locked = true;
            }
        }

        outcome
    }

    pub fn as_slice(&self) -> &[FieldCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_vec(self) -> Vec<FieldCandidate> {
        self.candidates
    }
}

pub fn filter_by_threshold(candidates: &[FieldCandidate], threshold: f32) -> Vec<FieldCandidate> {
    candidates
        .iter()
        .filter(|c| c.confidence >= threshold)
        .cloned()
        .collect()
}

/// Confidence descending, required first on ties, then discovery order.
pub fn rank(fields: &mut [FieldCandidate]) {
    fields.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| b.required.cmp(&a.required))
    });
}
