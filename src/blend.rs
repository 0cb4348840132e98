use crate::{
    evaluation::EvaluationMatrix,
    moves::{MOVE_SPACE, MoveIndex},
    types::{LegalMoveMask, PolicyDistribution},
};

/// Policy restricted to legal moves and rescaled to sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskedPolicy {
    Renormalized(Vec<f32>),
    /// The policy put no mass on any legal move.
    Degenerate,
}

/// Zeroes illegal slots and renormalizes what is left.
pub fn mask_policy(policy: &PolicyDistribution, mask: &LegalMoveMask) -> MaskedPolicy {
    let masked: Vec<f32> = policy
        .as_slice()
        .iter()
        .zip(mask.as_slice())
        .map(|(&p, &legal)| if legal { p } else { 0.0 })
        .collect();
    let total: f32 = masked.iter().sum();
    log::debug!("legal policy mass {total}");
    if total == 0.0 {
        return MaskedPolicy::Degenerate;
    }
    MaskedPolicy::Renormalized(masked.into_iter().map(|p| p / total).collect())
}

/// `alpha * policy[i] + evaluation[i]` for every slot.
pub fn combine(renormalized: &[f32], evaluation: &EvaluationMatrix, alpha: f32) -> Vec<f32> {
    debug_assert_eq!(renormalized.len(), MOVE_SPACE);
    renormalized
        .iter()
        .zip(evaluation.flatten())
        .map(|(&p, e)| alpha * p + e)
        .collect()
}

/// Index of the highest score; ties go to the lowest index.
pub fn argmax(scores: &[f32]) -> Option<MoveIndex> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.and_then(|(i, _)| MoveIndex::from_raw(i))
}
