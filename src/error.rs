use thiserror::Error;

/// A broken structural rule found by `validate()`.
///
/// Normal operations never produce this; it is a diagnostic for tests and for the
/// `consistency_check` feature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("keys are not in strictly ascending order at in-order position {position}")]
    Unordered { position: usize },

    #[error("stored height {stored} does not match computed height {computed}")]
    HeightMismatch { stored: usize, computed: usize },

    #[error("subtree heights {left} and {right} differ by more than one")]
    Unbalanced { left: usize, right: usize },

    #[error("root node is red")]
    RedRoot,

    #[error("red node has a red child")]
    RedRed,

    #[error("black heights {left} and {right} differ between sibling subtrees")]
    BlackHeight { left: usize, right: usize },

    #[error("child does not link back to its parent")]
    BrokenParentLink,

    #[error("tree holds {counted} nodes but records a size of {recorded}")]
    SizeMismatch { counted: usize, recorded: usize },
}
