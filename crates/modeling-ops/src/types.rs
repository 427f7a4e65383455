/// Errors from modeling operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] shape_kernel::KernelError),

    #[error("profile has too few distinct points: {points}")]
    DegenerateProfile { points: usize },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}
