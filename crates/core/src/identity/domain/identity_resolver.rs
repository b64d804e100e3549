/// Batch-local person label. Carries no meaning across runs.
pub type IdentityLabel = u32;

/// Domain interface for clustering face embeddings into person identities.
///
/// Returns one entry per input embedding: `Some(label)` when the face was
/// assigned to an identity, `None` when it was left as noise. Labels are
/// dense and numbered from 0 in order of discovery.
pub trait IdentityResolver: Send {
    fn resolve(&self, embeddings: &[&[f32]]) -> Vec<Option<IdentityLabel>>;

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}
