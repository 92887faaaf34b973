//! Error classification shared across the domain crates

/// Broad classification shared by the domain error enums
///
/// Callers (the billing batch, the HTTP layer) branch on the kind rather
/// than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before any write
    Validation,
    /// Unknown account, entry or subject
    NotFound,
    /// Lost a uniqueness race
    Conflict,
    /// Required setup (e.g. billing accounts) is missing
    Configuration,
    /// The store failed
    Storage,
}
