//! Semantic reduction and time reconstruction.

/// Frequency/mode fold and preamble validation.
pub mod reducer;
/// Zulu conversion and gap-fill interpolation.
pub mod time;
