//! Core milter session types.

mod headers;

pub use headers::HeaderMap;

use std::collections::HashMap;

/// Macros received from the MTA for the current protocol stage.
///
/// Macro names map to their values; the MTA sends them unordered and may
/// replace the whole set between stages.
pub type Macros = HashMap<String, String>;
