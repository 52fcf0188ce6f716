//! Site-wide presentation strings. Static for the lifetime of the process.

pub const SITE_HEADER: &str = "Lexis: multilingual dictionary";
pub const SITE_TITLE: &str = "Lexis";
pub const INDEX_TITLE: &str = "Dictionary administration";
