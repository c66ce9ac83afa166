//! Humdrum - spined music text parser
//!
//! This library reads Humdrum documents: tab-separated text in which parallel
//! spines can split, merge, exchange and terminate. It builds the spine graph
//! linking every token to its neighbours and computes exact rational timing
//! for every token and line.

mod analysis;
pub mod convert;
pub mod error;
pub mod file;
pub mod line_parser;
pub mod parser;
pub mod types;
pub mod util;

// Re-export commonly used types
pub use convert::{ConversionError, recip_to_duration};
pub use error::HumdrumError;
pub use file::HumdrumFile;
pub use parser::{HumdrumParser, ParseOptions, parse_humdrum};
pub use types::barline::MeasureStyle;
pub use types::line::{Line, LineType};
pub use types::rational::RationalNumber;
pub use types::token::{Token, TokenAddress, TokenId};
