//! Style model and the `.tss` style sheet parser.
//!
//! ```tss
//! button {
//!     color: red;
//!     padding: 4i 8i;
//!     hover { color: inherit; }
//! }
//! ```

mod parser;
mod value;

pub use parser::{parse_style_block, parse_styles};
pub use value::{Style, Styles, Value, INHERIT};
