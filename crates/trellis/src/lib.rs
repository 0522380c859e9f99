//! Parser for the **Trellis** markup language (`.tml`) and its companion
//! style sheets (`.tss`).
//!
//! The crate has no engine or rendering code so that editors, linters and
//! language-server tooling can depend on it directly.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`element`] | `Element`, `Attributes`, `TemplateBinding` |
//! | [`error`] | `ParseError`, `ErrorKind` |
//! | [`parser`] | `Parser`, `ParserConfig`, `parse_str` |
//! | [`style`] | `Style`, `Styles`, `Value`, `parse_styles` |
//!
//! # Quick start
//!
//! ```rust
//! use trellis::Parser;
//!
//! let mut parser = Parser::new();
//! parser.add_definitions(["column", "button"]);
//! parser.add_prefabs(br#"
//!     <!confirm>
//!         <button onclick={ok}>OK</>
//!     <!/>
//! "#).unwrap();
//!
//! let root = parser.parse(br#"
//!     <column style="gap: 8;">
//!         <confirm ok="save"/>
//!     </>
//! "#).unwrap();
//!
//! let column = &root.children[0];
//! assert_eq!(column.style.as_ref().unwrap().int("gap"), Some(8));
//! assert_eq!(column.children[0].first("onclick"), Some("save"));
//! ```

mod cursor;
mod decoder;
pub mod element;
pub mod error;
pub mod parser;
pub mod style;

pub use element::{Attributes, Element, Slot, TemplateBinding, TEXT};
pub use error::{ErrorKind, NumberError, ParseError, Result};
pub use parser::{parse_str, Parser, ParserConfig};
pub use style::{parse_style_block, parse_styles, Style, Styles, Value};
