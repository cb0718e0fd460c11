//! # gamecfg-dialect - OptionSettings Block Codec
//!
//! Parses and re-writes the single-key dialect used by Unreal-based game
//! servers, where `OptionSettings` holds a parenthesized, comma-separated list
//! of `key=value` pairs:
//!
//! ```text
//! [/Script/Pal.PalGameWorldSettings]
//! OptionSettings=(Difficulty=None,ExpRate=1.000000,ServerName="My Server")
//! ```
//!
//! - [`parse()`] - Extract the block into a [`ParsedBlock`]
//! - [`serialize()`] - Re-encode a mapping in catalog order and splice it back
//!
//! Both are pure functions over in-memory text.

pub mod parser;
pub mod serializer;

pub use parser::{locate_block, parse, parse_entries, BlockSpan, ParsedBlock, BLOCK_OPENER};
pub use serializer::{render_block, serialize, serialize_with_quoting, FRAGMENT_SEPARATOR};
