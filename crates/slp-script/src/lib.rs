/// SLP SDK - Script encoding and Bitcoin Cash addresses.
///
/// Provides the Script type, opcode definitions, chunk parsing, and the
/// CashAddr, SLP and legacy address encodings.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod address;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use address::{
    is_slp_address, to_cash_address, to_legacy_address, to_slp_address, Address, AddressFormat,
    AddressKind, Network,
};
pub use chunk::ScriptChunk;
