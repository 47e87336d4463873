/// Borrowed grayscale input frames
pub mod frame;
/// Raw per-symbol records emitted by the engine
pub mod record;
/// Symbology identities, names and families
pub mod symbology;

pub use frame::GrayFrame;
pub use record::DecodeRecord;
pub use symbology::{SymbologyFamily, SymbologyKind};
