pub mod alu;
pub mod op;
pub mod reg;
pub mod seg;

/// Comment marker in VM source.
pub const COMMENT: &str = "//";

/// First stack address above the memory-mapped register region.
pub const STACK_BASE: u16 = 256;

/// Entry function invoked by the bootstrap sequence.
pub const ENTRY: &str = "Sys.init";

/// Largest value an A-instruction immediate can hold (15 bits).
pub const IMM_MAX: u16 = 0x7FFF;
