//! Basic blocks.

use bitflags::bitflags;

use super::{BlockId, Instruction};

bitflags! {
    /// Role of a block in its function's graph.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BlockFlags: u8 {
        const ENTRY = 1 << 0;
        const EXIT = 1 << 1;
        /// Target of a `while` back edge.
        const LOOP_HEAD = 1 << 2;
    }
}

/// A straight-line run of instructions ending in at most one control
/// transfer. Edges are kept on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub id: BlockId,
    pub flags: BlockFlags,
    pub instructions: Vec<Instruction>,
    pub successors: Vec<BlockId>,
    pub predecessors: Vec<BlockId>,
}

impl BasicBlock {
    pub fn new(id: BlockId, flags: BlockFlags) -> Self {
        Self {
            id,
            flags,
            instructions: Vec::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
        }
    }

    pub fn is_loop_head(&self) -> bool {
        self.flags.contains(BlockFlags::LOOP_HEAD)
    }

    /// Whether the last instruction is a jump or branch.
    pub fn is_terminated(&self) -> bool {
        self.instructions
            .last()
            .is_some_and(Instruction::is_terminator)
    }

    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.is_terminator())
    }
}
