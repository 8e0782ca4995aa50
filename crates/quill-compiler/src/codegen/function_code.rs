//! The control-flow graph produced for one function.

use std::fmt::Write;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use super::{BasicBlock, BlockFlags, BlockId, RegisterMap};
use crate::symbols::SymbolId;

/// A broken control-flow graph invariant. Only a code generator defect can
/// produce one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CfgViolation {
    #[error("block {0} is not reachable from the entry block")]
    Unreachable(BlockId),
    #[error("block {0} does not end in a jump or branch")]
    Unterminated(BlockId),
    #[error("exit block {0} ends in a jump or branch")]
    TerminatedExit(BlockId),
    #[error("block {0} has a terminator before its last instruction")]
    EarlyTerminator(BlockId),
    #[error("edge {from} -> {to} is not recorded on both ends")]
    EdgeMismatch { from: BlockId, to: BlockId },
    #[error("block {0} refers to a block that does not exist")]
    DanglingEdge(BlockId),
}

/// Generated code of one function: its blocks, ordered by id, and the
/// registers of its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCode {
    pub name: String,
    blocks: Vec<BasicBlock>,
    registers: RegisterMap,
}

impl FunctionCode {
    pub(crate) fn new(name: String, mut blocks: Vec<BasicBlock>, registers: RegisterMap) -> Self {
        blocks.sort_by_key(|b| b.id);
        Self {
            name,
            blocks,
            registers,
        }
    }

    pub fn entry(&self) -> BlockId {
        BlockId::ENTRY
    }

    pub fn exit(&self) -> BlockId {
        BlockId::EXIT
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &self.blocks[i])
    }

    /// Register assigned to the variable `symbol`.
    pub fn register(&self, symbol: SymbolId) -> Option<u32> {
        self.registers.get(symbol)
    }

    pub fn registers(&self) -> &RegisterMap {
        &self.registers
    }

    /// Number of registers the function's variables need.
    pub fn local_count(&self) -> u32 {
        self.registers.local_count()
    }

    /// Textual listing: blocks in depth-first order from the entry, true
    /// branch targets first, each as `L<id>:` followed by one tab-indented
    /// line per instruction.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut visited = FxHashSet::default();
        self.render_block(BlockId::ENTRY, &mut visited, &mut out);
        out
    }

    fn render_block(&self, id: BlockId, visited: &mut FxHashSet<BlockId>, out: &mut String) {
        if !visited.insert(id) {
            return;
        }
        let Some(block) = self.block(id) else {
            return;
        };
        let _ = writeln!(out, "{id}:");
        for instruction in &block.instructions {
            let _ = writeln!(out, "\t{instruction}");
        }
        for &succ in &block.successors {
            self.render_block(succ, visited, out);
        }
    }

    /// Check the graph's structural invariants:
    ///
    /// - every block is reachable from the entry
    /// - every block but the exit ends in exactly one terminator
    /// - the exit block has no terminator
    /// - successor lists match terminator targets and predecessor lists
    pub fn verify(&self) -> Result<(), CfgViolation> {
        let reachable = reachable_blocks(&self.blocks);
        for block in &self.blocks {
            let id = block.id;
            if !reachable.contains(&id) && !block.flags.contains(BlockFlags::EXIT) {
                return Err(CfgViolation::Unreachable(id));
            }

            let body = &block.instructions[..block.instructions.len().saturating_sub(1)];
            if body.iter().any(|i| i.is_terminator()) {
                return Err(CfgViolation::EarlyTerminator(id));
            }

            if block.flags.contains(BlockFlags::EXIT) {
                if block.is_terminated() {
                    return Err(CfgViolation::TerminatedExit(id));
                }
            } else {
                let Some(terminator) = block.terminator() else {
                    return Err(CfgViolation::Unterminated(id));
                };
                if terminator.targets() != block.successors {
                    let to = terminator.targets().first().copied().unwrap_or(id);
                    return Err(CfgViolation::EdgeMismatch { from: id, to });
                }
            }

            for &succ in &block.successors {
                let Some(target) = self.block(succ) else {
                    return Err(CfgViolation::DanglingEdge(id));
                };
                if !target.predecessors.contains(&id) {
                    return Err(CfgViolation::EdgeMismatch { from: id, to: succ });
                }
            }
            for &pred in &block.predecessors {
                let Some(source) = self.block(pred) else {
                    return Err(CfgViolation::DanglingEdge(id));
                };
                if !source.successors.contains(&id) {
                    return Err(CfgViolation::EdgeMismatch { from: pred, to: id });
                }
            }
        }
        Ok(())
    }
}

/// Ids of the blocks reachable from the entry block.
pub(crate) fn reachable_blocks(blocks: &[BasicBlock]) -> FxHashSet<BlockId> {
    let mut graph = DiGraph::<BlockId, ()>::new();
    let nodes: FxHashMap<BlockId, NodeIndex> = blocks
        .iter()
        .map(|b| (b.id, graph.add_node(b.id)))
        .collect();
    for block in blocks {
        for succ in &block.successors {
            if let (Some(&from), Some(&to)) = (nodes.get(&block.id), nodes.get(succ)) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let mut reachable = FxHashSet::default();
    let Some(&entry) = nodes.get(&BlockId::ENTRY) else {
        return reachable;
    };
    let mut dfs = Dfs::new(&graph, entry);
    while let Some(node) = dfs.next(&graph) {
        reachable.insert(graph[node]);
    }
    reachable
}
