// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::fmt;

use crate::{
    arch::{InstructionAddress, Value, Word},
    op::Instruction,
};

/// Machine state after a run, detached from the [`crate::vm::VM`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub address_register: Value,
    pub data_register: Value,
    pub program_counter: InstructionAddress,
    pub cycles: u64,
    /// The loaded program, up to but excluding the first sentinel.
    pub program: Vec<Word>,
    /// The whole data store.
    pub data: Vec<Value>,
}

impl fmt::Display for Snapshot {
    /// One row per program word, shown beside the data-store cell with the
    /// same index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory Snapshot")?;
        writeln!(
            f,
            "A = {}  D = {}  PC = {}  cycles = {}",
            self.address_register,
            self.data_register,
            self.program_counter,
            self.cycles
        )?;
        writeln!(f, "{:>5}  {:>6}  {:<16}  {:>6}", "addr", "rom", "", "ram")?;
        for (address, &word) in self.program.iter().enumerate() {
            let cell = self.data.get(address).copied().unwrap_or_default();
            let instruction = Instruction::decode(word).to_string();
            writeln!(
                f,
                "{:>5}  {:#06x}  {:<16}  {:>6}",
                address, word, instruction, cell
            )?;
        }
        Ok(())
    }
}
