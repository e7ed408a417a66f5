// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use thiserror::Error;

use crate::{
    arch::{InstructionAddress, Value, Word, SENTINEL},
    loader::LoadError,
    memory::{DataStore, InstructionStore},
    op::{Comp, Dest, Instruction, Jump, RawComp},
    snapshot::Snapshot,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VMError {
    #[error("unrecognized comp field {comp:#05x} in instruction at {address}")]
    InvalidOpcode {
        comp: RawComp,
        address: InstructionAddress,
    },
    #[error("data address {address} is outside the data store")]
    DataAddressOutOfBounds { address: Value },
    #[error("jump target {target} is outside the instruction store")]
    InvalidJumpTarget { target: Word },
    #[error("program counter {pc} is outside the instruction store")]
    ProgramCounterOutOfBounds { pc: InstructionAddress },
    #[error("machine has already faulted")]
    Faulted,
}

pub type VMResult<T = ()> = Result<T, VMError>;

/// Scheduling tag for the fetch-decode-execute cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    Fetch,
    DecodedImmediate,
    ReadyToExecute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    /// The sentinel was fetched.
    Halted,
    /// An instruction faulted; see the [`VMError`] returned by that step.
    Faulted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Halted,
    CycleLimitReached,
}

#[derive(Default)]
struct Registers {
    address: Value,
    data: Value,
}

pub struct VM {
    instructions: InstructionStore,
    data: DataStore,
    registers: Registers,
    pc: InstructionAddress,
    control: ControlState,
    status: Status,
    cycles: u64,
}

impl VM {
    /// Creates a [`VM`] over an already loaded instruction store with zeroed
    /// registers and data store.
    pub fn new(instructions: InstructionStore) -> Self {
        Self {
            instructions,
            data: DataStore::default(),
            registers: Registers::default(),
            pc: 0,
            control: ControlState::Fetch,
            status: Status::Running,
            cycles: 0,
        }
    }

    /// Creates a [`VM`] from raw instruction words; the sentinel is appended.
    pub fn from_program(program: &[Word]) -> Result<Self, LoadError> {
        Ok(Self::new(InstructionStore::load(program)?))
    }

    /// Runs the [`VM`] until it fetches the sentinel or faults.
    pub fn run(&mut self) -> VMResult {
        while self.step()? == StepOutcome::Running {}
        Ok(())
    }

    /// Runs the [`VM`] for at most `max_cycles` cycles.
    pub fn run_for(&mut self, max_cycles: u64) -> VMResult<RunOutcome> {
        for _ in 0..max_cycles {
            if self.step()? == StepOutcome::Halted {
                return Ok(RunOutcome::Halted);
            }
        }
        Ok(RunOutcome::CycleLimitReached)
    }

    /// Performs one cycle: a fetch, and at most one decode and one execute.
    pub fn step(&mut self) -> VMResult<StepOutcome> {
        match self.status {
            Status::Running => {}
            Status::Halted => return Ok(StepOutcome::Halted),
            Status::Faulted => return Err(VMError::Faulted),
        }

        let outcome = self.cycle();
        if outcome.is_err() {
            self.status = Status::Faulted;
            self.control = ControlState::Fetch;
        }
        outcome
    }

    fn cycle(&mut self) -> VMResult<StepOutcome> {
        let address = self.pc;
        let word = self.fetch()?;
        self.cycles += 1;

        if word == SENTINEL {
            log::debug!(
                "fetched sentinel at {} after {} cycles",
                address,
                self.cycles
            );
            self.status = Status::Halted;
            return Ok(StepOutcome::Halted);
        }

        let instruction = Instruction::decode(word);
        log::trace!("{:05}: {}", address, instruction);

        match instruction {
            Instruction::LoadImmediate(immediate) => {
                self.registers.address = immediate as Value;
                self.control = ControlState::DecodedImmediate;
            }
            Instruction::Compute { comp, dest, jump } => {
                self.control = ControlState::ReadyToExecute;
                self.execute(address, comp, dest, jump)?;
            }
        }

        self.control = ControlState::Fetch;
        Ok(StepOutcome::Running)
    }

    fn fetch(&mut self) -> VMResult<Word> {
        let word = self.instructions.fetch(self.pc).ok_or(
            VMError::ProgramCounterOutOfBounds { pc: self.pc },
        )?;
        self.pc += 1;
        Ok(word)
    }

    fn execute(
        &mut self,
        address: InstructionAddress,
        comp: RawComp,
        dest: Dest,
        jump: Jump,
    ) -> VMResult {
        let comp = Comp::from_raw(comp).ok_or_else(|| {
            log::warn!("unrecognized comp {:#05x} at {}", comp, address);
            VMError::InvalidOpcode { comp, address }
        })?;

        let y = if comp.references_memory() {
            self.data.read(self.registers.address)?
        } else {
            self.registers.address
        };
        let result = comp.compute(self.registers.data, y);

        // `dest` is ignored whenever a jump condition is present.
        if jump == Jump::Never {
            self.route(dest, result)
        } else if jump.holds(result) {
            self.jump_to(self.registers.address)
        } else {
            Ok(())
        }
    }

    /// Writes one computed `result` to every target named by `dest`. The
    /// data-store cell is addressed by the address register as it was before
    /// this instruction.
    fn route(&mut self, dest: Dest, result: Value) -> VMResult {
        if dest.writes_memory() {
            self.data.write(self.registers.address, result)?;
        }
        if dest.writes_data() {
            self.registers.data = result;
        }
        if dest.writes_address() {
            self.registers.address = result;
        }
        Ok(())
    }

    fn jump_to(&mut self, target: Value) -> VMResult {
        let target = target as Word;
        if self.instructions.fetch(target as InstructionAddress).is_none() {
            return Err(VMError::InvalidJumpTarget { target });
        }
        self.pc = target as InstructionAddress;
        Ok(())
    }

    pub fn address_register(&self) -> Value {
        self.registers.address
    }

    pub fn data_register(&self) -> Value {
        self.registers.data
    }

    pub fn program_counter(&self) -> InstructionAddress {
        self.pc
    }

    pub fn control_state(&self) -> ControlState {
        self.control
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// False only once an instruction has faulted; a sentinel halt leaves
    /// the machine running.
    pub fn is_running(&self) -> bool {
        self.status != Status::Faulted
    }

    /// Number of instruction words fetched, sentinel included.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    pub fn instructions(&self) -> &InstructionStore {
        &self.instructions
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            address_register: self.registers.address,
            data_register: self.registers.data,
            program_counter: self.pc,
            cycles: self.cycles,
            program: self
                .instructions
                .program()
                .iter()
                .copied()
                .take_while(|&word| word != SENTINEL)
                .collect(),
            data: self.data.as_slice().to_vec(),
        }
    }
}
