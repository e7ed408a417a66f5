// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use num_traits::ToPrimitive;

use crate::{
    arch::{
        DataAddress, InstructionAddress, Value, Word, DATA_STORE_SIZE,
        INSTRUCTION_STORE_SIZE, SENTINEL,
    },
    loader::LoadError,
    vm::{VMError, VMResult},
};

/// The read-only instruction store: a loaded program followed by
/// [`SENTINEL`], zero-filled up to [`INSTRUCTION_STORE_SIZE`].
pub struct InstructionStore {
    words: Box<[Word]>,
    program_length: InstructionAddress,
}

impl InstructionStore {
    /// Copies `program` into a fresh store and terminates it with the
    /// sentinel, which must still fit.
    pub fn load(program: &[Word]) -> Result<Self, LoadError> {
        if program.len() >= INSTRUCTION_STORE_SIZE {
            return Err(LoadError::ProgramTooLarge {
                words: program.len(),
                capacity: INSTRUCTION_STORE_SIZE - 1,
            });
        }

        let mut words = vec![0; INSTRUCTION_STORE_SIZE].into_boxed_slice();
        words[..program.len()].copy_from_slice(program);
        words[program.len()] = SENTINEL;

        Ok(Self {
            words,
            program_length: program.len(),
        })
    }

    /// The word at `address`, or `None` past the end of the store.
    pub fn fetch(&self, address: InstructionAddress) -> Option<Word> {
        self.words.get(address).copied()
    }

    /// The loaded program, without the sentinel.
    pub fn program(&self) -> &[Word] {
        &self.words[..self.program_length]
    }

    /// Number of loaded words, not counting the sentinel.
    pub fn len(&self) -> usize {
        self.program_length
    }

    pub fn is_empty(&self) -> bool {
        self.program_length == 0
    }
}

/// The data store. Every access is bounds checked against
/// [`DATA_STORE_SIZE`]; a register value is never used as a raw index.
pub struct DataStore {
    cells: Box<[Value]>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self {
            cells: vec![0; DATA_STORE_SIZE].into_boxed_slice(),
        }
    }
}

impl DataStore {
    /// Resolves a register value to a cell index.
    pub fn slot(&self, address: Value) -> VMResult<DataAddress> {
        address
            .to_usize()
            .filter(|&slot| slot < self.cells.len())
            .ok_or(VMError::DataAddressOutOfBounds { address })
    }

    pub fn read(&self, address: Value) -> VMResult<Value> {
        let slot = self.slot(address)?;
        Ok(self.cells[slot])
    }

    pub fn write(&mut self, address: Value, value: Value) -> VMResult {
        let slot = self.slot(address)?;
        self.cells[slot] = value;
        Ok(())
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        arch::{Value, DATA_STORE_SIZE, INSTRUCTION_STORE_SIZE, SENTINEL},
        loader::LoadError,
        memory::{DataStore, InstructionStore},
        vm::VMError,
    };

    #[test]
    fn appends_sentinel() {
        let store = InstructionStore::load(&[7, 8]).expect("program fits");
        assert_eq!(Some(7), store.fetch(0));
        assert_eq!(Some(8), store.fetch(1));
        assert_eq!(Some(SENTINEL), store.fetch(2));
        assert_eq!(Some(0), store.fetch(3));
        assert_eq!(&[7, 8], store.program());
        assert_eq!(2, store.len());
    }

    #[test]
    fn empty_program_is_just_the_sentinel() {
        let store = InstructionStore::load(&[]).expect("program fits");
        assert!(store.is_empty());
        assert_eq!(Some(SENTINEL), store.fetch(0));
    }

    #[test]
    fn rejects_program_without_room_for_sentinel() {
        let largest = vec![0; INSTRUCTION_STORE_SIZE - 1];
        assert!(InstructionStore::load(&largest).is_ok());

        let too_large = vec![0; INSTRUCTION_STORE_SIZE];
        assert!(matches!(
            InstructionStore::load(&too_large),
            Err(LoadError::ProgramTooLarge { words, .. }) if words == INSTRUCTION_STORE_SIZE
        ));
    }

    #[test]
    fn fetch_past_capacity() {
        let store = InstructionStore::load(&[]).expect("program fits");
        assert_eq!(None, store.fetch(INSTRUCTION_STORE_SIZE));
    }

    #[test]
    fn data_store_bounds() {
        let mut data = DataStore::default();
        let last = (DATA_STORE_SIZE - 1) as Value;

        data.write(last, 42).expect("last cell is in range");
        assert_eq!(42, data.read(last).expect("last cell is in range"));
        assert_eq!(0, data.read(0).expect("first cell is in range"));

        for address in [DATA_STORE_SIZE as Value, -1, Value::MIN, Value::MAX] {
            assert!(matches!(
                data.read(address),
                Err(VMError::DataAddressOutOfBounds { address: bad }) if bad == address
            ));
            assert!(data.write(address, 1).is_err());
        }
        assert_eq!(
            1,
            data.as_slice().iter().filter(|&&cell| cell != 0).count()
        );
    }
}
