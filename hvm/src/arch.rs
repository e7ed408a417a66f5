// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use static_assertions::const_assert;

/// An instruction word as held by the instruction store.
pub type Word = u16;

/// The contents of a register or a data-store cell.
pub type Value = i16;

pub type InstructionAddress = usize;
pub type DataAddress = usize;

/// Capacity of the instruction store, in words.
pub const INSTRUCTION_STORE_SIZE: usize = 32768;
const_assert!(INSTRUCTION_STORE_SIZE <= 1usize << Word::BITS);

/// Capacity of the data store, in cells.
pub const DATA_STORE_SIZE: usize = 16384;
const_assert!(DATA_STORE_SIZE <= Value::MAX as usize + 1);

/// Marks the end of the loaded program. Fetching it halts the machine.
pub const SENTINEL: Word = 0xFFFF;

/// Number of header bytes in a program image before the first instruction.
pub const IMAGE_PAYLOAD_OFFSET: usize = 8;
