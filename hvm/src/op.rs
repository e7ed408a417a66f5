// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::fmt;

use enum_tags::enum_tags;
use static_assertions::const_assert_eq;

use crate::{arch::Word, coding::CodeAsWord};

/// Smallest sized integer type that can fit a `comp` field.
pub type RawComp = u16;

/// Bits for the `jmp` field.
pub const JUMP_BITS: usize = 3;

/// Bits for the `dest` field.
pub const DEST_BITS: usize = 3;

/// Bits for the `comp` field, including the format bits.
pub const COMP_BITS: usize = 10;

/// Bits selecting the instruction format.
pub const FORMAT_BITS: usize = 3;

const_assert_eq!(JUMP_BITS + DEST_BITS + COMP_BITS, Word::BITS as usize);
const_assert_eq!(1usize << JUMP_BITS, Jump::VARIANTS.len());
const_assert_eq!(1usize << DEST_BITS, Dest::VARIANTS.len());

/// Format bits of a compute instruction. Every other pattern loads an
/// immediate.
pub const COMPUTE_FORMAT: Word = 0b111;

/// Position of the `a` bit within the `comp` field.
const MEMORY_OPERAND_BIT: RawComp = 1 << 6;

//  +---------------------------------------------------------------+
//  | Encodings                                                     |
//  +---------------------------------------------------------------+
//  | load immediate:  0vvv vvvv vvvv vvvv  (any format but 111;    |
//  |                  the whole word is the value)                 |
//  | compute:         111a cccc ccdd djjj                          |
//  |                  `comp` = 111acccccc, `dest` = ddd, `jmp` = jjj |
//  +---------------------------------------------------------------+

/// A decoded instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `Self::LoadImmediate(w)` loads `w`, reinterpreted as signed, into the
    /// address register.
    LoadImmediate(Word),
    /// `Self::Compute { comp, dest, jump }` evaluates `comp` and then either
    /// routes the result to `dest` or tests it against `jump`. `comp` is kept
    /// raw here; unrecognized encodings fault only when executed.
    Compute { comp: RawComp, dest: Dest, jump: Jump },
}

impl Instruction {
    /// Decodes an instruction from a [`Word`]. Never fails: every word is
    /// either a load-immediate or a compute instruction.
    pub fn decode(word: Word) -> Self {
        let format = word >> (Word::BITS as usize - FORMAT_BITS);
        if format != COMPUTE_FORMAT {
            return Self::LoadImmediate(word);
        }

        crate::decode!(word; Word;
            @(
                jump: Jump = [..JUMP_BITS..],
                dest: Dest = [..DEST_BITS..],
                comp: RawComp = [..COMP_BITS..]
            ) => Self::Compute { comp, dest, jump }
        )
    }

    /// Encodes this instruction as a [`Word`].
    pub fn encode(&self) -> Word {
        match *self {
            Self::LoadImmediate(word) => word,
            Self::Compute { comp, dest, jump } => crate::encode!(Word;
                [..JUMP_BITS..] = jump,
                [..DEST_BITS..] = dest,
                [..COMP_BITS..] = comp
            ),
        }
    }

    /// Shorthand for a compute instruction with a recognized `comp`.
    pub const fn compute(comp: Comp, dest: Dest, jump: Jump) -> Self {
        Self::Compute {
            comp: comp.tag(),
            dest,
            jump,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::LoadImmediate(word) => write!(f, "@{}", word),
            Self::Compute { comp, dest, jump } => {
                if dest != Dest::Null {
                    write!(f, "{}=", dest.mnemonic())?;
                }
                match Comp::from_raw(comp) {
                    Some(comp) => f.write_str(comp.mnemonic())?,
                    None => write!(f, "?{:#05x}", comp)?,
                }
                if jump != Jump::Never {
                    write!(f, ";{}", jump.mnemonic())?;
                }
                Ok(())
            }
        }
    }
}

/// The recognized computations. Discriminants are the full `comp` field.
///
/// Memory forms substitute the addressed data-store cell (`M`) for the
/// address register (`A`) and set the `a` bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[rustfmt::skip]
#[enum_tags(public, repr(RawComp))]
pub enum Comp {
    Zero      = 0b111_0_101010,
    One       = 0b111_0_111111,
    MinusOne  = 0b111_0_111010,
    D         = 0b111_0_001100,
    A         = 0b111_0_110000,
    NotD      = 0b111_0_001101,
    NotA      = 0b111_0_110001,
    NegD      = 0b111_0_001111,
    NegA      = 0b111_0_110011,
    DPlusOne  = 0b111_0_011111,
    APlusOne  = 0b111_0_110111,
    DMinusOne = 0b111_0_001110,
    AMinusOne = 0b111_0_110010,
    DPlusA    = 0b111_0_000010,
    DMinusA   = 0b111_0_010011,
    AMinusD   = 0b111_0_000111,
    DAndA     = 0b111_0_000000,
    DOrA      = 0b111_0_010101,
    M         = 0b111_1_110000,
    NotM      = 0b111_1_110001,
    NegM      = 0b111_1_110011,
    MPlusOne  = 0b111_1_110111,
    DPlusM    = 0b111_1_000010,
    DMinusM   = 0b111_1_010011,
    MMinusD   = 0b111_1_000111,
    DAndM     = 0b111_1_000000,
    DOrM      = 0b111_1_010101,
}

impl Comp {
    /// Looks up the computation for a raw `comp` field, if it has one.
    pub const fn from_raw(raw: RawComp) -> Option<Self> {
        Self::from_tag(raw)
    }

    /// Whether this computation reads the data-store cell addressed by the
    /// address register.
    pub const fn references_memory(self) -> bool {
        self.tag() & MEMORY_OPERAND_BIT != 0
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::MinusOne => "-1",
            Self::D => "D",
            Self::A => "A",
            Self::NotD => "!D",
            Self::NotA => "!A",
            Self::NegD => "-D",
            Self::NegA => "-A",
            Self::DPlusOne => "D+1",
            Self::APlusOne => "A+1",
            Self::DMinusOne => "D-1",
            Self::AMinusOne => "A-1",
            Self::DPlusA => "D+A",
            Self::DMinusA => "D-A",
            Self::AMinusD => "A-D",
            Self::DAndA => "D&A",
            Self::DOrA => "D|A",
            Self::M => "M",
            Self::NotM => "!M",
            Self::NegM => "-M",
            Self::MPlusOne => "M+1",
            Self::DPlusM => "D+M",
            Self::DMinusM => "D-M",
            Self::MMinusD => "M-D",
            Self::DAndM => "D&M",
            Self::DOrM => "D|M",
        }
    }
}

/// Where a computed result is written. Bit 2 selects the address register,
/// bit 1 the data register and bit 0 the addressed data-store cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[enum_tags(public, repr(u8))]
pub enum Dest {
    Null,
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl Dest {
    pub const fn writes_memory(self) -> bool {
        self.tag() & 0b001 != 0
    }

    pub const fn writes_data(self) -> bool {
        self.tag() & 0b010 != 0
    }

    pub const fn writes_address(self) -> bool {
        self.tag() & 0b100 != 0
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::M => "M",
            Self::D => "D",
            Self::MD => "MD",
            Self::A => "A",
            Self::AM => "AM",
            Self::AD => "AD",
            Self::AMD => "AMD",
        }
    }
}

impl CodeAsWord for Dest {
    fn encode_as_word(&self) -> Word {
        self.tag() as Word
    }

    fn decode_from_word(encoded: Word) -> Self {
        Self::VARIANTS[encoded as usize % Self::VARIANTS.len()]
    }
}

/// Condition under which a compute instruction jumps to the address held in
/// the address register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[enum_tags(public, repr(u8))]
pub enum Jump {
    Never,
    Gt,
    Eq,
    Ge,
    Lt,
    Ne,
    Le,
    Always,
}

impl Jump {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Never => "null",
            Self::Gt => "JGT",
            Self::Eq => "JEQ",
            Self::Ge => "JGE",
            Self::Lt => "JLT",
            Self::Ne => "JNE",
            Self::Le => "JLE",
            Self::Always => "JMP",
        }
    }
}

impl CodeAsWord for Jump {
    fn encode_as_word(&self) -> Word {
        self.tag() as Word
    }

    fn decode_from_word(encoded: Word) -> Self {
        Self::VARIANTS[encoded as usize % Self::VARIANTS.len()]
    }
}
