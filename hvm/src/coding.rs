// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::arch::Word;

/// Packs bit fields into a value of the given type, least significant field
/// first.
#[macro_export]
macro_rules! encode {
    (
        $T:ty;
        $([..$($width:literal)?$($width2:ident)?..] = $int:expr),*
        $(,[..*] = $final:expr)?
    ) => {
        {
            let mut offset = 0;
            let mut result: $T = 0;
            $(
                let encoded_int: $T = $crate::coding::CodeAsWord::encode_as_word(&$int);
                let mask: $T = (((1 as $T) << $($width)* $($width2)*) - 1) as $T;
                result |= ((encoded_int & mask) << offset);
                offset += $($width)* $($width2)*;
            )*
            $(
                let encoded_final: $T = $crate::coding::CodeAsWord::encode_as_word(&$final);
                result |= (encoded_final << offset);
            )*
            let _ = offset;
            result
        }
    };
}

/// Types that occupy a bit field of an instruction [`Word`].
pub trait CodeAsWord {
    /// Encodes `self` into the low bits of a [`Word`]. Bits beyond the
    /// field width are chopped off by [`encode!`].
    fn encode_as_word(&self) -> Word;

    /// Decodes `Self` from the low bits of `encoded`; every bit above the
    /// field width is already zero.
    fn decode_from_word(encoded: Word) -> Self;
}

impl CodeAsWord for Word {
    fn encode_as_word(&self) -> Word {
        *self
    }

    fn decode_from_word(encoded: Word) -> Self {
        encoded
    }
}

/// Splits a value into bit fields of the given types, least significant
/// field first, and evaluates `$block` with them bound.
#[macro_export]
macro_rules! decode {
    (
        $encoded:expr; $TEnc:ty;
        @($($out:ident: $T:ty =
            [..$($width:literal)?$($width2:ident)?..]),*)
        => $block:expr
    ) => {{
        let encoded: $TEnc = $encoded;
        let mut __offset: u32 = 0;
        $(
            let field_width = $($width)*$($width2)* as u32;
            let mask = (1 as $TEnc).checked_shl(field_width).unwrap_or(0).wrapping_sub(1);
            let unsigned_out = (encoded >> __offset) & mask;
            let $out = <$T as $crate::coding::CodeAsWord>::decode_from_word(unsigned_out);
            __offset += field_width;
        )*
        let _ = __offset;
        $block
    }};
}
