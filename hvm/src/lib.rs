// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

#![forbid(unsafe_code)]

pub mod alu;
pub mod arch;
pub mod coding;
pub mod loader;
pub mod memory;
pub mod op;
pub mod snapshot;
pub mod vm;
