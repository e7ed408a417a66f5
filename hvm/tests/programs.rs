// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::{fs, path::PathBuf};

use hvm::{
    arch::{Word, SENTINEL},
    loader::{encode_image, load_image, read_image, LoadError},
    op::{Comp, Dest, Instruction, Jump},
    vm::{RunOutcome, Status, VMError, VM},
};

/// A program image written to a scratch file, removed on drop.
struct ImageFile(PathBuf);

impl ImageFile {
    fn new(name: &str, bytes: &[u8]) -> Self {
        let path = std::env::temp_dir()
            .join(format!("hvm-{}-{}.hack", std::process::id(), name));
        fs::write(&path, bytes).expect("failed to write image");
        Self(path)
    }
}

impl Drop for ImageFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn words(program: &[Instruction]) -> Vec<Word> {
    program.iter().map(Instruction::encode).collect()
}

#[test]
fn runs_image_from_disk() {
    let program = words(&[
        Instruction::LoadImmediate(5),
        Instruction::compute(Comp::A, Dest::D, Jump::Never),
        Instruction::LoadImmediate(10),
        Instruction::compute(Comp::DPlusA, Dest::M, Jump::Never),
    ]);
    let image = ImageFile::new("runs_image_from_disk", &encode_image(&program));

    let store = load_image(&image.0).expect("image loads");
    assert_eq!(program.as_slice(), store.program());
    assert_eq!(Some(SENTINEL), store.fetch(program.len()));

    let mut vm = VM::new(store);
    vm.run().expect("program halts");
    assert_eq!(15, vm.data().read(10).expect("cell 10 exists"));
    assert_eq!(5, vm.program_counter());
    assert!(vm.is_running());
}

#[test]
fn header_bytes_are_not_instructions() {
    let mut bytes = vec![0xff; 8];
    bytes.extend([0x00, 0x07]);
    let image = ImageFile::new("header_bytes_are_not_instructions", &bytes);

    assert_eq!(vec![7], read_image(&image.0).expect("image loads"));
}

#[test]
fn missing_image() {
    let path = std::env::temp_dir().join("hvm-this-file-does-not-exist.hack");
    assert!(matches!(read_image(&path), Err(LoadError::NotFound(p)) if p == path));
}

#[test]
fn directory_is_not_an_image() {
    let dir = std::env::temp_dir();
    assert!(matches!(load_image(&dir), Err(LoadError::NotAFile(_))));
}

#[test]
fn oversized_image() {
    let program = vec![0; 32768];
    let image = ImageFile::new("oversized_image", &encode_image(&program));

    assert!(matches!(
        load_image(&image.0),
        Err(LoadError::ProgramTooLarge {
            words: 32768,
            capacity: 32767
        })
    ));
}

#[test]
fn single_instruction_then_sentinel() {
    let mut vm = VM::from_program(&words(&[Instruction::compute(
        Comp::One,
        Dest::D,
        Jump::Never,
    )]))
    .expect("program fits");
    vm.run().expect("program halts");

    assert_eq!(1, vm.data_register());
    assert_eq!(0, vm.address_register());
    assert_eq!(2, vm.program_counter());
    assert_eq!(Status::Halted, vm.status());
    assert!(vm.is_running());
}

#[test]
fn jump_always_loops_forever() {
    let mut vm = VM::from_program(&words(&[
        Instruction::LoadImmediate(0),
        Instruction::compute(Comp::Zero, Dest::Null, Jump::Always),
    ]))
    .expect("program fits");

    assert_eq!(
        RunOutcome::CycleLimitReached,
        vm.run_for(10_001).expect("loops")
    );
    assert_eq!(1, vm.program_counter());
    assert_eq!(Status::Running, vm.status());
}

#[test]
fn fault_is_distinct_from_halt() {
    let mut vm = VM::from_program(&[0b111_1_110010_000_000]).expect("program fits");

    let error = vm.run().expect_err("M-1 is not recognized");
    assert!(matches!(error, VMError::InvalidOpcode { .. }));
    assert_eq!(Status::Faulted, vm.status());
    assert!(!vm.is_running());
    assert!(error.to_string().contains("0x3f2"));
}

#[test]
fn maximum_finds_larger_value() {
    // D = max(RAM[0], RAM[1]) stored in RAM[2]
    let setup = [
        Instruction::LoadImmediate(1234),
        Instruction::compute(Comp::A, Dest::D, Jump::Never),
        Instruction::LoadImmediate(0),
        Instruction::compute(Comp::D, Dest::M, Jump::Never),
        Instruction::LoadImmediate(4321),
        Instruction::compute(Comp::A, Dest::D, Jump::Never),
        Instruction::LoadImmediate(1),
        Instruction::compute(Comp::D, Dest::M, Jump::Never),
    ];
    let body = [
        // 8
        Instruction::LoadImmediate(0),
        Instruction::compute(Comp::M, Dest::D, Jump::Never),
        Instruction::LoadImmediate(1),
        Instruction::compute(Comp::DMinusM, Dest::D, Jump::Never),
        Instruction::LoadImmediate(18),
        Instruction::compute(Comp::D, Dest::Null, Jump::Gt),
        // RAM[1] is larger
        Instruction::LoadImmediate(1),
        Instruction::compute(Comp::M, Dest::D, Jump::Never),
        Instruction::LoadImmediate(20),
        Instruction::compute(Comp::Zero, Dest::Null, Jump::Always),
        // 18: RAM[0] is larger
        Instruction::LoadImmediate(0),
        Instruction::compute(Comp::M, Dest::D, Jump::Never),
        // 20
        Instruction::LoadImmediate(2),
        Instruction::compute(Comp::D, Dest::M, Jump::Never),
    ];
    let program: Vec<Instruction> = setup.into_iter().chain(body).collect();
    let mut vm = VM::from_program(&words(&program)).expect("program fits");
    vm.run().expect("program halts");

    assert_eq!(4321, vm.data().read(2).expect("cell 2 exists"));
    assert_eq!(4321, vm.snapshot().data[2]);
}
