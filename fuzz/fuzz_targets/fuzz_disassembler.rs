//! Fuzz target for the decoder and disassembler.
//!
//! This target feeds arbitrary byte sequences to the disassembler to find
//! edge cases and crashes in instruction decoding.

#![no_main]

use arbitrary::Arbitrary;
use bytevm::{disassemble, format_listing, DisassembledItem, DisassemblyOptions};
use libfuzzer_sys::fuzz_target;

/// Disassembly options for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzOptions {
    start_address: u16,
    hex_dump: bool,
}

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    bytes: Vec<u8>,
    options: FuzzOptions,
}

fuzz_target!(|input: FuzzInput| {
    // Limit input size to prevent OOM
    if input.bytes.len() > 65536 {
        return;
    }

    let options = DisassemblyOptions {
        start_address: input.options.start_address,
        hex_dump: input.options.hex_dump,
    };

    let items = disassemble(&input.bytes, options);

    // Verify invariants
    let mut offset: usize = 0;
    let mut expected_address = input.options.start_address;

    for item in &items {
        // Each item should have correct address
        assert_eq!(item.address(), expected_address);

        // Size should be 1-6 bytes
        assert!((1..=6).contains(&item.size_bytes()));

        // Re-encoding reproduces the input bytes
        let end = offset + item.size_bytes();
        assert_eq!(item.bytes(), &input.bytes[offset..end]);

        if let DisassembledItem::Instruction(instr) = item {
            assert_eq!(instr.size_bytes, instr.opcode.metadata().size_bytes());
        }

        offset = end;
        expected_address = expected_address.wrapping_add(item.size_bytes() as u16);
    }

    // Total size should equal input size
    assert_eq!(offset, input.bytes.len());

    let _ = format_listing(&items, options);
});
