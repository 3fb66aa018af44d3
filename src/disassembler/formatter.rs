//! Formatting functions for disassembled instructions

use crate::decoder::Instruction;
use crate::disassembler::{DisassembledItem, DisassemblyOptions};
use crate::operands::Operand;

/// Widest encoding in the instruction set, used to align hex dumps.
const MAX_INSTRUCTION_BYTES: usize = 6;

/// Format a single instruction as assembly text
///
/// Operands are rendered as `R3` (registers), `$01F0` (addresses), `4` (sizes
/// in bytes), `EQ` (predicates), `+6` / `-4` (offsets from the next
/// instruction) and `#-5` (immediates), separated by `", "`.
pub fn format_instruction(instr: &Instruction) -> String {
    let mnemonic = instr.opcode.mnemonic();
    if instr.operands.is_empty() {
        return mnemonic.to_string();
    }

    let operands: Vec<String> = instr.operands.iter().map(format_operand).collect();
    format!("{} {}", mnemonic, operands.join(", "))
}

/// Format one operand
fn format_operand(operand: &Operand) -> String {
    match operand {
        Operand::Register(r) => format!("R{}", r),
        Operand::Address(a) => format!("${:04X}", a),
        Operand::Size(w) => w.bytes().to_string(),
        Operand::Offset(o) => format!("{:+}", o),
        Operand::Comparison(p) => p.mnemonic().to_string(),
        Operand::Immediate(v) => format!("#{}", v),
    }
}

/// Format an instruction or `.byte` directive
pub fn format_item(item: &DisassembledItem) -> String {
    match item {
        DisassembledItem::Instruction(instr) => format_instruction(instr),
        DisassembledItem::Byte { value, .. } => format!(".byte ${:02X}", value),
    }
}

/// Format one listing line without its trailing newline
fn format_line(item: &DisassembledItem, hex_dump: bool) -> String {
    if !hex_dump {
        return format!("${:04X}  {}", item.address(), format_item(item));
    }

    let hex: Vec<String> = item.bytes().iter().map(|b| format!("{:02X}", b)).collect();
    format!(
        "${:04X}  {:<width$}  {}",
        item.address(),
        hex.join(" "),
        format_item(item),
        width = MAX_INSTRUCTION_BYTES * 3 - 1
    )
}

/// Format a full listing, one item per line, each prefixed with its address
///
/// With `options.hex_dump` the raw bytes are shown between the address and
/// the instruction text.
pub fn format_listing(items: &[DisassembledItem], options: DisassemblyOptions) -> String {
    let mut out = String::new();

    for item in items {
        out.push_str(&format_line(item, options.hex_dump));
        out.push('\n');
    }

    out
}
