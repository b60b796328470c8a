//! Instruction decoding tables.
//!
//! Each row of [`ROWS`] describes one instruction family together with the
//! encoding fields that vary inside it. The two 256-entry lookup tables
//! (direct and `0xCB`-prefixed) are expanded from these rows once, on first
//! use.

use lazy_static::lazy_static;

/// Instruction groups sharing one execution path; register, condition and
/// bit operands are decoded from the encoding itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Nop,
    LdR8Hlr,
    LdAHlru,
    LdAN8r,
    LdACr,
    LdAN16r,
    LdABcr,
    LdADer,
    LdR8N8,
    LdR16SpN16,
    PopR16,
    LdHlrR8,
    LdHlruA,
    LdN8rA,
    LdCrA,
    LdN16rA,
    LdBcrA,
    LdDerA,
    LdHlrN8,
    LdN16rSp,
    LdR8R8,
    LdSpHl,
    PushR16,
    AddAR8,
    AddAN8,
    AddAHlr,
    IncR8,
    IncHlr,
    IncR16Sp,
    AddHlR16Sp,
    LdHlSpS8,
    SubAR8,
    SubAN8,
    SubAHlr,
    DecR8,
    DecHlr,
    CpAR8,
    CpAN8,
    CpAHlr,
    DecR16Sp,
    AndAN8,
    AndAR8,
    AndAHlr,
    OrAR8,
    OrAN8,
    OrAHlr,
    XorAR8,
    XorAN8,
    XorAHlr,
    Cpl,
    RotCa,
    RotA,
    RotCR8,
    RotR8,
    RotCHlr,
    RotHlr,
    SwapR8,
    SwapHlr,
    SlaR8,
    SraR8,
    SrlR8,
    SlaHlr,
    SraHlr,
    SrlHlr,
    BitU3R8,
    BitU3Hlr,
    ChgU3R8,
    ChgU3Hlr,
    Daa,
    Sccf,
    JpHl,
    JpN16,
    JpCcN16,
    JrE8,
    JrCcE8,
    CallN16,
    CallCcN16,
    RstU3,
    Ret,
    RetCc,
    Edi,
    Reti,
    Halt,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Direct,
    Prefixed,
}

/// A decoded instruction slot.
///
/// `total_bytes` includes the opcode (and the `0xCB` prefix for prefixed
/// instructions); costs are in machine cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub kind: Kind,
    pub family: Family,
    pub encoding: u8,
    pub total_bytes: u8,
    pub cycles: u8,
    pub additional_cycles: u8,
}

/// A variable field of an encoding: its bit position and allowed values.
struct Field {
    shift: u8,
    values: &'static [u8],
}

const R8: &[u8] = &[0, 1, 2, 3, 4, 5, 7];
const R16: &[u8] = &[0, 1, 2, 3];
const CC: &[u8] = &[0, 1, 2, 3];
const U3: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
const ONE_BIT: &[u8] = &[0, 1];

const REG_LO: Field = Field { shift: 0, values: R8 };
const REG_HI: Field = Field { shift: 3, values: R8 };
const PAIR: Field = Field { shift: 4, values: R16 };
const COND: Field = Field { shift: 3, values: CC };
const BIT_INDEX: Field = Field { shift: 3, values: U3 };
const SELECT3: Field = Field { shift: 3, values: ONE_BIT };
const SELECT4: Field = Field { shift: 4, values: ONE_BIT };
const SELECT6: Field = Field { shift: 6, values: ONE_BIT };

struct Row {
    kind: Kind,
    family: Family,
    base: u8,
    fields: &'static [Field],
    total_bytes: u8,
    cycles: u8,
    additional_cycles: u8,
}

const fn d(family: Family, base: u8, fields: &'static [Field], bytes: u8, cycles: u8) -> Row {
    Row {
        kind: Kind::Direct,
        family,
        base,
        fields,
        total_bytes: bytes,
        cycles,
        additional_cycles: 0,
    }
}

const fn dc(
    family: Family,
    base: u8,
    fields: &'static [Field],
    bytes: u8,
    cycles: u8,
    additional: u8,
) -> Row {
    Row {
        additional_cycles: additional,
        ..d(family, base, fields, bytes, cycles)
    }
}

const fn p(family: Family, base: u8, fields: &'static [Field], cycles: u8) -> Row {
    Row {
        kind: Kind::Prefixed,
        ..d(family, base, fields, 2, cycles)
    }
}

use Family::*;

#[rustfmt::skip]
const ROWS: &[Row] = &[
    d(Nop, 0x00, &[], 1, 1),
    d(LdR8Hlr, 0x46, &[REG_HI], 1, 2),
    d(LdAHlru, 0x2A, &[SELECT4], 1, 2),
    d(LdAN8r, 0xF0, &[], 2, 3),
    d(LdACr, 0xF2, &[], 1, 2),
    d(LdAN16r, 0xFA, &[], 3, 4),
    d(LdABcr, 0x0A, &[], 1, 2),
    d(LdADer, 0x1A, &[], 1, 2),
    d(LdR8N8, 0x06, &[REG_HI], 2, 2),
    d(LdR16SpN16, 0x01, &[PAIR], 3, 3),
    d(PopR16, 0xC1, &[PAIR], 1, 3),
    d(LdHlrR8, 0x70, &[REG_LO], 1, 2),
    d(LdHlruA, 0x22, &[SELECT4], 1, 2),
    d(LdN8rA, 0xE0, &[], 2, 3),
    d(LdCrA, 0xE2, &[], 1, 2),
    d(LdN16rA, 0xEA, &[], 3, 4),
    d(LdBcrA, 0x02, &[], 1, 2),
    d(LdDerA, 0x12, &[], 1, 2),
    d(LdHlrN8, 0x36, &[], 2, 3),
    d(LdN16rSp, 0x08, &[], 3, 5),
    d(LdR8R8, 0x40, &[REG_HI, REG_LO], 1, 1),
    d(LdSpHl, 0xF9, &[], 1, 2),
    d(PushR16, 0xC5, &[PAIR], 1, 4),
    d(AddAR8, 0x80, &[SELECT3, REG_LO], 1, 1),
    d(AddAN8, 0xC6, &[SELECT3], 2, 2),
    d(AddAHlr, 0x86, &[SELECT3], 1, 2),
    d(IncR8, 0x04, &[REG_HI], 1, 1),
    d(IncHlr, 0x34, &[], 1, 3),
    d(IncR16Sp, 0x03, &[PAIR], 1, 2),
    d(AddHlR16Sp, 0x09, &[PAIR], 1, 2),
    d(LdHlSpS8, 0xE8, &[], 2, 4),
    d(LdHlSpS8, 0xF8, &[], 2, 3),
    d(SubAR8, 0x90, &[SELECT3, REG_LO], 1, 1),
    d(SubAN8, 0xD6, &[SELECT3], 2, 2),
    d(SubAHlr, 0x96, &[SELECT3], 1, 2),
    d(DecR8, 0x05, &[REG_HI], 1, 1),
    d(DecHlr, 0x35, &[], 1, 3),
    d(CpAR8, 0xB8, &[REG_LO], 1, 1),
    d(CpAN8, 0xFE, &[], 2, 2),
    d(CpAHlr, 0xBE, &[], 1, 2),
    d(DecR16Sp, 0x0B, &[PAIR], 1, 2),
    d(AndAN8, 0xE6, &[], 2, 2),
    d(AndAR8, 0xA0, &[REG_LO], 1, 1),
    d(AndAHlr, 0xA6, &[], 1, 2),
    d(OrAR8, 0xB0, &[REG_LO], 1, 1),
    d(OrAN8, 0xF6, &[], 2, 2),
    d(OrAHlr, 0xB6, &[], 1, 2),
    d(XorAR8, 0xA8, &[REG_LO], 1, 1),
    d(XorAN8, 0xEE, &[], 2, 2),
    d(XorAHlr, 0xAE, &[], 1, 2),
    d(Cpl, 0x2F, &[], 1, 1),
    d(RotCa, 0x07, &[SELECT3], 1, 1),
    d(RotA, 0x17, &[SELECT3], 1, 1),
    d(Daa, 0x27, &[], 1, 1),
    d(Sccf, 0x37, &[SELECT3], 1, 1),
    d(JpHl, 0xE9, &[], 1, 1),
    d(JpN16, 0xC3, &[], 3, 4),
    dc(JpCcN16, 0xC2, &[COND], 3, 3, 1),
    d(JrE8, 0x18, &[], 2, 3),
    dc(JrCcE8, 0x20, &[COND], 2, 2, 1),
    d(CallN16, 0xCD, &[], 3, 6),
    dc(CallCcN16, 0xC4, &[COND], 3, 3, 3),
    d(RstU3, 0xC7, &[BIT_INDEX], 1, 4),
    d(Ret, 0xC9, &[], 1, 4),
    dc(RetCc, 0xC0, &[COND], 1, 2, 3),
    d(Edi, 0xF3, &[SELECT3], 1, 1),
    d(Reti, 0xD9, &[], 1, 4),
    d(Halt, 0x76, &[], 1, 1),
    d(Stop, 0x10, &[], 1, 1),

    p(RotCR8, 0x00, &[SELECT3, REG_LO], 2),
    p(RotR8, 0x10, &[SELECT3, REG_LO], 2),
    p(RotCHlr, 0x06, &[SELECT3], 4),
    p(RotHlr, 0x16, &[SELECT3], 4),
    p(SlaR8, 0x20, &[REG_LO], 2),
    p(SraR8, 0x28, &[REG_LO], 2),
    p(SwapR8, 0x30, &[REG_LO], 2),
    p(SrlR8, 0x38, &[REG_LO], 2),
    p(SlaHlr, 0x26, &[], 4),
    p(SraHlr, 0x2E, &[], 4),
    p(SwapHlr, 0x36, &[], 4),
    p(SrlHlr, 0x3E, &[], 4),
    p(BitU3R8, 0x40, &[BIT_INDEX, REG_LO], 2),
    p(BitU3Hlr, 0x46, &[BIT_INDEX], 3),
    p(ChgU3R8, 0x80, &[SELECT6, BIT_INDEX, REG_LO], 2),
    p(ChgU3Hlr, 0x86, &[SELECT6, BIT_INDEX], 4),
];

pub type OpcodeTable = [Option<Opcode>; 256];

lazy_static! {
    pub static ref DIRECT: OpcodeTable = build_table(Kind::Direct);
    pub static ref PREFIXED: OpcodeTable = build_table(Kind::Prefixed);
}

/// Lookup in the table matching `kind`.
#[inline]
pub fn decode(kind: Kind, encoding: u8) -> Option<Opcode> {
    match kind {
        Kind::Direct => DIRECT[encoding as usize],
        Kind::Prefixed => PREFIXED[encoding as usize],
    }
}

fn build_table(kind: Kind) -> OpcodeTable {
    let mut table: OpcodeTable = [None; 256];
    for row in ROWS.iter().filter(|r| r.kind == kind) {
        for encoding in expand(row.base, row.fields) {
            let previous = table[encoding as usize].replace(Opcode {
                kind,
                family: row.family,
                encoding,
                total_bytes: row.total_bytes,
                cycles: row.cycles,
                additional_cycles: row.additional_cycles,
            });
            debug_assert!(
                previous.is_none(),
                "encoding {encoding:#04X} ({kind:?}) assigned twice"
            );
        }
    }
    table
}

/// Every encoding produced by filling `fields` into `base`.
fn expand(base: u8, fields: &[Field]) -> Vec<u8> {
    fields.iter().fold(vec![base], |encodings, field| {
        encodings
            .iter()
            .flat_map(|&e| field.values.iter().map(move |&v| e | (v << field.shift)))
            .collect()
    })
}
