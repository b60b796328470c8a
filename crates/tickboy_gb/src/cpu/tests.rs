use super::*;

struct TestBus {
    memory: [u8; 0x10000],
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
        }
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }
}

struct Harness {
    cpu: Cpu,
    bus: TestBus,
}

impl Harness {
    fn new(program: &[u8]) -> Self {
        let mut bus = TestBus::default();
        bus.memory[..program.len()].copy_from_slice(program);
        Self {
            cpu: Cpu::new(),
            bus,
        }
    }

    /// Runs the CPU on the cycle at which it next does something.
    fn step(&mut self) {
        let cycle = self.cpu.next_active_cycle();
        assert_ne!(cycle, NEVER, "stepping a halted CPU");
        self.cpu.cycle(cycle, &mut self.bus).unwrap();
    }

    fn steps(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    fn a(&self) -> u8 {
        self.cpu.reg(Reg::A)
    }

    fn f(&self) -> u8 {
        self.cpu.reg(Reg::F)
    }
}

const Z: u8 = 0x80;
const N: u8 = 0x40;
const H: u8 = 0x20;
const C: u8 = 0x10;

#[test]
fn new_cpu_starts_cleared_at_cycle_zero() {
    let cpu = Cpu::new();
    assert_eq!((cpu.pc(), cpu.sp()), (0, 0));
    assert_eq!(cpu.reg16(Reg16::AF), 0);
    assert_eq!(cpu.next_active_cycle(), 0);
    assert!(!cpu.ime());
}

#[test]
fn post_boot_state_matches_dmg() {
    let mut cpu = Cpu::new();
    cpu.set_post_boot_state();
    assert_eq!(cpu.reg16(Reg16::AF), 0x01B0);
    assert_eq!(cpu.reg16(Reg16::BC), 0x0013);
    assert_eq!(cpu.reg16(Reg16::DE), 0x00D8);
    assert_eq!(cpu.reg16(Reg16::HL), 0x014D);
    assert_eq!((cpu.pc(), cpu.sp()), (0x0100, 0xFFFE));
}

#[test]
fn call_pushes_the_return_address() {
    // LD SP,0xFFFF ; LD A,0x0B ; CALL 0x000A ; HALT
    let mut h = Harness::new(&[0x31, 0xFF, 0xFF, 0x3E, 0x0B, 0xCD, 0x0A, 0x00, 0x76]);
    let mut cycle = 0;
    while h.cpu.pc() != 0x000A {
        h.cpu.cycle(cycle, &mut h.bus).unwrap();
        cycle += 1;
        assert!(cycle < 100, "CALL never reached its target");
    }
    assert_eq!(cycle, 6);
    assert_eq!(h.cpu.next_active_cycle(), 11);
    assert_eq!(h.cpu.sp(), 0xFFFD);
    assert_eq!(h.a(), 0x0B);
    assert_eq!(h.bus.memory[0xFFFD], 0x08);
    assert_eq!(h.bus.memory[0xFFFE], 0x00);
}

#[test]
fn ret_returns_to_the_caller() {
    // 0x00: LD SP,0xD000 ; CALL 0x0010 ; LD B,0x42
    // 0x10: RET
    let mut program = vec![0x31, 0x00, 0xD0, 0xCD, 0x10, 0x00, 0x06, 0x42];
    program.resize(0x10, 0);
    program.push(0xC9);
    let mut h = Harness::new(&program);
    h.steps(4);
    assert_eq!(h.cpu.reg(Reg::B), 0x42);
    assert_eq!(h.cpu.sp(), 0xD000);
    assert_eq!(h.cpu.pc(), 0x0008);
}

#[test]
fn instruction_costs_schedule_the_next_cycle() {
    // NOP ; LD (HL),0x00 ; JP 0x0010
    let mut h = Harness::new(&[0x00, 0x36, 0x00, 0xC3, 0x10, 0x00]);
    h.cpu.set_reg16(Reg16::HL, 0xC000);
    h.step();
    assert_eq!(h.cpu.next_active_cycle(), 1);
    h.step();
    assert_eq!(h.cpu.next_active_cycle(), 4);
    h.step();
    assert_eq!(h.cpu.next_active_cycle(), 8);
    assert_eq!(h.cpu.pc(), 0x0010);
}

#[test]
fn cycles_between_instructions_do_nothing() {
    // INC A ; INC A ; INC A
    let mut h = Harness::new(&[0x3C, 0x3C, 0x3C]);
    h.cpu.cycle(0, &mut h.bus).unwrap();
    assert_eq!(h.a(), 1);
    h.cpu.cycle(1, &mut h.bus).unwrap();
    assert_eq!(h.a(), 2);
    h.cpu.cycle(5, &mut h.bus).unwrap();
    assert_eq!(h.a(), 2);
    assert_eq!(h.cpu.pc(), 0x0002);
}

#[test]
fn taken_branches_cost_extra_cycles() {
    // XOR A ; JR Z,+2 ; NOP ; NOP ; JR NZ,-2
    let mut h = Harness::new(&[0xAF, 0x28, 0x02, 0x00, 0x00, 0x20, 0xFE]);
    h.step();
    assert_eq!(h.f(), Z);
    h.step();
    assert_eq!(h.cpu.pc(), 0x0005);
    assert_eq!(h.cpu.next_active_cycle(), 1 + 3);
    h.step();
    assert_eq!(h.cpu.pc(), 0x0007);
    assert_eq!(h.cpu.next_active_cycle(), 4 + 2);
}

#[test]
fn conditional_call_and_return() {
    // LD SP,0xD000 ; SCF ; CALL NC,0x0020 ; CALL C,0x0020
    // 0x20: RET NC ; RET C
    let mut program = vec![0x31, 0x00, 0xD0, 0x37, 0xD4, 0x20, 0x00, 0xDC, 0x20, 0x00];
    program.resize(0x20, 0);
    program.extend_from_slice(&[0xD0, 0xD8]);
    let mut h = Harness::new(&program);
    h.steps(3);
    assert_eq!(h.cpu.pc(), 0x0007);
    assert_eq!(h.cpu.sp(), 0xD000);
    let before = h.cpu.next_active_cycle();
    h.step();
    assert_eq!(h.cpu.pc(), 0x0020);
    assert_eq!(h.cpu.next_active_cycle(), before + 6);
    h.steps(2);
    assert_eq!(h.cpu.pc(), 0x000A);
    assert_eq!(h.cpu.sp(), 0xD000);
}

#[test]
fn rst_jumps_to_its_page() {
    let mut h = Harness::new(&[0x31, 0x00, 0xD0, 0xEF]);
    h.steps(2);
    assert_eq!(h.cpu.pc(), 0x0028);
    assert_eq!(h.bus.read16(0xCFFE), 0x0004);
}

#[test]
fn enabled_interrupts_are_serviced_by_priority() {
    // LD SP,0xFFFE ; EI ; NOP
    let mut h = Harness::new(&[0x31, 0xFE, 0xFF, 0xFB, 0x00]);
    h.bus.memory[REG_IE as usize] = 0x1F;
    h.bus.memory[REG_IF as usize] = 0b0_0110;
    h.steps(2);
    assert!(h.cpu.ime());
    h.step();
    assert_eq!(h.cpu.pc(), Interrupt::LcdStat.vector());
    assert!(!h.cpu.ime());
    assert_eq!(h.bus.memory[REG_IF as usize], 0b0_0100);
    assert_eq!(h.bus.read16(0xFFFC), 0x0004);
    assert_eq!(h.cpu.next_active_cycle(), 4 + 5);
}

#[test]
fn every_pending_set_services_its_lowest_interrupt() {
    for pending in 1..=0x1Fu8 {
        let mut h = Harness::new(&[0x31, 0xFE, 0xFF, 0xFB, 0x00]);
        h.bus.memory[REG_IE as usize] = 0x1F;
        h.bus.memory[REG_IF as usize] = pending;
        h.steps(3);
        let first = pending.trailing_zeros() as usize;
        assert_eq!(h.cpu.pc(), Interrupt::ALL[first].vector(), "IF {pending:#07b}");
        assert_eq!(
            h.bus.memory[REG_IF as usize],
            pending & !(1 << first),
            "IF {pending:#07b}"
        );
    }
}

#[test]
fn masked_interrupts_are_ignored() {
    let mut h = Harness::new(&[0xFB, 0x00, 0x00]);
    h.bus.memory[REG_IE as usize] = 0x01;
    h.bus.memory[REG_IF as usize] = 0x04;
    h.steps(3);
    assert_eq!(h.cpu.pc(), 0x0003);
}

#[test]
fn reti_reenables_interrupts() {
    let mut program = vec![0x31, 0x00, 0xD0, 0xCD, 0x10, 0x00];
    program.resize(0x10, 0);
    program.push(0xD9);
    let mut h = Harness::new(&program);
    h.steps(3);
    assert!(h.cpu.ime());
    assert_eq!(h.cpu.pc(), 0x0006);
}

#[test]
fn halt_waits_for_a_pending_interrupt() {
    // HALT ; INC A
    let mut h = Harness::new(&[0x76, 0x3C]);
    h.bus.memory[REG_IE as usize] = 0x04;
    h.cpu.cycle(0, &mut h.bus).unwrap();
    assert!(h.cpu.is_halted());
    assert_eq!(h.cpu.pc(), 0x0001);

    for cycle in 1..6 {
        h.cpu.cycle(cycle, &mut h.bus).unwrap();
    }
    assert!(h.cpu.is_halted());
    assert_eq!(h.a(), 0);

    // IME is off, so the CPU resumes without servicing the interrupt.
    h.bus.memory[REG_IF as usize] = 0x04;
    h.cpu.cycle(6, &mut h.bus).unwrap();
    assert!(!h.cpu.is_halted());
    assert_eq!(h.a(), 1);
    assert_eq!(h.bus.memory[REG_IF as usize], 0x04);
    assert_eq!(h.cpu.next_active_cycle(), 7);
}

#[test]
fn halt_with_ime_services_on_wake() {
    // LD SP,0xD000 ; EI ; HALT
    let mut h = Harness::new(&[0x31, 0x00, 0xD0, 0xFB, 0x76]);
    h.bus.memory[REG_IE as usize] = 0x10;
    h.steps(3);
    assert!(h.cpu.is_halted());
    h.bus.memory[REG_IF as usize] = 0x10;
    h.cpu.cycle(42, &mut h.bus).unwrap();
    assert_eq!(h.cpu.pc(), Interrupt::Joypad.vector());
    assert_eq!(h.bus.read16(0xCFFE), 0x0005);
    assert_eq!(h.cpu.next_active_cycle(), 47);
}

#[test]
fn invalid_opcode_and_stop_are_errors() {
    let mut h = Harness::new(&[0xD3]);
    assert!(h.cpu.cycle(0, &mut h.bus).is_err());

    let mut h = Harness::new(&[0x10, 0x00]);
    assert!(h.cpu.cycle(0, &mut h.bus).is_err());
}

#[test]
fn add_and_adc_flags() {
    // LD A,0x3A ; ADD A,0xC6 ; ADC A,0x00
    let mut h = Harness::new(&[0x3E, 0x3A, 0xC6, 0xC6, 0xCE, 0x00]);
    h.steps(2);
    assert_eq!(h.a(), 0x00);
    assert_eq!(h.f(), Z | H | C);
    h.step();
    assert_eq!(h.a(), 0x01);
    assert_eq!(h.f(), 0);
}

#[test]
fn sub_sbc_and_cp() {
    // LD A,0x10 ; LD B,0x01 ; SUB B ; SBC A,0x0F ; CP 0x00
    let mut h = Harness::new(&[0x3E, 0x10, 0x06, 0x01, 0x90, 0xDE, 0x0F, 0xFE, 0x00]);
    h.steps(3);
    assert_eq!(h.a(), 0x0F);
    assert_eq!(h.f(), N | H);
    h.step();
    assert_eq!(h.a(), 0x00);
    assert_eq!(h.f(), Z | N);
    h.step();
    assert_eq!(h.a(), 0x00);
    assert_eq!(h.f(), Z | N);
}

#[test]
fn inc_and_dec_keep_the_carry() {
    // SCF ; LD B,0xFF ; INC B ; DEC B
    let mut h = Harness::new(&[0x37, 0x06, 0xFF, 0x04, 0x05]);
    h.steps(3);
    assert_eq!(h.cpu.reg(Reg::B), 0x00);
    assert_eq!(h.f(), Z | H | C);
    h.step();
    assert_eq!(h.cpu.reg(Reg::B), 0xFF);
    assert_eq!(h.f(), N | H | C);
}

#[test]
fn inc_dec_on_memory() {
    // LD HL,0xC000 ; INC (HL) ; DEC (HL) ; DEC (HL)
    let mut h = Harness::new(&[0x21, 0x00, 0xC0, 0x34, 0x35, 0x35]);
    h.bus.memory[0xC000] = 0x0F;
    h.steps(2);
    assert_eq!(h.bus.memory[0xC000], 0x10);
    assert_eq!(h.f(), H);
    h.steps(2);
    assert_eq!(h.bus.memory[0xC000], 0x0E);
    assert_eq!(h.f(), N);
}

#[test]
fn logic_operations() {
    // LD A,0xF0 ; AND 0x3C ; OR 0x01 ; XOR A
    let mut h = Harness::new(&[0x3E, 0xF0, 0xE6, 0x3C, 0xF6, 0x01, 0xAF]);
    h.steps(2);
    assert_eq!((h.a(), h.f()), (0x30, H));
    h.step();
    assert_eq!((h.a(), h.f()), (0x31, 0));
    h.step();
    assert_eq!((h.a(), h.f()), (0x00, Z));
}

#[test]
fn daa_after_bcd_addition() {
    // LD A,0x45 ; ADD A,0x38 ; DAA
    let mut h = Harness::new(&[0x3E, 0x45, 0xC6, 0x38, 0x27]);
    h.steps(3);
    assert_eq!(h.a(), 0x83);
    assert_eq!(h.f(), 0);
}

#[test]
fn cpl_scf_ccf() {
    // LD A,0x5A ; CPL ; SCF ; CCF
    let mut h = Harness::new(&[0x3E, 0x5A, 0x2F, 0x37, 0x3F]);
    h.steps(2);
    assert_eq!(h.a(), 0xA5);
    assert_eq!(h.f(), N | H);
    h.step();
    assert_eq!(h.f(), C);
    h.step();
    assert_eq!(h.f(), 0);
}

#[test]
fn accumulator_rotations_clear_z() {
    // XOR A ; RLCA ; LD A,0x80 ; RLA ; RRA
    let mut h = Harness::new(&[0xAF, 0x07, 0x3E, 0x80, 0x17, 0x1F]);
    h.steps(2);
    assert_eq!((h.a(), h.f()), (0x00, 0));
    h.steps(2);
    assert_eq!((h.a(), h.f()), (0x00, C));
    h.step();
    assert_eq!((h.a(), h.f()), (0x80, 0));
}

#[test]
fn sixteen_bit_arithmetic() {
    // LD HL,0x0FFF ; LD BC,0x0001 ; ADD HL,BC ; INC BC ; DEC SP
    let mut h = Harness::new(&[0x21, 0xFF, 0x0F, 0x01, 0x01, 0x00, 0x09, 0x03, 0x3B]);
    h.steps(3);
    assert_eq!(h.cpu.reg16(Reg16::HL), 0x1000);
    assert_eq!(h.f(), H);
    h.steps(2);
    assert_eq!(h.cpu.reg16(Reg16::BC), 0x0002);
    assert_eq!(h.cpu.sp(), 0xFFFF);
    assert_eq!(h.f(), H);
}

#[test]
fn stack_pointer_offsets() {
    // LD SP,0x00FF ; LD HL,SP+1 ; ADD SP,-1
    let mut h = Harness::new(&[0x31, 0xFF, 0x00, 0xF8, 0x01, 0xE8, 0xFF]);
    h.steps(2);
    assert_eq!(h.cpu.reg16(Reg16::HL), 0x0100);
    assert_eq!(h.f(), H | C);
    h.step();
    assert_eq!(h.cpu.sp(), 0x00FE);
    assert_eq!(h.f(), H | C);
    assert_eq!(h.cpu.next_active_cycle(), 3 + 3 + 4);
}

#[test]
fn pop_af_drops_the_low_flag_nibble() {
    // LD SP,0xC000 ; POP AF ; PUSH AF
    let mut h = Harness::new(&[0x31, 0x00, 0xC0, 0xF1, 0xF5]);
    h.bus.memory[0xC000] = 0xFF;
    h.bus.memory[0xC001] = 0x12;
    h.steps(2);
    assert_eq!(h.cpu.reg16(Reg16::AF), 0x12F0);
    h.step();
    assert_eq!(h.bus.read16(0xC000), 0x12F0);
}

#[test]
fn loads_through_memory() {
    // LD HL,0xC000 ; LD A,0x77 ; LD (HL+),A ; LD (HL-),A ; LD A,(HL-) ; LD (0xC010),SP
    let mut h = Harness::new(&[
        0x21, 0x00, 0xC0, 0x3E, 0x77, 0x22, 0x32, 0x3A, 0x08, 0x10, 0xC0,
    ]);
    h.steps(3);
    assert_eq!(h.bus.memory[0xC000], 0x77);
    assert_eq!(h.cpu.reg16(Reg16::HL), 0xC001);
    h.step();
    assert_eq!(h.bus.memory[0xC001], 0x77);
    assert_eq!(h.cpu.reg16(Reg16::HL), 0xC000);
    h.step();
    assert_eq!(h.a(), 0x77);
    assert_eq!(h.cpu.reg16(Reg16::HL), 0xBFFF);
    h.step();
    assert_eq!(h.bus.read16(0xC010), 0x0000);
}

#[test]
fn high_page_loads() {
    // LD A,0x99 ; LDH (0x80),A ; LD C,0x81 ; LD (C),A ; LDH A,(0x82)
    let mut h = Harness::new(&[0x3E, 0x99, 0xE0, 0x80, 0x0E, 0x81, 0xE2, 0xF0, 0x82]);
    h.bus.memory[0xFF82] = 0x5C;
    h.steps(5);
    assert_eq!(h.bus.memory[0xFF80], 0x99);
    assert_eq!(h.bus.memory[0xFF81], 0x99);
    assert_eq!(h.a(), 0x5C);
}

#[test]
fn register_to_register_loads() {
    // LD B,0x12 ; LD D,B ; LD L,D ; LD A,L
    let mut h = Harness::new(&[0x06, 0x12, 0x50, 0x6A, 0x7D]);
    h.steps(4);
    assert_eq!(h.cpu.reg(Reg::D), 0x12);
    assert_eq!(h.cpu.reg(Reg::L), 0x12);
    assert_eq!(h.a(), 0x12);
}

#[test]
fn prefixed_shifts_and_swaps() {
    // LD A,0x81 ; RLC A ; SRA A ; SRL A ; SWAP A
    let mut h = Harness::new(&[0x3E, 0x81, 0xCB, 0x07, 0xCB, 0x2F, 0xCB, 0x3F, 0xCB, 0x37]);
    h.steps(2);
    assert_eq!((h.a(), h.f()), (0x03, C));
    h.step();
    assert_eq!((h.a(), h.f()), (0x01, C));
    h.step();
    assert_eq!((h.a(), h.f()), (0x00, Z | C));
    h.step();
    assert_eq!((h.a(), h.f()), (0x00, Z));
    assert_eq!(h.cpu.pc(), 0x000A);
}

#[test]
fn prefixed_bit_operations() {
    // LD HL,0xC000 ; SET 7,(HL) ; BIT 7,(HL) ; RES 7,(HL) ; BIT 7,(HL)
    let mut h = Harness::new(&[0x21, 0x00, 0xC0, 0xCB, 0xFE, 0xCB, 0x7E, 0xCB, 0xBE, 0xCB, 0x7E]);
    h.steps(2);
    assert_eq!(h.bus.memory[0xC000], 0x80);
    h.step();
    assert_eq!(h.f(), H);
    h.steps(2);
    assert_eq!(h.bus.memory[0xC000], 0x00);
    assert_eq!(h.f(), Z | H);
    assert_eq!(h.cpu.next_active_cycle(), 3 + 4 + 3 + 4 + 3);
}
