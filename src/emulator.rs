use log::{debug, info};
use rand::Rng;

use crate::decode::OpCodes;
use crate::display::FrameBuffer;
use crate::error::Fault;
use crate::keyboard::Keyboard;
use crate::memory::{Addr, Memory, GLYPH_LEN, RAM_SIZE, STACK_LIMIT};
use crate::registers::Registers;
use crate::timer::Timers;

/// What [`Emulator::step`] does with an instruction word that matches no
/// operation. One switch for the whole machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodePolicy {
    /// Report the word as [`Fault::UnknownOpcode`].
    Fault,
    /// Treat it as a no-op. Maximizes compatibility with sloppy programs.
    Ignore,
}

/// The whole machine: register file, memory (with PC, I and the call
/// stack), frame buffer, keypad state and timers, plus the engine that
/// mutates them one instruction at a time.
///
/// `step` executes exactly one instruction and returns; the host owns the
/// loop and drives `tick_timers` at its own fixed rate.
pub struct Emulator {
    pub regs: Registers,
    pub mem: Memory,
    pub fb: FrameBuffer,
    pub keys: Keyboard,
    pub timers: Timers,
    policy: OpcodePolicy,
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_policy(OpcodePolicy::Fault)
    }

    pub fn with_policy(policy: OpcodePolicy) -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            fb: FrameBuffer::new(),
            keys: Keyboard::new(),
            timers: Timers::new(),
            policy,
        }
    }

    /// Clear registers, memory, timers, keys, stack and display; font back
    /// at 0x000, I = 0, PC = 0x200.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.reset();
        self.fb.clear();
        self.keys.reset();
        self.timers.reset();
    }

    /// Reset, then place the image at 0x200. An oversized image leaves the
    /// machine in its clean reset state.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), Fault> {
        self.reset();
        self.mem.load_program(image)?;
        info!("loaded {} byte program at 0x200", image.len());
        Ok(())
    }

    /// Fetch, decode and execute exactly one instruction.
    pub fn step(&mut self) -> Result<(), Fault> {
        let at = self.mem.pc.0;
        let word = self
            .mem
            .fetch()
            .map_err(|oob| Fault::MemoryOutOfBounds {
                address: oob.0,
                at,
            })?;
        self.execute_ins(OpCodes::decode(word), at)
    }

    /// Advance the delay and sound timers by one tick. Driven by the host
    /// at a fixed rate, independent of the instruction rate.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    pub fn press_key(&mut self, key: u8) {
        self.keys.press(key);
    }

    pub fn release_key(&mut self, key: u8) {
        self.keys.release(key);
    }

    /// Read-only view of the 64x32 pixel grid.
    pub fn display(&self) -> &FrameBuffer {
        &self.fb
    }

    /// True while the sound timer is counting down; the host may beep.
    pub fn sound_active(&self) -> bool {
        self.timers.sound() > 0
    }

    fn read(&self, address: Addr, at: Addr) -> Result<u8, Fault> {
        self.mem
            .get(address)
            .map_err(|oob| Fault::MemoryOutOfBounds {
                address: oob.0,
                at,
            })
    }

    fn write(&mut self, address: Addr, value: u8, at: Addr) -> Result<(), Fault> {
        self.mem
            .set(address, value)
            .map_err(|oob| Fault::MemoryOutOfBounds {
                address: oob.0,
                at,
            })
    }

    /// Apply one decoded instruction. `at` is the address the word was
    /// fetched from, used for fault reports; PC already points past it.
    fn execute_ins(&mut self, ins: OpCodes, at: Addr) -> Result<(), Fault> {
        match ins {
            OpCodes::ClearScreen => {
                self.fb.clear();
            }
            OpCodes::Return => {
                let addr = self.mem.stack.pop().ok_or(Fault::StackUnderflow { at })?;
                self.mem.pc.jump(addr);
            }
            OpCodes::Jump(addr) => {
                self.mem.pc.jump(addr);
            }
            OpCodes::Call(addr) => {
                if !self.mem.stack.push(self.mem.pc.0) {
                    return Err(Fault::StackOverflow {
                        max: STACK_LIMIT,
                        at,
                    });
                }
                self.mem.pc.jump(addr);
            }
            OpCodes::SkipEqImm(vx, nn) => {
                if self.regs.get(vx) == nn {
                    self.mem.pc.skip();
                }
            }
            OpCodes::SkipNeImm(vx, nn) => {
                if self.regs.get(vx) != nn {
                    self.mem.pc.skip();
                }
            }
            OpCodes::SkipEqReg(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.mem.pc.skip();
                }
            }
            OpCodes::SetImm(vx, nn) => {
                self.regs.set(vx, nn);
            }
            OpCodes::AddImm(vx, nn) => {
                self.regs.add(vx, nn);
            }
            OpCodes::Copy(vx, vy) => {
                self.regs.set(vx, self.regs.get(vy));
            }
            OpCodes::Or(vx, vy) => {
                self.regs.set(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            OpCodes::And(vx, vy) => {
                self.regs.set(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            OpCodes::Xor(vx, vy) => {
                self.regs.set(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }
            OpCodes::Add(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let (sum, carried) = x.overflowing_add(y);
                self.regs.set(vx, sum);
                self.regs.set_flag(carried);
            }
            OpCodes::Sub(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set(vx, x.wrapping_sub(y));
                self.regs.set_flag(x >= y); // no borrow
            }
            OpCodes::ShiftRight(vx, _) => {
                let x = self.regs.get(vx);
                self.regs.set(vx, x >> 1);
                self.regs.set_flag(x & 0x1 == 1);
            }
            OpCodes::SubFrom(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set(vx, y.wrapping_sub(x));
                self.regs.set_flag(y >= x); // no borrow
            }
            OpCodes::ShiftLeft(vx, _) => {
                let x = self.regs.get(vx);
                self.regs.set(vx, x << 1);
                self.regs.set_flag(x & 0x80 != 0);
            }
            OpCodes::SkipNeReg(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.mem.pc.skip();
                }
            }
            OpCodes::SetIndex(addr) => {
                self.mem.index.set(addr);
            }
            OpCodes::JumpOffset(addr) => {
                self.mem.pc.jump(addr + self.regs.get(0x0) as Addr);
            }
            OpCodes::Random(vx, nn) => {
                let byte: u8 = rand::thread_rng().gen();
                self.regs.set(vx, byte & nn);
            }
            OpCodes::Draw(vx, vy, n) => {
                let base = self.mem.index.0;
                let mut sprite = Vec::with_capacity(n as usize);
                for row in 0..n as Addr {
                    sprite.push(self.read(base + row, at)?);
                }
                let collided =
                    self.fb
                        .draw_sprite(self.regs.get(vx), self.regs.get(vy), &sprite);
                self.regs.set_flag(collided);
            }
            OpCodes::SkipKeyPressed(vx) => {
                if self.keys.is_pressed(self.regs.get(vx)) {
                    self.mem.pc.skip();
                }
            }
            OpCodes::SkipKeyReleased(vx) => {
                if !self.keys.is_pressed(self.regs.get(vx)) {
                    self.mem.pc.skip();
                }
            }
            OpCodes::GetDelay(vx) => {
                self.regs.set(vx, self.timers.delay());
            }
            OpCodes::WaitKey(vx) => match self.keys.first_pressed() {
                Some(code) => self.regs.set(vx, code),
                // spin: re-issue this instruction on the next step
                None => self.mem.pc.rewind(),
            },
            OpCodes::SetDelay(vx) => {
                self.timers.set_delay(self.regs.get(vx));
            }
            OpCodes::SetSound(vx) => {
                self.timers.set_sound(self.regs.get(vx));
            }
            OpCodes::AddIndex(vx) => {
                let next = self.mem.index.0 + self.regs.get(vx) as Addr;
                if next as usize >= RAM_SIZE {
                    return Err(Fault::MemoryOutOfBounds { address: next, at });
                }
                self.mem.index.set(next);
            }
            OpCodes::FontChar(vx) => {
                self.mem.index.set(self.regs.get(vx) as Addr * GLYPH_LEN);
            }
            OpCodes::StoreBcd(vx) => {
                let value = self.regs.get(vx);
                let base = self.mem.index.0;
                self.write(base, value / 100, at)?;
                self.write(base + 1, (value / 10) % 10, at)?;
                self.write(base + 2, value % 10, at)?;
            }
            OpCodes::StoreRegisters(vx) => {
                let base = self.mem.index.0;
                for reg in 0..=vx {
                    self.write(base + reg as Addr, self.regs.get(reg), at)?;
                }
                self.mem.index.set(base + vx as Addr + 1);
            }
            OpCodes::LoadRegisters(vx) => {
                let base = self.mem.index.0;
                for reg in 0..=vx {
                    let value = self.read(base + reg as Addr, at)?;
                    self.regs.set(reg, value);
                }
                self.mem.index.set(base + vx as Addr + 1);
            }
            OpCodes::Unknown(word) => match self.policy {
                OpcodePolicy::Fault => {
                    return Err(Fault::UnknownOpcode { opcode: word, at });
                }
                OpcodePolicy::Ignore => {
                    debug!("ignoring unknown opcode {word:#06X} at {at:#05X}");
                }
            },
        }
        Ok(())
    }
}
