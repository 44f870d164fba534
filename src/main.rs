use std::env;
use std::error::Error;
use std::fs;
use std::time::{Duration, Instant};

use log::error;
use minifb::{Key, Scale, Window, WindowOptions};

use chipvm::display::{self, from_rgb};
use chipvm::keyboard::KEY_MAP;
use chipvm::timer::TICKS_PER_SECOND;
use chipvm::{Emulator, OpcodePolicy};

// Separate cadences:
// CPU: 700 instructions per second
// Display: 60 frames per second
// Timer: 60 ticks per second
const STEPS_PER_SECOND: u64 = 700;

const PIXEL_ON: u32 = from_rgb(0, 127, 255);
const PIXEL_OFF: u32 = from_rgb(0, 0, 0);

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut rom_path = None;
    let mut policy = OpcodePolicy::Fault;
    for arg in env::args().skip(1) {
        if arg == "--lenient" {
            policy = OpcodePolicy::Ignore;
        } else {
            rom_path = Some(arg);
        }
    }
    let rom_path = rom_path.ok_or("usage: chipvm [--lenient] <rom>")?;
    let rom = fs::read(&rom_path)?;

    let mut emu = Emulator::with_policy(policy);
    emu.load_rom(&rom)?;

    let mut window = Window::new(
        "chipvm - ESC to exit",
        display::WIDTH,
        display::HEIGHT,
        WindowOptions {
            scale: Scale::X16,
            ..WindowOptions::default()
        },
    )?;
    // Limit to max ~60 fps update rate
    window.limit_update_rate(Some(Duration::from_micros(16600)));

    let mut pixels = vec![0u32; display::WIDTH * display::HEIGHT];
    let steps_per_frame = (STEPS_PER_SECOND / TICKS_PER_SECOND) as usize;
    let tick_interval = Duration::from_secs(1) / TICKS_PER_SECOND as u32;
    let mut last_tick = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        for (physical, code) in KEY_MAP {
            if window.is_key_down(physical) {
                emu.press_key(code);
            } else {
                emu.release_key(code);
            }
        }

        for _ in 0..steps_per_frame {
            if let Err(fault) = emu.step() {
                error!("{fault}");
                return Err(fault.into());
            }
        }

        if last_tick.elapsed() >= tick_interval {
            emu.tick_timers();
            last_tick = Instant::now();
        }

        emu.display().render(&mut pixels, PIXEL_ON, PIXEL_OFF);
        window.update_with_buffer(&pixels, display::WIDTH, display::HEIGHT)?;
    }

    Ok(())
}
