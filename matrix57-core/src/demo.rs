//! Self-test demo
//!
//! When the link data line is high at power-on the firmware ignores the
//! link and plays a list of demos instead. Each demo produces ordinary
//! protocol bytes that are fed to the parser exactly like received ones,
//! so the demo doubles as an end-to-end test of parser and renderer.

use heapless::Vec;
use matrix57_display::{ShiftDir, NUM_COLUMNS, ROW_MASK};
use matrix57_protocol::{Command, ESCAPE, MAX_COMMAND_SIZE};

/// Pattern steps each demo runs before the next one starts
pub const DEMO_STEPS: u8 = 255;

/// Largest byte burst a single step can produce
pub const MAX_BURST: usize = 2 * MAX_COMMAND_SIZE;

/// Bytes produced by one step
pub type Burst = Vec<u8, MAX_BURST>;

const DEMO_MESSAGE: &[u8] = b"01234567890ABCDEF";

const CHEVRON: [u8; NUM_COLUMNS] = [0b0001_1100, 0b0011_1000, 0b0111_0000, 0b0011_1000, 0b0001_1100];

/// One entry of the demo playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Demo {
    /// Characters '0' to 'Z', one at a time
    Sequence,
    /// Scrolling message
    Message,
    /// A dot bouncing up and down, scrolled in column by column
    Wiggle,
    /// Random columns scrolled in
    RandomColumns,
    /// Random bar graph crawling in the given direction
    Graph(ShiftDir),
    /// Random bitmap drifting left, right, up and down
    Drift,
    /// Chevron rolling upward
    Chevron,
    /// Two-digit counter, character pair layout
    Counter { flipped: bool },
    /// Random dots crawling in the given direction
    Crawl(ShiftDir),
}

const PLAYLIST: [Demo; 17] = [
    Demo::Sequence,
    Demo::Message,
    Demo::Wiggle,
    Demo::RandomColumns,
    Demo::Graph(ShiftDir::IntoLast),
    Demo::Drift,
    Demo::Chevron,
    Demo::Counter { flipped: true },
    Demo::Counter { flipped: false },
    Demo::Graph(ShiftDir::IntoLast),
    Demo::Graph(ShiftDir::IntoFirst),
    Demo::Graph(ShiftDir::IntoHighRow),
    Demo::Graph(ShiftDir::IntoLowRow),
    Demo::Crawl(ShiftDir::IntoLast),
    Demo::Crawl(ShiftDir::IntoFirst),
    Demo::Crawl(ShiftDir::IntoHighRow),
    Demo::Crawl(ShiftDir::IntoLowRow),
];

/// 16-bit Galois LFSR
#[derive(Debug, Clone)]
struct Lfsr(u16);

impl Lfsr {
    fn next(&mut self) -> u8 {
        let carry = self.0 & 1 != 0;
        self.0 >>= 1;
        if carry {
            self.0 ^= 0xB400;
        }
        self.0 as u8
    }

    fn below(&mut self, bound: u8) -> u8 {
        self.next() % bound
    }
}

/// Content bytes may not collide with the escape code
fn sanitize(byte: u8) -> u8 {
    if byte == ESCAPE {
        byte ^ 1
    } else {
        byte
    }
}

fn emit(out: &mut Burst, command: Command<'_>) {
    if let Ok(bytes) = command.encode_to_vec() {
        // Bursts are sized for the longest step
        let stored = out.extend_from_slice(&bytes);
        debug_assert!(stored.is_ok(), "demo burst overflow");
    }
}

/// Demo playlist driven by the pattern rate
#[derive(Debug, Clone)]
pub struct DemoSequencer {
    index: usize,
    remaining: u8,
    started: bool,
    countdown: u8,
    /// Wiggle row or counter value
    phase: i8,
    direction: i8,
    /// Drift direction and how long it lasts
    drift_dir: u8,
    drift_left: u8,
    next_char: u8,
    graph_height: u8,
    frame: [u8; NUM_COLUMNS],
    rng: Lfsr,
}

impl Default for DemoSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSequencer {
    pub fn new() -> Self {
        Self {
            index: 0,
            remaining: DEMO_STEPS,
            started: false,
            countdown: 1,
            phase: 0,
            direction: 1,
            drift_dir: 3,
            drift_left: 3,
            next_char: b'0',
            graph_height: 0,
            frame: [0; NUM_COLUMNS],
            rng: Lfsr(0xACE1),
        }
    }

    /// Demo currently playing
    pub fn current(&self) -> Demo {
        PLAYLIST[self.index]
    }

    /// Advance one pattern step, returning the bytes to feed the parser
    pub fn step(&mut self) -> Burst {
        let mut out = Burst::new();
        let first = !self.started;
        self.started = true;

        match self.current() {
            Demo::Sequence => self.sequence(&mut out, first),
            Demo::Message => {
                if first {
                    emit(&mut out, Command::Message(DEMO_MESSAGE));
                }
            }
            Demo::Wiggle => self.wiggle(&mut out, first),
            Demo::RandomColumns => {
                if first {
                    emit(&mut out, Command::Reset);
                    self.countdown = 1;
                }
                if self.tick(2) {
                    let column = self.rng.below(128);
                    emit(&mut out, Command::DataScroll(sanitize(column)));
                }
            }
            Demo::Graph(dir) => {
                if first {
                    emit(&mut out, Command::ShiftDir(dir.to_byte()));
                    emit(&mut out, Command::Transition(0));
                }
                if self.tick(2) {
                    let column = self.graph();
                    emit(&mut out, Command::DataScroll(column));
                }
            }
            Demo::Drift => self.drift(&mut out, first),
            Demo::Chevron => {
                if first {
                    self.frame = CHEVRON;
                }
                if self.tick(4) {
                    roll_up(&mut self.frame);
                    emit(&mut out, Command::Data(self.frame.map(sanitize)));
                }
            }
            Demo::Counter { flipped } => self.counter(&mut out, first, flipped),
            Demo::Crawl(dir) => {
                if first {
                    emit(&mut out, Command::ShiftDir(dir.to_byte()));
                    emit(&mut out, Command::Transition(0));
                }
                if self.tick(2) {
                    let mut column = 0;
                    for row in 0..7 {
                        if self.rng.next() >> 1 > 100 {
                            column |= 1 << row;
                        }
                    }
                    emit(&mut out, Command::DataScroll(sanitize(column)));
                }
            }
        }

        self.remaining -= 1;
        if self.remaining == 0 {
            self.index = (self.index + 1) % PLAYLIST.len();
            self.remaining = DEMO_STEPS;
            self.started = false;
            emit(&mut out, Command::Reset);
        }
        out
    }

    /// Count down the step timer, reloading it with `interval` when it fires
    fn tick(&mut self, interval: u8) -> bool {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.countdown = interval;
            true
        } else {
            false
        }
    }

    fn sequence(&mut self, out: &mut Burst, first: bool) {
        if first {
            emit(out, Command::Reset);
            self.next_char = b'0';
        }
        if self.tick(10) {
            emit(out, Command::Character(self.next_char));
            self.next_char = if self.next_char >= b'Z' {
                b'0'
            } else {
                self.next_char + 1
            };
        }
    }

    fn wiggle(&mut self, out: &mut Burst, first: bool) {
        if first {
            self.phase = 0;
            self.direction = 1;
        }
        if self.tick(5) {
            let row = self.phase.clamp(0, 6).unsigned_abs();
            emit(out, Command::DataScroll(1 << row));

            self.phase += self.direction;
            if self.phase <= 0 || self.phase >= 6 {
                self.direction = -self.direction;
            }
        }
    }

    /// Bar of random height that drifts by at most one row per call
    fn graph(&mut self) -> u8 {
        let bar = (1u8 << self.graph_height) - 1;
        if self.rng.next() <= 128 {
            self.graph_height = self.graph_height.saturating_sub(1);
        } else if self.graph_height < 6 {
            self.graph_height += 1;
        }
        bar
    }

    fn drift(&mut self, out: &mut Burst, first: bool) {
        if first {
            for column in &mut self.frame {
                *column = self.rng.below(128);
            }
            self.drift_dir = 3;
            self.drift_left = 3;
            self.countdown = 3;
        }
        if !self.tick(3) {
            return;
        }

        match self.drift_dir {
            0 => self.frame.rotate_right(1),
            1 => self.frame.rotate_left(1),
            2 => roll_up(&mut self.frame),
            _ => roll_down(&mut self.frame),
        }

        self.drift_left -= 1;
        if self.drift_left == 0 {
            self.drift_left = 15;
            self.drift_dir = if self.drift_dir == 0 { 3 } else { self.drift_dir - 1 };
        }
        emit(out, Command::Data(self.frame.map(sanitize)));
    }

    fn counter(&mut self, out: &mut Burst, first: bool, flipped: bool) {
        if first {
            emit(out, Command::Transition(0));
            self.phase = 0;
        }
        let interval = if flipped { 10 } else { 3 };
        if self.tick(interval) {
            self.phase = (self.phase + 1) % 100;
            // phase stays in 0..100
            let value = self.phase.unsigned_abs();
            emit(
                out,
                Command::TwoChars {
                    first: b'0' + value / 10,
                    second: b'0' + value % 10,
                    flipped,
                },
            );
        }
    }
}

/// Rotate every column one row toward bit 6, wrapping
fn roll_up(frame: &mut [u8; NUM_COLUMNS]) {
    for column in frame.iter_mut() {
        let top = (*column >> 6) & 1;
        *column = ((*column << 1) | top) & ROW_MASK;
    }
}

/// Rotate every column one row toward bit 0, wrapping
fn roll_down(frame: &mut [u8; NUM_COLUMNS]) {
    for column in frame.iter_mut() {
        let bottom = *column & 1;
        *column = (*column >> 1) | (bottom << 6);
    }
}
