//! License plates and the allocator that hands them out
//!
//! Plates follow the `AA000AA` layout. The sequence counts up the digits
//! first, then carries into the trailing letter pair, then the leading one,
//! and wraps back to `AA000AA` after `ZZ999ZZ`.

use crossbeam_channel::{bounded, select, Receiver, Sender};
use log::{error, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::thread;
use thiserror::Error;

const PLATE_NUMBERS: u16 = 1000;

/// Number of distinct plates before the sequence wraps
pub const PLATE_COUNT: u64 = 26 * 26 * 26 * 26 * PLATE_NUMBERS as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Plate {
    /// Leading pair followed by trailing pair, as ASCII uppercase
    letters: [u8; 4],
    number: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid plate {0:?}, expected two letters, three digits, two letters")]
pub struct PlateParseError(pub String);

impl Plate {
    pub const FIRST: Plate = Plate {
        letters: [b'A'; 4],
        number: 0,
    };

    pub const LAST: Plate = Plate {
        letters: [b'Z'; 4],
        number: PLATE_NUMBERS - 1,
    };

    /// The plate issued right after this one
    pub fn next(self) -> Plate {
        let mut plate = self;
        plate.number += 1;
        if plate.number < PLATE_NUMBERS {
            return plate;
        }
        plate.number = 0;

        // Carry through D, C, B, A.
        for index in [3, 2, 1, 0] {
            if plate.letters[index] < b'Z' {
                plate.letters[index] += 1;
                return plate;
            }
            plate.letters[index] = b'A';
        }
        plate
    }

    /// Position of this plate in the sequence starting at [`Plate::FIRST`]
    pub fn ordinal(&self) -> u64 {
        let letters = self
            .letters
            .iter()
            .fold(0u64, |acc, letter| acc * 26 + u64::from(letter - b'A'));
        letters * u64::from(PLATE_NUMBERS) + u64::from(self.number)
    }
}

impl Default for Plate {
    fn default() -> Self {
        Plate::FIRST
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.letters;
        write!(
            f,
            "{}{}{:03}{}{}",
            a as char, b as char, self.number, c as char, d as char
        )
    }
}

impl FromStr for Plate {
    type Err = PlateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlateParseError(s.to_owned());
        let bytes = s.as_bytes();
        if bytes.len() != 7 {
            return Err(invalid());
        }

        let letters = [bytes[0], bytes[1], bytes[5], bytes[6]];
        if !letters.iter().all(u8::is_ascii_uppercase) {
            return Err(invalid());
        }
        let digits = &bytes[2..5];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let number = digits
            .iter()
            .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));

        Ok(Plate { letters, number })
    }
}

impl TryFrom<String> for Plate {
    type Error = PlateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Plate> for String {
    fn from(plate: Plate) -> Self {
        plate.to_string()
    }
}

/// Process-wide source of unique plates
///
/// A background thread owns the sequence and offers it on two rendezvous
/// channels: taking from `next` issues the plate and advances, taking from
/// `peek` only reads the plate that would be issued next. Each request is
/// served by exactly one of the two.
pub struct PlateAllocator {
    next: Receiver<Plate>,
    peek: Receiver<Plate>,
    // Dropping this disconnects the generator's shutdown channel.
    _shutdown: Sender<()>,
}

impl PlateAllocator {
    pub fn start(first: Plate) -> Self {
        let (next_tx, next_rx) = bounded::<Plate>(0);
        let (peek_tx, peek_rx) = bounded::<Plate>(0);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);

        let spawned = thread::Builder::new()
            .name("plate-allocator".to_owned())
            .spawn(move || {
                let mut plate = first;
                loop {
                    select! {
                        send(next_tx, plate) -> res => {
                            if res.is_err() {
                                break;
                            }
                            trace!("Issued plate {}", plate);
                            plate = plate.next();
                        }
                        send(peek_tx, plate) -> res => {
                            if res.is_err() {
                                break;
                            }
                        }
                        recv(shutdown_rx) -> _ => break,
                    }
                }
            });
        if let Err(err) = spawned {
            // Both channels are disconnected now, so every request yields None.
            error!("Failed to spawn plate allocator: {}", err);
        }

        Self {
            next: next_rx,
            peek: peek_rx,
            _shutdown: shutdown_tx,
        }
    }

    /// Issues a fresh plate
    pub fn next(&self) -> Option<Plate> {
        self.next.recv().ok()
    }

    /// The plate the next call to [`next`](Self::next) will issue
    pub fn peek(&self) -> Option<Plate> {
        self.peek.recv().ok()
    }
}
