//! Canonical storage location codes.
//!
//! A location code identifies one aisle slot in the warehouse:
//!
//! ```text
//! 001/0001/AA01
//! │   │    │ └─ (n % 100) + 1, at least two digits
//! │   │    └─── n / 100 in base 26 ('A' = 0), at least two letters
//! │   └──────── room index + 1, four digits
//! └──────────── floor + 1, three digits
//! ```
//!
//! The last slot of every hundred-group renders as `100`, so the aisle suffix
//! is two or three digits wide.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Canonical `floor/room/aisle` label of a storage slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationCode(String);

impl LocationCode {
    /// Parse and validate a location code (`NNN/NNNN/LLNN`, suffix up to `100`).
    pub fn parse(value: &str) -> DomainResult<Self> {
        if is_well_formed(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(DomainError::invalid_id(format!("LocationCode: '{value}'")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for LocationCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the location code for aisle `aisle_seq` of room `room_index` on `floor`.
///
/// Pure and total. All indices are zero-based; the rendered code is one-based.
pub fn name(floor: u32, room_index: u32, aisle_seq: u32) -> LocationCode {
    let letters = letter_group(aisle_seq / 100);
    let number = (aisle_seq % 100) + 1;
    LocationCode(format!(
        "{:03}/{:04}/{}{:02}",
        u64::from(floor) + 1,
        u64::from(room_index) + 1,
        letters,
        number
    ))
}

fn letter_group(mut n: u32) -> String {
    let mut digits = Vec::with_capacity(2);
    loop {
        digits.push(ALPHABET[(n % 26) as usize]);
        n /= 26;
        if n == 0 {
            break;
        }
    }
    while digits.len() < 2 {
        digits.push(b'A');
    }
    digits.iter().rev().map(|b| *b as char).collect()
}

fn is_well_formed(value: &str) -> bool {
    let mut parts = value.split('/');
    let (Some(floor), Some(room), Some(aisle), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if floor.len() < 3 || !all_digits(floor) || room.len() < 4 || !all_digits(room) {
        return false;
    }

    let letters_len = aisle.bytes().take_while(|b| b.is_ascii_uppercase()).count();
    let (letters, number) = aisle.split_at(letters_len);
    letters.len() >= 2 && (2..=3).contains(&number.len()) && all_digits(number)
}
