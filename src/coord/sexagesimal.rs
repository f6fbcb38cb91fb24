// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Reading and writing sexagesimal angles.

Right ascensions are read in hours and declinations in degrees, each either as
a plain number, colon-delimited (`12:30:00`) or with unit letters
(`12h30m00s`, `-30d00m00s`).
 */

use thiserror::Error;

/// Read a right ascension \[hours\].
pub fn parse_hours(s: &str) -> Result<f64, SexagesimalError> {
    parse(s, 'h')
}

/// Read a declination \[degrees\].
pub fn parse_degrees(s: &str) -> Result<f64, SexagesimalError> {
    parse(s, 'd')
}

fn parse(s: &str, major_unit: char) -> Result<f64, SexagesimalError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(SexagesimalError::Empty);
    }
    // The sign applies to the whole angle, even if the major field is zero.
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let fields = if unsigned.contains(':') {
        split_colons(s, unsigned)?
    } else if unsigned.contains(major_unit) {
        split_units(s, unsigned, major_unit)?
    } else {
        [unsigned.parse()?, 0.0, 0.0]
    };
    if fields.iter().any(|f| f.is_sign_negative()) {
        return Err(SexagesimalError::MisplacedSign(s.to_string()));
    }

    let value = fields[0] + fields[1] / 60.0 + fields[2] / 3600.0;
    Ok(if negative { -value } else { value })
}

fn split_colons(original: &str, s: &str) -> Result<[f64; 3], SexagesimalError> {
    let fields = s
        .split(':')
        .map(str::parse)
        .collect::<Result<Vec<f64>, _>>()?;
    match fields.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        [a, b] => Ok([*a, *b, 0.0]),
        _ => Err(SexagesimalError::WrongFieldCount(original.to_string())),
    }
}

/// `s` looks like "12h30m00s". Trailing fields may be left off.
fn split_units(original: &str, s: &str, major_unit: char) -> Result<[f64; 3], SexagesimalError> {
    let mut fields = [0.0; 3];
    let mut rest = s;
    for (field, unit) in fields.iter_mut().zip([major_unit, 'm', 's']) {
        if rest.is_empty() {
            break;
        }
        match rest.split_once(unit) {
            Some((value, remainder)) => {
                *field = value.parse()?;
                rest = remainder;
            }
            None => return Err(SexagesimalError::MissingUnit(unit, original.to_string())),
        }
    }
    if !rest.is_empty() {
        return Err(SexagesimalError::Trailing(original.to_string()));
    }
    Ok(fields)
}

/// Format an angle in degrees as "-DDdMMmSS.SSs".
pub fn format_dms(deg: f64) -> String {
    let (sign, d, m, s) = split(deg);
    format!("{sign}{d}d{m:02}m{s:05.2}s")
}

/// Format an angle in hours as "HHhMMmSS.SSs".
pub fn format_hms(hours: f64) -> String {
    let (sign, h, m, s) = split(hours);
    format!("{sign}{h:02}h{m:02}m{s:05.2}s")
}

fn split(value: f64) -> (&'static str, u32, u32, f64) {
    let sign = if value < 0.0 { "-" } else { "" };
    // Round to hundredths of a second up front, so 59.999s never prints as
    // 60.00s.
    let centis = (value.abs() * 360_000.0).round() as u64;
    let major = (centis / 360_000) as u32;
    let minutes = ((centis / 6000) % 60) as u32;
    let seconds = (centis % 6000) as f64 / 100.0;
    (sign, major, minutes, seconds)
}

#[derive(Error, Debug)]
pub enum SexagesimalError {
    #[error("Cannot read an empty angle")]
    Empty,

    #[error("Did not get two or three sexagesimal fields: {0}")]
    WrongFieldCount(String),

    #[error("Did not find '{0}' when attempting to read sexagesimal string: {1}")]
    MissingUnit(char, String),

    #[error("Unexpected characters at the end of sexagesimal string: {0}")]
    Trailing(String),

    #[error("Only the first field of a sexagesimal string may have a sign: {0}")]
    MisplacedSign(String),

    #[error("{0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}
