use crate::error::CidrError;
use crate::order::HasCidr;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;
use std::io::{self, BufRead};
use std::str::FromStr;

pub const MAX_LENGTH: u8 = 32;

const CLASS_BITS: usize = 8;
const MAX_CLASSES: usize = 4;

lazy_static! {
    static ref RE: Regex =
        Regex::new(r"^(?P<addr>[^/]*)(/(?P<len>[^/]*))?$").expect("Not possible");
}

// No validation: "a.b" yields two classes that encode_classes refuses.
pub fn classes(cidr: &str) -> Vec<&str> {
    let addr = match cidr.split_once('/') {
        Some((addr, _)) => addr,
        None => cidr,
    };
    addr.split('.').collect()
}

pub fn encode_classes(classes: &[&str]) -> Result<String, CidrError> {
    Ok(encode_octets(&parse_octets(classes)?))
}

pub fn binary_representation(cidr: &str) -> Result<String, CidrError> {
    encode_classes(&classes(cidr))
}

pub fn prefix_length(cidr: &str) -> Result<u8, CidrError> {
    Ok(Cidr::from_str(cidr)?.prefix_length())
}

pub fn binary_prefix(cidr: &str, len: u8) -> Result<String, CidrError> {
    Ok(Cidr::from_str(cidr)?.binary_prefix(len))
}

pub fn overlaps(a: &str, b: &str) -> Result<bool, CidrError> {
    let a = Cidr::from_str(a)?;
    let b = Cidr::from_str(b)?;
    let res = a.overlaps(&b);
    log::debug!("overlaps({}, {}) = {}", a, b, res);
    Ok(res)
}

/// Every index pair `(i, j)`, `i < j`, of records whose subnets overlap.
/// Records that cannot be parsed are logged and left out.
pub fn find_overlaps<T: HasCidr>(records: &[T]) -> Vec<(usize, usize)> {
    let parsed: Vec<(usize, Cidr)> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| match Cidr::from_str(r.cidr()) {
            Ok(cidr) => Some((i, cidr)),
            Err(e) => {
                log::warn!("Skipping record {}: {}", i, e);
                None
            }
        })
        .collect();

    let mut pairs = Vec::new();
    for (n, (i, a)) in parsed.iter().enumerate() {
        for (j, b) in parsed.iter().skip(n + 1) {
            if a.overlaps(b) {
                pairs.push((*i, *j));
            }
        }
    }
    log::debug!(
        "{} overlapping pair(s) among {} records",
        pairs.len(),
        records.len()
    );
    pairs
}

/// Trimmed CIDR lines of `input`. Blank lines are dropped, lines that do not
/// parse are logged with their line number and dropped.
pub fn read_cidrs<R: BufRead>(input: R) -> io::Result<Vec<String>> {
    let mut list = Vec::new();
    for (n, line) in input.lines().enumerate() {
        let line = line?;
        let l = line.trim();
        if l.is_empty() {
            continue;
        }
        match Cidr::from_str(l) {
            Ok(_) => list.push(l.to_owned()),
            Err(e) => log::warn!("Skipping line {} '{}': {}", n + 1, l, e),
        }
    }
    Ok(list)
}

fn parse_octets(classes: &[&str]) -> Result<Vec<u8>, CidrError> {
    if classes.is_empty() || classes.len() > MAX_CLASSES {
        return Err(CidrError::InvalidCidrFormat(format!(
            "expected 1 to {} classes, found {}",
            MAX_CLASSES,
            classes.len()
        )));
    }
    classes.iter().map(|class| parse_octet(class)).collect()
}

fn parse_octet(class: &str) -> Result<u8, CidrError> {
    if class.is_empty() || !class.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CidrError::InvalidCidrFormat(format!(
            "'{}' is not a decimal octet",
            class
        )));
    }
    class
        .parse::<u8>()
        .map_err(|e| CidrError::InvalidCidrFormat(format!("'{}': {}", class, e)))
}

fn parse_prefix(len: &str) -> Result<u8, CidrError> {
    if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CidrError::InvalidPrefixLength(format!(
            "'{}' is not a number",
            len
        )));
    }
    match len.parse::<u8>() {
        Ok(n) if n <= MAX_LENGTH => Ok(n),
        _ => Err(CidrError::InvalidPrefixLength(format!(
            "'{}' is outside 0..={}",
            len, MAX_LENGTH
        ))),
    }
}

fn encode_octets(octets: &[u8]) -> String {
    let mut bits = String::with_capacity(octets.len() * CLASS_BITS);
    for octet in octets {
        bits.push_str(&format!("{:08b}", octet));
    }
    log::trace!("encoded {:?} as {}", octets, bits);
    bits
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Cidr {
    octets: Vec<u8>,
    prefix: Option<u8>,
}

impl Cidr {
    pub fn bit_length(&self) -> u8 {
        (self.octets.len() * CLASS_BITS) as u8
    }

    pub fn binary(&self) -> String {
        encode_octets(&self.octets)
    }

    pub fn prefix_length(&self) -> u8 {
        self.prefix.unwrap_or_else(|| self.bit_length())
    }

    /// Leading bits that decide overlap. An incomplete address never claims
    /// more bits than it supplied: `11.1/24` counts as `11.1/16`.
    pub fn effective_prefix_length(&self) -> u8 {
        let len = self.prefix_length().min(self.bit_length());
        log::debug!("effective prefix of {} is {}", self, len);
        len
    }

    pub fn binary_prefix(&self, len: u8) -> String {
        let mut bits = self.binary();
        bits.truncate(len as usize);
        bits
    }

    pub fn overlaps(&self, other: &Cidr) -> bool {
        let shortest = self
            .effective_prefix_length()
            .min(other.effective_prefix_length());
        self.binary_prefix(shortest) == other.binary_prefix(shortest)
    }
}

impl FromStr for Cidr {
    type Err = CidrError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = RE.captures(s).ok_or_else(|| {
            CidrError::InvalidCidrFormat(format!("'{}' has more than one '/'", s))
        })?;
        let addr = v.name("addr").map(|m| m.as_str()).unwrap_or_default();
        let octets = parse_octets(&addr.split('.').collect::<Vec<_>>())?;
        let prefix = match v.name("len") {
            Some(m) => Some(parse_prefix(m.as_str())?),
            None => None,
        };
        Ok(Cidr { octets, prefix })
    }
}

impl Display for Cidr {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        for (i, octet) in self.octets.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", octet)?;
        }
        if let Some(len) = self.prefix {
            write!(f, "/{}", len)?;
        }
        Ok(())
    }
}
