use std::fs::File;
use std::io::{self, BufRead};

use anyhow::{Context, Result};

use crate::types::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Instruction,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub kind: AccessKind,
    pub addr: Address,
}

fn parse_address(token: &str) -> Option<Address> {
    let token = token.replace('_', "");
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Address::from_str_radix(hex, 16).ok()
    } else {
        token.parse::<Address>().ok()
    }
}

fn parse_line(line: &str) -> Option<Option<TraceEntry>> {
    let line = line.split('#').next().unwrap_or("").trim();
    let mut tokens = line.split_whitespace();
    let first = match tokens.next() {
        Some(first) => first,
        None => return Some(None),
    };
    let (kind, addr) = match first {
        "I" | "i" => (AccessKind::Instruction, tokens.next()?),
        "D" | "d" => (AccessKind::Data, tokens.next()?),
        _ => (AccessKind::Data, first),
    };
    if tokens.next().is_some() {
        return None;
    }
    let addr = parse_address(addr)?;
    Some(Some(TraceEntry { kind, addr }))
}

/// Parses `<kind> <address>` lines. Malformed lines are skipped with a
/// warning.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TraceEntry>> {
    let mut trace = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read trace line {}", line_num + 1))?;
        match parse_line(&line) {
            Some(Some(entry)) => trace.push(entry),
            Some(None) => {}
            None => log::warn!("skipping malformed trace line {}: {:?}", line_num + 1, line),
        }
    }
    Ok(trace)
}

pub fn load_trace_file(file_path: &str) -> Result<Vec<TraceEntry>> {
    let file =
        File::open(file_path).with_context(|| format!("failed to open trace file {}", file_path))?;
    parse_trace(io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace() {
        let input = "\
# boot
I 0x08000000
D 0x0800_1000  # table
d 134217732

0x08000040
X 0x08000000
I
D 0x08000000 extra
D 0xzz
";
        let trace = parse_trace(input.as_bytes()).unwrap();
        assert_eq!(
            trace,
            vec![
                TraceEntry {
                    kind: AccessKind::Instruction,
                    addr: 0x0800_0000
                },
                TraceEntry {
                    kind: AccessKind::Data,
                    addr: 0x0800_1000
                },
                TraceEntry {
                    kind: AccessKind::Data,
                    addr: 0x0800_0004
                },
                TraceEntry {
                    kind: AccessKind::Data,
                    addr: 0x0800_0040
                },
            ]
        );
    }

    #[test]
    fn test_missing_file() {
        assert!(load_trace_file("/nonexistent/trace.txt").is_err());
    }
}
