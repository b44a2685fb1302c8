//! Line ranges in front of an Ex command: `5`, `.,$`, `'a;+2`, `%`.

use smallvec::SmallVec;
use vim_value::{invalid_range, mark_not_set, EvalError};

use crate::host::EditorHost;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddressBase {
    Number(usize),
    /// `.`; also implied by a bare offset such as `+2`.
    Current,
    /// `$`
    Last,
    /// `'x`
    Mark(char),
}

/// One address with its `+N`/`-N` offsets already summed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub base: AddressBase,
    pub offset: i64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Separator {
    /// `,`: every address is relative to the caret.
    Comma,
    /// `;`: the caret moves to the previous address first.
    Semicolon,
}

/// A parsed range, not yet resolved against a buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeSpec {
    /// `%`
    Whole,
    /// The first address has no separator.
    Addresses(SmallVec<[(Separator, Address); 2]>),
}

/// A resolved range, 1-based and inclusive. `start` may be 0 for
/// commands that accept "before the first line".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn single(line: usize) -> Self {
        LineRange {
            start: line,
            end: line,
        }
    }

    /// The range with line 0 read as line 1.
    #[must_use]
    pub fn clamped(self) -> Self {
        LineRange {
            start: self.start.max(1),
            end: self.end.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Split a leading range off `text`. Returns the range, if any, and the
/// rest of the line.
pub fn parse_range(text: &str) -> Result<(Option<RangeSpec>, &str), EvalError> {
    let rest = text.trim_start();
    if let Some(rest) = rest.strip_prefix('%') {
        return Ok((Some(RangeSpec::Whole), rest));
    }

    let mut addresses = SmallVec::new();
    let mut separator = Separator::Comma;
    let mut after_separator = false;
    let mut rest = rest;
    loop {
        let (address, after) = parse_address(rest)?;
        rest = after.trim_start();
        let next = match rest.chars().next() {
            Some(',') => Some(Separator::Comma),
            Some(';') => Some(Separator::Semicolon),
            _ => None,
        };
        match address {
            Some(address) => addresses.push((separator, address)),
            // `,5` reads as `.,5` and `5,` as `5,.`
            None if next.is_some() || after_separator => {
                addresses.push((separator, current()));
            }
            None => {}
        }
        match next {
            Some(sep) => {
                separator = sep;
                after_separator = true;
                rest = &rest[1..];
            }
            None => break,
        }
    }

    if addresses.is_empty() {
        Ok((None, rest))
    } else {
        Ok((Some(RangeSpec::Addresses(addresses)), rest))
    }
}

fn current() -> Address {
    Address {
        base: AddressBase::Current,
        offset: 0,
    }
}

fn parse_address(text: &str) -> Result<(Option<Address>, &str), EvalError> {
    let text = text.trim_start();
    let (base, mut rest) = match text.chars().next() {
        Some(c) if c.is_ascii_digit() => {
            let (n, rest) = split_number(text);
            (Some(AddressBase::Number(n)), rest)
        }
        Some('.') => (Some(AddressBase::Current), &text[1..]),
        Some('$') => (Some(AddressBase::Last), &text[1..]),
        Some('\'') => {
            let mut chars = text[1..].chars();
            let Some(mark) = chars.next() else {
                return Err(invalid_range());
            };
            (Some(AddressBase::Mark(mark)), chars.as_str())
        }
        _ => (None, text),
    };

    let mut offset: i64 = 0;
    let mut has_offset = false;
    loop {
        let sign = match rest.chars().next() {
            Some('+') => 1,
            Some('-') => -1,
            _ => break,
        };
        has_offset = true;
        rest = &rest[1..];
        let amount = if rest.starts_with(|c: char| c.is_ascii_digit()) {
            let (n, after) = split_number(rest);
            rest = after;
            i64::try_from(n).unwrap_or(i64::MAX)
        } else {
            1
        };
        offset = offset.saturating_add(sign * amount);
    }

    let base = match (base, has_offset) {
        (Some(base), _) => base,
        (None, true) => AddressBase::Current,
        (None, false) => return Ok((None, rest)),
    };
    Ok((Some(Address { base, offset }), rest))
}

fn split_number(text: &str) -> (usize, &str) {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let n = text[..end].parse().unwrap_or(usize::MAX);
    (n, &text[end..])
}

impl RangeSpec {
    /// Resolve against the buffer with the caret on `cursor_line`.
    ///
    /// Every line must exist (0 is allowed); a backwards range is
    /// swapped.
    pub fn resolve<H: EditorHost + ?Sized>(
        &self,
        host: &H,
        cursor_line: usize,
    ) -> Result<LineRange, EvalError> {
        let last = host.line_count();
        let (start, end) = self.resolve_unchecked(host, cursor_line)?;
        if start > last || end > last {
            return Err(invalid_range());
        }
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        Ok(LineRange { start, end })
    }

    /// The last address as a plain count, for commands that take
    /// `:[N]cmd`. No bounds check.
    pub fn count<H: EditorHost + ?Sized>(
        &self,
        host: &H,
        cursor_line: usize,
    ) -> Result<usize, EvalError> {
        self.resolve_unchecked(host, cursor_line).map(|(_, end)| end)
    }

    fn resolve_unchecked<H: EditorHost + ?Sized>(
        &self,
        host: &H,
        cursor_line: usize,
    ) -> Result<(usize, usize), EvalError> {
        let addresses = match self {
            RangeSpec::Whole => return Ok((1, host.line_count())),
            RangeSpec::Addresses(addresses) => addresses,
        };
        let mut anchor = cursor_line;
        let mut lines: SmallVec<[usize; 2]> = SmallVec::new();
        for (separator, address) in addresses {
            if *separator == Separator::Semicolon {
                if let Some(&previous) = lines.last() {
                    anchor = previous;
                }
            }
            lines.push(resolve_address(address, host, anchor)?);
        }
        let end = lines.last().copied().unwrap_or(cursor_line);
        let start = if lines.len() > 1 { lines[lines.len() - 2] } else { end };
        Ok((start, end))
    }
}

fn resolve_address<H: EditorHost + ?Sized>(
    address: &Address,
    host: &H,
    anchor: usize,
) -> Result<usize, EvalError> {
    let base = match address.base {
        AddressBase::Number(n) => n,
        AddressBase::Current => anchor,
        AddressBase::Last => host.line_count(),
        AddressBase::Mark(mark) => host.mark_line(mark).ok_or_else(|| mark_not_set(mark))?,
    };
    let line = i64::try_from(base)
        .unwrap_or(i64::MAX)
        .saturating_add(address.offset);
    usize::try_from(line).map_err(|_| invalid_range())
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

    use super::*;
    use crate::host::MemoryHost;
    use pretty_assertions::assert_eq;
    use vim_value::EvalErrorKind;

    fn host() -> MemoryHost {
        let mut host = MemoryHost::from_text("1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n");
        host.set_mark('a', 4);
        host
    }

    fn resolve(text: &str, cursor: usize) -> Result<(usize, usize, String), EvalError> {
        let host = host();
        let (spec, rest) = parse_range(text)?;
        let spec = spec.unwrap();
        let range = spec.resolve(&host, cursor)?;
        Ok((range.start, range.end, rest.to_owned()))
    }

    #[test]
    fn numbers_and_symbols() {
        assert_eq!(resolve("3d", 1).unwrap(), (3, 3, "d".into()));
        assert_eq!(resolve(".,$p", 2).unwrap(), (2, 10, "p".into()));
        assert_eq!(resolve("%j", 5).unwrap(), (1, 10, "j".into()));
    }

    #[test]
    fn offsets_accumulate() {
        assert_eq!(resolve("+,+2", 3).unwrap().0, 4);
        assert_eq!(resolve("+,+2", 3).unwrap().1, 5);
        assert_eq!(resolve("$-3", 1).unwrap().0, 7);
        assert_eq!(resolve(".+1+1", 1).unwrap().0, 3);
    }

    #[test]
    fn semicolon_moves_the_anchor() {
        assert_eq!(resolve("2;+3", 7).unwrap().1, 5);
        assert_eq!(resolve("2,+3", 7).unwrap().1, 10);
    }

    #[test]
    fn marks() {
        assert_eq!(resolve("'a,'a+1", 1).unwrap().1, 5);
        let err = resolve("'z", 1).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::MarkNotSet { mark: 'z' });
    }

    #[test]
    fn past_the_end_is_invalid() {
        assert_eq!(resolve("11", 1).unwrap_err().kind, EvalErrorKind::InvalidRange);
        assert_eq!(resolve("-5", 2).unwrap_err().kind, EvalErrorKind::InvalidRange);
    }

    #[test]
    fn backwards_ranges_are_swapped() {
        assert_eq!(resolve("5,2", 1).unwrap().0, 2);
        assert_eq!(resolve("5,2", 1).unwrap().1, 5);
    }

    #[test]
    fn missing_side_is_the_caret() {
        assert_eq!(resolve(",3", 1).unwrap().0, 1);
        assert_eq!(resolve("3,", 6).unwrap().1, 6);
    }

    #[test]
    fn no_range() {
        let (spec, rest) = parse_range("echo 1").unwrap();
        assert_eq!(spec, None);
        assert_eq!(rest, "echo 1");
    }

    #[test]
    fn count_skips_bounds() {
        let (spec, _) = parse_range("500").unwrap();
        assert_eq!(spec.unwrap().count(&host(), 1).unwrap(), 500);
    }
}
