use crate::error::{Diag, Error};
use arch::alu::Alu;
use arch::op::{Category, OpKind};
use arch::seg::Segment;
use arch::{COMMENT, IMM_MAX};
use std::fmt;

// ----------------------------------------------------------------------------
// Command

/// One classified VM instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    Arith(Alu),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl Cmd {
    /// Parse one non-empty, comment-stripped source line.
    pub fn parse(code: &str) -> Result<Cmd, Error> {
        let words: Vec<&str> = code.split_whitespace().collect();
        let Some((&op, args)) = words.split_first() else {
            return Err(Error::UnknownOperation(code.to_string()));
        };
        let kind = OpKind::parse(op).map_err(|_| Error::UnknownOperation(op.to_string()))?;
        match kind.category() {
            Category::Arithmetic => {
                if !args.is_empty() {
                    return Err(Error::InvalidOperands(""));
                }
                let alu = Alu::parse(op).map_err(|_| Error::UnknownOperation(op.to_string()))?;
                Ok(Cmd::Arith(alu))
            }
            Category::MemoryAccess => {
                let [seg, idx] = args else {
                    return Err(Error::InvalidOperands("segment index"));
                };
                let seg = Segment::parse(seg).map_err(|_| Error::UnknownSegment(seg.to_string()))?;
                let idx = parse_index(idx)?;
                if let Some(cap) = seg.capacity() {
                    if idx >= cap {
                        return Err(Error::IndexOutOfRange(seg.to_string(), idx, cap));
                    }
                }
                if kind == OpKind::Pop && seg == Segment::Constant {
                    return Err(Error::PopConstant);
                }
                Ok(match kind {
                    OpKind::Push => Cmd::Push(seg, idx),
                    _ => Cmd::Pop(seg, idx),
                })
            }
            Category::Branch => {
                let [name] = args else {
                    return Err(Error::InvalidOperands("label"));
                };
                let name = name.to_string();
                Ok(match kind {
                    OpKind::Label => Cmd::Label(name),
                    OpKind::Goto => Cmd::Goto(name),
                    _ => Cmd::IfGoto(name),
                })
            }
            Category::Function => {
                let [name, count] = args else {
                    return Err(Error::InvalidOperands("name count"));
                };
                let num = parse_index(count)?;
                // The call frame computes ARG = SP - count - 5; the sum
                // must still fit an A-immediate.
                if kind == OpKind::Call && num > IMM_MAX - 5 {
                    return Err(Error::ParseArgument(
                        count.to_string(),
                        "an argument count".to_string(),
                    ));
                }
                Ok(match kind {
                    OpKind::Function => Cmd::Function(name.to_string(), num),
                    _ => Cmd::Call(name.to_string(), num),
                })
            }
            Category::Return => {
                if !args.is_empty() {
                    return Err(Error::InvalidOperands(""));
                }
                Ok(Cmd::Return)
            }
        }
    }
}

/// Indexes land in A-instruction immediates, so 15 bits is the ceiling.
fn parse_index(s: &str) -> Result<u16, Error> {
    match s.parse::<u16>() {
        Ok(n) if n <= IMM_MAX => Ok(n),
        _ => Err(Error::ParseArgument(s.to_string(), "an index".to_string())),
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cmd::Arith(alu) => write!(f, "{}", alu),
            Cmd::Push(seg, idx) => write!(f, "push {} {}", seg, idx),
            Cmd::Pop(seg, idx) => write!(f, "pop {} {}", seg, idx),
            Cmd::Label(name) => write!(f, "label {}", name),
            Cmd::Goto(name) => write!(f, "goto {}", name),
            Cmd::IfGoto(name) => write!(f, "if-goto {}", name),
            Cmd::Function(name, num) => write!(f, "function {} {}", name, num),
            Cmd::Call(name, num) => write!(f, "call {} {}", name, num),
            Cmd::Return => write!(f, "return"),
        }
    }
}

// ----------------------------------------------------------------------------
// Reader

/// A command with its source position.
#[derive(Debug, Clone)]
pub struct Inst {
    pub cmd: Cmd,
    pub line: usize,
    pub raw: String,
}

/// Lazy instruction stream with a one-instruction look-ahead.
///
/// Comments and blank lines are skipped transparently; the stream is
/// driven once per unit and is not restartable.
pub struct Reader<I: Iterator<Item = String>> {
    unit: String,
    lines: std::iter::Enumerate<I>,
    peeked: Option<Result<Inst, Diag>>,
}

impl<I: Iterator<Item = String>> Reader<I> {
    pub fn new(unit: &str, lines: I) -> Self {
        let mut reader = Reader {
            unit: unit.to_string(),
            lines: lines.enumerate(),
            peeked: None,
        };
        reader.peeked = reader.read();
        reader
    }

    /// Whether a further instruction remains, without consuming it.
    pub fn has_next(&self) -> bool {
        self.peeked.is_some()
    }

    /// The next instruction, without consuming it.
    pub fn peek(&self) -> Option<&Result<Inst, Diag>> {
        self.peeked.as_ref()
    }

    /// Consume and return the next instruction.
    pub fn advance(&mut self) -> Option<Result<Inst, Diag>> {
        let next = self.read();
        std::mem::replace(&mut self.peeked, next)
    }

    fn read(&mut self) -> Option<Result<Inst, Diag>> {
        loop {
            let (idx, raw) = self.lines.next()?;
            let code = match raw.split_once(COMMENT) {
                Some((code, _)) => code,
                None => raw.as_str(),
            };
            let code = code.trim();
            if code.is_empty() {
                continue;
            }
            let line = idx + 1;
            return Some(match Cmd::parse(code) {
                Ok(cmd) => Ok(Inst {
                    cmd,
                    line,
                    raw: code.to_string(),
                }),
                Err(err) => Err(Diag::new(err, &self.unit, line, &raw)),
            });
        }
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! case {
        ($name:ident, $code:expr, $expect:expr) => {
            #[test]
            fn $name() {
                assert_eq!(Cmd::parse($code).unwrap(), $expect);
            }
        };
    }

    case!(arith_add, "add", Cmd::Arith(Alu::Add));
    case!(arith_not, "not", Cmd::Arith(Alu::Not));
    case!(push_constant, "push constant 7", Cmd::Push(Segment::Constant, 7));
    case!(push_that, "push that 5", Cmd::Push(Segment::That, 5));
    case!(pop_static, "pop static 3", Cmd::Pop(Segment::Static, 3));
    case!(pop_temp, "pop temp 6", Cmd::Pop(Segment::Temp, 6));
    case!(label, "label LOOP", Cmd::Label("LOOP".to_string()));
    case!(goto, "goto LOOP", Cmd::Goto("LOOP".to_string()));
    case!(if_goto, "if-goto END", Cmd::IfGoto("END".to_string()));
    case!(function, "function Sys.init 2", Cmd::Function("Sys.init".to_string(), 2));
    case!(call, "call Math.max 2", Cmd::Call("Math.max".to_string(), 2));
    case!(ret, "return", Cmd::Return);

    #[test]
    fn rejects_unknown_operation() {
        assert!(matches!(
            Cmd::parse("mul local 0"),
            Err(Error::UnknownOperation(_))
        ));
    }

    #[test]
    fn rejects_short_push() {
        assert!(matches!(
            Cmd::parse("push constant"),
            Err(Error::InvalidOperands(_))
        ));
        assert!(matches!(Cmd::parse("pop local"), Err(Error::InvalidOperands(_))));
    }

    #[test]
    fn rejects_unknown_segment() {
        assert!(matches!(
            Cmd::parse("push heap 0"),
            Err(Error::UnknownSegment(_))
        ));
    }

    #[test]
    fn rejects_pop_constant() {
        assert!(matches!(Cmd::parse("pop constant 1"), Err(Error::PopConstant)));
    }

    #[test]
    fn rejects_bad_index() {
        assert!(matches!(
            Cmd::parse("push local x"),
            Err(Error::ParseArgument(_, _))
        ));
    }

    #[test]
    fn rejects_index_beyond_direct_segment() {
        assert!(matches!(
            Cmd::parse("push temp 8"),
            Err(Error::IndexOutOfRange(_, 8, 8))
        ));
        assert!(matches!(
            Cmd::parse("push temp 65531"),
            Err(Error::ParseArgument(_, _))
        ));
        assert!(matches!(
            Cmd::parse("pop pointer 2"),
            Err(Error::IndexOutOfRange(_, 2, 2))
        ));
        assert_eq!(Cmd::parse("push temp 7").unwrap(), Cmd::Push(Segment::Temp, 7));
        assert_eq!(
            Cmd::parse("pop pointer 1").unwrap(),
            Cmd::Pop(Segment::Pointer, 1)
        );
    }

    #[test]
    fn rejects_index_beyond_immediate_width() {
        assert!(matches!(
            Cmd::parse("push constant 32768"),
            Err(Error::ParseArgument(_, _))
        ));
        assert_eq!(
            Cmd::parse("push constant 32767").unwrap(),
            Cmd::Push(Segment::Constant, 32767)
        );
    }

    #[test]
    fn rejects_oversized_call_count() {
        assert!(matches!(
            Cmd::parse("call Sys.halt 65535"),
            Err(Error::ParseArgument(_, _))
        ));
        assert!(matches!(
            Cmd::parse("call Sys.halt 32763"),
            Err(Error::ParseArgument(_, _))
        ));
        assert_eq!(
            Cmd::parse("call Sys.halt 32762").unwrap(),
            Cmd::Call("Sys.halt".to_string(), 32762)
        );
    }

    #[test]
    fn rejects_surplus_operands() {
        assert!(matches!(
            Cmd::parse("add local 0"),
            Err(Error::InvalidOperands(_))
        ));
        assert!(matches!(Cmd::parse("return 1"), Err(Error::InvalidOperands(_))));
        assert!(matches!(
            Cmd::parse("push constant 1 2"),
            Err(Error::InvalidOperands(_))
        ));
        assert!(matches!(
            Cmd::parse("goto LOOP END"),
            Err(Error::InvalidOperands(_))
        ));
    }

    #[test]
    fn reader_skips_comments_and_blanks() {
        let src = "// header\n\n  push constant 1 // inline\n   \nadd\n";
        let mut reader = Reader::new("Test", src.lines().map(String::from));
        assert!(reader.has_next());
        let first = reader.advance().unwrap().unwrap();
        assert_eq!(first.cmd, Cmd::Push(Segment::Constant, 1));
        assert_eq!(first.line, 3);
        assert_eq!(first.raw, "push constant 1");
        let second = reader.advance().unwrap().unwrap();
        assert_eq!(second.cmd, Cmd::Arith(Alu::Add));
        assert!(!reader.has_next());
        assert!(reader.advance().is_none());
    }

    #[test]
    fn reader_peek_does_not_consume() {
        let src = "push constant 1\nadd";
        let mut reader = Reader::new("Test", src.lines().map(String::from));
        let peeked = match reader.peek() {
            Some(Ok(inst)) => inst.cmd.clone(),
            _ => panic!("expected an instruction"),
        };
        let advanced = reader.advance().unwrap().unwrap();
        assert_eq!(peeked, advanced.cmd);
        assert_eq!(reader.advance().unwrap().unwrap().cmd, Cmd::Arith(Alu::Add));
    }

    #[test]
    fn reader_reports_position() {
        let src = "push constant 1\nbogus op\n";
        let mut reader = Reader::new("Test", src.lines().map(String::from));
        reader.advance();
        let diag = match reader.advance() {
            Some(Err(diag)) => diag,
            _ => panic!("expected a diagnostic"),
        };
        assert_eq!(diag.unit, "Test");
        assert_eq!(diag.line, 2);
        assert_eq!(diag.raw, "bogus op");
    }
}
