use strum::{Display, EnumString};

/// The fixed VM instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OpKind {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    Push,
    Pop,
    Label,
    Goto,
    #[strum(serialize = "if-goto")]
    IfGoto,
    Function,
    Call,
    Return,
}

/// Instruction category, fully determined by the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Arithmetic,
    MemoryAccess,
    Branch,
    Function,
    Return,
}

impl OpKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown operation: {s}")),
        }
    }

    pub fn category(self) -> Category {
        use OpKind::*;
        match self {
            Add | Sub | Neg | Eq | Gt | Lt | And | Or | Not => Category::Arithmetic,
            Push | Pop => Category::MemoryAccess,
            Label | Goto | IfGoto => Category::Branch,
            Function | Call => Category::Function,
            Return => Category::Return,
        }
    }
}

#[test]
fn test() {
    assert_eq!(OpKind::parse("add"), Ok(OpKind::Add));
    assert_eq!(OpKind::parse("if-goto"), Ok(OpKind::IfGoto));
    assert_eq!(OpKind::parse("PUSH"), Ok(OpKind::Push));
    assert!(OpKind::parse("hoge").is_err());
    assert_eq!(OpKind::Gt.category(), Category::Arithmetic);
    assert_eq!(OpKind::Pop.category(), Category::MemoryAccess);
    assert_eq!(OpKind::IfGoto.to_string(), "if-goto");
}
