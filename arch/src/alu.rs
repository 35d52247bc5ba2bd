use strum::{Display, EnumString};

/// Stack arithmetic/logic operators, the `Category::Arithmetic` subset
/// of the instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Alu {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl Alu {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown operator: {s}")),
        }
    }

    /// Unary operators rewrite the top of the stack in place; the rest
    /// consume one operand.
    pub fn is_unary(self) -> bool {
        matches!(self, Alu::Neg | Alu::Not)
    }
}

#[test]
fn test() {
    assert_eq!(Alu::parse("sub"), Ok(Alu::Sub));
    assert!(Alu::parse("push").is_err());
    assert!(Alu::Not.is_unary());
    assert!(!Alu::Eq.is_unary());
}
