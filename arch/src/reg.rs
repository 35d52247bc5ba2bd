use strum::{Display, EnumString};

/// Memory-mapped special registers.
///
/// SP and the four frame registers live at RAM[0..5]; R13-R15 are the
/// general-purpose scratch cells the generated code may clobber freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
pub enum Reg {
    SP,
    LCL,
    ARG,
    THIS,
    THAT,
    R13,
    R14,
    R15,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }
}

#[test]
fn test() {
    assert_eq!(Reg::SP.to_string(), "SP");
    assert_eq!(Reg::R13.to_string(), "R13");
    assert_eq!(Reg::parse("lcl"), Ok(Reg::LCL));
    assert!(Reg::parse("hoge").is_err());
}
