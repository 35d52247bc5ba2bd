use crate::parser::Cmd;
use arch::alu::Alu;
use arch::reg::Reg;
use arch::seg::{Base, Segment};
use arch::{ENTRY, STACK_BASE};

/// Emits Hack assembly for classified VM commands.
///
/// Owns all generator state: the comparison-label and call-site
/// counters, the emitted-instruction counter, and the name of the unit
/// currently being translated. Two generators never interfere.
#[derive(Debug)]
pub struct CodeGen {
    out: Vec<String>,
    unit: String,
    bool_count: usize,
    call_count: usize,
    line_count: usize,
    annotate: bool,
}

impl CodeGen {
    pub fn new(annotate: bool) -> Self {
        CodeGen {
            out: Vec::new(),
            unit: String::new(),
            bool_count: 0,
            call_count: 0,
            line_count: 0,
            annotate,
        }
    }

    /// Switch the static-variable and label namespace to a new unit.
    /// Must happen before the first command of that unit is generated.
    pub fn set_unit(&mut self, unit: &str) {
        self.unit = unit.to_string();
        if self.annotate {
            self.out.push("//////".to_string());
            self.out.push(format!("// {}", unit));
        }
    }

    /// SP = 256, then the full call protocol into `Sys.init`.
    pub fn bootstrap(&mut self) {
        self.code(&format!("@{}", STACK_BASE));
        self.code("D=A");
        self.code("@SP");
        self.code("M=D");
        self.gen_call(ENTRY, 0);
    }

    pub fn gen(&mut self, cmd: &Cmd) {
        if self.annotate {
            self.out.push(format!("// {}", cmd));
        }
        match cmd {
            Cmd::Arith(alu) => self.gen_arith(*alu),
            Cmd::Push(seg, idx) => self.gen_push(*seg, *idx),
            Cmd::Pop(seg, idx) => self.gen_pop(*seg, *idx),
            Cmd::Label(name) => self.label(&format!("{}${}", self.unit, name)),
            Cmd::Goto(name) => {
                self.code(&format!("@{}${}", self.unit, name));
                self.code("0;JMP");
            }
            Cmd::IfGoto(name) => {
                self.pop();
                self.code("D=M");
                self.code(&format!("@{}${}", self.unit, name));
                self.code("D;JNE");
            }
            Cmd::Function(name, locals) => {
                self.label(name);
                for _ in 0..*locals {
                    self.code("D=0");
                    self.push_d();
                }
            }
            Cmd::Call(name, args) => self.gen_call(name, *args),
            Cmd::Return => self.gen_return(),
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        self.out
    }

    // ------------------------------------------------------------------------
    // Arithmetic

    fn gen_arith(&mut self, alu: Alu) {
        use Alu::*;
        if !alu.is_unary() {
            self.pop();
            self.code("D=M");
        }
        self.pop();
        match alu {
            Add => self.code("M=D+M"),
            Sub => self.code("M=M-D"),
            And => self.code("M=D&M"),
            Or => self.code("M=D|M"),
            Neg => self.code("M=-M"),
            Not => self.code("M=!M"),
            Eq => self.compare("JEQ"),
            Lt => self.compare("JLT"),
            Gt => self.compare("JGT"),
        }
        self.inc_sp();
    }

    /// `x <op> y` with y in D and x at the top of the stack. The target
    /// has no compare-to-boolean instruction, so branch on x-y through
    /// a generated label pair and store a sentinel: -1 true, 0 false.
    fn compare(&mut self, jump: &str) {
        let n = self.bool_count;
        self.bool_count += 1;
        self.code("D=M-D");
        self.code(&format!("@TRUE_{}", n));
        self.code(&format!("D;{}", jump));
        self.at_sp();
        self.code("M=0");
        self.code(&format!("@END_{}", n));
        self.code("0;JMP");
        self.label(&format!("TRUE_{}", n));
        self.at_sp();
        self.code("M=-1");
        self.label(&format!("END_{}", n));
    }

    // ------------------------------------------------------------------------
    // Memory access

    fn gen_push(&mut self, seg: Segment, idx: u16) {
        self.resolve(seg, idx);
        match seg.base() {
            Base::Literal => self.code("D=A"),
            _ => self.code("D=M"),
        }
        self.push_d();
    }

    /// The destination address is stashed in R13 before the pop: both
    /// the address computation and the popped value pass through D, and
    /// there is only one D.
    fn gen_pop(&mut self, seg: Segment, idx: u16) {
        self.resolve(seg, idx);
        self.code("D=A");
        self.code(&format!("@{}", Reg::R13));
        self.code("M=D");
        self.pop();
        self.code("D=M");
        self.code(&format!("@{}", Reg::R13));
        self.code("A=M");
        self.code("M=D");
    }

    /// Leave the segment/index address (the literal itself, for
    /// `constant`) in A.
    fn resolve(&mut self, seg: Segment, idx: u16) {
        match seg.base() {
            Base::Literal => self.code(&format!("@{}", idx)),
            Base::Indirect(reg) => {
                self.code(&format!("@{}", reg));
                self.code("D=M");
                self.code(&format!("@{}", idx));
                self.code("A=D+A");
            }
            Base::Direct(base) => self.code(&format!("@R{}", base + idx)),
            Base::Unit => self.code(&format!("@{}.{}", self.unit, idx)),
        }
    }

    // ------------------------------------------------------------------------
    // Call / Return

    fn gen_call(&mut self, name: &str, args: u16) {
        let ret = format!("{}RES{}", name, self.call_count);
        self.call_count += 1;

        // push return address, then the caller's LCL ARG THIS THAT
        self.code(&format!("@{}", ret));
        self.code("D=A");
        self.push_d();
        for reg in [Reg::LCL, Reg::ARG, Reg::THIS, Reg::THAT] {
            self.code(&format!("@{}", reg));
            self.code("D=M");
            self.push_d();
        }

        // LCL = SP
        self.code("@SP");
        self.code("D=M");
        self.code(&format!("@{}", Reg::LCL));
        self.code("M=D");

        // ARG = SP - args - 5, pointing at the first pushed argument
        self.code("@SP");
        self.code("D=M");
        self.code(&format!("@{}", args + 5));
        self.code("D=D-A");
        self.code(&format!("@{}", Reg::ARG));
        self.code("M=D");

        self.code(&format!("@{}", name));
        self.code("0;JMP");
        self.label(&ret);
    }

    fn gen_return(&mut self) {
        let frame = Reg::R13;
        let ret = Reg::R14;

        // frame = LCL; LCL is about to be restored, so keep a copy
        self.code(&format!("@{}", Reg::LCL));
        self.code("D=M");
        self.code(&format!("@{}", frame));
        self.code("M=D");

        // ret = *(frame - 5); with zero arguments the return-value
        // store below would overwrite this slot
        self.code(&format!("@{}", frame));
        self.code("D=M");
        self.code("@5");
        self.code("D=D-A");
        self.code("A=D");
        self.code("D=M");
        self.code(&format!("@{}", ret));
        self.code("M=D");

        // *ARG = pop(); the argument-0 slot becomes the return value
        self.pop();
        self.code("D=M");
        self.code(&format!("@{}", Reg::ARG));
        self.code("A=M");
        self.code("M=D");

        // SP = ARG + 1
        self.code(&format!("@{}", Reg::ARG));
        self.code("D=M");
        self.code("@SP");
        self.code("M=D+1");

        // THAT = *(frame-1), THIS = *(frame-2), ARG = *(frame-3),
        // LCL = *(frame-4)
        for (offset, reg) in [(1, Reg::THAT), (2, Reg::THIS), (3, Reg::ARG), (4, Reg::LCL)] {
            self.code(&format!("@{}", frame));
            self.code("D=M");
            self.code(&format!("@{}", offset));
            self.code("D=D-A");
            self.code("A=D");
            self.code("D=M");
            self.code(&format!("@{}", reg));
            self.code("M=D");
        }

        self.code(&format!("@{}", ret));
        self.code("A=M");
        self.code("0;JMP");
    }

    // ------------------------------------------------------------------------
    // Emit

    fn code(&mut self, s: &str) {
        if self.annotate {
            self.out.push(format!("{} // {}", s, self.line_count));
        } else {
            self.out.push(s.to_string());
        }
        self.line_count += 1;
    }

    fn label(&mut self, name: &str) {
        self.out.push(format!("({})", name));
    }

    fn push_d(&mut self) {
        self.at_sp();
        self.code("M=D");
        self.inc_sp();
    }

    /// SP -= 1 and point A at the popped slot.
    fn pop(&mut self) {
        self.code("@SP");
        self.code("M=M-1");
        self.code("A=M");
    }

    fn inc_sp(&mut self) {
        self.code("@SP");
        self.code("M=M+1");
    }

    fn at_sp(&mut self) {
        self.code("@SP");
        self.code("A=M");
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(unit: &str, cmds: &[Cmd]) -> Vec<String> {
        let mut codegen = CodeGen::new(false);
        codegen.set_unit(unit);
        for cmd in cmds {
            codegen.gen(cmd);
        }
        codegen.into_lines()
    }

    #[test]
    fn push_constant() {
        let lines = gen("Test", &[Cmd::Push(Segment::Constant, 7)]);
        assert_eq!(
            lines,
            ["@7", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]
        );
    }

    #[test]
    fn pop_local() {
        let lines = gen("Test", &[Cmd::Pop(Segment::Local, 3)]);
        assert_eq!(
            lines,
            [
                "@LCL", "D=M", "@3", "A=D+A", "D=A", "@R13", "M=D", "@SP", "M=M-1", "A=M", "D=M",
                "@R13", "A=M", "M=D"
            ]
        );
    }

    #[test]
    fn push_temp_uses_fixed_base() {
        let lines = gen("Test", &[Cmd::Push(Segment::Temp, 2)]);
        assert_eq!(lines[0], "@R7");
        let lines = gen("Test", &[Cmd::Push(Segment::Pointer, 1)]);
        assert_eq!(lines[0], "@R4");
    }

    #[test]
    fn static_is_namespaced_per_unit() {
        let lines = gen("Alpha", &[Cmd::Push(Segment::Static, 2)]);
        assert_eq!(lines[0], "@Alpha.2");
        let lines = gen("Beta", &[Cmd::Pop(Segment::Static, 2)]);
        assert_eq!(lines[0], "@Beta.2");
    }

    #[test]
    fn comparison_labels_count_up() {
        let lines = gen("Test", &[Cmd::Arith(Alu::Eq), Cmd::Arith(Alu::Gt)]);
        assert!(lines.contains(&"@TRUE_0".to_string()));
        assert!(lines.contains(&"(END_0)".to_string()));
        assert!(lines.contains(&"@TRUE_1".to_string()));
        assert!(lines.contains(&"(END_1)".to_string()));
        assert!(lines.contains(&"D;JEQ".to_string()));
        assert!(lines.contains(&"D;JGT".to_string()));
    }

    #[test]
    fn labels_are_namespaced_per_unit() {
        let lines = gen("Alpha", &[Cmd::Label("LOOP".to_string()), Cmd::Goto("LOOP".to_string())]);
        assert_eq!(lines[0], "(Alpha$LOOP)");
        assert_eq!(lines[1], "@Alpha$LOOP");
        assert_eq!(lines[2], "0;JMP");
    }

    #[test]
    fn if_goto_pops_and_branches_on_nonzero() {
        let lines = gen("Test", &[Cmd::IfGoto("END".to_string())]);
        assert_eq!(
            lines,
            ["@SP", "M=M-1", "A=M", "D=M", "@Test$END", "D;JNE"]
        );
    }

    #[test]
    fn function_entry_is_global_and_inits_locals() {
        let lines = gen("Test", &[Cmd::Function("Math.max".to_string(), 2)]);
        assert_eq!(lines[0], "(Math.max)");
        // two zero-initialized local slots
        assert_eq!(lines[1..].iter().filter(|l| *l == "D=0").count(), 2);
    }

    #[test]
    fn call_labels_count_up_per_site() {
        let lines = gen(
            "Test",
            &[
                Cmd::Call("Math.max".to_string(), 2),
                Cmd::Call("Math.max".to_string(), 2),
            ],
        );
        assert_eq!(lines[0], "@Math.maxRES0");
        assert!(lines.contains(&"(Math.maxRES0)".to_string()));
        assert!(lines.contains(&"@Math.maxRES1".to_string()));
        assert!(lines.contains(&"(Math.maxRES1)".to_string()));
        // ARG = SP - 2 - 5
        assert!(lines.contains(&"@7".to_string()));
    }

    #[test]
    fn bootstrap_prefix_sets_sp_first() {
        let mut codegen = CodeGen::new(false);
        codegen.bootstrap();
        let lines = codegen.into_lines();
        assert_eq!(&lines[0..4], ["@256", "D=A", "@SP", "M=D"]);
        assert_eq!(lines[4], "@Sys.initRES0");
    }

    #[test]
    fn annotation_is_non_semantic() {
        let mut codegen = CodeGen::new(true);
        codegen.set_unit("Test");
        codegen.gen(&Cmd::Push(Segment::Constant, 7));
        let lines = codegen.into_lines();
        assert_eq!(lines[0], "//////");
        assert_eq!(lines[1], "// Test");
        assert_eq!(lines[2], "// push constant 7");
        assert_eq!(lines[3], "@7 // 0");
        let stripped: Vec<&str> = lines
            .iter()
            .map(|l| l.split("//").next().unwrap_or("").trim())
            .filter(|l| !l.is_empty())
            .collect();
        assert_eq!(stripped, ["@7", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]);
    }
}
