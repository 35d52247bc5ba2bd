use crate::error::{Diag, Error};
use crate::parser::{Cmd, Inst};
use indexmap::IndexMap;

/// Streaming label bookkeeping for one unit.
///
/// `goto`/`if-goto` may name a label defined further down, so uses are
/// only checked against definitions once the whole unit has been read.
#[derive(Debug)]
pub struct UnitLabels {
    unit: String,
    defs: IndexMap<String, usize>,
    uses: Vec<(String, usize, String)>,
}

impl UnitLabels {
    pub fn new(unit: &str) -> Self {
        UnitLabels {
            unit: unit.to_string(),
            defs: IndexMap::new(),
            uses: Vec::new(),
        }
    }

    /// Record a label definition or use. A re-defined label is reported
    /// immediately: it would break program-wide label uniqueness.
    pub fn scan(&mut self, inst: &Inst) -> Option<Diag> {
        match &inst.cmd {
            Cmd::Label(name) => {
                if self.defs.insert(name.clone(), inst.line).is_some() {
                    return Some(Diag::new(
                        Error::RedefinedLabel(name.clone()),
                        &self.unit,
                        inst.line,
                        &inst.raw,
                    ));
                }
            }
            Cmd::Goto(name) | Cmd::IfGoto(name) => {
                self.uses.push((name.clone(), inst.line, inst.raw.clone()));
            }
            _ => {}
        }
        None
    }

    /// Check every `goto`/`if-goto` target against the definitions.
    pub fn finish(self) -> Vec<Diag> {
        let UnitLabels { unit, defs, uses } = self;
        let mut diags = vec![];
        for (name, line, raw) in uses {
            if !defs.contains_key(&name) {
                diags.push(Diag::new(Error::UndefinedLabel(name), &unit, line, &raw));
            }
        }
        diags
    }
}
