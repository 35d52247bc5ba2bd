use crate::codegen::CodeGen;
use crate::error::Diag;
use crate::label::UnitLabels;
use crate::parser::Reader;

/// Orchestrates one translation run: the one-time bootstrap prefix,
/// then each unit's instructions in source order.
#[derive(Debug)]
pub struct Translator {
    gen: CodeGen,
}

impl Translator {
    pub fn new(bootstrap: bool, annotate: bool) -> Self {
        let mut gen = CodeGen::new(annotate);
        if bootstrap {
            gen.bootstrap();
        }
        Translator { gen }
    }

    /// Translate one unit. The unit name namespaces its `static`
    /// variables and labels, so the generator namespace is switched
    /// before the first instruction. On error every diagnostic the unit
    /// produced is returned and the output must be discarded.
    pub fn translate<I>(&mut self, unit: &str, lines: I) -> Result<(), Vec<Diag>>
    where
        I: IntoIterator<Item = String>,
    {
        self.gen.set_unit(unit);
        let mut reader = Reader::new(unit, lines.into_iter());
        let mut labels = UnitLabels::new(unit);
        let mut diags = vec![];
        while let Some(next) = reader.advance() {
            match next {
                Ok(inst) => {
                    if let Some(diag) = labels.scan(&inst) {
                        diags.push(diag);
                    }
                    // generation stops at the first fault; reading
                    // continues so later faults are still reported
                    if diags.is_empty() {
                        self.gen.gen(&inst.cmd);
                    }
                }
                Err(diag) => diags.push(diag),
            }
        }
        diags.extend(labels.finish());
        if diags.is_empty() {
            Ok(())
        } else {
            Err(diags)
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        self.gen.into_lines()
    }
}
