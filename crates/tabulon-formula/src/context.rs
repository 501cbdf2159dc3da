//! Per-call evaluation context

/// Whether the caller wants one value or a whole array back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Ordinary cell formula; multi-cell results collapse to one value
    #[default]
    SingleValue,
    /// Array formula or spilling context; functions may return areas and arrays
    Array,
}

/// Location of the formula cell being evaluated plus the result shape it expects
///
/// Created fresh for every formula-cell evaluation and passed by reference through the
/// call tree. The coordinate is what implicit intersection resolves against when a
/// multi-cell area is used where a scalar is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationEvaluationContext {
    sheet: usize,
    row: u32,
    col: u16,
    mode: EvaluationMode,
}

impl OperationEvaluationContext {
    /// Create a context for the cell at `(row, col)` on `sheet`
    pub fn new(sheet: usize, row: u32, col: u16) -> Self {
        Self {
            sheet,
            row,
            col,
            mode: EvaluationMode::SingleValue,
        }
    }

    /// A context at A1 of the first sheet (for testing)
    pub fn simple() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn sheet_index(&self) -> usize {
        self.sheet
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn column(&self) -> u16 {
        self.col
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    pub fn is_single_value(&self) -> bool {
        self.mode == EvaluationMode::SingleValue
    }
}

impl Default for OperationEvaluationContext {
    fn default() -> Self {
        Self::simple()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_defaults_to_single_value() {
        let ctx = OperationEvaluationContext::new(2, 9, 4);
        assert_eq!((ctx.sheet_index(), ctx.row(), ctx.column()), (2, 9, 4));
        assert!(ctx.is_single_value());

        let array = ctx.with_mode(EvaluationMode::Array);
        assert_eq!(array.mode(), EvaluationMode::Array);
        assert!(!array.is_single_value());
        assert_eq!(OperationEvaluationContext::default(), OperationEvaluationContext::simple());
    }
}
