//! Match engine behind XLOOKUP and XMATCH

use std::cmp::Ordering;

use crate::error::EvalResult;
use crate::value::{TwoDEval, ValueEval};
use crate::wildcard::WildcardPattern;
use tabulon_core::CellError;

/// How a lookup value is compared with the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// `0`
    #[default]
    ExactMatch,
    /// `-1`: exact, else the largest candidate below the lookup value
    ExactMatchOrNextSmaller,
    /// `1`: exact, else the smallest candidate above the lookup value
    ExactMatchOrNextLarger,
    /// `2`: text with `*`, `?` and `~` wildcards
    Wildcard,
}

impl MatchMode {
    pub fn from_code(code: i32) -> EvalResult<Self> {
        match code {
            0 => Ok(MatchMode::ExactMatch),
            -1 => Ok(MatchMode::ExactMatchOrNextSmaller),
            1 => Ok(MatchMode::ExactMatchOrNextLarger),
            2 => Ok(MatchMode::Wildcard),
            _ => Err(CellError::Value),
        }
    }
}

/// Order in which candidates are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// `1`: first to last
    #[default]
    IterateForward,
    /// `-1`: last to first
    IterateBackward,
    /// `2`: binary search over data sorted ascending
    BinarySearchForward,
    /// `-2`: binary search over data sorted descending
    BinarySearchBackward,
}

impl SearchMode {
    pub fn from_code(code: i32) -> EvalResult<Self> {
        match code {
            1 => Ok(SearchMode::IterateForward),
            -1 => Ok(SearchMode::IterateBackward),
            2 => Ok(SearchMode::BinarySearchForward),
            -2 => Ok(SearchMode::BinarySearchBackward),
            _ => Err(CellError::Value),
        }
    }

    fn is_binary(self) -> bool {
        matches!(
            self,
            SearchMode::BinarySearchForward | SearchMode::BinarySearchBackward
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Row(usize),
    Column(usize),
}

/// One row or one column of a two-dimensional value
pub struct ValueVector<'v, 'a> {
    grid: &'v dyn TwoDEval<'a>,
    orientation: Orientation,
}

impl<'v, 'a> ValueVector<'v, 'a> {
    pub fn row(grid: &'v dyn TwoDEval<'a>, row: usize) -> Self {
        Self {
            grid,
            orientation: Orientation::Row(row),
        }
    }

    pub fn column(grid: &'v dyn TwoDEval<'a>, col: usize) -> Self {
        Self {
            grid,
            orientation: Orientation::Column(col),
        }
    }

    /// The vector a lookup searches: the only row of a horizontal range, otherwise the
    /// first column
    pub fn for_lookup(grid: &'v dyn TwoDEval<'a>) -> Self {
        if grid.is_row() && grid.width() > 1 {
            Self::row(grid, 0)
        } else {
            Self::column(grid, 0)
        }
    }

    /// Whether the vector runs across a row
    pub fn is_horizontal(&self) -> bool {
        matches!(self.orientation, Orientation::Row(_))
    }

    pub fn size(&self) -> usize {
        match self.orientation {
            Orientation::Row(_) => self.grid.width(),
            Orientation::Column(_) => self.grid.height(),
        }
    }

    pub fn item(&self, index: usize) -> ValueEval<'a> {
        match self.orientation {
            Orientation::Row(row) => self.grid.value(row, index),
            Orientation::Column(col) => self.grid.value(index, col),
        }
    }
}

/// Compares candidates against one lookup value
enum LookupComparer {
    Value(ValueEval<'static>),
    Wildcard(WildcardPattern),
}

impl LookupComparer {
    fn new(lookup: &ValueEval<'_>, match_mode: MatchMode) -> EvalResult<Self> {
        let owned = match lookup {
            ValueEval::Number(n) => ValueEval::Number(*n),
            ValueEval::Boolean(b) => ValueEval::Boolean(*b),
            ValueEval::Text(s) => {
                if match_mode == MatchMode::Wildcard {
                    if let Some(pattern) = WildcardPattern::new(s) {
                        return Ok(LookupComparer::Wildcard(pattern));
                    }
                }
                ValueEval::Text(s.clone())
            }
            ValueEval::Blank | ValueEval::MissingArg => ValueEval::Blank,
            ValueEval::Error(e) => return Err(*e),
            ValueEval::Ref(r) => return Self::new(&r.inner_value(), match_mode),
            ValueEval::Area(_) | ValueEval::Array(_) => return Err(CellError::Value),
        };
        Ok(LookupComparer::Value(owned))
    }

    /// Ordering of `candidate` relative to the lookup value, `None` for a type mismatch
    fn compare(&self, candidate: &ValueEval<'_>) -> Option<Ordering> {
        match self {
            LookupComparer::Wildcard(pattern) => match candidate {
                ValueEval::Text(s) if pattern.matches(s) => Some(Ordering::Equal),
                _ => None,
            },
            LookupComparer::Value(lookup) => match (candidate, lookup) {
                (ValueEval::Number(a), ValueEval::Number(b)) => a.partial_cmp(b),
                (ValueEval::Text(a), ValueEval::Text(b)) => {
                    Some(a.to_lowercase().cmp(&b.to_lowercase()))
                }
                (ValueEval::Boolean(a), ValueEval::Boolean(b)) => Some(a.cmp(b)),
                (ValueEval::Blank, ValueEval::Blank) => Some(Ordering::Equal),
                _ => None,
            },
        }
    }
}

/// Zero-based position of `lookup` in `vector`
///
/// `#N/A` when nothing matches. A wildcard match cannot be combined with a binary search
/// (`#VALUE!`). Binary searches trust that the candidates are sorted in the requested
/// direction; candidates of a different type than the lookup value are skipped.
pub fn xlookup_index_of_value(
    lookup: &ValueEval<'_>,
    vector: &ValueVector<'_, '_>,
    match_mode: MatchMode,
    search_mode: SearchMode,
) -> EvalResult<usize> {
    if match_mode == MatchMode::Wildcard && search_mode.is_binary() {
        return Err(CellError::Value);
    }
    let comparer = LookupComparer::new(lookup, match_mode)?;

    let found = if search_mode.is_binary() {
        binary_search(&comparer, vector, match_mode, search_mode)
    } else {
        linear_search(&comparer, vector, match_mode, search_mode)
    };
    found.ok_or(CellError::Na)
}

fn linear_search(
    comparer: &LookupComparer,
    vector: &ValueVector<'_, '_>,
    match_mode: MatchMode,
    search_mode: SearchMode,
) -> Option<usize> {
    let size = vector.size();
    let indices: Box<dyn Iterator<Item = usize>> = match search_mode {
        SearchMode::IterateBackward => Box::new((0..size).rev()),
        _ => Box::new(0..size),
    };

    // (index, candidate) of the closest approximate match so far
    let mut best: Option<(usize, ValueEval<'_>)> = None;
    for index in indices {
        let candidate = vector.item(index);
        let ordering = match comparer.compare(&candidate) {
            Some(ordering) => ordering,
            None => continue,
        };
        if ordering == Ordering::Equal {
            return Some(index);
        }
        let wanted = match match_mode {
            MatchMode::ExactMatchOrNextSmaller => Ordering::Less,
            MatchMode::ExactMatchOrNextLarger => Ordering::Greater,
            _ => continue,
        };
        if ordering != wanted {
            continue;
        }
        let closer = match &best {
            None => true,
            Some((_, current)) => {
                compare_candidates(&candidate, current) == Some(wanted.reverse())
            }
        };
        if closer {
            best = Some((index, candidate));
        }
    }
    best.map(|(index, _)| index)
}

fn compare_candidates(a: &ValueEval<'_>, b: &ValueEval<'_>) -> Option<Ordering> {
    match (a, b) {
        (ValueEval::Number(x), ValueEval::Number(y)) => x.partial_cmp(y),
        (ValueEval::Text(x), ValueEval::Text(y)) => Some(x.to_lowercase().cmp(&y.to_lowercase())),
        (ValueEval::Boolean(x), ValueEval::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn binary_search(
    comparer: &LookupComparer,
    vector: &ValueVector<'_, '_>,
    match_mode: MatchMode,
    search_mode: SearchMode,
) -> Option<usize> {
    let descending = search_mode == SearchMode::BinarySearchBackward;
    let candidates: Vec<(usize, Ordering)> = (0..vector.size())
        .filter_map(|index| {
            comparer
                .compare(&vector.item(index))
                .map(|ordering| (index, ordering))
        })
        .collect();

    let (mut low, mut high) = (0, candidates.len());
    while low < high {
        let mid = low + (high - low) / 2;
        let (index, ordering) = candidates[mid];
        let ordering = if descending {
            ordering.reverse()
        } else {
            ordering
        };
        match ordering {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
            Ordering::Equal => return Some(index),
        }
    }

    // candidates[..low] sort before the lookup value, candidates[low..] after it
    let before = low.checked_sub(1).map(|i| candidates[i].0);
    let after = candidates.get(low).map(|c| c.0);
    match (match_mode, descending) {
        (MatchMode::ExactMatchOrNextSmaller, false) => before,
        (MatchMode::ExactMatchOrNextSmaller, true) => after,
        (MatchMode::ExactMatchOrNextLarger, false) => after,
        (MatchMode::ExactMatchOrNextLarger, true) => before,
        _ => None,
    }
}
