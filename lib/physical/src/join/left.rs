use crate::cursor::CursorState;
use crate::filter::{EvaluationContext, Filter};
use rdf_tuples_common::{check_column, check_prefix, close_all, BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesError, TuplesResult, Variable, UNBOUND};
use std::any::Any;
use std::sync::Arc;

const NAME: &str = "LeftJoin";

/// The shape of a left join, shared by all clones.
#[derive(Debug)]
struct LeftJoinLayout {
    variables: Vec<Variable>,
    /// The number of columns of the standard operand.
    standard_arity: usize,
    /// For each leading optional column, the standard column that holds the same variable.
    shared: Vec<usize>,
    /// For each leading optional column, whether the optional operand may leave it unbound.
    optional_ever_unbound: Vec<bool>,
    /// Whether the rows keep the order of the standard operand.
    keeps_order: bool,
}

/// The rows of a standard operand, each extended by the matching rows of an optional operand.
///
/// The leading columns of the optional operand must be exactly the variables that it shares with
/// the standard operand. For each standard row, the optional operand is positioned with the
/// shared values as prefix. Every optional row that agrees with the standard row and passes the
/// filter yields one row. A standard row without such a match is emitted once, with the columns
/// of the optional operand unbound.
///
/// The output variables are the standard variables followed by the remaining optional variables.
/// An unbound standard value matches every optional value and is replaced by it.
#[derive(Debug)]
pub struct LeftJoin {
    /// The operands, the standard operand first.
    operands: [BoxedTuples; 2],
    filter: Option<Arc<dyn Filter>>,
    layout: Arc<LeftJoinLayout>,
    state: CursorState,
    /// The prefix given to `before_first`.
    prefix: Vec<NodeId>,
    /// The seek prefix of the optional operand for the current standard row.
    seek: Vec<NodeId>,
    /// Whether the optional operand is positioned for the current standard row.
    on_standard_row: bool,
    /// Whether the current standard row had a match.
    standard_matched: bool,
    /// Whether the current row includes the current optional row.
    matched: bool,
    closed: bool,
}

impl LeftJoin {
    /// Creates a new [LeftJoin]. The `filter` is tested on the combined rows.
    pub fn try_new(
        standard: BoxedTuples,
        optional: BoxedTuples,
        filter: Option<Arc<dyn Filter>>,
    ) -> TuplesResult<Self> {
        let common = optional
            .variables()
            .iter()
            .filter(|variable| standard.variables().contains(variable))
            .count();

        let mut shared = Vec::with_capacity(common);
        let mut optional_ever_unbound = Vec::with_capacity(common);
        let mut variables = standard.variables().to_vec();
        for (column, variable) in optional.variables().iter().enumerate() {
            match standard.column_index(variable) {
                Ok(standard_column) if column < common => {
                    shared.push(standard_column);
                    optional_ever_unbound.push(optional.is_column_ever_unbound(column)?);
                }
                Ok(_) => {
                    return Err(TuplesError::invalid_argument(format!(
                        "Optional operand is not sorted correctly: shared variable {variable} is not a leading column"
                    )))
                }
                Err(_) => variables.push(variable.clone()),
            }
        }

        let mut keeps_order = true;
        for column in &shared {
            keeps_order &= !standard.is_column_ever_unbound(*column)?;
        }

        let layout = LeftJoinLayout {
            variables,
            standard_arity: standard.number_of_variables(),
            shared,
            optional_ever_unbound,
            keeps_order,
        };
        Ok(Self {
            operands: [standard, optional],
            filter,
            layout: Arc::new(layout),
            state: CursorState::Unpositioned,
            prefix: Vec::new(),
            seek: Vec::with_capacity(common),
            on_standard_row: false,
            standard_matched: false,
            matched: false,
            closed: false,
        })
    }

    pub fn filter(&self) -> Option<&dyn Filter> {
        self.filter.as_deref()
    }

    /// Positions the optional operand on the shared values of the current standard row.
    ///
    /// The seek prefix ends at the first value that is unbound or that the optional operand may
    /// leave unbound.
    fn seek_optional(&mut self) -> TuplesResult<()> {
        let [standard, optional] = &mut self.operands;
        self.seek.clear();
        for (optional_column, standard_column) in self.layout.shared.iter().enumerate() {
            let value = standard
                .column_value(*standard_column)
                .map_err(|error| error.in_operand(NAME, 0))?;
            if value == UNBOUND || self.layout.optional_ever_unbound[optional_column] {
                break;
            }
            self.seek.push(value);
        }
        optional
            .before_first(&self.seek, 0)
            .map_err(|error| error.in_operand(NAME, 1))
    }

    /// Checks the shared columns that were not part of the seek prefix. A column conflicts only
    /// if both values are bound and differ.
    fn shared_suffix_matches(&self) -> TuplesResult<bool> {
        let shared = self.layout.shared.iter().enumerate().skip(self.seek.len());
        for (optional_column, standard_column) in shared {
            let expected = self.operands[0]
                .column_value(*standard_column)
                .map_err(|error| error.in_operand(NAME, 0))?;
            if expected == UNBOUND {
                continue;
            }
            let value = self.operands[1]
                .column_value(optional_column)
                .map_err(|error| error.in_operand(NAME, 1))?;
            if value != UNBOUND && value != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Checks the output columns of the caller's prefix that the standard operand does not cover.
    fn matches_prefix(&self) -> TuplesResult<bool> {
        let extra = self.prefix.iter().enumerate().skip(self.layout.standard_arity);
        for (column, expected) in extra {
            let value = self.joined_value(column)?;
            if value != UNBOUND && value != *expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Advances the optional operand to the next row that matches the current standard row.
    fn next_match(&mut self) -> TuplesResult<bool> {
        self.matched = true;
        while self.operands[1]
            .next()
            .map_err(|error| error.in_operand(NAME, 1))?
        {
            if !self.shared_suffix_matches()? || !self.matches_prefix()? {
                continue;
            }
            let passes = match &self.filter {
                Some(filter) => filter
                    .test(&JoinedRow { join: &*self })
                    .map_err(|error| TuplesError::Filter(Box::new(error)))?,
                None => true,
            };
            if passes {
                return Ok(true);
            }
        }
        self.matched = false;
        Ok(false)
    }

    /// Returns the value of output `column` in the combined row, without checking the cursor.
    fn joined_value(&self, column: usize) -> TuplesResult<NodeId> {
        let standard_arity = self.layout.standard_arity;
        if column >= standard_arity {
            if !self.matched {
                return Ok(UNBOUND);
            }
            let optional_column = self.layout.shared.len() + column - standard_arity;
            return self.operands[1]
                .column_value(optional_column)
                .map_err(|error| error.in_operand(NAME, 1));
        }

        let value = self.operands[0]
            .column_value(column)
            .map_err(|error| error.in_operand(NAME, 0))?;
        if value != UNBOUND || !self.matched {
            return Ok(value);
        }
        match self.layout.shared.iter().position(|shared| *shared == column) {
            Some(optional_column) => self.operands[1]
                .column_value(optional_column)
                .map_err(|error| error.in_operand(NAME, 1)),
            None => Ok(UNBOUND),
        }
    }
}

/// Resolves variables against the combined row of a [LeftJoin].
struct JoinedRow<'join> {
    join: &'join LeftJoin,
}

impl EvaluationContext for JoinedRow<'_> {
    fn value(&self, variable: &Variable) -> TuplesResult<NodeId> {
        let column = self.join.column_index(variable)?;
        self.join.joined_value(column)
    }
}

impl Tuples for LeftJoin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.layout.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.layout.variables.len())?;
        let standard_prefix = &prefix[..prefix.len().min(self.layout.standard_arity)];
        self.operands[0]
            .before_first(standard_prefix, suffix_truncation)
            .map_err(|error| error.in_operand(NAME, 0))?;
        self.prefix.clear();
        self.prefix.extend_from_slice(prefix);
        self.on_standard_row = false;
        self.matched = false;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        loop {
            if self.on_standard_row {
                if self.next_match()? {
                    self.standard_matched = true;
                    self.state = CursorState::OnRow;
                    return Ok(true);
                }
                self.on_standard_row = false;
                if !self.standard_matched {
                    self.state = CursorState::OnRow;
                    return Ok(true);
                }
            }

            let has_row = self.operands[0]
                .next()
                .map_err(|error| error.in_operand(NAME, 0))?;
            if !has_row {
                self.matched = false;
                self.state = CursorState::Exhausted;
                return Ok(false);
            }
            self.seek_optional()?;
            self.on_standard_row = true;
            self.standard_matched = false;
        }
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        check_column(column, self.layout.variables.len())?;
        self.joined_value(column)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        let standard = self.operands[0].row_upper_bound()?;
        let optional = self.operands[1].row_upper_bound()?;
        Ok(standard.saturating_mul(optional.max(1)))
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.layout.variables.len())?;
        if column < self.layout.standard_arity {
            self.operands[0].is_column_ever_unbound(column)
        } else {
            Ok(true)
        }
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(self.operands[0].has_no_duplicates()? && self.operands[1].has_no_duplicates()?)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        if self.layout.keeps_order {
            self.operands[0].comparator()
        } else {
            None
        }
    }

    fn is_materialized(&self) -> bool {
        false
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        self.operands.iter().map(AsRef::as_ref).collect()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            operands: [self.operands[0].duplicate(), self.operands[1].duplicate()],
            filter: self.filter.clone(),
            layout: Arc::clone(&self.layout),
            state: self.state,
            prefix: self.prefix.clone(),
            seek: self.seek.clone(),
            on_standard_row: self.on_standard_row,
            standard_matched: self.standard_matched,
            matched: self.matched,
            closed: self.closed,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        close_all(&mut self.operands)
    }
}
