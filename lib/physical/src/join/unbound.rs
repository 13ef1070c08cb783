use crate::cursor::CursorState;
use rdf_tuples_common::{check_column, check_prefix, close_all, BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesError, TuplesResult, Variable, UNBOUND};
use std::any::Any;
use std::sync::Arc;

const NAME: &str = "UnboundJoin";

/// Where an operand column obtains the value used to seek into the operand.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BindingSource {
    /// The operand introduces the variable. The value comes from the caller's prefix at the
    /// given output column, if the prefix is long enough.
    Prefix(usize),
    /// Operands to the left bind the variable at the given output column. The first value that is
    /// not [UNBOUND] wins. If all of them are unbound, the caller's prefix supplies the value.
    Left(usize, Vec<(usize, usize)>),
}

/// The shape of a join, shared by all clones.
#[derive(Debug)]
struct JoinLayout {
    variables: Vec<Variable>,
    /// For each output column, the operand and operand column of the leftmost occurrence.
    primaries: Vec<(usize, usize)>,
    /// For each output column, the later occurrences, read when the primary value is unbound.
    fallbacks: Vec<Vec<(usize, usize)>>,
    /// For each operand, the source of each of its columns.
    sources: Vec<Vec<BindingSource>>,
    /// For each operand, whether each of its columns may be unbound.
    operand_ever_unbound: Vec<Vec<bool>>,
    /// For each output column, whether it may be unbound.
    ever_unbound: Vec<bool>,
}

impl JoinLayout {
    fn try_new(operands: &[BoxedTuples]) -> TuplesResult<Self> {
        let mut variables: Vec<Variable> = Vec::new();
        let mut occurrences: Vec<Vec<(usize, usize)>> = Vec::new();
        let mut sources = Vec::with_capacity(operands.len());
        let mut operand_ever_unbound = Vec::with_capacity(operands.len());

        for (operand_index, operand) in operands.iter().enumerate() {
            let mut operand_sources = Vec::with_capacity(operand.number_of_variables());
            let mut operand_unbound = Vec::with_capacity(operand.number_of_variables());
            for (column, variable) in operand.variables().iter().enumerate() {
                match variables.iter().position(|known| known == variable) {
                    Some(output) => {
                        operand_sources
                            .push(BindingSource::Left(output, occurrences[output].clone()));
                        occurrences[output].push((operand_index, column));
                    }
                    None => {
                        operand_sources.push(BindingSource::Prefix(variables.len()));
                        variables.push(variable.clone());
                        occurrences.push(vec![(operand_index, column)]);
                    }
                }
                operand_unbound.push(operand.is_column_ever_unbound(column)?);
            }
            sources.push(operand_sources);
            operand_ever_unbound.push(operand_unbound);
        }

        let primaries = occurrences.iter().map(|occurrence| occurrence[0]).collect();
        let fallbacks = occurrences
            .iter()
            .map(|occurrence| occurrence[1..].to_vec())
            .collect();
        let ever_unbound = occurrences
            .iter()
            .map(|occurrence| {
                occurrence
                    .iter()
                    .all(|(operand, column)| operand_ever_unbound[*operand][*column])
            })
            .collect();

        Ok(Self {
            variables,
            primaries,
            fallbacks,
            sources,
            operand_ever_unbound,
            ever_unbound,
        })
    }
}

/// A natural join of any number of operands in which [UNBOUND] matches every value.
///
/// The operands are evaluated as nested loops from left to right. Each operand is positioned with
/// a prefix seek whose values come from the caller's prefix and from the operands to its left.
/// The prefix ends at the first column that has no value or that the operand may leave unbound.
/// The remaining columns of the operand are checked against the bindings after each row.
///
/// The output variables are the union of the operands' variables in order of first occurrence.
/// If the value of the leftmost occurrence of a variable is unbound, the value is taken from the
/// next occurrence to the right that is bound. A variable that no operand binds takes the value
/// of the caller's prefix, so every row starts with the prefix.
#[derive(Debug)]
pub struct UnboundJoin {
    operands: Vec<BoxedTuples>,
    layout: Arc<JoinLayout>,
    state: CursorState,
    /// The prefix given to `before_first`.
    prefix: Vec<NodeId>,
    /// Whether the next call to `next` is the first one after positioning.
    first_row_pending: bool,
    /// For each operand, the current value bound to each of its columns.
    bindings: Vec<Vec<NodeId>>,
    /// For each operand, the number of leading bindings used as seek prefix.
    prefix_lengths: Vec<usize>,
    closed: bool,
}

impl UnboundJoin {
    /// Creates a new [UnboundJoin] over `operands`, joined in the given order.
    ///
    /// Returns an error if `operands` is empty.
    pub fn try_new(operands: Vec<BoxedTuples>) -> TuplesResult<Self> {
        if operands.is_empty() {
            return Err(TuplesError::invalid_argument(
                "A join requires at least one operand",
            ));
        }

        let layout = JoinLayout::try_new(&operands)?;
        let bindings = operands
            .iter()
            .map(|operand| vec![UNBOUND; operand.number_of_variables()])
            .collect();
        let prefix_lengths = vec![0; operands.len()];
        Ok(Self {
            operands,
            layout: Arc::new(layout),
            state: CursorState::Unpositioned,
            prefix: Vec::new(),
            first_row_pending: false,
            bindings,
            prefix_lengths,
            closed: false,
        })
    }

    /// Returns the operands in join order.
    pub fn join_operands(&self) -> &[BoxedTuples] {
        &self.operands
    }

    /// Returns the value that the caller's prefix requires for output `column`.
    fn prefix_value(&self, column: usize) -> NodeId {
        self.prefix.get(column).copied().unwrap_or(UNBOUND)
    }

    /// Computes the bindings of operand `index` from the caller's prefix and the current rows of
    /// the operands to its left.
    fn update_operand_prefix(&mut self, index: usize) -> TuplesResult<()> {
        let mut prefix_length = None;
        for (column, source) in self.layout.sources[index].iter().enumerate() {
            let value = match source {
                BindingSource::Prefix(output) => self.prefix_value(*output),
                BindingSource::Left(output, occurrences) => {
                    let mut value = UNBOUND;
                    for (operand, operand_column) in occurrences {
                        value = self.operands[*operand]
                            .column_value(*operand_column)
                            .map_err(|error| error.in_operand(NAME, *operand))?;
                        if value != UNBOUND {
                            break;
                        }
                    }
                    if value == UNBOUND {
                        value = self.prefix_value(*output);
                    }
                    value
                }
            };
            self.bindings[index][column] = value;

            if prefix_length.is_none()
                && (value == UNBOUND || self.layout.operand_ever_unbound[index][column])
            {
                prefix_length = Some(column);
            }
        }
        self.prefix_lengths[index] = prefix_length.unwrap_or(self.bindings[index].len());
        Ok(())
    }

    fn seek_operand(&mut self, index: usize) -> TuplesResult<()> {
        let prefix = &self.bindings[index][..self.prefix_lengths[index]];
        self.operands[index]
            .before_first(prefix, 0)
            .map_err(|error| error.in_operand(NAME, index))
    }

    /// Checks the columns of operand `index` that were not part of its seek prefix. A column
    /// conflicts only if both the binding and the operand's value are bound and differ.
    fn suffix_matches(&self, index: usize) -> TuplesResult<bool> {
        let bindings = &self.bindings[index];
        for (column, binding) in bindings.iter().enumerate().skip(self.prefix_lengths[index]) {
            if *binding == UNBOUND {
                continue;
            }
            let value = self.operands[index]
                .column_value(column)
                .map_err(|error| error.in_operand(NAME, index))?;
            if value != UNBOUND && value != *binding {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Advances operand `start` until all operands up to `target` are on consistent rows.
    ///
    /// An exhausted operand rolls over to its left neighbour. The join is exhausted once the
    /// leftmost operand is.
    fn advance(&mut self, start: usize, target: usize) -> TuplesResult<bool> {
        let mut current = start;
        loop {
            let has_row = self.operands[current]
                .next()
                .map_err(|error| error.in_operand(NAME, current))?;
            if !has_row {
                if current == 0 {
                    return Ok(false);
                }
                current -= 1;
                continue;
            }

            if !self.suffix_matches(current)? {
                continue;
            }
            if current == target {
                return Ok(true);
            }

            current += 1;
            self.update_operand_prefix(current)?;
            self.seek_operand(current)?;
        }
    }
}

impl Tuples for UnboundJoin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.layout.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], _suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.layout.variables.len())?;
        self.prefix.clear();
        self.prefix.extend_from_slice(prefix);
        self.first_row_pending = true;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        let last = self.operands.len() - 1;
        let has_row = if self.first_row_pending {
            self.first_row_pending = false;
            self.update_operand_prefix(0)?;
            self.seek_operand(0)?;
            self.advance(0, last)?
        } else {
            self.advance(last, last)?
        };

        self.state = CursorState::after_next(has_row);
        Ok(has_row)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        check_column(column, self.layout.variables.len())?;

        let (operand, operand_column) = self.layout.primaries[column];
        let value = self.operands[operand]
            .column_value(operand_column)
            .map_err(|error| error.in_operand(NAME, operand))?;
        if value != UNBOUND {
            return Ok(value);
        }

        for (operand, operand_column) in &self.layout.fallbacks[column] {
            let value = self.operands[*operand]
                .column_value(*operand_column)
                .map_err(|error| error.in_operand(NAME, *operand))?;
            if value != UNBOUND {
                return Ok(value);
            }
        }
        Ok(self.prefix_value(column))
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        let mut bound: u64 = 1;
        for operand in &self.operands {
            bound = bound.saturating_mul(operand.row_upper_bound()?);
        }
        Ok(bound)
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.layout.variables.len())?;
        Ok(self.layout.ever_unbound[column])
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        for operand in &self.operands {
            if !operand.has_no_duplicates()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        None
    }

    fn is_materialized(&self) -> bool {
        false
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        self.operands.iter().map(AsRef::as_ref).collect()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            operands: self.operands.iter().map(|operand| operand.duplicate()).collect(),
            layout: Arc::clone(&self.layout),
            state: self.state,
            prefix: self.prefix.clone(),
            first_row_pending: self.first_row_pending,
            bindings: self.bindings.clone(),
            prefix_lengths: self.prefix_lengths.clone(),
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
