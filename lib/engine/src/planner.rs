use crate::explain::tuples_summary;
use itertools::Itertools;
use rdf_tuples_common::{close_all, BoxedTuples, Tuples};
use rdf_tuples_model::{Bindings, Cardinality, TuplesError, TuplesResult, Variable, UNBOUND};
use rdf_tuples_physical::{LiteralTuples, UnconstrainedTuples};
use rustc_hash::FxHashSet;

/// Folds the single-row operands of a join into constant bindings.
///
/// Returns [None] if some operand is empty or two operands bind a variable to different nodes;
/// all operands have been closed in that case. Otherwise, returns the remaining operands followed
/// by one relation that holds the bindings.
pub(crate) fn unify(operands: Vec<BoxedTuples>) -> TuplesResult<Option<Vec<BoxedTuples>>> {
    let mut bindings = Bindings::default();
    let Some(mut remaining) = bind_single_row_operands(&mut bindings, operands)? else {
        tracing::debug!("Join is empty after binding single-row operands");
        return Ok(None);
    };

    loop {
        let (mut reresolved, mut kept) = (Vec::new(), Vec::new());
        for mut operand in remaining {
            let replacement = match operand.reresolvable() {
                Some(reresolvable) => reresolvable.reresolve(&bindings)?,
                None => None,
            };
            match replacement {
                Some(replacement) => {
                    operand.close()?;
                    reresolved.push(replacement);
                }
                None => kept.push(operand),
            }
        }

        if reresolved.is_empty() {
            remaining = kept;
            break;
        }

        tracing::debug!(count = reresolved.len(), "Re-resolved operands with new bindings");
        let Some(bound) = bind_single_row_operands(&mut bindings, reresolved)? else {
            close_all(kept.iter_mut())?;
            tracing::debug!("Join is empty after binding re-resolved operands");
            return Ok(None);
        };
        kept.extend(bound);
        remaining = kept;
    }

    remaining.push(tuples_from_bindings(&bindings)?);
    Ok(Some(remaining))
}

/// Moves the rows of all single-row operands into `bindings` and closes these operands.
///
/// Returns [None] if the bindings conflict or some operand has no rows. All operands have been
/// closed in that case.
fn bind_single_row_operands(
    bindings: &mut Bindings,
    operands: Vec<BoxedTuples>,
) -> TuplesResult<Option<Vec<BoxedTuples>>> {
    let mut remaining = Vec::with_capacity(operands.len());
    let mut operands = operands.into_iter();
    while let Some(mut operand) = operands.next() {
        let consistent = match operand.row_cardinality()? {
            Cardinality::Zero => false,
            Cardinality::Many => {
                remaining.push(operand);
                continue;
            }
            Cardinality::One => {
                let consistent = bind_row(bindings, operand.as_mut())?;
                operand.close()?;
                consistent
            }
        };

        if !consistent {
            let mut rest: Vec<BoxedTuples> = operands.collect();
            rest.push(operand);
            close_all(remaining.iter_mut().chain(rest.iter_mut()))?;
            return Ok(None);
        }
    }
    Ok(Some(remaining))
}

/// Adds the only row of `tuples` to `bindings`. Returns `false` on a conflict.
///
/// An unbound value never conflicts.
fn bind_row(bindings: &mut Bindings, tuples: &mut dyn Tuples) -> TuplesResult<bool> {
    tuples.rewind()?;
    if !tuples.next()? {
        return Err(TuplesError::invalid_argument(format!(
            "{} reported one row but produced none",
            tuples.name()
        )));
    }

    for (column, variable) in tuples.variables().iter().enumerate() {
        let value = tuples.column_value(column)?;
        match bindings.get(variable).copied() {
            None | Some(UNBOUND) => {
                bindings.insert(variable.clone(), value);
            }
            Some(existing) => {
                if value != UNBOUND && value != existing {
                    tracing::debug!(%variable, existing, value, "Conflicting bindings");
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

fn tuples_from_bindings(bindings: &Bindings) -> TuplesResult<BoxedTuples> {
    if bindings.is_empty() {
        return Ok(Box::new(UnconstrainedTuples::new()));
    }

    let variables: Vec<Variable> = bindings
        .keys()
        .sorted_by(|lhs, rhs| lhs.as_str().cmp(rhs.as_str()))
        .cloned()
        .collect();
    let row: Vec<_> = variables.iter().map(|variable| bindings[variable]).collect();
    let mut tuples = LiteralTuples::new(variables);
    tuples.append_row(&row)?;
    Ok(Box::new(tuples))
}

/// Greedily orders join operands so that cheap operands, and operands that profit from the
/// variables bound to their left, come first.
///
/// Consumes `operands`. On failure, every operand has been closed.
pub(crate) fn order_operands(
    operands: Vec<BoxedTuples>,
    prefix_weight_decay: f64,
) -> TuplesResult<Vec<BoxedTuples>> {
    let mut remaining = operands;
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut bound = FxHashSet::default();

    while !remaining.is_empty() {
        let best = match select_best(&mut remaining, &bound, prefix_weight_decay) {
            Ok(best) => best,
            Err(error) => {
                close_all(remaining.iter_mut().chain(ordered.iter_mut()))?;
                return Err(error);
            }
        };

        let operand = remaining.remove(best);
        for (column, variable) in operand.variables().iter().enumerate() {
            if !operand.is_column_ever_unbound(column)? {
                bound.insert(variable.clone());
            }
        }
        ordered.push(operand);
    }
    Ok(ordered)
}

/// Returns the index of the cheapest operand that can be evaluated with `bound`.
fn select_best(
    operands: &mut [BoxedTuples],
    bound: &FxHashSet<Variable>,
    prefix_weight_decay: f64,
) -> TuplesResult<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, operand) in operands.iter_mut().enumerate() {
        if operand
            .mandatory_binding()
            .is_some_and(|requirement| !requirement.meets_requirement(bound))
        {
            continue;
        }

        if let Some(definable) = operand.definable_prefix() {
            definable.define_prefix(bound)?;
        }

        let cost = weighted_row_count(operand.as_mut(), bound, prefix_weight_decay)?;
        tracing::debug!(operand = %tuples_summary(operand.as_ref()), cost, "Costed join operand");
        match best {
            Some((_, best_cost)) if best_cost <= cost => {}
            _ => best = Some((index, cost)),
        }
    }

    match best {
        Some((index, _)) => Ok(index),
        None => {
            let bound = bound.iter().map(Variable::as_str).sorted().join(", ");
            tracing::info!(%bound, "Unable to meet ordering constraints");
            for operand in operands.iter() {
                tracing::info!(operand = %tuples_summary(operand.as_ref()), "Unordered operand");
            }
            Err(TuplesError::UnsatisfiableOrdering(bound))
        }
    }
}

/// Returns the number of variables of `tuples` that operands to its left bind and that a prefix
/// seek can use.
fn left_bindings(tuples: &mut dyn Tuples, bound: &FxHashSet<Variable>) -> usize {
    let is_definable = tuples.definable_prefix().is_some();
    let variables = tuples.variables();
    if is_definable {
        variables.iter().filter(|variable| bound.contains(*variable)).count()
    } else {
        variables
            .iter()
            .take_while(|variable| bound.contains(*variable))
            .count()
    }
}

/// Estimates the cost of evaluating `tuples` once for each row to its left.
///
/// With `n` usable bound variables out of `V`, the estimate sums the expected row counts for
/// `n, n - 1, ..., 0` bound variables, weighting the term for `n - w` bound variables with
/// `decay^-w`.
#[expect(clippy::cast_precision_loss, reason = "Row counts are estimates")]
pub(crate) fn weighted_row_count(
    tuples: &mut dyn Tuples,
    bound: &FxHashSet<Variable>,
    prefix_weight_decay: f64,
) -> TuplesResult<f64> {
    let upper_bound = tuples.row_upper_bound()? as f64;
    let arity = tuples.number_of_variables();
    if arity == 0 {
        return Ok(upper_bound);
    }

    let left_bindings = left_bindings(tuples, bound);
    let arity = arity as f64;
    let mut weighted = 0.0;
    let mut weight = 1.0;
    for w in 0..=left_bindings {
        let free = arity - (left_bindings - w) as f64;
        weighted += upper_bound.powf(free / arity) / weight;
        weight *= prefix_weight_decay;
    }
    Ok(weighted)
}
