use crate::filter::{EvaluationContext, Filter};
use rdf_tuples_model::{NodeId, TuplesResult, Variable, UNBOUND};
use std::fmt::{Display, Formatter};

/// A value referenced by a [FilterExpr].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterTerm {
    Variable(Variable),
    Node(NodeId),
}

impl FilterTerm {
    fn evaluate(&self, context: &dyn EvaluationContext) -> TuplesResult<NodeId> {
        match self {
            FilterTerm::Variable(variable) => context.value(variable),
            FilterTerm::Node(node) => Ok(*node),
        }
    }
}

impl Display for FilterTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterTerm::Variable(variable) => write!(f, "{variable}"),
            FilterTerm::Node(node) => write!(f, "#{node}"),
        }
    }
}

/// Predicates over node identities.
///
/// Only identities are compared. An unbound value is never equal to anything, including another
/// unbound value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterExpr {
    True,
    False,
    /// Whether the variable is bound in the current row.
    Bound(Variable),
    /// Whether both terms are bound to the same node.
    SameTerm(FilterTerm, FilterTerm),
    /// Whether the term is bound to one of the nodes.
    In(FilterTerm, Vec<NodeId>),
    Not(Box<FilterExpr>),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
}

impl Filter for FilterExpr {
    fn test(&self, context: &dyn EvaluationContext) -> TuplesResult<bool> {
        Ok(match self {
            FilterExpr::True => true,
            FilterExpr::False => false,
            FilterExpr::Bound(variable) => context.value(variable)? != UNBOUND,
            FilterExpr::SameTerm(lhs, rhs) => {
                let lhs = lhs.evaluate(context)?;
                lhs != UNBOUND && lhs == rhs.evaluate(context)?
            }
            FilterExpr::In(term, nodes) => {
                let value = term.evaluate(context)?;
                value != UNBOUND && nodes.contains(&value)
            }
            FilterExpr::Not(inner) => !inner.test(context)?,
            FilterExpr::And(lhs, rhs) => lhs.test(context)? && rhs.test(context)?,
            FilterExpr::Or(lhs, rhs) => lhs.test(context)? || rhs.test(context)?,
        })
    }
}

impl Display for FilterExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterExpr::True => f.write_str("true"),
            FilterExpr::False => f.write_str("false"),
            FilterExpr::Bound(variable) => write!(f, "bound({variable})"),
            FilterExpr::SameTerm(lhs, rhs) => write!(f, "sameTerm({lhs}, {rhs})"),
            FilterExpr::In(term, nodes) => {
                write!(f, "{term} in (")?;
                for (index, node) in nodes.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "#{node}")?;
                }
                f.write_str(")")
            }
            FilterExpr::Not(inner) => write!(f, "!({inner})"),
            FilterExpr::And(lhs, rhs) => write!(f, "({lhs} && {rhs})"),
            FilterExpr::Or(lhs, rhs) => write!(f, "({lhs} || {rhs})"),
        }
    }
}
