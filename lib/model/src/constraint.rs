use crate::{Bindings, NodeId, UNBOUND};
use oxrdf::Variable;
use std::fmt::{Display, Formatter};

/// One position of a [Constraint]: either a fixed node or a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintElement {
    /// The position must hold exactly this node.
    Node(NodeId),
    /// The position binds the variable.
    Variable(Variable),
}

impl ConstraintElement {
    /// Returns the fixed node, if this element is one.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            ConstraintElement::Node(node) => Some(*node),
            ConstraintElement::Variable(_) => None,
        }
    }

    /// Returns the variable, if this element is one.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            ConstraintElement::Node(_) => None,
            ConstraintElement::Variable(variable) => Some(variable),
        }
    }
}

impl From<NodeId> for ConstraintElement {
    fn from(value: NodeId) -> Self {
        ConstraintElement::Node(value)
    }
}

impl From<Variable> for ConstraintElement {
    fn from(value: Variable) -> Self {
        ConstraintElement::Variable(value)
    }
}

impl Display for ConstraintElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintElement::Node(node) => write!(f, "#{node}"),
            ConstraintElement::Variable(variable) => write!(f, "{variable}"),
        }
    }
}

/// A statement pattern over subject, predicate, object and graph.
///
/// The positions are always stored in this order. Storage layers decide which index permutation
/// serves a given constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    elements: [ConstraintElement; 4],
}

impl Constraint {
    /// Creates a new [Constraint].
    pub fn new(
        subject: impl Into<ConstraintElement>,
        predicate: impl Into<ConstraintElement>,
        object: impl Into<ConstraintElement>,
        graph: impl Into<ConstraintElement>,
    ) -> Self {
        Self {
            elements: [
                subject.into(),
                predicate.into(),
                object.into(),
                graph.into(),
            ],
        }
    }

    pub fn subject(&self) -> &ConstraintElement {
        &self.elements[0]
    }

    pub fn predicate(&self) -> &ConstraintElement {
        &self.elements[1]
    }

    pub fn object(&self) -> &ConstraintElement {
        &self.elements[2]
    }

    pub fn graph(&self) -> &ConstraintElement {
        &self.elements[3]
    }

    /// Returns the elements in subject, predicate, object, graph order.
    pub fn elements(&self) -> &[ConstraintElement; 4] {
        &self.elements
    }

    /// Returns the fixed node of each position.
    pub fn fixed_values(&self) -> [Option<NodeId>; 4] {
        self.elements.each_ref().map(ConstraintElement::as_node)
    }

    /// Returns the distinct variables of this constraint in position order.
    pub fn variables(&self) -> Vec<Variable> {
        let mut result: Vec<Variable> = Vec::new();
        for variable in self.elements.iter().filter_map(ConstraintElement::as_variable) {
            if !result.contains(variable) {
                result.push(variable.clone());
            }
        }
        result
    }

    /// Replaces every variable that has a binding with the bound node.
    ///
    /// Bindings to [UNBOUND] are ignored. Returns [None] if no variable of this constraint is bound.
    pub fn bind(&self, bindings: &Bindings) -> Option<Constraint> {
        let mut changed = false;
        let elements = self.elements.each_ref().map(|element| match element {
            ConstraintElement::Variable(variable) => match bindings.get(variable) {
                Some(node) if *node != UNBOUND => {
                    changed = true;
                    ConstraintElement::Node(*node)
                }
                _ => element.clone(),
            },
            ConstraintElement::Node(_) => element.clone(),
        });
        changed.then_some(Constraint { elements })
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [subject, predicate, object, graph] = &self.elements;
        write!(f, "[{subject} {predicate} {object} {graph}]")
    }
}
