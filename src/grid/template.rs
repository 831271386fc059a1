//! Instantiation of neighbourhood templates over grid cells

use super::node::GridNode;
use crate::symbolic::{clause_to_string, collect_variables, Clause, Literal, ZERO_NAME};
use crate::symmetry::CENTER;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Suffix marking auxiliary template variables, one instance per cell
pub const HELPER_SUFFIX: char = '$';

/// Template symbol to concrete variable name and orientation
pub type Substitution = BTreeMap<String, (String, u8)>;

/// Maps a tag through the orientation of the cell it lands on
pub type TagAdjust = dyn Fn(u8, u32) -> u32 + Sync;

pub fn identity_adjust(_orientation: u8, tag: u32) -> u32 {
    tag
}

/// Adjuster for tags naming one of `labels` directions: each orientation
/// step turns the direction back once. Tags from `labels` up are not
/// directions and pass through unchanged.
pub fn rotation_adjust(labels: u32) -> impl Fn(u8, u32) -> u32 + Sync {
    move |orientation, tag| {
        if tag < labels {
            (i64::from(tag) - i64::from(orientation)).rem_euclid(i64::from(labels)) as u32
        } else {
            tag
        }
    }
}

fn node_info(node: &GridNode) -> (String, u8) {
    let name = if node.is_outside() {
        ZERO_NAME.to_string()
    } else {
        node.name()
    };
    (name, node.orientation())
}

/// Substitution table of one grid node.
pub fn grid_substitution(node: &GridNode, auxiliary: &[String]) -> Substitution {
    let mut substitution: Substitution = node
        .neighbor_symbols()
        .iter()
        .filter_map(|symbol| node.neighbor(symbol).map(|n| (symbol.to_string(), node_info(&n))))
        .collect();
    substitution.insert(CENTER.to_string(), node_info(node));
    for variable in auxiliary {
        substitution.insert(
            variable.clone(),
            (format!("{}{}", variable, node.name()), node.orientation()),
        );
    }
    substitution
}

/// Substitute one template clause; `None` when it mentions both polarities
/// of the zero wire.
fn instantiate(template: &[Literal], substitution: &Substitution, adjust: &TagAdjust) -> Option<Vec<Literal>> {
    let clause: Vec<Literal> = template
        .iter()
        .map(|literal| match substitution.get(literal.name()) {
            Some((name, orientation)) => Literal::with(
                name.as_str(),
                literal.polarity(),
                literal.tag().map(|tag| adjust(*orientation, tag)),
            ),
            None => literal.clone(),
        })
        .collect();

    let zero = Literal::zero();
    let not_zero = zero.negate();
    if clause.contains(&zero) && clause.contains(&not_zero) {
        None
    } else {
        Some(clause)
    }
}

fn mentions_zero(clauses: &[Vec<Literal>]) -> bool {
    clauses.iter().flatten().any(|l| l.name() == ZERO_NAME)
}

/// Apply every template clause under every substitution.
///
/// Each template clause is preceded by a `Template: ...` comment. A unit
/// clause pinning the zero wire false is appended when it was used.
pub fn inflate_template(
    template: &[Clause],
    substitutions: &[Substitution],
    consequent: Option<&str>,
    adjust: &TagAdjust,
) -> Vec<Clause> {
    let mut clauses = Vec::new();
    let mut has_zero = false;

    for clause in template {
        match clause {
            Clause::Comment(_) => clauses.push(clause.clone()),
            Clause::Disjunction(literals) => {
                clauses.push(Clause::comment(format!(
                    "Template: {}",
                    clause_to_string(literals, consequent)
                )));
                let instances: Vec<Vec<Literal>> = substitutions
                    .par_iter()
                    .filter_map(|substitution| instantiate(literals, substitution, adjust))
                    .collect();
                has_zero |= mentions_zero(&instances);
                clauses.extend(instances.into_iter().map(Clause::Disjunction));
            }
        }
    }

    if has_zero {
        clauses.push(Clause::unit(Literal::zero().negate()));
    }
    clauses
}

/// Apply a neighbourhood template at every node of a grid.
///
/// Neighbour symbols and the centre `O` become cell variables, outside cells
/// become the zero wire, and template variables ending in `$` become
/// per-cell helper variables.
pub fn inflate_grid_template(
    template: &[Clause],
    grid: &[GridNode],
    consequent: Option<&str>,
    adjust: &TagAdjust,
) -> Vec<Clause> {
    let auxiliary: Vec<String> = collect_variables(template)
        .into_iter()
        .filter(|name| name.ends_with(HELPER_SUFFIX))
        .collect();

    let substitutions: Vec<Substitution> = grid
        .par_iter()
        .map(|node| grid_substitution(node, &auxiliary))
        .collect();
    let has_zero = substitutions
        .iter()
        .any(|substitution| substitution.values().any(|(name, _)| name == ZERO_NAME));

    let mut clauses = inflate_template(template, &substitutions, consequent, adjust);
    let pinned = Clause::unit(Literal::zero().negate());
    if has_zero && clauses.last() != Some(&pinned) {
        clauses.push(pinned);
    }

    debug!(
        "Inflated {} template lines over {} nodes into {} lines",
        template.len(),
        grid.len(),
        clauses.len()
    );
    clauses
}
