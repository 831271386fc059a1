//! Orbit of a clause under a permutation group acting on neighbour symbols

use super::basis::Permutation;
use crate::error::{CompileError, Result};
use crate::symbolic::{Clause, Literal};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Upper bound on distinct labelings of one clause before the basis is
/// considered malformed.
pub const MAX_LABELINGS: usize = 100_000;

type Pair = (String, bool, Option<u32>);

/// Literals of one clause keyed by the symbol they occupy.
///
/// Equality and hashing use the sorted pairs; `pairs` keeps the original
/// order so substituted clauses read like the template.
#[derive(Debug, Clone)]
struct Labeling {
    pairs: Vec<Pair>,
    canonical: Vec<Pair>,
}

impl Labeling {
    fn new(pairs: Vec<Pair>) -> Self {
        let mut canonical = pairs.clone();
        canonical.sort();
        Self { pairs, canonical }
    }

    fn permuted(&self, mapping: &Permutation) -> Self {
        Self::new(
            self.pairs
                .iter()
                .map(|(symbol, polarity, tag)| (mapping.apply(symbol).to_string(), *polarity, *tag))
                .collect(),
        )
    }

    fn to_literals(&self) -> Vec<Literal> {
        self.pairs
            .iter()
            .map(|(symbol, polarity, tag)| Literal::with(symbol.clone(), *polarity, *tag))
            .collect()
    }
}

impl PartialEq for Labeling {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Labeling {}

impl Hash for Labeling {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

/// All images of `literals` under the group generated by `basis`.
///
/// Inverse generators are applied to the symbol side only until no new
/// labeling appears. Images are returned in sorted order.
pub fn all_symmetries(basis: &[Permutation], literals: &[Literal]) -> Result<Vec<Vec<Literal>>> {
    let inverses: Vec<Permutation> = basis.iter().map(Permutation::inverse).collect();
    let start = Labeling::new(
        literals
            .iter()
            .map(|l| (l.name().to_string(), l.polarity(), l.tag()))
            .collect(),
    );

    let mut seen: HashSet<Labeling> = HashSet::from([start.clone()]);
    let mut frontier = vec![start];

    while let Some(labeling) = frontier.pop() {
        for mapping in &inverses {
            let image = labeling.permuted(mapping);
            if !seen.contains(&image) {
                if seen.len() >= MAX_LABELINGS {
                    return Err(CompileError::SymmetryOverflow(MAX_LABELINGS));
                }
                seen.insert(image.clone());
                frontier.push(image);
            }
        }
    }

    let mut images: Vec<Vec<Pair>> = seen.into_iter().map(|l| l.pairs).collect();
    images.sort();
    Ok(images
        .into_iter()
        .map(|pairs| Labeling::new(pairs).to_literals())
        .collect())
}

/// Replace every clause by all of its symmetric images; comments pass through.
pub fn expand_symmetry(basis: &[Permutation], clauses: &[Clause]) -> Result<Vec<Clause>> {
    let mut expanded = Vec::new();
    for clause in clauses {
        match clause {
            Clause::Comment(_) => expanded.push(clause.clone()),
            Clause::Disjunction(literals) => {
                expanded.extend(
                    all_symmetries(basis, literals)?
                        .into_iter()
                        .map(Clause::Disjunction),
                );
            }
        }
    }
    debug!(
        "Symmetry expansion: {} template lines -> {} lines",
        clauses.len(),
        expanded.len()
    );
    Ok(expanded)
}
