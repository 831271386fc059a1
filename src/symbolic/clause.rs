//! Clauses and the set operations used to flatten disjunctions into CNF

use super::literal::Literal;
use std::collections::BTreeSet;

/// One line of a clause set: a passthrough comment or a disjunction of literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Clause {
    Comment(String),
    Disjunction(Vec<Literal>),
}

impl Clause {
    pub fn comment(text: impl Into<String>) -> Self {
        Clause::Comment(text.into())
    }

    pub fn of(literals: impl IntoIterator<Item = Literal>) -> Self {
        Clause::Disjunction(literals.into_iter().collect())
    }

    /// A single-literal clause
    pub fn unit(literal: Literal) -> Self {
        Clause::Disjunction(vec![literal])
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Clause::Comment(_))
    }

    /// Literals of a disjunction, `None` for comments
    pub fn literals(&self) -> Option<&[Literal]> {
        match self {
            Clause::Comment(_) => None,
            Clause::Disjunction(literals) => Some(literals),
        }
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Clause::Disjunction(literals)
    }
}

/// True iff some literal and its exact negation (same name and tag) co-occur.
pub fn is_tautology(literals: &[Literal]) -> bool {
    let set: BTreeSet<&Literal> = literals.iter().collect();
    literals.iter().any(|literal| set.contains(&literal.negate()))
}

fn set_is_tautology(literals: &BTreeSet<Literal>) -> bool {
    literals.iter().any(|literal| literals.contains(&literal.negate()))
}

/// OR two clauses together by taking the union of their literals.
pub fn or_combine(left: &[Literal], right: &[Literal]) -> BTreeSet<Literal> {
    left.iter().chain(right).cloned().collect()
}

/// Expand the disjunction of two conjunctions of clauses.
///
/// Every pair of clauses is OR-combined; tautologies are discarded and the
/// result is deduplicated by sorted literal tuple.
pub fn expand_disjunction<A, B, X, Y>(left: A, right: B) -> BTreeSet<Vec<Literal>>
where
    A: IntoIterator<Item = X>,
    X: AsRef<[Literal]>,
    B: IntoIterator<Item = Y>,
    Y: AsRef<[Literal]>,
{
    let right: Vec<Y> = right.into_iter().collect();
    let mut expanded = BTreeSet::new();
    for a in left {
        for b in &right {
            let combined = or_combine(a.as_ref(), b.as_ref());
            if !set_is_tautology(&combined) {
                expanded.insert(combined.into_iter().collect());
            }
        }
    }
    expanded
}

/// Drop every clause that strictly contains another clause of the set.
pub fn remove_redundant<I, X>(clauses: I) -> Vec<Vec<Literal>>
where
    I: IntoIterator<Item = X>,
    X: AsRef<[Literal]>,
{
    let clauses: Vec<Vec<Literal>> = clauses.into_iter().map(|c| c.as_ref().to_vec()).collect();
    let sets: Vec<BTreeSet<&Literal>> = clauses.iter().map(|c| c.iter().collect()).collect();

    clauses
        .iter()
        .zip(&sets)
        .filter(|(_, set)| {
            !sets
                .iter()
                .any(|test| set.len() > test.len() && test.is_subset(set))
        })
        .map(|(clause, _)| clause.clone())
        .collect()
}

/// Flatten a disjunction of conjunctions into a single minimal conjunction.
///
/// Folds `expand_disjunction` then `remove_redundant` over the alternatives.
/// An empty list of alternatives yields the empty clause (false).
pub fn flatten_disjunction(alternatives: &[Vec<Vec<Literal>>]) -> Vec<Vec<Literal>> {
    let mut result: Vec<Vec<Literal>> = vec![Vec::new()];
    for alternative in alternatives {
        result = remove_redundant(expand_disjunction(&result, alternative));
    }
    result
}

/// Node visited while collecting literals.
enum Term<'a> {
    Clause(&'a Clause),
    Literal(&'a Literal),
}

/// All distinct literals of a clause set, sorted.
pub fn collect_literals(clauses: &[Clause]) -> BTreeSet<Literal> {
    let mut stack: Vec<Term<'_>> = clauses.iter().map(Term::Clause).collect();
    let mut found = BTreeSet::new();

    while let Some(term) = stack.pop() {
        match term {
            Term::Clause(Clause::Comment(_)) => {}
            Term::Clause(Clause::Disjunction(literals)) => {
                stack.extend(literals.iter().map(Term::Literal));
            }
            Term::Literal(literal) => {
                found.insert(literal.clone());
            }
        }
    }

    found
}

/// All distinct variable names of a clause set, sorted.
pub fn collect_variables(clauses: &[Clause]) -> Vec<String> {
    let names: BTreeSet<String> = collect_literals(clauses)
        .into_iter()
        .map(|literal| literal.name().to_string())
        .collect();
    names.into_iter().collect()
}

/// Clauses that are jointly unsatisfiable for one boolean variable.
pub fn always_false(name: &str) -> Vec<Vec<Literal>> {
    vec![
        vec![Literal::with(name, true, None)],
        vec![Literal::with(name, false, None)],
    ]
}

fn tuple_variables(clauses: &[Vec<Literal>]) -> Vec<String> {
    let names: BTreeSet<&str> = clauses.iter().flatten().map(|l| l.name()).collect();
    names.into_iter().map(str::to_string).collect()
}

/// Expand every clause so that it mentions every variable of the set.
pub fn find_canonical(clauses: &[Vec<Literal>]) -> BTreeSet<Vec<Literal>> {
    let mut canonical: BTreeSet<Vec<Literal>> = clauses
        .iter()
        .map(|clause| clause.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect())
        .collect();
    for name in tuple_variables(clauses) {
        canonical = expand_disjunction(&canonical, always_false(&name));
    }
    canonical
}

/// Enumerate the satisfying assignments of a small boolean clause set.
///
/// Each full assignment is a tuple of literals over every variable; those
/// whose complementary clause is absent from the canonical form are true.
pub fn find_true_tuples(clauses: &[Vec<Literal>]) -> Vec<Vec<Literal>> {
    let mut canonical_zero: BTreeSet<Vec<Literal>> = BTreeSet::from([Vec::new()]);
    for name in tuple_variables(clauses) {
        canonical_zero = expand_disjunction(&canonical_zero, always_false(&name));
    }

    let canonical = find_canonical(clauses);
    canonical_zero
        .into_iter()
        .filter(|clause| !canonical.contains(clause))
        .map(|clause| clause.iter().map(Literal::negate).collect())
        .collect()
}
