//! Cardinality constraints compiled to a network of full adders

use super::variables::TempVars;
use crate::symbolic::{Literal, ZERO_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Direction of a cardinality bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    AtMost,
    AtLeast,
}

impl Comparator {
    pub fn build(self, variables: Vec<Literal>, limit: i64, temps: &mut TempVars) -> Cardinality {
        match self {
            Comparator::AtMost => Cardinality::less_than_or_equal(variables, limit, temps),
            Comparator::AtLeast => Cardinality::greater_than_or_equal(variables, limit, temps),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::AtMost => write!(f, "LessThanOrEqual"),
            Comparator::AtLeast => write!(f, "GreaterThanOrEqual"),
        }
    }
}

/// One full adder: `carry * 2 + sum >= in0 + in1 + in2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullAdder {
    pub sum: Literal,
    pub carry: Literal,
    pub inputs: [Literal; 3],
}

/// Adder network counting true literals, plus the clauses bounding the count.
#[derive(Debug, Clone)]
pub struct Cardinality {
    /// One output wire per binary digit of the count, least significant first
    pub levels: Vec<Literal>,
    pub adder_clauses: Vec<Vec<Literal>>,
    pub constraint_clauses: Vec<Vec<Literal>>,
}

impl Cardinality {
    /// At most `limit` of `variables` are true
    pub fn less_than_or_equal(variables: Vec<Literal>, limit: i64, temps: &mut TempVars) -> Self {
        Self::build(variables, limit, temps)
    }

    /// At least `limit` of `variables` are true, counted as at most
    /// `n - limit` of their negations.
    pub fn greater_than_or_equal(variables: Vec<Literal>, limit: i64, temps: &mut TempVars) -> Self {
        let n = variables.len() as i64;
        let negated = variables.iter().map(Literal::negate).collect();
        Self::build(negated, n - limit, temps)
    }

    fn build(variables: Vec<Literal>, limit: i64, temps: &mut TempVars) -> Self {
        let count = variables.len();
        let (network, levels) = Self::make_adder_network(variables, temps);
        let adder_clauses = Self::make_adder_clauses(&network);

        let constraint_clauses = if levels.is_empty() {
            // nothing to count: only a negative limit is violated
            if limit < 0 {
                vec![Vec::new()]
            } else {
                Vec::new()
            }
        } else {
            levels
                .iter()
                .enumerate()
                .map(|(i, level)| {
                    if (limit >> i.min(63)) & 1 == 0 {
                        vec![level.negate()]
                    } else {
                        vec![level.clone()]
                    }
                })
                .collect()
        };

        debug!(
            "Cardinality over {} literals, limit {}: {} adders, {} levels",
            count,
            limit,
            network.len(),
            levels.len()
        );

        Self {
            levels,
            adder_clauses,
            constraint_clauses,
        }
    }

    /// Apply full adders to triples of wires on every level.
    fn contract(
        network: &mut Vec<FullAdder>,
        levels: BTreeMap<usize, Vec<Literal>>,
        temps: &mut TempVars,
    ) -> BTreeMap<usize, Vec<Literal>> {
        let mut next_levels: BTreeMap<usize, Vec<Literal>> = BTreeMap::new();
        for (level, mut wires) in levels {
            if wires.len() % 3 == 2 {
                wires.push(Literal::zero());
            }
            let mut triples = wires.chunks_exact(3);
            for triple in &mut triples {
                let sum = temps.next_var();
                let carry = temps.next_var();
                next_levels.entry(level).or_default().push(sum.clone());
                next_levels.entry(level + 1).or_default().push(carry.clone());
                network.push(FullAdder {
                    sum,
                    carry,
                    inputs: [triple[0].clone(), triple[1].clone(), triple[2].clone()],
                });
            }
            let rest = triples.remainder();
            if !rest.is_empty() {
                next_levels.entry(level).or_default().extend_from_slice(rest);
            }
        }
        next_levels
    }

    /// Contract the input wires until every level holds a single wire.
    ///
    /// Returns the adders and the output wire of each level.
    pub fn make_adder_network(variables: Vec<Literal>, temps: &mut TempVars) -> (Vec<FullAdder>, Vec<Literal>) {
        let mut network = Vec::new();
        if variables.is_empty() {
            return (network, Vec::new());
        }

        let mut levels = BTreeMap::from([(0, variables)]);
        while levels.values().any(|wires| wires.len() > 1) {
            levels = Self::contract(&mut network, levels, temps);
        }

        let outputs = levels
            .into_values()
            .filter_map(|wires| wires.into_iter().next())
            .collect();
        (network, outputs)
    }

    /// Clauses forcing each adder's outputs up to at least its input count.
    ///
    /// Clauses ending in the padding wire are always satisfied and dropped.
    pub fn make_adder_clauses(network: &[FullAdder]) -> Vec<Vec<Literal>> {
        let mut clauses = Vec::with_capacity(network.len() * 7);
        for adder in network {
            let (out0, out1) = (&adder.sum, &adder.carry);
            let [in0, in1, in2] = &adder.inputs;
            clauses.push(vec![out1.clone(), !in0, !in1]);
            clauses.push(vec![out1.clone(), !in0, !in2]);
            clauses.push(vec![out1.clone(), !in1, !in2]);
            clauses.push(vec![out1.clone(), out0.clone(), !in0]);
            clauses.push(vec![out1.clone(), out0.clone(), !in1]);
            clauses.push(vec![out1.clone(), out0.clone(), !in2]);
            clauses.push(vec![out0.clone(), !in0, !in1, !in2]);
        }
        clauses.retain(|clause| clause.last().map(Literal::name) != Some(ZERO_NAME));
        clauses
    }

    /// Adder clauses followed by bound clauses
    pub fn clauses(&self) -> impl Iterator<Item = &Vec<Literal>> {
        self.adder_clauses.iter().chain(&self.constraint_clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::variables::SymbolTable;
    use cadical::Solver;

    fn inputs(n: usize) -> Vec<Literal> {
        (0..n).map(|i| Literal::new(format!("v{}", i))).collect()
    }

    /// Solve the cardinality clauses with exactly the first `m` inputs true.
    fn satisfiable_with(cardinality: &Cardinality, n: usize, m: usize) -> bool {
        let names = cardinality
            .clauses()
            .flatten()
            .map(|l| l.name().to_string())
            .chain(inputs(n).into_iter().map(|l| l.name().to_string()));
        let table = SymbolTable::from_names(names);

        let mut solver: Solver = Solver::new();
        for clause in cardinality.clauses() {
            solver.add_clause(clause.iter().map(|l| table.encode(l).unwrap()));
        }
        for (i, input) in inputs(n).iter().enumerate() {
            let ix = table.encode(input).unwrap();
            solver.add_clause([if i < m { ix } else { -ix }]);
        }
        solver.solve() == Some(true)
    }

    #[test]
    fn test_network_shape() {
        let mut temps = TempVars::new();
        let (network, levels) = Cardinality::make_adder_network(inputs(8), &mut temps);
        // 8 -> 3 sums + 3 carries (plus padding), then recontraction
        assert_eq!(levels.len(), 4);
        assert_eq!(network[0].inputs[0].name(), "v0");
        assert_eq!(network[0].sum.name(), "{x001}");
        assert_eq!(network[0].carry.name(), "{x002}");
        // the last level-0 triple is padded
        assert_eq!(network[2].inputs[2], Literal::zero());
        assert_eq!(temps.issued() as usize, network.len() * 2);
    }

    #[test]
    fn test_padding_clauses_dropped() {
        let mut temps = TempVars::new();
        let (network, _) = Cardinality::make_adder_network(inputs(2), &mut temps);
        assert_eq!(network.len(), 1);
        let clauses = Cardinality::make_adder_clauses(&network);
        // the 4 clauses ending in the padding wire are gone
        assert_eq!(clauses.len(), 3);
        assert!(clauses.iter().flatten().all(|l| l.name() != ZERO_NAME));
    }

    #[test]
    fn test_greater_than_or_equal_five_of_eight() {
        let mut temps = TempVars::new();
        let cardinality = Cardinality::greater_than_or_equal(inputs(8), 5, &mut temps);
        for m in 0..=8 {
            assert_eq!(satisfiable_with(&cardinality, 8, m), m >= 5, "m = {}", m);
        }
    }

    #[test]
    fn test_less_than_or_equal() {
        for (n, k) in [(8, 3), (7, 5), (5, 0), (6, 6)] {
            let mut temps = TempVars::new();
            let cardinality = Cardinality::less_than_or_equal(inputs(n), k as i64, &mut temps);
            for m in 0..=n {
                assert_eq!(satisfiable_with(&cardinality, n, m), m <= k, "n = {}, k = {}, m = {}", n, k, m);
            }
        }
    }

    #[test]
    fn test_constraint_bits() {
        let mut temps = TempVars::new();
        let cardinality = Cardinality::less_than_or_equal(inputs(8), 5, &mut temps);
        let polarities: Vec<bool> = cardinality
            .constraint_clauses
            .iter()
            .map(|clause| clause[0].polarity())
            .collect();
        // 5 = 0b0101, least significant level first
        assert_eq!(polarities, vec![true, false, true, false]);
    }

    #[test]
    fn test_empty_input() {
        let mut temps = TempVars::new();
        let none = Cardinality::greater_than_or_equal(Vec::new(), 0, &mut temps);
        assert!(none.levels.is_empty());
        assert_eq!(none.clauses().count(), 0);

        let impossible = Cardinality::greater_than_or_equal(Vec::new(), 1, &mut temps);
        assert_eq!(impossible.constraint_clauses, vec![Vec::<Literal>::new()]);
    }

    #[test]
    fn test_comparator_names() {
        assert_eq!(Comparator::AtLeast.to_string(), "GreaterThanOrEqual");
        let parsed: Comparator = serde_yaml::from_str("at_most").unwrap();
        assert_eq!(parsed, Comparator::AtMost);
    }
}
