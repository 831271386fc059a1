//! Tagged (multi-valued) variables lowered to boolean bit vectors
//!
//! A variable `a` whose largest tag is `m` is stored in bits `a#0 .. a#k`
//! with `k` the bit length of `m`.

use crate::error::{CompileError, Result};
use crate::symbolic::{collect_literals, expand_disjunction, Clause, Literal};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::slice;
use tracing::debug;

/// Largest tag used for each multi-valued variable
pub type MaxTags = BTreeMap<String, u32>;

/// Name of bit `bit` of a multi-valued variable
pub fn bit_variable(name: &str, bit: u32) -> String {
    format!("{}#{}", name, bit)
}

fn bit_length(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

/// Literals that together compare the bits of `literal.name` to its tag.
///
/// For a positive literal each bit literal is asserted; for a negative one
/// at least one of them must hold.
pub fn bit_literals(literal: &Literal, max: u32) -> Vec<Literal> {
    let tag = literal.tag().unwrap_or(0);
    (0..bit_length(max))
        .map(|i| {
            let bit_set = (tag >> i) & 1 == 1;
            Literal::with(bit_variable(literal.name(), i), bit_set == literal.polarity(), None)
        })
        .collect()
}

fn record_max<'a>(literals: impl IntoIterator<Item = &'a Literal>) -> MaxTags {
    let mut max_tags = MaxTags::new();
    for literal in literals {
        if let Some(tag) = literal.tag() {
            let entry = max_tags.entry(literal.name().to_string()).or_insert(0);
            *entry = (*entry).max(tag);
        }
    }
    max_tags
}

/// Maximum tag of every multi-valued variable in a clause set
pub fn find_max(clauses: &[Clause]) -> MaxTags {
    record_max(&collect_literals(clauses))
}

/// Maximum tag of every multi-valued variable in a list of literal tuples
pub fn find_max_tuples(tuples: &[Vec<Literal>]) -> MaxTags {
    record_max(tuples.iter().flatten())
}

/// Same maximum for every variable named in `tuples`
pub fn constant_max(tuples: &[Vec<Literal>], max: u32) -> MaxTags {
    tuples
        .iter()
        .flatten()
        .map(|literal| (literal.name().to_string(), max))
        .collect()
}

/// Conjunction of boolean clauses equivalent to a conjunction of literals.
pub fn match_integers_all(literals: &[Literal], max_tags: &MaxTags) -> Result<Vec<Vec<Literal>>> {
    let mut conjunction = Vec::new();
    for literal in literals {
        let Some(tag) = literal.tag() else {
            conjunction.push(vec![literal.clone()]);
            continue;
        };

        let max = *max_tags.get(literal.name()).ok_or_else(|| {
            CompileError::Consistency(format!("No maximum tag known for {}", literal.name()))
        })?;
        if tag > max {
            return Err(CompileError::Consistency(format!(
                "Tag {} of {} exceeds maximum {}",
                tag,
                literal.name(),
                max
            )));
        }

        let bits = bit_literals(literal, max);
        if literal.polarity() {
            conjunction.extend(bits.into_iter().map(|bit| vec![bit]));
        } else {
            conjunction.push(bits);
        }
    }
    Ok(conjunction)
}

/// Boolean clauses asserting that at least one literal of `literals` holds.
///
/// An empty disjunction compiles to the empty clause.
pub fn match_integers_any(literals: &[Literal], max_tags: &MaxTags) -> Result<Vec<Vec<Literal>>> {
    let mut alternatives = literals
        .iter()
        .map(|literal| match_integers_all(slice::from_ref(literal), max_tags))
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let Some(first) = alternatives.next() else {
        return Ok(vec![Vec::new()]);
    };

    let mut clauses = match alternatives.next() {
        None => first,
        Some(second) => {
            let mut acc = expand_disjunction(&first, &second);
            for alternative in alternatives {
                acc = expand_disjunction(&acc, &alternative);
            }
            acc.into_iter().collect()
        }
    };
    clauses.sort();
    Ok(clauses)
}

/// One boolean conjunction per tuple of tagged literals
pub fn make_or_of_ands_matcher(
    tuples: &[Vec<Literal>],
    max_tags: Option<&MaxTags>,
) -> Result<Vec<Vec<Vec<Literal>>>> {
    let found;
    let max_tags = match max_tags {
        Some(max_tags) => max_tags,
        None => {
            found = find_max_tuples(tuples);
            &found
        }
    };
    tuples
        .iter()
        .map(|literals| match_integers_all(literals, max_tags))
        .collect()
}

/// Tuples built by tagging `literals` with each row of tags in turn
pub fn all_tag_tuples(literals: &[Literal], tag_rows: &[Vec<u32>]) -> Vec<Clause> {
    tag_rows
        .iter()
        .map(|row| Clause::of(literals.iter().zip(row).map(|(literal, &tag)| literal.with_tag(tag))))
        .collect()
}

/// Tag clauses satisfied exactly when the variables take one of the tuples.
///
/// Every tuple must mention the same variable names and only tagged
/// literals. The result is every "tuple differs from v" clause over the
/// full value range, minus those ruling out an allowed tuple.
pub fn make_matching_clauses(tuples: &[Vec<Literal>]) -> Result<Vec<Vec<Literal>>> {
    if tuples.is_empty() {
        return Err(CompileError::Consistency("No tuples to match".to_string()));
    }

    let max_tags = find_max_tuples(tuples);
    let names: Vec<&str> = max_tags.keys().map(String::as_str).collect();

    for tuple in tuples {
        if tuple.iter().any(Literal::is_bool) {
            return Err(CompileError::Consistency(format!(
                "{} is not a tag tuple",
                crate::symbolic::text::join_literals(tuple)
            )));
        }
        let mut tuple_names: Vec<&str> = tuple.iter().map(Literal::name).collect();
        tuple_names.sort_unstable();
        if tuple_names != names {
            return Err(CompileError::Consistency(format!(
                "{} does not match names: {}",
                crate::symbolic::text::join_literals(tuple),
                names.join(", ")
            )));
        }
    }

    let inverse: BTreeSet<Vec<Literal>> = tuples
        .iter()
        .map(|tuple| tuple.iter().map(Literal::negate).sorted().collect())
        .collect();

    let product: BTreeSet<Vec<Literal>> = names
        .iter()
        .map(|name| (0..=max_tags[*name]).map(move |i| Literal::with(*name, false, Some(i))))
        .multi_cartesian_product()
        .map(|mut clause| {
            clause.sort();
            clause
        })
        .collect();

    Ok(product.difference(&inverse).cloned().collect())
}

/// Clauses keeping the bit vector of `literal.name` strictly below `limit`.
///
/// Counts upward through the bit pattern of `limit`, forbidding at each
/// step the values whose set bits include the current pattern.
pub fn less_than(literal: &Literal, limit: i64) -> Result<Vec<Vec<Literal>>> {
    if limit <= 0 {
        return Err(CompileError::Consistency(format!(
            "{} is not a positive integer",
            limit
        )));
    }

    let n = (i64::BITS - limit.leading_zeros()) as usize;
    let mut bits: Vec<bool> = (0..n).map(|i| (limit >> i) & 1 == 1).collect();
    let mut clauses = Vec::new();

    while let Some(lowest) = bits.iter().position(|&bit| bit) {
        clauses.push(
            (0..n)
                .filter(|&i| bits[i])
                .map(|i| Literal::with(bit_variable(literal.name(), i as u32), false, None))
                .collect(),
        );
        for bit in bits.iter_mut().skip(lowest) {
            if *bit {
                *bit = false;
            } else {
                *bit = true;
                break;
            }
        }
    }
    Ok(clauses)
}

/// Invert a tag adjustment by searching tags `0..=max_tag`.
pub fn inverse_adjust<F>(adjust: F, max_tag: u32) -> impl Fn(u8, u32) -> Option<u32>
where
    F: Fn(u8, u32) -> u32,
{
    move |orientation, adjusted| (0..=max_tag).find(|&tag| adjust(orientation, tag) == adjusted)
}

/// Replace tagged clauses by boolean bit clauses and bound every bit vector.
///
/// Clause sets without tags are returned unchanged.
pub fn expand_tag_clauses(clauses: &[Clause]) -> Result<Vec<Clause>> {
    let max_tags = find_max(clauses);
    if max_tags.is_empty() {
        return Ok(clauses.to_vec());
    }

    let mut expanded = Vec::with_capacity(clauses.len());
    for clause in clauses {
        match clause {
            Clause::Comment(_) => expanded.push(clause.clone()),
            Clause::Disjunction(literals) => expanded.extend(
                match_integers_any(literals, &max_tags)?
                    .into_iter()
                    .map(Clause::Disjunction),
            ),
        }
    }

    expanded.push(Clause::comment("Setting upper bound on tags."));
    for (name, max) in &max_tags {
        expanded.extend(
            less_than(&Literal::new(name.as_str()), i64::from(*max) + 1)?
                .into_iter()
                .map(Clause::Disjunction),
        );
    }

    debug!(
        "Tag expansion: {} variables, {} clauses -> {}",
        max_tags.len(),
        clauses.len(),
        expanded.len()
    );
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::{parse_lines, parse_literals};
    use std::collections::HashMap;

    fn lits(text: &str) -> Vec<Literal> {
        parse_literals(text).unwrap()
    }

    fn render(clauses: &[Vec<Literal>]) -> Vec<String> {
        clauses
            .iter()
            .map(|c| c.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(" "))
            .collect()
    }

    fn satisfies(clauses: &[Clause], assignment: &HashMap<String, bool>) -> bool {
        clauses.iter().filter_map(Clause::literals).all(|clause| {
            clause
                .iter()
                .any(|l| assignment.get(l.name()).copied().unwrap_or(false) == l.polarity())
        })
    }

    #[test]
    fn test_bit_literals() {
        let positive = Literal::parse("a(5)").unwrap();
        assert_eq!(render(&[bit_literals(&positive, 5)]), vec!["a#0 ~a#1 a#2"]);
        let negative = Literal::parse("~a(5)").unwrap();
        assert_eq!(render(&[bit_literals(&negative, 7)]), vec!["~a#0 a#1 ~a#2"]);
        // a variable pinned to 0 has no bits
        assert!(bit_literals(&Literal::parse("b(0)").unwrap(), 0).is_empty());
    }

    #[test]
    fn test_match_integers_all() {
        let max_tags = MaxTags::from([("a".to_string(), 5)]);
        let equal = match_integers_all(&lits("a(5) x"), &max_tags).unwrap();
        assert_eq!(render(&equal), vec!["a#0", "~a#1", "a#2", "x"]);

        let differ = match_integers_all(&lits("~a(5)"), &max_tags).unwrap();
        assert_eq!(render(&differ), vec!["~a#0 a#1 ~a#2"]);

        assert!(match_integers_all(&lits("a(6)"), &max_tags).is_err());
        assert!(match_integers_all(&lits("b(1)"), &max_tags).is_err());
    }

    #[test]
    fn test_match_integers_any() {
        let max_tags = MaxTags::from([("a".to_string(), 3)]);
        // a is 1 or 2: bits differ, at least one set
        let clauses = match_integers_any(&lits("a(1) a(2)"), &max_tags).unwrap();
        assert_eq!(render(&clauses), vec!["~a#0 ~a#1", "a#0 a#1"]);

        assert_eq!(match_integers_any(&[], &max_tags).unwrap(), vec![Vec::new()]);
    }

    #[test]
    fn test_less_than() {
        let x = Literal::new("x");
        assert_eq!(render(&less_than(&x, 5).unwrap()), vec!["~x#0 ~x#2", "~x#1 ~x#2"]);
        assert_eq!(render(&less_than(&x, 8).unwrap()), vec!["~x#3"]);
        assert_eq!(render(&less_than(&x, 3).unwrap()), vec!["~x#0 ~x#1"]);
        assert!(matches!(less_than(&x, 0), Err(CompileError::Consistency(_))));
    }

    #[test]
    fn test_tag_bound_forbids_out_of_range_values() {
        let clauses = expand_tag_clauses(&parse_lines("a(0) a(4)").unwrap()).unwrap();
        let assign = |value: u32| -> HashMap<String, bool> {
            (0..3)
                .map(|i| (bit_variable("a", i), (value >> i) & 1 == 1))
                .collect()
        };
        assert!(satisfies(&clauses, &assign(0)));
        assert!(satisfies(&clauses, &assign(4)));
        assert!(!satisfies(&clauses, &assign(2)));
        // bits 1,0,1 would decode to 5, which the bound rules out
        assert!(!satisfies(&clauses, &assign(5)));
        assert!(!satisfies(&clauses, &assign(7)));
    }

    #[test]
    fn test_expand_without_tags_is_identity() {
        let clauses = parse_lines("# plain\na ~b\nc").unwrap();
        assert_eq!(expand_tag_clauses(&clauses).unwrap(), clauses);
    }

    #[test]
    fn test_expand_tag_clauses_appends_bounds() {
        let clauses = parse_lines("a(2) b").unwrap();
        let expanded = expand_tag_clauses(&clauses).unwrap();
        assert_eq!(expanded[expanded.len() - 2], Clause::comment("Setting upper bound on tags."));
        assert_eq!(
            expanded.last(),
            Some(&Clause::of(lits("~a#0 ~a#1")))
        );
    }

    #[test]
    fn test_make_matching_clauses() {
        let tuples = vec![lits("a(0) b(1)"), lits("a(1) b(0)")];
        let clauses = make_matching_clauses(&tuples).unwrap();
        assert_eq!(render(&clauses), vec!["~a(0) ~b(0)", "~a(1) ~b(1)"]);
    }

    #[test]
    fn test_make_matching_clauses_rejects_bad_tuples() {
        let mismatched = vec![lits("a(0) b(1)"), lits("a(1) c(0)")];
        assert!(matches!(
            make_matching_clauses(&mismatched),
            Err(CompileError::Consistency(_))
        ));
        let boolean = vec![lits("a(0) b")];
        assert!(make_matching_clauses(&boolean).is_err());
        assert!(make_matching_clauses(&[]).is_err());
    }

    #[test]
    fn test_all_tag_tuples() {
        let tuples = all_tag_tuples(&lits("O W S"), &[vec![1, 2, 3], vec![0, 4, 1]]);
        assert_eq!(tuples[0], Clause::of(lits("O(1) W(2) S(3)")));
        assert_eq!(tuples[1], Clause::of(lits("O(0) W(4) S(1)")));
    }

    #[test]
    fn test_inverse_adjust() {
        let rotate = |orientation: u8, tag: u32| (tag + orientation as u32) % 4;
        let inverse = inverse_adjust(rotate, 3);
        assert_eq!(inverse(1, 0), Some(3));
        assert_eq!(inverse(2, 3), Some(1));
        assert_eq!(inverse(0, 7), None);
    }

    #[test]
    fn test_find_max() {
        let clauses = parse_lines("a(2) ~a(5) b\n# c(9)\nd(0)").unwrap();
        let max_tags = find_max(&clauses);
        assert_eq!(max_tags.get("a"), Some(&5));
        assert_eq!(max_tags.get("d"), Some(&0));
        assert!(!max_tags.contains_key("b"));
        assert!(!max_tags.contains_key("c"));
    }
}
