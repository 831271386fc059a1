//! DIMACS CNF output and decoding of solver assignments

use super::tags::expand_tag_clauses;
use super::variables::SymbolTable;
use crate::error::{CompileError, Result};
use crate::symbolic::{collect_variables, Clause, Literal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Prefix of the comment lines mapping variable names to indices
pub const VARIABLE_COMMENT: &str = "c variable ";

/// Decoded value of a variable: boolean, or an integer recombined from tag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(u64),
}

impl Value {
    /// Truth of a boolean, non-zero for an integer
    pub fn is_set(&self) -> bool {
        match *self {
            Value::Bool(b) => b,
            Value::Int(n) => n != 0,
        }
    }

    pub fn as_int(&self) -> u64 {
        match *self {
            Value::Bool(b) => u64::from(b),
            Value::Int(n) => n,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
        }
    }
}

/// One line of a CNF file body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CnfLine {
    Comment(String),
    Clause(Vec<i32>),
}

/// Numbered CNF ready for a solver or a DIMACS file
#[derive(Debug, Clone)]
pub struct CnfFormula {
    pub symbols: SymbolTable,
    pub lines: Vec<CnfLine>,
}

impl CnfFormula {
    pub fn variable_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn clause_count(&self) -> usize {
        self.clauses().count()
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Vec<i32>> {
        self.lines.iter().filter_map(|line| match line {
            CnfLine::Clause(clause) => Some(clause),
            CnfLine::Comment(_) => None,
        })
    }

    /// Write in DIMACS format with one `c variable` comment per variable.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "p cnf {} {}", self.variable_count(), self.clause_count())?;
        for (name, ix) in self.symbols.iter() {
            writeln!(out, "{}{}: {}", VARIABLE_COMMENT, name.replace('~', ""), ix)?;
        }
        for line in &self.lines {
            match line {
                CnfLine::Comment(text) => writeln!(out, "c {}", text)?,
                CnfLine::Clause(clause) => {
                    let numbers: Vec<String> = clause.iter().map(i32::to_string).collect();
                    writeln!(out, "{} 0", numbers.join(" "))?;
                }
            }
        }
        Ok(())
    }
}

/// True if some variable occurs with both polarities
fn is_always_true(literals: &[Literal]) -> bool {
    let positive: HashSet<&str> = literals.iter().filter(|l| l.polarity()).map(Literal::name).collect();
    literals
        .iter()
        .any(|l| !l.polarity() && positive.contains(l.name()))
}

/// Remove duplicate literals, duplicate clauses and clauses that are always true.
pub fn minimize_clauses(clauses: &[Clause]) -> Vec<Clause> {
    let mut seen: HashSet<Vec<Literal>> = HashSet::new();
    let mut minimized = Vec::with_capacity(clauses.len());
    for clause in clauses {
        match clause {
            Clause::Comment(_) => minimized.push(clause.clone()),
            Clause::Disjunction(literals) => {
                let deduped: Vec<Literal> = literals
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                if !seen.contains(&deduped) && !is_always_true(&deduped) {
                    seen.insert(deduped.clone());
                    minimized.push(Clause::Disjunction(deduped));
                }
            }
        }
    }
    minimized
}

/// Expand tags, number the variables in name order and minimize the clauses.
pub fn compile_cnf(clauses: &[Clause]) -> Result<CnfFormula> {
    let expanded = expand_tag_clauses(clauses)?;
    let symbols = SymbolTable::from_names(collect_variables(&expanded));

    let lines = minimize_clauses(&expanded)
        .into_iter()
        .map(|clause| match clause {
            Clause::Comment(text) => Ok(CnfLine::Comment(text)),
            Clause::Disjunction(literals) => literals
                .iter()
                .map(|literal| {
                    symbols.encode(literal).ok_or_else(|| {
                        CompileError::Consistency(format!("{} has no variable index", literal))
                    })
                })
                .collect::<Result<Vec<i32>>>()
                .map(CnfLine::Clause),
        })
        .collect::<Result<Vec<_>>>()?;

    let formula = CnfFormula { symbols, lines };
    info!(
        "CNF has {} variables and {} clauses",
        formula.variable_count(),
        formula.clause_count()
    );
    Ok(formula)
}

/// Compile symbolic clauses and write them in DIMACS format.
pub fn write_dimacs<W: Write>(clauses: &[Clause], out: &mut W) -> Result<CnfFormula> {
    let formula = compile_cnf(clauses)?;
    formula.write(out)?;
    Ok(formula)
}

/// Recover the name table from the `c variable` comments of a DIMACS file.
pub fn read_symbol_table<R: BufRead>(cnf: R) -> Result<SymbolTable> {
    let mut table = SymbolTable::default();
    for line in cnf.lines() {
        let line = line?;
        let Some(rest) = line.strip_prefix(VARIABLE_COMMENT) else {
            continue;
        };
        let Some((name, index)) = rest.split_once(": ") else {
            continue;
        };
        let digits: String = index.chars().take_while(char::is_ascii_digit).collect();
        if name.is_empty() || name.contains(' ') || digits.is_empty() {
            continue;
        }
        let index = digits
            .parse::<i32>()
            .map_err(|e| CompileError::Decode(format!("Bad variable index in {:?}: {}", line, e)))?;
        table.insert(name, index);
    }
    Ok(table)
}

/// Signed literals of the `v` lines of solver output, without the 0 terminators.
pub fn parse_assignment<R: BufRead>(solution: R) -> Result<Vec<i32>> {
    let mut assignment = Vec::new();
    for line in solution.lines() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("v") {
            continue;
        }
        for token in tokens {
            let ix: i32 = token
                .parse()
                .map_err(|_| CompileError::Decode(format!("Bad literal {:?} in solver output", token)))?;
            if ix != 0 {
                assignment.push(ix);
            }
        }
    }
    Ok(assignment)
}

/// Named values of an assignment, tag bits recombined into integers.
pub fn decode_assignment(symbols: &SymbolTable, assignment: &[i32]) -> Result<Vec<(String, Value)>> {
    let mut values: BTreeMap<String, Value> = BTreeMap::new();
    for &ix in assignment {
        let name = symbols
            .name(ix.abs())
            .ok_or(CompileError::UnknownVariable(ix.unsigned_abs()))?;
        let truth = ix > 0;
        match name.split_once('#') {
            None => {
                values.insert(name.to_string(), Value::Bool(truth));
            }
            Some((base, bit)) => {
                let bit: u32 = bit
                    .parse()
                    .map_err(|_| CompileError::Decode(format!("Bad bit index in {}", name)))?;
                let previous = values.get(base).map(Value::as_int).unwrap_or(0);
                let mask = if truth { 1u64.checked_shl(bit).unwrap_or(0) } else { 0 };
                values.insert(base.to_string(), Value::Int(previous | mask));
            }
        }
    }
    debug!("Decoded {} values from {} literals", values.len(), assignment.len());
    Ok(values.into_iter().collect())
}

/// Decode solver output using the variable comments of the paired CNF file.
pub fn load_results<C: BufRead, S: BufRead>(cnf: C, solution: S) -> Result<Vec<(String, Value)>> {
    let symbols = read_symbol_table(cnf)?;
    let assignment = parse_assignment(solution)?;
    decode_assignment(&symbols, &assignment)
}

/// Solver output text for an in-process result, in the usual competition format.
pub fn format_solver_output(assignment: Option<&[i32]>) -> String {
    match assignment {
        None => "s UNSATISFIABLE\n".to_string(),
        Some(literals) => {
            let mut text = String::from("s SATISFIABLE\nv");
            for ix in literals {
                text.push(' ');
                text.push_str(&ix.to_string());
            }
            text.push_str(" 0\n");
            text
        }
    }
}

/// Append a clause ruling out the solution and bump the header clause count.
pub fn exclude_solution(cnf: &str, solution: &str) -> Result<String> {
    let mut out = String::with_capacity(cnf.len() + solution.len());
    let mut found_header = false;
    for line in cnf.lines() {
        if line.starts_with("p cnf") && !found_header {
            let mut tokens: Vec<&str> = line.split_whitespace().collect();
            let count: usize = tokens
                .pop()
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| CompileError::Decode(format!("Bad header {:?}", line)))?;
            out.push_str(&format!("{} {}\n", tokens.join(" "), count + 1));
            found_header = true;
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    if !found_header {
        return Err(CompileError::Decode("CNF has no 'p cnf' header".to_string()));
    }

    let assignment = parse_assignment(solution.as_bytes())?;
    out.push_str("c excluded solution:\n");
    for ix in assignment {
        out.push_str(&(-ix).to_string());
        out.push(' ');
    }
    out.push_str("0\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_lines;

    fn dimacs_text(clauses: &[Clause]) -> String {
        let mut out = Vec::new();
        write_dimacs(clauses, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_minimize() {
        let clauses = parse_lines("# keep\nb a a\na b\nx ~x\nc").unwrap();
        let minimized = minimize_clauses(&clauses);
        assert_eq!(minimized.len(), 3);
        assert_eq!(minimized[1], Clause::of(vec![Literal::new("a"), Literal::new("b")]));
        assert_eq!(minimized[2], Clause::unit(Literal::new("c")));
    }

    #[test]
    fn test_write_dimacs() {
        let clauses = parse_lines("# first\nb ~a\na\nb ~a").unwrap();
        let text = dimacs_text(&clauses);
        assert_eq!(
            text,
            "p cnf 2 2\nc variable a: 1\nc variable b: 2\nc first\n-1 2 0\n1 0\n"
        );
    }

    #[test]
    fn test_write_dimacs_expands_tags() {
        let clauses = parse_lines("t(1) t(2)").unwrap();
        let formula = compile_cnf(&clauses).unwrap();
        assert_eq!(formula.variable_count(), 2);
        assert_eq!(formula.symbols.index("t#0"), Some(1));
        assert!(formula
            .lines
            .contains(&CnfLine::Comment("Setting upper bound on tags.".to_string())));
    }

    #[test]
    fn test_load_results() {
        let cnf = "p cnf 4 0\nc variable a: 1\nc variable t#0: 2\nc variable t#1: 3\nc variable t#2: 4\n";
        let solution = "s SATISFIABLE\nv -1 2\nv -3 4 0\n";
        let results = load_results(cnf.as_bytes(), solution.as_bytes()).unwrap();
        assert_eq!(
            results,
            vec![
                ("a".to_string(), Value::Bool(false)),
                ("t".to_string(), Value::Int(5)),
            ]
        );
    }

    #[test]
    fn test_unknown_variable() {
        let cnf = "p cnf 1 0\nc variable a: 1\n";
        let result = load_results(cnf.as_bytes(), "v 1 -2 0\n".as_bytes());
        assert!(matches!(result, Err(CompileError::UnknownVariable(2))));
    }

    #[test]
    fn test_round_trip_through_text() {
        let clauses = parse_lines("x ~y(3)\ny(1) z").unwrap();
        let formula = compile_cnf(&clauses).unwrap();
        let mut out = Vec::new();
        formula.write(&mut out).unwrap();
        let table = read_symbol_table(out.as_slice()).unwrap();
        assert_eq!(table.len(), formula.variable_count());
        for (name, ix) in formula.symbols.iter() {
            assert_eq!(table.index(name), Some(ix));
        }
    }

    #[test]
    fn test_exclude_solution() {
        let cnf = "p cnf 2 1\nc variable a: 1\nc variable b: 2\n1 2 0\n";
        let excluded = exclude_solution(cnf, "s SATISFIABLE\nv 1 -2 0\n").unwrap();
        assert_eq!(
            excluded,
            "p cnf 2 2\nc variable a: 1\nc variable b: 2\n1 2 0\nc excluded solution:\n-1 2 0\n"
        );
        assert!(exclude_solution("1 2 0\n", "v 1 0\n").is_err());
    }

    #[test]
    fn test_format_solver_output() {
        assert_eq!(format_solver_output(Some(&[1, -2][..])), "s SATISFIABLE\nv 1 -2 0\n");
        assert_eq!(format_solver_output(None), "s UNSATISFIABLE\n");
        assert_eq!(parse_assignment(format_solver_output(Some(&[3, -1][..])).as_bytes()).unwrap(), vec![3, -1]);
    }
}
