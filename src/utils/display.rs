//! Display and output formatting utilities

use crate::grid::values::get_value_grid;
use crate::sat::dimacs::Value;
use crate::sat::encoder::EncodingStatistics;
use crate::symbolic::Literal;
use serde::{Deserialize, Serialize};

/// Named values of a decoded solution
pub type Results = [(String, Value)];

/// Renders decoded results as text
pub type Formatter = fn(&Results) -> String;

/// Symbols for cell values 0, 1, 2 in hex output
pub const HEX_SYMBOLS: &str = ".O*";

/// Ways of printing a decoded solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Name and value per line
    List,
    /// Generation 0 as a Life picture
    Life,
    /// Generation 0 skewed as a rhombic section of a hex grid
    Hex,
    HexNumeric,
    /// A symbolic clause ruling the solution out
    Exclude,
}

impl OutputFormat {
    pub fn formatter(self) -> Formatter {
        match self {
            OutputFormat::List => format_list,
            OutputFormat::Life => format_life,
            OutputFormat::Hex => format_hex,
            OutputFormat::HexNumeric => format_hex_numeric,
            OutputFormat::Exclude => format_exclude,
        }
    }

    pub fn render(self, results: &Results) -> String {
        (self.formatter())(results)
    }
}

/// Names of user variables; temporaries and the zero wire sort after `{`
fn is_user_variable(name: &str) -> bool {
    name <= "{"
}

pub fn format_list(results: &Results) -> String {
    results
        .iter()
        .filter(|(name, _)| is_user_variable(name))
        .map(|(name, value)| format!("{} {}\n", name, value))
        .collect()
}

pub fn format_life(results: &Results) -> String {
    get_value_grid("c", results).to_string()
}

fn hex_symbol(symbols: &str, value: u64) -> String {
    usize::try_from(value)
        .ok()
        .and_then(|ix| symbols.chars().nth(ix))
        .map(String::from)
        .unwrap_or_else(|| value.to_string())
}

/// Generation 0 with each row shifted left by one more space than the last
pub fn format_hex_with(results: &Results, symbols: &str) -> String {
    let grid = get_value_grid("c", results);
    let mut output = String::new();
    for (i, row) in grid.layer(0).iter().enumerate() {
        output.push_str(&" ".repeat(grid.width.saturating_sub(i)));
        let cells: Vec<String> = row
            .iter()
            .map(|cell| hex_symbol(symbols, cell.map_or(0, |v| v.as_int())))
            .collect();
        output.push_str(&cells.join(" "));
        output.push('\n');
    }
    output
}

pub fn format_hex(results: &Results) -> String {
    format_hex_with(results, HEX_SYMBOLS)
}

pub fn format_hex_numeric(results: &Results) -> String {
    format_hex_with(results, "")
}

/// Complement of every user value: booleans flip, integers are negated
/// with their value as tag.
pub fn format_exclude(results: &Results) -> String {
    let literals: Vec<String> = results
        .iter()
        .filter(|(name, _)| is_user_variable(name))
        .map(|(name, value)| {
            match value {
                Value::Bool(b) => Literal::with(name.as_str(), !b, None),
                Value::Int(n) => Literal::with(name.as_str(), false, u32::try_from(*n).ok()),
            }
            .to_string()
        })
        .collect();
    format!("{}\n", literals.join(" "))
}

/// One-line summary of an encoding
pub fn format_statistics_line(stats: &EncodingStatistics, variables: usize, clauses: usize) -> String {
    format!(
        "{} p{}: {} cells/generation, {} variables, {} clauses",
        stats.equivalence, stats.period, stats.cells_per_generation, variables, clauses
    )
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<(String, Value)> {
        vec![
            ("c_0_0_0".to_string(), Value::Bool(true)),
            ("c_0_1_0".to_string(), Value::Bool(false)),
            ("c_1_0_0".to_string(), Value::Bool(false)),
            ("c_1_1_0".to_string(), Value::Bool(true)),
            ("{x001}".to_string(), Value::Bool(true)),
        ]
    }

    #[test]
    fn test_list_skips_temporaries() {
        let text = OutputFormat::List.render(&results());
        assert_eq!(text, "c_0_0_0 true\nc_0_1_0 false\nc_1_0_0 false\nc_1_1_0 true\n");
    }

    #[test]
    fn test_life() {
        assert_eq!(OutputFormat::Life.render(&results()), "*.\n.*\n");
    }

    #[test]
    fn test_hex() {
        let results = vec![
            ("c_0_0_0".to_string(), Value::Int(2)),
            ("c_0_1_0".to_string(), Value::Int(0)),
            ("c_1_0_0".to_string(), Value::Int(1)),
            ("c_1_1_0".to_string(), Value::Int(5)),
        ];
        assert_eq!(OutputFormat::Hex.render(&results), "  * .\n O 5\n");
        assert_eq!(OutputFormat::HexNumeric.render(&results), "  2 0\n 1 5\n");
    }

    #[test]
    fn test_exclude() {
        let mut results = results();
        results.push(("t".to_string(), Value::Int(3)));
        assert_eq!(
            OutputFormat::Exclude.render(&results),
            "~c_0_0_0 c_0_1_0 c_1_0_0 ~c_1_1_0 ~t(3)\n"
        );
    }

    #[test]
    fn test_format_deserialize() {
        let format: OutputFormat = serde_yaml::from_str("hex_numeric").unwrap();
        assert_eq!(format, OutputFormat::HexNumeric);
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));
        assert!(ColorOutput::success("OK").contains("OK"));
    }
}
