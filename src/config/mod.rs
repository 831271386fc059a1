//! Configuration management for grid rule searches

pub mod settings;

pub use settings::{
    CliOverrides, GridConfig, OutputConfig, PopulationBound, RuleConfig, Settings, SolverBackend, SolverConfig,
};
