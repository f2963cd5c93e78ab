//! Scenario files: a line-oriented description of a material graph plus the
//! queries to run against it
//!
//! ```text
//! # materials
//! fuel Uranium-235 11.3 100
//! waste Bario 2.5 50
//! auxiliary Auxiliary1
//! # links
//! requires Uranium-235 Auxiliary1
//! product Uranium-235 Bario 0.7
//! intermediate Bario Uranium-232 0.3 0.5
//! # queries
//! simulate Uranium-235 20
//! check Uranium-235 Auxiliary1 Auxiliary2
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::debug;
use regex::Regex;
use walkdir::WalkDir;

use crate::reactor::ReactorSimulator;
use crate::report::ReactionReport;

pub const SCENARIO_EXTENSION: &str = "reactor";

const NUMBER: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

/// A query queued by a scenario file
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Simulate { root: String, quantity: f64 },
    Check { root: String, available: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reaction {
        root: String,
        quantity: f64,
        report: ReactionReport,
    },
    Consistency {
        root: String,
        missing: Option<String>,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Reaction {
                root,
                quantity,
                report,
            } => {
                writeln!(f, "Reaction of {} x {}", root, quantity)?;
                write!(f, "{}", report)
            }
            Outcome::Consistency { root, missing } => match missing {
                Some(aux) => writeln!(f, "Chain from {}: missing auxiliary {}", root, aux),
                None => writeln!(f, "Chain from {}: consistent", root),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct Scenario {
    pub simulator: ReactorSimulator,
    pub actions: Vec<Action>,
}

impl Scenario {
    /// Execute the queued queries in file order
    pub fn run(&self) -> Result<Vec<Outcome>> {
        let mut outcomes = Vec::new();
        for action in &self.actions {
            let outcome = match action {
                Action::Simulate { root, quantity } => Outcome::Reaction {
                    root: root.clone(),
                    quantity: *quantity,
                    report: self.simulator.simulate_reaction(root, *quantity)?,
                },
                Action::Check { root, available } => {
                    let available: HashSet<&str> = available.iter().map(String::as_str).collect();
                    Outcome::Consistency {
                        root: root.clone(),
                        missing: self.simulator.find_inconsistency(root, &available)?,
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

struct Directives {
    comment: Regex,
    fuel: Regex,
    waste: Regex,
    auxiliary: Regex,
    requires: Regex,
    product: Regex,
    intermediate: Regex,
    simulate: Regex,
    check: Regex,
}

impl Directives {
    fn new() -> Result<Self> {
        let n = NUMBER;
        Ok(Self {
            // `#` starts a comment only at line start or after whitespace,
            // so it may appear inside names
            comment: Regex::new(r"(?:^|\s)#.*$")?,
            fuel: Regex::new(&format!(r"^fuel\s+(\S+)\s+({n})\s+({n})$"))?,
            waste: Regex::new(&format!(r"^waste\s+(\S+)\s+({n})\s+({n})$"))?,
            auxiliary: Regex::new(r"^auxiliary\s+(\S+)$")?,
            requires: Regex::new(r"^requires\s+(\S+)\s+(\S+)$")?,
            product: Regex::new(&format!(r"^product\s+(\S+)\s+(\S+)\s+({n})$"))?,
            intermediate: Regex::new(&format!(
                r"^intermediate\s+(\S+)\s+(\S+)\s+({n})\s+({n})$"
            ))?,
            simulate: Regex::new(&format!(r"^simulate\s+(\S+)\s+({n})$"))?,
            check: Regex::new(r"^check\s+(\S+)((?:\s+\S+)*)$")?,
        })
    }
}

fn number(text: &str) -> Result<f64> {
    text.parse::<f64>()
        .with_context(|| format!("invalid number '{}'", text))
}

/// Build a scenario from its text. Graph directives are applied in order;
/// the first bad line aborts the load.
pub fn parse_scenario(source: &str) -> Result<Scenario> {
    let d = Directives::new()?;
    let mut scenario = Scenario::default();

    for (index, raw) in source.lines().enumerate() {
        let stripped = d.comment.replace(raw, "");
        let line = stripped.trim();
        if line.is_empty() {
            continue;
        }
        apply_line(&d, &mut scenario, line)
            .with_context(|| format!("line {}: {}", index + 1, line))?;
    }

    debug!(
        "Parsed scenario with {} materials and {} queries",
        scenario.simulator.len(),
        scenario.actions.len()
    );
    Ok(scenario)
}

fn apply_line(d: &Directives, scenario: &mut Scenario, line: &str) -> Result<()> {
    let sim = &mut scenario.simulator;

    if let Some(cap) = d.fuel.captures(line) {
        sim.add_fuel(&cap[1], number(&cap[2])?, number(&cap[3])?);
    } else if let Some(cap) = d.waste.captures(line) {
        sim.add_waste(&cap[1], number(&cap[2])?, number(&cap[3])?);
    } else if let Some(cap) = d.auxiliary.captures(line) {
        sim.add_auxiliary(&cap[1]);
    } else if let Some(cap) = d.requires.captures(line) {
        sim.set_auxiliary(&cap[1], &cap[2])?;
    } else if let Some(cap) = d.product.captures(line) {
        sim.add_product(&cap[1], &cap[2], number(&cap[3])?)?;
    } else if let Some(cap) = d.intermediate.captures(line) {
        sim.add_intermediate(&cap[1], &cap[2], (number(&cap[3])?, number(&cap[4])?))?;
    } else if let Some(cap) = d.simulate.captures(line) {
        scenario.actions.push(Action::Simulate {
            root: cap[1].to_string(),
            quantity: number(&cap[2])?,
        });
    } else if let Some(cap) = d.check.captures(line) {
        scenario.actions.push(Action::Check {
            root: cap[1].to_string(),
            available: cap[2].split_whitespace().map(str::to_string).collect(),
        });
    } else {
        return Err(anyhow!("unrecognized directive"));
    }

    Ok(())
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_scenario(&source).with_context(|| format!("Failed to load {}", path.display()))
}

/// Find all scenario files beneath `dir`, sorted by path
pub fn find_scenario_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == SCENARIO_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReactorError;

    const URANIUM: &str = include_str!("../scenarios/uranium.reactor");

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_builds_graph() {
        let scenario = parse_scenario(URANIUM).unwrap();
        let sim = &scenario.simulator;

        assert_eq!(sim.get_material("Uranium-235").unwrap().info(), "Price 100");
        assert_eq!(
            sim.products_of("Uranium-235").unwrap(),
            vec![("Krypton", 0.2), ("Uranium-232", 0.3)]
        );
        assert_eq!(sim.products_of("Uranium-232").unwrap(), vec![("Bario", 0.5)]);
        assert_eq!(sim.auxiliary_of("Uranium-232").unwrap(), Some("Auxiliary2"));
    }

    #[test]
    fn test_run_outcomes() {
        let outcomes = parse_scenario(URANIUM).unwrap().run().unwrap();
        assert_eq!(outcomes.len(), 3);

        match &outcomes[0] {
            Outcome::Reaction { report, .. } => {
                assert_eq!(report.residual.len(), 2);
                assert_eq!(report.residual[0].0, "Krypton");
                assert!(approx_eq(report.residual[0].1, 4.0));
                assert_eq!(report.residual[1].0, "Bario");
                assert!(approx_eq(report.residual[1].1, 3.0));
                assert!(approx_eq(report.total_energy, 258.4));
                assert!(approx_eq(report.total_disposal, 310.0));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            outcomes[1],
            Outcome::Consistency {
                root: "Uranium-235".to_string(),
                missing: Some("Auxiliary1".to_string()),
            }
        );
        assert_eq!(
            outcomes[2],
            Outcome::Consistency {
                root: "Uranium-235".to_string(),
                missing: None,
            }
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let scenario = parse_scenario("\n# header\nfuel F 1 2   # trailing\n\n").unwrap();
        assert_eq!(scenario.simulator.len(), 1);
        assert!(scenario.actions.is_empty());
    }

    #[test]
    fn test_hash_inside_names() {
        let source = "fuel U#235 1 2 # fissile\nwaste Ba#1 1 3\nproduct U#235 Ba#1 0.5\n";
        let scenario = parse_scenario(source).unwrap();
        let sim = &scenario.simulator;

        assert_eq!(sim.len(), 2);
        assert_eq!(sim.get_material("U#235").unwrap().info(), "Price 2");
        assert_eq!(sim.products_of("U#235").unwrap(), vec![("Ba#1", 0.5)]);
    }

    #[test]
    fn test_check_without_auxiliaries() {
        let scenario = parse_scenario("fuel F 1 2\ncheck F").unwrap();
        assert_eq!(
            scenario.actions,
            vec![Action::Check {
                root: "F".to_string(),
                available: vec![],
            }]
        );
    }

    #[test]
    fn test_unknown_directive_reports_line() {
        let err = parse_scenario("fuel F 1 2\nplutonium P 1").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_bad_number_is_rejected() {
        assert!(parse_scenario("fuel F one 2").is_err());
    }

    #[test]
    fn test_auxiliary_misuse_surfaces_reactor_error() {
        let err = parse_scenario("auxiliary A\nfuel F 1 2\nproduct A F 0.5").unwrap_err();
        let reactor = err.downcast_ref::<ReactorError>().unwrap();
        assert!(matches!(reactor, ReactorError::InvalidOperation { .. }));
    }

    #[test]
    fn test_unknown_material_in_link() {
        let err = parse_scenario("fuel F 1 2\nproduct F W 0.5").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ReactorError>(),
            Some(&ReactorError::NotFound("W".to_string()))
        );
    }

    #[test]
    fn test_outcome_display() {
        let text = Outcome::Consistency {
            root: "Fuel1".to_string(),
            missing: Some("Aux1".to_string()),
        }
        .to_string();
        assert_eq!(text, "Chain from Fuel1: missing auxiliary Aux1\n");
    }

    #[test]
    fn test_find_scenario_files() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        let files = find_scenario_files(&dir).unwrap();
        assert!(files.iter().any(|f| f.ends_with("uranium.reactor")));
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e == "reactor")));
    }
}
