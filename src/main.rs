//! Reactor chain CLI
//!
//! Loads scenario files and runs reactions and consistency checks on them.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use reactor_chain::report::{format_material_table, format_product_tree};
use reactor_chain::scenario::{self, Scenario};
use reactor_chain::{ReactorError, ReactorSimulator};

#[derive(Parser)]
#[command(name = "reactor-chain")]
#[command(about = "Fission chain simulator: energy, disposal cost and residual materials")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in Uranium-235 walkthrough
    Demo,

    /// List the materials defined by a scenario file
    Materials {
        /// Path to the scenario file
        file: PathBuf,
    },

    /// Simulate a reaction starting at a root material
    Simulate {
        /// Path to the scenario file
        file: PathBuf,

        /// Material the reaction starts from
        root: String,

        /// Quantity of the root material consumed
        #[arg(short, long, default_value = "1.0")]
        quantity: f64,

        /// Show the product tree
        #[arg(short, long)]
        verbose: bool,
    },

    /// Find the first missing auxiliary in a chain
    Check {
        /// Path to the scenario file
        file: PathBuf,

        /// Material the chain starts from
        root: String,

        /// Auxiliaries on hand
        available: Vec<String>,
    },

    /// Run the queries in a scenario file, or in every scenario under a directory
    Run {
        /// Scenario file or directory
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo => run_demo()?,

        Commands::Materials { file } => {
            let scenario = scenario::load_scenario(&file)?;
            if scenario.simulator.is_empty() {
                println!("No materials in {}", file.display());
            } else {
                print!("{}", format_material_table(&scenario.simulator));
            }
        }

        Commands::Simulate {
            file,
            root,
            quantity,
            verbose,
        } => {
            let scenario = scenario::load_scenario(&file)?;

            if verbose {
                println!("Product tree:\n");
                println!("{}", format_product_tree(&scenario.simulator, &root)?);
            }

            let report = scenario.simulator.simulate_reaction(&root, quantity)?;
            println!("{}", report);
        }

        Commands::Check {
            file,
            root,
            available,
        } => {
            let scenario = scenario::load_scenario(&file)?;
            let available: HashSet<String> = available.into_iter().collect();
            match scenario.simulator.find_inconsistency(&root, &available)? {
                Some(aux) => println!("Missing auxiliary: {}", aux),
                None => println!("Chain from {} is consistent", root),
            }
        }

        Commands::Run { path } => {
            let files = if path.is_dir() {
                scenario::find_scenario_files(&path)?
            } else {
                vec![path]
            };
            if files.is_empty() {
                println!("No .{} files found", scenario::SCENARIO_EXTENSION);
            }

            for file in files {
                println!("=== {} ===", file.display());
                let scenario = scenario::load_scenario(&file)?;
                run_scenario(&scenario)?;
            }
        }
    }

    Ok(())
}

fn run_scenario(scenario: &Scenario) -> Result<()> {
    let outcomes = scenario.run()?;
    if outcomes.is_empty() {
        println!("{} materials, no queries", scenario.simulator.len());
    }
    for outcome in outcomes {
        println!("{}", outcome);
    }
    Ok(())
}

fn describe_material(rs: &ReactorSimulator, name: &str) -> Result<String> {
    let m = rs.get_material(name)?;
    Ok(format!("{} | energy {} | info '{}'", m.name(), m.energy(), m.info()))
}

fn describe_products(rs: &ReactorSimulator, name: &str) -> Result<String> {
    Ok(format!("{} products: {:?}", name, rs.products_of(name)?))
}

fn describe_inconsistency(rs: &ReactorSimulator, root: &str, available: &[&str]) -> Result<String> {
    let set: HashSet<&str> = available.iter().copied().collect();
    let found = rs.find_inconsistency(root, &set)?;
    Ok(format!("{:?} -> {}", available, found.as_deref().unwrap_or("none")))
}

fn describe_rejection(result: reactor_chain::error::Result<()>, what: &str) -> String {
    match result {
        Err(ReactorError::InvalidOperation { .. }) => format!("{} correctly rejected", what),
        Err(other) => format!("[ERROR]: {} failed with {}", what, other),
        Ok(()) => format!("[ERROR]: {} not detected", what),
    }
}

/// Scripted walkthrough of every simulator operation, one output line per entry
fn demo_transcript() -> Result<Vec<String>> {
    let mut out = vec!["--- Materials ---".to_string()];
    let mut rs = ReactorSimulator::new();
    rs.add_fuel("Uranium-235", 11.3, 100.0);
    rs.add_waste("Bario", 2.5, 50.0);
    rs.add_auxiliary("Auxiliary1");

    for name in ["Uranium-235", "Bario", "Auxiliary1"] {
        out.push(describe_material(&rs, name)?);
    }

    out.push(String::new());
    out.push("--- Links ---".to_string());
    rs.set_auxiliary("Uranium-235", "Auxiliary1")?;
    out.push(format!(
        "Uranium-235 requires {}",
        rs.auxiliary_of("Uranium-235")?.unwrap_or("nothing")
    ));

    rs.add_waste("Krypton", 3.2, 40.0);
    rs.add_auxiliary("Auxiliary2");
    rs.add_product("Uranium-235", "Bario", 0.7)?;
    rs.add_product("Uranium-235", "Krypton", 0.2)?;
    out.push(describe_products(&rs, "Uranium-235")?);
    out.push(describe_products(&rs, "Bario")?);

    out.push(describe_rejection(
        rs.add_product("Auxiliary1", "Bario", 0.3),
        "Product on auxiliary",
    ));
    out.push(describe_rejection(
        rs.set_auxiliary("Auxiliary1", "Auxiliary2"),
        "Auxiliary on auxiliary",
    ));

    out.push(String::new());
    out.push("--- Intermediate ---".to_string());
    rs.add_fuel("Uranium-232", 5.4, 70.0);
    rs.add_intermediate("Bario", "Uranium-232", (0.3, 0.5))?;
    out.push(describe_products(&rs, "Uranium-235")?);
    out.push(describe_products(&rs, "Uranium-232")?);

    out.push(String::new());
    out.push("--- Consistency ---".to_string());
    out.push(describe_inconsistency(&rs, "Uranium-235", &["Auxiliary1"])?);
    rs.set_auxiliary("Uranium-232", "Auxiliary2")?;
    out.push(describe_inconsistency(&rs, "Uranium-235", &["Auxiliary2"])?);
    out.push(describe_inconsistency(
        &rs,
        "Uranium-235",
        &["Auxiliary1", "Auxiliary2"],
    )?);

    out.push(String::new());
    out.push("--- Reaction ---".to_string());
    let tree = format_product_tree(&rs, "Uranium-235")?;
    out.extend(tree.lines().map(str::to_string));
    out.push(String::new());
    let report = rs.simulate_reaction("Uranium-235", 20.0)?;
    out.extend(report.to_string().lines().map(str::to_string));

    Ok(out)
}

fn run_demo() -> Result<()> {
    for line in demo_transcript()? {
        println!("{}", line);
    }
    Ok(())
}
