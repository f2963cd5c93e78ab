//! Reaction results and text rendering of the material graph

use std::fmt;

use crate::error::Result;
use crate::models::MaterialId;
use crate::reactor::ReactorSimulator;

/// Outcome of unfolding a reaction from one root material
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionReport {
    /// Leaf materials and their quantities, in visit order
    pub residual: Vec<(String, f64)>,
    pub total_energy: f64,
    pub total_disposal: f64,
}

impl fmt::Display for ReactionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Reaction Summary ===")?;
        writeln!(f, "Residual materials:")?;
        if self.residual.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (name, quantity) in &self.residual {
            writeln!(f, "  {} x {:.3}", name, quantity)?;
        }
        writeln!(f)?;
        writeln!(f, "Energy:   {:.3}", self.total_energy)?;
        writeln!(f, "Disposal: {:.3}", self.total_disposal)?;
        Ok(())
    }
}

/// Render the product tree below `root`, one edge per line, indented by depth
pub fn format_product_tree(sim: &ReactorSimulator, root: &str) -> Result<String> {
    let root = sim.material_id(root)?;
    let mut output = String::new();
    write_node(sim, root, None, 0, &mut output);
    Ok(output)
}

fn write_node(
    sim: &ReactorSimulator,
    id: MaterialId,
    ratio: Option<f64>,
    indent: usize,
    output: &mut String,
) {
    let material = sim.node(id);
    let prefix = "  ".repeat(indent);

    let mut line = match ratio {
        Some(ratio) => format!("{}-> {} x {}", prefix, material.name(), ratio),
        None => format!("{}{}", prefix, material.name()),
    };
    line.push_str(&format!(" [{}]", material.kind().label()));
    if let Some(aux) = material.auxiliary() {
        line.push_str(&format!(" requires {}", sim.node(aux).name()));
    }
    output.push_str(&line);
    output.push('\n');

    for product in material.products() {
        write_node(sim, product.material, Some(product.quantity), indent + 1, output);
    }
}

/// Registry contents in registry order
pub fn format_material_table(sim: &ReactorSimulator) -> String {
    let mut output = format!(
        "{:<20} {:<10} {:>10} {:<16} {:<16} {}\n",
        "Material", "Kind", "Energy", "Info", "Auxiliary", "Products"
    );
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for material in sim.materials() {
        let auxiliary = material
            .auxiliary()
            .map(|id| sim.node(id).name())
            .unwrap_or("-");
        let products = material
            .products()
            .iter()
            .map(|p| format!("{} x {}", sim.node(p.material).name(), p.quantity))
            .collect::<Vec<_>>()
            .join(", ");

        output.push_str(&format!(
            "{:<20} {:<10} {:>10.3} {:<16} {:<16} {}\n",
            material.name(),
            material.kind().label(),
            material.energy(),
            material.info(),
            auxiliary,
            products
        ));
    }

    output
}
