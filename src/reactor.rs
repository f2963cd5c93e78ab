//! Reactor simulator: material registry, graph splicing and the two traversals

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::{debug, info, trace};

use crate::error::{ReactorError, Result};
use crate::models::{Material, MaterialId, MaterialKind};
use crate::report::ReactionReport;

/// Registry of named materials.
///
/// Materials live in insertion order; re-adding a name replaces the material
/// in its original slot, so existing links to that name now point at the
/// replacement.
#[derive(Debug, Default, Clone)]
pub struct ReactorSimulator {
    materials: Vec<Material>,
    by_name: HashMap<String, MaterialId>,
}

impl ReactorSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fuel(&mut self, name: &str, energy: f64, price: f64) {
        self.insert(name, energy, MaterialKind::Fuel { price });
    }

    pub fn add_waste(&mut self, name: &str, energy: f64, disposal_cost: f64) {
        self.insert(name, energy, MaterialKind::Waste { disposal_cost });
    }

    pub fn add_auxiliary(&mut self, name: &str) {
        self.insert(name, 0.0, MaterialKind::Auxiliary);
    }

    fn insert(&mut self, name: &str, energy: f64, kind: MaterialKind) {
        match self.by_name.get(name) {
            Some(&id) => {
                debug!("Overwriting material '{}' ({})", name, kind.label());
                self.materials[id.index()] = Material::new(id, name, energy, kind);
            }
            None => {
                let id = MaterialId(self.materials.len());
                debug!("Registering material '{}' ({})", name, kind.label());
                self.materials.push(Material::new(id, name, energy, kind));
                self.by_name.insert(name.to_string(), id);
            }
        }
    }

    pub fn material_id(&self, name: &str) -> Result<MaterialId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ReactorError::NotFound(name.to_string()))
    }

    pub fn get_material(&self, name: &str) -> Result<&Material> {
        let id = self.material_id(name)?;
        Ok(&self.materials[id.index()])
    }

    /// Mutable access for wiring; callers outside the crate go through the
    /// name-based helpers so every stored handle comes from this registry.
    pub(crate) fn get_material_mut(&mut self, name: &str) -> Result<&mut Material> {
        let id = self.material_id(name)?;
        Ok(&mut self.materials[id.index()])
    }

    /// Resolve a handle. `None` if no material occupies that slot, which can
    /// only happen for a handle from another simulator.
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    /// Handles stored in the graph are only ever minted by this registry,
    /// and slots are never removed.
    pub(crate) fn node(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    /// All materials in registry order
    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn set_auxiliary(&mut self, material: &str, auxiliary: &str) -> Result<()> {
        let aux = self.material_id(auxiliary)?;
        self.get_material_mut(material)?.set_auxiliary(aux)
    }

    pub fn add_product(&mut self, material: &str, product: &str, quantity: f64) -> Result<()> {
        let product = self.material_id(product)?;
        self.get_material_mut(material)?.add_product(product, quantity)
    }

    pub fn remove_product(&mut self, material: &str, product: &str) -> Result<()> {
        // An unregistered product cannot be on any edge
        let Some(&product) = self.by_name.get(product) else {
            self.material_id(material)?;
            return Ok(());
        };
        self.get_material_mut(material)?.remove_product(product);
        Ok(())
    }

    pub fn auxiliary_of(&self, name: &str) -> Result<Option<&str>> {
        let material = self.get_material(name)?;
        Ok(material.auxiliary().map(|id| self.node(id).name()))
    }

    pub fn products_of(&self, name: &str) -> Result<Vec<(&str, f64)>> {
        let material = self.get_material(name)?;
        Ok(material
            .products()
            .iter()
            .map(|p| (self.node(p.material).name(), p.quantity))
            .collect())
    }

    /// Splice `intermediate` onto the first edge (in registry order) that ends
    /// at `product`: `M -> product` becomes `M -> intermediate -> product`.
    ///
    /// Only that one producer is rewired. If nothing produces `product` the
    /// graph is left untouched and `Ok(())` is returned.
    pub fn add_intermediate(
        &mut self,
        product: &str,
        intermediate: &str,
        (ratio_in, ratio_out): (f64, f64),
    ) -> Result<()> {
        let product_id = self.material_id(product)?;
        let intermediate_id = self.material_id(intermediate)?;

        let Some(producer) = self
            .materials
            .iter()
            .find(|m| m.products().iter().any(|p| p.material == product_id))
            .map(|m| m.id())
        else {
            debug!("No material produces '{}', nothing to splice", product);
            return Ok(());
        };

        if self.node(intermediate_id).is_auxiliary() {
            return Err(ReactorError::InvalidOperation {
                material: intermediate.to_string(),
                reason: "an auxiliary cannot be spliced in as an intermediate".to_string(),
            });
        }

        debug!(
            "Splicing '{}' between '{}' and '{}' ({} / {})",
            intermediate,
            self.node(producer).name(),
            product,
            ratio_in,
            ratio_out
        );

        let producer = &mut self.materials[producer.index()];
        producer.remove_product(product_id);
        producer.add_product(intermediate_id, ratio_in)?;
        self.materials[intermediate_id.index()].add_product(product_id, ratio_out)
    }

    /// Depth-first scan from `root` for a reacting material whose auxiliary is
    /// not in `available`.
    ///
    /// Uses an explicit stack: children are pushed in product order and so
    /// popped last-first. Only materials with products are checked. Returns the
    /// first missing auxiliary name, or `None` after the whole closure is seen.
    pub fn find_inconsistency<S>(
        &self,
        root: &str,
        available: &HashSet<S>,
    ) -> Result<Option<String>>
    where
        S: Borrow<str> + Eq + Hash,
    {
        let mut stack = vec![self.material_id(root)?];

        while let Some(id) = stack.pop() {
            let material = self.node(id);
            trace!("Checking '{}'", material.name());
            if !material.has_products() {
                continue;
            }

            if let Some(aux) = material.auxiliary() {
                let aux_name = self.node(aux).name();
                if !available.contains(aux_name) {
                    info!(
                        "'{}' requires missing auxiliary '{}'",
                        material.name(),
                        aux_name
                    );
                    return Ok(Some(aux_name.to_string()));
                }
            }

            stack.extend(material.products().iter().map(|p| p.material));
        }

        Ok(None)
    }

    /// Unfold the reaction of `quantity` units of `root` over its product tree.
    ///
    /// Leaves end up in the residual in visit order and pay their disposal
    /// cost (waste only); inner nodes contribute `energy * quantity`. The graph
    /// must be acyclic.
    pub fn simulate_reaction(&self, root: &str, quantity: f64) -> Result<ReactionReport> {
        let root = self.material_id(root)?;
        let mut residual = Vec::new();
        let (total_energy, total_disposal) = self.unfold(root, quantity, &mut residual);

        Ok(ReactionReport {
            residual,
            total_energy,
            total_disposal,
        })
    }

    fn unfold(
        &self,
        id: MaterialId,
        quantity: f64,
        residual: &mut Vec<(String, f64)>,
    ) -> (f64, f64) {
        let material = self.node(id);
        trace!("Reacting {} of '{}'", quantity, material.name());

        if !material.has_products() {
            residual.push((material.name().to_string(), quantity));
            let disposal = material.disposal_cost().unwrap_or(0.0) * quantity;
            return (0.0, disposal);
        }

        let mut energy = 0.0;
        let mut disposal = 0.0;
        for product in material.products() {
            let (e, d) = self.unfold(product.material, quantity * product.quantity, residual);
            energy += e;
            disposal += d;
        }
        energy += material.energy() * quantity;

        (energy, disposal)
    }
}
