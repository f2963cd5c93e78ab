//! Material model: the nodes of the reaction graph

use crate::error::{ReactorError, Result};

/// Handle of a material inside a [`ReactorSimulator`](crate::ReactorSimulator) registry.
///
/// Links between materials (auxiliary requirement, product edges) are stored
/// as handles, so the registry stays the only owner of every material. Only
/// the registry mints handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

impl MaterialId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    Fuel { price: f64 },
    Waste { disposal_cost: f64 },
    Auxiliary,
}

impl MaterialKind {
    pub fn label(&self) -> &'static str {
        match self {
            MaterialKind::Fuel { .. } => "fuel",
            MaterialKind::Waste { .. } => "waste",
            MaterialKind::Auxiliary => "auxiliary",
        }
    }
}

/// One outgoing edge: `quantity` units of `material` per unit consumed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub material: MaterialId,
    pub quantity: f64,
}

#[derive(Debug, Clone)]
pub struct Material {
    id: MaterialId,
    name: String,
    energy: f64,
    kind: MaterialKind,
    auxiliary: Option<MaterialId>,
    products: Vec<Product>,
}

impl Material {
    pub(crate) fn new(id: MaterialId, name: &str, energy: f64, kind: MaterialKind) -> Self {
        // Auxiliaries never yield energy
        let energy = match kind {
            MaterialKind::Auxiliary => 0.0,
            _ => energy,
        };
        Self {
            id,
            name: name.to_string(),
            energy,
            kind,
            auxiliary: None,
            products: Vec::new(),
        }
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn kind(&self) -> &MaterialKind {
        &self.kind
    }

    pub fn is_auxiliary(&self) -> bool {
        matches!(self.kind, MaterialKind::Auxiliary)
    }

    pub fn price(&self) -> Option<f64> {
        match self.kind {
            MaterialKind::Fuel { price } => Some(price),
            _ => None,
        }
    }

    pub fn disposal_cost(&self) -> Option<f64> {
        match self.kind {
            MaterialKind::Waste { disposal_cost } => Some(disposal_cost),
            _ => None,
        }
    }

    /// Kind-specific description: `"Price {price}"`, `"Disposal {cost}"`,
    /// or empty for auxiliaries.
    pub fn info(&self) -> String {
        match self.kind {
            MaterialKind::Fuel { price } => format!("Price {}", price),
            MaterialKind::Waste { disposal_cost } => format!("Disposal {}", disposal_cost),
            MaterialKind::Auxiliary => String::new(),
        }
    }

    pub fn auxiliary(&self) -> Option<MaterialId> {
        self.auxiliary
    }

    pub(crate) fn set_auxiliary(&mut self, auxiliary: MaterialId) -> Result<()> {
        if self.is_auxiliary() {
            return Err(self.invalid("an auxiliary cannot require an auxiliary"));
        }
        self.auxiliary = Some(auxiliary);
        Ok(())
    }

    pub(crate) fn add_product(&mut self, product: MaterialId, quantity: f64) -> Result<()> {
        if self.is_auxiliary() {
            return Err(self.invalid("an auxiliary has no products"));
        }
        self.products.push(Product {
            material: product,
            quantity,
        });
        Ok(())
    }

    /// Products in insertion order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn has_products(&self) -> bool {
        !self.products.is_empty()
    }

    /// Drop every edge pointing at `product`. No-op if there is none.
    pub(crate) fn remove_product(&mut self, product: MaterialId) {
        self.products.retain(|p| p.material != product);
    }

    fn invalid(&self, reason: &str) -> ReactorError {
        ReactorError::InvalidOperation {
            material: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}
