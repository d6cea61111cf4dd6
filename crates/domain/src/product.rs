//! Product templates (套餐) used to seed new orders.
//!
//! Products are reference data: the workflow reads them when creating an
//! order and never mutates them.

use common::{Money, ProductId, ProductMaterialId};
use serde::{Deserialize, Serialize};

/// A renovation package template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sale_price: Money,
    pub cost_price: Money,
}

impl Product {
    pub fn new(name: impl Into<String>, sale_price: Money, cost_price: Money) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            sale_price,
            cost_price,
        }
    }
}

/// A line item of a product template, copied into new orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMaterial {
    pub id: ProductMaterialId,
    pub product_id: ProductId,
    /// Catalog code of the material.
    pub material_id: String,
    pub material_name: String,
    pub category: String,
    pub quantity: u32,
    pub unit: String,
    pub price: Money,
    pub amount: Money,
}

impl ProductMaterial {
    /// Creates a template line item, deriving the amount.
    pub fn new(
        product_id: ProductId,
        material_id: impl Into<String>,
        material_name: impl Into<String>,
        category: impl Into<String>,
        quantity: u32,
        unit: impl Into<String>,
        price: Money,
    ) -> Self {
        Self {
            id: ProductMaterialId::new(),
            product_id,
            material_id: material_id.into(),
            material_name: material_name.into(),
            category: category.into(),
            quantity,
            unit: unit.into(),
            price,
            amount: price.multiply(quantity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_amount_is_derived() {
        let product = Product::new("全包套餐A", Money::from_yuan(50000), Money::from_yuan(38000));
        let material = ProductMaterial::new(
            product.id,
            "M-001",
            "乳胶漆",
            "辅材",
            4,
            "桶",
            Money::from_yuan(260),
        );
        assert_eq!(material.amount, Money::from_yuan(1040));
    }
}
