use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use agora_core::ValueObject;

/// A tradeable product. Units with identical fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "product_type")]
pub enum Product {
    Tea {
        name: String,
        /// Price in whole currency units.
        price: u64,
        #[serde(rename = "type")]
        tea_type: String,
    },
    Coffee {
        name: String,
        price: u64,
        acidity: String,
        roast_level: String,
    },
}

impl Product {
    pub fn tea(name: impl Into<String>, price: u64, tea_type: impl Into<String>) -> Self {
        Self::Tea {
            name: name.into(),
            price,
            tea_type: tea_type.into(),
        }
    }

    pub fn coffee(
        name: impl Into<String>,
        price: u64,
        acidity: impl Into<String>,
        roast_level: impl Into<String>,
    ) -> Self {
        Self::Coffee {
            name: name.into(),
            price,
            acidity: acidity.into(),
            roast_level: roast_level.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Product::Tea { name, .. } | Product::Coffee { name, .. } => name,
        }
    }

    pub fn price(&self) -> u64 {
        match self {
            Product::Tea { price, .. } | Product::Coffee { price, .. } => *price,
        }
    }
}

impl ValueObject for Product {}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Product::Tea {
                name,
                price,
                tea_type,
            } => write!(f, "Tea(name='{name}', price={price}, type='{tea_type}')"),
            Product::Coffee {
                name,
                price,
                acidity,
                roast_level,
            } => write!(
                f,
                "Coffee(name='{name}', price={price}, acidity='{acidity}', roast_level='{roast_level}')"
            ),
        }
    }
}

/// Products keyed by the short ids scenario files refer to (`"id1"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue(BTreeMap<String, Product>);

impl Catalogue {
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.0.get(id)
    }
}
