use serde::{Deserialize, Serialize};

/// One rung of a quantity-break price ladder. Prices are integer fen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuPriceTier {
    pub min_qty: u32,
    pub unit_price_fen: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub id: String,
    pub spu_id: String,
    pub name: String,
    /// Specification label, e.g. "500ml / case of 12".
    pub spec: String,
    pub unit: String,
    pub price_tiers: Vec<SkuPriceTier>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Sku {
    /// Unit price applicable to the given quantity: the deepest tier whose
    /// minimum the quantity reaches, else the first tier.
    pub fn unit_price_for(&self, qty: u32) -> i64 {
        let mut applicable = self.price_tiers.first().map(|t| t.unit_price_fen).unwrap_or(0);
        for tier in &self.price_tiers {
            if qty >= tier.min_qty {
                applicable = tier.unit_price_fen;
            }
        }
        applicable
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub spu_id: String,
    pub name: String,
    pub description: String,
    pub skus: Vec<Sku>,
    #[serde(default)]
    pub main_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub spu_id: String,
    pub name: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    pub min_price_fen: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<ProductSummary>,
    pub page: u32,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_ladder_picks_deepest_reached_rung() {
        let sku = Sku {
            id: "sku-1".to_string(),
            spu_id: "spu-1".to_string(),
            name: "Widget".to_string(),
            spec: "single".to_string(),
            unit: "piece".to_string(),
            price_tiers: vec![
                SkuPriceTier { min_qty: 1, unit_price_fen: 1000 },
                SkuPriceTier { min_qty: 10, unit_price_fen: 900 },
                SkuPriceTier { min_qty: 100, unit_price_fen: 750 },
            ],
            image_url: None,
        };
        assert_eq!(sku.unit_price_for(1), 1000);
        assert_eq!(sku.unit_price_for(9), 1000);
        assert_eq!(sku.unit_price_for(10), 900);
        assert_eq!(sku.unit_price_for(500), 750);
    }
}
