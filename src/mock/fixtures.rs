//! Static fixture catalog for the offline runtime, plus the SKU resolution
//! fallback chain. Arbitrary SKU ids minted elsewhere in the mock flow must
//! always resolve to something renderable.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::domain::catalog::{ProductDetail, Sku, SkuPriceTier};

/// Fixture SKU ids follow `sku-<spu id>-<n>`, e.g. `sku-spu-1003-2`.
static SKU_ID_CONVENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sku-(spu-\d+)-\d+$").expect("sku id pattern is valid"));

fn tiers(base: i64) -> Vec<SkuPriceTier> {
    vec![
        SkuPriceTier { min_qty: 1, unit_price_fen: base },
        SkuPriceTier { min_qty: 10, unit_price_fen: base * 9 / 10 },
        SkuPriceTier { min_qty: 50, unit_price_fen: base * 4 / 5 },
    ]
}

fn sku(spu_id: &str, n: u32, name: &str, spec: &str, unit: &str, base: i64) -> Sku {
    Sku {
        id: format!("sku-{}-{}", spu_id, n),
        spu_id: spu_id.to_string(),
        name: name.to_string(),
        spec: spec.to_string(),
        unit: unit.to_string(),
        price_tiers: tiers(base),
        image_url: None,
    }
}

/// The offline product shelf. Small on purpose: enough breadth for every
/// screen, stable ids so persisted snapshots stay meaningful across runs.
pub static FIXTURE_PRODUCTS: Lazy<Vec<ProductDetail>> = Lazy::new(|| {
    vec![
        ProductDetail {
            spu_id: "spu-1001".to_string(),
            name: "Nitrile Work Gloves".to_string(),
            description: "Industrial nitrile-coated gloves, EN388 rated.".to_string(),
            skus: vec![
                sku("spu-1001", 1, "Nitrile Work Gloves", "Size M / pack of 12", "pack", 2400),
                sku("spu-1001", 2, "Nitrile Work Gloves", "Size L / pack of 12", "pack", 2400),
                sku("spu-1001", 3, "Nitrile Work Gloves", "Size XL / pack of 12", "pack", 2600),
            ],
            main_image_url: None,
        },
        ProductDetail {
            spu_id: "spu-1002".to_string(),
            name: "A4 Copy Paper".to_string(),
            description: "80gsm multipurpose copy paper.".to_string(),
            skus: vec![
                sku("spu-1002", 1, "A4 Copy Paper", "500 sheets / ream", "ream", 1900),
                sku("spu-1002", 2, "A4 Copy Paper", "5 reams / box", "box", 8900),
            ],
            main_image_url: None,
        },
        ProductDetail {
            spu_id: "spu-1003".to_string(),
            name: "Safety Goggles".to_string(),
            description: "Anti-fog polycarbonate safety goggles.".to_string(),
            skus: vec![
                sku("spu-1003", 1, "Safety Goggles", "Clear lens", "piece", 1200),
                sku("spu-1003", 2, "Safety Goggles", "Tinted lens", "piece", 1350),
            ],
            main_image_url: None,
        },
        ProductDetail {
            spu_id: "spu-1004".to_string(),
            name: "Packing Tape".to_string(),
            description: "48mm clear BOPP packing tape.".to_string(),
            skus: vec![
                sku("spu-1004", 1, "Packing Tape", "48mm x 100m / roll", "roll", 450),
                sku("spu-1004", 2, "Packing Tape", "6 rolls / sleeve", "sleeve", 2500),
            ],
            main_image_url: None,
        },
    ]
});

pub fn find_product(spu_id: &str) -> Option<&'static ProductDetail> {
    FIXTURE_PRODUCTS.iter().find(|p| p.spu_id == spu_id)
}

/// Resolve a SKU id through three tiers: exact fixture match, SPU
/// inference from the id naming convention, then a synthesized placeholder.
/// Never fails, so SKU ids created anywhere else in the mock flow always
/// project cleanly.
pub fn resolve_sku(sku_id: &str) -> Sku {
    for product in FIXTURE_PRODUCTS.iter() {
        if let Some(found) = product.skus.iter().find(|s| s.id == sku_id) {
            return found.clone();
        }
    }

    if let Some(captures) = SKU_ID_CONVENTION.captures(sku_id) {
        let spu_id = &captures[1];
        if let Some(product) = find_product(spu_id) {
            return Sku {
                id: sku_id.to_string(),
                spu_id: spu_id.to_string(),
                name: product.name.clone(),
                spec: "custom spec".to_string(),
                unit: "piece".to_string(),
                price_tiers: synthesized_tiers(sku_id),
                image_url: None,
            };
        }
    }

    placeholder_sku(sku_id)
}

fn placeholder_sku(sku_id: &str) -> Sku {
    let spu_id = SKU_ID_CONVENTION
        .captures(sku_id)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "spu-unknown".to_string());
    Sku {
        id: sku_id.to_string(),
        spu_id,
        name: format!("Item {}", sku_id),
        spec: "standard".to_string(),
        unit: "piece".to_string(),
        price_tiers: synthesized_tiers(sku_id),
        image_url: None,
    }
}

/// Deterministic default ladder: the base price is derived from the SKU id
/// hash so repeated lookups of the same id always agree.
pub fn synthesized_tiers(sku_id: &str) -> Vec<SkuPriceTier> {
    let mut hasher = Sha256::new();
    hasher.update(sku_id.as_bytes());
    let digest = hasher.finalize();
    let seed = u16::from_be_bytes([digest[0], digest[1]]) as i64;
    // 5.00 to 50.00 yuan in fen, quantized to 10 fen.
    let base = 500 + (seed % 4500) / 10 * 10;
    tiers(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fixture_match() {
        let found = resolve_sku("sku-spu-1001-2");
        assert_eq!(found.spu_id, "spu-1001");
        assert_eq!(found.spec, "Size L / pack of 12");
    }

    #[test]
    fn spu_inference_from_id_convention() {
        // Not a fixture SKU, but the id names a fixture SPU.
        let inferred = resolve_sku("sku-spu-1002-77");
        assert_eq!(inferred.spu_id, "spu-1002");
        assert_eq!(inferred.name, "A4 Copy Paper");
        assert!(!inferred.price_tiers.is_empty());
    }

    #[test]
    fn placeholder_for_arbitrary_ids() {
        let synth = resolve_sku("totally-made-up");
        assert_eq!(synth.id, "totally-made-up");
        assert_eq!(synth.spu_id, "spu-unknown");
        assert_eq!(synth.price_tiers.len(), 3);
        assert!(synth.price_tiers[0].unit_price_fen >= 500);
    }

    #[test]
    fn synthesized_tiers_are_stable() {
        assert_eq!(synthesized_tiers("sku-x"), synthesized_tiers("sku-x"));
    }
}
