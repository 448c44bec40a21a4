use serde::{Deserialize, Serialize};

use super::catalog::Sku;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub sku: Sku,
    pub qty: u32,
    pub line_total_fen: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub total_fen: i64,
}

impl Cart {
    pub fn empty() -> Self {
        Self { lines: Vec::new(), total_fen: 0 }
    }
}
