use std::collections::HashMap;

/// Server-side catalog of rentable add-ons. Prices live here and only
/// here; a client-supplied price is never read.
#[derive(Debug, Clone)]
pub struct ExtrasCatalog {
    prices: HashMap<String, i64>,
}

impl ExtrasCatalog {
    pub fn new(prices: HashMap<String, i64>) -> Self {
        Self { prices }
    }

    pub fn unit_price_cents(&self, name: &str) -> Option<i64> {
        self.prices.get(name).copied()
    }

    /// Catalog entries sorted by name, for listing endpoints.
    pub fn entries(&self) -> Vec<(String, i64)> {
        let mut entries: Vec<(String, i64)> = self
            .prices
            .iter()
            .map(|(name, price)| (name.clone(), *price))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Default for ExtrasCatalog {
    fn default() -> Self {
        let mut prices = HashMap::new();
        prices.insert("skipper".to_string(), 12000);
        prices.insert("snorkel-set".to_string(), 1500);
        prices.insert("sup-board".to_string(), 2500);
        prices.insert("cooler".to_string(), 1000);
        prices.insert("towable-tube".to_string(), 3000);
        prices.insert("child-vest".to_string(), 500);
        Self { prices }
    }
}
