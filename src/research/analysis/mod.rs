pub mod evaluation;
pub mod formatting;
pub mod narrative;
pub mod peers;
pub mod price_history;
pub mod ratios;
pub mod resolver;
pub mod sensitivity;
