pub mod position;
pub mod price;
pub mod trade;
