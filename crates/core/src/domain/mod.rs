pub mod criteria;
pub mod product;
pub mod recommendation;
