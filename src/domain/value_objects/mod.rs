pub mod amount;
pub mod margin;
