pub mod heston;
pub mod merton;
pub mod model;
