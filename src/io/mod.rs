mod export;

pub use export::*;
