pub mod symbology;

pub use symbology::*;
