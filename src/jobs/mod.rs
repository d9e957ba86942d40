pub mod decay;

pub use decay::DecayJob;
