//! Systems - logic that runs over the stores on a clock or on command

mod decay;
mod economy;
mod maintenance;
mod outcome;

pub use decay::*;
pub use economy::*;
pub use maintenance::*;
pub use outcome::*;
