//! Pure scoring kernel for the dice game.
//!
//! Every routine here is a pure function: no I/O, no randomness beyond what
//! is handed in as an argument, no mutation of its inputs. This is the layer
//! the engine (`dg-engine`) calls into after it has decided *what* happened;
//! this crate only ever answers *what that means for the score*.
//!
//! ## Submodules
//!
//! - [`die`] — `Die`, `Color`, and the hand evaluator (`evaluate`, `compare`)
//! - [`points`] — placement-to-points table and tie-group splitting
//! - [`prediction`] — prediction ranges and bonus computation
//! - [`turns`] — initial and subsequent-round turn order
mod die;
mod points;
mod prediction;
mod turns;

pub use die::*;
pub use points::*;
pub use prediction::*;
pub use turns::*;
