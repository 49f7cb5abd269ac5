/*!
Defines a Thompson NFA and provides the [`PikeVM`](pikevm::PikeVM) for
simulating it.

Compilation goes through two steps. The pattern is first split into tokens
by [`crate::syntax`], and then the [`Compiler`] turns those tokens into an
[`NFA`] by composing small fragments. Each fragment has an optional start
state and a list of successor slots still waiting to be connected.
*/

mod builder;
mod compiler;
mod error;
mod nfa;
pub mod pikevm;

pub use self::{
    compiler::{Compiler, Config},
    error::Error,
    nfa::{State, Transition, NFA},
};
