/*!
A collection of utilities shared by the compiler and the matcher.

The only public item here is [`id::StateID`], which shows up in the public
NFA API. The sparse sets used by the simulation are an internal detail.
*/

pub mod id;

pub(crate) mod sparse_set;
