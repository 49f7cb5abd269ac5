/*!
Provides non-deterministic finite automata (NFA) and regex engines that use
them.

There is only one kind of NFA here, a Thompson NFA, found in the
[`thompson`] module. It is built from a pattern with ε-transitions and is
simulated by the [`PikeVM`](thompson::pikevm::PikeVM).
*/

pub mod thompson;
