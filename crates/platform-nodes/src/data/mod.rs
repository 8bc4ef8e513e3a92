//! Payload conversion nodes
//!
//! Bridging nodes between plain flow payloads and the platform's typed
//! data elements: `single-input` wraps one raw value into a one-element
//! parameter list, `single-output` digs the first typed element out of
//! a nested payload and unwraps it.

mod single_input;
mod single_output;

pub use single_input::{SingleInputConfig, SingleInputError, SingleInputTask};
pub use single_output::{SingleOutputError, SingleOutputTask};
