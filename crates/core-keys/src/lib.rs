//! core-keys: virtual-key catalog, key-name codec and binding registry.
//!
//! The interactive interface is controlled by "virtual keys" — abstract
//! commands listed in the [`Action`] catalog. Zero or more physical keys are
//! bound to each action; a physical key is identified by a [`KeyCode`]
//! integer and by a display name, mapped back and forth by [`KeyCodec`].
//! [`KeyRegistry`] owns both directions of the mapping and enforces that a
//! physical key is bound to at most one action. [`persist`] writes the
//! bindings file and fills gaps from built-in defaults.

pub mod action;
pub mod codec;
pub mod persist;
pub mod registry;

pub use action::Action;
pub use codec::KeyCodec;
pub use registry::{BindingState, Conflict, KeyRegistry};

/// Integer identity of a physical key. See [`codec`] for the range layout.
pub type KeyCode = u32;
