//! JSON codec layer for statevault.
//!
//! This layer turns bytes into JSON value trees and back, and defines the two
//! conversion traits domain types implement to pass through it:
//! - `JsonCodec`: pretty-printed encode, fragment-tolerant decode
//! - `JsonWritable`: produce a JSON value from an item
//! - `JsonReadable`: rebuild an item from a JSON value (fallible)
//!
//! Both traits are implemented for every serde type, so most callers never
//! implement them by hand.
//!
//! # Example
//!
//! ```rust
//! use statevault_codec::{JsonCodec, JsonReadable, JsonWritable};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Project {
//!     name: String,
//! }
//!
//! let project = Project { name: "builda".to_string() };
//! let bytes = JsonCodec.encode(&project.to_json().unwrap()).unwrap();
//! let value = JsonCodec.decode(&bytes).unwrap();
//! assert_eq!(Project::from_json(value).unwrap(), project);
//! ```

pub use bytes::Bytes;
pub use serde_json::Value;

mod codec;
mod error;
mod typed;

pub use codec::JsonCodec;
pub use error::CodecError;
pub use typed::{JsonReadable, JsonWritable};
