//! Binary grid decoding.
//!
//! A data response is a flat sample buffer with logical shape
//! `(t, v, z, y, x)`, x fastest-varying, plus a JSON header naming the
//! shape and the element encoding. Decoding validates the buffer length
//! against the shape and wraps the buffer without copying; planes are
//! exposed as borrowed [`PlaneView`]s that decode elements on access.
//!
//! ```text
//! offset(t, v, z) = (((t * nv + v) * nz + z) * ny) * nx
//! ```

pub mod compression;
pub mod payload;

pub use compression::{f16_to_f32, CompressionKind};
pub use payload::{decode, decode_raw, GridPayload, PlaneIter, PlaneView};
