//! Decoded grid payloads and zero-copy plane views.

use bytes::Bytes;
use tracing::debug;
use visor_common::{DecodeError, GridAttributes};
use visor_protocol::{GridHeader, RawGrid};

use crate::compression::{f16_to_f32, CompressionKind};

/// Decoded result of one variable fetch.
///
/// `values` is the response body as received; its length always equals
/// `nt * nv * nz * ny * nx * kind.width()`.
#[derive(Debug, Clone)]
pub struct GridPayload {
    pub variable: String,
    pub nt: usize,
    pub nv: usize,
    pub nz: usize,
    pub ny: usize,
    pub nx: usize,
    pub kind: CompressionKind,
    pub attributes: GridAttributes,
    values: Bytes,
}

/// Decode a sample buffer against its parsed header.
pub fn decode(buffer: Bytes, header: &GridHeader) -> Result<GridPayload, DecodeError> {
    let kind = CompressionKind::from_label(header.compress.as_deref());
    let expected = header
        .element_count()
        .ok_or_else(|| DecodeError::invalid_header("shape product overflows"))?;
    let expected_bytes = expected
        .checked_mul(kind.width())
        .ok_or_else(|| DecodeError::invalid_header("shape byte length overflows"))?;

    if buffer.len() != expected_bytes {
        return Err(DecodeError::shape_mismatch(expected_bytes, buffer.len()));
    }

    debug!(
        variable = %header.variable,
        shape = ?header.shape(),
        kind = kind.label(),
        bytes = buffer.len(),
        "Decoded grid payload"
    );

    Ok(GridPayload {
        variable: header.variable.clone(),
        nt: header.nt,
        nv: header.nv,
        nz: header.nz,
        ny: header.ny,
        nx: header.nx,
        kind,
        attributes: header.attrs.clone(),
        values: buffer,
    })
}

/// Decode a raw `/api/data` response, parsing its `X-Header` first.
pub fn decode_raw(raw: RawGrid) -> Result<GridPayload, DecodeError> {
    let header = GridHeader::from_json(&raw.header)?;
    decode(raw.body, &header)
}

impl GridPayload {
    /// Logical shape `(t, v, z, y, x)`.
    pub fn shape(&self) -> [usize; 5] {
        [self.nt, self.nv, self.nz, self.ny, self.nx]
    }

    /// Cells in one `(y, x)` plane.
    pub fn plane_len(&self) -> usize {
        self.ny * self.nx
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.values.len() / self.kind.width()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat element offset of the plane `(t, v, z)`.
    pub fn plane_offset(&self, t: usize, v: usize, z: usize) -> usize {
        (((t * self.nv + v) * self.nz + z) * self.ny) * self.nx
    }

    /// View over the whole buffer.
    pub fn values(&self) -> PlaneView<'_> {
        PlaneView {
            kind: self.kind,
            bytes: &self.values,
        }
    }

    /// The `(y, x)` plane for one `(time, source, level)` triple.
    ///
    /// The view borrows the shared buffer; no samples are copied.
    pub fn value_at(&self, t: usize, v: usize, z: usize) -> Result<PlaneView<'_>, DecodeError> {
        if t >= self.nt || v >= self.nv || z >= self.nz {
            return Err(DecodeError::IndexOutOfRange {
                t,
                v,
                z,
                nt: self.nt,
                nv: self.nv,
                nz: self.nz,
            });
        }
        let width = self.kind.width();
        let start = self.plane_offset(t, v, z) * width;
        let end = start + self.plane_len() * width;
        Ok(PlaneView {
            kind: self.kind,
            bytes: &self.values[start..end],
        })
    }

    /// Single sample at cell `(i, j)` of plane `(t, v, z)`.
    pub fn sample(&self, t: usize, v: usize, z: usize, i: usize, j: usize) -> Option<f64> {
        if i >= self.nx || j >= self.ny {
            return None;
        }
        self.value_at(t, v, z).ok()?.get(j * self.nx + i)
    }
}

/// Borrowed window over encoded samples.
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a> {
    kind: CompressionKind,
    bytes: &'a [u8],
}

impl<'a> PlaneView<'a> {
    pub fn kind(&self) -> CompressionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / self.kind.width()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decoded sample at flat index `idx`.
    pub fn get(&self, idx: usize) -> Option<f64> {
        let width = self.kind.width();
        let start = idx.checked_mul(width)?;
        let raw = self.bytes.get(start..start + width)?;
        Some(match self.kind {
            CompressionKind::Byte => raw[0] as f64,
            CompressionKind::HalfFloat => f16_to_f32(u16::from_le_bytes([raw[0], raw[1]])) as f64,
            CompressionKind::Float32 => {
                f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64
            }
        })
    }

    /// Reinterpret float32 samples in place when the buffer is aligned and
    /// the host is little-endian.
    pub fn as_f32_slice(&self) -> Option<&'a [f32]> {
        if self.kind != CompressionKind::Float32 || cfg!(target_endian = "big") {
            return None;
        }
        bytemuck::try_cast_slice(self.bytes).ok()
    }

    /// Raw bytes of a uint8 view.
    pub fn as_u8_slice(&self) -> Option<&'a [u8]> {
        (self.kind == CompressionKind::Byte).then_some(self.bytes)
    }

    pub fn iter(&self) -> PlaneIter<'a> {
        PlaneIter {
            view: *self,
            idx: 0,
        }
    }

    /// Copy the samples out as `f64`.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

/// Iterator over decoded samples of a [`PlaneView`].
#[derive(Debug, Clone)]
pub struct PlaneIter<'a> {
    view: PlaneView<'a>,
    idx: usize,
}

impl<'a> Iterator for PlaneIter<'a> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let value = self.view.get(self.idx)?;
        self.idx += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.len().saturating_sub(self.idx);
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for PlaneIter<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(nt: usize, nv: usize, nz: usize, ny: usize, nx: usize, compress: &str) -> GridHeader {
        GridHeader {
            variable: "test".to_string(),
            nt,
            nv,
            nz,
            ny,
            nx,
            attrs: GridAttributes::default(),
            compress: Some(compress.to_string()),
        }
    }

    #[test]
    fn test_decode_uint8() {
        let body = Bytes::from_static(&[1, 2, 3, 4, 5, 6]);
        let payload = decode(body, &header(3, 1, 1, 1, 2, "uint8")).unwrap();
        assert_eq!(payload.len(), 6);
        assert_eq!(payload.value_at(2, 0, 0).unwrap().to_vec(), vec![5.0, 6.0]);
    }

    #[test]
    fn test_trailing_byte_is_a_mismatch() {
        // 2 float32 elements plus one stray byte
        let body = Bytes::from(vec![0u8; 9]);
        let err = decode(body, &header(1, 1, 1, 1, 2, "float32")).unwrap_err();
        assert_eq!(err, DecodeError::shape_mismatch(8, 9));
        assert_eq!(
            err.to_string(),
            "shape mismatch: header requires 8 bytes, buffer holds 9"
        );
    }

    #[test]
    fn test_value_at_out_of_range() {
        let body = Bytes::from(vec![0u8; 4]);
        let payload = decode(body, &header(1, 1, 1, 2, 2, "uint8")).unwrap();
        assert!(matches!(
            payload.value_at(1, 0, 0),
            Err(DecodeError::IndexOutOfRange { t: 1, .. })
        ));
        assert!(payload.value_at(0, 0, 1).is_err());
    }

    #[test]
    fn test_sample_bounds() {
        let body = Bytes::from_static(&[10, 11, 12, 13]);
        let payload = decode(body, &header(1, 1, 1, 2, 2, "uint8")).unwrap();
        assert_eq!(payload.sample(0, 0, 0, 1, 1), Some(13.0));
        assert_eq!(payload.sample(0, 0, 0, 2, 0), None);
    }

    #[test]
    fn test_iter_size_hint() {
        let body = Bytes::from_static(&[1, 2, 3]);
        let payload = decode(body, &header(1, 1, 1, 1, 3, "uint8")).unwrap();
        let mut iter = payload.values().iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
    }
}
