//! Loads and stores over slices.
//!
//! Lane slices are copied as is. Byte slices are read and written in a
//! caller-chosen [`ByteOrder`]; lanes are swapped whenever it differs from
//! the host's.

use crate::error::{Result, VectorError};
use crate::lane::{Lane, LaneBuf};
use crate::mask::Mask;
use crate::species::{Species, VectorSpecies};
use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use shapevec_target::Endianness;
use smallvec::SmallVec;

pub(crate) type ByteBuf = SmallVec<[u8; 64]>;

/// Byte order of an external byte container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Least significant byte first.
    LittleEndian,
    /// Most significant byte first.
    BigEndian,
}

impl ByteOrder {
    /// Byte order of the host.
    #[must_use]
    pub const fn native() -> Self {
        match Endianness::native() {
            Endianness::Little => Self::LittleEndian,
            Endianness::Big => Self::BigEndian,
        }
    }

    fn is_native(self) -> bool {
        self == Self::native()
    }
}

fn read_lane<E: Lane>(bytes: &[u8], order: ByteOrder) -> E {
    let e = E::read_ne(bytes);
    if order.is_native() {
        e
    } else {
        e.swap_lane_bytes()
    }
}

fn write_lane<E: Lane>(e: E, out: &mut [u8], order: ByteOrder) {
    let e = if order.is_native() { e } else { e.swap_lane_bytes() };
    e.write_ne(out);
}

impl<E: Lane> VectorSpecies<E> {
    /// Load `lane_count` lanes starting at `offset`.
    pub fn from_slice(self, data: &[E], offset: usize) -> Result<Vector<E>> {
        let n = self.lane_count();
        VectorError::check_range(offset, n, data.len())?;
        Ok(Vector::from_parts(self.species(), LaneBuf::from_slice(&data[offset..offset + n])))
    }

    /// Load the lanes set in `m`; unset lanes are zero and never read.
    pub fn from_slice_masked(self, data: &[E], offset: usize, m: &Mask<E>) -> Result<Vector<E>> {
        m.check(self.species())?;
        if m.all_true() {
            return self.from_slice(data, offset);
        }
        check_active(m, offset, data.len())?;
        let lanes = m
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &set)| if set { data[offset + i] } else { E::default() })
            .collect();
        Ok(Vector::from_parts(self.species(), lanes))
    }

    /// Load `lane_count` lanes from `bytes` starting at byte `offset`.
    pub fn from_bytes(self, bytes: &[u8], offset: usize, order: ByteOrder) -> Result<Vector<E>> {
        VectorError::check_range(offset, self.vector_byte_size(), bytes.len())?;
        let size = self.element_size();
        let lanes = bytes[offset..offset + self.vector_byte_size()]
            .chunks_exact(size)
            .map(|chunk| read_lane(chunk, order))
            .collect();
        Ok(Vector::from_parts(self.species(), lanes))
    }

    /// Load the lanes set in `m` from `bytes`; unset lanes are zero.
    pub fn from_bytes_masked(self, bytes: &[u8], offset: usize, order: ByteOrder, m: &Mask<E>) -> Result<Vector<E>> {
        m.check(self.species())?;
        if m.all_true() {
            return self.from_bytes(bytes, offset, order);
        }
        let size = self.element_size();
        check_active_bytes(m, offset, size, bytes.len())?;
        let lanes = m
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &set)| {
                if set {
                    let start = offset + i * size;
                    read_lane(&bytes[start..start + size], order)
                } else {
                    E::default()
                }
            })
            .collect();
        Ok(Vector::from_parts(self.species(), lanes))
    }
}

/// Check that every lane set in `m` lies inside a container of `len`
/// elements, starting at `offset`.
fn check_active<E: Lane>(m: &Mask<E>, offset: usize, len: usize) -> Result<()> {
    match usize::try_from(m.last_true()) {
        Ok(last) => VectorError::check_range(offset, last + 1, len),
        Err(_) => Ok(()),
    }
}

fn check_active_bytes<E: Lane>(m: &Mask<E>, offset: usize, size: usize, len: usize) -> Result<()> {
    match usize::try_from(m.last_true()) {
        Ok(last) => VectorError::check_range(offset, (last + 1) * size, len),
        Err(_) => Ok(()),
    }
}

impl<E: Lane> Vector<E> {
    /// Store every lane into `data` starting at `offset`.
    pub fn into_slice(&self, data: &mut [E], offset: usize) -> Result<()> {
        let n = self.lane_count();
        VectorError::check_range(offset, n, data.len())?;
        data[offset..offset + n].copy_from_slice(self.as_slice());
        Ok(())
    }

    /// Store the lanes set in `m`; other elements of `data` are untouched.
    pub fn into_slice_masked(&self, data: &mut [E], offset: usize, m: &Mask<E>) -> Result<()> {
        m.check(self.untyped_species())?;
        check_active(m, offset, data.len())?;
        for (i, (&e, &set)) in self.as_slice().iter().zip(m.as_slice()).enumerate() {
            if set {
                data[offset + i] = e;
            }
        }
        Ok(())
    }

    /// Store every lane into `bytes` starting at byte `offset`.
    pub fn into_bytes(&self, bytes: &mut [u8], offset: usize, order: ByteOrder) -> Result<()> {
        let len = self.byte_size();
        VectorError::check_range(offset, len, bytes.len())?;
        let size = self.element_size();
        for (&e, out) in self.as_slice().iter().zip(bytes[offset..offset + len].chunks_exact_mut(size)) {
            write_lane(e, out, order);
        }
        Ok(())
    }

    /// Store the lanes set in `m` into `bytes`.
    pub fn into_bytes_masked(&self, bytes: &mut [u8], offset: usize, order: ByteOrder, m: &Mask<E>) -> Result<()> {
        m.check(self.untyped_species())?;
        let size = self.element_size();
        check_active_bytes(m, offset, size, bytes.len())?;
        for (i, (&e, &set)) in self.as_slice().iter().zip(m.as_slice()).enumerate() {
            if set {
                let start = offset + i * size;
                write_lane(e, &mut bytes[start..start + size], order);
            }
        }
        Ok(())
    }

    /// The lanes as little-endian bytes, lane 0 first.
    pub(crate) fn register_bytes(&self) -> ByteBuf {
        let size = self.element_size();
        let mut out: ByteBuf = smallvec::smallvec![0u8; self.byte_size()];
        for (&e, chunk) in self.as_slice().iter().zip(out.chunks_exact_mut(size)) {
            chunk.copy_from_slice(&e.to_bits().to_le_bytes()[..size]);
        }
        out
    }

    /// Inverse of [`register_bytes`](Self::register_bytes).
    pub(crate) fn from_register_bytes(species: &'static Species, bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), species.vector_byte_size());
        let lanes = bytes
            .chunks_exact(species.element_size())
            .map(|chunk| {
                let mut raw = [0u8; 8];
                raw[..chunk.len()].copy_from_slice(chunk);
                E::from_bits(u64::from_le_bytes(raw))
            })
            .collect();
        Self::from_parts(species, lanes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::VectorShape;

    fn ints() -> VectorSpecies<i32> {
        VectorSpecies::of(VectorShape::S128).unwrap()
    }

    #[test]
    fn test_slice_round_trip() {
        let data = [1, 2, 3, 4, 5, 6];
        let v = ints().from_slice(&data, 2).unwrap();
        assert_eq!(v.to_vec(), [3, 4, 5, 6]);
        assert!(matches!(
            ints().from_slice(&data, 3),
            Err(VectorError::OutOfBounds { offset: 3, len: 4, available: 6 })
        ));

        let mut out = [0; 5];
        v.into_slice(&mut out, 1).unwrap();
        assert_eq!(out, [0, 3, 4, 5, 6]);
        assert!(v.into_slice(&mut out, 2).is_err());
    }

    #[test]
    fn test_masked_slices_check_active_lanes_only() {
        let s = ints();
        let data = [10, 20, 30];
        let m = s.mask_from_values(&[true, true, true, false]).unwrap();
        assert_eq!(s.from_slice_masked(&data, 0, &m).unwrap().to_vec(), [10, 20, 30, 0]);
        assert!(s.from_slice_masked(&data, 1, &m).is_err());
        assert_eq!(s.from_slice_masked(&data, 9, &s.mask_all(false)).unwrap(), s.zero());

        let mut out = [0; 3];
        s.from_values(&[1, 2, 3, 4]).unwrap().into_slice_masked(&mut out, 0, &m).unwrap();
        assert_eq!(out, [1, 2, 3]);
        let sparse = s.mask_from_values(&[false, true, false, false]).unwrap();
        let mut out = [9; 3];
        s.broadcast(7).into_slice_masked(&mut out, 1, &sparse).unwrap();
        assert_eq!(out, [9, 9, 7]);
    }

    #[test]
    fn test_bytes_in_both_orders() {
        let s = ints();
        let v = s.from_values(&[0x0102_0304, 0, -1, 0x7f00_0000]).unwrap();
        let mut le = [0u8; 16];
        v.into_bytes(&mut le, 0, ByteOrder::LittleEndian).unwrap();
        assert_eq!(&le[..4], &[4, 3, 2, 1]);
        let mut be = [0u8; 16];
        v.into_bytes(&mut be, 0, ByteOrder::BigEndian).unwrap();
        assert_eq!(&be[..4], &[1, 2, 3, 4]);

        assert_eq!(s.from_bytes(&le, 0, ByteOrder::LittleEndian).unwrap(), v);
        assert_eq!(s.from_bytes(&be, 0, ByteOrder::BigEndian).unwrap(), v);
        assert!(s.from_bytes(&le, 1, ByteOrder::LittleEndian).is_err());
    }

    #[test]
    fn test_masked_bytes() {
        let s = VectorSpecies::<i16>::of(VectorShape::S64).unwrap();
        let m = s.mask_from_values(&[true, false, true, false]).unwrap();
        let bytes = [1u8, 0, 0xff, 0xff, 2, 0];
        let v = s.from_bytes_masked(&bytes, 0, ByteOrder::LittleEndian, &m).unwrap();
        assert_eq!(v.to_vec(), [1, 0, 2, 0]);

        let mut out = [0u8; 6];
        s.broadcast(0x0a0b)
            .into_bytes_masked(&mut out, 0, ByteOrder::BigEndian, &m)
            .unwrap();
        assert_eq!(out, [0x0a, 0x0b, 0, 0, 0x0a, 0x0b]);
    }

    #[test]
    fn test_float_bytes() {
        let s = VectorSpecies::<f64>::of(VectorShape::S128).unwrap();
        let v = s.from_values(&[1.5, -0.0]).unwrap();
        let mut out = [0u8; 16];
        v.into_bytes(&mut out, 0, ByteOrder::BigEndian).unwrap();
        assert_eq!(&out[..8], &1.5f64.to_be_bytes());
        let back = s.from_bytes(&out, 0, ByteOrder::BigEndian).unwrap();
        assert!(back.lane(1).unwrap().is_sign_negative());
        assert_eq!(back.lane(0), Ok(1.5));
    }

    #[test]
    fn test_register_bytes_are_little_endian() {
        let v = ints().from_values(&[0x0403_0201, 0, 0, -1]).unwrap();
        let bytes = v.register_bytes();
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
        assert_eq!(&bytes[12..], &[0xff; 4]);
        assert_eq!(Vector::<i32>::from_register_bytes(v.untyped_species(), &bytes), v);
    }
}
