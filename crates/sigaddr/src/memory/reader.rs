use crate::error::{Error, Result};

/// Fixed-width little-endian values that can be decoded from target memory.
pub trait MemoryValue: Sized {
    const SIZE: usize;

    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_memory_value {
    ($($ty:ty),*) => {
        $(
            impl MemoryValue for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_memory_value!(u8, u16, u32, u64, i8, i16, i32, i64);

/// Read a fixed-width value at `address`.
pub fn read_value<T, R>(reader: &R, address: u64) -> Result<T>
where
    T: MemoryValue,
    R: ReadMemory + ?Sized,
{
    let bytes = reader.read_bytes(address, T::SIZE)?;
    if bytes.len() < T::SIZE {
        return Err(Error::read_failed(
            address,
            format!("short read: wanted {} bytes, got {}", T::SIZE, bytes.len()),
        ));
    }
    Ok(T::from_le_slice(&bytes))
}

/// Access to the memory of the process being searched.
///
/// Implementations for other processes only need `read_bytes`. Readers that
/// address the caller's own memory additionally hand out borrowed views via
/// `local_view`, which lets in-process searches skip the bulk copy.
pub trait ReadMemory: Send + Sync {
    /// Read exactly `size` bytes starting at `address`.
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Borrow `size` bytes at `address` without copying.
    fn local_view(&self, _address: u64, _size: usize) -> Option<&[u8]> {
        None
    }

    /// Width of a pointer in the target, in bytes.
    fn pointer_width(&self) -> usize {
        8
    }

    fn read_u8(&self, address: u64) -> Result<u8> {
        read_value(self, address)
    }

    fn read_u16(&self, address: u64) -> Result<u16> {
        read_value(self, address)
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        read_value(self, address)
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        read_value(self, address)
    }

    /// Read a pointer-sized value, zero-extended to 64 bits.
    fn read_pointer(&self, address: u64) -> Result<u64> {
        match self.pointer_width() {
            4 => self.read_u32(address).map(u64::from),
            8 => self.read_u64(address),
            width => Err(Error::read_failed(
                address,
                format!("unsupported pointer width {}", width),
            )),
        }
    }
}

impl<T: ReadMemory + ?Sized> ReadMemory for &T {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, size)
    }

    fn local_view(&self, address: u64, size: usize) -> Option<&[u8]> {
        (**self).local_view(address, size)
    }

    fn pointer_width(&self) -> usize {
        (**self).pointer_width()
    }
}
