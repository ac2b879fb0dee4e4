use bytes::Buf;
use num_traits::FromPrimitive;

use crate::{Address, Error, Result};

pub(crate) trait BufExt: Buf + Sized {
    /// Fails with [`Error::Truncated`] unless `len` more bytes are available.
    fn ensure(&self, len: usize) -> Result<()> {
        if self.remaining() < len {
            return Err(Error::Truncated {
                expected: len,
                actual: self.remaining(),
            });
        }

        Ok(())
    }

    fn get_address(&mut self) -> Address {
        Address::from_buf(self)
    }

    fn get_bool(&mut self) -> bool {
        self.get_u8() != 0
    }

    fn get_primitive_u8<T: FromPrimitive>(&mut self) -> Result<T> {
        FromPrimitive::from_u8(self.get_u8()).ok_or(Error::InvalidData)
    }

    fn get_array_u8<const N: usize>(&mut self) -> [u8; N] {
        let mut arr = [0u8; N];
        self.copy_to_slice(&mut arr[..]);
        arr
    }
}

impl<T: Buf> BufExt for T {}

pub(crate) fn check_error(value: libc::c_int) -> std::io::Result<libc::c_int> {
    if value < 0 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(value)
    }
}
