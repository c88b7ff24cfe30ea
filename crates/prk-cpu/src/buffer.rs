//! Host-resident buffer shared by the host backends.

use prk_core::Element;

/// A buffer that lives in host memory.
#[derive(Debug, Clone, PartialEq)]
pub struct HostBuffer<T: Element> {
    data: Vec<T>,
}

impl<T: Element> HostBuffer<T> {
    /// Copy host data into a new buffer.
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read access.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Write access.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}
