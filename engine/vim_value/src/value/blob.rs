//! Shared, mutable byte sequences.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use super::list::resolve_index;
use super::lock::LockState;
use crate::errors::{blob_index_out_of_range, invalid_range, locked_value, EvalError};

#[derive(Debug, Default)]
pub struct BlobData {
    pub bytes: Vec<u8>,
    pub lock: LockState,
}

/// Reference-counted handle to a Blob; cloning aliases.
#[derive(Clone, Default)]
pub struct BlobRef(Rc<RefCell<BlobData>>);

impl BlobRef {
    pub fn new(bytes: Vec<u8>) -> Self {
        BlobRef(Rc::new(RefCell::new(BlobData {
            bytes,
            lock: LockState::default(),
        })))
    }

    pub fn borrow(&self) -> Ref<'_, BlobData> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, BlobData> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &BlobRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    pub fn len(&self) -> usize {
        self.0.borrow().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().bytes.is_empty()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.borrow().bytes.clone()
    }

    pub fn get(&self, index: i64) -> Option<u8> {
        let data = self.0.borrow();
        resolve_index(data.bytes.len(), index).map(|i| data.bytes[i])
    }

    pub fn is_locked(&self) -> bool {
        self.0.borrow().lock.is_locked()
    }

    pub fn check_unlocked(&self, what: &str) -> Result<(), EvalError> {
        if self.is_locked() {
            Err(locked_value(what))
        } else {
            Ok(())
        }
    }

    /// Blob bytes have no slot locks; the container lock covers them.
    pub fn set(&self, index: i64, byte: u8, what: &str) -> Result<(), EvalError> {
        self.check_unlocked(what)?;
        let mut data = self.0.borrow_mut();
        let Some(i) = resolve_index(data.bytes.len(), index) else {
            return Err(blob_index_out_of_range(index));
        };
        data.bytes[i] = byte;
        Ok(())
    }

    pub fn push(&self, byte: u8, what: &str) -> Result<(), EvalError> {
        self.check_unlocked(what)?;
        self.0.borrow_mut().bytes.push(byte);
        Ok(())
    }

    pub fn insert(&self, at: usize, byte: u8, what: &str) -> Result<(), EvalError> {
        self.check_unlocked(what)?;
        let mut data = self.0.borrow_mut();
        let at = at.min(data.bytes.len());
        data.bytes.insert(at, byte);
        Ok(())
    }

    pub fn remove(&self, index: i64, what: &str) -> Result<u8, EvalError> {
        self.check_unlocked(what)?;
        let mut data = self.0.borrow_mut();
        let Some(i) = resolve_index(data.bytes.len(), index) else {
            return Err(blob_index_out_of_range(index));
        };
        Ok(data.bytes.remove(i))
    }

    /// Remove the inclusive range `start..=end`.
    pub fn remove_range(&self, start: i64, end: i64, what: &str) -> Result<Vec<u8>, EvalError> {
        self.check_unlocked(what)?;
        let mut data = self.0.borrow_mut();
        let len = data.bytes.len();
        let Some(first) = resolve_index(len, start) else {
            return Err(blob_index_out_of_range(start));
        };
        let Some(last) = resolve_index(len, end) else {
            return Err(blob_index_out_of_range(end));
        };
        if last < first {
            return Err(invalid_range());
        }
        Ok(data.bytes.drain(first..=last).collect())
    }

    pub fn replace(&self, bytes: Vec<u8>, what: &str) -> Result<(), EvalError> {
        self.check_unlocked(what)?;
        self.0.borrow_mut().bytes = bytes;
        Ok(())
    }

    pub fn reverse(&self, what: &str) -> Result<(), EvalError> {
        self.check_unlocked(what)?;
        self.0.borrow_mut().bytes.reverse();
        Ok(())
    }
}

impl fmt::Debug for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobRef({:#x}, len={})", self.addr(), self.len())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::errors::EvalErrorKind;

    #[test]
    fn index_and_remove() {
        let blob = BlobRef::new(vec![1, 2, 3, 4]);
        assert_eq!(blob.get(-1), Some(4));
        assert_eq!(blob.remove(0, "remove()").unwrap(), 1);
        assert_eq!(blob.remove_range(0, -2, "remove()").unwrap(), vec![2, 3]);
        assert_eq!(blob.to_vec(), vec![4]);
        let err = blob.remove(5, "remove()").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::BlobIndexOutOfRange { index: 5 });
    }
}
