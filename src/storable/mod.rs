pub mod blob;
pub mod commit;
pub mod tree;

use crate::digest::Digest;

/// Something that can be written to the object database.
pub trait Storable {
    const KIND: &'static str;

    /// The object's payload, without the `"{kind} {len}\0"` header.
    fn payload(&self) -> Vec<u8>;
}

/// A formatted object together with its id, ready to be written.
pub struct DatabaseObject<T> {
    oid: Digest,
    formatted: Vec<u8>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Storable> DatabaseObject<T> {
    /// Format `obj` as `"{kind} {len}\0{payload}"` and hash the result.
    ///
    /// e.g. a blob `"hello\n"` becomes `"blob 6\0hello\n"`
    pub fn new(obj: &T) -> Self {
        let payload = obj.payload();
        let mut formatted = Vec::with_capacity(payload.len() + 16);
        formatted.extend_from_slice(T::KIND.as_bytes());
        formatted.push(b' ');
        formatted.extend_from_slice(payload.len().to_string().as_bytes());
        formatted.push(b'\0');
        formatted.extend_from_slice(&payload);
        let oid = Digest::new(&formatted);

        Self {
            oid,
            formatted,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn oid(&self) -> &Digest {
        &self.oid
    }

    pub fn into_oid(self) -> Digest {
        self.oid
    }

    pub fn formatted(&self) -> &[u8] {
        &self.formatted
    }
}
