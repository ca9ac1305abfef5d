//! Object store
//!
//! Content-addressed, append-only storage for blobs and trees. Objects are
//! zlib-compressed and written under `objects/<2 hex>/<38 hex>`; writing an
//! object that already exists is a no-op.

use crate::areas::storage::Storage;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::Path;
use std::rc::Rc;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    storage: Rc<dyn Storage>,
}

impl Database {
    pub fn new(path: Box<Path>, storage: Rc<dyn Storage>) -> Self {
        Database { path, storage }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.storage.exists(&self.path.join(object_id.to_path()))
    }

    /// Store an object unless it already exists and return its id
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        if !self.contains(&object_id) {
            let object_path = self.path.join(object_id.to_path());
            let object_content = Self::compress(&object.serialize()?)?;
            self.storage
                .write(&object_path, &object_content)
                .map_err(|err| {
                    RepositoryError::io(
                        format!("unable to write object file {}", object_path.display()),
                        err,
                    )
                })?;
            tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");
        }

        Ok(object_id)
    }

    /// Read the framed object bytes (`<type> <size>\0<payload>`)
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let object_content = self.storage.read(&object_path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                anyhow::Error::new(RepositoryError::ObjectNotFound(object_id.clone()))
            } else {
                anyhow::Error::new(RepositoryError::io(
                    format!("unable to read object file {}", object_path.display()),
                    err,
                ))
            }
        })?;

        Self::decompress(&object_content)
            .map_err(|err| RepositoryError::corrupt(object_id, err.to_string()).into())
    }

    pub fn parse_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let reader = self.open_typed(object_id, ObjectType::Blob)?;

        Blob::deserialize(reader)
            .map_err(|err| RepositoryError::corrupt(object_id, err.to_string()).into())
    }

    pub fn parse_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let reader = self.open_typed(object_id, ObjectType::Tree)?;

        Tree::deserialize(reader)
            .map_err(|err| RepositoryError::corrupt(object_id, err.to_string()).into())
    }

    pub fn object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let content = self.load(object_id)?;
        let mut reader = Cursor::new(content);

        ObjectType::parse_object_header(&mut reader)
            .map(|(object_type, _)| object_type)
            .map_err(|err| RepositoryError::corrupt(object_id, err.to_string()).into())
    }

    fn open_typed(
        &self,
        object_id: &ObjectId,
        expected: ObjectType,
    ) -> anyhow::Result<impl BufRead + use<>> {
        let content = self.load(object_id)?;
        let mut reader = Cursor::new(content);

        let (object_type, size) = ObjectType::parse_object_header(&mut reader)
            .map_err(|err| RepositoryError::corrupt(object_id, err.to_string()))?;

        if object_type != expected {
            return Err(RepositoryError::corrupt(
                object_id,
                format!("expected a {expected}, found a {object_type}"),
            )
            .into());
        }

        let remaining = reader.get_ref().len() - reader.position() as usize;
        if remaining != size {
            return Err(RepositoryError::corrupt(
                object_id,
                format!("declared size {size} but found {remaining} bytes"),
            )
            .into());
        }

        Ok(reader)
    }

    fn compress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }
}
