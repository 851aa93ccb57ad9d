//! Binary save/load for the index.
//!
//! The format is fixed little-endian with fixed-width fields:
//!
//! ```text
//! [magic "NVG1" 4B]
//! [i32 metric id][u64 dimension]            distance state
//! [u64 data_size][u64 node_size]            geometry
//! [u64 capacity][u64 cur_num_nodes][u64 M]
//! [capacity × (data f32s | M × u32 links | label bytes)]
//! [magic "NVGC" 4B][CRC32 4B BE]            integrity footer
//! ```
//!
//! Unclaimed arena slots are written as zeroes so a save/load round trip is
//! byte-identical. File-based saves write to a temp file and rename to
//! prevent corruption on crash.

use crate::distance::Distance;
use crate::nsw::arena::{Label, NodeArena};
use crate::nsw::visited::VisitedSet;
use crate::nsw::NswIndex;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Magic bytes at the start of an index file.
const INDEX_MAGIC: &[u8; 4] = b"NVG1";

/// Magic bytes preceding the CRC32 footer.
const CRC_MAGIC: &[u8; 4] = b"NVGC";

impl<L: Label> NswIndex<L> {
    /// Serialize the index to a writer.
    pub fn save<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        tracing::debug!("serialized index: {} bytes", bytes.len());
        Ok(())
    }

    /// Deserialize an index previously written by [`NswIndex::save`].
    ///
    /// The label type `L` must match the one the index was saved with; a
    /// mismatch is caught by the node-size validation.
    pub fn load<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        Self::from_bytes(&raw)
    }

    /// Save to a file atomically (temp file + rename).
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = self.to_bytes()?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, path)?;
        tracing::info!(
            "saved index ({} nodes, {} bytes) to {:?}",
            self.arena.len(),
            bytes.len(),
            path
        );
        Ok(())
    }

    /// Load from a file written by [`NswIndex::save_to_file`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let raw = fs::read(path.as_ref())?;
        let index = Self::from_bytes(&raw)?;
        tracing::info!("loaded index ({} nodes) from {:?}", index.len(), path.as_ref());
        Ok(index)
    }

    fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let arena = &self.arena;
        let node_size = arena.node_size_bytes();
        let mut out =
            Vec::with_capacity(64 + arena.capacity() * node_size + CRC_MAGIC.len() + 4);

        out.extend_from_slice(INDEX_MAGIC);
        self.distance.write_to(&mut out)?;
        out.extend_from_slice(&(self.distance.data_size() as u64).to_le_bytes());
        out.extend_from_slice(&(node_size as u64).to_le_bytes());
        out.extend_from_slice(&(arena.capacity() as u64).to_le_bytes());
        out.extend_from_slice(&(arena.len() as u64).to_le_bytes());
        out.extend_from_slice(&(arena.max_links() as u64).to_le_bytes());

        let mut label_buf = vec![0u8; L::SIZE];
        for node in 0..arena.capacity() as u32 {
            for &value in arena.data(node) {
                out.extend_from_slice(&value.to_le_bytes());
            }
            for &link in arena.links(node) {
                out.extend_from_slice(&link.to_le_bytes());
            }
            arena.label(node).write_bytes(&mut label_buf);
            out.extend_from_slice(&label_buf);
        }

        let crc = crc32fast::hash(&out);
        out.extend_from_slice(CRC_MAGIC);
        out.extend_from_slice(&crc.to_be_bytes());
        Ok(out)
    }

    fn from_bytes(raw: &[u8]) -> io::Result<Self> {
        let footer_len = CRC_MAGIC.len() + 4;
        if raw.len() < INDEX_MAGIC.len() + footer_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "index file truncated: missing header or footer",
            ));
        }
        if &raw[..4] != INDEX_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "bad index magic: not a navgraph index file",
            ));
        }

        let payload = &raw[..raw.len() - footer_len];
        let footer = &raw[raw.len() - footer_len..];
        if &footer[..4] != CRC_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "index file truncated: missing CRC32 footer",
            ));
        }
        let stored_crc = u32::from_be_bytes([footer[4], footer[5], footer[6], footer[7]]);
        let computed_crc = crc32fast::hash(payload);
        if computed_crc != stored_crc {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "index CRC32 mismatch: expected {stored_crc:#010x}, got {computed_crc:#010x}"
                ),
            ));
        }
        tracing::debug!("index CRC32 verified: {:#010x}", stored_crc);

        let mut cursor = &payload[4..];
        let distance = Distance::read_from(&mut cursor)?;
        let data_size = read_u64_le(&mut cursor)? as usize;
        let node_size = read_u64_le(&mut cursor)? as usize;
        let capacity = read_u64_le(&mut cursor)? as usize;
        let cur_num_nodes = read_u64_le(&mut cursor)? as usize;
        let max_links = read_u64_le(&mut cursor)? as usize;

        if data_size != distance.data_size() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "data size mismatch: index file has {data_size} bytes, \
                     distance reports {} — is the dimension correct?",
                    distance.data_size()
                ),
            ));
        }
        let expected_node_size =
            data_size + max_links * std::mem::size_of::<u32>() + L::SIZE;
        if node_size != expected_node_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "node size mismatch: index file has {node_size} bytes, expected \
                     {expected_node_size} from the data size, max links, and label width"
                ),
            ));
        }
        if max_links == 0 || capacity == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "index geometry fields must be positive",
            ));
        }
        if cur_num_nodes > capacity {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("node count {cur_num_nodes} exceeds capacity {capacity}"),
            ));
        }
        if cursor.len() != capacity * node_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "arena size mismatch: {} bytes present, expected {}",
                    cursor.len(),
                    capacity * node_size
                ),
            ));
        }

        let dimension = distance.dimension();
        let mut arena: NodeArena<L> = NodeArena::new(dimension, max_links, capacity);
        let mut label_buf = vec![0u8; L::SIZE];
        for node in 0..capacity as u32 {
            for value in arena.data_mut(node) {
                *value = read_f32_le(&mut cursor)?;
            }
            for link in arena.links_mut(node) {
                *link = read_u32_le(&mut cursor)?;
            }
            cursor.read_exact(&mut label_buf)?;
            arena.set_label(node, L::read_bytes(&label_buf));
        }
        arena.set_len(cur_num_nodes);

        Ok(Self {
            visited: VisitedSet::new(capacity),
            scratch: vec![0.0; dimension],
            arena,
            distance,
        })
    }
}

fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64_le<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f32_le<R: Read>(reader: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_K_INIT;
    use crate::distance::Distance;

    fn tmp_path(name: &str) -> std::path::PathBuf {
        let id = uuid::Uuid::new_v4();
        std::env::temp_dir().join(format!("navgraph_{name}_{id}.idx"))
    }

    fn built_index() -> NswIndex<u64> {
        let mut index = NswIndex::new(Distance::squared_l2(2), 16, 4);
        for i in 0..10u64 {
            index.add(&[i as f32, (i % 4) as f32], 100 + i, 16, DEFAULT_K_INIT);
        }
        index
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut index = built_index();
        let mut bytes = Vec::new();
        index.save(&mut bytes).unwrap();

        let mut loaded: NswIndex<u64> = NswIndex::load(&mut &bytes[..]).unwrap();
        assert_eq!(loaded.len(), index.len());
        assert_eq!(loaded.capacity(), index.capacity());
        assert_eq!(loaded.max_links(), index.max_links());
        assert_eq!(loaded.dimension(), index.dimension());
        assert_eq!(loaded.distance(), index.distance());

        // Same search results
        let query = [3.2, 1.1];
        assert_eq!(
            index.search(&query, 5, 16, DEFAULT_K_INIT),
            loaded.search(&query, 5, 16, DEFAULT_K_INIT)
        );

        // Re-saving produces byte-identical output
        let mut bytes2 = Vec::new();
        loaded.save(&mut bytes2).unwrap();
        assert_eq!(bytes, bytes2);
    }

    #[test]
    fn test_file_round_trip() {
        let index = built_index();
        let path = tmp_path("roundtrip");
        index.save_to_file(&path).unwrap();
        let loaded: NswIndex<u64> = NswIndex::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), 10);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupted_file_detected() {
        let index = built_index();
        let mut bytes = Vec::new();
        index.save(&mut bytes).unwrap();
        // Flip a byte in the middle of the arena
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        let err = NswIndex::<u64>::load(&mut &bytes[..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("CRC32"), "unexpected error: {err}");
    }

    #[test]
    fn test_truncated_file_detected() {
        let index = built_index();
        let mut bytes = Vec::new();
        index.save(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(NswIndex::<u64>::load(&mut &bytes[..]).is_err());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = Vec::new();
        built_index().save(&mut bytes).unwrap();
        bytes[0] = b'X';
        let err = NswIndex::<u64>::load(&mut &bytes[..]).unwrap_err();
        assert!(err.to_string().contains("magic"), "unexpected error: {err}");
    }

    #[test]
    fn test_label_width_mismatch_rejected() {
        let index = built_index(); // u64 labels
        let mut bytes = Vec::new();
        index.save(&mut bytes).unwrap();
        // Loading with a narrower label type changes the expected node size
        let err = NswIndex::<u32>::load(&mut &bytes[..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(
            err.to_string().contains("node size"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_data_size_mismatch_rejected() {
        let index = built_index();
        let mut bytes = Vec::new();
        index.save(&mut bytes).unwrap();
        // Patch the data_size field (offset: 4 magic + 4 id + 8 dim) and
        // recompute the CRC so only the coherence check can fire
        let patched = 999u64.to_le_bytes();
        bytes[16..24].copy_from_slice(&patched);
        let payload_len = bytes.len() - 8;
        let crc = crc32fast::hash(&bytes[..payload_len]);
        let crc_start = payload_len + 4;
        bytes[crc_start..].copy_from_slice(&crc.to_be_bytes());

        let err = NswIndex::<u64>::load(&mut &bytes[..]).unwrap_err();
        assert!(
            err.to_string().contains("data size"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_reordered_index_round_trip() {
        let mut index = built_index();
        index.reorder_rcm();
        let mut bytes = Vec::new();
        index.save(&mut bytes).unwrap();
        let mut loaded: NswIndex<u64> = NswIndex::load(&mut &bytes[..]).unwrap();
        assert_eq!(
            index.search(&[5.0, 2.0], 3, 16, DEFAULT_K_INIT),
            loaded.search(&[5.0, 2.0], 3, 16, DEFAULT_K_INIT)
        );
    }

    #[test]
    fn test_empty_index_round_trip() {
        let index: NswIndex<u64> = NswIndex::new(Distance::inner_product(3), 4, 2);
        let mut bytes = Vec::new();
        index.save(&mut bytes).unwrap();
        let loaded: NswIndex<u64> = NswIndex::load(&mut &bytes[..]).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.capacity(), 4);
    }
}
