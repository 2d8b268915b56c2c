//! Deterministic assignment of catalog plates to a session.

use std::collections::BTreeMap;

use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::domain::{Catalog, ImageIndex, SESSION_COMPOSITION};
use crate::error::Result;

/// Catalog entry ids for plates 1 through 10.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAssignment {
    ids: [u32; ImageIndex::MAX as usize],
}

impl SessionAssignment {
    /// Entry id for plate `index`.
    #[must_use]
    pub const fn get(&self, index: ImageIndex) -> u32 {
        self.ids[index.position()]
    }

    /// `(index, id)` pairs in plate order.
    pub fn iter(&self) -> impl Iterator<Item = (ImageIndex, u32)> + '_ {
        ImageIndex::all().zip(self.ids.iter().copied())
    }

    /// Ids in plate order.
    #[must_use]
    pub const fn ids(&self) -> &[u32] {
        &self.ids
    }
}

impl Serialize for SessionAssignment {
    /// Serializes as `{"1": id, ..., "10": id}`.
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let map: BTreeMap<u8, u32> = self.iter().map(|(i, id)| (i.get(), id)).collect();
        serializer.collect_map(map)
    }
}

/// Draws 3 protanopia, 3 deuteranopia, 3 tritanopia and 1 control entry
/// for `session_id`, assigned to plates 1 through 10 in that order.
///
/// The generator is seeded from SHA-256 of the session id alone, so the
/// mapping depends only on the session id and the catalog contents.
///
/// # Errors
///
/// Returns [`crate::CoreError::UnsupportedFormat`] for an unknown catalog
/// version, [`crate::CoreError::DuplicateEntryId`] when an id repeats and
/// [`crate::CoreError::CatalogInsufficient`] when a pool is too small.
pub fn map_session_to_catalog(session_id: &str, catalog: &Catalog) -> Result<SessionAssignment> {
    catalog.check_version()?;
    catalog.check_unique_ids()?;
    catalog.check_pools()?;

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&Sha256::digest(session_id.as_bytes()));
    let mut rng = ChaCha8Rng::from_seed(seed);
    let mut ids = Vec::with_capacity(usize::from(ImageIndex::MAX));
    for (deficiency_type, required) in SESSION_COMPOSITION {
        let pool = catalog.pool(deficiency_type);
        ids.extend(sample(&mut rng, pool.len(), required).into_iter().map(|i| pool[i].id));
    }

    let mut assignment = [0u32; ImageIndex::MAX as usize];
    assignment.copy_from_slice(&ids);
    tracing::debug!(session_id, ?assignment, "session mapped to catalog");
    Ok(SessionAssignment { ids: assignment })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::{sha256_hex, CatalogEntry, DeficiencyType};
    use crate::CoreError;

    fn catalog(per_type: [u32; 4]) -> Catalog {
        let mut images = Vec::new();
        let mut id = 0;
        for (t, n) in DeficiencyType::ALL.into_iter().zip(per_type) {
            for _ in 0..n {
                images.push(CatalogEntry {
                    id,
                    filename: format!("image_{id:03}.png"),
                    correct_answer: 10,
                    deficiency_type: t,
                    difficulty: "medium".into(),
                    sha256: sha256_hex(&id.to_be_bytes()),
                    file_size: 1,
                });
                id += 1;
            }
        }
        Catalog::new(images, None, None)
    }

    #[test]
    fn test_composition_holds() {
        let cat = catalog([30, 30, 30, 10]);
        for s in 0..100 {
            let a = map_session_to_catalog(&format!("session-{s}"), &cat).unwrap();
            let distinct: HashSet<u32> = a.ids().iter().copied().collect();
            assert_eq!(distinct.len(), 10);
            for (index, id) in a.iter() {
                let t = cat.entry(id).unwrap().deficiency_type;
                let expected = match index.get() {
                    1..=3 => DeficiencyType::PROTANOPIA,
                    4..=6 => DeficiencyType::DEUTERANOPIA,
                    7..=9 => DeficiencyType::TRITANOPIA,
                    _ => DeficiencyType::Control,
                };
                assert_eq!(t, expected);
            }
        }
    }

    #[test]
    fn test_deterministic_per_session() {
        let cat = catalog([30, 30, 30, 10]);
        let a = map_session_to_catalog("abc", &cat).unwrap();
        assert_eq!(a, map_session_to_catalog("abc", &cat).unwrap());
        let differs = (0..20).any(|s| map_session_to_catalog(&format!("x{s}"), &cat).unwrap() != a);
        assert!(differs);
    }

    #[test]
    fn test_exact_pool_sizes_use_everything() {
        let cat = catalog([3, 3, 3, 1]);
        let a = map_session_to_catalog("s", &cat).unwrap();
        let mut ids = a.ids().to_vec();
        ids.sort_unstable();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_insufficient_pool() {
        let cat = catalog([3, 3, 3, 0]);
        assert!(matches!(
            map_session_to_catalog("s", &cat),
            Err(CoreError::CatalogInsufficient {
                deficiency_type: DeficiencyType::Control,
                required: 1,
                available: 0,
            })
        ));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut cat = catalog([3, 3, 3, 1]);
        cat.version = "0.9".into();
        assert!(matches!(
            map_session_to_catalog("s", &cat),
            Err(CoreError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut cat = catalog([3, 3, 3, 1]);
        cat.images[9].id = 0;
        assert!(matches!(
            map_session_to_catalog("s", &cat),
            Err(CoreError::DuplicateEntryId(0))
        ));
    }

    #[test]
    fn test_serializes_as_index_map() {
        let cat = catalog([3, 3, 3, 1]);
        let a = map_session_to_catalog("s", &cat).unwrap();
        let json = serde_json::to_value(&a).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 10);
        assert_eq!(obj["10"].as_u64().unwrap(), 9);
    }
}
