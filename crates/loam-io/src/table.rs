use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use loam_blocks::Voxel;
use loam_geom::IVec3;
use serde_json::Value;

use crate::PersistError;

/// Result of decoding an external table: the accepted records and how many
/// entries were dropped during validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub entries: Vec<(IVec3, Voxel)>,
    pub discarded: usize,
}

/// Parses an `"x,y,z"` key. Whitespace around components is tolerated.
pub fn parse_key(key: &str) -> Option<IVec3> {
    let mut it = key.split(',').map(|s| s.trim().parse::<i32>());
    let (x, y, z) = (it.next()?.ok()?, it.next()?.ok()?, it.next()?.ok()?);
    if it.next().is_some() {
        return None;
    }
    Some(IVec3::new(x, y, z))
}

/// Serializes records as a JSON object mapping `"x,y,z"` to a numeric voxel id.
pub fn encode_table(entries: &[(IVec3, Voxel)]) -> Result<String, PersistError> {
    let map: BTreeMap<String, u8> = entries
        .iter()
        .map(|(p, v)| (p.to_string(), v.id()))
        .collect();
    Ok(serde_json::to_string(&map)?)
}

/// Decodes and validates a table entry by entry. Only a document that is not
/// a JSON object fails as a whole.
pub fn decode_table(json: &str, world_height: usize) -> Result<ImportReport, PersistError> {
    let doc: Value = serde_json::from_str(json)?;
    let Value::Object(map) = doc else {
        return Err(PersistError::Invalid("expected a JSON object".into()));
    };
    let mut report = ImportReport::default();
    for (key, value) in map {
        let Some(pos) = parse_key(&key) else {
            log::warn!("import: discarding malformed key {key:?}");
            report.discarded += 1;
            continue;
        };
        if pos.y < 0 || pos.y as usize >= world_height {
            log::warn!("import: discarding {key}: y outside [0, {world_height})");
            report.discarded += 1;
            continue;
        }
        let Some(voxel) = value.as_f64().and_then(Voxel::coerce) else {
            log::warn!("import: discarding {key}: non-numeric value {value}");
            report.discarded += 1;
            continue;
        };
        if value.as_f64() != Some(f64::from(voxel.id())) {
            log::warn!("import: coerced {key} value {value} to {}", voxel.id());
        }
        report.entries.push((pos, voxel));
    }
    report.entries.sort_by_key(|(p, _)| *p);
    Ok(report)
}

pub fn write_table_file(path: &Path, entries: &[(IVec3, Voxel)]) -> Result<(), PersistError> {
    let s = encode_table(entries)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, s)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn read_table_file(path: &Path, world_height: usize) -> Result<ImportReport, PersistError> {
    let s = fs::read_to_string(path)?;
    decode_table(&s, world_height)
}
