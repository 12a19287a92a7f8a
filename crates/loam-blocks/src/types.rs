use serde::{Deserialize, Serialize};

/// One cell's material. Stored as a single byte in chunk grids.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Voxel {
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    Sand = 4,
    Water = 5,
    Wood = 6,
    Leaves = 7,
    Snow = 8,
}

/// Placeable voxels in selection order.
pub const HOTBAR: [Voxel; 8] = [
    Voxel::Grass,
    Voxel::Dirt,
    Voxel::Stone,
    Voxel::Sand,
    Voxel::Water,
    Voxel::Wood,
    Voxel::Leaves,
    Voxel::Snow,
];

impl Voxel {
    pub const COUNT: usize = 9;
    pub const MAX_ID: u8 = 8;

    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn from_id(id: u8) -> Option<Voxel> {
        Some(match id {
            0 => Voxel::Air,
            1 => Voxel::Grass,
            2 => Voxel::Dirt,
            3 => Voxel::Stone,
            4 => Voxel::Sand,
            5 => Voxel::Water,
            6 => Voxel::Wood,
            7 => Voxel::Leaves,
            8 => Voxel::Snow,
            _ => return None,
        })
    }

    /// Maps an arbitrary number onto the nearest valid identifier.
    /// Returns `None` for NaN.
    pub fn coerce(raw: f64) -> Option<Voxel> {
        if raw.is_nan() {
            return None;
        }
        let id = raw.round().clamp(0.0, f64::from(Self::MAX_ID)) as u8;
        Self::from_id(id)
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, Voxel::Air)
    }

    #[inline]
    pub const fn is_water(self) -> bool {
        matches!(self, Voxel::Water)
    }

    /// Non-air and non-water: blocks movement and hides neighbor faces.
    #[inline]
    pub const fn is_solid(self) -> bool {
        !self.is_air() && !self.is_water()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Voxel::Air => "air",
            Voxel::Grass => "grass",
            Voxel::Dirt => "dirt",
            Voxel::Stone => "stone",
            Voxel::Sand => "sand",
            Voxel::Water => "water",
            Voxel::Wood => "wood",
            Voxel::Leaves => "leaves",
            Voxel::Snow => "snow",
        }
    }

    pub fn from_name(name: &str) -> Option<Voxel> {
        (0..=Self::MAX_ID)
            .filter_map(Self::from_id)
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    /// Steps through [`HOTBAR`] with wrap-around. Non-hotbar voxels start from the first slot.
    pub fn cycle(self, dir: i32) -> Voxel {
        let n = HOTBAR.len() as i32;
        let idx = HOTBAR.iter().position(|v| *v == self).unwrap_or(0) as i32;
        HOTBAR[(idx + dir).rem_euclid(n) as usize]
    }
}

impl From<Voxel> for u8 {
    fn from(v: Voxel) -> u8 {
        v.id()
    }
}
