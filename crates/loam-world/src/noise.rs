//! Integer lattice hashing and 2D value noise.

/// Deterministic hash of a lattice point into `[0, 1)`.
#[inline]
pub fn hash3(x: i32, y: i32, z: i32, seed: u32) -> f64 {
    let a = x.wrapping_mul(374_761_393).wrapping_add(y.wrapping_mul(668_265_263)) as u32;
    let mut h = a ^ (z.wrapping_mul(2_147_483_647) as u32) ^ seed;
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^= h >> 16;
    f64::from(h) / 4_294_967_296.0
}

#[inline]
fn lattice(v: f64) -> i32 {
    // Wrap like a 32-bit integer conversion rather than saturating.
    (v as i64) as i32
}

/// Bilinear value noise over `hash3(ix, 0, iz)`. Output lies in `[0, 1)`.
pub fn noise2(x: f64, z: f64, seed: u32) -> f64 {
    let x0 = x.floor();
    let z0 = z.floor();
    let sx = x - x0;
    let sz = z - z0;
    let (ix, iz) = (lattice(x0), lattice(z0));
    let n00 = hash3(ix, 0, iz, seed);
    let n10 = hash3(ix.wrapping_add(1), 0, iz, seed);
    let n01 = hash3(ix, 0, iz.wrapping_add(1), seed);
    let n11 = hash3(ix.wrapping_add(1), 0, iz.wrapping_add(1), seed);
    let a = n00 + (n10 - n00) * sx;
    let b = n01 + (n11 - n01) * sx;
    a + (b - a) * sz
}

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over the UTF-16 code units of `name`.
pub fn seed_from_name(name: &str) -> u32 {
    name.encode_utf16().fold(FNV_OFFSET, |h, unit| {
        (h ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}
