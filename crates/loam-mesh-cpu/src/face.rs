use loam_geom::Vec3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Face whose outward normal is the given axis step, if it is one.
    pub fn from_delta(d: (i32, i32, i32)) -> Option<Face> {
        Face::ALL.into_iter().find(|f| f.delta() == d)
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        let (x, y, z) = self.delta();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Unit-cube corners of the face quad, in emission order.
    /// Triangles are (0,1,2) and (0,2,3).
    #[inline]
    pub fn corners(self) -> [[f32; 3]; 4] {
        match self {
            Face::PosX => [[1., 0., 0.], [1., 1., 0.], [1., 1., 1.], [1., 0., 1.]],
            Face::NegX => [[0., 0., 1.], [0., 1., 1.], [0., 1., 0.], [0., 0., 0.]],
            Face::PosY => [[0., 1., 1.], [1., 1., 1.], [1., 1., 0.], [0., 1., 0.]],
            Face::NegY => [[0., 0., 0.], [1., 0., 0.], [1., 0., 1.], [0., 0., 1.]],
            Face::PosZ => [[0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.]],
            Face::NegZ => [[0., 1., 0.], [1., 1., 0.], [1., 0., 0.], [0., 0., 0.]],
        }
    }
}
