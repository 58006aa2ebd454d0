mod bbox;
mod frustum;
mod ray;
mod ray_box_intersection;

pub use bbox::BBox;
pub use frustum::Frustum;
pub use ray::{Ray, RayClassification};

pub type FloatType = f32;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldMatrix = nalgebra::Matrix4<FloatType>;
pub type PlanePoint = nalgebra::Point2<FloatType>;

pub type ScreenPoint = nalgebra::Point2<u32>;
pub type ScreenSize = nalgebra::Vector2<u32>;
pub type SubPixelPoint = nalgebra::Point2<FloatType>;
pub type SubPixelVector = nalgebra::Vector2<FloatType>;

#[cfg(test)]
pub mod test {
    use super::*;
    use proptest::prelude::*;

    /// Helper macro that creates a wrapper arnound a type that implemetns Deref and Arbitary
    macro_rules! arbitrary_wrapper {
        ( $wrapper_name:ident ( $type:ty ) -> $block:block ) => {
            #[derive(Clone, Debug)]
            pub struct $wrapper_name(pub $type);

            impl std::ops::Deref for $wrapper_name {
                type Target = $type;
                fn deref(&self) -> &$type {
                    &self.0
                }
            }

            impl Arbitrary for $wrapper_name {
                type Parameters = ();
                type Strategy = proptest::strategy::BoxedStrategy<Self>;
                fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
                    $block.prop_map(|x| $wrapper_name(x)).boxed()
                }
            }
        };
    }

    pub fn simple_float() -> BoxedStrategy<FloatType> {
        any::<i32>().prop_map(|n| n as FloatType * 1e-3).boxed()
    }

    pub fn simple_positive_float() -> BoxedStrategy<FloatType> {
        any::<u32>()
            .prop_map(|n| n as FloatType * 1e-3 + 1e-3)
            .boxed()
    }

    arbitrary_wrapper! {
        WorldPointWrapper(WorldPoint) -> {
            (simple_float(), simple_float(), simple_float())
                .prop_map(|coords| {
                    WorldPoint::new(coords.0, coords.1, coords.2)
                })
        }
    }

    arbitrary_wrapper! {
        NonzeroWorldVectorWrapper(WorldVector) -> {
            (simple_float(), simple_float(), simple_float())
                .prop_filter_map(
                    "vector is zero",
                    |coords| {
                        let vector = WorldVector::new(coords.0, coords.1, coords.2);
                        if vector.norm() < 1e-6 {
                            None
                        } else {
                            Some(vector)
                        }
                    })
        }
    }

    /// Direction vectors that exercise all sign classifications:
    /// each axis is independently negative, zero or positive.
    arbitrary_wrapper! {
        SignedAxesVectorWrapper(WorldVector) -> {
            let axis = || {
                prop_oneof![
                    simple_positive_float().prop_map(|x| -x),
                    Just(0.0 as FloatType),
                    simple_positive_float(),
                ]
            };
            (axis(), axis(), axis())
                .prop_filter_map(
                    "vector is zero",
                    |coords| {
                        let vector = WorldVector::new(coords.0, coords.1, coords.2);
                        if vector == WorldVector::zeros() {
                            None
                        } else {
                            Some(vector)
                        }
                    })
        }
    }

    arbitrary_wrapper! {
        BBoxWrapper(BBox) -> {
            (
                simple_float(), simple_float(), simple_float(),
                simple_positive_float(), simple_positive_float(), simple_positive_float(),
            )
                .prop_map(|v| {
                    let min = WorldPoint::new(v.0, v.1, v.2);
                    let max = min + WorldVector::new(v.3, v.4, v.5);
                    BBox::new(min, max)
                })
        }
    }
}
