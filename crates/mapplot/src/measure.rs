//! Ad-hoc distance measurement: an arc from the pressed point to the
//! cursor plus a small circle through the cursor, both kept in the store.

use foundation::ObjectId;
use foundation::math::{DistAz, GeoPoint, destination, distance_azimuth};
use scene::components::{ArcKind, ArcSpec, DeltaSpec, colors};
use scene::{MapWorld, ObjectKind, ObjectRef, StoreError, StoreResult};

/// Shorter measurements are discarded on release.
pub const MIN_MEASURE_DEG: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub origin: GeoPoint,
    pub to: GeoPoint,
    pub anchor: Option<ObjectRef>,
    pub arc: ObjectId,
    pub delta: ObjectId,
}

impl Measurement {
    pub fn start(world: &mut MapWorld, origin: GeoPoint, anchor: Option<ObjectRef>) -> StoreResult<Self> {
        let arc = world.add_arc(Self::arc_spec(origin, origin, anchor))?;
        let delta = match world.add_delta(Self::delta_spec(origin, 0.0, anchor)) {
            Ok(id) => id,
            Err(e) => {
                world.delete(ObjectRef::new(ObjectKind::Arc, arc))?;
                return Err(e);
            }
        };
        Ok(Self {
            origin,
            to: origin,
            anchor,
            arc,
            delta,
        })
    }

    fn arc_spec(origin: GeoPoint, to: GeoPoint, anchor: Option<ObjectRef>) -> ArcSpec {
        let mut spec = ArcSpec::between(origin, to)
            .with_kind(ArcKind::Measurement)
            .anchored_to(anchor);
        spec.label = "measurement".into();
        spec.style.color = colors::RED;
        spec
    }

    fn delta_spec(origin: GeoPoint, radius_deg: f64, anchor: Option<ObjectRef>) -> DeltaSpec {
        let mut spec = DeltaSpec::new(origin, radius_deg).anchored_to(anchor);
        spec.label = "measurement".into();
        spec.style.color = colors::RED;
        spec
    }

    pub fn distance(&self) -> DistAz {
        distance_azimuth(self.origin, self.to)
    }

    pub fn is_degenerate(&self) -> bool {
        self.distance().delta < MIN_MEASURE_DEG
    }

    /// Moves the far end; returns the new distance and azimuth.
    pub fn update(&mut self, world: &mut MapWorld, to: GeoPoint) -> StoreResult<DistAz> {
        let d = distance_azimuth(self.origin, to);
        world.change_arc(self.arc, Self::arc_spec(self.origin, to, self.anchor))?;
        world.change_delta(self.delta, Self::delta_spec(self.origin, d.delta, self.anchor))?;
        self.to = to;
        Ok(d)
    }

    /// Re-reads the arc after its anchor moved to `to`; the far end goes
    /// along and the circle is resized to the new span.
    pub fn follow_anchor(&mut self, world: &mut MapWorld, to: GeoPoint) -> StoreResult<()> {
        let Some(arc) = world.arc(self.arc) else {
            return Ok(());
        };
        let end = destination(arc.spec.origin, arc.spec.distance_deg, arc.spec.azimuth_deg);
        self.origin = to;
        self.update(world, end)?;
        Ok(())
    }

    /// Removes both objects. Ones already gone (deleted along with their
    /// anchor) are ignored.
    pub fn delete(&self, world: &mut MapWorld) -> StoreResult<()> {
        for target in [
            ObjectRef::new(ObjectKind::Arc, self.arc),
            ObjectRef::new(ObjectKind::Delta, self.delta),
        ] {
            match world.delete(target) {
                Ok(_) | Err(StoreError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn is_live(&self, world: &MapWorld) -> bool {
        world.arc(self.arc).is_some() && world.delta(self.delta).is_some()
    }

    pub fn owns(&self, target: ObjectRef) -> bool {
        target == ObjectRef::new(ObjectKind::Arc, self.arc)
            || target == ObjectRef::new(ObjectKind::Delta, self.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::components::StationSpec;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn update_rebuilds_both_objects() {
        let mut world = MapWorld::new();
        let mut m = Measurement::start(&mut world, GeoPoint::new(0.0, 0.0), None).unwrap();
        assert!(m.is_degenerate());
        let d = m.update(&mut world, GeoPoint::new(0.0, 30.0)).unwrap();
        assert_close(d.delta, 30.0, 1e-9);
        assert_close(d.az, 90.0, 1e-9);
        assert_close(world.delta(m.delta).unwrap().spec.radius_deg, 30.0, 1e-9);
        assert_eq!(world.arc(m.arc).unwrap().spec.kind, ArcKind::Measurement);
        m.delete(&mut world).unwrap();
        assert_eq!(world.object_count(), 0);
    }

    #[test]
    fn measurement_follows_a_moved_anchor() {
        let mut world = MapWorld::new();
        let st = world
            .add_station(StationSpec::new("ANC", GeoPoint::new(0.0, 0.0)))
            .unwrap();
        let anchor = ObjectRef::station(st);
        let mut m = Measurement::start(&mut world, GeoPoint::new(0.0, 0.0), Some(anchor)).unwrap();
        m.update(&mut world, GeoPoint::new(0.0, 30.0)).unwrap();

        let to = GeoPoint::new(10.0, 0.0);
        world.move_point(anchor, to).unwrap();
        m.follow_anchor(&mut world, to).unwrap();
        assert!(m.origin.approx_eq(to, 1e-12));
        assert_close(m.distance().delta, 30.0, 1e-9);
        assert!(world.arc(m.arc).unwrap().spec.origin.approx_eq(to, 1e-12));
        let delta = &world.delta(m.delta).unwrap().spec;
        assert!(delta.origin.approx_eq(to, 1e-12));
        assert_close(delta.radius_deg, 30.0, 1e-9);
    }

    #[test]
    fn anchored_measurement_goes_with_its_anchor() {
        let mut world = MapWorld::new();
        let st = world
            .add_station(StationSpec::new("ANC", GeoPoint::new(10.0, 10.0)))
            .unwrap();
        let anchor = ObjectRef::station(st);
        let m = Measurement::start(&mut world, GeoPoint::new(10.0, 10.0), Some(anchor)).unwrap();
        world.delete(anchor).unwrap();
        assert!(!m.is_live(&world));
        m.delete(&mut world).unwrap();
    }
}
