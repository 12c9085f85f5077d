// bf-core/src/units.rs

use uom::si::f64::{Energy as UomEnergy, Power as UomPower, Time as UomTime};

// Public canonical unit types (SI, f64)
pub type Energy = UomEnergy;
pub type Power = UomPower;
pub type Time = UomTime;

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn j(v: f64) -> Energy {
    use uom::si::energy::joule;
    Energy::new::<joule>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}
