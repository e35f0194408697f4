/// A node time.
///
/// Time increases into the past: the root of a tree
/// carries the largest time value, samples typically
/// sit at time 0. Branch lengths are differences of
/// parent and child times.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Time(f64);

impl Time {
    /// Return `true` if the stored value is finite.
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl From<f64> for Time {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i64> for Time {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl From<i32> for Time {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl From<Time> for f64 {
    fn from(value: Time) -> Self {
        value.0
    }
}

impl PartialOrd<Time> for Time {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match self.0.partial_cmp(&other.0) {
            None => panic!("fatal: partial_cmp for Time received non-finite values"),
            Some(x) => Some(x),
        }
    }
}
