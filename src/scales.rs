use serde::Serialize;

/// Closed numeric interval a scale maps from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Minimum and maximum of the given values, `None` for an empty sequence.
#[must_use]
pub fn extent<I>(values: I) -> Option<Domain>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some(Domain::new(v, v)),
        Some(d) => Some(Domain::new(d.min.min(v), d.max.max(v))),
    })
}

/// `[0, max]`, used by square-root radius scales.
#[must_use]
pub fn zero_to_max<I>(values: I) -> Option<Domain>
where
    I: IntoIterator<Item = f64>,
{
    extent(values).map(|d| Domain::new(0.0, d.max))
}
